use chrono::NaiveDateTime;
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::db::schema::{categories, products};

#[derive(Queryable, Selectable, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[diesel(table_name = categories)]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub parent_id: Option<i32>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = categories)]
pub struct NewCategory {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub parent_id: Option<i32>,
    pub is_active: bool,
}

/// Full replacement of the mutable columns; `None` writes `NULL`.
#[derive(AsChangeset, Debug, Clone)]
#[diesel(table_name = categories, treat_none_as_null = true)]
pub struct UpdateCategory {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub parent_id: Option<i32>,
    pub is_active: bool,
}

/// List-view row: a category plus its parent's name from the self-join.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CategoryWithParent {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub parent_id: Option<i32>,
    pub is_active: bool,
    pub parent_name: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl CategoryWithParent {
    pub fn new(category: Category, parent_name: Option<String>) -> Self {
        CategoryWithParent {
            id: category.id,
            name: category.name,
            slug: category.slug,
            description: category.description,
            parent_id: category.parent_id,
            is_active: category.is_active,
            parent_name,
            created_at: category.created_at,
            updated_at: category.updated_at,
        }
    }
}

#[derive(Queryable, Selectable, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[diesel(table_name = products)]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub sku: String,
    pub stock: i32,
    pub is_active: bool,
    pub category_id: i32,
    pub deleted_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = products)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub sku: String,
    pub stock: i32,
    pub is_active: bool,
    pub category_id: i32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CategoryRef {
    pub id: i32,
    pub name: String,
}

/// Product listing row with its owning category.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ProductWithCategory {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub sku: String,
    pub stock: i32,
    pub is_active: bool,
    pub category_id: i32,
    pub category: CategoryRef,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl ProductWithCategory {
    pub fn new(product: Product, category_name: String) -> Self {
        ProductWithCategory {
            id: product.id,
            name: product.name,
            description: product.description,
            price: product.price,
            sku: product.sku,
            stock: product.stock,
            is_active: product.is_active,
            category_id: product.category_id,
            category: CategoryRef {
                id: product.category_id,
                name: category_name,
            },
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}
