//! In-process catalog store, selected with `database.url = "memory://"`.
//!
//! Mirrors the SQL behavior of [`PgRepository`](super::PgRepository):
//! case-insensitive substring search, `NULL`s sorting last in ascending
//! order, and `id` as the final tiebreaker.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;

use crate::db::models::*;
use crate::db::repository::{CategoryRepository, ProductRepository};
use crate::errors::{AppError, AppResult};
use crate::query::{CategoryQuery, SortColumn, SortDirection};

#[derive(Default)]
struct Tables {
    categories: Vec<Category>,
    products: Vec<Product>,
    next_category_id: i32,
    next_product_id: i32,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Marks a product as deleted without removing it.
    pub fn soft_delete_product(&self, id: i32) -> bool {
        let mut tables = self.tables();
        match tables.products.iter_mut().find(|p| p.id == id) {
            Some(product) => {
                product.deleted_at = Some(Utc::now().naive_utc());
                true
            }
            None => false,
        }
    }
}

fn compare_rows(a: &CategoryWithParent, b: &CategoryWithParent, column: SortColumn) -> Ordering {
    let by_column = match column {
        SortColumn::Name => a.name.cmp(&b.name),
        SortColumn::Slug => a.slug.cmp(&b.slug),
        SortColumn::ParentName => match (&a.parent_name, &b.parent_name) {
            (Some(x), Some(y)) => x.cmp(y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
        SortColumn::IsActive => a.is_active.cmp(&b.is_active),
        SortColumn::CreatedAt => a.created_at.cmp(&b.created_at),
        SortColumn::UpdatedAt => a.updated_at.cmp(&b.updated_at),
    };
    by_column.then(a.id.cmp(&b.id))
}

impl CategoryRepository for MemoryStore {
    fn list(&self, query: &CategoryQuery) -> AppResult<(Vec<CategoryWithParent>, u64)> {
        let tables = self.tables();
        let names: HashMap<i32, &str> = tables
            .categories
            .iter()
            .map(|c| (c.id, c.name.as_str()))
            .collect();

        let mut rows: Vec<CategoryWithParent> = tables
            .categories
            .iter()
            .filter(|c| query.matches(&c.name, c.is_active))
            .map(|c| {
                let parent_name = c
                    .parent_id
                    .and_then(|id| names.get(&id))
                    .map(|name| name.to_string());
                CategoryWithParent::new(c.clone(), parent_name)
            })
            .collect();

        let (column, direction) = query.order();
        rows.sort_by(|a, b| match direction {
            SortDirection::Asc => compare_rows(a, b, column),
            SortDirection::Desc => compare_rows(b, a, column),
        });

        let total = rows.len() as u64;
        let offset = usize::try_from(query.offset()).unwrap_or(usize::MAX);
        let page = rows
            .into_iter()
            .skip(offset)
            .take(query.per_page as usize)
            .collect();
        Ok((page, total))
    }

    fn all(&self) -> AppResult<Vec<Category>> {
        let mut all = self.tables().categories.clone();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(all)
    }

    fn find(&self, id: i32) -> AppResult<Option<Category>> {
        Ok(self.tables().categories.iter().find(|c| c.id == id).cloned())
    }

    fn create(&self, new_category: NewCategory) -> AppResult<Category> {
        let mut tables = self.tables();
        tables.next_category_id += 1;
        let now = Utc::now().naive_utc();
        let category = Category {
            id: tables.next_category_id,
            name: new_category.name,
            slug: new_category.slug,
            description: new_category.description,
            parent_id: new_category.parent_id,
            is_active: new_category.is_active,
            created_at: now,
            updated_at: now,
        };
        tables.categories.push(category.clone());
        Ok(category)
    }

    fn update(&self, id: i32, changes: UpdateCategory) -> AppResult<Option<Category>> {
        let mut tables = self.tables();
        let Some(category) = tables.categories.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        category.name = changes.name;
        category.slug = changes.slug;
        category.description = changes.description;
        category.parent_id = changes.parent_id;
        category.is_active = changes.is_active;
        category.updated_at = Utc::now().naive_utc();
        Ok(Some(category.clone()))
    }

    fn delete(&self, id: i32) -> AppResult<usize> {
        let mut tables = self.tables();
        let before = tables.categories.len();
        tables.categories.retain(|c| c.id != id);
        Ok(before - tables.categories.len())
    }

    fn count_children(&self, id: i32) -> AppResult<u64> {
        let tables = self.tables();
        Ok(tables
            .categories
            .iter()
            .filter(|c| c.parent_id == Some(id))
            .count() as u64)
    }
}

impl ProductRepository for MemoryStore {
    fn list_with_category(&self) -> AppResult<Vec<ProductWithCategory>> {
        let tables = self.tables();
        let names: HashMap<i32, &str> = tables
            .categories
            .iter()
            .map(|c| (c.id, c.name.as_str()))
            .collect();

        let mut rows: Vec<ProductWithCategory> = tables
            .products
            .iter()
            .filter(|p| p.deleted_at.is_none())
            .filter_map(|p| {
                names
                    .get(&p.category_id)
                    .map(|name| ProductWithCategory::new(p.clone(), name.to_string()))
            })
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    fn create_product(&self, new_product: NewProduct) -> AppResult<Product> {
        let mut tables = self.tables();
        if !tables.categories.iter().any(|c| c.id == new_product.category_id) {
            return Err(AppError::NotFound("Category"));
        }
        tables.next_product_id += 1;
        let now = Utc::now().naive_utc();
        let product = Product {
            id: tables.next_product_id,
            name: new_product.name,
            description: new_product.description,
            price: new_product.price,
            sku: new_product.sku,
            stock: new_product.stock,
            is_active: new_product.is_active,
            category_id: new_product.category_id,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        };
        tables.products.push(product.clone());
        Ok(product)
    }

    fn count_for_category(&self, category_id: i32) -> AppResult<u64> {
        let tables = self.tables();
        Ok(tables
            .products
            .iter()
            .filter(|p| p.category_id == category_id && p.deleted_at.is_none())
            .count() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::ListParams;
    use crate::slug::slugify;

    fn new_category(name: &str, parent_id: Option<i32>, is_active: bool) -> NewCategory {
        NewCategory {
            name: name.to_string(),
            slug: slugify(name),
            description: None,
            parent_id,
            is_active,
        }
    }

    fn query(params: ListParams) -> CategoryQuery {
        CategoryQuery::from_params(&params).unwrap()
    }

    #[test]
    fn list_joins_parent_name() {
        let store = MemoryStore::new();
        let men = store.create(new_category("Men", None, true)).unwrap();
        store.create(new_category("Shoes", Some(men.id), true)).unwrap();

        let (rows, total) = store.list(&CategoryQuery::default()).unwrap();
        assert_eq!(total, 2);
        let shoes = rows.iter().find(|r| r.name == "Shoes").unwrap();
        assert_eq!(shoes.parent_name.as_deref(), Some("Men"));
        let root = rows.iter().find(|r| r.name == "Men").unwrap();
        assert_eq!(root.parent_name, None);
    }

    #[test]
    fn default_order_is_newest_first() {
        let store = MemoryStore::new();
        for name in ["A", "B", "C"] {
            store.create(new_category(name, None, true)).unwrap();
        }
        let (rows, _) = store.list(&CategoryQuery::default()).unwrap();
        let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["C", "B", "A"]);
    }

    #[test]
    fn parent_name_sort_puts_roots_last_ascending() {
        let store = MemoryStore::new();
        let kids = store.create(new_category("Kids", None, true)).unwrap();
        store.create(new_category("Toys", Some(kids.id), true)).unwrap();

        let (rows, _) = store
            .list(&query(ListParams {
                sort: Some("parent_name".into()),
                ..ListParams::default()
            }))
            .unwrap();
        assert_eq!(rows[0].name, "Toys");
        assert_eq!(rows[1].name, "Kids");
    }

    #[test]
    fn activity_filter_is_exact() {
        let store = MemoryStore::new();
        store.create(new_category("On", None, true)).unwrap();
        store.create(new_category("Off", None, false)).unwrap();

        let (inactive, total) = store
            .list(&query(ListParams {
                is_active: Some("0".into()),
                ..ListParams::default()
            }))
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(inactive[0].name, "Off");
    }

    #[test]
    fn soft_deleted_products_are_hidden() {
        let store = MemoryStore::new();
        let men = store.create(new_category("Men", None, true)).unwrap();
        let product = store
            .create_product(NewProduct {
                name: "Belt".into(),
                description: None,
                price: rust_decimal::Decimal::new(2450, 2),
                sku: "BELT0001".into(),
                stock: 10,
                is_active: true,
                category_id: men.id,
            })
            .unwrap();

        assert_eq!(store.count_for_category(men.id).unwrap(), 1);
        assert!(store.soft_delete_product(product.id));
        assert_eq!(store.count_for_category(men.id).unwrap(), 0);
        assert!(store.list_with_category().unwrap().is_empty());
    }
}
