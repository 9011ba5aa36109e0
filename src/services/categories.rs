use std::sync::Arc;

use validator::Validate;

use crate::db::models::{Category, NewCategory, UpdateCategory};
use crate::db::repository::{CategoryRepository, ProductRepository};
use crate::errors::{AppError, AppResult, FieldErrors};
use crate::models::{CategoryListResponse, CategoryPage, CategoryPayload};
use crate::pagination::Pagination;
use crate::query::{CategoryQuery, ListParams};
use crate::slug::slugify;
use crate::tree::{build_forest, descendant_ids};

const ENTITY: &str = "Category";

/// Category operations on top of the repositories. Every method is blocking;
/// HTTP handlers run them through `web::block`.
#[derive(Clone)]
pub struct CategoryService {
    categories: Arc<dyn CategoryRepository>,
    products: Arc<dyn ProductRepository>,
}

impl CategoryService {
    pub fn new(categories: Arc<dyn CategoryRepository>, products: Arc<dyn ProductRepository>) -> Self {
        CategoryService { categories, products }
    }

    /// Filtered page of rows, the parent-picker forest, and the echoed filters.
    pub fn list(&self, params: ListParams) -> AppResult<CategoryListResponse> {
        let params = params.normalized();
        let query = CategoryQuery::from_params(&params)?;
        log::debug!("listing categories: {:?}", query);

        let (rows, total) = self.categories.list(&query)?;
        let pagination = Pagination::new(query.page, query.per_page, total);
        let parent_categories = build_forest(&self.categories.all()?);

        Ok(CategoryListResponse {
            categories: CategoryPage::new(rows, pagination, query.offset()),
            pagination,
            parent_categories,
            filters: params,
        })
    }

    pub fn show(&self, id: i32) -> AppResult<Category> {
        self.categories.find(id)?.ok_or(AppError::NotFound(ENTITY))
    }

    pub fn create(&self, payload: CategoryPayload) -> AppResult<Category> {
        let payload = payload.normalized();
        self.validate(&payload, None)?;

        let category = self.categories.create(NewCategory {
            slug: slugify(&payload.name),
            name: payload.name,
            description: payload.description,
            parent_id: payload.parent_id,
            is_active: payload.is_active,
        })?;
        log::info!("created category {} ({})", category.id, category.slug);
        Ok(category)
    }

    /// Replaces every mutable field and re-derives the slug.
    pub fn update(&self, id: i32, payload: CategoryPayload) -> AppResult<Category> {
        self.show(id)?;
        let payload = payload.normalized();
        self.validate(&payload, Some(id))?;

        let category = self
            .categories
            .update(
                id,
                UpdateCategory {
                    slug: slugify(&payload.name),
                    name: payload.name,
                    description: payload.description,
                    parent_id: payload.parent_id,
                    is_active: payload.is_active,
                },
            )?
            .ok_or(AppError::NotFound(ENTITY))?;
        log::info!("updated category {} ({})", category.id, category.slug);
        Ok(category)
    }

    /// Refuses while subcategories or live products still reference the row.
    pub fn delete(&self, id: i32) -> AppResult<()> {
        self.show(id)?;

        let children = self.categories.count_children(id)?;
        if children > 0 {
            return Err(AppError::Conflict(format!(
                "Category has {} subcategories; move or delete them first.",
                children
            )));
        }
        let products = self.products.count_for_category(id)?;
        if products > 0 {
            return Err(AppError::Conflict(format!(
                "Category has {} products; reassign or delete them first.",
                products
            )));
        }

        if self.categories.delete(id)? == 0 {
            return Err(AppError::NotFound(ENTITY));
        }
        log::info!("deleted category {}", id);
        Ok(())
    }

    fn validate(&self, payload: &CategoryPayload, editing: Option<i32>) -> AppResult<()> {
        let mut errors = match payload.validate() {
            Ok(()) => FieldErrors::new(),
            Err(e) => FieldErrors::from(e),
        };

        let parent_to_check = payload
            .parent_id
            .filter(|_| errors.get("parent_id").is_none());
        if let Some(parent_id) = parent_to_check {
            if editing == Some(parent_id) {
                errors.add("parent_id", "A category cannot be its own parent.");
            } else if self.categories.find(parent_id)?.is_none() {
                errors.add("parent_id", "The selected parent is invalid.");
            } else if let Some(id) = editing {
                if descendant_ids(&self.categories.all()?, id).contains(&parent_id) {
                    errors.add("parent_id", "A category cannot be moved beneath its own descendant.");
                }
            }
        }

        errors.into_result()
    }
}
