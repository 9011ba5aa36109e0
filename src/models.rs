use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::db::models::{Category, CategoryWithParent};
use crate::pagination::{served_range, Pagination};
use crate::query::ListParams;
use crate::tree::CategoryNode;

fn default_active() -> bool {
    true
}

/// Body of create and update requests. The slug is always derived from
/// `name`, never read from the client.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CategoryPayload {
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "The name field is required and may not exceed 255 characters."))]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    #[validate(range(min = 1, message = "The selected parent is invalid."))]
    pub parent_id: Option<i32>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl CategoryPayload {
    /// Trims text fields and turns a blank description into `None`.
    pub fn normalized(self) -> Self {
        CategoryPayload {
            name: self.name.trim().to_string(),
            description: self
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            parent_id: self.parent_id,
            is_active: self.is_active,
        }
    }
}

/// Laravel-style paginator body: rows plus the pagination fields inline.
/// `from`/`to` cover the rows in `data` and are null for an empty page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryPage {
    pub data: Vec<CategoryWithParent>,
    #[serde(flatten)]
    pub pagination: Pagination,
    #[serde(default)]
    pub from: Option<u64>,
    #[serde(default)]
    pub to: Option<u64>,
}

impl CategoryPage {
    pub fn new(data: Vec<CategoryWithParent>, pagination: Pagination, offset: u64) -> Self {
        let range = served_range(offset, data.len());
        CategoryPage {
            data,
            pagination,
            from: range.map(|(from, _)| from),
            to: range.map(|(_, to)| to),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryListResponse {
    pub categories: CategoryPage,
    pub pagination: Pagination,
    #[serde(rename = "parentCategories")]
    pub parent_categories: Vec<CategoryNode>,
    pub filters: ListParams,
}

/// Outcome of a write, rendered by the client as a notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Acknowledgment {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

impl Acknowledgment {
    pub fn success(message: impl Into<String>) -> Self {
        Acknowledgment {
            success: true,
            message: message.into(),
            category: None,
        }
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }
}
