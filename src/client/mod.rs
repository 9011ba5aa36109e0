//! Client-side query-state controller for the category table.
//!
//! Owns the current search/sort/page state, debounces free-text search, and
//! re-fetches the whole list through a [`CategoryFetcher`] on every change.

mod controller;
mod http;
mod state;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::CategoryListResponse;
use crate::query::ListParams;

pub use controller::{QueryController, SEARCH_DEBOUNCE};
pub use http::HttpFetcher;
pub use state::QueryState;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server responded with status {0}")]
    Status(u16),

    #[error("{0}")]
    Other(String),
}

/// Performs one list round-trip.
#[async_trait]
pub trait CategoryFetcher: Send + Sync + 'static {
    async fn fetch(&self, params: &ListParams) -> Result<CategoryListResponse, FetchError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// A user-facing outcome, rendered by whatever UI owns the notifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Notice {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Notice {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }
}

/// Notification channel injected into the controller.
pub trait Notifier: Send + Sync + 'static {
    fn notify(&self, notice: Notice);
}
