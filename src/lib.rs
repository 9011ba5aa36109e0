//! Catalog administration service: hierarchical categories and the products
//! filed under them.

pub mod client;
pub mod config;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod pagination;
pub mod query;
pub mod seed;
pub mod services;
pub mod slug;
pub mod state;
pub mod tree;

pub use errors::{AppError, AppResult};
pub use state::AppState;
