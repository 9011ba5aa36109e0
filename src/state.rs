use std::sync::Arc;

use crate::config::DatabaseSettings;
use crate::db::connection::{init_pool, run_migrations};
use crate::db::memory::MemoryStore;
use crate::db::repository::{CategoryRepository, PgRepository, ProductRepository};
use crate::errors::AppResult;
use crate::services::CategoryService;

/// Shared per-worker state: the repository handles.
#[derive(Clone)]
pub struct AppState {
    pub categories: Arc<dyn CategoryRepository>,
    pub products: Arc<dyn ProductRepository>,
}

impl AppState {
    pub fn memory() -> Self {
        Self::from_memory(Arc::new(MemoryStore::new()))
    }

    pub fn from_memory(store: Arc<MemoryStore>) -> Self {
        AppState {
            categories: store.clone(),
            products: store,
        }
    }

    /// Builds the pool and brings the schema up to date.
    pub fn postgres(settings: &DatabaseSettings) -> AppResult<Self> {
        let pool = init_pool(settings)?;
        run_migrations(&pool)?;
        let repository = Arc::new(PgRepository::new(pool));
        Ok(AppState {
            categories: repository.clone(),
            products: repository,
        })
    }

    pub fn connect(settings: &DatabaseSettings) -> AppResult<Self> {
        if settings.is_memory() {
            log::info!("using in-memory catalog store");
            Ok(Self::memory())
        } else {
            log::info!("connecting to PostgreSQL (pool size {})", settings.pool_size);
            Self::postgres(settings)
        }
    }

    pub fn category_service(&self) -> CategoryService {
        CategoryService::new(self.categories.clone(), self.products.clone())
    }
}
