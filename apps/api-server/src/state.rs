//! Application state - shared across all handlers.

use std::sync::Arc;
use std::time::Duration;

use yatube_core::ports::{Cache, ContentStore, PasswordService, TokenService};
use yatube_infra::cache::InMemoryCache;
use yatube_infra::database::InMemoryContentStore;
use yatube_infra::{Argon2PasswordService, JwtTokenService};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ContentStore>,
    pub cache: Arc<dyn Cache>,
    pub tokens: Arc<dyn TokenService>,
    pub passwords: Arc<dyn PasswordService>,
    pub posts_per_page: u64,
    pub index_cache_ttl: Duration,
}

impl AppState {
    /// Build the application state, connecting to the database when one is configured.
    pub async fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let store = match &config.database {
            Some(db_config) => Self::database_store(db_config).await?,
            None => {
                tracing::warn!("DATABASE_URL not set. Content is kept in memory only.");
                Arc::new(InMemoryContentStore::new()) as Arc<dyn ContentStore>
            }
        };

        tracing::info!("Application state initialized");
        Ok(Self::with_store(config, store))
    }

    /// State over an explicit store, with in-process cache and the configured auth services.
    pub fn with_store(config: &AppConfig, store: Arc<dyn ContentStore>) -> Self {
        Self {
            store,
            cache: Arc::new(InMemoryCache::new()),
            tokens: Arc::new(JwtTokenService::new(config.jwt.clone())),
            passwords: Arc::new(Argon2PasswordService::new()),
            posts_per_page: config.posts_per_page,
            index_cache_ttl: config.index_cache_ttl,
        }
    }

    #[cfg(feature = "postgres")]
    async fn database_store(
        config: &yatube_infra::DatabaseConfig,
    ) -> anyhow::Result<Arc<dyn ContentStore>> {
        use migration::MigratorTrait;

        let db = yatube_infra::connect(config).await?;
        if config.run_migrations {
            migration::Migrator::up(&db, None).await?;
            tracing::info!("Migrations applied");
        }

        Ok(Arc::new(yatube_infra::DbContentStore::new(db)))
    }

    #[cfg(not(feature = "postgres"))]
    async fn database_store(
        _config: &yatube_infra::DatabaseConfig,
    ) -> anyhow::Result<Arc<dyn ContentStore>> {
        anyhow::bail!("DATABASE_URL is set but the server was built without the postgres feature")
    }
}
