use std::sync::Arc;
use tokio::sync::RwLock;

use crate::analysis::sentiment::LexiconClassifier;
use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AnalyticsService, AuthService, CatalogService, ImportService, SeaOrmAnalyticsService,
    SeaOrmAuthService, SeaOrmCatalogService, SeaOrmImportService,
};

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub auth_service: Arc<dyn AuthService>,

    pub catalog_service: Arc<dyn CatalogService>,

    pub analytics_service: Arc<dyn AnalyticsService>,

    pub import_service: Arc<dyn ImportService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        Ok(Self::with_store(config, store))
    }

    /// Wire every service against an already connected store.
    #[must_use]
    pub fn with_store(config: Config, store: Store) -> Self {
        let auth_service = Arc::new(SeaOrmAuthService::new(
            store.clone(),
            config.security.clone(),
        )) as Arc<dyn AuthService>;

        let catalog_service =
            Arc::new(SeaOrmCatalogService::new(store.clone())) as Arc<dyn CatalogService>;

        let analytics_service = Arc::new(SeaOrmAnalyticsService::new(
            store.clone(),
            config.analytics.clone(),
            Arc::new(LexiconClassifier::new()),
        )) as Arc<dyn AnalyticsService>;

        let import_service = Arc::new(SeaOrmImportService::new(
            store.clone(),
            config.import.clone(),
        )) as Arc<dyn ImportService>;

        Self {
            config: Arc::new(RwLock::new(config)),
            store,
            auth_service,
            catalog_service,
            analytics_service,
            import_service,
        }
    }

    pub async fn config(&self) -> Config {
        self.config.read().await.clone()
    }
}
