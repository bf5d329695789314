//! Shared application state.

use anyhow::Context;
use std::sync::Arc;

use crate::{
    auth::AuthManager,
    cdn::{self, ImageHost},
    db::{MemoryStore, PostgresStore, PropertyStore, UploadStore},
    services::{PropertyService, SearchService, UploadService},
    Config,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub auth: Arc<AuthManager>,
    pub search_service: Arc<SearchService>,
    pub property_service: Arc<PropertyService>,
    pub upload_service: Arc<UploadService>,
}

impl AppState {
    /// Connects the configured backends. An empty `database.url` selects
    /// the in-memory store.
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let host = cdn::from_config(&config.cdn).context("Failed to set up image host")?;

        if config.database.is_in_memory() {
            tracing::warn!("No database URL configured, using the in-memory store");
            let store = Arc::new(MemoryStore::new());
            return Self::with_backends(config, store.clone(), store, host);
        }

        let store = Arc::new(
            PostgresStore::connect(&config.database)
                .await
                .context("Failed to connect to PostgreSQL")?,
        );
        tracing::info!(
            pool_max_size = config.database.pool_max_size,
            "Connected to PostgreSQL"
        );
        Self::with_backends(config, store.clone(), store, host)
    }

    pub fn with_backends(
        config: Config,
        properties: Arc<dyn PropertyStore>,
        uploads: Arc<dyn UploadStore>,
        host: Arc<dyn ImageHost>,
    ) -> anyhow::Result<Self> {
        let config = Arc::new(config);
        let auth = AuthManager::new(config.clone())
            .map_err(|e| anyhow::anyhow!("Failed to initialize auth: {e:?}"))?;

        let search_service = SearchService::new(
            properties.clone(),
            uploads.clone(),
            config.search.normalizer_options(),
            config.search.featured_page_size,
        );
        let property_service = PropertyService::new(properties, uploads.clone());
        let upload_service = UploadService::new(uploads, host, config.uploads.clone());

        Ok(Self {
            config,
            auth: Arc::new(auth),
            search_service: Arc::new(search_service),
            property_service: Arc::new(property_service),
            upload_service: Arc::new(upload_service),
        })
    }
}
