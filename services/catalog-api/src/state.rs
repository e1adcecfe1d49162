//! Shared application state.

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use ingestion::{IngestConfig, Ingester};
use storage::{ArtifactStore, Catalog};

/// Shared state for the HTTP server.
pub struct AppState {
    /// Core ingester, also the gateway to the catalog and artifact store
    pub ingester: Ingester,
}

impl AppState {
    /// Wire the backing services from configuration.
    pub async fn new(config: &IngestConfig, migrate: bool) -> Result<Self> {
        let store = Arc::new(ArtifactStore::new(&config.store, config.op_timeout)?);
        let catalog = Catalog::connect(&config.database_url, config.op_timeout).await?;

        if migrate {
            info!("Running catalog migrations");
            catalog.migrate().await?;
        }

        let ingester = Ingester::new(store, catalog, config.classifier.clone()).await?;

        Ok(Self { ingester })
    }
}
