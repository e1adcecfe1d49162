//! The ingestion orchestrator.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, info, instrument};

use geo_common::{CatalogError, Footprint, SourceType};
use geotiff_parser::GeoTiff;
use storage::{ArtifactStore, Catalog, NewDataset};

use crate::classify::Classifier;
use crate::error::Result;

/// Optional overrides for one ingestion.
#[derive(Debug, Clone, Default)]
pub struct IngestOptions {
    /// Override the dataset name derived from the source identity
    /// (uploads use the original filename, not the archive key).
    pub name: Option<String>,
    /// Override the classifier's category assignment.
    pub category_id: Option<i32>,
}

/// Terminal state of one ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// A new catalog row was recorded.
    Done { dataset_id: i64 },
    /// The source identity was already recorded; nothing was written.
    Skipped,
}

/// Core orchestrator, shared by the HTTP front door and the batch walkers.
///
/// Drives one raster at a time: dedup check, decode, footprint extraction,
/// band normalization, PNG encoding, preview storage, classification,
/// catalog record. The preview is stored before the catalog insert, so a
/// failed insert leaves at worst an unreferenced object, never a catalog
/// row pointing at a missing artifact.
pub struct Ingester {
    /// Object store client (previews and archived sources)
    store: Arc<ArtifactStore>,
    /// Catalog for dataset registration
    catalog: Catalog,
    /// Ordered keyword rules
    classifier: Classifier,
    /// Category name -> id, loaded once at construction
    categories: HashMap<String, i32>,
}

impl Ingester {
    /// Create a new Ingester.
    ///
    /// Loads the category table and verifies the classifier's default
    /// category exists; a catalog without it is a configuration error and
    /// refuses to start rather than skipping files later.
    pub async fn new(
        store: Arc<ArtifactStore>,
        catalog: Catalog,
        classifier: Classifier,
    ) -> Result<Self> {
        let categories = catalog.category_ids().await?;

        if !categories.contains_key(classifier.default_category()) {
            return Err(CatalogError::ConfigurationError(format!(
                "Default category '{}' is missing from the catalog",
                classifier.default_category()
            ))
            .into());
        }

        Ok(Self {
            store,
            catalog,
            classifier,
            categories,
        })
    }

    /// Ingest a raster from the filesystem.
    pub async fn ingest_file(
        &self,
        file_path: &Path,
        source_path: &str,
        source_type: SourceType,
        options: IngestOptions,
    ) -> Result<IngestOutcome> {
        let data = tokio::fs::read(file_path).await?;
        self.ingest_bytes(Bytes::from(data), source_path, source_type, options)
            .await
    }

    /// Ingest a raster from bytes.
    #[instrument(skip(self, data, options), fields(source = %source_path, source_type = %source_type))]
    pub async fn ingest_bytes(
        &self,
        data: Bytes,
        source_path: &str,
        source_type: SourceType,
        options: IngestOptions,
    ) -> Result<IngestOutcome> {
        if self.catalog.is_processed(source_path).await? {
            debug!("Source already recorded, skipping");
            return Ok(IngestOutcome::Skipped);
        }

        let raster = GeoTiff::from_bytes(&data)?;
        let bounds = projection::reproject_bounds(raster.epsg, raster.native_bounds)?;
        let footprint = Footprint::from_bbox(&bounds);

        let gray = preview::normalize_band(&raster.samples);
        let png = preview::encode_gray_png(&gray, raster.width, raster.height)?;
        let image_url = self
            .store
            .store_preview(Bytes::from(png), preview::PNG_CONTENT_TYPE)
            .await?;

        let category_id = match options.category_id {
            Some(id) => id,
            None => self
                .classifier
                .classify(source_path, &self.categories)
                .ok_or_else(|| {
                    CatalogError::ConfigurationError(format!(
                        "No catalog category for '{}'",
                        source_path
                    ))
                })?,
        };

        let dataset = NewDataset {
            name: options
                .name
                .unwrap_or_else(|| dataset_name(source_path)),
            image_url,
            footprint,
            source_path: source_path.to_string(),
            source_type,
            category_id,
        };

        match self.catalog.insert_dataset(&dataset).await? {
            Some(dataset_id) => {
                info!(
                    dataset_id,
                    name = %dataset.name,
                    epsg = raster.epsg,
                    "Dataset recorded"
                );
                Ok(IngestOutcome::Done { dataset_id })
            }
            None => {
                // A concurrent writer won the race on this identity
                debug!("Source recorded concurrently, skipping");
                Ok(IngestOutcome::Skipped)
            }
        }
    }

    /// Get a reference to the artifact store.
    pub fn store(&self) -> &Arc<ArtifactStore> {
        &self.store
    }

    /// Get a reference to the catalog.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }
}

/// Derive a dataset name from a source identity: final path segment with
/// the extension stripped.
pub fn dataset_name(source_path: &str) -> String {
    Path::new(source_path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(source_path)
        .to_string()
}
