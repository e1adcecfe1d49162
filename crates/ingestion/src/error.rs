//! Error types for the ingestion crate.

use thiserror::Error;

use geo_common::CatalogError;

/// Errors that can occur while ingesting one raster.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Failed to read file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl IngestError {
    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            IngestError::FileRead(_) => 400,
            IngestError::Catalog(e) => e.http_status_code(),
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
