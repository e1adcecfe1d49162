//! Error types for geotiff-catalog services.

use thiserror::Error;

/// Result type alias using CatalogError.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Primary error type for ingestion and catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    // === Input Errors ===
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid coordinate reference: {0}")]
    InvalidCoordinateReference(String),

    #[error("Preview encoding failed: {0}")]
    EncodingFailure(String),

    // === Backend Errors ===
    #[error("Object store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Catalog write failed: {0}")]
    CatalogWriteFailure(String),

    #[error("Catalog read failed: {0}")]
    CatalogReadFailure(String),

    // === Startup Errors ===
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl CatalogError {
    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            CatalogError::InvalidInput(_)
            | CatalogError::InvalidCoordinateReference(_) => 400,

            CatalogError::EncodingFailure(_)
            | CatalogError::StoreUnavailable(_)
            | CatalogError::CatalogWriteFailure(_)
            | CatalogError::CatalogReadFailure(_)
            | CatalogError::ConfigurationError(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            CatalogError::InvalidInput("no file".into()).http_status_code(),
            400
        );
        assert_eq!(
            CatalogError::InvalidCoordinateReference("missing".into()).http_status_code(),
            400
        );
        assert_eq!(
            CatalogError::StoreUnavailable("timeout".into()).http_status_code(),
            500
        );
    }
}
