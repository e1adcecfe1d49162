//! Provenance tags for ingested rasters.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a raster came from. Stored alongside the dataset row and echoed in
/// the catalog API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceType {
    /// Scanned from a local directory; the source identity is the file path.
    Local,
    /// Scanned from the S3-compatible bucket; the identity is the object key.
    ObjectStore,
    /// Scanned from a remote drive; the identity is the drive-relative path.
    RemoteDrive,
    /// Received through the HTTP upload endpoint; the identity is the
    /// archived object key.
    Upload,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::Local => "LOCAL",
            SourceType::ObjectStore => "OBJECT_STORE",
            SourceType::RemoteDrive => "REMOTE_DRIVE",
            SourceType::Upload => "UPLOAD",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
