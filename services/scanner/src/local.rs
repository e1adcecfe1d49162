//! Local directory walker.

use std::path::Path;

use anyhow::{anyhow, Result};
use tracing::{info, warn};
use walkdir::WalkDir;

use geo_common::SourceType;
use ingestion::{IngestOptions, Ingester};

use crate::ScanSummary;

/// Walk a directory tree and ingest every unprocessed GeoTIFF.
///
/// The file's absolute-ish display path is its source identity, so a
/// rescan of the same folder skips everything already recorded.
pub async fn scan_directory(ingester: &Ingester, dir: &Path) -> Result<ScanSummary> {
    if !dir.is_dir() {
        return Err(anyhow!("Not a directory: {}", dir.display()));
    }

    let mut summary = ScanSummary::default();

    for entry in WalkDir::new(dir) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "Unreadable directory entry, continuing");
                summary.failed += 1;
                continue;
            }
        };

        if !entry.file_type().is_file() || !is_geotiff_path(entry.path()) {
            continue;
        }

        let source_path = entry.path().display().to_string();

        // Cheap dedup probe before reading the file at all
        match ingester.catalog().is_processed(&source_path).await {
            Ok(true) => {
                summary.skipped += 1;
                continue;
            }
            Ok(false) => {}
            Err(e) => {
                warn!(error = %e, path = %source_path, "Dedup check failed, continuing");
                summary.failed += 1;
                continue;
            }
        }

        match ingester
            .ingest_file(
                entry.path(),
                &source_path,
                SourceType::Local,
                IngestOptions::default(),
            )
            .await
        {
            Ok(outcome) => {
                info!(path = %source_path, ?outcome, "File handled");
                summary.record(&outcome);
            }
            Err(e) => {
                warn!(error = %e, path = %source_path, "Ingestion failed, continuing");
                summary.failed += 1;
            }
        }
    }

    Ok(summary)
}

/// Candidate filter: `.tif` / `.tiff`, case-insensitive.
pub fn is_geotiff_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let lower = ext.to_lowercase();
            lower == "tif" || lower == "tiff"
        })
        .unwrap_or(false)
}
