//! Remote walkers: the object-store bucket and the remote drive API.

use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, Result};
use serde::Deserialize;
use tracing::{info, warn};

use geo_common::SourceType;
use ingestion::{IngestOptions, Ingester};

use crate::local::is_geotiff_path;
use crate::ScanSummary;

/// Scan the configured bucket under `prefix` and ingest every
/// unprocessed GeoTIFF object. The object key is the source identity.
pub async fn scan_bucket(ingester: &Ingester, prefix: &str) -> Result<ScanSummary> {
    // A failed listing aborts the run; per-object failures do not
    let keys = ingester.store().list(prefix).await?;
    info!(count = keys.len(), prefix = %prefix, "Listed bucket objects");

    let mut summary = ScanSummary::default();

    for key in keys {
        if !is_geotiff_path(Path::new(&key)) {
            continue;
        }

        match ingester.catalog().is_processed(&key).await {
            Ok(true) => {
                summary.skipped += 1;
                continue;
            }
            Ok(false) => {}
            Err(e) => {
                warn!(error = %e, key = %key, "Dedup check failed, continuing");
                summary.failed += 1;
                continue;
            }
        }

        let data = match ingester.store().fetch(&key).await {
            Ok(data) => data,
            Err(e) => {
                warn!(error = %e, key = %key, "Download failed, continuing");
                summary.failed += 1;
                continue;
            }
        };

        match ingester
            .ingest_bytes(data, &key, SourceType::ObjectStore, IngestOptions::default())
            .await
        {
            Ok(outcome) => {
                info!(key = %key, ?outcome, "Object handled");
                summary.record(&outcome);
            }
            Err(e) => {
                warn!(error = %e, key = %key, "Ingestion failed, continuing");
                summary.failed += 1;
            }
        }
    }

    Ok(summary)
}

/// One file entry in the remote drive listing.
#[derive(Debug, Clone, Deserialize)]
pub struct DriveFile {
    /// Drive-relative path; used as the source identity
    pub path: String,
    /// Direct download URL for the file contents
    pub download_url: String,
}

/// Scan a remote drive exposing `GET {base}/files` as a JSON array of
/// [`DriveFile`] entries. The drive path is the source identity, so a
/// moved file counts as new.
pub async fn scan_drive(ingester: &Ingester, base_url: &str) -> Result<ScanSummary> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(300))
        .build()?;

    let listing_url = format!("{}/files", base_url.trim_end_matches('/'));
    let response = client.get(&listing_url).send().await?;
    if !response.status().is_success() {
        return Err(anyhow!("Drive listing failed: {}", response.status()));
    }

    let files: Vec<DriveFile> = response.json().await?;
    info!(count = files.len(), "Listed drive files");

    let mut summary = ScanSummary::default();

    for file in files {
        if !is_geotiff_path(Path::new(&file.path)) {
            continue;
        }

        match ingester.catalog().is_processed(&file.path).await {
            Ok(true) => {
                summary.skipped += 1;
                continue;
            }
            Ok(false) => {}
            Err(e) => {
                warn!(error = %e, path = %file.path, "Dedup check failed, continuing");
                summary.failed += 1;
                continue;
            }
        }

        let data = match download(&client, &file.download_url).await {
            Ok(data) => data,
            Err(e) => {
                warn!(error = %e, path = %file.path, "Download failed, continuing");
                summary.failed += 1;
                continue;
            }
        };

        match ingester
            .ingest_bytes(
                data,
                &file.path,
                SourceType::RemoteDrive,
                IngestOptions::default(),
            )
            .await
        {
            Ok(outcome) => {
                info!(path = %file.path, ?outcome, "Drive file handled");
                summary.record(&outcome);
            }
            Err(e) => {
                warn!(error = %e, path = %file.path, "Ingestion failed, continuing");
                summary.failed += 1;
            }
        }
    }

    Ok(summary)
}

async fn download(client: &reqwest::Client, url: &str) -> Result<bytes::Bytes> {
    let response = client.get(url).send().await?;
    if !response.status().is_success() {
        return Err(anyhow!("Download failed: {}", response.status()));
    }
    Ok(response.bytes().await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drive_listing_deserialization() {
        let json = r#"[
            {"path": "Shared/dem/tile1.tif", "download_url": "https://drive.example.com/d/abc"},
            {"path": "Shared/notes.txt", "download_url": "https://drive.example.com/d/def"}
        ]"#;

        let files: Vec<DriveFile> = serde_json::from_str(json).unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].path, "Shared/dem/tile1.tif");
        assert!(is_geotiff_path(Path::new(&files[0].path)));
        assert!(!is_geotiff_path(Path::new(&files[1].path)));
    }
}
