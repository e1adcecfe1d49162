//! Durable artifact storage for previews and archived sources (MinIO/S3).

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use object_store::{
    aws::AmazonS3Builder, path::Path, Attribute, Attributes, ObjectStore, PutOptions,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use uuid::Uuid;

use geo_common::{CatalogError, CatalogResult};

/// Configuration for the object store connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectStoreConfig {
    /// S3/MinIO endpoint URL
    pub endpoint: String,
    /// Bucket name
    pub bucket: String,
    /// Access key ID
    pub access_key_id: String,
    /// Secret access key
    pub secret_access_key: String,
    /// AWS region (use "us-east-1" for MinIO)
    pub region: String,
    /// Allow HTTP (for local MinIO)
    pub allow_http: bool,
    /// Base URL under which stored objects are publicly reachable.
    /// Defaults to `{endpoint}/{bucket}` (path-style) when unset.
    pub public_base_url: Option<String>,
}

impl Default for ObjectStoreConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://minio:9000".to_string(),
            bucket: "geotiff-data".to_string(),
            access_key_id: "minioadmin".to_string(),
            secret_access_key: "minioadmin".to_string(),
            region: "us-east-1".to_string(),
            allow_http: true,
            public_base_url: None,
        }
    }
}

/// Object store client for previews and archived source rasters.
///
/// Public readability of stored previews is a bucket policy concern; this
/// adapter constructs the public URL from configuration.
pub struct ArtifactStore {
    store: Arc<dyn ObjectStore>,
    bucket: String,
    public_base_url: String,
    op_timeout: Duration,
}

impl ArtifactStore {
    /// Create a new artifact store client from config.
    pub fn new(config: &ObjectStoreConfig, op_timeout: Duration) -> CatalogResult<Self> {
        let mut builder = AmazonS3Builder::new()
            .with_endpoint(&config.endpoint)
            .with_bucket_name(&config.bucket)
            .with_access_key_id(&config.access_key_id)
            .with_secret_access_key(&config.secret_access_key)
            .with_region(&config.region);

        if config.allow_http {
            builder = builder.with_allow_http(true);
        }

        let store = builder.build().map_err(|e| {
            CatalogError::StoreUnavailable(format!("Failed to create S3 client: {}", e))
        })?;

        let public_base_url = config
            .public_base_url
            .clone()
            .unwrap_or_else(|| {
                format!("{}/{}", config.endpoint.trim_end_matches('/'), config.bucket)
            })
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            store: Arc::new(store),
            bucket: config.bucket.clone(),
            public_base_url,
            op_timeout,
        })
    }

    /// Store an encoded preview under a fresh unique key.
    ///
    /// Returns the public URL the catalog records as the artifact locator.
    #[instrument(skip(self, data), fields(bucket = %self.bucket))]
    pub async fn store_preview(&self, data: Bytes, content_type: &str) -> CatalogResult<String> {
        let key = StorageLayout::preview_key(Uuid::new_v4());
        self.put(&key, data, content_type).await?;
        Ok(self.public_url(&key))
    }

    /// Archive a raw source raster under a collision-resistant key.
    ///
    /// Returns the object key, which doubles as the source identity for
    /// uploads.
    #[instrument(skip(self, data), fields(bucket = %self.bucket, filename = %filename))]
    pub async fn store_source(&self, filename: &str, data: Bytes) -> CatalogResult<String> {
        let key = StorageLayout::source_key(Uuid::new_v4(), filename);
        self.put(&key, data, "image/tiff").await?;
        Ok(key)
    }

    /// Read an object back (batch walkers pulling source rasters).
    #[instrument(skip(self), fields(bucket = %self.bucket, key = %key))]
    pub async fn fetch(&self, key: &str) -> CatalogResult<Bytes> {
        let location = Path::from(key);

        let fut = async {
            let result = self.store.get(&location).await?;
            result.bytes().await
        };

        let bytes = tokio::time::timeout(self.op_timeout, fut)
            .await
            .map_err(|_| self.timeout_error("fetch", key))?
            .map_err(|e| CatalogError::StoreUnavailable(format!("Failed to read {}: {}", key, e)))?;

        debug!(size = bytes.len(), "Read object");
        Ok(bytes)
    }

    /// List object keys under a prefix.
    pub async fn list(&self, prefix: &str) -> CatalogResult<Vec<String>> {
        use futures::TryStreamExt;

        let prefix_path = Path::from(prefix);

        let fut = async {
            let mut keys = Vec::new();
            let mut stream = self.store.list(Some(&prefix_path));
            while let Some(meta) = stream.try_next().await? {
                keys.push(meta.location.to_string());
            }
            Ok::<_, object_store::Error>(keys)
        };

        tokio::time::timeout(self.op_timeout, fut)
            .await
            .map_err(|_| self.timeout_error("list", prefix))?
            .map_err(|e| CatalogError::StoreUnavailable(format!("List failed: {}", e)))
    }

    /// Public URL for a stored object key.
    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, key)
    }

    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> CatalogResult<()> {
        let location = Path::from(key);
        debug!(size = data.len(), key = %key, "Writing object");

        let mut attributes = Attributes::new();
        attributes.insert(Attribute::ContentType, content_type.to_string().into());
        let mut opts = PutOptions::default();
        opts.attributes = attributes;

        let fut = self.store.put_opts(&location, data.into(), opts);

        tokio::time::timeout(self.op_timeout, fut)
            .await
            .map_err(|_| self.timeout_error("put", key))?
            .map_err(|e| {
                CatalogError::StoreUnavailable(format!("Failed to write {}: {}", key, e))
            })?;

        Ok(())
    }

    fn timeout_error(&self, op: &str, key: &str) -> CatalogError {
        CatalogError::StoreUnavailable(format!(
            "{} of {} timed out after {}s",
            op,
            key,
            self.op_timeout.as_secs()
        ))
    }
}

/// Key builder for a consistent bucket layout.
pub struct StorageLayout;

impl StorageLayout {
    /// Prefix for generated previews.
    pub const PREVIEW_PREFIX: &'static str = "previews/";
    /// Prefix for archived source rasters.
    pub const SOURCE_PREFIX: &'static str = "geotiffs/";

    /// Build a preview key: `previews/{uuid}.png`
    pub fn preview_key(id: Uuid) -> String {
        format!("{}{}.png", Self::PREVIEW_PREFIX, id)
    }

    /// Build a source archive key: `geotiffs/{uuid}_{filename}`
    pub fn source_key(id: Uuid, filename: &str) -> String {
        format!("{}{}_{}", Self::SOURCE_PREFIX, id, filename)
    }
}
