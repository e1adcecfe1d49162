//! Metadata catalog using PostgreSQL with PostGIS.

use std::collections::HashMap;
use std::time::Duration;

use serde::Serialize;
use sqlx::{postgres::PgPoolOptions, FromRow, PgPool};
use tracing::{debug, instrument};

use geo_common::{CatalogError, CatalogResult, Footprint, SourceType};

/// SQLSTATE for unique constraint violation.
const UNIQUE_VIOLATION: &str = "23505";

/// Database connection pool and catalog operations.
pub struct Catalog {
    pool: PgPool,
    op_timeout: Duration,
}

/// Input for registering one ingested raster.
#[derive(Debug, Clone)]
pub struct NewDataset {
    /// Human label, source filename with the extension stripped.
    pub name: String,
    /// Public URL of the stored preview.
    pub image_url: String,
    /// Closed WGS84 footprint ring.
    pub footprint: Footprint,
    /// Idempotency key: path or object key identifying the source raster.
    pub source_path: String,
    /// Provenance tag.
    pub source_type: SourceType,
    /// Category the classifier assigned.
    pub category_id: i32,
}

/// One category with its datasets, as served by the catalog API.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryGroup {
    pub category: String,
    pub description: String,
    pub datasets: Vec<DatasetSummary>,
}

/// One dataset row in a category group.
#[derive(Debug, Clone, Serialize)]
pub struct DatasetSummary {
    pub id: i64,
    pub name: String,
    pub image_url: String,
    pub source_type: String,
    pub bbox_west: f64,
    pub bbox_south: f64,
    pub bbox_east: f64,
    pub bbox_north: f64,
}

impl Catalog {
    /// Create a new catalog connection from a database URL.
    pub async fn connect(database_url: &str, op_timeout: Duration) -> CatalogResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .map_err(|e| CatalogError::CatalogWriteFailure(format!("Connection failed: {}", e)))?;

        Ok(Self { pool, op_timeout })
    }

    /// Run database migrations and seed the category table.
    pub async fn migrate(&self) -> CatalogResult<()> {
        // Split SQL statements and execute them individually
        for statement in SCHEMA_SQL.split(';') {
            let trimmed = statement.trim();
            if !trimmed.is_empty() {
                sqlx::query(trimmed)
                    .execute(&self.pool)
                    .await
                    .map_err(|e| {
                        CatalogError::CatalogWriteFailure(format!("Migration failed: {}", e))
                    })?;
            }
        }

        Ok(())
    }

    /// Check whether a source identity has already been recorded.
    ///
    /// Cheap existence probe; batch walkers call this before downloading
    /// or decoding anything.
    #[instrument(skip(self))]
    pub async fn is_processed(&self, source_path: &str) -> CatalogResult<bool> {
        let fut = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM datasets WHERE source_path = $1)",
        )
        .bind(source_path)
        .fetch_one(&self.pool);

        tokio::time::timeout(self.op_timeout, fut)
            .await
            .map_err(|_| self.read_timeout("isProcessed"))?
            .map_err(|e| CatalogError::CatalogReadFailure(format!("Existence check failed: {}", e)))
    }

    /// Load the category table as a name -> id map.
    pub async fn category_ids(&self) -> CatalogResult<HashMap<String, i32>> {
        let fut = sqlx::query_as::<_, (i32, String)>("SELECT id, name FROM categories")
            .fetch_all(&self.pool);

        let rows = tokio::time::timeout(self.op_timeout, fut)
            .await
            .map_err(|_| self.read_timeout("categories"))?
            .map_err(|e| {
                CatalogError::CatalogReadFailure(format!("Category query failed: {}", e))
            })?;

        Ok(rows.into_iter().map(|(id, name)| (name, id)).collect())
    }

    /// Atomically insert one dataset row.
    ///
    /// Returns the new row id, or `None` when another writer recorded the
    /// same source identity first (unique constraint on `source_path`).
    /// Any other failure rolls the transaction back with no partial row.
    #[instrument(skip(self, dataset), fields(name = %dataset.name, source = %dataset.source_path))]
    pub async fn insert_dataset(&self, dataset: &NewDataset) -> CatalogResult<Option<i64>> {
        tokio::time::timeout(self.op_timeout, self.insert_dataset_inner(dataset))
            .await
            .map_err(|_| {
                CatalogError::CatalogWriteFailure(format!(
                    "Insert timed out after {}s",
                    self.op_timeout.as_secs()
                ))
            })?
    }

    async fn insert_dataset_inner(&self, dataset: &NewDataset) -> CatalogResult<Option<i64>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| CatalogError::CatalogWriteFailure(format!("Begin failed: {}", e)))?;

        let result = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO datasets (name, image_url, geom, source_path, source_type, category_id)
            VALUES ($1, $2, ST_GeomFromText($3, 4326), $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(&dataset.name)
        .bind(&dataset.image_url)
        .bind(dataset.footprint.to_wkt())
        .bind(&dataset.source_path)
        .bind(dataset.source_type.as_str())
        .bind(dataset.category_id)
        .fetch_one(&mut *tx)
        .await;

        let id = match result {
            Ok(id) => id,
            Err(e) => {
                // Rollback happens on drop; surface duplicates as "already recorded"
                if is_unique_violation(&e) {
                    debug!(source = %dataset.source_path, "Source already recorded");
                    return Ok(None);
                }
                return Err(CatalogError::CatalogWriteFailure(format!(
                    "Insert failed: {}",
                    e
                )));
            }
        };

        tx.commit()
            .await
            .map_err(|e| CatalogError::CatalogWriteFailure(format!("Commit failed: {}", e)))?;

        Ok(Some(id))
    }

    /// Read the full catalog grouped by category.
    ///
    /// Categories and datasets are both ordered alphabetically by name.
    /// Read-only; no side effects.
    pub async fn list_grouped(&self) -> CatalogResult<Vec<CategoryGroup>> {
        let fut = sqlx::query_as::<_, GroupedRow>(
            r#"
            SELECT
                c.name AS category_name,
                c.description AS category_description,
                d.id,
                d.name,
                d.image_url,
                d.source_type,
                ST_XMin(d.geom) AS bbox_west,
                ST_YMin(d.geom) AS bbox_south,
                ST_XMax(d.geom) AS bbox_east,
                ST_YMax(d.geom) AS bbox_north
            FROM datasets d
            JOIN categories c ON d.category_id = c.id
            ORDER BY c.name, d.name
            "#,
        )
        .fetch_all(&self.pool);

        let rows = tokio::time::timeout(self.op_timeout, fut)
            .await
            .map_err(|_| self.read_timeout("listGrouped"))?
            .map_err(|e| CatalogError::CatalogReadFailure(format!("List query failed: {}", e)))?;

        let mut groups: Vec<CategoryGroup> = Vec::new();
        for row in rows {
            let summary = DatasetSummary {
                id: row.id,
                name: row.name,
                image_url: row.image_url,
                source_type: row.source_type,
                bbox_west: row.bbox_west,
                bbox_south: row.bbox_south,
                bbox_east: row.bbox_east,
                bbox_north: row.bbox_north,
            };

            match groups.last_mut() {
                Some(group) if group.category == row.category_name => {
                    group.datasets.push(summary)
                }
                _ => groups.push(CategoryGroup {
                    category: row.category_name,
                    description: row.category_description,
                    datasets: vec![summary],
                }),
            }
        }

        Ok(groups)
    }

    fn read_timeout(&self, what: &str) -> CatalogError {
        CatalogError::CatalogReadFailure(format!(
            "{} timed out after {}s",
            what,
            self.op_timeout.as_secs()
        ))
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .and_then(|db| db.code())
        .map(|code| code == UNIQUE_VIOLATION)
        .unwrap_or(false)
}

/// Internal row type for the grouped list query.
#[derive(FromRow)]
struct GroupedRow {
    category_name: String,
    category_description: String,
    id: i64,
    name: String,
    image_url: String,
    source_type: String,
    bbox_west: f64,
    bbox_south: f64,
    bbox_east: f64,
    bbox_north: f64,
}

/// Database schema SQL, executed statement by statement by `migrate`.
const SCHEMA_SQL: &str = r#"
CREATE EXTENSION IF NOT EXISTS postgis;

CREATE TABLE IF NOT EXISTS categories (
    id SERIAL PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    description TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS datasets (
    id BIGSERIAL PRIMARY KEY,
    name TEXT NOT NULL,
    image_url TEXT NOT NULL,
    geom GEOMETRY(Polygon, 4326) NOT NULL,
    source_path TEXT UNIQUE,
    source_type VARCHAR(20) NOT NULL,
    category_id INTEGER NOT NULL REFERENCES categories(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX IF NOT EXISTS idx_datasets_category ON datasets(category_id);

INSERT INTO categories (name, description) VALUES
    ('Digital Elevation Model', 'Terrain elevation rasters'),
    ('Slope Analysis', 'Slope and gradient derivatives'),
    ('Satellite Imagery', 'Remote sensing scenes'),
    ('Other', 'Uncategorized rasters')
ON CONFLICT (name) DO NOTHING;
"#;
