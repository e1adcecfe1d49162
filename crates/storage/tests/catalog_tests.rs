//! Catalog integration tests against a live PostGIS database.
//!
//! Ignored by default; run with:
//!
//! ```sh
//! DATABASE_URL=postgresql://... cargo test -p storage -- --ignored
//! ```

use std::time::Duration;

use geo_common::{BoundingBox, CatalogError, Footprint, SourceType};
use storage::{Catalog, NewDataset};

async fn connect() -> Catalog {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let catalog = Catalog::connect(&url, Duration::from_secs(30))
        .await
        .expect("catalog connection");
    catalog.migrate().await.expect("migrations");
    catalog
}

fn dataset(source_path: &str, category_id: i32) -> NewDataset {
    NewDataset {
        name: "atomicity-probe".to_string(),
        image_url: "http://store/previews/probe.png".to_string(),
        footprint: Footprint::from_bbox(&BoundingBox::new(0.0, 0.0, 1.0, 1.0)),
        source_path: source_path.to_string(),
        source_type: SourceType::Local,
        category_id,
    }
}

fn unique_source(tag: &str) -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    format!("/test/{}/{}-{}.tif", tag, std::process::id(), nanos)
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_failed_insert_leaves_no_row() {
    let catalog = connect().await;
    let source = unique_source("rollback");

    // Nonexistent category violates the foreign key inside the transaction
    let err = catalog
        .insert_dataset(&dataset(&source, -1))
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::CatalogWriteFailure(_)));

    // The rollback left nothing visible
    assert!(!catalog.is_processed(&source).await.expect("is_processed"));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_insert_is_visible_immediately() {
    let catalog = connect().await;
    let categories = catalog.category_ids().await.expect("categories");
    let other = *categories.get("Other").expect("seeded default category");

    let source = unique_source("visible");
    assert!(!catalog.is_processed(&source).await.expect("pre-check"));

    let id = catalog
        .insert_dataset(&dataset(&source, other))
        .await
        .expect("insert")
        .expect("fresh identity inserts a row");
    assert!(id > 0);

    assert!(catalog.is_processed(&source).await.expect("post-check"));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_duplicate_identity_reports_skip_not_failure() {
    let catalog = connect().await;
    let categories = catalog.category_ids().await.expect("categories");
    let other = *categories.get("Other").expect("seeded default category");

    let source = unique_source("duplicate");
    let first = catalog
        .insert_dataset(&dataset(&source, other))
        .await
        .expect("first insert");
    assert!(first.is_some());

    // Same identity again: the unique constraint resolves it to "already
    // recorded", not an error
    let second = catalog
        .insert_dataset(&dataset(&source, other))
        .await
        .expect("second insert must not error");
    assert!(second.is_none());
}
