//! End-to-end ingestion tests against live backing services.
//!
//! These need a PostGIS database and an S3-compatible store, so they are
//! ignored by default. Run with:
//!
//! ```sh
//! DATABASE_URL=postgresql://... S3_ENDPOINT=http://localhost:9000 \
//!     cargo test -p ingestion -- --ignored
//! ```

use std::sync::Arc;

use bytes::Bytes;

use geo_common::{BoundingBox, SourceType};
use ingestion::{Classifier, IngestConfig, IngestOptions, IngestOutcome, Ingester};
use storage::{ArtifactStore, Catalog};
use test_utils::encode_geotiff;

async fn build_ingester() -> Ingester {
    let config = IngestConfig::from_env().expect("config from env");
    let store =
        Arc::new(ArtifactStore::new(&config.store, config.op_timeout).expect("artifact store"));
    let catalog = Catalog::connect(&config.database_url, config.op_timeout)
        .await
        .expect("catalog connection");
    catalog.migrate().await.expect("migrations");

    Ingester::new(store, catalog, Classifier::default())
        .await
        .expect("ingester")
}

fn scenario_bytes() -> Bytes {
    let band: Vec<f32> = (0..100).map(|i| 10.0 + i as f32).collect();
    Bytes::from(encode_geotiff(
        10,
        10,
        &band,
        BoundingBox::new(0.0, 0.0, 10.0, 10.0),
        4326,
    ))
}

#[tokio::test]
#[ignore = "requires DATABASE_URL and an S3-compatible store"]
async fn test_ingest_records_one_dataset_and_second_call_skips() {
    let ingester = build_ingester().await;

    // Unique per run so reruns do not collide with old rows
    let source_path = format!("/data/e2e/{}.tif", uuid_like());

    let first = ingester
        .ingest_bytes(
            scenario_bytes(),
            &source_path,
            SourceType::Local,
            IngestOptions::default(),
        )
        .await
        .expect("first ingest");
    let dataset_id = match first {
        IngestOutcome::Done { dataset_id } => dataset_id,
        IngestOutcome::Skipped => panic!("fresh source must not be skipped"),
    };
    assert!(dataset_id > 0);

    // Idempotence: the same identity yields exactly one row
    let second = ingester
        .ingest_bytes(
            scenario_bytes(),
            &source_path,
            SourceType::Local,
            IngestOptions::default(),
        )
        .await
        .expect("second ingest");
    assert_eq!(second, IngestOutcome::Skipped);

    assert!(ingester
        .catalog()
        .is_processed(&source_path)
        .await
        .expect("is_processed"));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL and an S3-compatible store"]
async fn test_ingested_dataset_appears_in_grouped_listing() {
    let ingester = build_ingester().await;

    let source_path = format!("/data/dem/e2e-{}.tif", uuid_like());
    let outcome = ingester
        .ingest_bytes(
            scenario_bytes(),
            &source_path,
            SourceType::Local,
            IngestOptions::default(),
        )
        .await
        .expect("ingest");
    assert!(matches!(outcome, IngestOutcome::Done { .. }));

    let groups = ingester.catalog().list_grouped().await.expect("listing");

    // Categories and datasets come back alphabetically
    let names: Vec<&str> = groups.iter().map(|g| g.category.as_str()).collect();
    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names, sorted);

    // The "dem" keyword routed the dataset to its category, footprint intact
    let dem_group = groups
        .iter()
        .find(|g| g.category == "Digital Elevation Model")
        .expect("DEM category present");
    let dataset = dem_group
        .datasets
        .iter()
        .find(|d| source_path.contains(&d.name))
        .expect("ingested dataset listed");
    assert_eq!(dataset.bbox_west, 0.0);
    assert_eq!(dataset.bbox_south, 0.0);
    assert_eq!(dataset.bbox_east, 10.0);
    assert_eq!(dataset.bbox_north, 10.0);
    assert!(dataset.image_url.contains("previews/"));

    // The stored preview resolves to a non-empty payload
    let key = dataset
        .image_url
        .split_once("previews/")
        .map(|(_, tail)| format!("previews/{}", tail))
        .expect("preview key in URL");
    let payload = ingester.store().fetch(&key).await.expect("preview fetch");
    assert!(!payload.is_empty());
}

/// Process-unique suffix without pulling a uuid dev-dependency in.
fn uuid_like() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    format!("{}-{}", std::process::id(), nanos)
}
