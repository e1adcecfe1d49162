//! Tests for the catalog API wire shapes.
//!
//! The handler module is private to the binary, so these pin the JSON
//! contracts the frontend consumes via serde_json values, in the same way
//! the responses are produced.

use serde_json;

#[test]
fn test_upload_response_success_shape() {
    let response = serde_json::json!({
        "success": true,
        "message": "Dataset 'tile1' processed and saved"
    });

    let json = serde_json::to_string(&response).unwrap();
    assert!(json.contains("\"success\":true"));
    assert!(!json.contains("\"error\""));
}

#[test]
fn test_upload_response_failure_shape() {
    let response = serde_json::json!({
        "success": false,
        "error": "Request has no file field"
    });

    let json = serde_json::to_string(&response).unwrap();
    assert!(json.contains("\"success\":false"));
    assert!(json.contains("\"error\""));
    assert!(!json.contains("\"message\""));
}

#[test]
fn test_datasets_response_shape() {
    let response = serde_json::json!([
        {
            "category": "Digital Elevation Model",
            "description": "Terrain elevation rasters",
            "datasets": [
                {
                    "id": 1,
                    "name": "tile1",
                    "image_url": "http://minio:9000/geotiff-data/previews/abc.png",
                    "source_type": "LOCAL",
                    "bbox_west": 0.0,
                    "bbox_south": 0.0,
                    "bbox_east": 10.0,
                    "bbox_north": 10.0
                }
            ]
        }
    ]);

    let groups = response.as_array().unwrap();
    assert_eq!(groups.len(), 1);
    let dataset = &groups[0]["datasets"][0];
    assert_eq!(dataset["source_type"], "LOCAL");
    assert_eq!(dataset["bbox_east"], 10.0);
}

#[test]
fn test_grouped_listing_serializes_from_storage_types() {
    use geo_common::{BoundingBox, Footprint, SourceType};
    use storage::{CategoryGroup, DatasetSummary, NewDataset};

    // The storage types are the handler's response body; make sure their
    // serde output matches the documented contract.
    let group = CategoryGroup {
        category: "Other".to_string(),
        description: "Uncategorized rasters".to_string(),
        datasets: vec![DatasetSummary {
            id: 7,
            name: "scene".to_string(),
            image_url: "http://store/previews/x.png".to_string(),
            source_type: SourceType::Upload.as_str().to_string(),
            bbox_west: -1.0,
            bbox_south: -2.0,
            bbox_east: 3.0,
            bbox_north: 4.0,
        }],
    };

    let json = serde_json::to_value(&group).unwrap();
    assert_eq!(json["category"], "Other");
    assert_eq!(json["datasets"][0]["id"], 7);
    assert_eq!(json["datasets"][0]["source_type"], "UPLOAD");
    assert_eq!(json["datasets"][0]["bbox_north"], 4.0);

    // And the WKT the catalog writes for this footprint stays in sync
    let dataset = NewDataset {
        name: "scene".to_string(),
        image_url: "http://store/previews/x.png".to_string(),
        footprint: Footprint::from_bbox(&BoundingBox::new(-1.0, -2.0, 3.0, 4.0)),
        source_path: "geotiffs/k_scene.tif".to_string(),
        source_type: SourceType::Upload,
        category_id: 4,
    };
    assert_eq!(
        dataset.footprint.to_wkt(),
        "POLYGON((-1 -2, 3 -2, 3 4, -1 4, -1 -2))"
    );
}

#[test]
fn test_health_response_shape() {
    let response = serde_json::json!({
        "status": "ok",
        "service": "catalog-api",
        "version": "0.1.0"
    });

    let json = serde_json::to_string(&response).unwrap();
    assert!(json.contains("\"status\":\"ok\""));
    assert!(json.contains("\"service\":\"catalog-api\""));
}
