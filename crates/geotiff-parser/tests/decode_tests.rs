//! Round-trip tests against synthesized GeoTIFF fixtures.

use geo_common::BoundingBox;
use geotiff_parser::GeoTiff;
use test_utils::{create_constant_band, create_gradient_band, encode_geotiff};

#[test]
fn test_roundtrip_wgs84() {
    let bounds = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
    let band = create_gradient_band(8, 8);
    let bytes = encode_geotiff(8, 8, &band, bounds, 4326);

    let raster = GeoTiff::from_bytes(&bytes).unwrap();

    assert_eq!(raster.width, 8);
    assert_eq!(raster.height, 8);
    assert_eq!(raster.epsg, 4326);
    assert_eq!(raster.native_bounds, bounds);
    assert_eq!(raster.samples.len(), 64);
    for (decoded, original) in raster.samples.iter().zip(band.iter()) {
        assert_eq!(*decoded, f64::from(*original));
    }
}

#[test]
fn test_roundtrip_projected() {
    // UTM zone 33N, 100m pixels
    let bounds = BoundingBox::new(500_000.0, 5_000_000.0, 500_400.0, 5_000_400.0);
    let band = create_gradient_band(4, 4);
    let bytes = encode_geotiff(4, 4, &band, bounds, 32633);

    let raster = GeoTiff::from_bytes(&bytes).unwrap();

    assert_eq!(raster.epsg, 32633);
    assert_eq!(raster.native_bounds, bounds);
}

#[test]
fn test_constant_band_survives_decode() {
    let bounds = BoundingBox::new(-1.0, -1.0, 1.0, 1.0);
    let band = create_constant_band(5, 5, 42.0);
    let bytes = encode_geotiff(5, 5, &band, bounds, 4326);

    let raster = GeoTiff::from_bytes(&bytes).unwrap();
    assert!(raster.samples.iter().all(|&v| v == 42.0));
}

#[test]
fn test_non_square_dimensions() {
    let bounds = BoundingBox::new(0.0, 0.0, 6.0, 2.0);
    let band = create_gradient_band(6, 2);
    let bytes = encode_geotiff(6, 2, &band, bounds, 4326);

    let raster = GeoTiff::from_bytes(&bytes).unwrap();
    assert_eq!(raster.width, 6);
    assert_eq!(raster.height, 2);
    assert_eq!(raster.native_bounds, bounds);
}
