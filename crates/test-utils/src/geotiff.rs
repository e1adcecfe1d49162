//! In-memory GeoTIFF fixture encoder.
//!
//! Writes a single-band Gray32Float GeoTIFF with ModelPixelScale,
//! ModelTiepoint, and a GeoKey directory declaring the given EPSG code.
//! Fixture code: panics on encoding failure.

use std::io::Cursor;

use tiff::encoder::colortype::Gray32Float;
use tiff::encoder::TiffEncoder;
use tiff::tags::Tag;

use geo_common::BoundingBox;

// GeoTIFF Tag IDs (not in the standard tiff crate)
const GEOTIFF_MODELPIXELSCALE: u16 = 33550;
const GEOTIFF_MODELTIEPOINT: u16 = 33922;
const GEOTIFF_GEOKEYDIRECTORY: u16 = 34735;

// GeoKey IDs and values
const GT_MODEL_TYPE_GEO_KEY: u16 = 1024;
const GT_RASTER_TYPE_GEO_KEY: u16 = 1025;
const GEOGRAPHIC_TYPE_GEO_KEY: u16 = 2048;
const PROJECTED_CS_TYPE_GEO_KEY: u16 = 3072;
const MODEL_TYPE_PROJECTED: u16 = 1;
const MODEL_TYPE_GEOGRAPHIC: u16 = 2;
const RASTER_PIXEL_IS_AREA: u16 = 1;

/// Encode a synthetic single-band GeoTIFF covering `bounds` in the given
/// EPSG reference.
///
/// `samples` is row-major, row 0 at the northern edge, and must hold
/// exactly `width * height` values.
pub fn encode_geotiff(
    width: u32,
    height: u32,
    samples: &[f32],
    bounds: BoundingBox,
    epsg: u16,
) -> Vec<u8> {
    assert_eq!(
        samples.len(),
        (width * height) as usize,
        "sample count must match dimensions"
    );

    let mut buffer = Cursor::new(Vec::new());
    {
        let mut encoder = TiffEncoder::new(&mut buffer).expect("create TIFF encoder");
        let mut image = encoder
            .new_image::<Gray32Float>(width, height)
            .expect("create image directory");

        let scale_x = bounds.width() / width as f64;
        let scale_y = bounds.height() / height as f64;

        let dir = image.encoder();
        dir.write_tag(
            Tag::Unknown(GEOTIFF_MODELPIXELSCALE),
            [scale_x, scale_y, 0.0].as_slice(),
        )
        .expect("write pixel scale");
        // Ties pixel (0, 0) to the north-west corner
        dir.write_tag(
            Tag::Unknown(GEOTIFF_MODELTIEPOINT),
            [0.0, 0.0, 0.0, bounds.west, bounds.north, 0.0].as_slice(),
        )
        .expect("write tiepoint");
        dir.write_tag(
            Tag::Unknown(GEOTIFF_GEOKEYDIRECTORY),
            geokey_directory(epsg).as_slice(),
        )
        .expect("write geokeys");

        image.write_data(samples).expect("write samples");
    }

    buffer.into_inner()
}

fn geokey_directory(epsg: u16) -> Vec<u16> {
    let geographic = projection::is_geographic_crs(epsg as u32);
    let (model_type, code_key) = if geographic {
        (MODEL_TYPE_GEOGRAPHIC, GEOGRAPHIC_TYPE_GEO_KEY)
    } else {
        (MODEL_TYPE_PROJECTED, PROJECTED_CS_TYPE_GEO_KEY)
    };

    // [version, revision, minor, key count] then 4 values per key
    vec![
        1,
        1,
        0,
        3,
        GT_MODEL_TYPE_GEO_KEY,
        0,
        1,
        model_type,
        GT_RASTER_TYPE_GEO_KEY,
        0,
        1,
        RASTER_PIXEL_IS_AREA,
        code_key,
        0,
        1,
        epsg,
    ]
}
