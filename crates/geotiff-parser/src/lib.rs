//! GeoTIFF decoding for the ingestion pipeline.
//!
//! Built on the pure-Rust `tiff` crate. Exposes the three things the
//! pipeline needs from a raster: the first band's samples, the native
//! pixel bounds, and the declared coordinate reference (EPSG code).
//!
//! Georeferencing is read from the ModelPixelScale + ModelTiepoint tag
//! pair; files carrying only a ModelTransformation matrix are rejected.

mod geokeys;

pub use geokeys::epsg_from_geokeys;

use std::io::Cursor;

use tiff::decoder::{Decoder, DecodingResult, Limits};
use tiff::tags::Tag;

use geo_common::{BoundingBox, CatalogError, CatalogResult};

/// A decoded GeoTIFF: one band of samples plus georeferencing.
#[derive(Debug, Clone)]
pub struct GeoTiff {
    /// Grid width in pixels.
    pub width: u32,
    /// Grid height in pixels.
    pub height: u32,
    /// First band, row-major, converted to f64.
    pub samples: Vec<f64>,
    /// Bounds (west, south, east, north) in the native reference.
    pub native_bounds: BoundingBox,
    /// Declared coordinate reference as an EPSG code.
    pub epsg: u32,
}

impl GeoTiff {
    /// Decode a GeoTIFF from an in-memory byte buffer.
    pub fn from_bytes(data: &[u8]) -> CatalogResult<Self> {
        let mut decoder = Decoder::new(Cursor::new(data))
            .map_err(|e| CatalogError::InvalidInput(format!("Not a readable TIFF: {}", e)))?
            .with_limits(Limits::unlimited());

        let (width, height) = decoder
            .dimensions()
            .map_err(|e| CatalogError::InvalidInput(format!("Missing dimensions: {}", e)))?;
        if width == 0 || height == 0 {
            return Err(CatalogError::InvalidInput(
                "Raster has zero dimensions".to_string(),
            ));
        }

        let native_bounds = read_native_bounds(&mut decoder, width, height)?;
        let epsg = read_epsg(&mut decoder)?;

        let samples_per_pixel = decoder
            .get_tag_u32(Tag::SamplesPerPixel)
            .unwrap_or(1)
            .max(1) as usize;

        let image = decoder
            .read_image()
            .map_err(|e| CatalogError::InvalidInput(format!("Failed to read band: {}", e)))?;
        let samples = first_band_as_f64(image, samples_per_pixel);

        let expected = width as usize * height as usize;
        if samples.len() != expected {
            return Err(CatalogError::InvalidInput(format!(
                "Band has {} samples, expected {}",
                samples.len(),
                expected
            )));
        }

        Ok(Self {
            width,
            height,
            samples,
            native_bounds,
            epsg,
        })
    }
}

/// Compute native bounds from the ModelTiepoint + ModelPixelScale tags.
///
/// The tiepoint anchors pixel (0, 0) at the north-west corner; the scale
/// gives per-pixel extents, Y positive downward.
fn read_native_bounds(
    decoder: &mut Decoder<Cursor<&[u8]>>,
    width: u32,
    height: u32,
) -> CatalogResult<BoundingBox> {
    let scale = decoder
        .get_tag_f64_vec(Tag::ModelPixelScaleTag)
        .map_err(|_| {
            CatalogError::InvalidInput(
                "Missing ModelPixelScale tag (ModelTransformation-only files are not supported)"
                    .to_string(),
            )
        })?;
    let tiepoint = decoder
        .get_tag_f64_vec(Tag::ModelTiepointTag)
        .map_err(|_| CatalogError::InvalidInput("Missing ModelTiepoint tag".to_string()))?;

    if scale.len() < 2 || tiepoint.len() < 6 {
        return Err(CatalogError::InvalidInput(
            "Malformed georeferencing tags".to_string(),
        ));
    }
    // Tiepoints anchored off pixel (0,0) are rare; reject rather than guess.
    if tiepoint[0] != 0.0 || tiepoint[1] != 0.0 {
        return Err(CatalogError::InvalidInput(
            "ModelTiepoint is not anchored at pixel (0,0)".to_string(),
        ));
    }

    let (scale_x, scale_y) = (scale[0], scale[1]);
    if !(scale_x > 0.0) || !(scale_y > 0.0) {
        return Err(CatalogError::InvalidInput(format!(
            "Non-positive pixel scale: ({}, {})",
            scale_x, scale_y
        )));
    }

    let west = tiepoint[3];
    let north = tiepoint[4];
    let east = west + scale_x * width as f64;
    let south = north - scale_y * height as f64;

    let bounds = BoundingBox::new(west, south, east, north);
    if !bounds.is_valid() {
        return Err(CatalogError::InvalidInput(
            "Georeferencing tags produce non-finite bounds".to_string(),
        ));
    }

    Ok(bounds)
}

/// Read the declared coordinate reference from the GeoKey directory.
fn read_epsg(decoder: &mut Decoder<Cursor<&[u8]>>) -> CatalogResult<u32> {
    let raw = decoder
        .get_tag_u32_vec(Tag::GeoKeyDirectoryTag)
        .map_err(|_| {
            CatalogError::InvalidCoordinateReference(
                "No GeoKey directory: raster declares no coordinate reference".to_string(),
            )
        })?;

    let keys: Vec<u16> = raw.iter().map(|&v| v as u16).collect();
    epsg_from_geokeys(&keys)
}

/// Extract the first band from an interleaved decode, converting to f64.
fn first_band_as_f64(image: DecodingResult, samples_per_pixel: usize) -> Vec<f64> {
    fn take<T: Copy, F: Fn(T) -> f64>(buf: Vec<T>, stride: usize, conv: F) -> Vec<f64> {
        buf.iter().step_by(stride).map(|&v| conv(v)).collect()
    }

    match image {
        DecodingResult::U8(buf) => take(buf, samples_per_pixel, f64::from),
        DecodingResult::U16(buf) => take(buf, samples_per_pixel, f64::from),
        DecodingResult::U32(buf) => take(buf, samples_per_pixel, f64::from),
        DecodingResult::U64(buf) => take(buf, samples_per_pixel, |v| v as f64),
        DecodingResult::I8(buf) => take(buf, samples_per_pixel, f64::from),
        DecodingResult::I16(buf) => take(buf, samples_per_pixel, f64::from),
        DecodingResult::I32(buf) => take(buf, samples_per_pixel, f64::from),
        DecodingResult::I64(buf) => take(buf, samples_per_pixel, |v| v as f64),
        DecodingResult::F32(buf) => take(buf, samples_per_pixel, f64::from),
        DecodingResult::F64(buf) => take(buf, samples_per_pixel, |v| v),
    }
}
