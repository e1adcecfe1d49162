//! PNG encoding for 8-bit grayscale image data.
//!
//! Writes color type 0 (grayscale), bit depth 8, one unfiltered scanline
//! per row, zlib-compressed IDAT. Lossless and deterministic.

use std::io::Write;

use geo_common::{CatalogError, CatalogResult};

/// Content type of the encoded previews.
pub const PNG_CONTENT_TYPE: &str = "image/png";

/// Create a grayscale PNG from 8-bit samples.
///
/// # Arguments
/// - `samples`: grayscale pixel data, row-major, 1 byte per pixel
/// - `width`: image width in pixels
/// - `height`: image height in pixels
pub fn encode_gray_png(samples: &[u8], width: u32, height: u32) -> CatalogResult<Vec<u8>> {
    let expected = width as usize * height as usize;
    if samples.len() != expected || expected == 0 {
        return Err(CatalogError::EncodingFailure(format!(
            "Grid shape mismatch: {} samples for {}x{}",
            samples.len(),
            width,
            height
        )));
    }

    let mut png = Vec::new();

    // PNG signature
    png.extend_from_slice(&[137, 80, 78, 71, 13, 10, 26, 10]);

    // IHDR chunk
    let mut ihdr_data = Vec::with_capacity(13);
    ihdr_data.extend_from_slice(&width.to_be_bytes());
    ihdr_data.extend_from_slice(&height.to_be_bytes());
    ihdr_data.push(8); // bit depth
    ihdr_data.push(0); // color type 0 = grayscale
    ihdr_data.push(0); // compression method
    ihdr_data.push(0); // filter method
    ihdr_data.push(0); // interlace method
    write_chunk(&mut png, b"IHDR", &ihdr_data);

    // IDAT chunk (image data)
    let idat_data = deflate_idat_gray(samples, width as usize, height as usize)
        .map_err(|e| CatalogError::EncodingFailure(format!("IDAT compression failed: {}", e)))?;
    write_chunk(&mut png, b"IDAT", &idat_data);

    // IEND chunk
    write_chunk(&mut png, b"IEND", &[]);

    Ok(png)
}

/// Write a PNG chunk
fn write_chunk(png: &mut Vec<u8>, chunk_type: &[u8; 4], data: &[u8]) {
    png.extend_from_slice(&(data.len() as u32).to_be_bytes());
    png.extend_from_slice(chunk_type);
    png.extend_from_slice(data);

    let crc_data = [chunk_type.as_slice(), data].concat();
    let crc = crc32fast::hash(&crc_data);
    png.extend_from_slice(&crc.to_be_bytes());
}

/// Deflate grayscale image data for the IDAT chunk.
fn deflate_idat_gray(
    samples: &[u8],
    width: usize,
    height: usize,
) -> Result<Vec<u8>, std::io::Error> {
    // Each scanline is a filter byte (0 = none) followed by width samples
    let mut uncompressed = Vec::with_capacity(height * (1 + width));
    for y in 0..height {
        uncompressed.push(0); // filter type: none
        let row_start = y * width;
        uncompressed.extend_from_slice(&samples[row_start..row_start + width]);
    }

    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::fast());
    encoder.write_all(&uncompressed)?;
    encoder.finish()
}
