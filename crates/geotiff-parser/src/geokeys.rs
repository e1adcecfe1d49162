//! GeoKey directory parsing.
//!
//! The GeoKeyDirectory tag is a flat array of u16: a 4-value header
//! (version, revision, minor revision, key count) followed by one
//! 4-value entry per key (key id, tag location, count, value).
//! A tag location of 0 means the value is stored inline in the entry.

use geo_common::{CatalogError, CatalogResult};

// GeoKey IDs
const GT_MODEL_TYPE: u16 = 1024;
const GEOGRAPHIC_TYPE: u16 = 2048;
const PROJECTED_CS_TYPE: u16 = 3072;

// GTModelType values
const MODEL_TYPE_PROJECTED: u16 = 1;
const MODEL_TYPE_GEOGRAPHIC: u16 = 2;

// Sentinel for "user-defined", which carries no resolvable EPSG code
const USER_DEFINED: u16 = 32767;

/// Resolve the EPSG code a GeoKey directory declares.
///
/// Geographic rasters carry it in GeographicType, projected rasters in
/// ProjectedCSType. Anything else (geocentric model, user-defined codes,
/// missing keys) is an unusable coordinate reference.
pub fn epsg_from_geokeys(keys: &[u16]) -> CatalogResult<u32> {
    if keys.len() < 4 {
        return Err(CatalogError::InvalidCoordinateReference(
            "GeoKey directory too short".to_string(),
        ));
    }

    let key_count = keys[3] as usize;
    let entries = &keys[4..];
    if entries.len() < key_count * 4 {
        return Err(CatalogError::InvalidCoordinateReference(
            "GeoKey directory truncated".to_string(),
        ));
    }

    let inline_value = |wanted: u16| -> Option<u16> {
        entries.chunks_exact(4).take(key_count).find_map(|entry| {
            // entry = [key id, tag location, count, value]
            (entry[0] == wanted && entry[1] == 0).then_some(entry[3])
        })
    };

    let model_type = inline_value(GT_MODEL_TYPE).ok_or_else(|| {
        CatalogError::InvalidCoordinateReference("GeoKey directory has no model type".to_string())
    })?;

    let (code_key, key_name) = match model_type {
        MODEL_TYPE_GEOGRAPHIC => (GEOGRAPHIC_TYPE, "GeographicType"),
        MODEL_TYPE_PROJECTED => (PROJECTED_CS_TYPE, "ProjectedCSType"),
        other => {
            return Err(CatalogError::InvalidCoordinateReference(format!(
                "Unsupported model type {} (only geographic and projected)",
                other
            )))
        }
    };

    let code = inline_value(code_key).ok_or_else(|| {
        CatalogError::InvalidCoordinateReference(format!("GeoKey {} is missing", key_name))
    })?;

    if code == USER_DEFINED || code == 0 {
        return Err(CatalogError::InvalidCoordinateReference(format!(
            "GeoKey {} is user-defined, no EPSG code to resolve",
            key_name
        )));
    }

    Ok(code as u32)
}
