//! Coordinate reference transforms for footprint extraction.
//!
//! Pure Rust (proj4rs + crs-definitions, no GDAL). The canonical target for
//! catalog footprints is geographic longitude/latitude, EPSG:4326.

use geo_common::{BoundingBox, CatalogError, CatalogResult};

/// EPSG code of the canonical geographic reference used for footprints.
pub const GEOGRAPHIC_EPSG: u32 = 4326;

/// Get the PROJ4 string for an EPSG code from the crs-definitions database.
pub fn proj_string(epsg: u32) -> Option<&'static str> {
    u16::try_from(epsg)
        .ok()
        .and_then(crs_definitions::from_code)
        .map(|def| def.proj4)
}

/// Check if an EPSG code represents a geographic (lon/lat) reference.
pub fn is_geographic_crs(epsg: u32) -> bool {
    match proj_string(epsg) {
        Some(s) => s.contains("+proj=longlat"),
        None => epsg == GEOGRAPHIC_EPSG,
    }
}

/// Project a point between two EPSG coordinate references.
///
/// Identity when source and target match. proj4rs works in radians for
/// geographic references, so degrees are converted on the way in and out.
pub fn project_point(
    source_epsg: u32,
    target_epsg: u32,
    x: f64,
    y: f64,
) -> CatalogResult<(f64, f64)> {
    if source_epsg == target_epsg {
        return Ok((x, y));
    }

    let source_str = proj_string(source_epsg).ok_or_else(|| {
        CatalogError::InvalidCoordinateReference(format!(
            "EPSG:{} is not in the crs-definitions database",
            source_epsg
        ))
    })?;
    let target_str = proj_string(target_epsg).ok_or_else(|| {
        CatalogError::InvalidCoordinateReference(format!(
            "EPSG:{} is not in the crs-definitions database",
            target_epsg
        ))
    })?;

    let source_proj = proj4rs::proj::Proj::from_proj_string(source_str).map_err(|e| {
        CatalogError::InvalidCoordinateReference(format!(
            "Invalid source projection EPSG:{}: {:?}",
            source_epsg, e
        ))
    })?;
    let target_proj = proj4rs::proj::Proj::from_proj_string(target_str).map_err(|e| {
        CatalogError::InvalidCoordinateReference(format!(
            "Invalid target projection EPSG:{}: {:?}",
            target_epsg, e
        ))
    })?;

    let (x_in, y_in) = if is_geographic_crs(source_epsg) {
        (x.to_radians(), y.to_radians())
    } else {
        (x, y)
    };

    let mut point = (x_in, y_in, 0.0);
    proj4rs::transform::transform(&source_proj, &target_proj, &mut point).map_err(|e| {
        CatalogError::InvalidCoordinateReference(format!(
            "Transform from EPSG:{} to EPSG:{} failed: {:?}",
            source_epsg, target_epsg, e
        ))
    })?;

    let (out_x, out_y) = if is_geographic_crs(target_epsg) {
        (point.0.to_degrees(), point.1.to_degrees())
    } else {
        (point.0, point.1)
    };

    Ok((out_x, out_y))
}

/// Reproject a native bounding box into geographic longitude/latitude.
///
/// Projects the four corners and takes the envelope. Sufficient for the
/// axis-aligned footprints the catalog stores.
pub fn reproject_bounds(source_epsg: u32, bounds: BoundingBox) -> CatalogResult<BoundingBox> {
    if source_epsg == GEOGRAPHIC_EPSG {
        return Ok(bounds);
    }

    let mut west = f64::INFINITY;
    let mut south = f64::INFINITY;
    let mut east = f64::NEG_INFINITY;
    let mut north = f64::NEG_INFINITY;

    for (x, y) in bounds.corners() {
        let (lon, lat) = project_point(source_epsg, GEOGRAPHIC_EPSG, x, y)?;
        west = west.min(lon);
        south = south.min(lat);
        east = east.max(lon);
        north = north.max(lat);
    }

    let out = BoundingBox::new(west, south, east, north);
    if !out.is_valid() {
        return Err(CatalogError::InvalidCoordinateReference(format!(
            "Reprojected bounds from EPSG:{} are not finite",
            source_epsg
        )));
    }

    Ok(out)
}
