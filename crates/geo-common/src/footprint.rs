//! Geographic footprint polygons.

use serde::{Deserialize, Serialize};

use crate::bbox::BoundingBox;

/// A closed 5-point polygon (first point equals last) bounding a raster's
/// coverage in geographic longitude/latitude.
///
/// The ring runs (west,south), (east,south), (east,north), (west,north),
/// (west,south).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Footprint {
    points: [(f64, f64); 5],
}

impl Footprint {
    /// Build the closed ring from a geographic bounding box.
    pub fn from_bbox(bbox: &BoundingBox) -> Self {
        Self {
            points: [
                (bbox.west, bbox.south),
                (bbox.east, bbox.south),
                (bbox.east, bbox.north),
                (bbox.west, bbox.north),
                (bbox.west, bbox.south),
            ],
        }
    }

    /// The ring vertices, closing point included.
    pub fn points(&self) -> &[(f64, f64); 5] {
        &self.points
    }

    /// Whether the ring is closed (first point equals last).
    pub fn is_closed(&self) -> bool {
        self.points[0] == self.points[4]
    }

    /// Render as WKT suitable for `ST_GeomFromText(..., 4326)`.
    pub fn to_wkt(&self) -> String {
        let ring = self
            .points
            .iter()
            .map(|(x, y)| format!("{} {}", x, y))
            .collect::<Vec<_>>()
            .join(", ");
        format!("POLYGON(({}))", ring)
    }

    /// Recover the axis-aligned bounding box of the ring.
    pub fn bbox(&self) -> BoundingBox {
        BoundingBox::new(
            self.points[0].0,
            self.points[0].1,
            self.points[2].0,
            self.points[2].1,
        )
    }
}
