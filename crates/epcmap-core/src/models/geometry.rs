//! Geographic and screen-space primitives shared by all epcmap crates.

use serde::{Deserialize, Serialize};

use crate::error::{EpcMapError, Result};

/// A WGS 84 position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

impl LngLat {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }
}

/// Geographic bounding box (west/south to east/north)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub south_west: LngLat,
    pub north_east: LngLat,
}

impl GeoBounds {
    pub fn new(south_west: LngLat, north_east: LngLat) -> Self {
        Self { south_west, north_east }
    }

    /// Smallest box covering both inputs
    pub fn union(&self, other: &GeoBounds) -> GeoBounds {
        GeoBounds {
            south_west: LngLat::new(
                self.south_west.lng.min(other.south_west.lng),
                self.south_west.lat.min(other.south_west.lat),
            ),
            north_east: LngLat::new(
                self.north_east.lng.max(other.north_east.lng),
                self.north_east.lat.max(other.north_east.lat),
            ),
        }
    }

    pub fn contains(&self, point: LngLat) -> bool {
        point.lng >= self.south_west.lng
            && point.lng <= self.north_east.lng
            && point.lat >= self.south_west.lat
            && point.lat <= self.north_east.lat
    }

    pub fn center(&self) -> LngLat {
        LngLat::new(
            (self.south_west.lng + self.north_east.lng) / 2.0,
            (self.south_west.lat + self.north_east.lat) / 2.0,
        )
    }

    /// The four corners, counter-clockwise from south-west
    pub fn corners(&self) -> [LngLat; 4] {
        [
            self.south_west,
            LngLat::new(self.north_east.lng, self.south_west.lat),
            self.north_east,
            LngLat::new(self.south_west.lng, self.north_east.lat),
        ]
    }
}

/// A position in screen pixels, origin top-left
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Screen-space bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelBounds {
    pub min: PixelPoint,
    pub max: PixelPoint,
}

impl PixelBounds {
    /// Bounding box of a set of pixel points; `None` when empty
    pub fn from_points(points: &[PixelPoint]) -> Option<Self> {
        let first = points.first()?;
        let mut min = *first;
        let mut max = *first;
        for p in &points[1..] {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        Some(Self { min, max })
    }
}

/// User-drawn search area: a single closed ring of positions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<LngLat>", into = "Vec<LngLat>")]
pub struct SearchPolygon {
    ring: Vec<LngLat>,
}

impl SearchPolygon {
    /// Build a polygon from a ring, closing it if the last point does not
    /// repeat the first. Needs at least three distinct positions.
    pub fn new(mut ring: Vec<LngLat>) -> Result<Self> {
        if ring.len() > 1 && ring.first() == ring.last() {
            ring.pop();
        }
        if ring.len() < 3 {
            return Err(EpcMapError::InvalidPolygon {
                reason: format!("a ring needs at least 3 positions, got {}", ring.len()),
            });
        }
        if ring.iter().any(|p| !p.lng.is_finite() || !p.lat.is_finite()) {
            return Err(EpcMapError::InvalidPolygon {
                reason: "ring contains non-finite coordinates".to_string(),
            });
        }
        let first = ring[0];
        ring.push(first);
        Ok(Self { ring })
    }

    /// Closed ring; the last position equals the first
    pub fn ring(&self) -> &[LngLat] {
        &self.ring
    }
}

impl From<SearchPolygon> for Vec<LngLat> {
    fn from(polygon: SearchPolygon) -> Self {
        polygon.ring
    }
}

impl TryFrom<Vec<LngLat>> for SearchPolygon {
    type Error = EpcMapError;

    fn try_from(ring: Vec<LngLat>) -> Result<Self> {
        Self::new(ring)
    }
}
