//! Conversions between epcmap geometry primitives and the `geo` crate.

use epcmap_core::models::{GeoBounds, LngLat, SearchPolygon};
use geo::{Coord, LineString, Point, Polygon, Rect};

pub fn to_geo_coord(position: LngLat) -> Coord {
    Coord { x: position.lng, y: position.lat }
}

pub fn to_geo_point(position: LngLat) -> Point {
    Point::from(to_geo_coord(position))
}

/// Convert a search polygon to a `geo::Polygon` without holes
pub fn to_geo_polygon(polygon: &SearchPolygon) -> Polygon {
    ring_polygon(polygon.ring())
}

/// Convert a footprint ring; `None` when it cannot enclose an area
pub fn footprint_polygon(footprint: &[LngLat]) -> Option<Polygon> {
    if footprint.len() < 3 {
        return None;
    }
    Some(ring_polygon(footprint))
}

fn ring_polygon(ring: &[LngLat]) -> Polygon {
    // LineString -> Polygon closes the ring if needed
    let exterior: LineString = ring.iter().map(|p| to_geo_coord(*p)).collect();
    Polygon::new(exterior, vec![])
}

pub fn bounds_from_rect(rect: &Rect) -> GeoBounds {
    GeoBounds::new(
        LngLat::new(rect.min().x, rect.min().y),
        LngLat::new(rect.max().x, rect.max().y),
    )
}
