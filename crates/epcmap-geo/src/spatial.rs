use epcmap_core::models::{GeoBounds, LngLat, PixelBounds, RenderedFeature, SearchPolygon};
use epcmap_core::ports::Projection;
use geo::algorithm::bounding_rect::BoundingRect;
use geo::algorithm::contains::Contains;

use crate::models::{bounds_from_rect, footprint_polygon, to_geo_point, to_geo_polygon};

/// Planar point-in-polygon test.
///
/// Points lying exactly on the polygon boundary are not contained: the test
/// is strict interior containment, the same rule `geo::Contains` applies.
pub fn point_in_polygon(point: LngLat, polygon: &SearchPolygon) -> bool {
    to_geo_polygon(polygon).contains(&to_geo_point(point))
}

/// Geographic bounding box of a polygon
pub fn polygon_bounds(polygon: &SearchPolygon) -> Option<GeoBounds> {
    to_geo_polygon(polygon).bounding_rect().map(|rect| bounds_from_rect(&rect))
}

/// Check that a rendered feature's footprint lies inside the polygon.
///
/// Features without a usable footprint are never inside.
pub fn feature_within_polygon(feature: &RenderedFeature, polygon: &SearchPolygon) -> bool {
    let Some(footprint) = footprint_polygon(&feature.footprint) else {
        return false;
    };
    to_geo_polygon(polygon).contains(&footprint)
}

/// Project a geographic box to screen space under the current camera.
///
/// All four corners are projected so a rotated camera still yields an
/// enclosing box. `None` when the projection is unavailable.
pub fn pixel_bounds<P: Projection + ?Sized>(bounds: &GeoBounds, projection: &P) -> Option<PixelBounds> {
    let corners = bounds
        .corners()
        .iter()
        .map(|corner| projection.project(*corner))
        .collect::<Option<Vec<_>>>()?;
    PixelBounds::from_points(&corners)
}
