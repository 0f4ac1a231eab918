//! EPC Map Geo - Spatial algorithms and the spatial query engine
//!
//! This crate handles point-in-polygon and containment tests, bounding boxes in
//! geographic and screen space, footprint indexing, and the selection/search-area
//! state used to restrict which buildings are considered in view.

pub mod index;
pub mod models;
pub mod query;
pub mod spatial;

pub use index::{FootprintIndex, IndexedFootprint};
pub use models::{bounds_from_rect, footprint_polygon, to_geo_point, to_geo_polygon};
pub use query::{SpatialFilterState, SpatialQueryEngine};
pub use spatial::{feature_within_polygon, pixel_bounds, point_in_polygon, polygon_bounds};
