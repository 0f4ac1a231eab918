pub mod building;
pub mod epc;
pub mod filter;
pub mod geometry;
pub mod map;
pub mod paint;

pub use building::{BuildingAttributes, BuildingRecord, FlagStatus};
pub use epc::EpcRating;
pub use filter::{AttributeFilters, FilterKey, FilterSummary};
pub use geometry::{GeoBounds, LngLat, PixelBounds, PixelPoint, SearchPolygon};
pub use map::{
    CameraOptions, ImagePattern, LayerKind, LayerSpec, MapConfig, MapEvent, RenderedFeature,
    SourceSpec,
};
pub use paint::{FeatureFilter, MatchExpression, FEATURE_ID_PROPERTY, MIN_MATCH_EXPRESSION_LEN};
