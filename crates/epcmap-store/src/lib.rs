//! EPC Map Store - Building grouping store and in-memory adapters
//!
//! This crate holds the authoritative building set grouped by topographic
//! feature id, the pure filters that derive views of it, and in-memory
//! implementations of the data-fetch and preference ports.

pub mod grouping;
pub mod memory;
pub mod summary;

pub use grouping::{
    filter_by_attributes, filter_within_viewport_and_polygon, group_by_feature, BuildingStore,
    TopographicGrouping,
};
pub use memory::{MemoryBuildingSource, MemoryPreferenceStore};
pub use summary::summarise_filters;
