//! Port trait definitions
//!
//! These traits define the interfaces that adapters must implement.

pub mod data;
pub mod map;
pub mod storage;

pub use data::BuildingSource;
pub use map::{FeatureQuery, MapEngine, Projection};
pub use storage::PreferenceStore;
