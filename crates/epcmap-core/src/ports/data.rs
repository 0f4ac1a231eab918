use async_trait::async_trait;

use crate::error::Result;
use crate::models::{BuildingRecord, FilterSummary, GeoBounds};

/// Port for the building data-fetch layer.
///
/// Each call returns a complete replacement for the area, never a patch.
#[async_trait]
pub trait BuildingSource: Send + Sync {
    /// All buildings whose location falls inside `bounds`
    async fn fetch_buildings(&self, bounds: &GeoBounds) -> Result<Vec<BuildingRecord>>;

    /// Candidate filter values for buildings inside `bounds`
    async fn fetch_filter_summary(&self, bounds: &GeoBounds) -> Result<FilterSummary>;
}
