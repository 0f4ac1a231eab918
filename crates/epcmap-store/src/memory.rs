//! In-memory adapters for development and testing.
//!
//! These implementations use `RwLock::unwrap()` intentionally. Lock poisoning
//! only occurs when another thread panicked while holding the lock, which is
//! an unrecoverable state.

use async_trait::async_trait;
use epcmap_core::error::{EpcMapError, Result};
use epcmap_core::models::{BuildingRecord, FilterSummary, GeoBounds};
use epcmap_core::ports::{BuildingSource, PreferenceStore};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use crate::summary::summarise_filters;

/// In-memory implementation of BuildingSource backed by a fixed dataset
#[derive(Debug, Clone, Default)]
pub struct MemoryBuildingSource {
    buildings: Arc<RwLock<Vec<BuildingRecord>>>,
    unavailable: Arc<RwLock<Option<String>>>,
    fetches: Arc<AtomicUsize>,
}

impl MemoryBuildingSource {
    /// Create a source serving the given buildings
    pub fn new(buildings: Vec<BuildingRecord>) -> Self {
        Self { buildings: Arc::new(RwLock::new(buildings)), ..Default::default() }
    }

    /// Load buildings from a JSON array file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let buildings: Vec<BuildingRecord> = serde_json::from_str(&content)?;
        Ok(Self::new(buildings))
    }

    /// Replace the served dataset
    pub fn replace(&self, buildings: Vec<BuildingRecord>) {
        *self.buildings.write().unwrap() = buildings;
    }

    /// Make subsequent fetches fail with the given reason; `None` restores service
    pub fn set_unavailable(&self, reason: Option<String>) {
        *self.unavailable.write().unwrap() = reason;
    }

    /// Number of fetch calls served or refused so far
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    fn within(&self, bounds: &GeoBounds) -> Result<Vec<BuildingRecord>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = self.unavailable.read().unwrap().clone() {
            return Err(EpcMapError::DataSource { reason });
        }
        let buildings = self.buildings.read().unwrap();
        Ok(buildings.iter().filter(|b| bounds.contains(b.location)).cloned().collect())
    }
}

#[async_trait]
impl BuildingSource for MemoryBuildingSource {
    async fn fetch_buildings(&self, bounds: &GeoBounds) -> Result<Vec<BuildingRecord>> {
        self.within(bounds)
    }

    async fn fetch_filter_summary(&self, bounds: &GeoBounds) -> Result<FilterSummary> {
        Ok(summarise_filters(&self.within(bounds)?))
    }
}

/// In-memory implementation of PreferenceStore
#[derive(Debug, Clone, Default)]
pub struct MemoryPreferenceStore {
    values: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.read().unwrap().get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.write().unwrap().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use epcmap_core::models::{FilterKey, LngLat};

    fn building(uprn: &str, lng: f64, lat: f64) -> BuildingRecord {
        BuildingRecord {
            uprn: uprn.to_string(),
            parent_toid: format!("F{}", uprn),
            toid: None,
            address: String::new(),
            epc: None,
            postcode: format!("PO{}", uprn),
            attributes: Default::default(),
            location: LngLat::new(lng, lat),
            flag: Default::default(),
            assessed_on: None,
        }
    }

    fn bounds() -> GeoBounds {
        GeoBounds::new(LngLat::new(0.0, 0.0), LngLat::new(1.0, 1.0))
    }

    #[tokio::test]
    async fn test_fetch_within_bounds() {
        let source = MemoryBuildingSource::new(vec![
            building("1", 0.5, 0.5),
            building("2", 5.0, 5.0),
        ]);
        let fetched = source.fetch_buildings(&bounds()).await.unwrap();
        assert_eq!(fetched.len(), 1);
        assert_eq!(fetched[0].uprn, "1");
        assert_eq!(source.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_filter_summary_within_bounds() {
        let source = MemoryBuildingSource::new(vec![
            building("1", 0.5, 0.5),
            building("2", 5.0, 5.0),
        ]);
        let summary = source.fetch_filter_summary(&bounds()).await.unwrap();
        assert_eq!(summary[&FilterKey::Postcode], vec!["PO1"]);
    }

    #[tokio::test]
    async fn test_unavailable_source_fails() {
        let source = MemoryBuildingSource::new(vec![building("1", 0.5, 0.5)]);
        source.set_unavailable(Some("backend down".to_string()));
        let result = source.fetch_buildings(&bounds()).await;
        assert!(matches!(result, Err(EpcMapError::DataSource { .. })));

        source.set_unavailable(None);
        assert_eq!(source.fetch_buildings(&bounds()).await.unwrap().len(), 1);
    }

    #[test]
    fn test_preferences_round_trip() {
        let mut prefs = MemoryPreferenceStore::new();
        assert_eq!(prefs.get("colourBlindMode").unwrap(), None);
        prefs.set("colourBlindMode", "true").unwrap();
        assert_eq!(prefs.get("colourBlindMode").unwrap().as_deref(), Some("true"));
    }
}
