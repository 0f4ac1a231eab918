use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{EpcRating, LngLat};

/// Immutable snapshot of a single dwelling as delivered by the data-fetch layer.
///
/// Records are never edited in place: a refetch replaces the whole set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingRecord {
    /// Unique property reference
    pub uprn: String,

    /// Topographic feature id of the footprint this dwelling belongs to
    pub parent_toid: String,

    /// Topographic feature id of the dwelling itself, when it has its own footprint
    #[serde(default)]
    pub toid: Option<String>,

    /// Display address
    #[serde(default)]
    pub address: String,

    #[serde(default, with = "optional_rating")]
    pub epc: Option<EpcRating>,

    #[serde(default)]
    pub postcode: String,

    #[serde(default)]
    pub attributes: BuildingAttributes,

    pub location: LngLat,

    #[serde(default)]
    pub flag: FlagStatus,

    #[serde(default)]
    pub assessed_on: Option<NaiveDate>,
}

impl BuildingRecord {
    /// Feature id used to group and paint this dwelling
    pub fn feature_id(&self) -> &str {
        self.toid.as_deref().unwrap_or(&self.parent_toid)
    }

    pub fn is_flagged(&self) -> bool {
        self.flag.flagged
    }

    /// Year of the most recent assessment, if any
    pub fn year_of_assessment(&self) -> Option<i32> {
        use chrono::Datelike;
        self.assessed_on.map(|d| d.year())
    }
}

/// Construction and insulation attributes.
///
/// Values are the enumerated labels published by the backend; a missing value
/// means the attribute was not recorded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingAttributes {
    pub built_form: Option<String>,
    pub construction_age_band: Option<String>,
    pub wall_construction: Option<String>,
    pub wall_insulation: Option<String>,
    pub floor_construction: Option<String>,
    pub floor_insulation: Option<String>,
    pub roof_construction: Option<String>,
    pub roof_insulation_location: Option<String>,
    pub roof_insulation_thickness: Option<String>,
    pub window_glazing: Option<String>,
}

/// Flag state of a property
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagStatus {
    pub flagged: bool,
    pub reason: Option<String>,
}

/// Serde adapter accepting `"A".."G"`, `"none"` or null for an optional rating
mod optional_rating {
    use super::EpcRating;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<EpcRating>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(rating) => serializer.serialize_str(rating.label()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<EpcRating>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let label: Option<String> = Option::deserialize(deserializer)?;
        Ok(label.as_deref().and_then(EpcRating::from_label))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_id_prefers_own_toid() {
        let json = r#"{
            "uprn": "100",
            "parent_toid": "osgb1",
            "toid": "osgb2",
            "epc": "b",
            "location": { "lng": -1.3, "lat": 50.7 }
        }"#;
        let record: BuildingRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.feature_id(), "osgb2");
        assert_eq!(record.epc, Some(EpcRating::B));
    }

    #[test]
    fn test_none_rating_deserializes_to_missing() {
        let json = r#"{
            "uprn": "101",
            "parent_toid": "osgb1",
            "epc": "none",
            "assessed_on": "2019-04-02",
            "location": { "lng": -1.3, "lat": 50.7 }
        }"#;
        let record: BuildingRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.feature_id(), "osgb1");
        assert_eq!(record.epc, None);
        assert_eq!(record.year_of_assessment(), Some(2019));
        assert!(!record.is_flagged());
    }
}
