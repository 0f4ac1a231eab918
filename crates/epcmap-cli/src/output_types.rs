use serde::Serialize;
use serde_json::Value;

/// Output for paint command
#[derive(Debug, Serialize)]
pub struct PaintOutput {
    pub buildings: usize,
    pub visible_features: usize,
    pub filtered: bool,
    pub display_mode: String,
    pub single: LayerOutput,
    pub multi: LayerOutput,
}

#[derive(Debug, Serialize)]
pub struct LayerOutput {
    pub layer: String,
    pub property: String,
    pub entries: Vec<PaintEntry>,
    pub fallback: String,
    /// Expression as handed to the renderer
    pub expression: Value,
    pub filter: Value,
}

#[derive(Debug, Serialize)]
pub struct PaintEntry {
    pub feature_id: String,
    pub value: String,
}

/// Output for rating command
#[derive(Debug, Serialize)]
pub struct RatingOutput {
    pub ratings: Vec<String>,
    pub mean: Option<String>,
    pub colour: String,
    pub pattern: String,
}

/// Output for config command
#[derive(Debug, Serialize)]
pub struct ConfigOutput {
    pub values: Vec<ConfigEntry>,
}

#[derive(Debug, Serialize)]
pub struct ConfigEntry {
    pub key: String,
    pub value: String,
    pub source: String,
}
