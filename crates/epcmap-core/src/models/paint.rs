//! Paint and filter expressions handed to the map renderer.
//!
//! Both render to the renderer's JSON expression syntax:
//! `["match", ["get", prop], id, value, ..., fallback]` and
//! `["in", ["get", prop], ["literal", [ids...]]]`.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashSet;

/// Paint expressions shorter than this are treated as not ready yet.
/// An empty match expression (operator, input, fallback) falls below it.
pub const MIN_MATCH_EXPRESSION_LEN: usize = 4;

/// Feature property holding the topographic id in the building source
pub const FEATURE_ID_PROPERTY: &str = "TOID";

/// Per-feature match expression with a mandatory fallback
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchExpression {
    property: String,
    entries: Vec<(String, String)>,
    fallback: String,
    #[serde(skip)]
    seen: HashSet<String>,
}

impl MatchExpression {
    pub fn new(property: impl Into<String>, fallback: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            entries: Vec::new(),
            fallback: fallback.into(),
            seen: HashSet::new(),
        }
    }

    /// Append an entry unless the label is already present.
    ///
    /// Returns `false` when the label was a duplicate; the first output wins.
    pub fn push(&mut self, label: impl Into<String>, output: impl Into<String>) -> bool {
        let label = label.into();
        if !self.seen.insert(label.clone()) {
            return false;
        }
        self.entries.push((label, output.into()));
        true
    }

    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Output for a label, falling back like the renderer would
    pub fn resolve(&self, label: &str) -> &str {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, output)| output.as_str())
            .unwrap_or(&self.fallback)
    }

    pub fn to_value(&self) -> Value {
        let mut items = Vec::with_capacity(self.entries.len() * 2 + 3);
        items.push(json!("match"));
        items.push(json!(["get", self.property]));
        for (label, output) in &self.entries {
            items.push(json!(label));
            items.push(json!(output));
        }
        items.push(json!(self.fallback));
        Value::Array(items)
    }
}

/// Allow-list filter restricting a layer to a set of feature ids
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureFilter {
    pub property: String,
    pub ids: Vec<String>,
}

impl FeatureFilter {
    pub fn new(property: impl Into<String>, ids: Vec<String>) -> Self {
        Self { property: property.into(), ids }
    }

    /// Filter matching exactly one feature
    pub fn single(property: impl Into<String>, id: impl Into<String>) -> Self {
        Self::new(property, vec![id.into()])
    }

    /// Filter matching nothing
    pub fn none(property: impl Into<String>) -> Self {
        Self::new(property, Vec::new())
    }

    pub fn allows(&self, id: &str) -> bool {
        self.ids.iter().any(|i| i == id)
    }

    pub fn to_value(&self) -> Value {
        json!(["in", ["get", self.property], ["literal", self.ids]])
    }
}
