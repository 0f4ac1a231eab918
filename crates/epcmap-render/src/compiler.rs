//! Paint-expression compiler.
//!
//! Turns the visible building grouping into one match expression and one
//! allow-list filter per building layer. Features with zero or one dwelling
//! go to the single-dwelling layer and are coloured; features with two or
//! more go to the multi-dwelling layer and are patterned.

use epcmap_core::models::{
    EpcRating, FeatureFilter, MatchExpression, FEATURE_ID_PROPERTY,
};
use epcmap_core::ports::MapEngine;
use epcmap_store::{BuildingStore, TopographicGrouping};

use crate::layers::{COLOUR_PROPERTY, MULTI_DWELLING_LAYER, PATTERN_PROPERTY, SINGLE_DWELLING_LAYER};
use crate::palette::Palette;
use crate::session::MapSession;

/// Paint property and filter for one layer
#[derive(Debug, Clone, PartialEq)]
pub struct LayerPaint {
    pub layer: &'static str,
    pub property: &'static str,
    pub expression: MatchExpression,
    pub filter: FeatureFilter,
}

impl LayerPaint {
    fn new(layer: &'static str, property: &'static str, fallback: String) -> Self {
        Self {
            layer,
            property,
            expression: MatchExpression::new(FEATURE_ID_PROPERTY, fallback),
            filter: FeatureFilter::none(FEATURE_ID_PROPERTY),
        }
    }

    fn add(&mut self, feature_id: &str, output: String) {
        if self.expression.push(feature_id, output) {
            self.filter.ids.push(feature_id.to_string());
        }
    }
}

/// Compiled state for both building layers
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledPaint {
    pub single: LayerPaint,
    pub multi: LayerPaint,
}

impl CompiledPaint {
    pub fn layers(&self) -> [&LayerPaint; 2] {
        [&self.single, &self.multi]
    }
}

/// Compile paint expressions for a grouping, in ascending feature-id order
pub fn compile(grouping: &TopographicGrouping, palette: &Palette) -> CompiledPaint {
    let mut single =
        LayerPaint::new(SINGLE_DWELLING_LAYER, COLOUR_PROPERTY, palette.default_colour().to_string());
    let mut multi = LayerPaint::new(MULTI_DWELLING_LAYER, PATTERN_PROPERTY, palette.default_pattern());

    for (feature_id, buildings) in grouping.iter() {
        match buildings {
            [] => single.add(feature_id, palette.default_colour().to_string()),
            [building] => {
                let output = match building.epc {
                    Some(rating) => palette.colour_for(Some(rating)).to_string(),
                    None => palette.default_pattern(),
                };
                single.add(feature_id, output);
            }
            _ => {
                let ratings: Vec<EpcRating> = buildings.iter().filter_map(|b| b.epc).collect();
                multi.add(feature_id, palette.pattern_for(&ratings));
            }
        }
    }

    CompiledPaint { single, multi }
}

/// Holds the last compiled paint and pushes new compilations to the map
#[derive(Debug, Default)]
pub struct PaintCompiler {
    current: Option<CompiledPaint>,
    revision: u64,
}

impl PaintCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&CompiledPaint> {
        self.current.as_ref()
    }

    /// Number of compilations applied so far
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Recompile and apply to the map.
    ///
    /// Does nothing while the building store is empty, so a transient empty
    /// state never wipes an already-correct render.
    pub fn recompute<E: MapEngine>(
        &mut self,
        store: &BuildingStore,
        visible: &TopographicGrouping,
        palette: &Palette,
        session: &mut MapSession<E>,
    ) -> Option<&CompiledPaint> {
        if store.is_empty() {
            tracing::debug!("building store empty, keeping current paint");
            return None;
        }

        let compiled = compile(visible, palette);
        self.revision += 1;
        tracing::debug!(
            revision = self.revision,
            single = compiled.single.filter.ids.len(),
            multi = compiled.multi.filter.ids.len(),
            "paint recompiled"
        );
        let compiled = self.current.insert(compiled);

        for layer in compiled.layers() {
            session.filter_layer(layer.layer, &layer.filter.to_value());
            session.set_layer_paint(layer.layer, layer.property, &layer.expression.to_value());
        }

        Some(compiled)
    }
}
