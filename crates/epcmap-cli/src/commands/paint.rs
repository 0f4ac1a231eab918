//! Paint command implementation

use super::load_config;
use crate::cli::PaintArgs;
use crate::loader::{load_footprints, load_polygon, parse_filters};
use crate::output::OutputWriter;
use crate::output_types::{LayerOutput, PaintEntry, PaintOutput};
use anyhow::{bail, Context, Result};
use epcmap_core::config::{parse_center, CliConfigOverrides, ConfigSource};
use epcmap_render::{HeadlessMapEngine, LayerPaint, MapViewer};
use epcmap_store::{MemoryBuildingSource, MemoryPreferenceStore};
use std::path::Path;

const VIEWPORT_WIDTH: f64 = 1280.0;
const VIEWPORT_HEIGHT: f64 = 800.0;

fn layer_output(layer: &LayerPaint) -> LayerOutput {
    LayerOutput {
        layer: layer.layer.to_string(),
        property: layer.property.to_string(),
        entries: layer
            .expression
            .entries()
            .iter()
            .map(|(feature_id, value)| PaintEntry {
                feature_id: feature_id.clone(),
                value: value.clone(),
            })
            .collect(),
        fallback: layer.expression.fallback().to_string(),
        expression: layer.expression.to_value(),
        filter: layer.filter.to_value(),
    }
}

pub async fn execute(args: PaintArgs, config_path: Option<&Path>, output: &OutputWriter) -> Result<()> {
    let center = args.center.as_deref().map(parse_center).transpose()?;
    let overrides = CliConfigOverrides {
        style: args.style.clone(),
        center,
        zoom: args.zoom,
        colour_blind: args.colour_blind.then_some(true),
    };
    let config = load_config(config_path, overrides)?;

    let source = MemoryBuildingSource::from_json_file(&args.buildings)
        .with_context(|| format!("Failed to load buildings from {}", args.buildings.display()))?;
    let footprints = load_footprints(&args.footprints)?;
    let filters = parse_filters(&args.filters)?;
    let polygon = args.polygon.as_deref().map(load_polygon).transpose()?;

    // Without an explicit center, frame every footprint
    let extent = footprints
        .iter()
        .filter_map(|f| f.to_rendered().bounds())
        .reduce(|acc, b| acc.union(&b))
        .filter(|_| config.center.source == ConfigSource::Default);

    let map_config = config.map_config();
    let engine =
        HeadlessMapEngine::new(VIEWPORT_WIDTH, VIEWPORT_HEIGHT).with_footprints(footprints);
    let mut viewer = MapViewer::new(
        engine,
        source,
        MemoryPreferenceStore::new(),
        map_config.clone(),
        config.colour_blind.value,
    );

    viewer.setup();
    viewer.style_loaded();
    if !viewer.session().is_created() {
        bail!("Map could not be created. Set a style with --style or EPCMAP_STYLE");
    }
    viewer.loaded();
    if let Some(extent) = extent {
        viewer.session_mut().fit_bounds(&extent).context("Failed to frame footprints")?;
    }

    if let Some(camera) = viewer.session().camera() {
        if camera.zoom < map_config.min_building_zoom {
            output.warn(format!(
                "Zoom {:.2} is below the building zoom {:.2}; no buildings are drawn",
                camera.zoom, map_config.min_building_zoom
            ));
        }
    }

    viewer.refresh().await?;
    if filters.is_active() {
        viewer.set_filters(filters);
    }
    if polygon.is_some() {
        viewer.set_spatial_filter(polygon);
    }

    let Some(compiled) = viewer.compiled() else {
        output.warn("No buildings in view; nothing to paint");
        return Ok(());
    };

    let result = PaintOutput {
        buildings: viewer.store().buildings().len(),
        visible_features: compiled.single.filter.ids.len() + compiled.multi.filter.ids.len(),
        filtered: viewer.is_filtered(),
        display_mode: format!("{:?}", viewer.palette().mode()),
        single: layer_output(&compiled.single),
        multi: layer_output(&compiled.multi),
    };

    if output.is_json() {
        return output.emit(result);
    }

    output.field("Buildings", result.buildings);
    output.field("Visible features", result.visible_features);
    output.field("Display mode", &result.display_mode);
    if result.filtered {
        output.note(format!("{} buildings match the active filters", viewer.ui().results.len()));
    }

    output.layer("Single-dwelling", &result.single);
    output.layer("Multi-dwelling", &result.multi);
    Ok(())
}
