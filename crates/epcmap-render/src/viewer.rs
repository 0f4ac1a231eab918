//! Map viewer context.
//!
//! `MapViewer` owns one of each collaborator (session, spatial query engine,
//! building store, palette, compiler, selection machine) and is the only
//! writer to any of them. Every public operation runs to completion before
//! the next one starts, so readers never observe a half-applied update.

use epcmap_core::error::Result;
use epcmap_core::models::{
    AttributeFilters, BuildingRecord, FilterSummary, GeoBounds, MapConfig, MapEvent, SearchPolygon,
};
use epcmap_core::ports::{BuildingSource, FeatureQuery, MapEngine, PreferenceStore};
use epcmap_geo::SpatialQueryEngine;
use epcmap_store::{filter_within_viewport_and_polygon, BuildingStore, TopographicGrouping};

use crate::compiler::{CompiledPaint, PaintCompiler};
use crate::layers::FOOTPRINT_LAYER;
use crate::orchestrator::{Effect, Selection, SelectionEvent, SelectionOrchestrator};
use crate::palette::{DisplayMode, Palette};
use crate::session::MapSession;
use crate::ui::UiState;

/// Preference key holding the colour-blind flag
pub const COLOUR_BLIND_PREFERENCE: &str = "colourBlindMode";

pub struct MapViewer<E: MapEngine, S: BuildingSource, P: PreferenceStore> {
    config: MapConfig,
    session: MapSession<E>,
    spatial: SpatialQueryEngine,
    store: BuildingStore,
    filters: AttributeFilters,
    palette: Palette,
    compiler: PaintCompiler,
    selection: SelectionOrchestrator,
    ui: UiState,
    source: S,
    preferences: P,
}

impl<E: MapEngine, S: BuildingSource, P: PreferenceStore> MapViewer<E, S, P> {
    /// Build a viewer. The stored colour-blind preference wins over
    /// `colour_blind` when present and valid.
    pub fn new(engine: E, source: S, preferences: P, config: MapConfig, colour_blind: bool) -> Self {
        let colour_blind = match preferences.get(COLOUR_BLIND_PREFERENCE) {
            Ok(Some(value)) => match value.as_str() {
                "true" => true,
                "false" => false,
                other => {
                    tracing::warn!(value = other, "invalid colour-blind preference, ignoring");
                    colour_blind
                }
            },
            Ok(None) => colour_blind,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read colour-blind preference");
                colour_blind
            }
        };
        let mode = DisplayMode::from_colour_blind(colour_blind);

        Self {
            config,
            session: MapSession::new(engine),
            spatial: SpatialQueryEngine::new(),
            store: BuildingStore::new(),
            filters: AttributeFilters::new(),
            palette: Palette::new(mode),
            compiler: PaintCompiler::new(),
            selection: SelectionOrchestrator::new(),
            ui: UiState { display_mode: mode, ..Default::default() },
            source,
            preferences,
        }
    }

    pub fn setup(&mut self) {
        self.session.setup(&self.config);
    }

    /// Engine reported the style as loaded
    pub fn style_loaded(&mut self) {
        self.session.notify_style_loaded(&self.palette);
    }

    /// Engine reported the map as fully loaded
    pub fn loaded(&mut self) {
        self.session.notify_loaded();
        self.recompute_paint();
    }

    pub fn destroy(&mut self) {
        self.session.destroy();
    }

    pub fn session(&self) -> &MapSession<E> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut MapSession<E> {
        &mut self.session
    }

    pub fn spatial(&self) -> &SpatialQueryEngine {
        &self.spatial
    }

    pub fn store(&self) -> &BuildingStore {
        &self.store
    }

    pub fn filters(&self) -> &AttributeFilters {
        &self.filters
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn compiled(&self) -> Option<&CompiledPaint> {
        self.compiler.current()
    }

    pub fn selection(&self) -> &Selection {
        self.selection.state()
    }

    pub fn ui(&self) -> &UiState {
        &self.ui
    }

    /// Whether an attribute or spatial filter is narrowing the view
    pub fn is_filtered(&self) -> bool {
        self.filters.is_active() || self.spatial.is_filter_active()
    }

    /// Fetch the buildings for the current viewport and replace the store.
    ///
    /// Without a viewport there is nothing to fetch. A failed fetch keeps the
    /// previous dataset; paint is recomputed either way.
    pub async fn refresh(&mut self) -> Result<()> {
        let Some(bounds) = self.session.viewport_bounds() else {
            tracing::debug!("no viewport yet, skipping refresh");
            return Ok(());
        };
        let result = match self.source.fetch_buildings(&bounds).await {
            Ok(buildings) => {
                self.store.set_buildings(buildings);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "building fetch failed");
                Err(e)
            }
        };
        self.recompute_paint();
        result
    }

    /// Replace the dataset directly and recompute paint
    pub fn set_buildings(&mut self, buildings: Vec<BuildingRecord>) {
        self.store.set_buildings(buildings);
        self.recompute_paint();
    }

    /// Candidate filter values for the current viewport
    pub async fn filter_summary(&self) -> Result<FilterSummary> {
        match self.session.viewport_bounds() {
            Some(bounds) => self.source.fetch_filter_summary(&bounds).await,
            None => Ok(FilterSummary::new()),
        }
    }

    /// Buildings passing the attribute filters, restricted to rendered
    /// features inside the search area
    pub fn visible(&self) -> TopographicGrouping {
        let area = self.spatial.pixel_bounds();
        let rendered = self.session.rendered_features(area.as_ref(), &[FOOTPRINT_LAYER]);
        filter_within_viewport_and_polygon(
            &self.store.filtered(&self.filters),
            &rendered,
            self.spatial.filter_polygon(),
            !self.filters.is_active(),
        )
    }

    /// Number of paint compilations applied to the map
    pub fn paint_revision(&self) -> u64 {
        self.compiler.revision()
    }

    /// Recompile paint for the visible set and sync the results panel.
    ///
    /// When the compiler keeps the current paint (empty store) the results
    /// panel is left as it is too.
    pub fn recompute_paint(&mut self) -> Option<&CompiledPaint> {
        if !self.session.is_created() {
            return None;
        }
        let visible = self.visible();
        let filtered = self.is_filtered();
        let compiled =
            self.compiler.recompute(&self.store, &visible, &self.palette, &mut self.session)?;
        if filtered {
            self.ui.results =
                visible.iter().flat_map(|(_, buildings)| buildings).map(|b| b.uprn.clone()).collect();
        } else if self.selection.state() == &Selection::Idle {
            self.ui.results.clear();
        }
        Some(compiled)
    }

    /// React to an engine event after re-emitting it to subscribers
    pub async fn handle_event(&mut self, event: MapEvent) -> Result<()> {
        self.session.emit(event.clone());
        match event {
            MapEvent::MoveEnd { zoom, .. } => {
                tracing::debug!(zoom, "viewport changed");
                self.spatial.refresh_pixel_bounds(&self.session);
                if let Some(feature_id) = self.selection.selected_feature().map(str::to_string) {
                    let in_view = self
                        .session
                        .rendered_features(None, &[FOOTPRINT_LAYER])
                        .iter()
                        .any(|f| f.id == feature_id);
                    if !in_view {
                        self.dispatch(SelectionEvent::ViewInvalidated);
                    }
                }
                self.refresh().await
            }
            MapEvent::Click { feature_id: Some(feature_id), .. } => {
                let uprns = self
                    .store
                    .buildings_for(&feature_id)
                    .iter()
                    .filter(|b| self.filters.matches(b))
                    .map(|b| b.uprn.clone())
                    .collect();
                self.dispatch(SelectionEvent::FeatureClicked { feature_id, uprns });
                Ok(())
            }
            MapEvent::Click { feature_id: None, .. } => {
                self.dispatch(SelectionEvent::BackgroundClicked);
                Ok(())
            }
            MapEvent::Hover { .. } | MapEvent::HoverEnd => Ok(()),
        }
    }

    /// Select a building from its results card; unknown references are ignored
    pub fn select_card(&mut self, uprn: &str) {
        let Some(building) = self.store.building(uprn) else {
            tracing::debug!(uprn, "card for unknown building");
            return;
        };
        let event = SelectionEvent::CardClicked {
            uprn: building.uprn.clone(),
            feature_id: building.feature_id().to_string(),
        };
        self.dispatch(event);
    }

    pub fn close_details(&mut self) {
        self.dispatch(SelectionEvent::CloseDetails);
    }

    pub fn close_multi_dwelling(&mut self) {
        self.dispatch(SelectionEvent::CloseMultiDwelling);
    }

    pub fn set_filters(&mut self, filters: AttributeFilters) {
        self.filters = filters;
        self.dispatch(SelectionEvent::ViewInvalidated);
        self.recompute_paint();
    }

    /// Set the search area, or clear it softly with `None`
    pub fn set_spatial_filter(&mut self, polygon: Option<SearchPolygon>) {
        self.spatial.set_filter_polygon(polygon, &self.session);
        self.dispatch(SelectionEvent::ViewInvalidated);
        self.recompute_paint();
    }

    /// Delete the search area and reset all selection state
    pub fn delete_spatial_filter(&mut self) {
        self.spatial.set_filter_polygon(None, &self.session);
        self.dispatch(SelectionEvent::SpatialFilterDeleted);
        self.recompute_paint();
    }

    /// Switch display mode, persist it, and repaint
    pub fn set_colour_blind(&mut self, colour_blind: bool) {
        let mode = DisplayMode::from_colour_blind(colour_blind);
        self.palette.set_mode(mode);
        self.ui.display_mode = mode;
        if let Err(e) = self.preferences.set(COLOUR_BLIND_PREFERENCE, &colour_blind.to_string()) {
            tracing::warn!(error = %e, "failed to persist colour-blind preference");
        }
        self.recompute_paint();
    }

    /// Fit the camera to a rendered feature.
    ///
    /// Fails with `FeatureNotFound` when the feature is not rendered.
    pub fn zoom_to_feature(&mut self, feature_id: &str) -> Result<GeoBounds> {
        let bounds =
            self.spatial.feature_bounding_box(feature_id, &self.session, &[FOOTPRINT_LAYER])?;
        self.session.fit_bounds(&bounds)?;
        Ok(bounds)
    }

    fn dispatch(&mut self, event: SelectionEvent) {
        let filtered = self.is_filtered();
        for effect in self.selection.handle(event, filtered) {
            match &effect {
                Effect::HighlightFeature(id) => {
                    self.session.highlight(Some(id));
                    self.spatial.set_selected_feature(id);
                }
                Effect::ClearHighlight => {
                    self.session.highlight(None);
                    self.spatial.set_selected_feature("");
                }
                _ => {}
            }
            self.ui.apply(&effect);
        }
    }
}
