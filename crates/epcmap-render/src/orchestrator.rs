//! Selection and details-panel state machine.
//!
//! Transitions return the UI effects they imply instead of performing them,
//! so every guard and side effect is visible in one place. Several guards
//! depend on whether an attribute or spatial filter is active: with a filter
//! the results panel already lists the filtered buildings and is left alone.

use serde::Serialize;

/// Current selection; the variants are mutually exclusive
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Selection {
    #[default]
    Idle,
    SingleSelected { uprn: String, feature_id: String },
    MultiSelected { feature_id: String },
}

/// Inputs to the state machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionEvent {
    /// Click on a building feature; `uprns` are the feature's dwellings in view
    FeatureClicked { feature_id: String, uprns: Vec<String> },
    /// Click on a results card
    CardClicked { uprn: String, feature_id: String },
    /// Click on the map away from any building
    BackgroundClicked,
    CloseDetails,
    CloseMultiDwelling,
    /// Viewport or filters changed in a way that drops the selection
    ViewInvalidated,
    /// The drawn search area was deleted
    SpatialFilterDeleted,
}

/// Side effects requested by a transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "effect", content = "target", rename_all = "snake_case")]
pub enum Effect {
    HighlightFeature(String),
    ClearHighlight,
    OpenDetails(String),
    CloseDetails,
    SelectCard(String),
    ClearCardSelection,
    ShowResults(Vec<String>),
    ClearResults,
}

#[derive(Debug, Clone, Default)]
pub struct SelectionOrchestrator {
    state: Selection,
}

impl SelectionOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &Selection {
        &self.state
    }

    /// The details panel is open exactly when a single building is selected
    pub fn details_open(&self) -> bool {
        matches!(self.state, Selection::SingleSelected { .. })
    }

    pub fn selected_feature(&self) -> Option<&str> {
        match &self.state {
            Selection::Idle => None,
            Selection::SingleSelected { feature_id, .. } | Selection::MultiSelected { feature_id } => {
                Some(feature_id)
            }
        }
    }

    /// Apply an event; `filtered` is whether any attribute or spatial filter
    /// is active at the time of the event
    pub fn handle(&mut self, event: SelectionEvent, filtered: bool) -> Vec<Effect> {
        let effects = match event {
            SelectionEvent::FeatureClicked { feature_id, mut uprns } => match uprns.len() {
                0 => self.deselect(filtered),
                1 => {
                    let uprn = uprns.remove(0);
                    self.select_single(uprn, feature_id, filtered)
                }
                _ => self.select_multi(feature_id, uprns, filtered),
            },
            SelectionEvent::CardClicked { uprn, feature_id } => {
                self.select_single(uprn, feature_id, filtered)
            }
            SelectionEvent::BackgroundClicked | SelectionEvent::ViewInvalidated => {
                self.deselect(filtered)
            }
            SelectionEvent::CloseDetails => match self.state {
                Selection::SingleSelected { .. } => self.deselect(filtered),
                _ => Vec::new(),
            },
            SelectionEvent::CloseMultiDwelling => match self.state {
                Selection::MultiSelected { .. } => self.deselect(filtered),
                _ => Vec::new(),
            },
            SelectionEvent::SpatialFilterDeleted => {
                self.state = Selection::Idle;
                vec![
                    Effect::ClearHighlight,
                    Effect::CloseDetails,
                    Effect::ClearCardSelection,
                    Effect::ClearResults,
                ]
            }
        };
        tracing::debug!(state = ?self.state, effects = effects.len(), "selection updated");
        effects
    }

    fn select_single(&mut self, uprn: String, feature_id: String, filtered: bool) -> Vec<Effect> {
        if matches!(&self.state, Selection::SingleSelected { uprn: current, .. } if *current == uprn)
        {
            return self.deselect(filtered);
        }
        let mut effects =
            vec![Effect::HighlightFeature(feature_id.clone()), Effect::OpenDetails(uprn.clone())];
        if filtered {
            effects.push(Effect::SelectCard(uprn.clone()));
        }
        self.state = Selection::SingleSelected { uprn, feature_id };
        effects
    }

    fn select_multi(&mut self, feature_id: String, uprns: Vec<String>, filtered: bool) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.details_open() {
            effects.push(Effect::CloseDetails);
        }
        effects.push(Effect::HighlightFeature(feature_id.clone()));
        if !filtered {
            effects.push(Effect::ShowResults(uprns));
        }
        self.state = Selection::MultiSelected { feature_id };
        effects
    }

    fn deselect(&mut self, filtered: bool) -> Vec<Effect> {
        let effects = match self.state {
            Selection::Idle => Vec::new(),
            Selection::SingleSelected { .. } => {
                let mut effects = vec![Effect::ClearCardSelection, Effect::CloseDetails];
                if !filtered {
                    effects.extend([Effect::ClearHighlight, Effect::ClearResults]);
                }
                effects
            }
            Selection::MultiSelected { .. } => {
                vec![Effect::ClearHighlight, Effect::ClearCardSelection]
            }
        };
        self.state = Selection::Idle;
        effects
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn click(feature_id: &str, uprns: &[&str]) -> SelectionEvent {
        SelectionEvent::FeatureClicked {
            feature_id: feature_id.to_string(),
            uprns: uprns.iter().map(|u| u.to_string()).collect(),
        }
    }

    #[test]
    fn test_single_click_opens_details() {
        let mut machine = SelectionOrchestrator::new();
        let effects = machine.handle(click("F1", &["u1"]), false);
        assert_eq!(
            effects,
            vec![Effect::HighlightFeature("F1".into()), Effect::OpenDetails("u1".into())]
        );
        assert!(machine.details_open());
    }

    #[test]
    fn test_single_click_selects_card_when_filtered() {
        let mut machine = SelectionOrchestrator::new();
        let effects = machine.handle(click("F1", &["u1"]), true);
        assert!(effects.contains(&Effect::SelectCard("u1".into())));
    }

    #[test]
    fn test_reclick_toggles_to_idle() {
        for filtered in [false, true] {
            let mut machine = SelectionOrchestrator::new();
            machine.handle(click("F1", &["u1"]), filtered);
            machine.handle(click("F1", &["u1"]), filtered);
            assert_eq!(machine.state(), &Selection::Idle);
            assert!(!machine.details_open());
        }
    }

    #[test]
    fn test_close_single_depends_on_filter() {
        let mut machine = SelectionOrchestrator::new();
        machine.handle(click("F1", &["u1"]), false);
        let unfiltered = machine.handle(SelectionEvent::CloseDetails, false);
        assert!(unfiltered.contains(&Effect::ClearHighlight));
        assert!(unfiltered.contains(&Effect::ClearResults));

        machine.handle(click("F1", &["u1"]), true);
        let filtered = machine.handle(SelectionEvent::CloseDetails, true);
        assert_eq!(filtered, vec![Effect::ClearCardSelection, Effect::CloseDetails]);
    }

    #[test]
    fn test_multi_click_shows_results_only_unfiltered() {
        let mut machine = SelectionOrchestrator::new();
        let effects = machine.handle(click("F2", &["u2", "u3"]), false);
        assert_eq!(
            effects,
            vec![
                Effect::HighlightFeature("F2".into()),
                Effect::ShowResults(vec!["u2".into(), "u3".into()])
            ]
        );
        assert!(!machine.details_open());

        let mut machine = SelectionOrchestrator::new();
        let effects = machine.handle(click("F2", &["u2", "u3"]), true);
        assert_eq!(effects, vec![Effect::HighlightFeature("F2".into())]);
    }

    #[test]
    fn test_close_multi_always_clears() {
        for filtered in [false, true] {
            let mut machine = SelectionOrchestrator::new();
            machine.handle(click("F2", &["u2", "u3"]), filtered);
            let effects = machine.handle(SelectionEvent::CloseMultiDwelling, filtered);
            assert_eq!(effects, vec![Effect::ClearHighlight, Effect::ClearCardSelection]);
            assert_eq!(machine.state(), &Selection::Idle);
        }
    }

    #[test]
    fn test_mismatched_close_is_ignored() {
        let mut machine = SelectionOrchestrator::new();
        machine.handle(click("F2", &["u2", "u3"]), false);
        assert!(machine.handle(SelectionEvent::CloseDetails, false).is_empty());
        assert_eq!(machine.selected_feature(), Some("F2"));
    }

    #[test]
    fn test_spatial_filter_deletion_is_hard_reset() {
        let mut machine = SelectionOrchestrator::new();
        machine.handle(click("F1", &["u1"]), true);
        let effects = machine.handle(SelectionEvent::SpatialFilterDeleted, true);
        assert_eq!(effects.len(), 4);
        assert_eq!(machine.state(), &Selection::Idle);

        // Also from idle
        assert_eq!(machine.handle(SelectionEvent::SpatialFilterDeleted, false).len(), 4);
    }

    #[test]
    fn test_selecting_one_replaces_the_other() {
        let mut machine = SelectionOrchestrator::new();
        machine.handle(click("F1", &["u1"]), false);
        let effects = machine.handle(click("F2", &["u2", "u3"]), false);
        assert_eq!(effects[0], Effect::CloseDetails);
        assert_eq!(machine.state(), &Selection::MultiSelected { feature_id: "F2".into() });

        machine.handle(
            SelectionEvent::CardClicked { uprn: "u2".into(), feature_id: "F2".into() },
            false,
        );
        assert!(machine.details_open());
    }
}
