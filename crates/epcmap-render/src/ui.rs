//! State exposed to the UI layer.

use serde::Serialize;

use crate::orchestrator::Effect;
use crate::palette::DisplayMode;

/// Results panel, details panel and display mode as the UI should show them
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UiState {
    /// Property references listed in the results panel
    pub results: Vec<String>,
    /// Building shown in the details panel
    pub details: Option<String>,
    /// Results card marked as selected
    pub selected_card: Option<String>,
    /// Feature drawn in the highlight layer
    pub highlighted: Option<String>,
    pub display_mode: DisplayMode,
}

impl UiState {
    pub fn details_open(&self) -> bool {
        self.details.is_some()
    }

    pub fn apply(&mut self, effect: &Effect) {
        match effect {
            Effect::HighlightFeature(id) => self.highlighted = Some(id.clone()),
            Effect::ClearHighlight => self.highlighted = None,
            Effect::OpenDetails(uprn) => self.details = Some(uprn.clone()),
            Effect::CloseDetails => self.details = None,
            Effect::SelectCard(uprn) => self.selected_card = Some(uprn.clone()),
            Effect::ClearCardSelection => self.selected_card = None,
            Effect::ShowResults(uprns) => self.results = uprns.clone(),
            Effect::ClearResults => self.results.clear(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_effects() {
        let mut ui = UiState::default();
        ui.apply(&Effect::HighlightFeature("F1".into()));
        ui.apply(&Effect::OpenDetails("u1".into()));
        ui.apply(&Effect::ShowResults(vec!["u1".into(), "u2".into()]));
        assert!(ui.details_open());
        assert_eq!(ui.highlighted.as_deref(), Some("F1"));

        ui.apply(&Effect::CloseDetails);
        ui.apply(&Effect::ClearResults);
        assert!(!ui.details_open());
        assert!(ui.results.is_empty());
    }
}
