//! EPC colour and pattern lookup.
//!
//! Single dwellings are painted with the colour of their rating; features with
//! several dwellings use a hatched pattern keyed by the mean rating.

use epcmap_core::models::EpcRating;
use serde::{Deserialize, Serialize};

/// Colour scheme selected by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DisplayMode {
    #[default]
    Standard,
    ColourBlind,
}

impl DisplayMode {
    pub fn from_colour_blind(colour_blind: bool) -> Self {
        if colour_blind {
            DisplayMode::ColourBlind
        } else {
            DisplayMode::Standard
        }
    }

    pub fn is_colour_blind(self) -> bool {
        self == DisplayMode::ColourBlind
    }
}

/// Colour per rating plus the explicit default for missing ratings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColourTable {
    colours: [&'static str; 7],
    default: &'static str,
}

impl ColourTable {
    pub fn colour(&self, rating: Option<EpcRating>) -> &'static str {
        match rating {
            Some(rating) => self.colours[(rating.weight() - 1) as usize],
            None => self.default,
        }
    }

    pub fn default_colour(&self) -> &'static str {
        self.default
    }
}

pub const STANDARD_COLOURS: ColourTable = ColourTable {
    colours: ["#008054", "#19b459", "#8dce46", "#ffd500", "#fcaa65", "#ef8023", "#e9153b"],
    default: "#a6a6a6",
};

pub const COLOUR_BLIND_COLOURS: ColourTable = ColourTable {
    colours: ["#0d0887", "#5302a3", "#8b0aa5", "#b83289", "#db5c68", "#f48849", "#febd2a"],
    default: "#a6a6a6",
};

/// Mean rating of a set of ratings.
///
/// Weights A=1..G=7 are averaged and floored with integer arithmetic. Any
/// non-empty input lands on a defined weight; an empty input has no mean.
pub fn mean_rating(ratings: &[EpcRating]) -> Option<EpcRating> {
    if ratings.is_empty() {
        return None;
    }
    let total: u32 = ratings.iter().map(|r| r.weight()).sum();
    EpcRating::from_weight(total / ratings.len() as u32)
}

/// Colour and pattern lookup under a display mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Palette {
    mode: DisplayMode,
}

impl Palette {
    pub fn new(mode: DisplayMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: DisplayMode) {
        self.mode = mode;
    }

    pub fn table(&self) -> &'static ColourTable {
        match self.mode {
            DisplayMode::Standard => &STANDARD_COLOURS,
            DisplayMode::ColourBlind => &COLOUR_BLIND_COLOURS,
        }
    }

    /// Colour for a rating; missing ratings get the table default
    pub fn colour_for(&self, rating: Option<EpcRating>) -> &'static str {
        self.table().colour(rating)
    }

    pub fn default_colour(&self) -> &'static str {
        self.table().default_colour()
    }

    /// Pattern image name for a rating, or the default pattern for none
    pub fn pattern_name(&self, rating: Option<EpcRating>) -> String {
        let prefix = if self.mode.is_colour_blind() { "cb-" } else { "" };
        match rating {
            Some(rating) => format!("{}{}-pattern", prefix, rating.label()),
            None => format!("{}default-pattern", prefix),
        }
    }

    /// Pattern for the mean of a set of ratings
    pub fn pattern_for(&self, ratings: &[EpcRating]) -> String {
        self.pattern_name(mean_rating(ratings))
    }

    pub fn default_pattern(&self) -> String {
        self.pattern_name(None)
    }

    /// Every pattern this mode can reference, with the colour it is drawn in
    pub fn patterns(&self) -> Vec<(String, &'static str)> {
        EpcRating::ALL
            .iter()
            .map(|rating| Some(*rating))
            .chain(std::iter::once(None))
            .map(|rating| (self.pattern_name(rating), self.colour_for(rating)))
            .collect()
    }
}
