//! Energy Performance Certificate ratings.
//!
//! Ratings are looked up through a single static table so that label, weight
//! and variant always agree. Anything the table does not know is "no rating".

use serde::{Deserialize, Serialize};
use std::fmt;

/// EPC letter grade, A (best) to G (worst)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EpcRating {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
}

/// (rating, label, weight) for every grade, ordered by weight
const RATING_TABLE: [(EpcRating, &str, u32); 7] = [
    (EpcRating::A, "A", 1),
    (EpcRating::B, "B", 2),
    (EpcRating::C, "C", 3),
    (EpcRating::D, "D", 4),
    (EpcRating::E, "E", 5),
    (EpcRating::F, "F", 6),
    (EpcRating::G, "G", 7),
];

impl EpcRating {
    /// All ratings in weight order
    pub const ALL: [EpcRating; 7] = [
        EpcRating::A,
        EpcRating::B,
        EpcRating::C,
        EpcRating::D,
        EpcRating::E,
        EpcRating::F,
        EpcRating::G,
    ];

    /// Integer weight used for averaging (A=1 .. G=7)
    pub fn weight(self) -> u32 {
        RATING_TABLE[self.index()].2
    }

    /// Single-letter label
    pub fn label(self) -> &'static str {
        RATING_TABLE[self.index()].1
    }

    /// Look up the rating carrying the given weight
    pub fn from_weight(weight: u32) -> Option<Self> {
        RATING_TABLE.iter().find(|(_, _, w)| *w == weight).map(|(rating, _, _)| *rating)
    }

    /// Parse a label, case-insensitively.
    ///
    /// `"none"`, empty strings and unknown labels all map to `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        RATING_TABLE
            .iter()
            .find(|(_, l, _)| l.eq_ignore_ascii_case(label))
            .map(|(rating, _, _)| *rating)
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for EpcRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
