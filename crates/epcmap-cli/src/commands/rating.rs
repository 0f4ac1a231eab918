//! Rating command implementation

use crate::cli::RatingArgs;
use crate::output::OutputWriter;
use crate::output_types::RatingOutput;
use anyhow::{bail, Result};
use epcmap_core::models::EpcRating;
use epcmap_render::{mean_rating, DisplayMode, Palette};

/// Parse ratings, skipping explicit "none" entries
fn parse_ratings(labels: &[String]) -> Result<Vec<EpcRating>> {
    let mut ratings = Vec::with_capacity(labels.len());
    for label in labels {
        match EpcRating::from_label(label) {
            Some(rating) => ratings.push(rating),
            None if label.trim().eq_ignore_ascii_case("none") => {}
            None => bail!("Unknown EPC rating '{}'. Use A-G or none", label),
        }
    }
    Ok(ratings)
}

pub fn execute(args: RatingArgs, output: &OutputWriter) -> Result<()> {
    let ratings = parse_ratings(&args.ratings)?;
    let palette = Palette::new(DisplayMode::from_colour_blind(args.colour_blind));
    let mean = mean_rating(&ratings);

    let result = RatingOutput {
        ratings: ratings.iter().map(|r| r.label().to_string()).collect(),
        mean: mean.map(|r| r.label().to_string()),
        colour: palette.colour_for(mean).to_string(),
        pattern: palette.pattern_for(&ratings),
    };

    if output.is_json() {
        return output.emit(result);
    }

    let labels: Vec<String> = result.ratings.iter().map(|r| output.rating(Some(r))).collect();
    output.field("Ratings", if labels.is_empty() { "-".to_string() } else { labels.join(" ") });
    output.field("Mean", output.rating(result.mean.as_deref()));
    output.field("Colour", &result.colour);
    output.field("Pattern", &result.pattern);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ratings() {
        let labels: Vec<String> = ["a", "C", "none", " g "].iter().map(|s| s.to_string()).collect();
        assert_eq!(parse_ratings(&labels).unwrap(), vec![EpcRating::A, EpcRating::C, EpcRating::G]);
        assert!(parse_ratings(&["H".to_string()]).is_err());
    }
}
