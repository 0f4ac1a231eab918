//! Rasterised fill patterns for multi-dwelling features.

use epcmap_core::models::ImagePattern;

use crate::palette::Palette;

/// Edge length of a pattern tile in pixels
pub const PATTERN_SIZE: u32 = 16;

/// Distance between stripe starts, in pixels along either axis
const STRIPE_PERIOD: u32 = 8;

/// Stripe thickness, in pixels along either axis
const STRIPE_WIDTH: u32 = 3;

const BACKGROUND: [u8; 4] = [255, 255, 255, 255];

/// Parse `#rrggbb` or `#rgb`
pub fn parse_hex_colour(hex: &str) -> Option<[u8; 3]> {
    let digits = hex.strip_prefix('#')?;
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match digits.len() {
        6 => Some([channel(&digits[0..2])?, channel(&digits[2..4])?, channel(&digits[4..6])?]),
        3 => {
            let expand = |i: usize| channel(&digits[i..i + 1]).map(|v| v * 17);
            Some([expand(0)?, expand(1)?, expand(2)?])
        }
        _ => None,
    }
}

/// Diagonal stripes of `colour` on a white tile
pub fn stripe_pattern(colour: &str) -> Option<ImagePattern> {
    let [r, g, b] = parse_hex_colour(colour)?;
    let stripe = [r, g, b, 255];
    let mut pixels = Vec::with_capacity((PATTERN_SIZE * PATTERN_SIZE * 4) as usize);
    for y in 0..PATTERN_SIZE {
        for x in 0..PATTERN_SIZE {
            let on_stripe = (x + y) % STRIPE_PERIOD < STRIPE_WIDTH;
            pixels.extend_from_slice(if on_stripe { &stripe } else { &BACKGROUND });
        }
    }
    Some(ImagePattern { width: PATTERN_SIZE, height: PATTERN_SIZE, pixels })
}

/// Every pattern image the palette can reference, keyed by image name
pub fn pattern_images(palette: &Palette) -> Vec<(String, ImagePattern)> {
    palette
        .patterns()
        .into_iter()
        .filter_map(|(name, colour)| match stripe_pattern(colour) {
            Some(image) => Some((name, image)),
            None => {
                tracing::warn!(pattern = %name, colour, "unparseable pattern colour, skipping");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::DisplayMode;

    #[test]
    fn test_parse_hex_colour() {
        assert_eq!(parse_hex_colour("#008054"), Some([0x00, 0x80, 0x54]));
        assert_eq!(parse_hex_colour("#fff"), Some([255, 255, 255]));
        assert_eq!(parse_hex_colour("008054"), None);
        assert_eq!(parse_hex_colour("#zzzzzz"), None);
    }

    #[test]
    fn test_stripe_pattern_layout() {
        let image = stripe_pattern("#e9153b").unwrap();
        assert_eq!(image.pixels.len(), (PATTERN_SIZE * PATTERN_SIZE * 4) as usize);
        // (0, 0) is on a stripe, (4, 0) is background
        assert_eq!(&image.pixels[0..4], &[0xe9, 0x15, 0x3b, 255]);
        assert_eq!(&image.pixels[16..20], &BACKGROUND);
    }

    #[test]
    fn test_pattern_images_per_mode() {
        let standard = pattern_images(&Palette::new(DisplayMode::Standard));
        let cb = pattern_images(&Palette::new(DisplayMode::ColourBlind));
        assert_eq!(standard.len(), 8);
        assert_eq!(cb.len(), 8);
        assert!(cb.iter().all(|(name, _)| name.starts_with("cb-")));
    }
}
