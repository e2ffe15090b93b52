use plotters::style::{Color, Palette, Palette99, RGBColor};
use twsa_common::Sentiment;

// Set2, qualitative
const POSITIVE: RGBColor = RGBColor(0x66, 0xC2, 0xA5);
const NEGATIVE: RGBColor = RGBColor(0xFC, 0x8D, 0x62);
const NEUTRAL: RGBColor = RGBColor(0x8D, 0xA0, 0xCB);
const UNLABELED: RGBColor = RGBColor(0xB3, 0xB3, 0xB3);

/// Stable color for a sentiment label
///
/// Depends on the label alone, so a label has the same color in every chart.
/// Free-form labels pick a palette color from their text.
pub fn sentiment_color(label: &Sentiment) -> RGBColor {
    match label {
        Sentiment::Positive => POSITIVE,
        Sentiment::Negative => NEGATIVE,
        Sentiment::Neutral => NEUTRAL,
        Sentiment::Unlabeled => UNLABELED,
        Sentiment::Other(name) => indexed_color(label_index(name)),
    }
}

// FNV-1a; stable across runs and platforms
fn label_index(name: &str) -> usize {
    let hash = name
        .bytes()
        .fold(0x811c_9dc5u32, |h, b| (h ^ b as u32).wrapping_mul(0x0100_0193));
    hash as usize
}

/// Palette color for the `index`-th item
pub fn indexed_color(index: usize) -> RGBColor {
    let (r, g, b) = Palette99::pick(index).rgb();
    RGBColor(r, g, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_labels_are_distinct() {
        let colors = [
            sentiment_color(&Sentiment::Positive),
            sentiment_color(&Sentiment::Negative),
            sentiment_color(&Sentiment::Neutral),
        ];
        assert_ne!(colors[0], colors[1]);
        assert_ne!(colors[1], colors[2]);
        assert_ne!(colors[0], colors[2]);
    }

    #[test]
    fn test_free_form_label_color_depends_on_label_only() {
        let mixed = Sentiment::Other("mixed".to_string());
        assert_eq!(sentiment_color(&mixed), indexed_color(label_index("mixed")));
        assert_eq!(
            sentiment_color(&mixed),
            sentiment_color(&Sentiment::Other("mixed".to_string()))
        );
        assert_ne!(label_index("mixed"), label_index("sarcastic"));
    }
}
