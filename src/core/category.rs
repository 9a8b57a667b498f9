//! Splitting combined "icon + label" category strings.

use unicode_segmentation::UnicodeSegmentation;

/// Icon shown for categories that carry no emoji.
pub const PLACEHOLDER_ICON: &str = "🏷️";

const ZERO_WIDTH_JOINER: char = '\u{200D}';
const VARIATION_SELECTOR_16: char = '\u{FE0F}';
const COMBINING_KEYCAP: char = '\u{20E3}';

/// Codec for persisted category labels such as `"🍔 Food"`.
pub struct CategoryCodec;

impl CategoryCodec {
    /// Split a category into `(icon, name)`.
    ///
    /// The first emoji grapheme anywhere in the string becomes the icon and is
    /// removed from the name. Without one, the icon is [`PLACEHOLDER_ICON`]
    /// and the name is the input unchanged.
    pub fn split(category: &str) -> (String, String) {
        for (offset, grapheme) in category.grapheme_indices(true) {
            if is_emoji_grapheme(grapheme) {
                let mut name = String::with_capacity(category.len() - grapheme.len());
                name.push_str(&category[..offset]);
                name.push_str(&category[offset + grapheme.len()..]);
                return (grapheme.to_string(), name.trim().to_string());
            }
        }
        (PLACEHOLDER_ICON.to_string(), category.to_string())
    }
}

/// Whether a grapheme cluster renders as an emoji.
fn is_emoji_grapheme(grapheme: &str) -> bool {
    let Some(first) = grapheme.chars().next() else {
        return false;
    };
    if is_regional_indicator(first) {
        return true;
    }
    if grapheme.contains(COMBINING_KEYCAP) {
        return true;
    }
    if is_pictographic(first) {
        return true;
    }
    // Text-default symbols such as '☺' only count when explicitly emoji-styled.
    is_text_default_symbol(first)
        && grapheme.contains(|c: char| c == VARIATION_SELECTOR_16 || c == ZERO_WIDTH_JOINER)
}

fn is_regional_indicator(c: char) -> bool {
    ('\u{1F1E6}'..='\u{1F1FF}').contains(&c)
}

fn is_pictographic(c: char) -> bool {
    matches!(
        u32::from(c),
        0x1F000..=0x1F0FF
            | 0x1F100..=0x1F1FF
            | 0x1F200..=0x1F2FF
            | 0x1F300..=0x1F5FF
            | 0x1F600..=0x1F64F
            | 0x1F680..=0x1F6FF
            | 0x1F700..=0x1F77F
            | 0x1F780..=0x1F7FF
            | 0x1F800..=0x1F8FF
            | 0x1F900..=0x1F9FF
            | 0x1FA00..=0x1FAFF
            | 0x2600..=0x27BF
            | 0x2B05..=0x2B07
            | 0x2B1B..=0x2B1C
            | 0x2B50
            | 0x2B55
            | 0x231A..=0x231B
            | 0x23E9..=0x23FA
            | 0x3030
            | 0x303D
            | 0x3297
            | 0x3299
    )
}

fn is_text_default_symbol(c: char) -> bool {
    matches!(
        u32::from(c),
        0x00A9 | 0x00AE | 0x203C | 0x2049 | 0x2122 | 0x2139 | 0x2194..=0x21AA | 0x24C2
            | 0x25AA..=0x25FE | 0x2934..=0x2935 | 0x2300..=0x23FF
    )
}
