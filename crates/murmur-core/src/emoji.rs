//! ASCII emoticon → emoji glyph normalization.
//!
//! Used on composed text before sending and for reaction-picker shortcuts.

use once_cell::sync::Lazy;
use regex::Regex;

/// Emoticon table.
///
/// Matching is leftmost-first over the alternation built from this list,
/// so an entry must precede any other entry that matches a prefix of it.
const EMOTICONS: &[(&str, &str)] = &[
    ("</3", "💔"),
    ("<3", "❤️"),
    (":'(", "😢"),
    (":-)", "🙂"),
    (":)", "🙂"),
    (":-(", "🙁"),
    (":(", "🙁"),
    (":-D", "😃"),
    (":D", "😃"),
    (";-)", "😉"),
    (";)", "😉"),
    (":-P", "😛"),
    (":P", "😛"),
    (":-p", "😛"),
    (":p", "😛"),
    (":-O", "😮"),
    (":O", "😮"),
    (":-o", "😮"),
    (":o", "😮"),
    (":-|", "😐"),
    (":|", "😐"),
    (":-*", "😘"),
    (":*", "😘"),
    ("B-)", "😎"),
    ("+1", "👍"),
    ("-1", "👎"),
];

static EMOTICON_RE: Lazy<Regex> = Lazy::new(|| {
    let alternation = EMOTICONS
        .iter()
        .map(|(ascii, _)| regex::escape(ascii))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&alternation).expect("emoticon table must compile")
});

fn glyph_for(ascii: &str) -> Option<&'static str> {
    EMOTICONS
        .iter()
        .find(|(pattern, _)| *pattern == ascii)
        .map(|(_, glyph)| *glyph)
}

/// Replaces every emoticon in `text` with its glyph.
///
/// A single non-overlapping pass, so a replaced emoticon never leaves
/// residue for another rule. Glyphs contain no ASCII, which makes the
/// function idempotent. Empty input is returned unchanged.
///
/// # Example
///
/// ```
/// use murmur_core::emoji::to_emoji;
///
/// assert_eq!(to_emoji(":) <3 +1"), "🙂 ❤️ 👍");
/// ```
pub fn to_emoji(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    EMOTICON_RE
        .replace_all(text, |caps: &regex::Captures<'_>| {
            glyph_for(&caps[0]).unwrap_or(&caps[0]).to_string()
        })
        .into_owned()
}

/// Maps a reaction-picker shortcut to its glyph.
///
/// `":)"` and `"+1"` become `"🙂"` and `"👍"`; anything else (including
/// a glyph picked directly) is returned trimmed but otherwise unchanged.
pub fn reaction_shortcut(input: &str) -> String {
    let trimmed = input.trim();
    glyph_for(trimmed).unwrap_or(trimmed).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_smile_heart_thumbs_up() {
        let out = to_emoji(":) <3 +1");
        assert_eq!(out, "🙂 ❤️ 👍");
        assert!(!out.contains(':'));
        assert!(!out.contains('<'));
        assert!(!out.contains('+'));
    }

    #[test]
    fn test_nose_variants_map_to_same_glyph() {
        assert_eq!(to_emoji(":-)"), to_emoji(":)"));
        assert_eq!(to_emoji(":-("), "🙁");
    }

    #[test]
    fn test_broken_heart_wins_over_heart() {
        assert_eq!(to_emoji("</3"), "💔");
    }

    #[test]
    fn test_no_residue_between_adjacent_emoticons() {
        assert_eq!(to_emoji(":):-("), "🙂🙁");
        assert_eq!(to_emoji(":-):("), "🙂🙁");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "",
            "plain text",
            ":) <3 +1",
            "mixed :-D and ;) and -1 and </3",
            "::)) <<33 ++11",
            ":-1)",
            "🙂 already",
        ];
        for sample in samples {
            let once = to_emoji(sample);
            assert_eq!(to_emoji(&once), once, "not idempotent for {sample:?}");
        }
    }

    #[test]
    fn test_empty_input_unchanged() {
        assert_eq!(to_emoji(""), "");
    }

    #[test]
    fn test_reaction_shortcut() {
        assert_eq!(reaction_shortcut("+1"), "👍");
        assert_eq!(reaction_shortcut(" <3 "), "❤️");
        assert_eq!(reaction_shortcut("🎉"), "🎉");
    }
}
