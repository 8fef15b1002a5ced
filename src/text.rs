//! Small text helpers shared by ingestion and the heuristics.

/// Check if character is from a script that doesn't use word spaces.
///
/// Chinese and Japanese don't use spaces between words, but Korean does.
pub(crate) fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;

    // CJK Unified Ideographs and Extension A
    (0x4E00..=0x9FFF).contains(&code)
    || (0x3400..=0x4DBF).contains(&code)
    // Extensions B-F
    || (0x20000..=0x2EBEF).contains(&code)
    // Hiragana and Katakana
    || (0x3040..=0x30FF).contains(&code)
    // CJK Symbols and Punctuation
    || (0x3000..=0x303F).contains(&code)
}

/// Collapse every whitespace run into a single space and trim the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Quantize a font size to 0.1pt so sizes can be compared and hashed.
pub(crate) fn size_key(size: f32) -> i32 {
    (size * 10.0).round() as i32
}

/// Inverse of [`size_key`].
pub(crate) fn key_size(key: i32) -> f32 {
    key as f32 / 10.0
}
