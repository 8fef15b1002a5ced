//! Compiled text patterns: enumeration labels and page-number shapes.

use regex::Regex;

use crate::error::{Error, Result};

/// Largest roman numeral accepted as an enumeration label or page number.
const MAX_ROMAN: u32 = 50;

/// Kind of the first component of an enumeration label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumerationKind {
    /// "1.", "2.3", "4)"
    Decimal,
    /// "I.", "iv)"
    Roman,
    /// "A.", "(b)"
    Letter,
}

/// An ordered-list label found at the start of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Enumeration {
    /// Number of components ("1.2.3" has depth 3)
    pub depth: usize,
    /// Kind of the first component
    pub kind: EnumerationKind,
    /// Byte length of the label including trailing whitespace
    pub label_len: usize,
}

/// Regexes used by the feature extractor and the scorer.
///
/// Built once per extractor and shared by reference.
#[derive(Debug, Clone)]
pub struct TextPatterns {
    enumeration: Regex,
    page_numbers: Vec<Regex>,
}

impl TextPatterns {
    /// Compile all patterns.
    pub fn new() -> Result<Self> {
        let enumeration = compile(
            r"^\(?(?P<first>\d{1,3}|[IVXLCDM]+|[ivxlcdm]+|[A-Za-z])(?P<rest>(?:\.\d{1,3})*)(?P<term>[.):])?(?:\s+|$)",
        )?;

        let page_numbers = [
            r"^\d+$",
            r"^[-–—]\s*\d+\s*[-–—]$",
            r"(?i)^page\s+\d+$",
            r"(?i)^page\s+\d+\s+of\s+\d+$",
            r"(?i)^(?:p|pg)\.?\s*\d+$",
        ]
        .iter()
        .map(|p| compile(p))
        .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            enumeration,
            page_numbers,
        })
    }

    /// Parse the enumeration label at the start of `text`, if any.
    pub fn enumeration(&self, text: &str) -> Option<Enumeration> {
        let trimmed = text.trim_start();
        let leading = text.len() - trimmed.len();
        let caps = self.enumeration.captures(trimmed)?;

        let first = caps.name("first")?.as_str();
        let rest = caps.name("rest").map(|m| m.as_str()).unwrap_or("");
        let has_term = caps.name("term").is_some();
        let opened = trimmed.starts_with('(');

        // "(1" without a closing paren is not a label
        if opened && caps.name("term").map(|m| m.as_str()) != Some(")") {
            return None;
        }

        let kind = if first.chars().all(|c| c.is_ascii_digit()) {
            EnumerationKind::Decimal
        } else if roman_value(first).is_some() {
            EnumerationKind::Roman
        } else if first.chars().count() == 1 {
            EnumerationKind::Letter
        } else {
            return None;
        };

        // A lone number or letter needs a terminator: "3 Methods" is not a
        // label, "3. Methods" and "3.1 Methods" are
        if rest.is_empty() && !has_term {
            return None;
        }

        let depth = 1 + rest.matches('.').count();
        let label_len = leading + caps.get(0)?.end();

        Some(Enumeration {
            depth,
            kind,
            label_len,
        })
    }

    /// Depth of the enumeration label, 0 when there is none.
    pub fn enumeration_depth(&self, text: &str) -> usize {
        self.enumeration(text).map(|e| e.depth).unwrap_or(0)
    }

    /// Text with the leading enumeration label removed.
    pub fn strip_enumeration<'t>(&self, text: &'t str) -> &'t str {
        match self.enumeration(text) {
            Some(e) => &text[e.label_len..],
            None => text,
        }
    }

    /// Whether the text is nothing but an enumeration label, e.g. "1." or "(a)".
    pub fn is_bare_label(&self, text: &str) -> bool {
        match self.enumeration(text) {
            Some(e) => text[e.label_len..].trim().is_empty(),
            None => false,
        }
    }

    /// Whether the text looks like a page number rather than content.
    pub fn is_page_number(&self, text: &str) -> bool {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return false;
        }
        if self.page_numbers.iter().any(|re| re.is_match(trimmed)) {
            return true;
        }
        is_lone_roman(trimmed)
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| Error::Other(format!("invalid pattern {}: {}", pattern, e)))
}

fn is_lone_roman(text: &str) -> bool {
    roman_value(text).is_some()
}

/// Value of a canonical roman numeral up to [`MAX_ROMAN`].
///
/// Mixed case and non-canonical forms ("IIII", "IC") are rejected.
pub fn roman_value(text: &str) -> Option<u32> {
    let is_upper = text.chars().all(|c| c.is_ascii_uppercase());
    let is_lower = text.chars().all(|c| c.is_ascii_lowercase());
    if text.is_empty() || !(is_upper || is_lower) {
        return None;
    }

    let upper = text.to_ascii_uppercase();
    let mut total = 0u32;
    let mut prev = 0u32;
    for c in upper.chars().rev() {
        let value = match c {
            'I' => 1,
            'V' => 5,
            'X' => 10,
            'L' => 50,
            'C' => 100,
            'D' => 500,
            'M' => 1000,
            _ => return None,
        };
        if value < prev {
            total = total.checked_sub(value)?;
        } else {
            total += value;
            prev = value;
        }
    }

    if total == 0 || total > MAX_ROMAN || to_roman(total) != upper {
        return None;
    }
    Some(total)
}

fn to_roman(mut value: u32) -> String {
    const TABLE: [(u32, &str); 13] = [
        (1000, "M"),
        (900, "CM"),
        (500, "D"),
        (400, "CD"),
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];

    let mut out = String::new();
    for (n, s) in TABLE {
        while value >= n {
            out.push_str(s);
            value -= n;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterns() -> TextPatterns {
        TextPatterns::new().unwrap()
    }

    #[test]
    fn test_decimal_depth() {
        let p = patterns();
        assert_eq!(p.enumeration_depth("1. Introduction"), 1);
        assert_eq!(p.enumeration_depth("1.1 Background"), 2);
        assert_eq!(p.enumeration_depth("2.3.1. Sampling"), 3);
        assert_eq!(p.enumeration_depth("4) Results"), 1);
        assert_eq!(p.enumeration_depth("  3: Methods"), 1);
    }

    #[test]
    fn test_bare_number_needs_terminator() {
        let p = patterns();
        assert!(p.enumeration("3 Methods").is_none());
        assert!(p.enumeration("30 days after signature the client may").is_none());
        assert!(!p.is_bare_label("12"));
        assert_eq!(p.enumeration_depth("30. Refunds"), 1);
    }

    #[test]
    fn test_roman_and_letter_labels() {
        let p = patterns();
        let e = p.enumeration("II. Scope").unwrap();
        assert_eq!(e.kind, EnumerationKind::Roman);
        assert_eq!(e.depth, 1);

        let e = p.enumeration("I. General").unwrap();
        assert_eq!(e.kind, EnumerationKind::Roman);

        let e = p.enumeration("A. Funding").unwrap();
        assert_eq!(e.kind, EnumerationKind::Letter);

        let e = p.enumeration("(b) Eligibility").unwrap();
        assert_eq!(e.kind, EnumerationKind::Letter);

        assert_eq!(p.enumeration_depth("A.1 Terms"), 2);
    }

    #[test]
    fn test_non_labels() {
        let p = patterns();
        assert!(p.enumeration("Introduction").is_none());
        assert!(p.enumeration("I think so").is_none());
        assert!(p.enumeration("A new approach").is_none());
        assert!(p.enumeration("2024 Annual Report").is_none());
        assert!(p.enumeration("(1 unclosed").is_none());
        assert!(p.enumeration("Civil. Law").is_none());
    }

    #[test]
    fn test_strip_and_bare_label() {
        let p = patterns();
        assert_eq!(p.strip_enumeration("1.1 Background"), "Background");
        assert_eq!(p.strip_enumeration("Summary"), "Summary");
        assert!(p.is_bare_label("1."));
        assert!(p.is_bare_label("(a)"));
        assert!(!p.is_bare_label("1. Scope"));
        assert!(!p.is_bare_label("The end."));
    }

    #[test]
    fn test_page_number_shapes() {
        let p = patterns();
        assert!(p.is_page_number("12"));
        assert!(p.is_page_number("- 4 -"));
        assert!(p.is_page_number("Page 3"));
        assert!(p.is_page_number("page 3 of 10"));
        assert!(p.is_page_number("p. 7"));
        assert!(p.is_page_number("xiv"));
        assert!(!p.is_page_number("Chapter 3"));
        assert!(!p.is_page_number("Civil"));
    }

    #[test]
    fn test_roman_value() {
        assert_eq!(roman_value("IV"), Some(4));
        assert_eq!(roman_value("xii"), Some(12));
        assert_eq!(roman_value("IIII"), None);
        assert_eq!(roman_value("Iv"), None);
        assert_eq!(roman_value("MIX"), None);
    }
}
