//! Visual lines assembled from spans.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{BBox, Span};
use crate::text::{is_spaceless_script_char, key_size, size_key};

/// A visual row of text on one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    /// The spans in this line, sorted by X position
    pub spans: Vec<Span>,
    /// Concatenated text
    pub text: String,
    /// Dominant font size (mode across spans, quantized to 0.1pt)
    pub font_size: f32,
    /// Fraction of visible characters set in bold
    pub bold_ratio: f32,
    /// Union of the span boxes
    pub bbox: BBox,
    /// Page index (0-based)
    pub page: usize,
}

impl Line {
    /// Build a line from spans on the same page.
    ///
    /// Returns `None` when `spans` is empty.
    pub fn from_spans(mut spans: Vec<Span>) -> Option<Self> {
        let first = spans.first()?;
        let page = first.page;
        let mut bbox = first.bbox;

        spans.sort_by(|a, b| a.bbox.x0.total_cmp(&b.bbox.x0));
        for span in &spans {
            bbox = bbox.union(&span.bbox);
        }

        let total_chars: usize = spans.iter().map(Span::visible_chars).sum();
        let bold_chars: usize = spans
            .iter()
            .filter(|s| s.bold)
            .map(Span::visible_chars)
            .sum();
        let bold_ratio = if total_chars > 0 {
            bold_chars as f32 / total_chars as f32
        } else {
            0.0
        };

        let font_size = dominant_size(&spans);
        let text = join_spans(&spans);

        Some(Self {
            spans,
            text,
            font_size,
            bold_ratio,
            bbox,
            page,
        })
    }

    /// Top edge of the line.
    pub fn top(&self) -> f32 {
        self.bbox.y0
    }

    /// Bottom edge of the line.
    pub fn bottom(&self) -> f32 {
        self.bbox.y1
    }

    /// Number of whitespace-separated words.
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

/// Mode of the span font sizes; ties go to the size covering more
/// characters, then to the smaller size.
fn dominant_size(spans: &[Span]) -> f32 {
    let mut tally: HashMap<i32, (usize, usize)> = HashMap::new();
    for span in spans {
        let entry = tally.entry(size_key(span.font_size)).or_insert((0, 0));
        entry.0 += 1;
        entry.1 += span.visible_chars();
    }

    tally
        .into_iter()
        .max_by(|(ka, (na, ca)), (kb, (nb, cb))| {
            na.cmp(nb).then(ca.cmp(cb)).then(kb.cmp(ka))
        })
        .map(|(key, _)| key_size(key))
        .unwrap_or(0.0)
}

/// Join span texts, inserting spaces where the horizontal gap suggests a
/// word break.
fn join_spans(spans: &[Span]) -> String {
    let mut result = String::new();

    for (i, span) in spans.iter().enumerate() {
        if i == 0 {
            result.push_str(&span.text);
            continue;
        }

        let prev = &spans[i - 1];
        let gap = span.bbox.x0 - prev.bbox.x1;

        let char_count = span.text.chars().count();
        let avg_char_width = if char_count > 0 && span.bbox.width() > 0.0 {
            span.bbox.width() / char_count as f32
        } else {
            span.font_size * 0.5
        };

        let prev_last = prev.text.chars().last();
        let curr_first = span.text.chars().next();
        let both_spaceless = prev_last.map(is_spaceless_script_char).unwrap_or(false)
            && curr_first.map(is_spaceless_script_char).unwrap_or(false);

        let has_space = prev.text.ends_with(char::is_whitespace)
            || span.text.starts_with(char::is_whitespace);

        if gap > avg_char_width * 0.2 && !both_spaceless && !has_space {
            result.push(' ');
        }

        result.push_str(&span.text);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(text: &str, x0: f32, x1: f32, size: f32, bold: bool) -> Span {
        Span::new(text, size, "Helvetica", BBox::new(x0, 100.0, x1, 100.0 + size), 0)
            .with_bold(bold)
    }

    #[test]
    fn test_from_spans_empty() {
        assert!(Line::from_spans(vec![]).is_none());
    }

    #[test]
    fn test_text_joins_with_spaces_on_gaps() {
        let line = Line::from_spans(vec![
            span("Systems", 80.0, 130.0, 12.0, false),
            span("Intro", 40.0, 70.0, 12.0, false),
        ])
        .unwrap();
        assert_eq!(line.text, "Intro Systems");
        assert_eq!(line.bbox, BBox::new(40.0, 100.0, 130.0, 112.0));
    }

    #[test]
    fn test_text_no_space_for_touching_spans() {
        let line = Line::from_spans(vec![
            span("Head", 40.0, 70.0, 12.0, false),
            span("ing", 70.0, 90.0, 12.0, false),
        ])
        .unwrap();
        assert_eq!(line.text, "Heading");
    }

    #[test]
    fn test_text_no_space_between_cjk() {
        let line = Line::from_spans(vec![
            span("概要", 40.0, 64.0, 12.0, false),
            span("説明", 70.0, 94.0, 12.0, false),
        ])
        .unwrap();
        assert_eq!(line.text, "概要説明");
    }

    #[test]
    fn test_dominant_size_and_bold_ratio() {
        let line = Line::from_spans(vec![
            span("Bold", 40.0, 70.0, 14.0, true),
            span("plain", 80.0, 120.0, 11.0, false),
            span("text", 130.0, 160.0, 11.0, false),
        ])
        .unwrap();
        assert_eq!(line.font_size, 11.0);
        assert!((line.bold_ratio - 4.0 / 13.0).abs() < 1e-6);
        assert_eq!(line.word_count(), 3);
    }

    #[test]
    fn test_dominant_size_tie_prefers_more_characters() {
        let line = Line::from_spans(vec![
            span("A", 40.0, 50.0, 18.0, false),
            span("Longer", 60.0, 100.0, 12.0, false),
        ])
        .unwrap();
        assert_eq!(line.font_size, 12.0);
    }
}
