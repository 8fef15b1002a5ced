//! Feature Extractor: per-line typographic and textual signals.

use std::collections::HashMap;

use crate::model::{Line, Page};
use crate::text::{key_size, size_key};

use super::patterns::TextPatterns;
use super::OutlineConfig;

/// Body size used when a document has no lines at all.
pub const DEFAULT_BODY_FONT_SIZE: f32 = 12.0;

/// Document-wide statistics computed once, before any line is scored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DocumentStats {
    /// Most common line font size (ties go to the smaller size)
    pub body_font_size: f32,
}

impl DocumentStats {
    /// Compute statistics over the surviving lines of all pages.
    pub fn from_pages(pages: &[Page]) -> Self {
        Self {
            body_font_size: body_font_size(pages.iter().flat_map(|p| p.lines.iter())),
        }
    }
}

/// Mode of the line font sizes, ties broken by the smallest size.
pub fn body_font_size<'a>(lines: impl Iterator<Item = &'a Line>) -> f32 {
    let mut counts: HashMap<i32, usize> = HashMap::new();
    for line in lines {
        *counts.entry(size_key(line.font_size)).or_insert(0) += 1;
    }

    counts
        .into_iter()
        .max_by(|(ka, ca), (kb, cb)| ca.cmp(cb).then(kb.cmp(ka)))
        .map(|(key, _)| key_size(key))
        .unwrap_or(DEFAULT_BODY_FONT_SIZE)
}

/// Median left edge over the lines of a page (0 for an empty page).
pub fn median_left_margin(page: &Page) -> f32 {
    let mut lefts: Vec<f32> = page.lines.iter().map(|l| l.bbox.x0).collect();
    if lefts.is_empty() {
        return 0.0;
    }
    lefts.sort_by(f32::total_cmp);

    let mid = lefts.len() / 2;
    if lefts.len() % 2 == 0 {
        (lefts[mid - 1] + lefts[mid]) / 2.0
    } else {
        lefts[mid]
    }
}

/// Derived signals for one line.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    /// Line font size over body font size
    pub font_ratio: f32,
    /// Fraction of bold characters
    pub bold_ratio: f32,
    /// Left edge minus the page median margin, in font-size units
    pub indent_level: f32,
    /// Components of the leading enumeration label (0 = none)
    pub enumeration_depth: usize,
    /// Line starts with a cue phrase
    pub keyword_hit: bool,
    /// Mean surrounding whitespace in font-size units
    pub isolation_gap: f32,
    /// Fraction of alphabetic characters in upper case
    pub caps_ratio: f32,
    /// Midpoint close to the page midpoint
    pub centered: bool,
    /// Number of characters in the trimmed text
    pub char_count: usize,
    /// Number of words
    pub word_count: usize,
    /// Ends with `.`, `!` or `?`, ignoring a bare enumeration label
    pub ends_with_period: bool,
    /// Ends with `:`
    pub ends_with_colon: bool,
}

/// Computes [`FeatureVector`]s page by page.
pub struct FeatureExtractor<'a> {
    config: &'a OutlineConfig,
    patterns: &'a TextPatterns,
    cue_words: Vec<String>,
}

impl<'a> FeatureExtractor<'a> {
    /// Create an extractor.
    pub fn new(config: &'a OutlineConfig, patterns: &'a TextPatterns) -> Self {
        // Fields are public, so cue words may arrive in any case
        let cue_words = config
            .cue_words
            .iter()
            .map(|w| w.trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        Self {
            config,
            patterns,
            cue_words,
        }
    }

    /// Features of every line on a page, in line order.
    pub fn page_features(&self, page: &Page, stats: &DocumentStats) -> Vec<FeatureVector> {
        let margin = median_left_margin(page);

        page.lines
            .iter()
            .enumerate()
            .map(|(i, line)| {
                let prev = i.checked_sub(1).and_then(|j| page.lines.get(j));
                let next = page.lines.get(i + 1);
                self.line_features(line, prev, next, page, margin, stats)
            })
            .collect()
    }

    fn line_features(
        &self,
        line: &Line,
        prev: Option<&Line>,
        next: Option<&Line>,
        page: &Page,
        margin: f32,
        stats: &DocumentStats,
    ) -> FeatureVector {
        let text = line.text.trim();
        let size = if line.font_size > 0.0 { line.font_size } else { 1.0 };
        let body = if stats.body_font_size > 0.0 {
            stats.body_font_size
        } else {
            DEFAULT_BODY_FONT_SIZE
        };

        let bare_label = self.patterns.is_bare_label(text);

        FeatureVector {
            font_ratio: line.font_size / body,
            bold_ratio: line.bold_ratio,
            indent_level: (line.bbox.x0 - margin) / size,
            enumeration_depth: self.patterns.enumeration_depth(text),
            keyword_hit: self.keyword_hit(text),
            isolation_gap: self.isolation_gap(line, prev, next, size),
            caps_ratio: caps_ratio(text),
            centered: self.is_centered(line, page),
            char_count: text.chars().count(),
            word_count: line.word_count(),
            ends_with_period: !bare_label && text.ends_with(['.', '!', '?']),
            ends_with_colon: text.ends_with(':'),
        }
    }

    /// Whether the text, minus any enumeration label, opens with a cue phrase.
    pub fn keyword_hit(&self, text: &str) -> bool {
        let stripped = self.patterns.strip_enumeration(text.trim()).trim().to_lowercase();
        if stripped.is_empty() {
            return false;
        }

        self.cue_words.iter().any(|cue| {
            stripped == *cue
                || stripped
                    .strip_prefix(cue.as_str())
                    .and_then(|rest| rest.chars().next())
                    .map(|c| !c.is_alphabetic())
                    .unwrap_or(false)
        })
    }

    fn isolation_gap(&self, line: &Line, prev: Option<&Line>, next: Option<&Line>, size: f32) -> f32 {
        let cap = self.config.isolation_cap;
        let side = |gap: Option<f32>| match gap {
            Some(g) => (g / size).clamp(0.0, cap),
            None => cap,
        };

        let above = side(prev.map(|p| line.top() - p.bottom()));
        let below = side(next.map(|n| n.top() - line.bottom()));
        (above + below) / 2.0
    }

    fn is_centered(&self, line: &Line, page: &Page) -> bool {
        if page.width <= 0.0 {
            return false;
        }
        (line.bbox.mid_x() - page.width / 2.0).abs() <= self.config.center_tolerance * page.width
    }
}

fn caps_ratio(text: &str) -> f32 {
    let (upper, alpha) = text
        .chars()
        .filter(|c| c.is_alphabetic())
        .fold((0usize, 0usize), |(u, a), c| (u + c.is_uppercase() as usize, a + 1));
    if alpha == 0 {
        0.0
    } else {
        upper as f32 / alpha as f32
    }
}
