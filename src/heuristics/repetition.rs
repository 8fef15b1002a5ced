//! Repetition Detector: finds running headers and footers.
//!
//! This is a whole-document pass. Every line is reduced to a signature of
//! normalized text plus a coarse vertical band; signatures seen on enough
//! distinct pages are treated as page furniture and removed before any
//! later stage looks at the lines.

use std::collections::{HashMap, HashSet};

use unicode_normalization::UnicodeNormalization;

use crate::model::{Line, Page};

use super::OutlineConfig;

/// Coarse vertical position of a line on its page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PositionBand {
    /// Top band of the page
    Top,
    /// Bottom band of the page
    Bottom,
    /// Anywhere else
    Other,
}

/// Normalized text paired with a position band.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepetitionSignature {
    /// Case-folded text with collapsed whitespace and digit runs replaced by `#`
    pub text: String,
    /// Vertical band of the line
    pub band: PositionBand,
}

impl RepetitionSignature {
    /// Compute the signature of a line on a page of the given height.
    pub fn of(line: &Line, page_height: f32, band_fraction: f32) -> Self {
        let band = if line.top() < page_height * band_fraction {
            PositionBand::Top
        } else if line.bottom() > page_height * (1.0 - band_fraction) {
            PositionBand::Bottom
        } else {
            PositionBand::Other
        };

        Self {
            text: normalize_text(&line.text),
            band,
        }
    }
}

/// Normalize text for repetition comparison.
pub fn normalize_text(text: &str) -> String {
    let folded: String = text.nfkc().collect::<String>().to_lowercase();

    let mut result = String::with_capacity(folded.len());
    let mut in_digits = false;
    let mut pending_space = false;

    for c in folded.chars() {
        if c.is_whitespace() {
            pending_space = !result.is_empty();
            in_digits = false;
            continue;
        }
        if pending_space {
            result.push(' ');
            pending_space = false;
        }
        if c.is_numeric() {
            if !in_digits {
                result.push('#');
                in_digits = true;
            }
        } else {
            in_digits = false;
            result.push(c);
        }
    }

    result
}

/// Whole-document header/footer detection.
pub struct RepetitionDetector<'a> {
    config: &'a OutlineConfig,
}

impl<'a> RepetitionDetector<'a> {
    /// Create a detector using the given configuration.
    pub fn new(config: &'a OutlineConfig) -> Self {
        Self { config }
    }

    /// Minimum number of distinct pages for a signature to be repetitive.
    ///
    /// Computed in f64 with a small slack so that an exact product such as
    /// 0.15 x 100 is not pushed to the next integer by f32 rounding.
    pub fn min_occurrences(&self, page_count: usize) -> usize {
        let exact = f64::from(self.config.repetition_page_fraction) * page_count as f64;
        let rounded = (exact * 1e4).round() / 1e4;
        (rounded - 1e-9).ceil().max(0.0) as usize
    }

    /// Find the signatures that repeat across the document.
    ///
    /// Documents shorter than `repetition_min_pages` yield an empty set.
    pub fn detect(&self, pages: &[Page]) -> HashSet<RepetitionSignature> {
        let page_count = pages.len();
        if page_count < self.config.repetition_min_pages {
            log::debug!(
                "Skipping repetition detection: {} pages < {}",
                page_count,
                self.config.repetition_min_pages
            );
            return HashSet::new();
        }

        let mut counts: HashMap<RepetitionSignature, usize> = HashMap::new();
        for page in pages {
            let on_page: HashSet<RepetitionSignature> = page
                .lines
                .iter()
                .map(|l| self.signature(l, page))
                .collect();
            for sig in on_page {
                *counts.entry(sig).or_insert(0) += 1;
            }
        }

        let needed = self.min_occurrences(page_count);
        let repetitive: HashSet<RepetitionSignature> = counts
            .into_iter()
            .filter(|(_, count)| *count >= needed)
            .map(|(sig, _)| sig)
            .collect();

        log::debug!(
            "Found {} repetitive signatures (threshold {} of {} pages)",
            repetitive.len(),
            needed,
            page_count
        );
        repetitive
    }

    /// Remove lines matching a repetitive signature; returns how many went.
    pub fn strip(&self, pages: &mut [Page], repetitive: &HashSet<RepetitionSignature>) -> usize {
        if repetitive.is_empty() {
            return 0;
        }

        let mut removed = 0;
        for page in pages.iter_mut() {
            let height = page.height;
            let before = page.lines.len();
            page.lines.retain(|line| {
                let sig = RepetitionSignature::of(line, height, self.config.repetition_band_fraction);
                !repetitive.contains(&sig)
            });
            removed += before - page.lines.len();
        }
        removed
    }

    fn signature(&self, line: &Line, page: &Page) -> RepetitionSignature {
        RepetitionSignature::of(line, page.height, self.config.repetition_band_fraction)
    }
}
