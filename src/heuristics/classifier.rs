//! Level Classifier: assigns H1/H2/H3 to merged blocks.
//!
//! Signals are applied in a fixed order. An enumeration label decides the
//! level outright. Otherwise the font-size tier gives the level, and an
//! indented block may then drop one level relative to its siblings of the
//! same tier on the same page.

use std::collections::{BTreeSet, HashMap};

use crate::model::{HeadingBlock, HeadingLevel, Page};
use crate::text::size_key;

use super::merger::MergedBlock;
use super::{OutlineConfig, TierSource};

/// How a block's level was decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Basis {
    Enumeration,
    FontTier(i32),
    Fallback,
}

/// Assigns heading levels.
pub struct LevelClassifier<'a> {
    config: &'a OutlineConfig,
}

impl<'a> LevelClassifier<'a> {
    /// Create a classifier.
    pub fn new(config: &'a OutlineConfig) -> Self {
        Self { config }
    }

    /// Distinct font sizes above body, largest first, as 0.1pt keys.
    pub fn font_tiers(&self, blocks: &[MergedBlock], pages: &[Page], body_font_size: f32) -> Vec<i32> {
        let body = size_key(body_font_size);
        let sizes: BTreeSet<i32> = match self.config.tier_source {
            TierSource::HeadingBlocks => blocks.iter().map(|b| size_key(b.font_size)).collect(),
            TierSource::DocumentLines => pages
                .iter()
                .flat_map(|p| p.lines.iter())
                .map(|l| size_key(l.font_size))
                .collect(),
        };

        sizes.into_iter().rev().filter(|&k| k > body).collect()
    }

    /// Level implied by the font tier of a size, if the size is a tier.
    pub fn tier_level(&self, tiers: &[i32], font_size: f32) -> Option<HeadingLevel> {
        let key = size_key(font_size);
        let rank = tiers.iter().position(|&k| k == key)? + 1;
        if rank > self.config.max_font_tiers {
            Some(HeadingLevel::H3)
        } else {
            HeadingLevel::from_depth(rank)
        }
    }

    /// Classify blocks, preserving their order.
    pub fn classify(
        &self,
        blocks: Vec<MergedBlock>,
        pages: &[Page],
        body_font_size: f32,
    ) -> Vec<HeadingBlock> {
        let tiers = self.font_tiers(&blocks, pages, body_font_size);
        log::debug!("Font tiers (0.1pt): {:?}", tiers);

        let assigned: Vec<(HeadingLevel, Basis)> = blocks
            .iter()
            .map(|block| self.initial_level(block, &tiers))
            .collect();

        // Minimum indent per (page, tier) among blocks placed by font tier
        let mut min_indent: HashMap<(usize, i32), f32> = HashMap::new();
        for (block, (_, basis)) in blocks.iter().zip(&assigned) {
            if let Basis::FontTier(key) = basis {
                let entry = min_indent.entry((block.page, *key)).or_insert(f32::INFINITY);
                *entry = entry.min(block.indent_level);
            }
        }

        let mut demoted = 0;
        let headings: Vec<HeadingBlock> = blocks
            .into_iter()
            .zip(assigned)
            .map(|(block, (level, basis))| {
                let level = match basis {
                    Basis::FontTier(key) => {
                        let floor = min_indent
                            .get(&(block.page, key))
                            .copied()
                            .unwrap_or(block.indent_level);
                        if block.indent_level - floor > self.config.indent_demotion_threshold {
                            demoted += 1;
                            level.demoted()
                        } else {
                            level
                        }
                    }
                    _ => level,
                };

                HeadingBlock {
                    level,
                    page: block.page,
                    text: block.text,
                    bbox: block.bbox,
                    lines: block.lines,
                }
            })
            .collect();

        log::debug!("Classified {} headings ({} demoted by indent)", headings.len(), demoted);
        headings
    }

    fn initial_level(&self, block: &MergedBlock, tiers: &[i32]) -> (HeadingLevel, Basis) {
        if let Some(level) = HeadingLevel::from_depth(block.enumeration_depth) {
            return (level, Basis::Enumeration);
        }
        match self.tier_level(tiers, block.font_size) {
            Some(level) => (level, Basis::FontTier(size_key(block.font_size))),
            None => (HeadingLevel::H3, Basis::Fallback),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BBox, Line, Span};

    fn block(text: &str, size: f32, page: usize, enumeration_depth: usize, indent: f32) -> MergedBlock {
        let span = Span::new(text, size, "Helvetica-Bold", BBox::new(72.0, 100.0, 300.0, 100.0 + size), page);
        let line = Line::from_spans(vec![span]).unwrap();
        MergedBlock::from_line(line, enumeration_depth, indent, 7.0)
    }

    fn levels(headings: &[HeadingBlock]) -> Vec<HeadingLevel> {
        headings.iter().map(|h| h.level).collect()
    }

    #[test]
    fn test_font_tiers_map_to_levels() {
        let config = OutlineConfig::default();
        let classifier = LevelClassifier::new(&config);

        let headings = classifier.classify(
            vec![
                block("Title", 24.0, 0, 0, 0.0),
                block("Section", 18.0, 0, 0, 0.0),
                block("Subsection", 14.0, 0, 0, 0.0),
            ],
            &[],
            11.0,
        );
        assert_eq!(levels(&headings), vec![HeadingLevel::H1, HeadingLevel::H2, HeadingLevel::H3]);
    }

    #[test]
    fn test_extra_tiers_fold_into_h3() {
        let config = OutlineConfig::default().with_max_font_tiers(2);
        let classifier = LevelClassifier::new(&config);

        let headings = classifier.classify(
            vec![
                block("A", 24.0, 0, 0, 0.0),
                block("B", 18.0, 0, 0, 0.0),
                block("C", 16.0, 0, 0, 0.0),
                block("D", 14.0, 0, 0, 0.0),
            ],
            &[],
            11.0,
        );
        assert_eq!(
            levels(&headings),
            vec![HeadingLevel::H1, HeadingLevel::H2, HeadingLevel::H3, HeadingLevel::H3]
        );
    }

    #[test]
    fn test_enumeration_overrides_font_tier() {
        let config = OutlineConfig::default();
        let classifier = LevelClassifier::new(&config);

        let headings = classifier.classify(
            vec![
                block("Big Title", 24.0, 0, 0, 0.0),
                block("1.1 Background", 11.0, 0, 2, 0.0),
                block("3.2.1 Deep but large", 24.0, 0, 3, 0.0),
            ],
            &[],
            11.0,
        );
        assert_eq!(levels(&headings), vec![HeadingLevel::H1, HeadingLevel::H2, HeadingLevel::H3]);
    }

    #[test]
    fn test_body_size_block_without_enumeration_is_h3() {
        let config = OutlineConfig::default();
        let classifier = LevelClassifier::new(&config);

        let headings = classifier.classify(vec![block("Keywords", 11.0, 0, 0, 0.0)], &[], 11.0);
        assert_eq!(levels(&headings), vec![HeadingLevel::H3]);
    }

    #[test]
    fn test_indent_demotes_within_page_and_tier() {
        let config = OutlineConfig::default();
        let classifier = LevelClassifier::new(&config);

        let headings = classifier.classify(
            vec![
                block("Top", 24.0, 0, 0, 0.0),
                block("Left", 18.0, 0, 0, 0.0),
                block("Indented", 18.0, 0, 0, 2.5),
                block("Alone on page two", 18.0, 1, 0, 2.5),
            ],
            &[],
            11.0,
        );
        assert_eq!(
            levels(&headings),
            vec![HeadingLevel::H1, HeadingLevel::H2, HeadingLevel::H3, HeadingLevel::H2]
        );
    }

    #[test]
    fn test_document_lines_tier_source() {
        let config = OutlineConfig::default().with_tier_source(TierSource::DocumentLines);
        let classifier = LevelClassifier::new(&config);

        let mut page = Page::new(0, 612.0, 792.0);
        for size in [24.0, 18.0, 14.0, 11.0] {
            let span = Span::new("x", size, "Helvetica", BBox::new(72.0, 100.0, 90.0, 100.0 + size), 0);
            page.lines.push(Line::from_spans(vec![span]).unwrap());
        }

        let headings = classifier.classify(
            vec![block("Title", 24.0, 0, 0, 0.0), block("Minor", 14.0, 0, 0, 0.0)],
            std::slice::from_ref(&page),
            11.0,
        );
        assert_eq!(levels(&headings), vec![HeadingLevel::H1, HeadingLevel::H3]);

        let default_config = OutlineConfig::default();
        let by_blocks = LevelClassifier::new(&default_config).classify(
            vec![block("Title", 24.0, 0, 0, 0.0), block("Minor", 14.0, 0, 0, 0.0)],
            std::slice::from_ref(&page),
            11.0,
        );
        assert_eq!(levels(&by_blocks), vec![HeadingLevel::H1, HeadingLevel::H2]);
    }
}
