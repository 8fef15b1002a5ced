//! The full heading pipeline for one document.

use std::collections::HashSet;

use unicode_normalization::UnicodeNormalization;

use crate::error::Result;
use crate::model::{Document, DocumentOutline, Page, PageSpans};
use crate::text::collapse_whitespace;

use super::assembler::assemble_page;
use super::classifier::LevelClassifier;
use super::features::{DocumentStats, FeatureExtractor};
use super::merger::{LineMerger, MergedBlock, ScoredLine};
use super::patterns::TextPatterns;
use super::repetition::RepetitionDetector;
use super::scorer::HeadingScorer;
use super::title::TitleSelector;
use super::OutlineConfig;

/// Runs every heuristic stage over the spans of a document.
///
/// The extractor holds only immutable configuration and compiled patterns,
/// so one instance can serve many documents, including from several threads.
///
/// # Example
///
/// ```
/// use pdfoutline::heuristics::{OutlineConfig, OutlineExtractor};
/// use pdfoutline::model::{BBox, PageSpans, Span};
///
/// let mut page = PageSpans::letter(0);
/// page.push(Span::new("Quarterly Report", 24.0, "Helvetica-Bold", BBox::new(72.0, 72.0, 300.0, 96.0), 0));
///
/// let extractor = OutlineExtractor::new(OutlineConfig::default()).unwrap();
/// let outline = extractor.extract_outline(vec![page]);
/// assert_eq!(outline.title, "Quarterly Report");
/// ```
#[derive(Debug, Clone)]
pub struct OutlineExtractor {
    config: OutlineConfig,
    patterns: TextPatterns,
}

impl OutlineExtractor {
    /// Create an extractor, validating the configuration first.
    pub fn new(config: OutlineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            patterns: TextPatterns::new()?,
        })
    }

    /// Create an extractor with the default configuration.
    pub fn with_defaults() -> Result<Self> {
        Self::new(OutlineConfig::default())
    }

    /// The configuration in use.
    pub fn config(&self) -> &OutlineConfig {
        &self.config
    }

    /// Assemble lines and strip running headers and footers.
    pub fn assemble(&self, mut pages: Vec<PageSpans>) -> Vec<Page> {
        pages.sort_by_key(|p| p.index);

        let mut pages: Vec<Page> = pages
            .into_iter()
            .map(|p| assemble_page(p, &self.config))
            .collect();

        let detector = RepetitionDetector::new(&self.config);
        let repetitive = detector.detect(&pages);
        let removed = detector.strip(&mut pages, &repetitive);
        if removed > 0 {
            log::debug!("Removed {} repetitive lines", removed);
        }

        pages
    }

    /// Run the whole pipeline and keep the intermediate document.
    pub fn extract(&self, pages: Vec<PageSpans>) -> Document {
        let pages = self.assemble(pages);
        let stats = DocumentStats::from_pages(&pages);
        log::debug!("Body font size: {:.1}pt", stats.body_font_size);

        let candidates = self.candidates(&pages, &stats);
        log::debug!("Found {} heading candidates", candidates.len());

        let mut blocks = LineMerger::new(&self.config, &self.patterns).merge(candidates);
        if self.config.dedupe_headings {
            let removed = dedupe_blocks(&mut blocks);
            if removed > 0 {
                log::debug!("Dropped {} repeated headings", removed);
            }
        }

        let title = TitleSelector::new(&self.config, &self.patterns).select(
            pages.first(),
            stats.body_font_size,
            &blocks,
        );

        if self.config.drop_title_from_outline {
            self.drop_title_blocks(&mut blocks, &pages, &title);
        }

        let headings =
            LevelClassifier::new(&self.config).classify(blocks, &pages, stats.body_font_size);

        Document {
            pages,
            title,
            headings,
        }
    }

    /// Run the whole pipeline and return only the serializable outline.
    pub fn extract_outline(&self, pages: Vec<PageSpans>) -> DocumentOutline {
        self.extract(pages).outline()
    }

    fn candidates(&self, pages: &[Page], stats: &DocumentStats) -> Vec<ScoredLine> {
        let extractor = FeatureExtractor::new(&self.config, &self.patterns);
        let scorer = HeadingScorer::new(&self.config, &self.patterns);

        let mut candidates = Vec::new();
        for page in pages {
            let features = extractor.page_features(page, stats);
            for (line, features) in page.lines.iter().zip(features) {
                let result = scorer.score(line, &features);
                log::trace!(
                    "p{} {:?} score={:.2} candidate={}",
                    page.index,
                    line.text,
                    result.score,
                    result.is_candidate
                );
                if result.is_candidate {
                    candidates.push(ScoredLine {
                        line: line.clone(),
                        features,
                        score: result.score,
                    });
                }
            }
        }
        candidates
    }

    fn drop_title_blocks(&self, blocks: &mut Vec<MergedBlock>, pages: &[Page], title: &str) {
        let Some(first) = pages.first() else {
            return;
        };
        if title.is_empty() {
            return;
        }

        let title = title.to_lowercase();
        blocks.retain(|b| !(b.page == first.index && b.text.to_lowercase() == title));
    }
}

/// Keep only the first block of each heading text; returns how many went.
///
/// Texts compare after NFKC folding, lowercasing and whitespace collapsing.
/// Digits are kept, so "Chapter 1" and "Chapter 2" stay distinct.
fn dedupe_blocks(blocks: &mut Vec<MergedBlock>) -> usize {
    let before = blocks.len();
    let mut seen = HashSet::new();
    blocks.retain(|b| seen.insert(heading_key(&b.text)));
    before - blocks.len()
}

fn heading_key(text: &str) -> String {
    collapse_whitespace(&text.nfkc().collect::<String>()).to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BBox, HeadingLevel, Span};

    fn span(text: &str, y0: f32, size: f32, bold: bool, page: usize) -> Span {
        let width = text.chars().count() as f32 * size * 0.5;
        Span::new(text, size, "Helvetica", BBox::new(72.0, y0, 72.0 + width, y0 + size), page)
            .with_bold(bold)
    }

    fn body_lines(page: &mut PageSpans, start: f32, count: usize) {
        for i in 0..count {
            page.push(span(
                "Body text that runs across the whole column and keeps going on",
                start + i as f32 * 14.0,
                11.0,
                false,
                page.index,
            ));
        }
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = OutlineConfig::default().with_score_threshold(-1.0);
        assert!(OutlineExtractor::new(config).is_err());
    }

    #[test]
    fn test_empty_document() {
        let extractor = OutlineExtractor::with_defaults().unwrap();
        let outline = extractor.extract_outline(vec![]);
        assert_eq!(outline, DocumentOutline::empty());

        let outline = extractor.extract_outline(vec![PageSpans::letter(0), PageSpans::letter(1)]);
        assert_eq!(outline.title, "");
        assert!(outline.outline.is_empty());
    }

    #[test]
    fn test_single_page_outline() {
        let extractor = OutlineExtractor::with_defaults().unwrap();

        let mut page = PageSpans::letter(0);
        page.push(span("System Design Notes", 60.0, 24.0, true, 0));
        page.push(span("Introduction", 130.0, 18.0, true, 0));
        body_lines(&mut page, 170.0, 5);
        page.push(span("Scope of Work", 270.0, 14.0, true, 0));
        body_lines(&mut page, 300.0, 5);

        let doc = extractor.extract(vec![page]);
        assert_eq!(doc.title, "System Design Notes");

        let outline = doc.outline();
        let entries: Vec<(HeadingLevel, &str)> = outline
            .outline
            .iter()
            .map(|e| (e.level, e.text.as_str()))
            .collect();
        assert_eq!(
            entries,
            vec![
                (HeadingLevel::H1, "System Design Notes"),
                (HeadingLevel::H2, "Introduction"),
                (HeadingLevel::H3, "Scope of Work"),
            ]
        );
    }

    #[test]
    fn test_drop_title_from_outline() {
        let config = OutlineConfig::default().with_drop_title_from_outline(true);
        let extractor = OutlineExtractor::new(config).unwrap();

        let mut page = PageSpans::letter(0);
        page.push(span("System Design Notes", 60.0, 24.0, true, 0));
        page.push(span("Introduction", 130.0, 18.0, true, 0));
        body_lines(&mut page, 170.0, 5);

        let outline = extractor.extract_outline(vec![page]);
        assert_eq!(outline.title, "System Design Notes");
        assert_eq!(outline.outline.len(), 1);
        assert_eq!(outline.outline[0].text, "Introduction");
        assert_eq!(outline.outline[0].level, HeadingLevel::H1);
    }

    #[test]
    fn test_repeated_heading_text_is_kept_once() {
        let mut first = PageSpans::letter(0);
        first.push(span("Service Manual", 60.0, 24.0, true, 0));
        first.push(span("Safety Notes", 130.0, 18.0, true, 0));
        body_lines(&mut first, 170.0, 3);
        let mut second = PageSpans::letter(1);
        second.push(span("SAFETY  NOTES", 200.0, 18.0, true, 1));
        body_lines(&mut second, 240.0, 3);
        second.push(span("Chapter 2", 320.0, 18.0, true, 1));
        body_lines(&mut second, 360.0, 3);

        let pages = vec![first, second];
        let extractor = OutlineExtractor::with_defaults().unwrap();
        let texts: Vec<(String, u32)> = extractor
            .extract_outline(pages.clone())
            .outline
            .into_iter()
            .map(|e| (e.text, e.page))
            .collect();
        assert_eq!(
            texts,
            vec![
                ("Service Manual".to_string(), 0),
                ("Safety Notes".to_string(), 0),
                ("Chapter 2".to_string(), 1),
            ]
        );

        let config = OutlineConfig::default().with_dedupe_headings(false);
        let outline = OutlineExtractor::new(config).unwrap().extract_outline(pages);
        assert_eq!(outline.outline.len(), 4);
    }

    #[test]
    fn test_heading_key_keeps_digits() {
        assert_eq!(heading_key(" Safety\tNotes "), heading_key("SAFETY NOTES"));
        assert_ne!(heading_key("Chapter 1"), heading_key("Chapter 2"));
    }

    #[test]
    fn test_pages_are_processed_in_index_order() {
        let extractor = OutlineExtractor::with_defaults().unwrap();

        let mut first = PageSpans::letter(0);
        first.push(span("Opening Remarks", 80.0, 20.0, true, 0));
        body_lines(&mut first, 120.0, 3);
        let mut second = PageSpans::letter(1);
        second.push(span("Closing Remarks", 80.0, 20.0, true, 1));
        body_lines(&mut second, 120.0, 3);

        let outline = extractor.extract_outline(vec![second, first]);
        let pages: Vec<u32> = outline.outline.iter().map(|e| e.page).collect();
        assert_eq!(pages, vec![0, 1]);
        assert_eq!(outline.title, "Opening Remarks");
    }
}
