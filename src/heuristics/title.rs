//! Title Selector: picks the document title from the first page.

use crate::model::{Line, Page};
use crate::text::{collapse_whitespace, size_key};

use super::merger::{LineMerger, MergedBlock};
use super::patterns::TextPatterns;
use super::OutlineConfig;

/// Titles shorter than this fall back to a heading.
const MIN_TITLE_CHARS: usize = 5;

/// Chooses the title among first-page lines.
pub struct TitleSelector<'a> {
    config: &'a OutlineConfig,
    patterns: &'a TextPatterns,
}

impl<'a> TitleSelector<'a> {
    /// Create a selector.
    pub fn new(config: &'a OutlineConfig, patterns: &'a TextPatterns) -> Self {
        Self { config, patterns }
    }

    /// Select the title of a document.
    ///
    /// `first_page` holds the surviving lines of the first page in reading
    /// order. The largest-font line nearest the top wins, extended by the
    /// max-size lines that directly follow it when they pass the merge test.
    /// When the largest size is not clearly dominant the first line is used.
    ///
    /// A result shorter than five characters, or one that is only an
    /// enumeration label or page number, is replaced by the first heading
    /// block with real content, when there is one.
    pub fn select(
        &self,
        first_page: Option<&Page>,
        body_font_size: f32,
        headings: &[MergedBlock],
    ) -> String {
        let title = self.first_page_title(first_page, body_font_size);
        if self.is_meaningful(&title) {
            return title;
        }

        match headings.iter().find(|b| self.is_meaningful(&b.text)) {
            Some(block) => {
                log::debug!("Title {:?} too weak; using heading {:?}", title, block.text);
                block.text.clone()
            }
            None => title,
        }
    }

    fn is_meaningful(&self, text: &str) -> bool {
        let text = text.trim();
        text.chars().count() >= MIN_TITLE_CHARS
            && !self.patterns.is_bare_label(text)
            && !self.patterns.is_page_number(text)
    }

    fn first_page_title(&self, first_page: Option<&Page>, body_font_size: f32) -> String {
        let page = match first_page {
            Some(p) if !p.lines.is_empty() => p,
            _ => return String::new(),
        };

        let max_key = page
            .lines
            .iter()
            .map(|l| size_key(l.font_size))
            .max()
            .unwrap_or(0);

        if self.is_crowded(page, max_key, body_font_size) {
            let fallback = collapse_whitespace(&page.lines[0].text);
            log::debug!("No dominant title size; falling back to first line {:?}", fallback);
            return fallback;
        }

        let Some(start) = page.lines.iter().position(|l| size_key(l.font_size) == max_key) else {
            return String::new();
        };

        let merger = LineMerger::new(self.config, self.patterns);
        let first = page.lines[start].clone();
        let depth = self.patterns.enumeration_depth(&first.text);
        let mut block = MergedBlock::from_line(first, depth, 0.0, 0.0);

        for line in &page.lines[start + 1..] {
            if size_key(line.font_size) != max_key {
                break;
            }
            if !merger.accepts(&block, line, self.patterns.enumeration_depth(&line.text)) {
                break;
            }
            block.extend(line.clone(), 0.0);
        }

        log::debug!("Selected title {:?} from {} line(s)", block.text, block.lines.len());
        block.text
    }

    /// Whether the largest size fails to single out a title.
    fn is_crowded(&self, page: &Page, max_key: i32, body_font_size: f32) -> bool {
        let at_max: Vec<&Line> = page
            .lines
            .iter()
            .filter(|l| size_key(l.font_size) == max_key)
            .collect();

        if max_key <= size_key(body_font_size) && at_max.len() > 1 {
            return true;
        }

        if at_max.len() >= self.config.title_crowd_lines && page.height > 0.0 {
            let top = at_max.iter().map(|l| l.top()).fold(f32::INFINITY, f32::min);
            let bottom = at_max.iter().map(|l| l.bottom()).fold(f32::NEG_INFINITY, f32::max);
            return (bottom - top) / page.height >= self.config.title_crowd_span;
        }

        false
    }
}
