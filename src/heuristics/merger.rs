//! Line Merger: fuses heading lines that wrap onto several rows.
//!
//! The merge is a left fold over candidates in reading order. Each
//! candidate either extends the open block or closes it and opens a new
//! one; decisions are local and never revisited.

use crate::model::{BBox, Line};
use crate::text::collapse_whitespace;

use super::features::FeatureVector;
use super::patterns::TextPatterns;
use super::OutlineConfig;

/// A heading candidate together with its features and score.
#[derive(Debug, Clone)]
pub struct ScoredLine {
    /// The candidate line
    pub line: Line,
    /// Its feature vector
    pub features: FeatureVector,
    /// Its heading score
    pub score: f32,
}

/// One or more consecutive candidate lines treated as a single heading.
#[derive(Debug, Clone)]
pub struct MergedBlock {
    /// Source lines, top to bottom
    pub lines: Vec<Line>,
    /// Joined text
    pub text: String,
    /// Page index (0-based)
    pub page: usize,
    /// Font size of the first line
    pub font_size: f32,
    /// Bold ratio of the first line
    pub bold_ratio: f32,
    /// Enumeration depth of the first line
    pub enumeration_depth: usize,
    /// Indent level of the first line
    pub indent_level: f32,
    /// Union of the line boxes
    pub bbox: BBox,
    /// Highest score among the lines
    pub score: f32,
}

impl MergedBlock {
    /// Open a block from a single line.
    pub fn from_line(line: Line, enumeration_depth: usize, indent_level: f32, score: f32) -> Self {
        Self {
            text: collapse_whitespace(&line.text),
            page: line.page,
            font_size: line.font_size,
            bold_ratio: line.bold_ratio,
            enumeration_depth,
            indent_level,
            bbox: line.bbox,
            score,
            lines: vec![line],
        }
    }

    /// Bottom edge of the block.
    pub fn bottom(&self) -> f32 {
        self.bbox.y1
    }

    /// Append a line below the block.
    pub fn extend(&mut self, line: Line, score: f32) {
        self.text = collapse_whitespace(&format!("{} {}", self.text, line.text));
        self.bbox = self.bbox.union(&line.bbox);
        self.score = self.score.max(score);
        self.lines.push(line);
    }
}

/// Greedy merger of adjacent heading candidates.
pub struct LineMerger<'a> {
    config: &'a OutlineConfig,
    patterns: &'a TextPatterns,
}

impl<'a> LineMerger<'a> {
    /// Create a merger.
    pub fn new(config: &'a OutlineConfig, patterns: &'a TextPatterns) -> Self {
        Self { config, patterns }
    }

    /// Whether `line` may be appended to `block`.
    pub fn accepts(&self, block: &MergedBlock, line: &Line, enumeration_depth: usize) -> bool {
        if line.page != block.page || enumeration_depth > 0 {
            return false;
        }

        let gap = line.top() - block.bottom();
        if gap > self.config.merge_gap_ratio * block.font_size {
            return false;
        }
        if (line.font_size - block.font_size).abs() > self.config.merge_font_tolerance {
            return false;
        }
        if (line.bold_ratio - block.bold_ratio).abs() > self.config.merge_bold_tolerance {
            return false;
        }

        !self.looks_finished(&block.text)
    }

    /// Text ending in sentence punctuation, unless it is only a list label.
    pub fn looks_finished(&self, text: &str) -> bool {
        let text = text.trim();
        text.ends_with(['.', '!', '?']) && !self.patterns.is_bare_label(text)
    }

    /// Fold candidates, already in reading order, into blocks.
    pub fn merge(&self, candidates: Vec<ScoredLine>) -> Vec<MergedBlock> {
        let total = candidates.len();

        let blocks = candidates.into_iter().fold(Vec::<MergedBlock>::new(), |mut blocks, c| {
            match blocks.last_mut() {
                Some(block) if self.accepts(block, &c.line, c.features.enumeration_depth) => {
                    block.extend(c.line, c.score);
                }
                _ => blocks.push(MergedBlock::from_line(
                    c.line,
                    c.features.enumeration_depth,
                    c.features.indent_level,
                    c.score,
                )),
            }
            blocks
        });

        log::debug!("Merged {} candidates into {} blocks", total, blocks.len());
        blocks
    }
}
