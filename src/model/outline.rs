//! Heading and outline types.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{BBox, Line};

/// Outline level of a heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HeadingLevel {
    /// Top-level heading
    H1,
    /// Section heading
    H2,
    /// Subsection heading (and anything deeper)
    H3,
}

impl HeadingLevel {
    /// Map a 1-based depth to a level; depths beyond 3 fold into H3.
    ///
    /// Returns `None` for depth 0.
    pub fn from_depth(depth: usize) -> Option<Self> {
        match depth {
            0 => None,
            1 => Some(HeadingLevel::H1),
            2 => Some(HeadingLevel::H2),
            _ => Some(HeadingLevel::H3),
        }
    }

    /// 1-based depth of the level.
    pub fn depth(self) -> usize {
        match self {
            HeadingLevel::H1 => 1,
            HeadingLevel::H2 => 2,
            HeadingLevel::H3 => 3,
        }
    }

    /// One level deeper, saturating at H3.
    pub fn demoted(self) -> Self {
        match self {
            HeadingLevel::H1 => HeadingLevel::H2,
            _ => HeadingLevel::H3,
        }
    }
}

impl fmt::Display for HeadingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "H{}", self.depth())
    }
}

/// One or more merged lines recognized as a single heading.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadingBlock {
    /// Source lines, top to bottom
    pub lines: Vec<Line>,
    /// Assigned level
    pub level: HeadingLevel,
    /// Page index (0-based)
    pub page: usize,
    /// Final heading text
    pub text: String,
    /// Union of the line boxes
    pub bbox: BBox,
}

/// A single entry of the rendered outline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineEntry {
    /// Heading level
    pub level: HeadingLevel,
    /// Heading text
    pub text: String,
    /// Page number, 0-based
    pub page: u32,
}

/// The serialized result for one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentOutline {
    /// Document title (empty when none could be found)
    pub title: String,
    /// Headings in reading order
    pub outline: Vec<OutlineEntry>,
}

impl DocumentOutline {
    /// Outline with an empty title and no headings.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of entries at the given level.
    pub fn count_level(&self, level: HeadingLevel) -> usize {
        self.outline.iter().filter(|e| e.level == level).count()
    }
}
