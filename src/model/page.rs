//! Page-level types.

use serde::{Deserialize, Serialize};

use super::Line;

/// A page of assembled lines, in reading order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Page index (0-based)
    pub index: usize,

    /// Page width in points (1 point = 1/72 inch)
    pub width: f32,

    /// Page height in points
    pub height: f32,

    /// Lines ordered top-to-bottom, then left-to-right
    pub lines: Vec<Line>,
}

impl Page {
    /// Create an empty page with the given dimensions.
    pub fn new(index: usize, width: f32, height: f32) -> Self {
        Self {
            index,
            width,
            height,
            lines: Vec::new(),
        }
    }

    /// Check if the page has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Get the number of lines on the page.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }
}
