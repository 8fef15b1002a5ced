//! Document-level types.

use super::{DocumentOutline, HeadingBlock, OutlineEntry, Page};

/// A document after heading analysis.
///
/// Built once per input file; owns its pages, lines and headings.
#[derive(Debug, Clone, Default)]
pub struct Document {
    /// Pages with their surviving (non-repetitive) lines
    pub pages: Vec<Page>,

    /// Selected document title
    pub title: String,

    /// Headings in reading order
    pub headings: Vec<HeadingBlock>,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Check if no page carries any text.
    pub fn is_empty(&self) -> bool {
        self.pages.iter().all(Page::is_empty)
    }

    /// Project the document onto its serializable outline.
    pub fn outline(&self) -> DocumentOutline {
        DocumentOutline {
            title: self.title.clone(),
            outline: self
                .headings
                .iter()
                .map(|h| OutlineEntry {
                    level: h.level,
                    text: h.text.clone(),
                    page: h.page as u32,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BBox, HeadingLevel};

    #[test]
    fn test_outline_projection() {
        let mut doc = Document::new();
        doc.pages.push(Page::new(0, 612.0, 792.0));
        doc.title = "Report".to_string();
        doc.headings.push(HeadingBlock {
            lines: vec![],
            level: HeadingLevel::H1,
            page: 2,
            text: "Results".to_string(),
            bbox: BBox::default(),
        });

        assert!(doc.is_empty());
        let outline = doc.outline();
        assert_eq!(outline.title, "Report");
        assert_eq!(outline.outline.len(), 1);
        assert_eq!(outline.outline[0].page, 2);
        assert_eq!(outline.count_level(HeadingLevel::H1), 1);
    }
}
