//! Span ingestion.
//!
//! The heuristics only ever see [`PageSpans`]; anything that can produce
//! them implements [`SpanSource`]. [`PdfSource`] decodes real PDF files.

mod content;
mod options;
mod pdf_source;

pub use content::{ContentInterpreter, PageGeometry};
pub use options::{ErrorMode, IngestOptions};
pub use pdf_source::PdfSource;

use crate::error::Result;
use crate::model::PageSpans;

/// Producer of per-page text spans.
pub trait SpanSource {
    /// Number of pages in the document.
    fn page_count(&self) -> usize;

    /// Spans of every page, in page order.
    fn page_spans(&self) -> Result<Vec<PageSpans>>;
}

/// Spans already in memory, e.g. from another decoder or a test.
impl SpanSource for Vec<PageSpans> {
    fn page_count(&self) -> usize {
        self.len()
    }

    fn page_spans(&self) -> Result<Vec<PageSpans>> {
        Ok(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_source() {
        let source = vec![PageSpans::letter(0), PageSpans::letter(1)];
        assert_eq!(source.page_count(), 2);
        assert_eq!(source.page_spans().unwrap().len(), 2);
    }
}
