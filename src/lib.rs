//! # pdfoutline
//!
//! Heading outline extraction for PDF documents.
//!
//! The library recovers a document title and an H1/H2/H3 outline from the
//! typography and layout of a PDF, without relying on an embedded outline
//! or tagged structure.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdfoutline::{extract_outline, render};
//!
//! fn main() -> pdfoutline::Result<()> {
//!     let outline = extract_outline("document.pdf")?;
//!
//!     let json = render::to_json(&outline, render::JsonFormat::Pretty)?;
//!     println!("{}", json);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Running header removal**: repeated page furniture never becomes a heading
//! - **Scored candidates**: font size, weight, numbering, cue words and spacing
//! - **Wrapped headings**: consecutive heading lines are merged into one entry
//! - **Pluggable input**: any [`SpanSource`] can feed the heuristics
//! - **Batch mode**: whole directories, optionally in parallel with Rayon

pub mod batch;
pub mod detect;
pub mod error;
pub mod heuristics;
pub mod ingest;
pub mod model;
pub mod render;

mod text;

// Re-export commonly used types
pub use batch::{BatchOptions, BatchReport, BatchRunner, DocumentFailure, DocumentSuccess};
pub use detect::{is_pdf_bytes, sniff_path, PdfHeader};
pub use error::{Error, Result};
pub use heuristics::{OutlineConfig, OutlineExtractor, ScoreWeights, TierSource};
pub use ingest::{ErrorMode, IngestOptions, PdfSource, SpanSource};
pub use model::{
    BBox, Document, DocumentOutline, HeadingBlock, HeadingLevel, Line, OutlineEntry, Page,
    PageSpans, Span,
};
pub use render::JsonFormat;
pub use text::collapse_whitespace;

use std::path::Path;

/// Extract the outline of a PDF file with the default configuration.
///
/// # Example
///
/// ```no_run
/// use pdfoutline::extract_outline;
///
/// let outline = extract_outline("document.pdf").unwrap();
/// println!("{}: {} headings", outline.title, outline.outline.len());
/// ```
pub fn extract_outline<P: AsRef<Path>>(path: P) -> Result<DocumentOutline> {
    extract_outline_with_config(path, OutlineConfig::default())
}

/// Extract the outline of a PDF file with a custom configuration.
///
/// # Example
///
/// ```no_run
/// use pdfoutline::{extract_outline_with_config, OutlineConfig, TierSource};
///
/// let config = OutlineConfig::new()
///     .with_score_threshold(6.0)
///     .with_tier_source(TierSource::DocumentLines);
/// let outline = extract_outline_with_config("document.pdf", config).unwrap();
/// ```
pub fn extract_outline_with_config<P: AsRef<Path>>(
    path: P,
    config: OutlineConfig,
) -> Result<DocumentOutline> {
    let extractor = OutlineExtractor::new(config)?;
    let source = PdfSource::open(path)?;
    extract_from_source(&source, &extractor)
}

/// Extract the outline of a PDF held in memory.
///
/// # Example
///
/// ```no_run
/// use pdfoutline::extract_outline_bytes;
///
/// let data = std::fs::read("document.pdf").unwrap();
/// let outline = extract_outline_bytes(&data).unwrap();
/// ```
pub fn extract_outline_bytes(data: &[u8]) -> Result<DocumentOutline> {
    let extractor = OutlineExtractor::with_defaults()?;
    let source = PdfSource::from_bytes(data)?;
    extract_from_source(&source, &extractor)
}

/// Run an extractor over any span source.
///
/// # Example
///
/// ```
/// use pdfoutline::{extract_from_source, BBox, OutlineExtractor, PageSpans, Span};
///
/// let mut page = PageSpans::letter(0);
/// let bbox = BBox::new(72.0, 80.0, 300.0, 104.0);
/// page.spans.push(Span::new("Annual Report", 24.0, "Helvetica-Bold", bbox, 0));
///
/// let extractor = OutlineExtractor::with_defaults().unwrap();
/// let outline = extract_from_source(&vec![page], &extractor).unwrap();
/// assert_eq!(outline.title, "Annual Report");
/// ```
pub fn extract_from_source<S: SpanSource + ?Sized>(
    source: &S,
    extractor: &OutlineExtractor,
) -> Result<DocumentOutline> {
    let pages = source.page_spans()?;
    log::debug!("Extracting outline from {} pages", pages.len());
    Ok(extractor.extract_outline(pages))
}
