//! Document model types.
//!
//! Spans come from the decoding layer; lines, pages and headings are
//! derived from them by the heuristics and owned by a single [`Document`].

mod document;
mod line;
mod outline;
mod page;
mod span;

pub use document::Document;
pub use line::Line;
pub use outline::{DocumentOutline, HeadingBlock, HeadingLevel, OutlineEntry};
pub use page::Page;
pub use span::{BBox, PageSpans, Span};
