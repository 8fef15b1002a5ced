//! Span-level types supplied by the decoding layer.

use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in page space.
///
/// Coordinates are top-down: `y0` is the top edge and `y1` the bottom edge,
/// both measured from the top of the page in points.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BBox {
    /// Left edge
    pub x0: f32,
    /// Top edge
    pub y0: f32,
    /// Right edge
    pub x1: f32,
    /// Bottom edge
    pub y1: f32,
}

impl BBox {
    /// Create a new bounding box.
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Width of the box.
    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    /// Height of the box.
    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// Horizontal midpoint.
    pub fn mid_x(&self) -> f32 {
        (self.x0 + self.x1) / 2.0
    }

    /// Whether the box has no usable area.
    pub fn is_degenerate(&self) -> bool {
        !(self.width() > 0.0 && self.height() > 0.0)
    }

    /// Smallest box containing both.
    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// Length of the vertical overlap (0 if disjoint).
    pub fn vertical_overlap(&self, other: &BBox) -> f32 {
        (self.y1.min(other.y1) - self.y0.max(other.y0)).max(0.0)
    }
}

/// A text fragment with font and position information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    /// The text content
    pub text: String,
    /// Font size in points
    pub font_size: f32,
    /// Font family name (e.g., "Helvetica-Bold")
    pub font_name: String,
    /// Whether the font is bold
    pub bold: bool,
    /// Whether the font is italic
    pub italic: bool,
    /// Bounding box in page space
    pub bbox: BBox,
    /// Page index (0-based)
    pub page: usize,
}

impl Span {
    /// Create a new span, inferring bold/italic from the font name.
    pub fn new(
        text: impl Into<String>,
        font_size: f32,
        font_name: impl Into<String>,
        bbox: BBox,
        page: usize,
    ) -> Self {
        let font_name = font_name.into();
        let lower = font_name.to_lowercase();
        let bold = ["bold", "black", "heavy", "semibold"]
            .iter()
            .any(|w| lower.contains(w));
        let italic = lower.contains("italic") || lower.contains("oblique");

        Self {
            text: text.into(),
            font_size,
            font_name,
            bold,
            italic,
            bbox,
            page,
        }
    }

    /// Override the inferred bold flag.
    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    /// Override the inferred italic flag.
    pub fn with_italic(mut self, italic: bool) -> Self {
        self.italic = italic;
        self
    }

    /// Number of non-whitespace characters.
    pub fn visible_chars(&self) -> usize {
        self.text.chars().filter(|c| !c.is_whitespace()).count()
    }
}

/// All spans of one page, in decoder order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageSpans {
    /// Page index (0-based)
    pub index: usize,
    /// Page width in points
    pub width: f32,
    /// Page height in points
    pub height: f32,
    /// Text spans on the page
    pub spans: Vec<Span>,
}

impl PageSpans {
    /// Create an empty page.
    pub fn new(index: usize, width: f32, height: f32) -> Self {
        Self {
            index,
            width,
            height,
            spans: Vec::new(),
        }
    }

    /// Create an empty US Letter page (8.5 x 11 inches).
    pub fn letter(index: usize) -> Self {
        Self::new(index, 612.0, 792.0)
    }

    /// Add a span to the page.
    pub fn push(&mut self, span: Span) {
        self.spans.push(span);
    }
}
