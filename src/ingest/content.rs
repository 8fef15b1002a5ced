//! Content-stream interpreter producing positioned spans.
//!
//! Only the text and transformation operators are interpreted. Glyph
//! widths are not read from font programs; every character is assumed to
//! advance half the font size, which is accurate enough for line grouping.

use std::collections::BTreeMap;

use lopdf::{Dictionary, Document as LopdfDocument, Object};

use crate::error::{Error, Result};
use crate::model::{BBox, Span};
use crate::text::is_spaceless_script_char;

/// Estimated glyph advance as a fraction of the font size.
const GLYPH_ADVANCE: f32 = 0.5;
/// Ascender and descender as fractions of the font size.
const ASCENT: f32 = 0.8;
const DESCENT: f32 = 0.2;
/// `TJ` adjustment (thousandths of an em) treated as a word space.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// Page box used to convert PDF user space to top-down coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    /// Left edge of the MediaBox
    pub left: f32,
    /// Top edge of the MediaBox (largest y in user space)
    pub top: f32,
    /// Page width
    pub width: f32,
    /// Page height
    pub height: f32,
}

impl PageGeometry {
    /// US Letter at the origin.
    pub fn letter() -> Self {
        Self::from_media_box([0.0, 0.0, 612.0, 792.0])
    }

    /// Build from a `[x0 y0 x1 y1]` MediaBox, in any corner order.
    pub fn from_media_box(b: [f32; 4]) -> Self {
        let (left, right) = (b[0].min(b[2]), b[0].max(b[2]));
        let (bottom, top) = (b[1].min(b[3]), b[1].max(b[3]));
        Self {
            left,
            top,
            width: right - left,
            height: top - bottom,
        }
    }
}

/// 2D affine matrix `[a b c d e f]` in PDF row-vector convention.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
}

impl Matrix {
    const IDENTITY: Matrix = Matrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    fn from_operands(ops: &[Object]) -> Option<Self> {
        if ops.len() < 6 {
            return None;
        }
        Some(Self {
            a: number(&ops[0])?,
            b: number(&ops[1])?,
            c: number(&ops[2])?,
            d: number(&ops[3])?,
            e: number(&ops[4])?,
            f: number(&ops[5])?,
        })
    }

    /// `self × other`
    fn multiply(&self, o: &Matrix) -> Matrix {
        Matrix {
            a: self.a * o.a + self.b * o.c,
            b: self.a * o.b + self.b * o.d,
            c: self.c * o.a + self.d * o.c,
            d: self.c * o.b + self.d * o.d,
            e: self.e * o.a + self.f * o.c + o.e,
            f: self.e * o.b + self.f * o.d + o.f,
        }
    }

    /// Pre-multiply by a translation, as `Td` does.
    fn translate(&self, tx: f32, ty: f32) -> Matrix {
        Matrix {
            e: self.e + tx * self.a + ty * self.c,
            f: self.f + tx * self.b + ty * self.d,
            ..*self
        }
    }

    fn horizontal_scale(&self) -> f32 {
        (self.a * self.a + self.b * self.b).sqrt()
    }

    fn vertical_scale(&self) -> f32 {
        (self.c * self.c + self.d * self.d).sqrt()
    }
}

/// Text state inside a `BT`/`ET` pair.
#[derive(Debug, Clone)]
struct TextState {
    matrix: Matrix,
    line_matrix: Matrix,
    font_key: Vec<u8>,
    font_name: String,
    font_size: f32,
    leading: f32,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            matrix: Matrix::IDENTITY,
            line_matrix: Matrix::IDENTITY,
            font_key: Vec::new(),
            font_name: String::new(),
            font_size: 12.0,
            leading: 0.0,
        }
    }
}

impl TextState {
    fn move_line(&mut self, tx: f32, ty: f32) {
        self.line_matrix = self.line_matrix.translate(tx, ty);
        self.matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        let leading = if self.leading > 0.0 {
            self.leading
        } else {
            self.font_size * 1.2
        };
        self.move_line(0.0, -leading);
    }
}

/// Interprets one page's content stream.
pub struct ContentInterpreter<'a> {
    doc: &'a LopdfDocument,
    fonts: BTreeMap<Vec<u8>, &'a Dictionary>,
    geometry: PageGeometry,
    page: usize,
}

impl<'a> ContentInterpreter<'a> {
    /// Create an interpreter for a page with the given font resources.
    pub fn new(
        doc: &'a LopdfDocument,
        fonts: BTreeMap<Vec<u8>, &'a Dictionary>,
        geometry: PageGeometry,
        page: usize,
    ) -> Self {
        Self {
            doc,
            fonts,
            geometry,
            page,
        }
    }

    /// Decode the content stream and collect text spans in stream order.
    pub fn run(&self, content: &[u8]) -> Result<Vec<Span>> {
        let content = lopdf::content::Content::decode(content)
            .map_err(|e| Error::PdfParse(format!("page {}: {}", self.page, e)))?;

        let mut spans = Vec::new();
        let mut ctm = Matrix::IDENTITY;
        let mut saved: Vec<Matrix> = Vec::new();
        let mut state = TextState::default();
        let mut in_text = false;

        for op in content.operations {
            let operands = op.operands.as_slice();
            match op.operator.as_str() {
                "q" => saved.push(ctm),
                "Q" => {
                    if let Some(m) = saved.pop() {
                        ctm = m;
                    }
                }
                "cm" => {
                    if let Some(m) = Matrix::from_operands(operands) {
                        ctm = m.multiply(&ctm);
                    }
                }
                "BT" => {
                    in_text = true;
                    state.matrix = Matrix::IDENTITY;
                    state.line_matrix = Matrix::IDENTITY;
                }
                "ET" => in_text = false,
                "Tf" => {
                    if let [Object::Name(key), size, ..] = operands {
                        state.font_key = key.clone();
                        state.font_name = self.base_font(key);
                        state.font_size = number(size).unwrap_or(12.0);
                    }
                }
                "TL" => {
                    if let Some(leading) = operands.first().and_then(number) {
                        state.leading = leading;
                    }
                }
                "Td" | "TD" => {
                    if let [tx, ty, ..] = operands {
                        let tx = number(tx).unwrap_or(0.0);
                        let ty = number(ty).unwrap_or(0.0);
                        if op.operator == "TD" {
                            state.leading = -ty;
                        }
                        state.move_line(tx, ty);
                    }
                }
                "Tm" => {
                    if let Some(m) = Matrix::from_operands(operands) {
                        state.matrix = m;
                        state.line_matrix = m;
                    }
                }
                "T*" => state.next_line(),
                "Tj" if in_text => {
                    if let Some(Object::String(bytes, _)) = operands.first() {
                        let text = self.decode(&state.font_key, bytes);
                        let advance = glyph_advance(&text, state.font_size);
                        self.show(&mut state, &ctm, text, advance, &mut spans);
                    }
                }
                "TJ" if in_text => {
                    if let Some(Object::Array(items)) = operands.first() {
                        let (text, advance) = self.decode_array(&state, items);
                        self.show(&mut state, &ctm, text, advance, &mut spans);
                    }
                }
                "'" | "\"" => {
                    state.next_line();
                    let index = if op.operator == "\"" { 2 } else { 0 };
                    if in_text {
                        if let Some(Object::String(bytes, _)) = operands.get(index) {
                            let text = self.decode(&state.font_key, bytes);
                            let advance = glyph_advance(&text, state.font_size);
                            self.show(&mut state, &ctm, text, advance, &mut spans);
                        }
                    }
                }
                _ => {}
            }
        }

        Ok(spans)
    }

    /// Emit a span at the current text position and advance past it.
    fn show(&self, state: &mut TextState, ctm: &Matrix, text: String, advance: f32, spans: &mut Vec<Span>) {
        let device = state.matrix.multiply(ctm);
        state.matrix = state.matrix.translate(advance, 0.0);

        if text.trim().is_empty() {
            return;
        }

        let size = state.font_size * device.vertical_scale();
        let width = advance * device.horizontal_scale();
        let x0 = device.e - self.geometry.left;
        let baseline = self.geometry.top - device.f;

        let bbox = BBox::new(x0, baseline - size * ASCENT, x0 + width, baseline + size * DESCENT);
        spans.push(Span::new(text, size, state.font_name.clone(), bbox, self.page));
    }

    /// Decode a `TJ` array, inserting spaces for wide negative kerning.
    fn decode_array(&self, state: &TextState, items: &[Object]) -> (String, f32) {
        let mut combined = String::new();
        let mut advance = 0.0;

        for item in items {
            match item {
                Object::String(bytes, _) => {
                    let text = self.decode(&state.font_key, bytes);
                    advance += glyph_advance(&text, state.font_size);
                    combined.push_str(&text);
                }
                other => {
                    let Some(n) = number(other) else {
                        continue;
                    };
                    advance -= n / 1000.0 * state.font_size;
                    if -n > TJ_SPACE_THRESHOLD && needs_space(&combined) {
                        combined.push(' ');
                    }
                }
            }
        }

        (combined, advance)
    }

    fn decode(&self, font_key: &[u8], bytes: &[u8]) -> String {
        let encoding = self
            .fonts
            .get(font_key)
            .and_then(|f| f.get_font_encoding(self.doc).ok());

        match encoding {
            Some(ref enc) => LopdfDocument::decode_text(enc, bytes)
                .unwrap_or_else(|_| decode_text_simple(bytes)),
            None => decode_text_simple(bytes),
        }
    }

    fn base_font(&self, key: &[u8]) -> String {
        self.fonts
            .get(key)
            .and_then(|f| f.get(b"BaseFont").ok())
            .and_then(|o| o.as_name().ok())
            .map(|n| strip_subset_prefix(&String::from_utf8_lossy(n)).to_string())
            .unwrap_or_else(|| String::from_utf8_lossy(key).to_string())
    }
}

fn needs_space(text: &str) -> bool {
    match text.chars().last() {
        Some(c) => !c.is_whitespace() && !is_spaceless_script_char(c),
        None => false,
    }
}

fn glyph_advance(text: &str, font_size: f32) -> f32 {
    text.chars().count() as f32 * font_size * GLYPH_ADVANCE
}

/// Drop the `ABCDEF+` tag of subset fonts.
fn strip_subset_prefix(name: &str) -> &str {
    match name.split_once('+') {
        Some((tag, rest)) if tag.len() == 6 && tag.chars().all(|c| c.is_ascii_uppercase()) => rest,
        _ => name,
    }
}

/// Helper to extract number from PDF object.
fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Decoding fallback when the font has no usable encoding.
pub(crate) fn decode_text_simple(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    // Latin-1
    bytes.iter().map(|&b| b as char).collect()
}
