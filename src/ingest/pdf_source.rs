//! lopdf-backed span source.

use std::io::Read;
use std::path::Path;

use lopdf::{Document as LopdfDocument, Object, ObjectId};

use crate::detect::{sniff_bytes, sniff_path};
use crate::error::{Error, Result};
use crate::model::PageSpans;

use super::content::{ContentInterpreter, PageGeometry};
use super::options::{ErrorMode, IngestOptions};
use super::SpanSource;

/// A decoded PDF document ready to yield spans.
pub struct PdfSource {
    doc: LopdfDocument,
    options: IngestOptions,
}

impl PdfSource {
    /// Open a PDF file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, IngestOptions::default())
    }

    /// Open a PDF file with custom options.
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: IngestOptions) -> Result<Self> {
        let path = path.as_ref();
        let header = sniff_path(path)?;
        log::debug!("Opening {} ({})", path.display(), header);

        let doc = LopdfDocument::load(path)?;
        Self::from_document(doc, options)
    }

    /// Decode a PDF held in memory.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_bytes_with_options(data, IngestOptions::default())
    }

    /// Decode a PDF held in memory with custom options.
    pub fn from_bytes_with_options(data: &[u8], options: IngestOptions) -> Result<Self> {
        sniff_bytes(data)?;
        let doc = LopdfDocument::load_mem(data)?;
        Self::from_document(doc, options)
    }

    /// Decode a PDF from a reader.
    pub fn from_reader<R: Read>(mut reader: R, options: IngestOptions) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes_with_options(&data, options)
    }

    fn from_document(doc: LopdfDocument, options: IngestOptions) -> Result<Self> {
        if doc.is_encrypted() {
            return Err(Error::Encrypted);
        }
        Ok(Self { doc, options })
    }

    /// PDF version string from the file header.
    pub fn version(&self) -> &str {
        &self.doc.version
    }

    /// Spans of a single page (0-based index).
    pub fn extract_page(&self, index: usize) -> Result<PageSpans> {
        let pages = self.doc.get_pages();
        let page_id = pages
            .values()
            .nth(index)
            .copied()
            .ok_or(Error::PageOutOfRange(index as u32, pages.len() as u32))?;
        self.page_spans_for(index, page_id)
    }

    fn page_spans_for(&self, index: usize, page_id: ObjectId) -> Result<PageSpans> {
        let geometry = self.page_geometry(page_id);
        let mut page = PageSpans::new(index, geometry.width, geometry.height);

        let fonts = self.doc.get_page_fonts(page_id).unwrap_or_default();
        let content = self.page_content(page_id)?;
        if content.is_empty() {
            return Ok(page);
        }

        let interpreter = ContentInterpreter::new(&self.doc, fonts, geometry, index);
        page.spans = interpreter.run(&content)?;
        log::debug!("Page {}: decoded {} spans", index, page.spans.len());
        Ok(page)
    }

    /// MediaBox of a page, looking up inherited values; US Letter if absent.
    fn page_geometry(&self, page_id: ObjectId) -> PageGeometry {
        let mut current = Some(page_id);
        let mut hops = 0;

        while let Some(id) = current {
            let Ok(dict) = self.doc.get_dictionary(id) else {
                break;
            };
            if let Some(media_box) = dict
                .get(b"MediaBox")
                .ok()
                .and_then(|o| self.resolve(o).as_array().ok())
                .and_then(|a| media_box_values(a))
            {
                return PageGeometry::from_media_box(media_box);
            }

            hops += 1;
            if hops > 32 {
                break;
            }
            current = dict.get(b"Parent").ok().and_then(|p| p.as_reference().ok());
        }

        PageGeometry::letter()
    }

    /// Concatenated, decompressed content streams of a page.
    fn page_content(&self, page_id: ObjectId) -> Result<Vec<u8>> {
        let page_dict = self.doc.get_dictionary(page_id)?;

        let contents = match page_dict.get(b"Contents") {
            Ok(c) => c,
            Err(_) => return Ok(Vec::new()),
        };

        match self.resolve(contents) {
            Object::Stream(s) => Ok(s
                .decompressed_content()
                .unwrap_or_else(|_| s.content.clone())),
            Object::Array(arr) => {
                let mut content = Vec::new();
                for obj in arr {
                    if let Object::Stream(s) = self.resolve(obj) {
                        let data = s
                            .decompressed_content()
                            .unwrap_or_else(|_| s.content.clone());
                        content.extend_from_slice(&data);
                        content.push(b' ');
                    }
                }
                Ok(content)
            }
            _ => Err(Error::Corrupted(format!(
                "page object {} {} has invalid Contents",
                page_id.0, page_id.1
            ))),
        }
    }

    fn resolve<'a>(&'a self, obj: &'a Object) -> &'a Object {
        match obj {
            Object::Reference(id) => self.doc.get_object(*id).unwrap_or(obj),
            _ => obj,
        }
    }
}

fn media_box_values(array: &[Object]) -> Option<[f32; 4]> {
    if array.len() < 4 {
        return None;
    }
    let mut values = [0.0; 4];
    for (slot, obj) in values.iter_mut().zip(array) {
        *slot = obj.as_float().ok()?;
    }
    Some(values)
}

impl SpanSource for PdfSource {
    fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    fn page_spans(&self) -> Result<Vec<PageSpans>> {
        let pages = self.doc.get_pages();
        let mut result = Vec::with_capacity(pages.len());

        for (index, page_id) in pages.values().copied().enumerate() {
            match self.page_spans_for(index, page_id) {
                Ok(page) => result.push(page),
                Err(e) => {
                    if self.options.error_mode == ErrorMode::Strict {
                        return Err(e);
                    }
                    log::warn!("Skipping text of page {}: {}", index, e);
                    let geometry = self.page_geometry(page_id);
                    result.push(PageSpans::new(index, geometry.width, geometry.height));
                }
            }
        }

        Ok(result)
    }
}
