//! PDF header sniffing.
//!
//! Used before handing a file to the decoder and when scanning input
//! directories, so that obviously foreign files are rejected cheaply.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Information read from a `%PDF-x.y` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfHeader {
    /// PDF version (e.g., "1.7", "2.0")
    pub version: String,
}

impl std::fmt::Display for PdfHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PDF {}", self.version)
    }
}

const PDF_MAGIC: &[u8] = b"%PDF-";
const VERSION_LEN: usize = 3;

/// Read and validate the header of a file on disk.
pub fn sniff_path<P: AsRef<Path>>(path: P) -> Result<PdfHeader> {
    let mut file = File::open(path)?;
    let mut header = [0u8; 16];
    let read = file.read(&mut header)?;
    sniff_bytes(&header[..read])
}

/// Validate the header at the start of `data`.
pub fn sniff_bytes(data: &[u8]) -> Result<PdfHeader> {
    let Some(rest) = data.strip_prefix(PDF_MAGIC) else {
        return Err(Error::UnknownFormat);
    };
    if rest.len() < VERSION_LEN {
        return Err(Error::UnknownFormat);
    }

    let version = String::from_utf8_lossy(&rest[..VERSION_LEN]).to_string();
    let bytes = version.as_bytes();
    if !(bytes[0].is_ascii_digit() && bytes[1] == b'.' && bytes[2].is_ascii_digit()) {
        return Err(Error::UnsupportedVersion(version));
    }

    Ok(PdfHeader { version })
}

/// Whether the path carries a `.pdf` extension (case-insensitive).
pub fn has_pdf_extension<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

/// Check if bytes start with a valid PDF header.
pub fn is_pdf_bytes(data: &[u8]) -> bool {
    sniff_bytes(data).is_ok()
}
