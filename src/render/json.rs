//! JSON rendering of document outlines.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::model::DocumentOutline;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Convert an outline to JSON.
pub fn to_json(outline: &DocumentOutline, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(outline),
        JsonFormat::Compact => serde_json::to_string(outline),
    };

    result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}

/// Serialize an outline to a file, creating parent directories as needed.
pub fn write_json<P: AsRef<Path>>(outline: &DocumentOutline, path: P, format: JsonFormat) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut json = to_json(outline, format)?;
    json.push('\n');
    fs::write(path, json)?;
    Ok(())
}

/// Output path for an input document: `<output_dir>/<stem>.json`.
pub fn output_path<P: AsRef<Path>, Q: AsRef<Path>>(input: P, output_dir: Q) -> PathBuf {
    let stem = input
        .as_ref()
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "document".to_string());
    output_dir.as_ref().join(format!("{}.json", stem))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{HeadingLevel, OutlineEntry};

    fn sample() -> DocumentOutline {
        DocumentOutline {
            title: "Test".to_string(),
            outline: vec![OutlineEntry {
                level: HeadingLevel::H1,
                text: "Introduction".to_string(),
                page: 0,
            }],
        }
    }

    #[test]
    fn test_to_json_pretty() {
        let json = to_json(&sample(), JsonFormat::Pretty).unwrap();
        assert!(json.contains("\"title\": \"Test\""));
        assert!(json.contains("\"level\": \"H1\""));
        assert!(json.contains('\n'));
    }

    #[test]
    fn test_to_json_compact() {
        let json = to_json(&sample(), JsonFormat::Compact).unwrap();
        assert_eq!(
            json,
            r#"{"title":"Test","outline":[{"level":"H1","text":"Introduction","page":0}]}"#
        );
    }

    #[test]
    fn test_empty_outline_shape() {
        let json = to_json(&DocumentOutline::empty(), JsonFormat::Compact).unwrap();
        assert_eq!(json, r#"{"title":"","outline":[]}"#);
    }

    #[test]
    fn test_output_path_uses_stem() {
        let path = output_path("/data/in/report.v2.PDF", "/data/out");
        assert_eq!(path, PathBuf::from("/data/out/report.v2.json"));
    }

    #[test]
    fn test_write_json_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("doc.json");
        write_json(&sample(), &path, JsonFormat::Compact).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        let parsed: DocumentOutline = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed, sample());
    }
}
