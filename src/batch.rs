//! Directory batch processing.
//!
//! Every PDF in an input directory is processed independently; a failing
//! document is recorded in the [`BatchReport`] and never stops the run.

use std::fs;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;

use crate::detect::has_pdf_extension;
use crate::error::{Error, Result};
use crate::heuristics::{OutlineConfig, OutlineExtractor};
use crate::ingest::{IngestOptions, PdfSource, SpanSource};
use crate::render::{output_path, write_json, JsonFormat};

type Outcome = std::result::Result<DocumentSuccess, DocumentFailure>;

/// Options for a batch run.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Process documents on the rayon thread pool
    pub parallel: bool,
    /// JSON layout of the output files
    pub format: JsonFormat,
    /// Decoder options for each document
    pub ingest: IngestOptions,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            format: JsonFormat::Pretty,
            ingest: IngestOptions::default(),
        }
    }
}

impl BatchOptions {
    /// Create new options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable parallel processing.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Set the output format.
    pub fn with_format(mut self, format: JsonFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the decoder options.
    pub fn with_ingest_options(mut self, ingest: IngestOptions) -> Self {
        self.ingest = ingest;
        self
    }
}

/// A document whose outline was written.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSuccess {
    /// Input PDF
    pub input: PathBuf,
    /// Written JSON file
    pub output: PathBuf,
    /// Selected title
    pub title: String,
    /// Number of outline entries
    pub headings: usize,
    /// Wall time in milliseconds
    pub elapsed_ms: u128,
}

/// A document that could not be processed.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentFailure {
    /// Input PDF
    pub input: PathBuf,
    /// Error message
    pub error: String,
}

/// Outcome of a batch run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    /// Documents processed successfully, in input order
    pub succeeded: Vec<DocumentSuccess>,
    /// Documents that failed, in input order
    pub failed: Vec<DocumentFailure>,
}

impl BatchReport {
    /// Number of documents attempted.
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    /// Whether every document succeeded.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// List the PDF files of a directory, sorted by file name.
///
/// Matching is on the `.pdf` extension, case-insensitive; subdirectories
/// are not descended into.
pub fn scan_pdfs<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir.as_ref())? {
        let path = entry?.path();
        if path.is_file() && has_pdf_extension(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Runs the outline extractor over a directory of PDFs.
pub struct BatchRunner {
    extractor: OutlineExtractor,
    options: BatchOptions,
}

impl BatchRunner {
    /// Create a runner; fails if the configuration is invalid.
    pub fn new(config: OutlineConfig, options: BatchOptions) -> Result<Self> {
        Ok(Self {
            extractor: OutlineExtractor::new(config)?,
            options,
        })
    }

    /// The options in use.
    pub fn options(&self) -> &BatchOptions {
        &self.options
    }

    /// Process every PDF in `input_dir`, writing `<stem>.json` files to `output_dir`.
    pub fn run<P, Q>(&self, input_dir: P, output_dir: Q) -> Result<BatchReport>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        self.run_with_progress(input_dir, output_dir, |_, _| {})
    }

    /// Like [`run`](Self::run), calling `progress(input, ok)` after each document.
    pub fn run_with_progress<P, Q, F>(
        &self,
        input_dir: P,
        output_dir: Q,
        progress: F,
    ) -> Result<BatchReport>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
        F: Fn(&Path, bool) + Sync,
    {
        let files = scan_pdfs(input_dir.as_ref())?;
        let output_dir = output_dir.as_ref();
        fs::create_dir_all(output_dir)?;

        log::info!(
            "Processing {} PDF files from {}",
            files.len(),
            input_dir.as_ref().display()
        );

        let process = |input: &PathBuf| {
            let result = self.process_isolated(input, output_dir);
            progress(input, result.is_ok());
            result
        };

        let results: Vec<Outcome> = if self.options.parallel {
            files.par_iter().map(process).collect()
        } else {
            files.iter().map(process).collect()
        };

        let mut report = BatchReport::default();
        for result in results {
            match result {
                Ok(success) => report.succeeded.push(success),
                Err(failure) => report.failed.push(failure),
            }
        }

        log::info!(
            "Batch finished: {} succeeded, {} failed",
            report.succeeded.len(),
            report.failed.len()
        );
        Ok(report)
    }

    /// Process one file, writing its JSON into `output_dir`.
    pub fn process_file(&self, input: &Path, output_dir: &Path) -> Result<DocumentSuccess> {
        let start = Instant::now();
        log::info!("Processing {}", input.display());

        let source = PdfSource::open_with_options(input, self.options.ingest.clone())?;
        let pages = source.page_spans()?;
        let outline = self.extractor.extract_outline(pages);

        let output = output_path(input, output_dir);
        write_json(&outline, &output, self.options.format)?;

        let elapsed_ms = start.elapsed().as_millis();
        log::info!(
            "Finished {} in {}ms: {} headings",
            input.display(),
            elapsed_ms,
            outline.outline.len()
        );

        Ok(DocumentSuccess {
            input: input.to_path_buf(),
            output,
            title: outline.title,
            headings: outline.outline.len(),
            elapsed_ms,
        })
    }

    /// [`process_file`](Self::process_file) with errors and panics turned into a failure record.
    fn process_isolated(&self, input: &Path, output_dir: &Path) -> Outcome {
        let outcome = catch_unwind(AssertUnwindSafe(|| self.process_file(input, output_dir)))
            .unwrap_or_else(|_| Err(Error::Other("decoder panicked".to_string())));

        outcome.map_err(|e| {
            log::warn!("Skipping {}: {}", input.display(), e);
            DocumentFailure {
                input: input.to_path_buf(),
                error: e.to_string(),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_pdfs_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.pdf", "a.PDF", "notes.txt", "c.pdf.bak"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        fs::create_dir(dir.path().join("sub.pdf")).unwrap();

        let files = scan_pdfs(dir.path()).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.PDF", "b.pdf"]);
    }

    #[test]
    fn test_missing_input_dir_is_fatal() {
        let runner = BatchRunner::new(OutlineConfig::default(), BatchOptions::default()).unwrap();
        let out = tempfile::tempdir().unwrap();
        assert!(runner.run("/nonexistent/input/dir", out.path()).is_err());
    }

    #[test]
    fn test_invalid_config_rejected_up_front() {
        let config = OutlineConfig::default().with_max_font_tiers(0);
        assert!(BatchRunner::new(config, BatchOptions::default()).is_err());
    }

    #[test]
    fn test_bad_documents_are_recorded() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        fs::write(input.path().join("garbage.pdf"), b"not a pdf at all").unwrap();
        fs::write(input.path().join("truncated.pdf"), b"%PDF-1.4\n1 0 obj").unwrap();

        let runner = BatchRunner::new(OutlineConfig::default(), BatchOptions::new().sequential()).unwrap();
        let report = runner.run(input.path(), output.path()).unwrap();

        assert_eq!(report.total(), 2);
        assert_eq!(report.failed.len(), 2);
        assert!(!report.is_clean());
        assert!(fs::read_dir(output.path()).unwrap().next().is_none());
    }

    #[test]
    fn test_options_builder() {
        let options = BatchOptions::new()
            .sequential()
            .with_format(JsonFormat::Compact)
            .with_ingest_options(IngestOptions::new().lenient());
        assert!(!options.parallel);
        assert_eq!(options.format, JsonFormat::Compact);
        assert_eq!(options.ingest.error_mode, crate::ingest::ErrorMode::Lenient);
    }
}
