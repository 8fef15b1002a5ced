//! Decoding options.

/// Options for turning a PDF into page spans.
#[derive(Debug, Clone, Default)]
pub struct IngestOptions {
    /// Error handling mode
    pub error_mode: ErrorMode,
}

impl IngestOptions {
    /// Create new options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Enable lenient mode (skip pages that fail to decode).
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }
}

/// Error handling mode during decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Fail the document on any page error
    #[default]
    Strict,
    /// Log the page error and continue with an empty page
    Lenient,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_builder() {
        assert_eq!(IngestOptions::default().error_mode, ErrorMode::Strict);
        assert_eq!(IngestOptions::new().lenient().error_mode, ErrorMode::Lenient);
        assert_eq!(
            IngestOptions::new()
                .with_error_mode(ErrorMode::Lenient)
                .error_mode,
            ErrorMode::Lenient
        );
    }
}
