//! Tunable parameters of the heading heuristics.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Where the Level Classifier takes its font-size tiers from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierSource {
    /// Distinct sizes of the merged heading blocks
    #[default]
    HeadingBlocks,
    /// Distinct sizes of every surviving line
    DocumentLines,
}

/// Weights of the linear heading score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    /// Multiplies `font_ratio`
    pub font_ratio: f32,
    /// Multiplies `bold_ratio`
    pub bold: f32,
    /// Added when an enumeration label is present
    pub enumeration: f32,
    /// Added on a cue-word hit
    pub keyword: f32,
    /// Multiplies `isolation_gap`
    pub isolation: f32,
    /// Added when the line is centered
    pub centered: f32,
    /// Subtracted per word over `length_cap`
    pub length: f32,
    /// Multiplies `caps_ratio`
    pub caps: f32,
    /// Subtracted when the line ends like a sentence
    pub terminal_punctuation: f32,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            font_ratio: 4.0,
            bold: 1.5,
            enumeration: 2.0,
            keyword: 1.0,
            isolation: 0.3,
            centered: 0.5,
            length: 0.25,
            caps: 0.5,
            terminal_punctuation: 1.5,
        }
    }
}

impl ScoreWeights {
    fn named(&self) -> [(&'static str, f32); 9] {
        [
            ("weights.font_ratio", self.font_ratio),
            ("weights.bold", self.bold),
            ("weights.enumeration", self.enumeration),
            ("weights.keyword", self.keyword),
            ("weights.isolation", self.isolation),
            ("weights.centered", self.centered),
            ("weights.length", self.length),
            ("weights.caps", self.caps),
            ("weights.terminal_punctuation", self.terminal_punctuation),
        ]
    }
}

/// Configuration of the outline extractor.
///
/// Every threshold and weight the heuristics use lives here so that callers
/// can tune them per corpus. Load from JSON with serde; missing fields take
/// their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlineConfig {
    // Line assembly
    /// Minimum vertical overlap, relative to the smaller height, for two spans to share a row
    pub row_overlap_ratio: f32,
    /// Maximum horizontal gap inside a line, in font-size units
    pub span_gap_ratio: f32,

    // Repetition
    /// Fraction of pages a signature must appear on to be repetitive
    pub repetition_page_fraction: f32,
    /// Documents with fewer pages skip repetition detection
    pub repetition_min_pages: usize,
    /// Height fraction of the top and bottom position bands
    pub repetition_band_fraction: f32,

    // Features
    /// Cue phrases that suggest a heading (lowercase)
    pub cue_words: Vec<String>,
    /// Upper bound of each side of the isolation gap, in font-size units
    pub isolation_cap: f32,
    /// Maximum distance of the line midpoint from the page midpoint, as a page-width fraction
    pub center_tolerance: f32,

    // Scoring
    /// Weights of the linear score
    pub weights: ScoreWeights,
    /// Minimum score of a heading candidate
    pub score_threshold: f32,
    /// Word count after which the length penalty starts
    pub length_cap: usize,
    /// Lines with this many words or more are never headings
    pub max_heading_words: usize,

    // Merging
    /// Maximum vertical gap between merged lines, in font-size units
    pub merge_gap_ratio: f32,
    /// Maximum font size difference between merged lines, in points
    pub merge_font_tolerance: f32,
    /// Maximum bold ratio difference between merged lines
    pub merge_bold_tolerance: f32,
    /// Keep only the first heading of each normalized text
    pub dedupe_headings: bool,

    // Levels
    /// Number of distinct font tiers before folding into H3
    pub max_font_tiers: usize,
    /// Source of the font tiers
    pub tier_source: TierSource,
    /// Extra indentation, in font-size units, that demotes a block by one level
    pub indent_demotion_threshold: f32,

    // Title
    /// Number of max-size lines that makes page 1 "crowded"
    pub title_crowd_lines: usize,
    /// Height fraction those lines must span to count as crowded
    pub title_crowd_span: f32,
    /// Remove page-1 headings equal to the title from the outline
    pub drop_title_from_outline: bool,
}

impl Default for OutlineConfig {
    fn default() -> Self {
        Self {
            row_overlap_ratio: 0.5,
            span_gap_ratio: 3.0,
            repetition_page_fraction: 0.5,
            repetition_min_pages: 3,
            repetition_band_fraction: 0.1,
            cue_words: default_cue_words(),
            isolation_cap: 3.0,
            center_tolerance: 0.08,
            weights: ScoreWeights::default(),
            score_threshold: 5.5,
            length_cap: 12,
            max_heading_words: 18,
            merge_gap_ratio: 1.0,
            merge_font_tolerance: 1.0,
            merge_bold_tolerance: 0.5,
            dedupe_headings: true,
            max_font_tiers: 3,
            tier_source: TierSource::HeadingBlocks,
            indent_demotion_threshold: 1.0,
            title_crowd_lines: 4,
            title_crowd_span: 0.5,
            drop_title_from_outline: false,
        }
    }
}

fn default_cue_words() -> Vec<String> {
    [
        "introduction",
        "conclusion",
        "conclusions",
        "summary",
        "executive summary",
        "overview",
        "background",
        "methodology",
        "methods",
        "results",
        "discussion",
        "references",
        "bibliography",
        "appendix",
        "annex",
        "chapter",
        "section",
        "part",
        "abstract",
        "acknowledgments",
        "acknowledgements",
        "preface",
        "foreword",
        "table of contents",
        "contents",
        "list of figures",
        "list of tables",
        "glossary",
        "definitions",
        "scope",
        "purpose",
        "terms of reference",
        "requirements",
        "evaluation",
        "timeline",
        "milestones",
        "approach",
        "findings",
        "analysis",
        "preamble",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl OutlineConfig {
    /// Create a configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the scoring weights.
    pub fn with_weights(mut self, weights: ScoreWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Set the heading candidate threshold.
    pub fn with_score_threshold(mut self, threshold: f32) -> Self {
        self.score_threshold = threshold;
        self
    }

    /// Set the repetition thresholds.
    pub fn with_repetition(mut self, page_fraction: f32, min_pages: usize) -> Self {
        self.repetition_page_fraction = page_fraction;
        self.repetition_min_pages = min_pages;
        self
    }

    /// Set the maximum heading word count.
    pub fn with_max_heading_words(mut self, words: usize) -> Self {
        self.max_heading_words = words;
        self
    }

    /// Set the merge gap tolerance.
    pub fn with_merge_gap_ratio(mut self, ratio: f32) -> Self {
        self.merge_gap_ratio = ratio;
        self
    }

    /// Set the font tier cap.
    pub fn with_max_font_tiers(mut self, tiers: usize) -> Self {
        self.max_font_tiers = tiers;
        self
    }

    /// Set the font tier source.
    pub fn with_tier_source(mut self, source: TierSource) -> Self {
        self.tier_source = source;
        self
    }

    /// Replace the cue-word list.
    pub fn with_cue_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cue_words = words.into_iter().map(|w| w.into().to_lowercase()).collect();
        self
    }

    /// Enable or disable duplicate-heading suppression.
    pub fn with_dedupe_headings(mut self, dedupe: bool) -> Self {
        self.dedupe_headings = dedupe;
        self
    }

    /// Drop page-1 headings that repeat the title.
    pub fn with_drop_title_from_outline(mut self, drop: bool) -> Self {
        self.drop_title_from_outline = drop;
        self
    }

    /// Parse a configuration from JSON and validate it.
    ///
    /// Cue words are lowercased, as with [`OutlineConfig::with_cue_words`].
    pub fn from_json(json: &str) -> Result<Self> {
        let mut config: Self = serde_json::from_str(json)
            .map_err(|e| Error::InvalidConfig(format!("malformed JSON: {}", e)))?;
        for word in &mut config.cue_words {
            *word = word.to_lowercase();
        }
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the heuristics cannot run with.
    pub fn validate(&self) -> Result<()> {
        let non_negative = [
            ("row_overlap_ratio", self.row_overlap_ratio),
            ("span_gap_ratio", self.span_gap_ratio),
            ("isolation_cap", self.isolation_cap),
            ("center_tolerance", self.center_tolerance),
            ("merge_gap_ratio", self.merge_gap_ratio),
            ("merge_font_tolerance", self.merge_font_tolerance),
            ("merge_bold_tolerance", self.merge_bold_tolerance),
            ("indent_demotion_threshold", self.indent_demotion_threshold),
            ("title_crowd_span", self.title_crowd_span),
        ];
        for (name, value) in non_negative.into_iter().chain(self.weights.named()) {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }

        if !self.score_threshold.is_finite() || self.score_threshold < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "score_threshold must be a non-negative number, got {}",
                self.score_threshold
            )));
        }
        if !(self.repetition_page_fraction > 0.0 && self.repetition_page_fraction <= 1.0) {
            return Err(Error::InvalidConfig(format!(
                "repetition_page_fraction must be in (0, 1], got {}",
                self.repetition_page_fraction
            )));
        }
        if !(self.repetition_band_fraction > 0.0 && self.repetition_band_fraction < 0.5) {
            return Err(Error::InvalidConfig(format!(
                "repetition_band_fraction must be in (0, 0.5), got {}",
                self.repetition_band_fraction
            )));
        }
        if self.row_overlap_ratio > 1.0 {
            return Err(Error::InvalidConfig(format!(
                "row_overlap_ratio must not exceed 1, got {}",
                self.row_overlap_ratio
            )));
        }

        let positive_counts = [
            ("repetition_min_pages", self.repetition_min_pages),
            ("max_heading_words", self.max_heading_words),
            ("max_font_tiers", self.max_font_tiers),
            ("title_crowd_lines", self.title_crowd_lines),
        ];
        for (name, value) in positive_counts {
            if value == 0 {
                return Err(Error::InvalidConfig(format!("{} must be at least 1", name)));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(OutlineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_negative_weight() {
        let mut weights = ScoreWeights::default();
        weights.bold = -1.0;
        let config = OutlineConfig::new().with_weights(weights);
        let err = config.validate().unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
        assert!(err.to_string().contains("weights.bold"));
    }

    #[test]
    fn test_rejects_negative_threshold() {
        let config = OutlineConfig::new().with_score_threshold(-0.5);
        assert!(config.validate().is_err());
        let config = OutlineConfig::new().with_score_threshold(f32::NAN);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_page_divisors() {
        assert!(OutlineConfig::new().with_repetition(0.0, 3).validate().is_err());
        assert!(OutlineConfig::new().with_repetition(0.5, 0).validate().is_err());
        assert!(OutlineConfig::new().with_repetition(1.5, 3).validate().is_err());
        assert!(OutlineConfig::new().with_max_font_tiers(0).validate().is_err());
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let config = OutlineConfig::from_json(
            r#"{"score_threshold": 4.0, "weights": {"bold": 2.0}, "tier_source": "document_lines"}"#,
        )
        .unwrap();
        assert_eq!(config.score_threshold, 4.0);
        assert_eq!(config.weights.bold, 2.0);
        assert_eq!(config.weights.font_ratio, ScoreWeights::default().font_ratio);
        assert_eq!(config.tier_source, TierSource::DocumentLines);
        assert_eq!(config.repetition_min_pages, 3);
    }

    #[test]
    fn test_from_json_rejects_invalid_values() {
        let err = OutlineConfig::from_json(r#"{"merge_gap_ratio": -1.0}"#).unwrap_err();
        assert!(err.to_string().contains("merge_gap_ratio"));
        assert!(OutlineConfig::from_json("{not json").is_err());
    }

    #[test]
    fn test_cue_words_are_lowercased() {
        let config = OutlineConfig::new().with_cue_words(["Scope", "TIMELINE"]);
        assert_eq!(config.cue_words, vec!["scope", "timeline"]);

        let config = OutlineConfig::from_json(r#"{"cue_words":["Timeline"]}"#).unwrap();
        assert_eq!(config.cue_words, vec!["timeline"]);
    }
}
