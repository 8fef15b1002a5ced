//! Heading Scorer: linear score plus hard filters.

use crate::model::Line;

use super::features::FeatureVector;
use super::patterns::TextPatterns;
use super::OutlineConfig;

/// Reason a line was excluded regardless of its score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// No alphanumeric character after trimming
    NoContent,
    /// Looks like a page number
    PageNumber,
    /// At least `max_heading_words` words
    TooLong,
}

/// Score of a single line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadingScore {
    /// Weighted sum of the features
    pub score: f32,
    /// Hard filter that rejected the line, if any
    pub rejection: Option<Rejection>,
    /// Whether the line is a heading candidate
    pub is_candidate: bool,
}

/// Reduces a feature vector to a heading score.
pub struct HeadingScorer<'a> {
    config: &'a OutlineConfig,
    patterns: &'a TextPatterns,
}

impl<'a> HeadingScorer<'a> {
    /// Create a scorer.
    pub fn new(config: &'a OutlineConfig, patterns: &'a TextPatterns) -> Self {
        Self { config, patterns }
    }

    /// Weighted linear combination of the features.
    pub fn raw_score(&self, f: &FeatureVector) -> f32 {
        let w = &self.config.weights;
        let length_penalty = f.word_count.saturating_sub(self.config.length_cap) as f32;

        w.font_ratio * f.font_ratio + w.bold * f.bold_ratio
            + w.enumeration * flag(f.enumeration_depth > 0)
            + w.keyword * flag(f.keyword_hit)
            + w.isolation * f.isolation_gap
            + w.centered * flag(f.centered)
            + w.caps * f.caps_ratio
            - w.length * length_penalty
            - w.terminal_punctuation * flag(f.ends_with_period)
    }

    /// First hard filter the line fails, if any.
    pub fn rejection(&self, line: &Line, f: &FeatureVector) -> Option<Rejection> {
        let text = line.text.trim();
        if !text.chars().any(char::is_alphanumeric) {
            return Some(Rejection::NoContent);
        }
        if self.patterns.is_page_number(text) {
            return Some(Rejection::PageNumber);
        }
        if f.word_count >= self.config.max_heading_words {
            return Some(Rejection::TooLong);
        }
        None
    }

    /// Score a line and decide whether it is a heading candidate.
    pub fn score(&self, line: &Line, f: &FeatureVector) -> HeadingScore {
        let score = self.raw_score(f);
        let rejection = self.rejection(line, f);

        HeadingScore {
            score,
            rejection,
            is_candidate: rejection.is_none() && score >= self.config.score_threshold,
        }
    }
}

fn flag(b: bool) -> f32 {
    if b {
        1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BBox, Span};

    fn features() -> FeatureVector {
        FeatureVector {
            font_ratio: 1.0,
            bold_ratio: 0.0,
            indent_level: 0.0,
            enumeration_depth: 0,
            keyword_hit: false,
            isolation_gap: 0.3,
            caps_ratio: 0.05,
            centered: false,
            char_count: 60,
            word_count: 10,
            ends_with_period: false,
            ends_with_colon: false,
        }
    }

    fn line(text: &str) -> Line {
        let span = Span::new(text, 11.0, "Helvetica", BBox::new(72.0, 100.0, 300.0, 111.0), 0);
        Line::from_spans(vec![span]).unwrap()
    }

    #[test]
    fn test_body_line_is_not_candidate() {
        let config = OutlineConfig::default();
        let patterns = TextPatterns::new().unwrap();
        let scorer = HeadingScorer::new(&config, &patterns);

        let result = scorer.score(&line("plain body text without any emphasis here"), &features());
        assert!(!result.is_candidate);
        assert!(result.score < config.score_threshold);
    }

    #[test]
    fn test_enumerated_body_size_line_is_candidate() {
        let config = OutlineConfig::default();
        let patterns = TextPatterns::new().unwrap();
        let scorer = HeadingScorer::new(&config, &patterns);

        let f = FeatureVector {
            enumeration_depth: 2,
            keyword_hit: true,
            isolation_gap: 1.5,
            word_count: 2,
            ..features()
        };
        let result = scorer.score(&line("1.1 Background"), &f);
        assert!(result.is_candidate, "score was {}", result.score);
    }

    #[test]
    fn test_large_bold_line_is_candidate() {
        let config = OutlineConfig::default();
        let patterns = TextPatterns::new().unwrap();
        let scorer = HeadingScorer::new(&config, &patterns);

        let f = FeatureVector {
            font_ratio: 14.0 / 11.0,
            bold_ratio: 1.0,
            word_count: 3,
            ..features()
        };
        assert!(scorer.score(&line("Project Scope Details"), &f).is_candidate);
    }

    #[test]
    fn test_length_and_terminal_penalties() {
        let config = OutlineConfig::default();
        let patterns = TextPatterns::new().unwrap();
        let scorer = HeadingScorer::new(&config, &patterns);

        let base = scorer.raw_score(&features());
        let long = scorer.raw_score(&FeatureVector {
            word_count: 16,
            ..features()
        });
        assert!((base - long - 4.0 * config.weights.length).abs() < 1e-5);

        let sentence = scorer.raw_score(&FeatureVector {
            ends_with_period: true,
            ..features()
        });
        assert!((base - sentence - config.weights.terminal_punctuation).abs() < 1e-5);
    }

    #[test]
    fn test_hard_filters() {
        let config = OutlineConfig::default();
        let patterns = TextPatterns::new().unwrap();
        let scorer = HeadingScorer::new(&config, &patterns);

        let strong = FeatureVector {
            font_ratio: 2.0,
            bold_ratio: 1.0,
            word_count: 4,
            ..features()
        };

        let result = scorer.score(&line("Page 3 of 5"), &strong);
        assert_eq!(result.rejection, Some(Rejection::PageNumber));
        assert!(!result.is_candidate);

        let result = scorer.score(&line("* * *"), &strong);
        assert_eq!(result.rejection, Some(Rejection::NoContent));

        let too_long = FeatureVector {
            word_count: config.max_heading_words + 1,
            ..strong
        };
        let result = scorer.score(&line("words"), &too_long);
        assert_eq!(result.rejection, Some(Rejection::TooLong));
    }

    #[test]
    fn test_word_limit_is_exclusive() {
        let config = OutlineConfig::default();
        let patterns = TextPatterns::new().unwrap();
        let scorer = HeadingScorer::new(&config, &patterns);

        let at_limit = FeatureVector {
            word_count: config.max_heading_words,
            ..features()
        };
        assert_eq!(scorer.rejection(&line("words"), &at_limit), Some(Rejection::TooLong));

        let below = FeatureVector {
            word_count: config.max_heading_words - 1,
            ..features()
        };
        assert_eq!(scorer.rejection(&line("words"), &below), None);
    }

    #[test]
    fn test_threshold_is_configurable() {
        let config = OutlineConfig::default().with_score_threshold(3.0);
        let patterns = TextPatterns::new().unwrap();
        let scorer = HeadingScorer::new(&config, &patterns);
        assert!(scorer.score(&line("plain body text"), &features()).is_candidate);
    }
}
