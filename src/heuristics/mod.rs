//! Heading detection heuristics.
//!
//! Stages run strictly in order over one document:
//!
//! 1. [`assembler`] groups spans into lines
//! 2. [`repetition`] removes running headers and footers (whole-document pass)
//! 3. [`features`] computes per-line signals against the document body size
//! 4. [`scorer`] turns signals into a score and a candidate flag
//! 5. [`merger`] joins wrapped heading lines
//! 6. [`classifier`] assigns H1/H2/H3
//! 7. [`title`] picks the title from the first page
//!
//! [`OutlineExtractor`] wires them together.

pub mod assembler;
pub mod classifier;
mod config;
pub mod features;
pub mod merger;
pub mod patterns;
mod pipeline;
pub mod repetition;
pub mod scorer;
pub mod title;

pub use config::{OutlineConfig, ScoreWeights, TierSource};
pub use features::{DocumentStats, FeatureVector};
pub use pipeline::OutlineExtractor;
pub use repetition::{PositionBand, RepetitionSignature};
