//! Decoder-side data handed to the bridge
//!
//! These types describe what the decoding engine produces for one source
//! sentence. They are plain values: the bridge reads them, it never keeps
//! them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A source-token to target-token correspondence
///
/// Indices use the engine's native width. They are narrowed to the transfer
/// width only when encoded, see [`crate::alignment::encode_alignment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(usize, usize)", into = "(usize, usize)")]
pub struct AlignmentPair {
    pub source: usize,
    pub target: usize,
}

impl AlignmentPair {
    pub fn new(source: usize, target: usize) -> Self {
        Self { source, target }
    }
}

impl From<(usize, usize)> for AlignmentPair {
    fn from((source, target): (usize, usize)) -> Self {
        Self { source, target }
    }
}

impl From<AlignmentPair> for (usize, usize) {
    fn from(pair: AlignmentPair) -> Self {
        (pair.source, pair.target)
    }
}

/// Which half of an alignment pair an index belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignmentSide {
    Source,
    Target,
}

impl fmt::Display for AlignmentSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlignmentSide::Source => write!(f, "source"),
            AlignmentSide::Target => write!(f, "target"),
        }
    }
}

/// One candidate translation as ranked by the decoder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Output text, may be empty
    pub text: String,

    /// Total model score; never validated
    pub total_score: f32,

    /// Serialized feature breakdown, owned by the decoder and opaque here
    #[serde(default)]
    pub feature_values: String,
}

impl Candidate {
    pub fn new(
        text: impl Into<String>,
        total_score: f32,
        feature_values: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            total_score,
            feature_values: feature_values.into(),
        }
    }
}

/// Everything the decoder produced for one source sentence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecoderOutput {
    /// Final output text
    pub text: String,

    /// Source sentence, when the caller wants it carried on the result
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// n-best list in decoder rank order
    #[serde(default)]
    pub nbest: Vec<Candidate>,

    /// Word alignment of the best hypothesis
    #[serde(default)]
    pub alignment: Vec<AlignmentPair>,
}

impl DecoderOutput {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: None,
            nbest: Vec::new(),
            alignment: Vec::new(),
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_candidate(mut self, candidate: Candidate) -> Self {
        self.nbest.push(candidate);
        self
    }

    pub fn with_alignment<I>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        self.alignment = pairs.into_iter().map(AlignmentPair::from).collect();
        self
    }
}
