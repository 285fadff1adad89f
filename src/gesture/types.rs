use serde::{Deserialize, Serialize};

/// Per-term breakdown of one stroke-vs-reference comparison.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimilarityDetails {
    pub point: f32,
    pub line: f32,
    pub angle: f32,

    // Weighted blend, 0..=100
    pub score: f32,
}

impl SimilarityDetails {
    pub fn accuracy(&self) -> u32 {
        self.score.round().clamp(0.0, 100.0) as u32
    }
}

/// The scoring contract: a rounded score plus whether the stroke was a
/// deliberate gesture at all. Invalid strokes always score 0.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    pub score: u32,
    pub valid: bool,
}

impl Evaluation {
    pub const INVALID: Evaluation = Evaluation {
        score: 0,
        valid: false,
    };
}
