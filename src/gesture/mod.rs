pub mod loader;
pub mod normalize;
pub mod similarity;
pub mod types;
pub mod validity;

pub use self::normalize::{normalize, resample, NormalizedStroke};
pub use self::similarity::similarity_details;
pub use self::types::{Evaluation, SimilarityDetails};
pub use self::validity::{classify, is_valid_drawing, Validity};

use crate::config::RecognitionParams;
use crate::error::WcResult;
use crate::geometry::{validate_stroke, Point};
use crate::spellbook::{Spell, SpellBook};
use rayon::prelude::*;
use std::borrow::Cow;
use std::collections::HashMap;
use tracing::debug;

/// Similarity of two raw strokes with the default parameters. 0..=100.
pub fn similarity(user: &[Point], reference: &[Point]) -> f32 {
    similarity_with(user, reference, &RecognitionParams::default())
}

pub fn similarity_with(user: &[Point], reference: &[Point], params: &RecognitionParams) -> f32 {
    let n = params.resample_points;
    similarity_details(&normalize(user, n), &normalize(reference, n), params).score
}

/// The scoring contract with the default parameters.
pub fn evaluate_drawing(user: &[Point], reference: &[Point]) -> Evaluation {
    evaluate_drawing_with(user, reference, &RecognitionParams::default())
}

pub fn evaluate_drawing_with(
    user: &[Point],
    reference: &[Point],
    params: &RecognitionParams,
) -> Evaluation {
    if !is_valid_drawing(user, params) {
        return Evaluation::INVALID;
    }
    Evaluation {
        score: similarity_with(user, reference, params).round() as u32,
        valid: true,
    }
}

/// A user stroke classified and normalized once, ready to be compared
/// against any number of references.
#[derive(Debug, Clone)]
pub struct PreparedStroke {
    pub validity: Validity,
    pub normalized: NormalizedStroke,
}

#[derive(Debug, Clone, Copy)]
pub struct ScoredCandidate<'s> {
    pub spell: &'s Spell,
    pub details: SimilarityDetails,
    pub accuracy: u32,
}

/// Result of scoring one stroke against a candidate set. `ranked` is sorted
/// best first and is empty when the stroke was not a valid drawing.
#[derive(Debug, Clone)]
pub struct CandidateScores<'s> {
    pub validity: Validity,
    pub ranked: Vec<ScoredCandidate<'s>>,
}

impl<'s> CandidateScores<'s> {
    pub fn best(&self) -> Option<&ScoredCandidate<'s>> {
        self.ranked.first()
    }
}

#[derive(Debug, Clone)]
struct CachedReference {
    source: Vec<Point>,
    normalized: NormalizedStroke,
}

/// Scores strokes against reference spells. Reference patterns are
/// immutable during a game, so their normalized forms are computed once.
#[derive(Debug, Clone)]
pub struct Recognizer {
    params: RecognitionParams,
    cache: HashMap<String, CachedReference>,
}

impl Recognizer {
    pub fn new(params: RecognitionParams) -> Self {
        Self {
            params,
            cache: HashMap::new(),
        }
    }

    pub fn with_spellbook(book: &SpellBook, params: RecognitionParams) -> Self {
        let mut recognizer = Self::new(params);
        for spell in book.spells() {
            recognizer.memoize(spell);
        }
        debug!("Memoized {} reference patterns", recognizer.cache.len());
        recognizer
    }

    pub fn params(&self) -> &RecognitionParams {
        &self.params
    }

    pub fn cached_count(&self) -> usize {
        self.cache.len()
    }

    pub fn memoize(&mut self, spell: &Spell) {
        let normalized = normalize(&spell.gesture_pattern, self.params.resample_points);
        self.cache.insert(
            spell.id.clone(),
            CachedReference {
                source: spell.gesture_pattern.clone(),
                normalized,
            },
        );
    }

    /// Cached normalized form, or a fresh one if the spell is unknown or its
    /// points were corrected since it was cached.
    pub fn reference<'a>(&'a self, spell: &Spell) -> Cow<'a, NormalizedStroke> {
        match self.cache.get(&spell.id) {
            Some(cached) if cached.source == spell.gesture_pattern => {
                Cow::Borrowed(&cached.normalized)
            }
            _ => Cow::Owned(normalize(
                &spell.gesture_pattern,
                self.params.resample_points,
            )),
        }
    }

    /// Fails only on structurally unusable input (empty, non-finite).
    pub fn prepare(&self, stroke: &[Point]) -> WcResult<PreparedStroke> {
        validate_stroke(stroke)?;
        let validity = classify(stroke, &self.params);
        Ok(PreparedStroke {
            validity,
            normalized: normalize(stroke, self.params.resample_points),
        })
    }

    pub fn evaluate(&self, stroke: &[Point], reference: &[Point]) -> Evaluation {
        evaluate_drawing_with(stroke, reference, &self.params)
    }

    pub fn details(&self, prepared: &PreparedStroke, spell: &Spell) -> SimilarityDetails {
        similarity_details(&prepared.normalized, &self.reference(spell), &self.params)
    }

    pub fn evaluate_spell(&self, prepared: &PreparedStroke, spell: &Spell) -> Evaluation {
        if !prepared.validity.is_valid() {
            return Evaluation::INVALID;
        }
        Evaluation {
            score: self.details(prepared, spell).accuracy(),
            valid: true,
        }
    }

    pub fn score_candidates<'s>(
        &self,
        stroke: &[Point],
        candidates: &[&'s Spell],
    ) -> WcResult<CandidateScores<'s>> {
        let prepared = self.prepare(stroke)?;
        Ok(self.score_prepared(&prepared, candidates))
    }

    pub fn score_prepared<'s>(
        &self,
        prepared: &PreparedStroke,
        candidates: &[&'s Spell],
    ) -> CandidateScores<'s> {
        if !prepared.validity.is_valid() {
            return CandidateScores {
                validity: prepared.validity,
                ranked: Vec::new(),
            };
        }

        let mut ranked: Vec<ScoredCandidate<'s>> = candidates
            .par_iter()
            .map(|&spell| {
                let details = self.details(prepared, spell);
                ScoredCandidate {
                    spell,
                    details,
                    accuracy: details.accuracy(),
                }
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.accuracy
                .cmp(&a.accuracy)
                .then_with(|| b.details.score.total_cmp(&a.details.score))
        });

        CandidateScores {
            validity: prepared.validity,
            ranked,
        }
    }
}
