use crate::config::{MatchThresholds, RecognitionParams};
use crate::duel::{Phase, RoundSession};
use crate::error::{WandClashError, WcResult};
use crate::geometry::Point;
use crate::gesture::{CandidateScores, Recognizer, ScoredCandidate, Validity};
use crate::spellbook::{Spell, SpellBook};
use serde::Serialize;
use std::collections::BTreeSet;
use strum_macros::Display;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpellMatch {
    pub spell: Spell,
    pub accuracy: u32,
}

impl From<&ScoredCandidate<'_>> for SpellMatch {
    fn from(c: &ScoredCandidate<'_>) -> Self {
        Self {
            spell: c.spell.clone(),
            accuracy: c.accuracy,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Rejection {
    /// Nothing cleared the phase threshold, or the stroke was not a drawing.
    LowScore,
    /// The best match is an attack this player has already cast.
    AlreadyUsed,
    /// A counter cleared the threshold but does not answer the pending attack.
    WrongDefense,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome {
    Recognized(SpellMatch),
    /// Several unused attacks cleared the threshold; the player must choose.
    Ambiguous(Vec<SpellMatch>),
    NotRecognized {
        reason: Rejection,
        accuracy: u32,
        spell: Option<Spell>,
        validity: Validity,
    },
}

impl MatchOutcome {
    pub fn is_recognized(&self) -> bool {
        matches!(self, MatchOutcome::Recognized(_))
    }

    pub fn to_response(&self) -> MatchResponse {
        match self {
            MatchOutcome::Recognized(m) => MatchResponse {
                recognized: true,
                multiple_matches: None,
                spell: Some(m.spell.clone()),
                accuracy: Some(m.accuracy),
                matches: Vec::new(),
                reason: None,
            },
            MatchOutcome::Ambiguous(matches) => MatchResponse {
                recognized: true,
                multiple_matches: Some(true),
                spell: None,
                accuracy: None,
                matches: matches.clone(),
                reason: None,
            },
            MatchOutcome::NotRecognized {
                reason,
                accuracy,
                spell,
                ..
            } => MatchResponse {
                recognized: false,
                multiple_matches: None,
                spell: spell.clone(),
                accuracy: Some(*accuracy),
                matches: Vec::new(),
                reason: Some(*reason),
            },
        }
    }
}

/// Wire shape of a match outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResponse {
    pub recognized: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multiple_matches: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spell: Option<Spell>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub matches: Vec<SpellMatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<Rejection>,
}

/// What the matcher needs to know about the turn being played.
#[derive(Debug, Clone, Copy)]
pub enum MatchContext<'a> {
    Attack { used: &'a BTreeSet<String> },
    Counter { attack_id: &'a str },
}

impl<'a> MatchContext<'a> {
    pub fn for_session(session: &'a RoundSession) -> WcResult<Self> {
        match session.phase {
            Phase::Attack => Ok(MatchContext::Attack {
                used: session.used_attacks(session.attacker),
            }),
            Phase::Counter => {
                let pending = session
                    .pending_attack
                    .as_ref()
                    .ok_or(WandClashError::NoPendingAttack)?;
                Ok(MatchContext::Counter {
                    attack_id: &pending.spell_id,
                })
            }
        }
    }

    pub fn phase(&self) -> Phase {
        match self {
            MatchContext::Attack { .. } => Phase::Attack,
            MatchContext::Counter { .. } => Phase::Counter,
        }
    }
}

fn not_recognized(
    reason: Rejection,
    best: Option<&ScoredCandidate<'_>>,
    validity: Validity,
) -> MatchOutcome {
    MatchOutcome::NotRecognized {
        reason,
        accuracy: best.map_or(0, |c| c.accuracy),
        spell: best.map(|c| c.spell.clone()),
        validity,
    }
}

#[derive(Debug, Clone)]
pub struct Matcher {
    recognizer: Recognizer,
    thresholds: MatchThresholds,
}

impl Matcher {
    pub fn new(recognizer: Recognizer, thresholds: MatchThresholds) -> Self {
        Self {
            recognizer,
            thresholds,
        }
    }

    pub fn with_spellbook(
        book: &SpellBook,
        params: RecognitionParams,
        thresholds: MatchThresholds,
    ) -> Self {
        Self::new(Recognizer::with_spellbook(book, params), thresholds)
    }

    pub fn recognizer(&self) -> &Recognizer {
        &self.recognizer
    }

    pub fn thresholds(&self) -> &MatchThresholds {
        &self.thresholds
    }

    /// Scores `stroke` against `candidates` and decides the outcome for the
    /// turn described by `ctx`. Only structurally broken strokes are errors;
    /// scribbles and taps come back as `NotRecognized`.
    pub fn match_gesture(
        &self,
        stroke: &[Point],
        candidates: &[&Spell],
        ctx: &MatchContext<'_>,
    ) -> WcResult<MatchOutcome> {
        let scores = self.recognizer.score_candidates(stroke, candidates)?;
        if !scores.validity.is_valid() {
            debug!("Stroke rejected before matching: {}", scores.validity);
            return Ok(not_recognized(Rejection::LowScore, None, scores.validity));
        }

        let outcome = match ctx {
            MatchContext::Attack { used } => self.decide_attack(&scores, used),
            MatchContext::Counter { attack_id } => self.decide_counter(&scores, attack_id),
        };

        match &outcome {
            MatchOutcome::Recognized(m) => {
                info!("Recognized '{}' at {}%", m.spell.id, m.accuracy)
            }
            MatchOutcome::Ambiguous(ms) => info!("{} spells tied above threshold", ms.len()),
            MatchOutcome::NotRecognized {
                reason, accuracy, ..
            } => debug!("Not recognized ({}), best accuracy {}", reason, accuracy),
        }
        Ok(outcome)
    }

    fn decide_attack(&self, scores: &CandidateScores<'_>, used: &BTreeSet<String>) -> MatchOutcome {
        let threshold = self.thresholds.attack_threshold;
        let Some(best) = scores.best() else {
            return not_recognized(Rejection::LowScore, None, scores.validity);
        };
        if best.accuracy < threshold {
            return not_recognized(Rejection::LowScore, Some(best), scores.validity);
        }
        if used.contains(&best.spell.id) {
            return not_recognized(Rejection::AlreadyUsed, Some(best), scores.validity);
        }

        let mut fresh: Vec<SpellMatch> = scores
            .ranked
            .iter()
            .filter(|c| c.accuracy >= threshold && !used.contains(&c.spell.id))
            .map(SpellMatch::from)
            .collect();

        if fresh.len() == 1 {
            MatchOutcome::Recognized(fresh.remove(0))
        } else {
            MatchOutcome::Ambiguous(fresh)
        }
    }

    fn decide_counter(&self, scores: &CandidateScores<'_>, attack_id: &str) -> MatchOutcome {
        let threshold = self.thresholds.counter_threshold;
        let valid = scores
            .ranked
            .iter()
            .find(|c| c.accuracy >= threshold && c.spell.counters_attack(attack_id));
        if let Some(valid) = valid {
            return MatchOutcome::Recognized(SpellMatch::from(valid));
        }
        // Ranked best first, so only the head can clear the threshold here.
        if let Some(wrong) = scores.best().filter(|c| c.accuracy >= threshold) {
            return not_recognized(Rejection::WrongDefense, Some(wrong), scores.validity);
        }
        not_recognized(Rejection::LowScore, scores.best(), scores.validity)
    }
}

/// One-shot matching with a fresh recognizer.
pub fn match_gesture(
    stroke: &[Point],
    candidates: &[&Spell],
    ctx: &MatchContext<'_>,
    params: &RecognitionParams,
    thresholds: &MatchThresholds,
) -> WcResult<MatchOutcome> {
    Matcher::new(Recognizer::new(params.clone()), thresholds.clone())
        .match_gesture(stroke, candidates, ctx)
}

/// Resolves an ambiguous outcome to the spell the player picked.
pub fn confirm_choice(matches: &[SpellMatch], spell_id: &str) -> WcResult<SpellMatch> {
    matches
        .iter()
        .find(|m| m.spell.id == spell_id)
        .cloned()
        .ok_or_else(|| WandClashError::UnknownSpell(spell_id.to_string()))
}
