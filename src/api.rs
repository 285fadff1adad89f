use crate::config::Config;
use crate::duel::{
    apply_attack_result, apply_counter_result, Phase, Player, RoundSession, TurnKey, TurnTimer,
};
use crate::error::{WandClashError, WcResult};
use crate::geometry::{Point, Stroke};
use crate::gesture::Evaluation;
use crate::matcher::{self, MatchContext, MatchOutcome, MatchResponse, Matcher, SpellMatch};
use crate::spellbook::{SpellBook, SpellKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Instant;
use tracing::{debug, info, warn};

/// A gesture sent by a client for the turn it believes is current.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GestureSubmission {
    pub player: Player,
    /// The turn the gesture was drawn for. A resent gesture from an earlier
    /// turn is rejected instead of being replayed against the next one.
    pub turn: TurnKey,
    pub stroke: Stroke,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub expected_version: Option<u64>,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResult {
    pub outcome: MatchResponse,
    pub session: RoundSession,
}

#[derive(Debug, Clone)]
struct PendingChoice {
    player: Player,
    turn: TurnKey,
    stroke: Stroke,
    matches: Vec<SpellMatch>,
}

#[derive(Debug)]
struct SessionSlot {
    session: RoundSession,
    pending_choice: Option<PendingChoice>,
}

type SharedSlot = Arc<Mutex<SessionSlot>>;

/// Hosts any number of duels over one spellbook. Each duel sits behind its
/// own lock, so submissions to one session are applied strictly in order.
pub struct DuelService {
    config: Config,
    spellbook: SpellBook,
    matcher: Matcher,
    sessions: RwLock<HashMap<String, SharedSlot>>,
}

fn check_version(session: &RoundSession, expected: Option<u64>) -> WcResult<()> {
    match expected {
        Some(v) if v != session.version => {
            warn!(
                "Rejected stale submission: version {} != {}",
                v, session.version
            );
            Err(WandClashError::SessionConflict {
                expected: v,
                actual: session.version,
            })
        }
        _ => Ok(()),
    }
}

fn check_turn(session: &RoundSession, submitted: TurnKey) -> WcResult<()> {
    let current = session.turn_key();
    if submitted != current {
        warn!("Rejected gesture for {:?}, session at {:?}", submitted, current);
        return Err(WandClashError::TurnConflict { submitted, current });
    }
    Ok(())
}

impl DuelService {
    pub fn new(config: Config, spellbook: SpellBook) -> WcResult<Self> {
        config.validate()?;
        let needed = config.rules.attacks_per_player();
        let available = spellbook.of_kind(SpellKind::Attack).count();
        if available < needed {
            return Err(WandClashError::Config(format!(
                "{} rounds need {} attack spells per player, spellbook has {}",
                config.rules.total_rounds, needed, available
            )));
        }
        let matcher = Matcher::with_spellbook(
            &spellbook,
            config.recognition.clone(),
            config.thresholds.clone(),
        );
        info!("Duel service ready with {} spells", spellbook.len());
        Ok(Self {
            config,
            spellbook,
            matcher,
            sessions: RwLock::new(HashMap::new()),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn spellbook(&self) -> &SpellBook {
        &self.spellbook
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    fn slot(&self, id: &str) -> WcResult<SharedSlot> {
        let sessions = self
            .sessions
            .read()
            .map_err(|e| WandClashError::SessionPoisoned(e.to_string()))?;
        sessions
            .get(id)
            .cloned()
            .ok_or_else(|| WandClashError::SessionNotFound(id.to_string()))
    }

    fn with_slot<T>(&self, id: &str, f: impl FnOnce(&mut SessionSlot) -> WcResult<T>) -> WcResult<T> {
        let slot = self.slot(id)?;
        let mut guard = slot
            .lock()
            .map_err(|e| WandClashError::SessionPoisoned(e.to_string()))?;
        f(&mut guard)
    }

    pub fn create_duel(&self, id: &str) -> WcResult<RoundSession> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|e| WandClashError::SessionPoisoned(e.to_string()))?;
        if sessions.contains_key(id) {
            return Err(WandClashError::SessionExists(id.to_string()));
        }
        let session = RoundSession::new(&self.config.rules);
        sessions.insert(
            id.to_string(),
            Arc::new(Mutex::new(SessionSlot {
                session: session.clone(),
                pending_choice: None,
            })),
        );
        info!("Created duel '{}'", id);
        Ok(session)
    }

    pub fn end_duel(&self, id: &str) -> WcResult<RoundSession> {
        let slot = {
            let mut sessions = self
                .sessions
                .write()
                .map_err(|e| WandClashError::SessionPoisoned(e.to_string()))?;
            sessions
                .remove(id)
                .ok_or_else(|| WandClashError::SessionNotFound(id.to_string()))?
        };
        let guard = slot
            .lock()
            .map_err(|e| WandClashError::SessionPoisoned(e.to_string()))?;
        info!("Closed duel '{}'", id);
        Ok(guard.session.clone())
    }

    pub fn session(&self, id: &str) -> WcResult<RoundSession> {
        self.with_slot(id, |slot| Ok(slot.session.clone()))
    }

    /// Scores a stroke against one named spell.
    pub fn evaluate(&self, stroke: &[Point], spell_id: &str) -> WcResult<Evaluation> {
        let spell = self
            .spellbook
            .get(spell_id)
            .ok_or_else(|| WandClashError::UnknownSpell(spell_id.to_string()))?;
        let prepared = self.matcher.recognizer().prepare(stroke)?;
        Ok(self.matcher.recognizer().evaluate_spell(&prepared, spell))
    }

    /// Matches the stroke for the session's current turn and applies the
    /// outcome. An ambiguous attack is parked until `confirm_choice`.
    pub fn submit_gesture(
        &self,
        id: &str,
        submission: &GestureSubmission,
    ) -> WcResult<SubmissionResult> {
        self.with_slot(id, |slot| {
            check_version(&slot.session, submission.expected_version)?;
            let current = slot.session.clone();
            if current.is_complete() {
                return Err(WandClashError::GameOver);
            }
            check_turn(&current, submission.turn)?;
            let expected = current.active_player();
            if submission.player != expected {
                return Err(WandClashError::OutOfTurn {
                    expected,
                    actual: submission.player,
                });
            }

            slot.pending_choice = None;
            let candidates = self
                .spellbook
                .candidates(current.phase, submission.color.as_deref());
            let ctx = MatchContext::for_session(&current)?;
            let outcome = self
                .matcher
                .match_gesture(&submission.stroke, &candidates, &ctx)?;

            let next = match (current.phase, &outcome) {
                (Phase::Attack, MatchOutcome::Ambiguous(matches)) => {
                    debug!("Parking {} candidate spells for {}", matches.len(), id);
                    slot.pending_choice = Some(PendingChoice {
                        player: submission.player,
                        turn: current.turn_key(),
                        stroke: submission.stroke.clone(),
                        matches: matches.clone(),
                    });
                    current.clone()
                }
                (Phase::Attack, _) => {
                    apply_attack_result(&current, submission.player, &submission.stroke, &outcome)?
                }
                (Phase::Counter, _) => apply_counter_result(
                    &current,
                    submission.player,
                    &submission.stroke,
                    &outcome,
                    &self.config.rules,
                )?,
            };

            slot.session = next.clone();
            Ok(SubmissionResult {
                outcome: outcome.to_response(),
                session: next,
            })
        })
    }

    /// Resolves a parked ambiguous attack with the spell the player picked.
    pub fn confirm_choice(
        &self,
        id: &str,
        player: Player,
        spell_id: &str,
        expected_version: Option<u64>,
    ) -> WcResult<SubmissionResult> {
        self.with_slot(id, |slot| {
            check_version(&slot.session, expected_version)?;
            let choice = slot
                .pending_choice
                .as_ref()
                .filter(|c| c.turn == slot.session.turn_key())
                .ok_or(WandClashError::NoPendingChoice)?;
            if choice.player != player {
                return Err(WandClashError::OutOfTurn {
                    expected: choice.player,
                    actual: player,
                });
            }

            let chosen = matcher::confirm_choice(&choice.matches, spell_id)?;
            let outcome = MatchOutcome::Recognized(chosen);
            let next = apply_attack_result(&slot.session, player, &choice.stroke, &outcome)?;

            slot.pending_choice = None;
            slot.session = next.clone();
            Ok(SubmissionResult {
                outcome: outcome.to_response(),
                session: next,
            })
        })
    }

    pub fn start_timer(&self, id: &str) -> WcResult<Option<TurnTimer>> {
        self.with_slot(id, |slot| {
            Ok(TurnTimer::start(&slot.session, &self.config.rules))
        })
    }

    /// Applies an expired timer. Stale or early timers leave the session
    /// untouched and return `None`.
    pub fn expire_turn(
        &self,
        id: &str,
        timer: &TurnTimer,
        now: Instant,
    ) -> WcResult<Option<RoundSession>> {
        self.with_slot(id, |slot| {
            let fired = timer.fire(&slot.session, &self.config.rules, now)?;
            if let Some(next) = &fired {
                slot.pending_choice = None;
                slot.session = next.clone();
            }
            Ok(fired)
        })
    }
}
