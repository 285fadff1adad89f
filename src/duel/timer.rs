use super::rules::apply_timeout;
use super::session::{Player, RoundSession, TurnKey};
use crate::config::DuelRules;
use crate::error::WcResult;
use std::time::{Duration, Instant};
use tracing::debug;

/// Countdown for one turn. It carries the turn it was started for, so a
/// timer that fires after the turn moved on is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnTimer {
    key: TurnKey,
    player: Player,
    started_at: Instant,
    duration: Duration,
}

impl TurnTimer {
    pub fn start(session: &RoundSession, rules: &DuelRules) -> Option<Self> {
        Self::start_at(session, rules, Instant::now())
    }

    /// `None` once the duel is over.
    pub fn start_at(session: &RoundSession, rules: &DuelRules, now: Instant) -> Option<Self> {
        if session.is_complete() {
            return None;
        }
        Some(Self {
            key: session.turn_key(),
            player: session.active_player(),
            started_at: now,
            duration: rules.turn_duration(),
        })
    }

    pub fn key(&self) -> TurnKey {
        self.key
    }

    pub fn player(&self) -> Player {
        self.player
    }

    pub fn deadline(&self) -> Instant {
        self.started_at + self.duration
    }

    pub fn remaining(&self, now: Instant) -> Duration {
        self.deadline().saturating_duration_since(now)
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.deadline()
    }

    pub fn is_current(&self, session: &RoundSession) -> bool {
        !session.is_complete() && session.turn_key() == self.key
    }

    /// Applies the timeout if the deadline has passed and the turn is still
    /// live. Returns `Ok(None)` for early or stale timers.
    pub fn fire(
        &self,
        session: &RoundSession,
        rules: &DuelRules,
        now: Instant,
    ) -> WcResult<Option<RoundSession>> {
        if !self.is_expired(now) {
            return Ok(None);
        }
        if !self.is_current(session) {
            debug!("Ignoring stale timer for {:?}", self.key);
            return Ok(None);
        }
        apply_timeout(session, self.player, rules).map(Some)
    }
}
