use crate::config::DuelRules;
use crate::geometry::Stroke;
use crate::spellbook::SpellKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use strum_macros::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum Player {
    #[serde(rename = "player1")]
    #[strum(serialize = "player 1")]
    One,
    #[serde(rename = "player2")]
    #[strum(serialize = "player 2")]
    Two,
}

impl Player {
    pub fn number(&self) -> u8 {
        match self {
            Player::One => 1,
            Player::Two => 2,
        }
    }

    pub fn opponent(&self) -> Player {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Phase {
    Attack,
    Counter,
}

impl Phase {
    /// The spell type a player may cast in this phase.
    pub fn spell_kind(&self) -> SpellKind {
        match self {
            Phase::Attack => SpellKind::Attack,
            Phase::Counter => SpellKind::Counter,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GameStatus {
    Active,
    Completed,
}

/// One recognized gesture as it is committed to history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attempt {
    pub player: Player,
    pub spell_id: String,
    pub spell_name: String,
    pub accuracy: u32,
    pub stroke: Stroke,
}

pub type PendingAttack = Attempt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundRecord {
    pub round: u32,
    pub bonus: bool,
    pub attacker: Player,
    pub defender: Player,
    pub attack: Option<Attempt>,
    pub counter: Option<Attempt>,
    pub point_to: Option<Player>,
    pub timed_out: Option<Player>,
}

/// Identifies one turn. A timer started for a turn is only honoured while
/// the session still reports the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnKey {
    pub round: u32,
    pub phase: Phase,
    pub bonus_index: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundSession {
    pub current_round: u32,
    pub total_rounds: u32,
    pub phase: Phase,
    pub status: GameStatus,
    pub attacker: Player,

    pub player1_score: u32,
    pub player2_score: u32,
    pub player1_used_attacks: BTreeSet<String>,
    pub player2_used_attacks: BTreeSet<String>,

    pub pending_attack: Option<PendingAttack>,
    pub history: Vec<RoundRecord>,
    pub last_round: Option<RoundRecord>,

    pub is_bonus_round: bool,
    pub bonus_rounds_played: u32,
    pub bonus_round_winner: Option<Player>,
    pub winner: Option<Player>,

    // Bumped on every mutation.
    pub version: u64,
}

impl RoundSession {
    pub fn new(rules: &DuelRules) -> Self {
        Self {
            current_round: 1,
            total_rounds: rules.total_rounds,
            phase: Phase::Attack,
            status: GameStatus::Active,
            attacker: Player::One,
            player1_score: 0,
            player2_score: 0,
            player1_used_attacks: BTreeSet::new(),
            player2_used_attacks: BTreeSet::new(),
            pending_attack: None,
            history: Vec::new(),
            last_round: None,
            is_bonus_round: false,
            bonus_rounds_played: 0,
            bonus_round_winner: None,
            winner: None,
            version: 0,
        }
    }

    pub fn defender(&self) -> Player {
        self.attacker.opponent()
    }

    /// The player expected to draw right now.
    pub fn active_player(&self) -> Player {
        match self.phase {
            Phase::Attack => self.attacker,
            Phase::Counter => self.defender(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.status == GameStatus::Completed
    }

    pub fn score(&self, player: Player) -> u32 {
        match player {
            Player::One => self.player1_score,
            Player::Two => self.player2_score,
        }
    }

    pub fn scores(&self) -> [u32; 2] {
        [self.player1_score, self.player2_score]
    }

    pub(crate) fn award_point(&mut self, player: Player) {
        match player {
            Player::One => self.player1_score += 1,
            Player::Two => self.player2_score += 1,
        }
    }

    pub fn used_attacks(&self, player: Player) -> &BTreeSet<String> {
        match player {
            Player::One => &self.player1_used_attacks,
            Player::Two => &self.player2_used_attacks,
        }
    }

    pub(crate) fn mark_used(&mut self, player: Player, spell_id: &str) {
        let set = match player {
            Player::One => &mut self.player1_used_attacks,
            Player::Two => &mut self.player2_used_attacks,
        };
        set.insert(spell_id.to_string());
    }

    /// Every attack becomes castable again for both players.
    pub(crate) fn reset_used_attacks(&mut self) {
        self.player1_used_attacks.clear();
        self.player2_used_attacks.clear();
    }

    pub fn turn_key(&self) -> TurnKey {
        TurnKey {
            round: self.current_round,
            phase: self.phase,
            bonus_index: self.is_bonus_round.then_some(self.bonus_rounds_played),
        }
    }
}
