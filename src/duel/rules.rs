use super::session::{Attempt, GameStatus, Phase, Player, RoundRecord, RoundSession};
use crate::config::{BonusAttacker, DuelRules};
use crate::error::{WandClashError, WcResult};
use crate::geometry::{validate_stroke, Point};
use crate::matcher::{MatchOutcome, SpellMatch};
use std::cmp::Ordering;
use tracing::{debug, info};

/// Odd rounds are opened by player one, even rounds by player two.
pub fn attacker_for_round(round: u32) -> Player {
    if round % 2 == 1 {
        Player::One
    } else {
        Player::Two
    }
}

/// Attacker of the `bonus_index`-th bonus round (zero based).
pub fn bonus_attacker(policy: BonusAttacker, total_rounds: u32, bonus_index: u32) -> Player {
    match policy {
        BonusAttacker::PlayerOne => Player::One,
        BonusAttacker::RoundParity => attacker_for_round(total_rounds + 1 + bonus_index),
    }
}

fn ensure_turn(session: &RoundSession, phase: Phase, player: Player) -> WcResult<()> {
    if session.is_complete() {
        return Err(WandClashError::GameOver);
    }
    if session.phase != phase {
        return Err(WandClashError::WrongPhase {
            expected: phase,
            actual: session.phase,
        });
    }
    let expected = session.active_player();
    if player != expected {
        return Err(WandClashError::OutOfTurn {
            expected,
            actual: player,
        });
    }
    Ok(())
}

fn attempt(player: Player, m: &SpellMatch, stroke: &[Point]) -> Attempt {
    Attempt {
        player,
        spell_id: m.spell.id.clone(),
        spell_name: m.spell.name.clone(),
        accuracy: m.accuracy,
        stroke: stroke.to_vec(),
    }
}

/// Records a recognized attack as pending and hands the turn to the
/// defender. Any other outcome leaves the session as it was so the attacker
/// can try again.
pub fn apply_attack_result(
    session: &RoundSession,
    player: Player,
    stroke: &[Point],
    outcome: &MatchOutcome,
) -> WcResult<RoundSession> {
    ensure_turn(session, Phase::Attack, player)?;

    let MatchOutcome::Recognized(m) = outcome else {
        debug!("Attack not recognized, {} may retry", player);
        return Ok(session.clone());
    };
    if !m.spell.is_attack() {
        return Err(WandClashError::Validation(format!(
            "'{}' is not an attack spell",
            m.spell.id
        )));
    }
    if session.used_attacks(player).contains(&m.spell.id) {
        return Err(WandClashError::PatternAlreadyUsed(m.spell.id.clone()));
    }
    validate_stroke(stroke)?;

    let mut next = session.clone();
    next.pending_attack = Some(attempt(player, m, stroke));
    next.phase = Phase::Counter;
    next.version += 1;
    info!(
        "Round {}: {} casts '{}' ({}%)",
        next.current_round, player, m.spell.id, m.accuracy
    );
    Ok(next)
}

/// Resolves the round once the defender lands a valid counter: the higher
/// accuracy takes the point, an exact tie awards nothing. An unrecognized
/// counter leaves the session unchanged.
pub fn apply_counter_result(
    session: &RoundSession,
    player: Player,
    stroke: &[Point],
    outcome: &MatchOutcome,
    rules: &DuelRules,
) -> WcResult<RoundSession> {
    ensure_turn(session, Phase::Counter, player)?;
    let pending = session
        .pending_attack
        .as_ref()
        .ok_or(WandClashError::NoPendingAttack)?;

    let MatchOutcome::Recognized(m) = outcome else {
        debug!("Counter not recognized, {} may retry", player);
        return Ok(session.clone());
    };
    if !m.spell.counters_attack(&pending.spell_id) {
        return Err(WandClashError::Validation(format!(
            "'{}' does not counter '{}'",
            m.spell.id, pending.spell_id
        )));
    }
    validate_stroke(stroke)?;

    let counter = attempt(player, m, stroke);
    let point_to = match pending.accuracy.cmp(&counter.accuracy) {
        Ordering::Greater => Some(session.attacker),
        Ordering::Less => Some(session.defender()),
        Ordering::Equal => None,
    };

    let record = RoundRecord {
        round: session.current_round,
        bonus: session.is_bonus_round,
        attacker: session.attacker,
        defender: session.defender(),
        attack: Some(pending.clone()),
        counter: Some(counter),
        point_to,
        timed_out: None,
    };

    let mut next = session.clone();
    resolve_round(&mut next, record, rules);
    Ok(next)
}

/// The active player ran out of time. Their opponent takes the round; a
/// pending attack still counts as cast.
pub fn apply_timeout(
    session: &RoundSession,
    timed_out: Player,
    rules: &DuelRules,
) -> WcResult<RoundSession> {
    if session.is_complete() {
        return Err(WandClashError::GameOver);
    }
    let expected = session.active_player();
    if timed_out != expected {
        return Err(WandClashError::OutOfTurn {
            expected,
            actual: timed_out,
        });
    }

    info!(
        "Round {}: {} timed out in {} phase",
        session.current_round, timed_out, session.phase
    );
    let record = RoundRecord {
        round: session.current_round,
        bonus: session.is_bonus_round,
        attacker: session.attacker,
        defender: session.defender(),
        attack: session.pending_attack.clone(),
        counter: None,
        point_to: Some(timed_out.opponent()),
        timed_out: Some(timed_out),
    };

    let mut next = session.clone();
    resolve_round(&mut next, record, rules);
    Ok(next)
}

fn leader(session: &RoundSession) -> Option<Player> {
    match session.player1_score.cmp(&session.player2_score) {
        Ordering::Greater => Some(Player::One),
        Ordering::Less => Some(Player::Two),
        Ordering::Equal => None,
    }
}

fn resolve_round(next: &mut RoundSession, record: RoundRecord, rules: &DuelRules) {
    next.pending_attack = None;
    next.phase = Phase::Attack;
    next.version += 1;
    if let Some(attack) = &record.attack {
        next.mark_used(attack.player, &attack.spell_id);
    }
    next.history.push(record.clone());
    next.last_round = Some(record.clone());

    if next.is_bonus_round {
        match record.point_to {
            Some(winner) => {
                next.bonus_round_winner = Some(winner);
                next.winner = Some(winner);
                next.status = GameStatus::Completed;
                info!("{} wins the bonus round and the duel", winner);
            }
            None => {
                // Replays start with every attack castable again.
                next.reset_used_attacks();
                next.bonus_rounds_played += 1;
                next.attacker =
                    bonus_attacker(rules.bonus_attacker, next.total_rounds, next.bonus_rounds_played);
                info!("Bonus round tied, replaying");
            }
        }
        return;
    }

    let level_before = next.player1_score == next.player2_score;
    if let Some(player) = record.point_to {
        next.award_point(player);
    }
    let level_after = next.player1_score == next.player2_score;

    if next.current_round < next.total_rounds {
        next.current_round += 1;
        next.attacker = attacker_for_round(next.current_round);
        return;
    }

    if level_before || level_after {
        next.is_bonus_round = true;
        next.bonus_rounds_played = 0;
        next.attacker = bonus_attacker(rules.bonus_attacker, next.total_rounds, 0);
        info!(
            "Regulation ends {}-{}, entering bonus round",
            next.player1_score, next.player2_score
        );
    } else {
        next.current_round += 1;
        next.status = GameStatus::Completed;
        next.winner = leader(next);
        info!(
            "Duel complete {}-{}",
            next.player1_score, next.player2_score
        );
    }
}
