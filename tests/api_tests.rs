use std::time::{Duration, Instant};
use wandclash::api::{DuelService, GestureSubmission};
use wandclash::config::Config;
use wandclash::duel::{Phase, Player};
use wandclash::error::WandClashError;
use wandclash::geometry::Point;
use wandclash::spellbook::SpellBook;

fn service(attack_threshold: u32) -> DuelService {
    let mut config = Config::default();
    config.thresholds.attack_threshold = attack_threshold;
    DuelService::new(config, SpellBook::builtin()).unwrap()
}

fn pattern(svc: &DuelService, id: &str) -> Vec<Point> {
    svc.spellbook()
        .get(id)
        .unwrap()
        .gesture_pattern
        .iter()
        .map(|p| p.translated(40.0, 40.0))
        .collect()
}

/// A submission aimed at the duel's current turn.
fn submit(svc: &DuelService, id: &str, player: Player, stroke: Vec<Point>) -> GestureSubmission {
    GestureSubmission {
        player,
        turn: svc.session(id).unwrap().turn_key(),
        stroke,
        color: None,
        expected_version: None,
    }
}

#[test]
fn test_session_lifecycle() {
    let svc = service(50);
    let s = svc.create_duel("arena").unwrap();
    assert_eq!(s.current_round, 1);
    assert!(matches!(
        svc.create_duel("arena"),
        Err(WandClashError::SessionExists(_))
    ));
    assert!(matches!(
        svc.session("nowhere"),
        Err(WandClashError::SessionNotFound(_))
    ));

    let closed = svc.end_duel("arena").unwrap();
    assert_eq!(closed, s);
    assert!(svc.session("arena").is_err());
}

#[test]
fn test_full_round_through_service() {
    let svc = service(90);
    svc.create_duel("d1").unwrap();

    let attack = svc
        .submit_gesture("d1", &submit(&svc, "d1", Player::One, pattern(&svc, "tidal_vortex")))
        .unwrap();
    assert!(attack.outcome.recognized);
    assert_eq!(attack.session.phase, Phase::Counter);
    assert_eq!(svc.session("d1").unwrap(), attack.session);

    let counter = svc
        .submit_gesture("d1", &submit(&svc, "d1", Player::Two, pattern(&svc, "pillar_ward")))
        .unwrap();
    assert!(counter.outcome.recognized);
    assert_eq!(counter.outcome.spell.as_ref().unwrap().id, "pillar_ward");

    let s = counter.session;
    assert_eq!(s.current_round, 2);
    assert_eq!(s.attacker, Player::Two);
    assert_eq!(s.history.len(), 1);
    assert!(s.used_attacks(Player::One).contains("tidal_vortex"));
}

#[test]
fn test_out_of_turn_submission_is_rejected() {
    let svc = service(90);
    svc.create_duel("d").unwrap();
    assert!(matches!(
        svc.submit_gesture("d", &submit(&svc, "d", Player::Two, pattern(&svc, "gale_wave"))),
        Err(WandClashError::OutOfTurn { .. })
    ));
}

#[test]
fn test_ambiguous_attack_waits_for_choice() {
    let svc = service(77);
    let start = svc.create_duel("d").unwrap();

    let result = svc
        .submit_gesture("d", &submit(&svc, "d", Player::One, pattern(&svc, "ember_triangle")))
        .unwrap();
    assert_eq!(result.outcome.multiple_matches, Some(true));
    assert_eq!(result.outcome.matches.len(), 2);
    assert_eq!(result.session, start);

    assert!(matches!(
        svc.confirm_choice("d", Player::Two, "tidal_vortex", None),
        Err(WandClashError::OutOfTurn { .. })
    ));
    assert!(matches!(
        svc.confirm_choice("d", Player::One, "void_spiral", None),
        Err(WandClashError::UnknownSpell(_))
    ));

    let confirmed = svc
        .confirm_choice("d", Player::One, "tidal_vortex", Some(start.version))
        .unwrap();
    assert!(confirmed.outcome.recognized);
    let pending = confirmed.session.pending_attack.as_ref().unwrap();
    assert_eq!(pending.spell_id, "tidal_vortex");
    assert!(pending.accuracy >= 77 && pending.accuracy < 100);

    assert!(matches!(
        svc.confirm_choice("d", Player::One, "tidal_vortex", None),
        Err(WandClashError::NoPendingChoice)
    ));
}

#[test]
fn test_colour_restricts_candidates() {
    let svc = service(50);
    svc.create_duel("d").unwrap();
    let mut sub = submit(&svc, "d", Player::One, pattern(&svc, "ember_triangle"));
    sub.color = Some("blue".to_string());

    let result = svc.submit_gesture("d", &sub).unwrap();
    assert!(result.outcome.recognized);
    assert_eq!(result.outcome.spell.unwrap().id, "tidal_vortex");
}

#[test]
fn test_stale_version_is_a_conflict() {
    let svc = service(90);
    svc.create_duel("d").unwrap();
    let mut sub = submit(&svc, "d", Player::One, pattern(&svc, "storm_zigzag"));
    sub.expected_version = Some(3);
    assert!(matches!(
        svc.submit_gesture("d", &sub),
        Err(WandClashError::SessionConflict {
            expected: 3,
            actual: 0
        })
    ));
}

#[test]
fn test_concurrent_submissions_apply_once() {
    let svc = service(90);
    svc.create_duel("race").unwrap();
    let mut sub = submit(&svc, "race", Player::One, pattern(&svc, "storm_zigzag"));
    sub.expected_version = Some(0);

    let results: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| svc.submit_gesture("race", &sub)))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let applied = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(applied, 1);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| matches!(e, WandClashError::SessionConflict { .. })));
    assert_eq!(svc.session("race").unwrap().version, 1);
}

#[test]
fn test_resent_counter_is_a_turn_conflict() {
    let svc = service(90);
    svc.create_duel("d").unwrap();
    svc.submit_gesture("d", &submit(&svc, "d", Player::One, pattern(&svc, "ember_triangle")))
        .unwrap();

    let counter = submit(&svc, "d", Player::Two, pattern(&svc, "aegis_bar"));
    let first = svc.submit_gesture("d", &counter).unwrap();
    assert!(first.outcome.recognized);
    assert_eq!(first.session.current_round, 2);
    assert_eq!(first.session.active_player(), Player::Two);

    // Same gesture delivered twice: player two now attacks round 2, but the
    // resend still targets the round 1 counter.
    assert!(matches!(
        svc.submit_gesture("d", &counter),
        Err(WandClashError::TurnConflict { submitted, current })
            if submitted.round == 1
                && submitted.phase == Phase::Counter
                && current.round == 2
                && current.phase == Phase::Attack
    ));
    assert_eq!(svc.session("d").unwrap(), first.session);
}

#[test]
fn test_expired_turn_through_service() {
    let svc = service(90);
    svc.create_duel("d").unwrap();
    let timer = svc.start_timer("d").unwrap().unwrap();
    let now = Instant::now() + Duration::from_secs(61);

    let after = svc.expire_turn("d", &timer, now).unwrap().unwrap();
    assert_eq!(after.player2_score, 1);
    assert_eq!(after.current_round, 2);

    // Firing the same timer again is a no-op.
    assert_eq!(svc.expire_turn("d", &timer, now).unwrap(), None);
    assert_eq!(svc.session("d").unwrap(), after);
}

#[test]
fn test_evaluate_named_spell() {
    let svc = service(50);
    let eval = svc
        .evaluate(&pattern(&svc, "void_spiral"), "void_spiral")
        .unwrap();
    assert!(eval.valid);
    assert_eq!(eval.score, 100);
    assert!(matches!(
        svc.evaluate(&pattern(&svc, "void_spiral"), "fireball"),
        Err(WandClashError::UnknownSpell(_))
    ));
}

#[test]
fn test_invalid_config_is_rejected() {
    let mut config = Config::default();
    config.rules.total_rounds = 0;
    assert!(matches!(
        DuelService::new(config, SpellBook::builtin()),
        Err(WandClashError::Config(_))
    ));
}

#[test]
fn test_rounds_beyond_the_attack_library_are_rejected() {
    let mut config = Config::default();
    assert_eq!(config.rules.attacks_per_player(), 6);
    config.rules.total_rounds = 12;
    assert!(matches!(
        DuelService::new(config, SpellBook::builtin()),
        Err(WandClashError::Config(msg)) if msg.contains("need 7")
    ));
}
