use std::collections::BTreeSet;
use wandclash::config::{MatchThresholds, RecognitionParams};
use wandclash::duel::Phase;
use wandclash::error::WandClashError;
use wandclash::geometry::Point;
use wandclash::gesture::Validity;
use wandclash::matcher::{confirm_choice, MatchContext, MatchOutcome, Matcher, Rejection};
use wandclash::spellbook::{Spell, SpellBook};

fn matcher(book: &SpellBook, attack: u32, counter: u32) -> Matcher {
    Matcher::with_spellbook(
        book,
        RecognitionParams::default(),
        MatchThresholds {
            attack_threshold: attack,
            counter_threshold: counter,
        },
    )
}

/// The spell's own pattern, moved and enlarged as a player might draw it.
fn drawn(book: &SpellBook, id: &str) -> Vec<Point> {
    book.get(id)
        .unwrap()
        .gesture_pattern
        .iter()
        .map(|p| p.scaled(1.7).translated(35.0, -12.0))
        .collect()
}

#[test]
fn test_unique_attack_is_recognized() {
    let book = SpellBook::builtin();
    let m = matcher(&book, 90, 52);
    let used = BTreeSet::new();
    let candidates = book.candidates(Phase::Attack, None);

    let outcome = m
        .match_gesture(
            &drawn(&book, "tidal_vortex"),
            &candidates,
            &MatchContext::Attack { used: &used },
        )
        .unwrap();

    match outcome {
        MatchOutcome::Recognized(hit) => {
            assert_eq!(hit.spell.id, "tidal_vortex");
            assert!(hit.accuracy >= 95);
        }
        other => panic!("expected recognition, got {:?}", other),
    }
}

#[test]
fn test_two_close_attacks_are_ambiguous() {
    let book = SpellBook::builtin();
    let m = matcher(&book, 77, 52);
    let used = BTreeSet::new();
    let candidates = book.candidates(Phase::Attack, None);

    let outcome = m
        .match_gesture(
            &drawn(&book, "ember_triangle"),
            &candidates,
            &MatchContext::Attack { used: &used },
        )
        .unwrap();

    let MatchOutcome::Ambiguous(matches) = outcome else {
        panic!("expected ambiguity, got {:?}", outcome);
    };
    let ids: Vec<&str> = matches.iter().map(|m| m.spell.id.as_str()).collect();
    assert_eq!(ids, vec!["ember_triangle", "tidal_vortex"]);
    assert!(matches[0].accuracy > matches[1].accuracy);

    let response = MatchOutcome::Ambiguous(matches.clone()).to_response();
    assert!(response.recognized);
    assert!(response.spell.is_none());
    assert_eq!(response.multiple_matches, Some(true));

    let chosen = confirm_choice(&matches, "tidal_vortex").unwrap();
    assert_eq!(chosen.spell.id, "tidal_vortex");
    assert!(matches!(
        confirm_choice(&matches, "void_spiral"),
        Err(WandClashError::UnknownSpell(_))
    ));
}

#[test]
fn test_used_attacks_drop_out_of_ambiguity() {
    let book = SpellBook::builtin();
    let m = matcher(&book, 77, 52);
    let used: BTreeSet<String> = ["tidal_vortex".to_string()].into_iter().collect();
    let candidates = book.candidates(Phase::Attack, None);

    let outcome = m
        .match_gesture(
            &drawn(&book, "ember_triangle"),
            &candidates,
            &MatchContext::Attack { used: &used },
        )
        .unwrap();
    assert!(
        matches!(&outcome, MatchOutcome::Recognized(hit) if hit.spell.id == "ember_triangle"),
        "{:?}",
        outcome
    );
}

#[test]
fn test_best_match_already_used_is_reported() {
    let book = SpellBook::builtin();
    let m = matcher(&book, 90, 52);
    let used: BTreeSet<String> = ["tidal_vortex".to_string()].into_iter().collect();
    let candidates = book.candidates(Phase::Attack, None);

    let outcome = m
        .match_gesture(
            &drawn(&book, "tidal_vortex"),
            &candidates,
            &MatchContext::Attack { used: &used },
        )
        .unwrap();
    match outcome {
        MatchOutcome::NotRecognized { reason, spell, .. } => {
            assert_eq!(reason, Rejection::AlreadyUsed);
            assert_eq!(spell.unwrap().id, "tidal_vortex");
        }
        other => panic!("expected already-used, got {:?}", other),
    }
}

#[test]
fn test_tap_is_low_score_not_error() {
    let book = SpellBook::builtin();
    let m = matcher(&book, 50, 52);
    let used = BTreeSet::new();
    let candidates = book.candidates(Phase::Attack, None);
    let tap = vec![Point::new(10.0, 10.0), Point::new(12.0, 12.0)];

    let outcome = m
        .match_gesture(&tap, &candidates, &MatchContext::Attack { used: &used })
        .unwrap();
    assert_eq!(
        outcome,
        MatchOutcome::NotRecognized {
            reason: Rejection::LowScore,
            accuracy: 0,
            spell: None,
            validity: Validity::Tap,
        }
    );
}

#[test]
fn test_broken_stroke_is_an_error() {
    let book = SpellBook::builtin();
    let m = matcher(&book, 50, 52);
    let used = BTreeSet::new();
    let candidates = book.candidates(Phase::Attack, None);

    let empty: Vec<Point> = Vec::new();
    assert!(m
        .match_gesture(&empty, &candidates, &MatchContext::Attack { used: &used })
        .is_err());

    let nan = vec![Point::new(0.0, 0.0), Point::new(f32::NAN, 4.0)];
    assert!(matches!(
        m.match_gesture(&nan, &candidates, &MatchContext::Attack { used: &used }),
        Err(WandClashError::InvalidInput(_))
    ));
}

#[test]
fn test_valid_counter_is_recognized() {
    let book = SpellBook::builtin();
    let m = matcher(&book, 50, 52);
    let candidates = book.candidates(Phase::Counter, None);

    let outcome = m
        .match_gesture(
            &drawn(&book, "aegis_bar"),
            &candidates,
            &MatchContext::Counter {
                attack_id: "ember_triangle",
            },
        )
        .unwrap();
    assert!(
        matches!(&outcome, MatchOutcome::Recognized(hit) if hit.spell.id == "aegis_bar"),
        "{:?}",
        outcome
    );
}

#[test]
fn test_counter_for_another_attack_is_wrong_defense() {
    let book = SpellBook::builtin();
    let m = matcher(&book, 50, 60);
    let candidates = book.candidates(Phase::Counter, None);

    let outcome = m
        .match_gesture(
            &drawn(&book, "aegis_bar"),
            &candidates,
            &MatchContext::Counter {
                attack_id: "tidal_vortex",
            },
        )
        .unwrap();
    match outcome {
        MatchOutcome::NotRecognized { reason, spell, .. } => {
            assert_eq!(reason, Rejection::WrongDefense);
            assert_eq!(spell.unwrap().id, "aegis_bar");
        }
        other => panic!("expected wrong defense, got {:?}", other),
    }
}

#[test]
fn test_weak_counter_is_low_score() {
    let book = SpellBook::builtin();
    let m = matcher(&book, 50, 60);
    let candidates: Vec<&Spell> = ["pillar_ward", "rune_bolt"]
        .iter()
        .map(|id| book.get(id).unwrap())
        .collect();

    let outcome = m
        .match_gesture(
            &drawn(&book, "aegis_bar"),
            &candidates,
            &MatchContext::Counter {
                attack_id: "tidal_vortex",
            },
        )
        .unwrap();
    match outcome {
        MatchOutcome::NotRecognized {
            reason, accuracy, ..
        } => {
            assert_eq!(reason, Rejection::LowScore);
            assert!(accuracy < 60);
        }
        other => panic!("expected low score, got {:?}", other),
    }
}

#[test]
fn test_response_shape_for_recognition() {
    let book = SpellBook::builtin();
    let m = matcher(&book, 90, 52);
    let used = BTreeSet::new();
    let candidates = book.candidates(Phase::Attack, None);
    let outcome = m
        .match_gesture(
            &drawn(&book, "storm_zigzag"),
            &candidates,
            &MatchContext::Attack { used: &used },
        )
        .unwrap();

    let json = serde_json::to_value(outcome.to_response()).unwrap();
    assert_eq!(json["recognized"], true);
    assert_eq!(json["spell"]["id"], "storm_zigzag");
    assert!(json.get("multipleMatches").is_none());
    assert!(json.get("reason").is_none());
}
