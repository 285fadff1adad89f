use std::f32::consts::PI;
use wandclash::config::RecognitionParams;
use wandclash::geometry::Point;
use wandclash::gesture::similarity::angle_similarity;
use wandclash::gesture::{evaluate_drawing, normalize, similarity, similarity_details, Evaluation};

fn pts(coords: &[(f32, f32)]) -> Vec<Point> {
    coords.iter().map(|&c| Point::from(c)).collect()
}

fn circle(start_deg: f32, clockwise: bool) -> Vec<Point> {
    (0..=32)
        .map(|i| {
            let step = 2.0 * PI * i as f32 / 32.0;
            let a = start_deg.to_radians() + if clockwise { -step } else { step };
            Point::new(200.0 + 80.0 * a.cos(), 200.0 + 80.0 * a.sin())
        })
        .collect()
}

#[test]
fn test_identical_diagonal_scores_full_marks() {
    let line = pts(&[(0.0, 0.0), (50.0, 50.0), (100.0, 100.0)]);
    assert_eq!(
        evaluate_drawing(&line, &line),
        Evaluation {
            score: 100,
            valid: true
        }
    );
}

#[test]
fn test_tiny_scribble_is_invalid_and_scores_zero() {
    let scribble = pts(&[(10.0, 10.0), (12.0, 12.0), (11.0, 11.0)]);
    let reference = pts(&[(0.0, 0.0), (100.0, 100.0)]);
    assert_eq!(evaluate_drawing(&scribble, &reference), Evaluation::INVALID);
}

#[test]
fn test_v_shape_scores_far_below_diagonal() {
    let v = pts(&[(0.0, 100.0), (50.0, 0.0), (100.0, 100.0)]);
    let diagonal = pts(&[(0.0, 0.0), (50.0, 50.0), (100.0, 100.0)]);
    let eval = evaluate_drawing(&v, &diagonal);
    assert!(eval.valid);
    assert!(eval.score < 60, "V vs diagonal scored {}", eval.score);
}

#[test]
fn test_empty_stroke_is_invalid() {
    let reference = pts(&[(0.0, 0.0), (100.0, 100.0)]);
    assert_eq!(evaluate_drawing(&[], &reference), Evaluation::INVALID);
}

#[test]
fn test_circle_started_elsewhere_still_matches() {
    let reference = circle(0.0, false);
    let shifted = circle(135.0, false);
    let score = similarity(&shifted, &reference);
    assert!(score > 95.0, "shifted circle scored {}", score);
}

#[test]
fn test_reversed_circle_still_matches() {
    let reference = circle(0.0, false);
    let reversed: Vec<Point> = reference.iter().rev().copied().collect();
    assert!(similarity(&reversed, &reference) > 99.0);

    let clockwise = circle(0.0, true);
    assert!(similarity(&clockwise, &reference) > 95.0);
}

#[test]
fn test_translation_and_scale_do_not_change_score() {
    let reference = circle(0.0, false);
    let drawn = pts(&[(150.0, 40.0), (260.0, 240.0), (40.0, 240.0), (150.0, 40.0)]);
    let moved: Vec<Point> = drawn
        .iter()
        .map(|p| p.scaled(3.5).translated(-400.0, 1200.0))
        .collect();

    let a = similarity(&drawn, &reference);
    let b = similarity(&moved, &reference);
    assert!((a - b).abs() < 0.5, "{} vs {}", a, b);
}

#[test]
fn test_term_breakdown_is_bounded_and_blended() {
    let params = RecognitionParams::default();
    let n = params.resample_points;
    let user = normalize(&pts(&[(0.0, 100.0), (50.0, 0.0), (100.0, 100.0)]), n);
    let reference = normalize(&pts(&[(0.0, 0.0), (100.0, 100.0)]), n);
    let d = similarity_details(&user, &reference, &params);

    for term in [d.point, d.line, d.angle, d.score] {
        assert!((0.0..=100.0).contains(&term), "term out of range: {:?}", d);
    }
    let blended = 0.5 * d.point + 0.3 * d.line + 0.2 * d.angle;
    assert!((blended - d.score).abs() < 1e-3);
}

#[test]
fn test_zero_weights_score_zero() {
    let params = RecognitionParams {
        weight_point: 0.0,
        weight_line: 0.0,
        weight_angle: 0.0,
        ..Default::default()
    };
    let line = normalize(&pts(&[(0.0, 0.0), (100.0, 100.0)]), 64);
    assert_eq!(similarity_details(&line, &line, &params).score, 0.0);
}

#[test]
fn test_weights_are_relative() {
    let n = RecognitionParams::default().resample_points;
    let user = normalize(&pts(&[(0.0, 100.0), (50.0, 0.0), (100.0, 100.0)]), n);
    let reference = normalize(&pts(&[(0.0, 0.0), (100.0, 100.0)]), n);

    let unit = similarity_details(&user, &reference, &RecognitionParams::default());
    let scaled = similarity_details(
        &user,
        &reference,
        &RecognitionParams {
            weight_point: 5.0,
            weight_line: 3.0,
            weight_angle: 2.0,
            ..Default::default()
        },
    );
    assert!((unit.score - scaled.score).abs() < 1e-3);
}

#[test]
fn test_angle_term_searches_its_own_alignment() {
    // A circle traced clockwise from a different start: the heading term
    // finds its own offset and direction.
    let n = RecognitionParams::default().resample_points;
    let reference = normalize(&circle(0.0, false), n);
    let drawn = normalize(&circle(90.0, true), n);
    let angle = angle_similarity(drawn.points(), reference.points());
    assert!(angle > 95.0, "angle term {}", angle);

    // A V against a diagonal keeps partial heading agreement: one arm runs
    // along the line once the offset is free.
    let v = normalize(&pts(&[(0.0, 100.0), (50.0, 0.0), (100.0, 100.0)]), n);
    let diagonal = normalize(&pts(&[(0.0, 0.0), (100.0, 100.0)]), n);
    let angle = angle_similarity(v.points(), diagonal.points());
    assert!(angle > 55.0 && angle < 75.0, "angle term {}", angle);
}
