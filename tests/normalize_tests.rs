use std::f32::consts::PI;
use wandclash::geometry::{centroid, path_length, Point};
use wandclash::gesture::{normalize, resample};

fn zigzag() -> Vec<Point> {
    vec![
        Point::new(0.0, 0.0),
        Point::new(30.0, 80.0),
        Point::new(60.0, 0.0),
        Point::new(90.0, 80.0),
        Point::new(120.0, 0.0),
    ]
}

#[test]
fn test_resample_hits_exact_count_and_endpoints() {
    let stroke = zigzag();
    let out = resample(&stroke, 64);
    assert_eq!(out.len(), 64);
    assert!(out[0].distance(&stroke[0]) < 1e-4);
    assert!(out[63].distance(&stroke[4]) < 1e-3);
}

#[test]
fn test_resample_spacing_is_uniform() {
    let out = resample(&zigzag(), 33);
    let step = path_length(&zigzag()) / 32.0;
    // Chords across a corner are shorter than the arc they cut.
    for w in out.windows(2) {
        assert!(w[0].distance(&w[1]) <= step + 1e-2);
    }
}

#[test]
fn test_resample_degenerate_inputs() {
    assert!(resample(&[], 16).is_empty());
    assert!(resample(&zigzag(), 0).is_empty());

    let single = resample(&[Point::new(3.0, 4.0)], 8);
    assert_eq!(single, vec![Point::new(3.0, 4.0); 8]);

    let stacked = resample(&[Point::new(1.0, 1.0); 5], 8);
    assert_eq!(stacked.len(), 8);
    assert!(stacked.iter().all(|p| *p == Point::new(1.0, 1.0)));
}

#[test]
fn test_normalized_stroke_is_centered_and_unit_sized() {
    let norm = normalize(&zigzag(), 64);
    assert_eq!(norm.len(), 64);

    let c = centroid(norm.points()).unwrap();
    assert!(c.x.abs() < 1e-4 && c.y.abs() < 1e-4, "centroid {:?}", c);

    let b = norm.bounds().unwrap();
    assert!((b.max_extent() - 1.0).abs() < 1e-4);
}

#[test]
fn test_normalize_zero_extent_stays_at_origin() {
    let norm = normalize(&[Point::new(7.0, 7.0), Point::new(7.0, 7.0)], 16);
    assert_eq!(norm.len(), 16);
    assert!(norm.points().iter().all(|p| p.x == 0.0 && p.y == 0.0));
}

#[test]
fn test_normalize_is_nearly_idempotent() {
    let circle: Vec<Point> = (0..=40)
        .map(|i| {
            let a = 2.0 * PI * i as f32 / 40.0;
            Point::new(50.0 * a.cos(), 50.0 * a.sin())
        })
        .collect();

    for stroke in [circle, zigzag()] {
        let once = normalize(&stroke, 64);
        let twice = normalize(once.points(), 64);
        let worst = once
            .points()
            .iter()
            .zip(twice.points())
            .map(|(a, b)| a.distance(b))
            .fold(0.0f32, f32::max);
        assert!(worst < 0.02, "drift {}", worst);
    }
}
