use super::normalize::NormalizedStroke;
use super::types::SimilarityDetails;
use crate::config::RecognitionParams;
use crate::geometry::{headings, point_segment_distance, wrapped_angle_diff, Point};
use std::f32::consts::PI;

/// Best mean point-wise agreement over every cyclic offset of the reference,
/// traversed forwards and backwards. 0..=100.
pub fn point_similarity(user: &[Point], reference: &[Point], tolerance: f32) -> f32 {
    let n = user.len().min(reference.len());
    if n == 0 {
        return 0.0;
    }
    let user = &user[..n];
    let forward = &reference[..n];
    let reversed: Vec<Point> = forward.iter().rev().copied().collect();

    let mut best = 0.0f32;
    for candidate in [forward, reversed.as_slice()] {
        for offset in 0..n {
            let sum: f32 = user
                .iter()
                .enumerate()
                .map(|(i, u)| {
                    let d = u.distance(&candidate[(i + offset) % n]);
                    (1.0 - d / tolerance).max(0.0)
                })
                .sum();
            best = best.max(sum / n as f32);
        }
    }
    best * 100.0
}

/// Mean agreement between each user point and the nearest segment of the
/// reference path. 0..=100.
pub fn line_similarity(user: &[Point], reference: &[Point], tolerance: f32) -> f32 {
    if user.is_empty() || reference.is_empty() {
        return 0.0;
    }

    let sum: f32 = user
        .iter()
        .map(|u| {
            let nearest = if reference.len() == 1 {
                u.distance(&reference[0])
            } else {
                reference
                    .windows(2)
                    .map(|seg| point_segment_distance(u, &seg[0], &seg[1]))
                    .fold(f32::INFINITY, f32::min)
            };
            (1.0 - nearest / tolerance).max(0.0)
        })
        .sum();

    sum / user.len() as f32 * 100.0
}

/// Best mean heading agreement, searched over the same cyclic offsets and
/// both traversal directions as the point term. 0..=100.
pub fn angle_similarity(user: &[Point], reference: &[Point]) -> f32 {
    let user_headings = headings(user);
    let reversed: Vec<Point> = reference.iter().rev().copied().collect();

    let mut best = 0.0f32;
    for ref_headings in [headings(reference), headings(&reversed)] {
        let m = user_headings.len().min(ref_headings.len());
        if m == 0 {
            continue;
        }
        for offset in 0..m {
            let sum: f32 = (0..m)
                .map(|i| {
                    1.0 - wrapped_angle_diff(user_headings[i], ref_headings[(i + offset) % m]) / PI
                })
                .sum();
            best = best.max(sum / m as f32);
        }
    }
    best * 100.0
}

/// Weighted blend of the three terms, normalized by the weight sum and
/// clamped to 0..=100.
pub fn similarity_details(
    user: &NormalizedStroke,
    reference: &NormalizedStroke,
    params: &RecognitionParams,
) -> SimilarityDetails {
    let (u, r) = (user.points(), reference.points());

    let point = point_similarity(u, r, params.point_tolerance);
    let line = line_similarity(u, r, params.line_tolerance);
    let angle = angle_similarity(u, r);

    let weight_sum = params.weight_point + params.weight_line + params.weight_angle;
    let combined = if weight_sum > 0.0 {
        (params.weight_point * point + params.weight_line * line + params.weight_angle * angle)
            / weight_sum
    } else {
        0.0
    };

    SimilarityDetails {
        point,
        line,
        angle,
        score: combined.clamp(0.0, 100.0),
    }
}
