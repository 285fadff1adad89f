use crate::geometry::{centroid, cumulative_lengths, BoundingBox, Point};
use serde::Serialize;

/// A stroke resampled to a fixed length, centered on its centroid and scaled
/// so the larger bounding-box side is 1 (unscaled when that side is 0).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedStroke {
    points: Vec<Point>,
}

impl NormalizedStroke {
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn bounds(&self) -> Option<BoundingBox> {
        BoundingBox::of(&self.points)
    }

    pub fn into_points(self) -> Vec<Point> {
        self.points
    }
}

/// Re-parameterizes the stroke by arc length and returns `count` evenly
/// spaced points along it.
pub fn resample(points: &[Point], count: usize) -> Vec<Point> {
    if points.is_empty() || count == 0 {
        return Vec::new();
    }
    if points.len() == 1 {
        return vec![points[0]; count];
    }

    let cumulative = cumulative_lengths(points);
    let total = cumulative[cumulative.len() - 1];
    if total <= 0.0 {
        return vec![points[0]; count];
    }
    if count == 1 {
        return vec![points[0]];
    }

    let step = total / (count - 1) as f32;
    let last = points.len() - 1;
    let mut out = Vec::with_capacity(count);
    let mut seg = 1;

    for k in 0..count {
        // Pin the final sample to the true end; k * step can fall short.
        let target = if k == count - 1 {
            total
        } else {
            step * k as f32
        };
        while seg < last && cumulative[seg] < target {
            seg += 1;
        }
        let start = cumulative[seg - 1];
        let span = cumulative[seg] - start;
        let t = if span > 0.0 {
            ((target - start) / span).clamp(0.0, 1.0)
        } else {
            0.0
        };
        out.push(points[seg - 1].lerp(&points[seg], t));
    }
    out
}

pub fn normalize(points: &[Point], count: usize) -> NormalizedStroke {
    let resampled = resample(points, count);
    let Some(center) = centroid(&resampled) else {
        return NormalizedStroke { points: resampled };
    };

    let centered: Vec<Point> = resampled
        .iter()
        .map(|p| p.translated(-center.x, -center.y))
        .collect();

    let scale = BoundingBox::of(&centered)
        .map(|bb| bb.max_extent())
        .unwrap_or(0.0);
    if scale == 0.0 {
        return NormalizedStroke { points: centered };
    }

    NormalizedStroke {
        points: centered
            .iter()
            .map(|p| Point::new(p.x / scale, p.y / scale))
            .collect(),
    }
}
