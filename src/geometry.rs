use crate::error::{WandClashError, WcResult};
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// A 2D coordinate in whatever space the drawing surface used.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// One continuous drag gesture, in capture order.
pub type Stroke = Vec<Point>;

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[inline(always)]
    pub fn distance(&self, other: &Point) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    #[inline(always)]
    pub fn lerp(&self, other: &Point, t: f32) -> Point {
        Point {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }

    pub fn translated(&self, dx: f32, dy: f32) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }

    pub fn scaled(&self, k: f32) -> Point {
        Point::new(self.x * k, self.y * k)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Point::new(x, y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl BoundingBox {
    /// Returns `None` for an empty point set.
    pub fn of(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let mut bb = BoundingBox {
            min_x: first.x,
            min_y: first.y,
            max_x: first.x,
            max_y: first.y,
        };
        for p in &points[1..] {
            bb.min_x = bb.min_x.min(p.x);
            bb.min_y = bb.min_y.min(p.y);
            bb.max_x = bb.max_x.max(p.x);
            bb.max_y = bb.max_y.max(p.y);
        }
        Some(bb)
    }

    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// The larger of width and height.
    pub fn max_extent(&self) -> f32 {
        self.width().max(self.height())
    }
}

pub fn path_length(points: &[Point]) -> f32 {
    points.windows(2).map(|w| w[0].distance(&w[1])).sum()
}

/// Running arc length; `out[i]` is the length of the path up to point `i`.
pub fn cumulative_lengths(points: &[Point]) -> Vec<f32> {
    let mut out = Vec::with_capacity(points.len());
    let mut acc = 0.0;
    out.push(acc);
    for w in points.windows(2) {
        acc += w[0].distance(&w[1]);
        out.push(acc);
    }
    out
}

pub fn centroid(points: &[Point]) -> Option<Point> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f32;
    let (sx, sy) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    Some(Point::new(sx / n, sy / n))
}

/// Distance from `p` to the segment `a`-`b`, clamped to the segment ends.
pub fn point_segment_distance(p: &Point, a: &Point, b: &Point) -> f32 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    p.distance(&Point::new(a.x + t * dx, a.y + t * dy))
}

/// Direction of travel between consecutive points, in radians.
pub fn headings(points: &[Point]) -> Vec<f32> {
    points
        .windows(2)
        .map(|w| (w[1].y - w[0].y).atan2(w[1].x - w[0].x))
        .collect()
}

/// Absolute difference between two angles folded into `[0, PI]`.
pub fn wrapped_angle_diff(a: f32, b: f32) -> f32 {
    let d = (a - b).abs() % (2.0 * PI);
    if d > PI {
        2.0 * PI - d
    } else {
        d
    }
}

/// Rejects strokes that cannot be scored at all.
pub fn validate_stroke(points: &[Point]) -> WcResult<()> {
    if points.is_empty() {
        return Err(WandClashError::InvalidInput("stroke is empty".to_string()));
    }
    if let Some(idx) = points.iter().position(|p| !p.is_finite()) {
        return Err(WandClashError::InvalidInput(format!(
            "point {} has a non-finite coordinate",
            idx
        )));
    }
    Ok(())
}
