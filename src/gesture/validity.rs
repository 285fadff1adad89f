use super::normalize::{normalize, NormalizedStroke};
use crate::config::RecognitionParams;
use crate::geometry::{path_length, BoundingBox, Point};
use serde::Serialize;
use strum_macros::Display;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Validity {
    Valid,
    /// Too few points, or the raw footprint is smaller than a deliberate drag.
    Tap,
    /// Normalized bounding box below the area floor.
    Cramped,
    /// Normalized path length below the length floor.
    TooShort,
}

impl Validity {
    pub fn is_valid(&self) -> bool {
        matches!(self, Validity::Valid)
    }
}

/// Classifies a raw stroke. Everything past the tap check runs in normalized
/// space so the verdict does not depend on canvas size.
pub fn classify(points: &[Point], params: &RecognitionParams) -> Validity {
    let Some(raw_bounds) = BoundingBox::of(points) else {
        return Validity::Tap;
    };
    if points.len() < 2 || raw_bounds.max_extent() < params.min_raw_extent {
        debug!(
            "Rejected tap: {} points, raw extent {:.2}",
            points.len(),
            raw_bounds.max_extent()
        );
        return Validity::Tap;
    }

    classify_normalized(&normalize(points, params.resample_points), params)
}

pub fn classify_normalized(norm: &NormalizedStroke, params: &RecognitionParams) -> Validity {
    let Some(bounds) = norm.bounds() else {
        return Validity::Tap;
    };
    let length = path_length(norm.points());
    let (w, h) = (bounds.width(), bounds.height());

    // A strong single-axis gesture has almost no area; only its length counts.
    let line_like = w < params.min_axis_extent || h < params.min_axis_extent;
    if !line_like && bounds.area() < params.min_box_area {
        debug!("Rejected cramped stroke: {:.3} x {:.3}", w, h);
        return Validity::Cramped;
    }
    if length < params.min_path_length {
        debug!("Rejected short stroke: normalized length {:.3}", length);
        return Validity::TooShort;
    }
    Validity::Valid
}

pub fn is_valid_drawing(points: &[Point], params: &RecognitionParams) -> bool {
    classify(points, params).is_valid()
}
