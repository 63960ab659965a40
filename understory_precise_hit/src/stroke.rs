// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stroke-oriented helpers for precise hit testing.
//!
//! The stroke model here is the centerline plus a uniform half-width. Joins
//! and caps are treated as round, which is what the distance-to-centerline
//! test naturally produces. Dashes are ignored; a dashed stroke is hit where
//! its solid counterpart would be.

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::{BezPath, ParamCurveNearest, Point};

use crate::{HitKind, HitParams, HitScore, PreciseHitTest};

/// Accuracy passed to kurbo's nearest-point search for curved segments.
const NEAREST_ACCURACY: f64 = 1e-3;

/// A borrowed path stroked with a uniform width.
///
/// The precise hit test uses the minimum distance from the query point to
/// every segment of the path (closing segments included) and compares it
/// against the half-width plus [`HitParams::stroke_tolerance`].
#[derive(Clone, Copy, Debug)]
pub struct StrokedPath<'a> {
    /// The centerline in local coordinates.
    pub path: &'a BezPath,
    /// Half of the stroke width in local units.
    pub half_width: f64,
}

impl<'a> StrokedPath<'a> {
    /// Wrap a path stroked with `half_width` on either side of the centerline.
    #[must_use]
    pub const fn new(path: &'a BezPath, half_width: f64) -> Self {
        Self { path, half_width }
    }
}

impl PreciseHitTest for StrokedPath<'_> {
    fn hit_test_local(&self, pt: Point, params: &HitParams) -> Option<HitScore> {
        let limit = self.half_width + params.stroke_tolerance;
        if limit.is_nan() || limit <= 0.0 {
            return None;
        }
        let limit_sq = limit * limit;
        let mut best_sq = f64::INFINITY;
        for seg in self.path.segments() {
            let d = seg.nearest(pt, NEAREST_ACCURACY).distance_sq;
            if d < best_sq {
                best_sq = d;
            }
        }
        (best_sq <= limit_sq).then(|| HitScore {
            distance: best_sq.sqrt(),
            kind: HitKind::Stroke,
        })
    }
}
