// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Interior containment for filled paths.

use kurbo::{BezPath, Point, Shape};

use crate::{HitKind, HitParams, HitScore, PreciseHitTest};

/// Rule deciding which regions of a self-intersecting path count as inside.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FillRule {
    /// Inside when the winding number is non-zero.
    #[default]
    NonZero,
    /// Inside when the winding number is odd.
    EvenOdd,
}

impl FillRule {
    /// Returns `true` if a point with the given winding number is inside.
    #[inline]
    #[must_use]
    pub const fn is_inside(self, winding: i32) -> bool {
        match self {
            Self::NonZero => winding != 0,
            Self::EvenOdd => winding % 2 != 0,
        }
    }
}

/// A borrowed path tested for interior containment.
///
/// Subpaths are expected to be closed; the winding number of an open subpath
/// is whatever its segments contribute.
#[derive(Clone, Copy, Debug)]
pub struct FilledPath<'a> {
    /// The path geometry in local coordinates.
    pub path: &'a BezPath,
    /// The rule used to resolve the winding number.
    pub rule: FillRule,
}

impl<'a> FilledPath<'a> {
    /// Wrap a path for fill hit testing.
    #[must_use]
    pub const fn new(path: &'a BezPath, rule: FillRule) -> Self {
        Self { path, rule }
    }
}

impl PreciseHitTest for FilledPath<'_> {
    fn hit_test_local(&self, pt: Point, _params: &HitParams) -> Option<HitScore> {
        if self.path.elements().is_empty() {
            return None;
        }
        // Inclusive bounds reject.
        let bbox = self.path.bounding_box();
        if pt.x < bbox.x0 || pt.x > bbox.x1 || pt.y < bbox.y0 || pt.y > bbox.y1 {
            return None;
        }
        self.rule
            .is_inside(self.path.winding(pt))
            .then_some(HitScore {
                distance: 0.0,
                kind: HitKind::Fill,
            })
    }
}
