// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_precise_hit --heading-base-level=0

//! Understory Precise Hit: exact, geometry-level containment for painted paths.
//!
//! Spatial indexes and bounding boxes answer "might this shape be under the
//! pointer?". This crate answers the follow-up question exactly: is the point
//! inside the filled interior of a path (respecting its [`FillRule`]), or
//! within half a stroke width of its outline?
//!
//! - [`PreciseHitTest`]: the trait implemented by every hit-testable primitive.
//! - [`FilledPath`]: interior containment for a [`BezPath`](kurbo::BezPath).
//! - [`StrokedPath`]: outline containment for a [`BezPath`](kurbo::BezPath)
//!   stroked with a given half-width.
//! - [`HitParams`]: tolerances applied by the tests.
//!
//! All queries take points in the primitive's *local* coordinate space;
//! callers map pointer positions through inverse transforms first.
//!
//! ## Minimal example
//!
//! ```rust
//! use kurbo::{BezPath, Point, Rect, Shape};
//! use understory_precise_hit::{FillRule, FilledPath, HitParams, PreciseHitTest, StrokedPath};
//!
//! let path: BezPath = Rect::new(0.0, 0.0, 10.0, 10.0).to_path(0.1);
//! let params = HitParams::default();
//!
//! let fill = FilledPath::new(&path, FillRule::NonZero);
//! assert!(fill.hit_test_local(Point::new(5.0, 5.0), &params).is_some());
//!
//! // Only the band around the outline is hit by the stroke.
//! let stroke = StrokedPath::new(&path, 1.0);
//! assert!(stroke.hit_test_local(Point::new(5.0, 5.0), &params).is_none());
//! assert!(stroke.hit_test_local(Point::new(0.5, 5.0), &params).is_some());
//! ```
//!
//! This crate is `no_std`.

#![no_std]

mod fill;
mod stroke;

pub use fill::{FillRule, FilledPath};
pub use stroke::StrokedPath;

use kurbo::Point;

/// Tolerances for precise hit tests.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HitParams {
    /// Extra distance, in local units, added to a stroke's half-width.
    pub stroke_tolerance: f64,
}

impl Default for HitParams {
    fn default() -> Self {
        Self {
            stroke_tolerance: 0.0,
        }
    }
}

/// Which part of a primitive produced a hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HitKind {
    /// The filled interior.
    Fill,
    /// The stroked outline.
    Stroke,
}

/// Result of a successful precise hit test.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HitScore {
    /// Distance from the query point to the hit geometry.
    ///
    /// Interior fill hits report `0.0`.
    pub distance: f64,
    /// What was hit.
    pub kind: HitKind,
}

/// A primitive that can be tested exactly against a point in local space.
pub trait PreciseHitTest {
    /// Test `pt` (in local coordinates) against this primitive.
    ///
    /// Returns `None` on a miss.
    fn hit_test_local(&self, pt: Point, params: &HitParams) -> Option<HitScore>;
}
