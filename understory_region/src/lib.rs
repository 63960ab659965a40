// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_region --heading-base-level=0

//! Understory Region: immutable 2D regions with a small shape algebra.
//!
//! A [`Region`] describes a set of points in the plane. Regions are built from
//! primitives (rectangles, rounded rectangles, ellipses, and filled Bézier
//! paths) and combined with three operations:
//!
//! - [`Region::union`] / [`Region::union_all`]
//! - [`Region::intersect`]
//! - [`Region::transform`] by an [`Affine`](kurbo::Affine)
//!
//! Combination never flattens geometry into new curves. Instead a region keeps
//! the expression that produced it and answers [`Region::contains`] exactly by
//! evaluating that expression at the query point. This makes composition cheap
//! and exact, at the cost of containment being proportional to the number of
//! primitives involved. A conservative [`Region::bounds`] is cached on every
//! node and used to reject points early.
//!
//! Construction simplifies as it goes:
//! - Empty operands vanish from unions and annihilate intersections.
//! - Nested unions and intersections are flattened.
//! - Intersections with disjoint bounds collapse to the empty region.
//! - Identity transforms are dropped, nested transforms are composed, and
//!   axis-aligned transforms of rectangles stay rectangles.
//! - Singular or non-finite transforms collapse the region to empty.
//!
//! Degenerate inputs (zero-area or non-finite bounds) produce the empty region
//! rather than an error, so callers can fold over arbitrary scene content.
//!
//! ## Minimal example
//!
//! ```rust
//! use kurbo::{Affine, Point, Rect};
//! use understory_region::Region;
//!
//! let left = Region::from_rect(Rect::new(0.0, 0.0, 50.0, 100.0));
//! let square = Region::from_rect(Rect::new(0.0, 0.0, 100.0, 100.0));
//!
//! // Clip the square to its left half, then move it.
//! let clipped = square.intersect(&left).transform(Affine::translate((10.0, 0.0)));
//!
//! assert!(clipped.contains(Point::new(35.0, 50.0)));
//! assert!(!clipped.contains(Point::new(85.0, 50.0)));
//! assert_eq!(clipped.bounds(), Some(Rect::new(10.0, 0.0, 60.0, 100.0)));
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod region;

pub use region::Region;
pub use understory_precise_hit::FillRule;
