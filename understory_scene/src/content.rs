// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Self content of a node: what it paints and how that paint is hit.
//!
//! A node either paints nothing, paints a [`PaintedPath`] (fill and/or
//! stroke), or delegates to a host-provided [`Drawable`] capability such as
//! text or an image. Two containment questions are answered here:
//!
//! - **Geometry** ([`Content::contains_geometry`]): is the point inside the
//!   shape, regardless of how it is painted? Host picking uses this.
//! - **Paint** ([`Content::contains_painted`]): is the point on a part that
//!   actually puts non-transparent paint on screen? Visual inspection uses this.

use alloc::sync::Arc;
use core::fmt;

use kurbo::{BezPath, Point, Rect, Shape, Stroke, StrokeOpts};
use peniko::Brush;
use understory_precise_hit::{FillRule, FilledPath, HitParams, PreciseHitTest, StrokedPath};
use understory_region::Region;

/// Flattening tolerance for stroke outlines.
const STROKE_TOLERANCE: f64 = 1e-3;

/// A host-provided self-drawing capability.
///
/// Implement this for content the scene cannot describe as a path, such as
/// text runs, images, or canvases. Coordinates are in the node's local space.
pub trait Drawable: fmt::Debug {
    /// Local bounds of everything this drawable paints.
    fn bounds(&self) -> Rect;

    /// Exact containment in local coordinates.
    fn contains_point(&self, pt: Point) -> bool;

    /// The drawable's self shape. Defaults to its bounds.
    fn region(&self) -> Region {
        Region::from_rect(self.bounds())
    }

    /// Short type name used by inspection tools.
    fn kind_name(&self) -> &str {
        "Drawable"
    }
}

/// Stroke style plus the paint applied to it.
#[derive(Clone, Debug)]
pub struct StrokePaint {
    /// Width, joins, caps and dashes. Only the width affects hit testing.
    pub style: Stroke,
    /// The paint.
    pub brush: Brush,
}

/// A path with optional fill and stroke paint.
#[derive(Clone, Debug)]
pub struct PaintedPath {
    /// Geometry in local coordinates.
    pub path: Arc<BezPath>,
    /// Fill rule for the interior.
    pub fill_rule: FillRule,
    /// Fill paint, if filled.
    pub fill: Option<Brush>,
    /// Stroke paint, if stroked.
    pub stroke: Option<StrokePaint>,
}

impl PaintedPath {
    /// An unpainted path. Add paint with [`with_fill`](Self::with_fill) and
    /// [`with_stroke`](Self::with_stroke).
    #[must_use]
    pub fn new(path: impl Into<Arc<BezPath>>) -> Self {
        Self {
            path: path.into(),
            fill_rule: FillRule::NonZero,
            fill: None,
            stroke: None,
        }
    }

    /// Set the fill paint.
    #[must_use]
    pub fn with_fill(mut self, brush: impl Into<Brush>) -> Self {
        self.fill = Some(brush.into());
        self
    }

    /// Set the stroke style and paint.
    #[must_use]
    pub fn with_stroke(mut self, style: Stroke, brush: impl Into<Brush>) -> Self {
        self.stroke = Some(StrokePaint {
            style,
            brush: brush.into(),
        });
        self
    }

    /// Set the fill rule.
    #[must_use]
    pub fn with_fill_rule(mut self, rule: FillRule) -> Self {
        self.fill_rule = rule;
        self
    }

    fn half_stroke_width(&self) -> f64 {
        self.stroke.as_ref().map_or(0.0, |s| s.style.width * 0.5)
    }

    /// Local bounds of the painted area, including the stroke.
    ///
    /// `None` for empty or non-finite geometry.
    #[must_use]
    pub fn bounds(&self) -> Option<Rect> {
        if self.path.elements().is_empty() {
            return None;
        }
        let half = self.half_stroke_width();
        let bounds = self.path.bounding_box().inflate(half, half);
        bounds.is_finite().then_some(bounds)
    }

    /// Interior containment, ignoring paint.
    #[must_use]
    pub fn fill_contains(&self, pt: Point) -> bool {
        FilledPath::new(&self.path, self.fill_rule)
            .hit_test_local(pt, &HitParams::default())
            .is_some()
    }

    /// Outline containment, ignoring paint. Always `false` without a stroke.
    #[must_use]
    pub fn stroke_contains(&self, pt: Point) -> bool {
        self.stroke.is_some()
            && StrokedPath::new(&self.path, self.half_stroke_width())
                .hit_test_local(pt, &HitParams::default())
                .is_some()
    }

    /// Returns `true` if the fill puts visible paint on screen.
    #[must_use]
    pub fn has_visible_fill(&self) -> bool {
        self.fill
            .as_ref()
            .is_some_and(|brush| !brush_is_transparent(brush))
    }

    /// Returns `true` if the stroke puts visible paint on screen.
    #[must_use]
    pub fn has_visible_stroke(&self) -> bool {
        self.stroke
            .as_ref()
            .is_some_and(|s| s.style.width > 0.0 && !brush_is_transparent(&s.brush))
    }

    /// The interior as a [`Region`].
    #[must_use]
    pub fn fill_region(&self) -> Region {
        Region::from_shared_path(self.path.clone(), self.fill_rule)
    }

    /// The stroke band as a [`Region`]. Empty without a stroke.
    ///
    /// Like [`stroke_contains`](Self::stroke_contains), only the width is
    /// used: joins and caps are round and dashes are ignored.
    #[must_use]
    pub fn stroke_region(&self) -> Region {
        match &self.stroke {
            Some(paint) if paint.style.width > 0.0 => Region::from_path(
                kurbo::stroke(
                    self.path.iter(),
                    &Stroke::new(paint.style.width),
                    &StrokeOpts::default(),
                    STROKE_TOLERANCE,
                ),
                FillRule::NonZero,
            ),
            _ => Region::EMPTY,
        }
    }

    /// Interior and stroke band together.
    #[must_use]
    pub fn region(&self) -> Region {
        self.fill_region().union(&self.stroke_region())
    }
}

/// What a node paints itself, apart from its children.
#[derive(Clone, Debug, Default)]
pub enum Content {
    /// Nothing; the node is a pure container.
    #[default]
    None,
    /// A painted path.
    Path(PaintedPath),
    /// A host-provided drawable.
    Custom(Arc<dyn Drawable>),
}

impl Content {
    /// Local self bounds, if the node paints anything.
    #[must_use]
    pub fn bounds(&self) -> Option<Rect> {
        match self {
            Self::None => None,
            Self::Path(path) => path.bounds(),
            Self::Custom(drawable) => {
                let bounds = drawable.bounds();
                bounds.is_finite().then_some(bounds)
            }
        }
    }

    /// The self shape used for interactive-area computation.
    #[must_use]
    pub fn self_region(&self) -> Region {
        match self {
            Self::None => Region::EMPTY,
            Self::Path(path) => path.region(),
            Self::Custom(drawable) => drawable.region(),
        }
    }

    /// Geometric containment, independent of paint.
    #[must_use]
    pub fn contains_geometry(&self, pt: Point) -> bool {
        match self {
            Self::None => false,
            Self::Path(path) => path.fill_contains(pt) || path.stroke_contains(pt),
            Self::Custom(drawable) => drawable.contains_point(pt),
        }
    }

    /// Containment restricted to non-transparent paint.
    ///
    /// Paths test the fill first (when it is visible), then the stroke (when
    /// it is visible).
    #[must_use]
    pub fn contains_painted(&self, pt: Point) -> bool {
        match self {
            Self::None => false,
            Self::Path(path) => {
                (path.has_visible_fill() && path.fill_contains(pt))
                    || (path.has_visible_stroke() && path.stroke_contains(pt))
            }
            Self::Custom(drawable) => drawable.contains_point(pt),
        }
    }

    /// Short type name used by inspection tools.
    #[must_use]
    pub fn kind_name(&self) -> &str {
        match self {
            Self::None => "Node",
            Self::Path(_) => "Path",
            Self::Custom(drawable) => drawable.kind_name(),
        }
    }
}

/// Returns `true` if `brush` paints nothing visible.
///
/// Solid colors are transparent at zero alpha; gradients when every stop is.
/// Images are always treated as visible.
#[must_use]
pub fn brush_is_transparent(brush: &Brush) -> bool {
    match brush {
        Brush::Solid(color) => color.components[3] <= 0.0,
        Brush::Gradient(gradient) => gradient
            .stops
            .iter()
            .all(|stop| stop.color.components[3] <= 0.0),
        Brush::Image(_) => false,
    }
}
