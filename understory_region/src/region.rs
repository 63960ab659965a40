// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The [`Region`] type.

use alloc::sync::Arc;
use alloc::vec::Vec;

use kurbo::{Affine, BezPath, Circle, Ellipse, Point, Rect, RoundedRect, Shape};
use understory_precise_hit::{FillRule, FilledPath, HitParams, PreciseHitTest};

/// Determinants smaller than this are treated as singular.
const SINGULAR_EPSILON: f64 = 1e-12;

/// An immutable 2D region.
///
/// Cloning is cheap: compound regions share their operands.
///
/// See the [crate documentation](crate) for the algebra and its simplification
/// rules.
#[derive(Clone, Debug)]
pub struct Region {
    repr: Repr,
    /// Conservative bounds; meaningless for [`Repr::Empty`].
    bounds: Rect,
}

#[derive(Clone, Debug)]
enum Repr {
    Empty,
    Rect(Rect),
    RoundedRect(RoundedRect),
    Ellipse(Ellipse),
    Path(Arc<BezPath>, FillRule),
    Union(Arc<[Region]>),
    Intersection(Arc<[Region]>),
    Transform {
        inverse: Affine,
        transform: Affine,
        inner: Arc<Region>,
    },
}

impl Default for Region {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Region {
    /// The empty region.
    pub const EMPTY: Self = Self {
        repr: Repr::Empty,
        bounds: Rect::ZERO,
    };

    /// Returns the empty region.
    #[inline]
    #[must_use]
    pub const fn empty() -> Self {
        Self::EMPTY
    }

    /// A rectangle. Zero-area or non-finite rectangles yield the empty region.
    #[must_use]
    pub fn from_rect(rect: Rect) -> Self {
        match valid_bounds(rect) {
            Some(rect) => Self {
                repr: Repr::Rect(rect),
                bounds: rect,
            },
            None => Self::EMPTY,
        }
    }

    /// A rounded rectangle.
    #[must_use]
    pub fn from_rounded_rect(rounded: RoundedRect) -> Self {
        match valid_bounds(rounded.bounding_box()) {
            Some(bounds) => Self {
                repr: Repr::RoundedRect(rounded),
                bounds,
            },
            None => Self::EMPTY,
        }
    }

    /// An ellipse (possibly rotated).
    #[must_use]
    pub fn from_ellipse(ellipse: Ellipse) -> Self {
        match valid_bounds(ellipse.bounding_box()) {
            Some(bounds) => Self {
                repr: Repr::Ellipse(ellipse),
                bounds,
            },
            None => Self::EMPTY,
        }
    }

    /// A circle.
    #[must_use]
    pub fn from_circle(circle: Circle) -> Self {
        Self::from_ellipse(Ellipse::new(
            circle.center,
            (circle.radius, circle.radius),
            0.0,
        ))
    }

    /// The filled interior of `path` under `rule`.
    #[must_use]
    pub fn from_path(path: BezPath, rule: FillRule) -> Self {
        Self::from_shared_path(Arc::new(path), rule)
    }

    /// Like [`Region::from_path`], sharing an existing path allocation.
    #[must_use]
    pub fn from_shared_path(path: Arc<BezPath>, rule: FillRule) -> Self {
        if path.elements().is_empty() {
            return Self::EMPTY;
        }
        match valid_bounds(path.bounding_box()) {
            Some(bounds) => Self {
                repr: Repr::Path(path, rule),
                bounds,
            },
            None => Self::EMPTY,
        }
    }

    /// Returns `true` if this region contains no points.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self.repr, Repr::Empty)
    }

    /// Conservative axis-aligned bounds, or `None` for the empty region.
    #[inline]
    #[must_use]
    pub fn bounds(&self) -> Option<Rect> {
        (!self.is_empty()).then_some(self.bounds)
    }

    /// Exact point containment.
    #[must_use]
    pub fn contains(&self, pt: Point) -> bool {
        if self.is_empty() || !contains_inclusive(self.bounds, pt) {
            return false;
        }
        match &self.repr {
            Repr::Empty => false,
            Repr::Rect(rect) => rect.contains(pt),
            Repr::RoundedRect(rounded) => rounded.contains(pt),
            Repr::Ellipse(ellipse) => ellipse.contains(pt),
            Repr::Path(path, rule) => FilledPath::new(path, *rule)
                .hit_test_local(pt, &HitParams::default())
                .is_some(),
            Repr::Union(parts) => parts.iter().any(|part| part.contains(pt)),
            Repr::Intersection(parts) => parts.iter().all(|part| part.contains(pt)),
            Repr::Transform { inverse, inner, .. } => inner.contains(*inverse * pt),
        }
    }

    /// The union of `self` and `other`.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self::union_all([self.clone(), other.clone()])
    }

    /// The union of every region in `regions`.
    ///
    /// Empty regions are skipped, so this is safe to call with whatever a scene
    /// traversal produced.
    #[must_use]
    pub fn union_all<I>(regions: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        let mut parts: Vec<Self> = Vec::new();
        for region in regions {
            if let Repr::Union(inner) = &region.repr {
                parts.extend(inner.iter().cloned());
                continue;
            }
            if !region.is_empty() {
                parts.push(region);
            }
        }
        match parts.len() {
            0 => Self::EMPTY,
            1 => parts.pop().unwrap_or_default(),
            _ => {
                let bounds = parts
                    .iter()
                    .map(|part| part.bounds)
                    .reduce(|acc, b| acc.union(b))
                    .unwrap_or(Rect::ZERO);
                Self {
                    repr: Repr::Union(parts.into()),
                    bounds,
                }
            }
        }
    }

    /// The intersection of `self` and `other`.
    #[must_use]
    pub fn intersect(&self, other: &Self) -> Self {
        if self.is_empty() || other.is_empty() {
            return Self::EMPTY;
        }
        let Some(bounds) = valid_bounds(self.bounds.intersect(other.bounds)) else {
            return Self::EMPTY;
        };
        if let (Repr::Rect(a), Repr::Rect(b)) = (&self.repr, &other.repr) {
            return Self::from_rect(a.intersect(*b));
        }
        let mut parts: Vec<Self> = Vec::with_capacity(2);
        for region in [self, other] {
            match &region.repr {
                Repr::Intersection(inner) => parts.extend(inner.iter().cloned()),
                _ => parts.push(region.clone()),
            }
        }
        Self {
            repr: Repr::Intersection(parts.into()),
            bounds,
        }
    }

    /// This region mapped through `affine`.
    #[must_use]
    pub fn transform(&self, affine: Affine) -> Self {
        if self.is_empty() {
            return Self::EMPTY;
        }
        if affine == Affine::IDENTITY {
            return self.clone();
        }
        if is_axis_aligned(affine)
            && !is_singular(affine)
            && let Repr::Rect(rect) = &self.repr
        {
            return Self::from_rect(affine.transform_rect_bbox(*rect));
        }
        let (transform, inner) = match &self.repr {
            Repr::Transform {
                transform, inner, ..
            } => (affine * *transform, inner.clone()),
            _ => (affine, Arc::new(self.clone())),
        };
        if is_singular(transform) {
            return Self::EMPTY;
        }
        let Some(bounds) = valid_bounds(transform.transform_rect_bbox(inner.bounds)) else {
            return Self::EMPTY;
        };
        Self {
            repr: Repr::Transform {
                inverse: transform.inverse(),
                transform,
                inner,
            },
            bounds,
        }
    }
}

impl From<Rect> for Region {
    fn from(rect: Rect) -> Self {
        Self::from_rect(rect)
    }
}

impl From<RoundedRect> for Region {
    fn from(rounded: RoundedRect) -> Self {
        Self::from_rounded_rect(rounded)
    }
}

impl From<Ellipse> for Region {
    fn from(ellipse: Ellipse) -> Self {
        Self::from_ellipse(ellipse)
    }
}

impl From<Circle> for Region {
    fn from(circle: Circle) -> Self {
        Self::from_circle(circle)
    }
}

fn valid_bounds(rect: Rect) -> Option<Rect> {
    let rect = rect.abs();
    (rect.is_finite() && rect.width() > 0.0 && rect.height() > 0.0).then_some(rect)
}

fn contains_inclusive(rect: Rect, pt: Point) -> bool {
    pt.x >= rect.x0 && pt.x <= rect.x1 && pt.y >= rect.y0 && pt.y <= rect.y1
}

fn is_axis_aligned(affine: Affine) -> bool {
    let [_, b, c, _, _, _] = affine.as_coeffs();
    b == 0.0 && c == 0.0
}

fn is_singular(affine: Affine) -> bool {
    let det = affine.determinant();
    !det.is_finite() || (det > -SINGULAR_EPSILON && det < SINGULAR_EPSILON)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f64::consts::FRAC_PI_4;
    use kurbo::Vec2;

    fn sample_points() -> impl Iterator<Item = Point> {
        (0..=24).flat_map(|i| {
            (0..=24).map(move |j| Point::new(f64::from(i) * 5.0 - 10.0, f64::from(j) * 5.0 - 10.0))
        })
    }

    fn assert_same_points(a: &Region, b: &Region) {
        for pt in sample_points() {
            assert_eq!(a.contains(pt), b.contains(pt), "regions disagree at {pt:?}");
        }
    }

    #[test]
    fn degenerate_primitives_are_empty() {
        assert!(Region::from_rect(Rect::new(0.0, 0.0, 0.0, 10.0)).is_empty());
        assert!(Region::from_rect(Rect::new(0.0, 0.0, f64::NAN, 10.0)).is_empty());
        assert!(Region::from_path(BezPath::new(), FillRule::NonZero).is_empty());
        assert_eq!(Region::EMPTY.bounds(), None);
        assert!(!Region::EMPTY.contains(Point::ZERO));
    }

    #[test]
    fn union_is_associative_and_commutative() {
        let a = Region::from_rect(Rect::new(0.0, 0.0, 40.0, 40.0));
        let b = Region::from_circle(Circle::new((50.0, 50.0), 20.0));
        let c = Region::from_rect(Rect::new(60.0, 0.0, 100.0, 30.0))
            .transform(Affine::rotate_about(FRAC_PI_4, Point::new(80.0, 15.0)));

        let left = a.union(&b.union(&c));
        let right = a.union(&b).union(&c);
        assert_same_points(&left, &right);

        let swapped = c.union(&a).union(&b);
        assert_same_points(&left, &swapped);
    }

    #[test]
    fn union_skips_empty_operands() {
        let a = Region::from_rect(Rect::new(0.0, 0.0, 10.0, 10.0));
        let u = Region::union_all([Region::EMPTY, a.clone(), Region::EMPTY]);
        assert_eq!(u.bounds(), a.bounds());
        assert!(Region::union_all([Region::EMPTY, Region::EMPTY]).is_empty());
    }

    #[test]
    fn intersection_clips_to_overlap() {
        let square = Region::from_rect(Rect::new(0.0, 0.0, 100.0, 100.0));
        let disc = Region::from_circle(Circle::new((100.0, 50.0), 30.0));
        let lens = square.intersect(&disc);
        assert!(lens.contains(Point::new(90.0, 50.0)));
        assert!(!lens.contains(Point::new(110.0, 50.0)));
        assert!(!lens.contains(Point::new(50.0, 50.0)));
        assert_eq!(lens.bounds(), Some(Rect::new(70.0, 20.0, 100.0, 80.0)));
    }

    #[test]
    fn disjoint_intersection_is_empty() {
        let a = Region::from_rect(Rect::new(0.0, 0.0, 10.0, 10.0));
        let b = Region::from_circle(Circle::new((50.0, 50.0), 5.0));
        assert!(a.intersect(&b).is_empty());
        assert!(a.intersect(&Region::EMPTY).is_empty());
    }

    #[test]
    fn axis_aligned_transform_keeps_rects() {
        let r = Region::from_rect(Rect::new(0.0, 0.0, 10.0, 10.0))
            .transform(Affine::scale_non_uniform(2.0, -1.0).then_translate(Vec2::new(5.0, 5.0)));
        assert!(matches!(r.repr, Repr::Rect(_)));
        assert_eq!(r.bounds(), Some(Rect::new(5.0, -5.0, 25.0, 5.0)));
        assert!(r.contains(Point::new(20.0, 0.0)));
    }

    #[test]
    fn nested_transforms_compose() {
        let disc = Region::from_circle(Circle::new((0.0, 0.0), 5.0));
        let t1 = Affine::translate((100.0, 0.0));
        let t2 = Affine::scale(2.0);
        let twice = disc.transform(t2).transform(t1);
        let once = disc.transform(t1 * t2);
        assert!(matches!(&twice.repr, Repr::Transform { inner, .. } if matches!(inner.repr, Repr::Ellipse(_))));
        assert!(twice.contains(Point::new(109.0, 0.0)));
        assert!(!twice.contains(Point::new(111.0, 0.0)));
        for x in 85..=115 {
            let pt = Point::new(f64::from(x), 3.0);
            assert_eq!(twice.contains(pt), once.contains(pt));
        }
    }

    #[test]
    fn singular_transform_collapses() {
        let r = Region::from_rect(Rect::new(0.0, 0.0, 10.0, 10.0));
        assert!(r.transform(Affine::scale_non_uniform(1.0, 0.0)).is_empty());
        let disc = Region::from_circle(Circle::new((0.0, 0.0), 5.0));
        assert!(disc.transform(Affine::scale(0.0)).is_empty());
    }

    #[test]
    fn even_odd_paths_have_holes() {
        let mut path = Rect::new(0.0, 0.0, 30.0, 30.0).to_path(0.1);
        path.extend(Rect::new(10.0, 10.0, 20.0, 20.0).path_elements(0.1));
        let ring = Region::from_path(path.clone(), FillRule::EvenOdd);
        let solid = Region::from_path(path, FillRule::NonZero);
        assert!(!ring.contains(Point::new(15.0, 15.0)));
        assert!(ring.contains(Point::new(5.0, 15.0)));
        assert!(solid.contains(Point::new(15.0, 15.0)));
    }
}
