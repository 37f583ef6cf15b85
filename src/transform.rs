//! Handling of affine transforms.
//!
//! This module contains the following:
//!
//! * [`Transform`] to represent 2D transforms in general; it's just a matrix.
//!
//! * [`ValidTransform`], a transform that has been checked to be invertible.
//!
//! * [`Transformable`], the position/rotation/scale/origin component that a shape owns,
//!   which turns those inputs into a [`Transform`] lazily and caches the result until
//!   one of the inputs changes.

use std::cell::Cell;
use std::ops::Deref;

use crate::error::InvalidTransform;
use crate::rect::Rect;

/// Determinants smaller than this in magnitude are treated as singular.
const DETERMINANT_EPSILON: f64 = 1e-14;

/// A transform that has been checked to be invertible.
///
/// Hit-testing needs to map points back into a shape's local space, so we use this
/// type to validate transforms before inverting them.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct ValidTransform(Transform);

impl TryFrom<Transform> for ValidTransform {
    type Error = InvalidTransform;

    /// Validates a [`Transform`] before converting it to a [`ValidTransform`].
    ///
    /// A transform is valid if it is invertible.  For example, a
    /// matrix with all-zeros is not invertible, and it is invalid.
    fn try_from(t: Transform) -> Result<ValidTransform, InvalidTransform> {
        if t.is_invertible() {
            Ok(ValidTransform(t))
        } else {
            Err(InvalidTransform)
        }
    }
}

impl Deref for ValidTransform {
    type Target = Transform;

    fn deref(&self) -> &Transform {
        &self.0
    }
}

impl ValidTransform {
    /// Inverse of a transform that is known to be invertible.
    pub fn inverse(&self) -> ValidTransform {
        let det = self.0.determinant();
        ValidTransform(self.0.invert_with_determinant(det))
    }
}

/// A 2D transformation matrix.
///
/// The six values correspond to `m0..m5` in
///
/// ```text
/// x' = xx * x + xy * y + x0
/// y' = yx * x + yy * y + y0
/// ```
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    pub xx: f64,
    pub yx: f64,
    pub xy: f64,
    pub yy: f64,
    pub x0: f64,
    pub y0: f64,
}

impl Transform {
    #[inline]
    pub fn new_unchecked(xx: f64, yx: f64, xy: f64, yy: f64, x0: f64, y0: f64) -> Self {
        Self {
            xx,
            yx,
            xy,
            yy,
            x0,
            y0,
        }
    }

    #[inline]
    pub fn identity() -> Self {
        Self::new_unchecked(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }

    #[inline]
    pub fn new_translate(tx: f64, ty: f64) -> Self {
        Self::new_unchecked(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    #[inline]
    pub fn new_scale(sx: f64, sy: f64) -> Self {
        Self::new_unchecked(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    /// Rotation by `angle` radians around the origin.
    ///
    /// With the y axis pointing down, positive angles rotate clockwise on screen.
    #[inline]
    pub fn new_rotate(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Self::new_unchecked(c, s, -s, c, 0.0, 0.0)
    }

    /// Rotation by `angle` radians around the pivot `(px, py)`.
    pub fn new_rotate_about(angle: f64, px: f64, py: f64) -> Self {
        Transform::new_translate(px, py)
            .pre_rotate(angle)
            .pre_translate(-px, -py)
    }

    /// Scaling by `(sx, sy)` around the pivot `(px, py)`.
    pub fn new_scale_about(sx: f64, sy: f64, px: f64, py: f64) -> Self {
        Transform::new_translate(px, py)
            .pre_scale(sx, sy)
            .pre_translate(-px, -py)
    }

    /// Matrix product `a · b`: the resulting transform applies `b` first, then `a`.
    #[must_use]
    pub fn multiply(a: &Transform, b: &Transform) -> Self {
        Transform {
            xx: a.xx * b.xx + a.xy * b.yx,
            yx: a.yx * b.xx + a.yy * b.yx,
            xy: a.xx * b.xy + a.xy * b.yy,
            yy: a.yx * b.xy + a.yy * b.yy,
            x0: a.xx * b.x0 + a.xy * b.y0 + a.x0,
            y0: a.yx * b.x0 + a.yy * b.y0 + a.y0,
        }
    }

    /// Returns a transform that applies `t` first, then `self`.
    #[inline]
    pub fn pre_transform(&self, t: &Transform) -> Self {
        Self::multiply(self, t)
    }

    /// Returns a transform that applies `self` first, then `t`.
    #[inline]
    pub fn post_transform(&self, t: &Transform) -> Self {
        Self::multiply(t, self)
    }

    #[inline]
    pub fn pre_translate(&self, x: f64, y: f64) -> Self {
        self.pre_transform(&Transform::new_translate(x, y))
    }

    #[inline]
    pub fn pre_scale(&self, sx: f64, sy: f64) -> Self {
        self.pre_transform(&Transform::new_scale(sx, sy))
    }

    #[inline]
    pub fn pre_rotate(&self, angle: f64) -> Self {
        self.pre_transform(&Transform::new_rotate(angle))
    }

    #[inline]
    pub fn post_translate(&self, x: f64, y: f64) -> Self {
        self.post_transform(&Transform::new_translate(x, y))
    }

    #[inline]
    pub fn post_scale(&self, sx: f64, sy: f64) -> Self {
        self.post_transform(&Transform::new_scale(sx, sy))
    }

    #[inline]
    pub fn post_rotate(&self, angle: f64) -> Self {
        self.post_transform(&Transform::new_rotate(angle))
    }

    #[inline]
    pub fn post_rotate_about(&self, angle: f64, px: f64, py: f64) -> Self {
        self.post_transform(&Transform::new_rotate_about(angle, px, py))
    }

    #[inline]
    pub fn post_scale_about(&self, sx: f64, sy: f64, px: f64, py: f64) -> Self {
        self.post_transform(&Transform::new_scale_about(sx, sy, px, py))
    }

    #[inline]
    fn determinant(&self) -> f64 {
        self.xx * self.yy - self.xy * self.yx
    }

    #[inline]
    fn is_singular(det: f64) -> bool {
        !det.is_finite() || det.abs() < DETERMINANT_EPSILON
    }

    #[inline]
    pub fn is_invertible(&self) -> bool {
        !Self::is_singular(self.determinant())
    }

    /// Returns the inverse transform, or `None` if the determinant is zero or nearly so.
    #[must_use]
    pub fn invert(&self) -> Option<Self> {
        let det = self.determinant();

        if Self::is_singular(det) {
            return None;
        }

        Some(self.invert_with_determinant(det))
    }

    fn invert_with_determinant(&self, det: f64) -> Self {
        let inv_det = 1.0 / det;

        Transform::new_unchecked(
            inv_det * self.yy,
            inv_det * (-self.yx),
            inv_det * (-self.xy),
            inv_det * self.xx,
            inv_det * (self.xy * self.y0 - self.yy * self.x0),
            inv_det * (self.yx * self.x0 - self.xx * self.y0),
        )
    }

    #[inline]
    pub fn is_identity(&self) -> bool {
        *self == Transform::identity()
    }

    /// Average scale factor of the transform, used to pick output precision.
    pub fn average_scale(&self) -> f64 {
        let sx = self.xx.hypot(self.yx);
        let sy = self.xy.hypot(self.yy);
        (sx + sy) / 2.0
    }

    #[inline]
    pub fn transform_distance(&self, dx: f64, dy: f64) -> (f64, f64) {
        (dx * self.xx + dy * self.xy, dx * self.yx + dy * self.yy)
    }

    #[inline]
    pub fn transform_point(&self, px: f64, py: f64) -> (f64, f64) {
        let (x, y) = self.transform_distance(px, py);
        (x + self.x0, y + self.y0)
    }

    pub fn transform_rect(&self, rect: &Rect) -> Rect {
        let points = [
            self.transform_point(rect.x0, rect.y0),
            self.transform_point(rect.x1, rect.y0),
            self.transform_point(rect.x0, rect.y1),
            self.transform_point(rect.x1, rect.y1),
        ];

        let (mut xmin, mut ymin, mut xmax, mut ymax) = {
            let (x, y) = points[0];

            (x, y, x, y)
        };

        for &(x, y) in points.iter().skip(1) {
            if x < xmin {
                xmin = x;
            }

            if x > xmax {
                xmax = x;
            }

            if y < ymin {
                ymin = y;
            }

            if y > ymax {
                ymax = y;
            }
        }

        Rect {
            x0: xmin,
            y0: ymin,
            x1: xmax,
            y1: ymax,
        }
    }
}

impl Default for Transform {
    #[inline]
    fn default() -> Transform {
        Transform::identity()
    }
}

/// Position, rotation, scale and pivot of a shape.
///
/// The composite transform is
///
/// ```text
/// scale (about origin) ∘ rotate (about origin) ∘ translate (by position)
/// ```
///
/// that is, points are first scaled around `origin`, then rotated around `origin`,
/// and finally moved by `position`.  It is only recomputed after one of the inputs
/// changes.
#[derive(Debug, Clone)]
pub struct Transformable {
    position: (f64, f64),
    rotation: f64,
    scale: (f64, f64),
    origin: (f64, f64),
    cached: Cell<Option<Transform>>,
}

impl Default for Transformable {
    fn default() -> Self {
        Transformable {
            position: (0.0, 0.0),
            rotation: 0.0,
            scale: (1.0, 1.0),
            origin: (0.0, 0.0),
            cached: Cell::new(None),
        }
    }
}

impl Transformable {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn position(&self) -> (f64, f64) {
        self.position
    }

    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn scale(&self) -> (f64, f64) {
        self.scale
    }

    pub fn origin(&self) -> (f64, f64) {
        self.origin
    }

    pub fn set_position(&mut self, x: f64, y: f64) {
        self.position = (x, y);
        self.invalidate();
    }

    /// Sets the rotation in radians.
    pub fn set_rotation(&mut self, rotation: f64) {
        self.rotation = rotation;
        self.invalidate();
    }

    pub fn set_scale(&mut self, sx: f64, sy: f64) {
        self.scale = (sx, sy);
        self.invalidate();
    }

    /// Sets the pivot for scaling and rotation.
    pub fn set_origin(&mut self, x: f64, y: f64) {
        self.origin = (x, y);
        self.invalidate();
    }

    /// Whether the composite transform needs to be recomputed.
    pub fn is_dirty(&self) -> bool {
        self.cached.get().is_none()
    }

    fn invalidate(&self) {
        self.cached.set(None);
    }

    /// Returns the composite transform, recomputing it only if an input changed.
    pub fn transform(&self) -> Transform {
        if let Some(t) = self.cached.get() {
            return t;
        }

        let t = self.compose();
        self.cached.set(Some(t));
        t
    }

    fn compose(&self) -> Transform {
        let (ox, oy) = self.origin;
        let (x, y) = self.position;

        let mut t = Transform::identity();

        if self.scale != (1.0, 1.0) {
            t = t.post_scale_about(self.scale.0, self.scale.1, ox, oy);
        }

        if self.rotation != 0.0 {
            t = t.post_rotate_about(self.rotation, ox, oy);
        }

        t.post_translate(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::ApproxEq;
    use std::f64;
    use std::f64::consts::FRAC_PI_2;

    fn assert_transform_eq(t1: &Transform, t2: &Transform) {
        let epsilon = 8.0 * f64::EPSILON; // kind of arbitrary, but allow for some sloppiness

        assert!(t1.xx.approx_eq(t2.xx, (epsilon, 1)));
        assert!(t1.yx.approx_eq(t2.yx, (epsilon, 1)));
        assert!(t1.xy.approx_eq(t2.xy, (epsilon, 1)));
        assert!(t1.yy.approx_eq(t2.yy, (epsilon, 1)));
        assert!(t1.x0.approx_eq(t2.x0, (epsilon, 1)));
        assert!(t1.y0.approx_eq(t2.y0, (epsilon, 1)));
    }

    fn assert_point_eq(p1: (f64, f64), p2: (f64, f64)) {
        assert!(p1.0.approx_eq(p2.0, (1e-9, 1)), "{p1:?} != {p2:?}");
        assert!(p1.1.approx_eq(p2.1, (1e-9, 1)), "{p1:?} != {p2:?}");
    }

    #[test]
    fn test_multiply() {
        let t1 = Transform::identity();
        let t2 = Transform::new_unchecked(1.0, 2.0, 3.0, 4.0, 5.0, 6.0);
        assert_transform_eq(&Transform::multiply(&t1, &t2), &t2);
        assert_transform_eq(&Transform::multiply(&t2, &t1), &t2);

        let t1 = Transform::new_unchecked(1.0, 2.0, 3.0, 4.0, 5.0, 6.0);
        let t2 = Transform::new_unchecked(0.0, 0.0, 0.0, 0.0, 0.0, 0.0);
        let r = Transform::new_unchecked(0.0, 0.0, 0.0, 0.0, 5.0, 6.0);
        assert_transform_eq(&Transform::multiply(&t2, &t1), &t2);
        assert_transform_eq(&Transform::multiply(&t1, &t2), &r);

        let t1 = Transform::new_unchecked(0.5, 0.0, 0.0, 0.5, 10.0, 10.0);
        let t2 = Transform::new_unchecked(1.0, 0.0, 0.0, 1.0, -10.0, -10.0);
        let r1 = Transform::new_unchecked(0.5, 0.0, 0.0, 0.5, 0.0, 0.0);
        let r2 = Transform::new_unchecked(0.5, 0.0, 0.0, 0.5, 5.0, 5.0);
        assert_transform_eq(&Transform::multiply(&t2, &t1), &r1);
        assert_transform_eq(&Transform::multiply(&t1, &t2), &r2);
    }

    #[test]
    fn multiply_applies_right_operand_first() {
        let translate = Transform::new_translate(10.0, 0.0);
        let scale = Transform::new_scale(2.0, 2.0);

        // scale first, then translate
        let t = Transform::multiply(&translate, &scale);
        assert_point_eq(t.transform_point(1.0, 1.0), (12.0, 2.0));

        // translate first, then scale
        let t = Transform::multiply(&scale, &translate);
        assert_point_eq(t.transform_point(1.0, 1.0), (22.0, 2.0));
    }

    #[test]
    fn test_invert() {
        let t = Transform::new_unchecked(2.0, 0.0, 0.0, 0.0, 0.0, 0.0);
        assert!(!t.is_invertible());
        assert!(t.invert().is_none());

        let t = Transform::new_unchecked(1e-8, 0.0, 0.0, 1e-8, 0.0, 0.0);
        assert!(t.invert().is_none());

        let t = Transform::identity();
        assert!(t.is_invertible());
        let i = t.invert().unwrap();
        assert_transform_eq(&i, &Transform::identity());

        let t = Transform::new_unchecked(1.0, 2.0, 3.0, 4.0, 5.0, 6.0);
        assert!(t.is_invertible());
        let i = t.invert().unwrap();
        assert_transform_eq(&t.pre_transform(&i), &Transform::identity());
        assert_transform_eq(&t.post_transform(&i), &Transform::identity());
    }

    #[test]
    fn valid_transform_rejects_singular_matrices() {
        let singular = Transform::new_scale(0.0, 1.0);
        assert_eq!(ValidTransform::try_from(singular), Err(InvalidTransform));

        let t = ValidTransform::try_from(Transform::new_translate(3.0, 4.0)).unwrap();
        assert_point_eq(t.inverse().transform_point(3.0, 4.0), (0.0, 0.0));
    }

    #[test]
    pub fn test_transform_point() {
        let t = Transform::new_translate(10.0, 10.0);
        assert_eq!((11.0, 11.0), t.transform_point(1.0, 1.0));
    }

    #[test]
    pub fn test_transform_distance() {
        let t = Transform::new_translate(10.0, 10.0).pre_scale(2.0, 1.0);
        assert_eq!((2.0, 1.0), t.transform_distance(1.0, 1.0));
    }

    #[test]
    fn rotates_about_pivot() {
        let t = Transform::new_rotate_about(FRAC_PI_2, 10.0, 10.0);
        assert_point_eq(t.transform_point(10.0, 10.0), (10.0, 10.0));
        assert_point_eq(t.transform_point(20.0, 10.0), (10.0, 20.0));
    }

    #[test]
    fn scales_about_pivot() {
        let t = Transform::new_scale_about(2.0, 3.0, 5.0, 5.0);
        assert_point_eq(t.transform_point(5.0, 5.0), (5.0, 5.0));
        assert_point_eq(t.transform_point(6.0, 6.0), (7.0, 8.0));
    }

    #[test]
    fn transforms_rect() {
        let t = Transform::new_rotate(FRAC_PI_2);
        let r = t.transform_rect(&Rect::new(0.0, 0.0, 10.0, 5.0));
        assert!(r.approx_eq(&Rect::new(-5.0, 0.0, 0.0, 10.0)));
    }

    #[test]
    fn transformable_composes_scale_rotate_translate() {
        let mut tr = Transformable::new();
        assert!(tr.transform().is_identity());

        tr.set_origin(10.0, 10.0);
        tr.set_scale(2.0, 2.0);
        tr.set_rotation(FRAC_PI_2);
        tr.set_position(100.0, 0.0);

        let t = tr.transform();

        // The pivot stays put under scale and rotation, then gets translated.
        assert_point_eq(t.transform_point(10.0, 10.0), (110.0, 10.0));

        // (11, 10) -> scaled to (12, 10) -> rotated to (10, 12) -> translated
        assert_point_eq(t.transform_point(11.0, 10.0), (110.0, 12.0));
    }

    #[test]
    fn transformable_caches_until_an_input_changes() {
        let mut tr = Transformable::new();
        tr.set_position(1.0, 2.0);
        assert!(tr.is_dirty());

        let t = tr.transform();
        assert!(!tr.is_dirty());
        assert_eq!(t, tr.transform());

        tr.set_rotation(1.0);
        assert!(tr.is_dirty());
        assert_ne!(t, tr.transform());
    }
}
