//! Bézier curve and elliptical arc mathematics.
//!
//! The scalar functions here work on one axis at a time: callers evaluate the x and y
//! components separately, passing the control values for that axis.  This keeps the root
//! finders usable both for hit-testing (where we solve `B(t) = value` along one axis) and
//! for extents computation (where we need the roots of the derivative).
//!
//! Arcs are converted to cubic curves with at most a quarter turn per curve.

use std::f64::consts::*;

use tinyvec::ArrayVec;

use crate::float_eq::is_around_zero;
use crate::util::clamp;

/// Parameter values in `[0, 1]` returned by the root finders.
pub type Roots = ArrayVec<[f64; 3]>;

const SQRT_3: f64 = 1.732_050_807_568_877_2;

/// Maximum Newton iterations used to polish the closed-form cubic roots.
const NEWTON_ITERATIONS: usize = 4;

#[inline]
fn cbrt(x: f64) -> f64 {
    if x < 0.0 {
        -(-x).powf(1.0 / 3.0)
    } else {
        x.powf(1.0 / 3.0)
    }
}

/// Closed-form roots at the ends of the unit range can land just outside it.
const UNIT_RANGE_SLACK: f64 = 1e-9;

#[inline]
fn push_if_in_unit_range(roots: &mut Roots, t: f64) {
    if (-UNIT_RANGE_SLACK..=1.0 + UNIT_RANGE_SLACK).contains(&t) {
        roots.push(clamp(t, 0.0, 1.0));
    }
}

/// Evaluates a cubic Bézier at `t` using the Bernstein form.
#[inline]
pub fn cubic_at(p0: f64, p1: f64, p2: f64, p3: f64, t: f64) -> f64 {
    let onet = 1.0 - t;
    onet * onet * (onet * p0 + 3.0 * t * p1) + t * t * (t * p3 + 3.0 * onet * p2)
}

#[inline]
pub fn cubic_derivative_at(p0: f64, p1: f64, p2: f64, p3: f64, t: f64) -> f64 {
    let onet = 1.0 - t;
    3.0 * (((p1 - p0) * onet + 2.0 * (p2 - p1) * t) * onet + (p3 - p2) * t * t)
}

/// Solves `cubic_at(p0, p1, p2, p3, t) == value` for `t`.
///
/// Only roots in `[0, 1]` are returned.  Uses Shengjin's formulas on the cubic's
/// coefficients; the closed-form results are then refined with a few Newton steps.
pub fn cubic_root_at(p0: f64, p1: f64, p2: f64, p3: f64, value: f64) -> Roots {
    let a = p3 + 3.0 * (p1 - p2) - p0;
    let b = 3.0 * (p2 - p1 * 2.0 + p0);
    let c = 3.0 * (p1 - p0);
    let d = p0 - value;

    let mut roots = Roots::new();

    if is_around_zero(a) {
        // Degenerates to a quadratic: b·t² + c·t + d = 0
        for t in solve_quadratic(b, c, d) {
            push_if_in_unit_range(&mut roots, t);
        }
        return polish_cubic_roots(roots, p0, p1, p2, p3, value);
    }

    let big_a = b * b - 3.0 * a * c;
    let big_b = b * c - 9.0 * a * d;
    let big_c = c * c - 3.0 * b * d;

    let mut candidates = Roots::new();

    if is_around_zero(big_a) && is_around_zero(big_b) {
        // Triple root
        candidates.push(-b / (3.0 * a));
    } else {
        let disc = big_b * big_b - 4.0 * big_a * big_c;

        if is_around_zero(disc) {
            // One simple root and one double root
            let k = big_b / big_a;
            candidates.push(-b / a + k);
            candidates.push(-k / 2.0);
        } else if disc > 0.0 {
            // One real root
            let disc_sqrt = disc.sqrt();
            let y1 = cbrt(big_a * b + 1.5 * a * (-big_b + disc_sqrt));
            let y2 = cbrt(big_a * b + 1.5 * a * (-big_b - disc_sqrt));
            candidates.push((-b - (y1 + y2)) / (3.0 * a));
        } else {
            // Three real roots
            let t = clamp(
                (2.0 * big_a * b - 3.0 * a * big_b) / (2.0 * (big_a * big_a * big_a).sqrt()),
                -1.0,
                1.0,
            );
            let theta = t.acos() / 3.0;
            let a_sqrt = big_a.sqrt();
            let (sin_theta, cos_theta) = theta.sin_cos();

            candidates.push((-b - 2.0 * a_sqrt * cos_theta) / (3.0 * a));
            candidates.push((-b + a_sqrt * (cos_theta + SQRT_3 * sin_theta)) / (3.0 * a));
            candidates.push((-b + a_sqrt * (cos_theta - SQRT_3 * sin_theta)) / (3.0 * a));
        }
    }

    for t in candidates {
        push_if_in_unit_range(&mut roots, t);
    }

    polish_cubic_roots(roots, p0, p1, p2, p3, value)
}

fn polish_cubic_roots(roots: Roots, p0: f64, p1: f64, p2: f64, p3: f64, value: f64) -> Roots {
    roots
        .into_iter()
        .map(|t| {
            let mut best = t;
            let mut best_err = (cubic_at(p0, p1, p2, p3, t) - value).abs();
            let mut t = t;

            for _ in 0..NEWTON_ITERATIONS {
                let dt = cubic_derivative_at(p0, p1, p2, p3, t);
                if dt == 0.0 {
                    break;
                }

                t = clamp(t - (cubic_at(p0, p1, p2, p3, t) - value) / dt, 0.0, 1.0);

                let err = (cubic_at(p0, p1, p2, p3, t) - value).abs();
                if err < best_err {
                    best = t;
                    best_err = err;
                }
            }

            best
        })
        .collect()
}

/// Real roots of `a·t² + b·t + c = 0`, unfiltered.
fn solve_quadratic(a: f64, b: f64, c: f64) -> ArrayVec<[f64; 2]> {
    let mut roots = ArrayVec::new();

    if is_around_zero(a) {
        if !is_around_zero(b) {
            roots.push(-c / b);
        }
    } else {
        let disc = b * b - 4.0 * a * c;

        if is_around_zero(disc) {
            roots.push(-b / (2.0 * a));
        } else if disc > 0.0 {
            let disc_sqrt = disc.sqrt();
            roots.push((-b + disc_sqrt) / (2.0 * a));
            roots.push((-b - disc_sqrt) / (2.0 * a));
        }
    }

    roots
}

/// Parameter values in `[0, 1]` where the derivative of a cubic is zero.
pub fn cubic_extrema(p0: f64, p1: f64, p2: f64, p3: f64) -> ArrayVec<[f64; 2]> {
    let b = 6.0 * p2 - 12.0 * p1 + 6.0 * p0;
    let a = 9.0 * p1 + 3.0 * p3 - 3.0 * p0 - 9.0 * p2;
    let c = 3.0 * p1 - 3.0 * p0;

    solve_quadratic(a, b, c)
        .into_iter()
        .filter(|t| (0.0..=1.0).contains(t))
        .collect()
}

/// Splits a cubic at `t` with de Casteljau's algorithm.
///
/// Returns the control values of the two halves; the last value of the first half is
/// the first value of the second one.
pub fn cubic_subdivide(p0: f64, p1: f64, p2: f64, p3: f64, t: f64) -> ([f64; 4], [f64; 4]) {
    let p01 = (p1 - p0) * t + p0;
    let p12 = (p2 - p1) * t + p1;
    let p23 = (p3 - p2) * t + p2;

    let p012 = (p12 - p01) * t + p01;
    let p123 = (p23 - p12) * t + p12;

    let p0123 = (p123 - p012) * t + p012;

    ([p0, p01, p012, p0123], [p0123, p123, p23, p3])
}

#[inline]
pub fn quadratic_at(p0: f64, p1: f64, p2: f64, t: f64) -> f64 {
    let onet = 1.0 - t;
    onet * (onet * p0 + 2.0 * t * p1) + t * t * p2
}

#[inline]
pub fn quadratic_derivative_at(p0: f64, p1: f64, p2: f64, t: f64) -> f64 {
    2.0 * ((1.0 - t) * (p1 - p0) + t * (p2 - p1))
}

/// Solves `quadratic_at(p0, p1, p2, t) == value` for `t`; only roots in `[0, 1]`.
pub fn quadratic_root_at(p0: f64, p1: f64, p2: f64, value: f64) -> Roots {
    let a = p0 - 2.0 * p1 + p2;
    let b = 2.0 * (p1 - p0);
    let c = p0 - value;

    let mut roots = Roots::new();
    for t in solve_quadratic(a, b, c) {
        push_if_in_unit_range(&mut roots, t);
    }
    roots
}

/// Parameter value in `[0, 1]` where the derivative of a quadratic is zero, if any.
///
/// A quadratic whose control value lies exactly between its endpoints is linear and has
/// no extremum.
pub fn quadratic_extremum(p0: f64, p1: f64, p2: f64) -> Option<f64> {
    let divider = p0 + p2 - 2.0 * p1;

    if divider == 0.0 {
        None
    } else {
        let t = (p0 - p1) / divider;
        if (0.0..=1.0).contains(&t) {
            Some(t)
        } else {
            None
        }
    }
}

/// Splits a quadratic at `t`.
pub fn quadratic_subdivide(p0: f64, p1: f64, p2: f64, t: f64) -> ([f64; 3], [f64; 3]) {
    let p01 = (p1 - p0) * t + p0;
    let p12 = (p2 - p1) * t + p1;
    let p012 = (p12 - p01) * t + p01;

    ([p0, p01, p012], [p012, p12, p2])
}

/// Cubic segment: two control points and an end point.
///
/// The start point is implicit; it is the current point of the path.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CubicBezierCurve {
    /// The (x, y) coordinates of the first control point.
    pub pt1: (f64, f64),
    /// The (x, y) coordinates of the second control point.
    pub pt2: (f64, f64),
    /// The (x, y) coordinates of the end point of this path segment.
    pub to: (f64, f64),
}

impl CubicBezierCurve {
    /// Degree elevation of a quadratic starting at `from`.
    pub fn from_quadratic(from: (f64, f64), ctrl: (f64, f64), to: (f64, f64)) -> Self {
        let (x0, y0) = from;
        let (x1, y1) = ctrl;
        let (x2, y2) = to;

        CubicBezierCurve {
            pt1: (2.0 / 3.0 * x1 + 1.0 / 3.0 * x0, 2.0 / 3.0 * y1 + 1.0 / 3.0 * y0),
            pt2: (2.0 / 3.0 * x1 + 1.0 / 3.0 * x2, 2.0 / 3.0 * y1 + 1.0 / 3.0 * y2),
            to,
        }
    }

    /// Straight line from `from` to `to`, with the control points on the endpoints.
    pub fn from_line(from: (f64, f64), to: (f64, f64)) -> Self {
        CubicBezierCurve {
            pt1: from,
            pt2: to,
            to,
        }
    }

    /// Evaluates the curve at `t`, given its start point.
    pub fn point_at(&self, from: (f64, f64), t: f64) -> (f64, f64) {
        (
            cubic_at(from.0, self.pt1.0, self.pt2.0, self.to.0, t),
            cubic_at(from.1, self.pt1.1, self.pt2.1, self.to.1, t),
        )
    }
}

/// Whether an arc's sweep should be >= 180 degrees, or smaller.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LargeArc(pub bool);

/// Angular direction in which an arc is drawn.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Sweep {
    Negative,
    Positive,
}

/// Conversion from endpoint parameterization to center parameterization.
///
/// SVG path data specifies elliptical arcs in terms of their endpoints, but
/// they are easier to process if they are converted to a center parameterization.
///
/// When attempting to compute the center parameterization of the arc,
/// out of range parameters may see an arc omitted or treated as a line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ArcParameterization {
    /// Center parameterization of the arc.
    CenterParameters(CenterArc),
    /// Treat the arc as a line to the end point.
    LineTo,
    /// Omit the arc.
    Omit,
}

/// Elliptical arc in terms of its endpoints, as written in SVG path data.
#[derive(Debug, Clone, PartialEq)]
pub struct EllipticalArc {
    /// The (x-axis, y-axis) radii for the ellipse.
    pub r: (f64, f64),
    /// The rotation angle in degrees for the ellipse's x-axis
    /// relative to the x-axis of the user coordinate system.
    pub x_axis_rotation: f64,
    /// Flag indicating whether the arc sweep should be
    /// greater than or equal to 180 degrees, or smaller than 180 degrees.
    pub large_arc: LargeArc,
    /// Flag indicating the angular direction in which the arc is drawn.
    pub sweep: Sweep,
    /// The (x, y) coordinates for the start point of this path segment.
    pub from: (f64, f64),
    /// The (x, y) coordinates for the end point of this path segment.
    pub to: (f64, f64),
}

impl EllipticalArc {
    /// Calculates a center parameterization from the endpoint parameterization.
    ///
    /// Radii may be adjusted if there is no solution.
    ///
    /// See section [B.2.4. Conversion from endpoint to center
    /// parameterization](https://www.w3.org/TR/SVG2/implnote.html#ArcConversionEndpointToCenter)
    pub fn center_parameterization(&self) -> ArcParameterization {
        let Self {
            r: (mut rx, mut ry),
            x_axis_rotation,
            large_arc,
            sweep,
            from: (x1, y1),
            to: (x2, y2),
        } = *self;

        if ![rx, ry, x_axis_rotation, x1, y1, x2, y2]
            .iter()
            .all(|v| v.is_finite())
        {
            return ArcParameterization::Omit;
        }

        // If the endpoints are identical, the arc is omitted entirely.
        if x1 == x2 && y1 == y2 {
            return ArcParameterization::Omit;
        }

        // Ensure radii are non-zero.
        // Otherwise this arc is treated as a line segment joining the end points.
        //
        // A bit further down we divide by the square of the radii.
        // Check that we won't divide by zero.
        if rx * rx < f64::EPSILON || ry * ry < f64::EPSILON {
            return ArcParameterization::LineTo;
        }

        let is_large_arc = large_arc.0;
        let is_positive_sweep = sweep == Sweep::Positive;

        let phi = x_axis_rotation.to_radians();
        let (sin_phi, cos_phi) = phi.sin_cos();

        // Ensure radii are positive.
        rx = rx.abs();
        ry = ry.abs();

        // The equations simplify after a translation which places
        // the origin at the midpoint of the line joining (x1, y1) to (x2, y2),
        // followed by a rotation to line up the coordinate axes
        // with the axes of the ellipse.
        // All transformed coordinates will be written with primes.
        //
        // Compute (x1', y1').
        let mid_x = (x1 - x2) / 2.0;
        let mid_y = (y1 - y2) / 2.0;
        let x1_ = cos_phi * mid_x + sin_phi * mid_y;
        let y1_ = -sin_phi * mid_x + cos_phi * mid_y;

        // Ensure radii are large enough.
        let lambda = (x1_ / rx).powi(2) + (y1_ / ry).powi(2);
        if lambda > 1.0 {
            // If not, scale up the ellipse uniformly
            // until there is exactly one solution.
            rx *= lambda.sqrt();
            ry *= lambda.sqrt();
        }

        // Compute the transformed center (cx', cy').
        let d = (rx * y1_).powi(2) + (ry * x1_).powi(2);
        if d == 0.0 {
            return ArcParameterization::Omit;
        }
        let k = {
            // After scaling the radii the radicand is zero in exact arithmetic, but it
            // can come out slightly negative.
            let mut k = ((rx * ry).powi(2) / d - 1.0).max(0.0).sqrt();
            if is_positive_sweep == is_large_arc {
                k = -k;
            }
            k
        };
        let cx_ = k * rx * y1_ / ry;
        let cy_ = -k * ry * x1_ / rx;

        // Compute the center (cx, cy).
        let cx = cos_phi * cx_ - sin_phi * cy_ + (x1 + x2) / 2.0;
        let cy = sin_phi * cx_ + cos_phi * cy_ + (y1 + y2) / 2.0;

        // Compute the start angle θ1.
        let ux = (x1_ - cx_) / rx;
        let uy = (y1_ - cy_) / ry;
        let u_len = (ux * ux + uy * uy).sqrt();
        if u_len == 0.0 {
            return ArcParameterization::Omit;
        }
        let cos_theta1 = clamp(ux / u_len, -1.0, 1.0);
        let theta1 = {
            let mut theta1 = cos_theta1.acos();
            if uy < 0.0 {
                theta1 = -theta1;
            }
            theta1
        };

        // Compute the total delta angle Δθ.
        let vx = (-x1_ - cx_) / rx;
        let vy = (-y1_ - cy_) / ry;
        let v_len = (vx * vx + vy * vy).sqrt();
        if v_len == 0.0 {
            return ArcParameterization::Omit;
        }
        let dp_uv = ux * vx + uy * vy;
        let cos_delta_theta = clamp(dp_uv / (u_len * v_len), -1.0, 1.0);
        let delta_theta = {
            let mut delta_theta = cos_delta_theta.acos();
            if ux * vy - uy * vx < 0.0 {
                delta_theta = -delta_theta;
            }
            if is_positive_sweep && delta_theta < 0.0 {
                delta_theta += PI * 2.0;
            } else if !is_positive_sweep && delta_theta > 0.0 {
                delta_theta -= PI * 2.0;
            }
            delta_theta
        };

        let arc = CenterArc {
            center: (cx, cy),
            radii: (rx, ry),
            start: theta1,
            delta: delta_theta,
            rotation: phi,
        };

        if arc.is_finite() {
            ArcParameterization::CenterParameters(arc)
        } else {
            ArcParameterization::Omit
        }
    }
}

/// Elliptical arc in center parameterization.
///
/// Angles are in radians.  `delta` is signed: positive values go in the direction of
/// increasing angles, which is clockwise on screen when the y axis points down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CenterArc {
    pub center: (f64, f64),
    pub radii: (f64, f64),
    pub start: f64,
    pub delta: f64,
    /// Rotation of the ellipse's x axis.
    pub rotation: f64,
}

impl CenterArc {
    pub fn is_finite(&self) -> bool {
        [
            self.center.0,
            self.center.1,
            self.radii.0,
            self.radii.1,
            self.start,
            self.delta,
            self.rotation,
        ]
        .iter()
        .all(|v| v.is_finite())
    }

    /// Point on the ellipse at parametric angle `theta`.
    pub fn point_at(&self, theta: f64) -> (f64, f64) {
        let (cx, cy) = self.center;
        let (rx, ry) = self.radii;
        let (sin_phi, cos_phi) = self.rotation.sin_cos();
        let (sin_th, cos_th) = theta.sin_cos();

        let x = rx * cos_th;
        let y = ry * sin_th;

        (cx + cos_phi * x - sin_phi * y, cy + sin_phi * x + cos_phi * y)
    }

    pub fn start_point(&self) -> (f64, f64) {
        self.point_at(self.start)
    }

    pub fn end_point(&self) -> (f64, f64) {
        self.point_at(self.start + self.delta)
    }

    /// Approximates the arc with cubic curves spanning at most a quarter turn each.
    ///
    /// The first curve starts at [`CenterArc::start_point`].
    pub fn to_cubics(&self) -> Vec<CubicBezierCurve> {
        if !self.is_finite() {
            return Vec::new();
        }

        let n_segs = (self.delta.abs() / (FRAC_PI_2 + 0.001)).ceil() as usize;
        let d_theta = self.delta / n_segs as f64;

        (0..n_segs)
            .map(|i| {
                let theta = self.start + i as f64 * d_theta;
                arc_segment(
                    self.center,
                    self.radii,
                    self.rotation,
                    theta,
                    theta + d_theta,
                )
            })
            .collect()
    }
}

/// Turns an arc segment into a cubic bezier curve.
///
/// Takes the center, the radii and the x-axis rotation (in radians) of the ellipse,
/// the angles of the start and end points, and returns cubic bezier curve parameters.
/// The control handles have length `4/3·tan(span/4)` times the radius.
pub fn arc_segment(
    c: (f64, f64),
    r: (f64, f64),
    rotation: f64,
    th0: f64,
    th1: f64,
) -> CubicBezierCurve {
    let (cx, cy) = c;
    let (rx, ry) = r;
    let (sin_phi, cos_phi) = rotation.sin_cos();
    let (sin_th0, cos_th0) = th0.sin_cos();
    let (sin_th1, cos_th1) = th1.sin_cos();

    let th_half = 0.5 * (th1 - th0);
    let t = (8.0 / 3.0) * (th_half * 0.5).sin().powi(2) / th_half.sin();
    let x1 = rx * (cos_th0 - t * sin_th0);
    let y1 = ry * (sin_th0 + t * cos_th0);
    let x3 = rx * cos_th1;
    let y3 = ry * sin_th1;
    let x2 = x3 + rx * (t * sin_th1);
    let y2 = y3 + ry * (-t * cos_th1);

    CubicBezierCurve {
        pt1: (
            cx + cos_phi * x1 - sin_phi * y1,
            cy + sin_phi * x1 + cos_phi * y1,
        ),
        pt2: (
            cx + cos_phi * x2 - sin_phi * y2,
            cy + sin_phi * x2 + cos_phi * y2,
        ),
        to: (
            cx + cos_phi * x3 - sin_phi * y3,
            cy + sin_phi * x3 + cos_phi * y3,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    fn assert_point(p: (f64, f64), expected: (f64, f64)) {
        assert!(
            approx_eq!(f64, p.0, expected.0, epsilon = 1e-6)
                && approx_eq!(f64, p.1, expected.1, epsilon = 1e-6),
            "{p:?} != {expected:?}"
        );
    }

    #[test]
    fn cubic_endpoints() {
        assert_eq!(cubic_at(1.0, 5.0, -3.0, 7.0, 0.0), 1.0);
        assert_eq!(cubic_at(1.0, 5.0, -3.0, 7.0, 1.0), 7.0);
        assert_eq!(quadratic_at(2.0, 8.0, 4.0, 0.0), 2.0);
        assert_eq!(quadratic_at(2.0, 8.0, 4.0, 1.0), 4.0);
        assert!(approx_eq!(f64, quadratic_at(0.0, 2.0, 0.0, 0.5), 1.0));
    }

    #[test]
    fn straight_cubic_has_single_root() {
        let roots = cubic_root_at(0.0, 1.0, 2.0, 3.0, 1.5);
        assert_eq!(roots.len(), 1);
        assert!(approx_eq!(f64, roots[0], 0.5, epsilon = 1e-9));
    }

    #[test]
    fn s_curve_has_three_roots() {
        let mut roots = cubic_root_at(0.0, 10.0, -10.0, 0.0, 0.0);
        roots.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(roots.len(), 3);
        assert!(approx_eq!(f64, roots[0], 0.0, epsilon = 1e-9));
        assert!(approx_eq!(f64, roots[1], 0.5, epsilon = 1e-9));
        assert!(approx_eq!(f64, roots[2], 1.0, epsilon = 1e-9));
    }

    #[test]
    fn roots_outside_unit_range_are_dropped() {
        assert!(cubic_root_at(0.0, 1.0, 2.0, 3.0, 5.0).is_empty());
        assert!(quadratic_root_at(0.0, 1.0, 2.0, -1.0).is_empty());
    }

    #[test]
    fn quadratic_roots() {
        let mut roots = quadratic_root_at(0.0, 10.0, 0.0, 3.75);
        roots.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(roots.len(), 2);
        assert!(approx_eq!(f64, roots[0], 0.25, epsilon = 1e-9));
        assert!(approx_eq!(f64, roots[1], 0.75, epsilon = 1e-9));
    }

    #[test]
    fn extrema() {
        assert_eq!(quadratic_extremum(0.0, 10.0, 0.0), Some(0.5));
        assert_eq!(quadratic_extremum(0.0, 5.0, 10.0), None);
        assert_eq!(quadratic_extremum(0.0, 5.0, 12.0), None);

        let ext = cubic_extrema(0.0, 10.0, 10.0, 0.0);
        assert_eq!(ext.len(), 1);
        assert!(approx_eq!(f64, ext[0], 0.5, epsilon = 1e-9));

        assert!(cubic_extrema(0.0, 1.0, 2.0, 3.0).is_empty());
    }

    #[test]
    fn subdivision_is_geometrically_equivalent() {
        let (p0, p1, p2, p3) = (0.0, 30.0, -20.0, 10.0);
        let (left, right) = cubic_subdivide(p0, p1, p2, p3, 0.3);

        assert_eq!(left[0], p0);
        assert_eq!(right[3], p3);
        assert_eq!(left[3], right[0]);

        for i in 0..=10 {
            let s = f64::from(i) / 10.0;
            let on_left = cubic_at(left[0], left[1], left[2], left[3], s);
            assert!(approx_eq!(f64, on_left, cubic_at(p0, p1, p2, p3, 0.3 * s), epsilon = 1e-9));

            let on_right = cubic_at(right[0], right[1], right[2], right[3], s);
            assert!(approx_eq!(
                f64,
                on_right,
                cubic_at(p0, p1, p2, p3, 0.3 + 0.7 * s),
                epsilon = 1e-9
            ));
        }

        let (left, right) = quadratic_subdivide(0.0, 10.0, 0.0, 0.5);
        assert_eq!(left, [0.0, 5.0, 5.0]);
        assert_eq!(right, [5.0, 5.0, 0.0]);
    }

    #[test]
    fn quadratic_elevation_matches_quadratic() {
        let c = CubicBezierCurve::from_quadratic((0.0, 0.0), (5.0, 10.0), (10.0, 0.0));

        for i in 0..=8 {
            let t = f64::from(i) / 8.0;
            let p = c.point_at((0.0, 0.0), t);
            assert_point(
                p,
                (quadratic_at(0.0, 5.0, 10.0, t), quadratic_at(0.0, 10.0, 0.0, t)),
            );
        }
    }

    #[test]
    fn radii_too_small_are_scaled_up() {
        let arc = EllipticalArc {
            r: (1.0, 1.0),
            x_axis_rotation: 0.0,
            large_arc: LargeArc(false),
            sweep: Sweep::Positive,
            from: (0.0, 0.0),
            to: (10.0, 0.0),
        };

        match arc.center_parameterization() {
            ArcParameterization::CenterParameters(c) => {
                assert_point(c.center, (5.0, 0.0));
                assert!(approx_eq!(f64, c.radii.0, 5.0, epsilon = 1e-9));
                assert!(approx_eq!(f64, c.delta.abs(), PI, epsilon = 1e-9));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn degenerate_arcs() {
        let mut arc = EllipticalArc {
            r: (0.0, 5.0),
            x_axis_rotation: 0.0,
            large_arc: LargeArc(false),
            sweep: Sweep::Positive,
            from: (0.0, 0.0),
            to: (10.0, 0.0),
        };
        assert_eq!(arc.center_parameterization(), ArcParameterization::LineTo);

        arc.r = (5.0, 5.0);
        arc.to = arc.from;
        assert_eq!(arc.center_parameterization(), ArcParameterization::Omit);

        arc.to = (f64::NAN, 0.0);
        assert_eq!(arc.center_parameterization(), ArcParameterization::Omit);
    }

    #[test]
    fn endpoint_center_round_trip() {
        for &(large_arc, sweep) in &[
            (false, Sweep::Positive),
            (false, Sweep::Negative),
            (true, Sweep::Positive),
            (true, Sweep::Negative),
        ] {
            for &rotation in &[0.0, 30.0, -75.0] {
                let arc = EllipticalArc {
                    r: (60.0, 40.0),
                    x_axis_rotation: rotation,
                    large_arc: LargeArc(large_arc),
                    sweep,
                    from: (10.0, 20.0),
                    to: (50.0, 35.0),
                };

                match arc.center_parameterization() {
                    ArcParameterization::CenterParameters(c) => {
                        assert_point(c.start_point(), arc.from);
                        assert_point(c.end_point(), arc.to);
                        assert_eq!(c.delta.abs() > PI, large_arc);
                        assert_eq!(c.delta > 0.0, sweep == Sweep::Positive);
                    }
                    other => panic!("unexpected {other:?}"),
                }
            }
        }
    }

    #[test]
    fn arc_to_cubics_splits_in_quarter_turns() {
        let arc = CenterArc {
            center: (0.0, 0.0),
            radii: (10.0, 10.0),
            start: 0.0,
            delta: 2.0 * PI,
            rotation: 0.0,
        };

        let curves = arc.to_cubics();
        assert_eq!(curves.len(), 4);

        // Handle length of a quarter circle
        let k = 4.0 / 3.0 * (FRAC_PI_2 / 4.0).tan() * 10.0;
        assert_point(curves[0].pt1, (10.0, k));
        assert_point(curves[0].pt2, (k, 10.0));
        assert_point(curves[0].to, (0.0, 10.0));
        assert_point(curves[3].to, (10.0, 0.0));

        let mut from = arc.start_point();
        for c in &curves {
            let mid = c.point_at(from, 0.5);
            assert!(approx_eq!(f64, mid.0.hypot(mid.1), 10.0, epsilon = 0.01));
            from = c.to;
        }

        let small = CenterArc {
            delta: -0.5,
            ..arc
        };
        assert_eq!(small.to_cubics().len(), 1);
        assert_point(small.to_cubics()[0].to, small.end_point());

        let empty = CenterArc { delta: 0.0, ..arc };
        assert!(empty.to_cubics().is_empty());
    }

    proptest! {
        #[test]
        fn cubic_roots_are_in_range_and_solve_the_curve(
            p0 in -100.0..100.0f64,
            p1 in -100.0..100.0f64,
            p2 in -100.0..100.0f64,
            p3 in -100.0..100.0f64,
            value in -100.0..100.0f64,
        ) {
            for t in cubic_root_at(p0, p1, p2, p3, value) {
                prop_assert!((0.0..=1.0).contains(&t));
                let err = (cubic_at(p0, p1, p2, p3, t) - value).abs();
                prop_assert!(err < 1e-3, "t = {}, error = {}", t, err);
            }
        }

        #[test]
        fn cubic_endpoints_are_exact(
            p0 in -1000.0..1000.0f64,
            p1 in -1000.0..1000.0f64,
            p2 in -1000.0..1000.0f64,
            p3 in -1000.0..1000.0f64,
        ) {
            prop_assert_eq!(cubic_at(p0, p1, p2, p3, 0.0), p0);
            prop_assert_eq!(cubic_at(p0, p1, p2, p3, 1.0), p3);
        }

        #[test]
        fn quadratic_roots_solve_the_curve(
            p0 in -100.0..100.0f64,
            p1 in -100.0..100.0f64,
            p2 in -100.0..100.0f64,
            value in -100.0..100.0f64,
        ) {
            for t in quadratic_root_at(p0, p1, p2, value) {
                prop_assert!((0.0..=1.0).contains(&t));
                prop_assert!((quadratic_at(p0, p1, p2, t) - value).abs() < 1e-3);
            }
        }
    }
}
