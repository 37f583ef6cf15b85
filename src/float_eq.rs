//! Utilities to compare floating-point numbers.

use float_cmp::ApproxEq;

/// Tolerance for "near zero" decisions in the curve solvers.
pub const EPSILON: f64 = 1e-4;

/// Tolerance for deciding that two coordinates denote the same point.
pub const POINT_EPSILON: f64 = 1e-6;

/// Returns whether `val` lies strictly inside `(-EPSILON, EPSILON)`.
#[inline]
pub fn is_around_zero(val: f64) -> bool {
    val > -EPSILON && val < EPSILON
}

/// Checks whether two floating-point numbers are approximately equal for the purposes
/// of geometry.
///
/// Two numbers are "close enough to equal" if their absolute difference is smaller than
/// [`POINT_EPSILON`], or if they are within 1 unit-in-the-last-place (ULP) of each other,
/// for very large values.
pub trait ApproxEqKernel: ApproxEq {
    fn approx_eq_kernel(self, other: Self) -> bool;
}

impl ApproxEqKernel for f64 {
    fn approx_eq_kernel(self, other: f64) -> bool {
        self.approx_eq(other, (POINT_EPSILON, 1))
    }
}

/// Whether two points are approximately the same.
pub fn points_approx_eq(a: (f64, f64), b: (f64, f64)) -> bool {
    a.0.approx_eq_kernel(b.0) && a.1.approx_eq_kernel(b.1)
}

// Macro for usage in unit tests
#[doc(hidden)]
#[macro_export]
macro_rules! assert_approx_eq_kernel {
    ($left:expr, $right:expr) => {{
        match ($left, $right) {
            (l, r) => {
                if !l.approx_eq_kernel(r) {
                    panic!(
                        r#"assertion failed: `(left == right)`
  left: `{:?}`,
 right: `{:?}`"#,
                        l, r
                    )
                }
            }
        }
    }};
}
