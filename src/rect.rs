//! Types for rectangles.

#[allow(clippy::module_inception)]
mod rect {
    use core::ops::{Add, Sub};
    use float_cmp::approx_eq;

    // Use our own min() and max() that are acceptable for floating point

    fn min<T: PartialOrd>(x: T, y: T) -> T {
        if x <= y {
            x
        } else {
            y
        }
    }

    fn max<T: PartialOrd>(x: T, y: T) -> T {
        if x >= y {
            x
        } else {
            y
        }
    }

    #[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Rect<T> {
        pub x0: T,
        pub y0: T,
        pub x1: T,
        pub y1: T,
    }

    impl<T> Rect<T> {
        #[inline]
        pub fn new(x0: T, y0: T, x1: T, y1: T) -> Self {
            Self { x0, y0, x1, y1 }
        }
    }

    impl<T> Rect<T>
    where
        T: Copy + PartialOrd + PartialEq + Add<T, Output = T> + Sub<T, Output = T>,
    {
        /// Creates a rectangle from an origin and a size, normalizing negative sizes.
        #[inline]
        pub fn from_origin_size(x: T, y: T, w: T, h: T) -> Self {
            let (x0, x1) = (min(x, x + w), max(x, x + w));
            let (y0, y1) = (min(y, y + h), max(y, y + h));
            Self { x0, y0, x1, y1 }
        }

        #[inline]
        pub fn width(&self) -> T {
            self.x1 - self.x0
        }

        #[inline]
        pub fn height(&self) -> T {
            self.y1 - self.y0
        }

        /// Closed-interval containment test; points on the edges are inside.
        #[inline]
        pub fn contains(self, x: T, y: T) -> bool {
            x >= self.x0 && x <= self.x1 && y >= self.y0 && y <= self.y1
        }

        #[inline]
        pub fn union(&self, rect: &Self) -> Self {
            Self {
                x0: min(self.x0, rect.x0),
                y0: min(self.y0, rect.y0),
                x1: max(self.x1, rect.x1),
                y1: max(self.y1, rect.y1),
            }
        }

        /// Grows the rectangle to include the point `(x, y)`.
        #[inline]
        pub fn include_point(&self, x: T, y: T) -> Self {
            Self {
                x0: min(self.x0, x),
                y0: min(self.y0, y),
                x1: max(self.x1, x),
                y1: max(self.y1, y),
            }
        }

        /// Grows the rectangle by `amount` on each side.
        #[inline]
        pub fn outset(&self, amount: T) -> Self {
            Self {
                x0: self.x0 - amount,
                y0: self.y0 - amount,
                x1: self.x1 + amount,
                y1: self.y1 + amount,
            }
        }
    }

    impl Rect<f64> {
        pub fn approx_eq(&self, other: &Self) -> bool {
            approx_eq!(f64, self.x0, other.x0, epsilon = 0.0001)
                && approx_eq!(f64, self.y0, other.y0, epsilon = 0.0001)
                && approx_eq!(f64, self.x1, other.x1, epsilon = 0.0001)
                && approx_eq!(f64, self.y1, other.y1, epsilon = 0.0001)
        }
    }
}

pub type Rect = rect::Rect<f64>;
