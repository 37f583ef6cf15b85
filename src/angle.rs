//! Angles normalized to `[0, 2π)`.

use std::f64::consts::*;

use float_cmp::approx_eq;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Angle(f64);

impl Angle {
    pub fn new(rad: f64) -> Angle {
        Angle(Angle::normalize(rad))
    }

    pub fn from_degrees(deg: f64) -> Angle {
        Angle(Angle::normalize(deg.to_radians()))
    }

    /// Angle of the vector `(vx, vy)` measured from the positive x axis.
    ///
    /// With the y axis pointing down, positive angles go clockwise on screen.
    pub fn from_vector(vx: f64, vy: f64) -> Angle {
        let rad = vy.atan2(vx);

        if rad.is_nan() {
            Angle(0.0)
        } else {
            Angle(Angle::normalize(rad))
        }
    }

    pub fn radians(self) -> f64 {
        self.0
    }

    pub fn degrees(self) -> f64 {
        self.0.to_degrees()
    }

    /// Returns how far `self` is from `start`, going in the positive direction.
    ///
    /// The result is in `[0, 2π)`.
    pub fn positive_distance_from(self, start: Angle) -> f64 {
        Angle::normalize(self.0 - start.0)
    }

    // Normalizes an angle to [0.0, 2*PI)
    fn normalize(rad: f64) -> f64 {
        let res = rad % (PI * 2.0);
        if approx_eq!(f64, res, 0.0) {
            0.0
        } else if res < 0.0 {
            let res = res + PI * 2.0;
            // -tiny + 2π rounds to exactly 2π
            if res >= PI * 2.0 {
                0.0
            } else {
                res
            }
        } else {
            res
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes() {
        assert_eq!(Angle::new(0.0).radians(), 0.0);
        assert_eq!(Angle::new(PI * 2.0).radians(), 0.0);
        assert!(approx_eq!(f64, Angle::new(-FRAC_PI_2).radians(), PI * 1.5, epsilon = 1e-9));
        assert!(approx_eq!(f64, Angle::new(PI * 5.0).radians(), PI, epsilon = 1e-9));
        assert!(approx_eq!(f64, Angle::from_degrees(450.0).degrees(), 90.0, epsilon = 1e-9));
    }

    #[test]
    fn from_vector() {
        assert!(approx_eq!(f64, Angle::from_vector(1.0, 0.0).degrees(), 0.0, epsilon = 1e-9));
        assert!(approx_eq!(f64, Angle::from_vector(0.0, 1.0).degrees(), 90.0, epsilon = 1e-9));
        assert!(approx_eq!(f64, Angle::from_vector(-1.0, 0.0).degrees(), 180.0, epsilon = 1e-9));
        assert!(approx_eq!(f64, Angle::from_vector(5.0, -5.0).degrees(), 315.0, epsilon = 1e-9));
        assert_eq!(Angle::from_vector(f64::NAN, 0.0).radians(), 0.0);
    }

    #[test]
    fn positive_distance() {
        let start = Angle::from_degrees(350.0);
        let a = Angle::from_degrees(10.0);
        assert!(approx_eq!(f64, a.positive_distance_from(start).to_degrees(), 20.0, epsilon = 1e-9));
        assert!(approx_eq!(
            f64,
            start.positive_distance_from(a).to_degrees(),
            340.0,
            epsilon = 1e-9
        ));
    }
}
