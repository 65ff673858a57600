//! Rotation angles backed by rational numbers.
//!
//! Angles are measured in half-turns, i.e. an [`Angle`] holding *θ* represents
//! a rotation by *θ* × *π*. Rotation gates act with *θπ*/2 inside their sines,
//! cosines and exponentials, so a rotation has exact matrix elements whenever
//! 2*θ* is an integer.

use std::{ f64::consts::PI, fmt };
use num_rational::Rational64 as R64;
use num_traits::{ Signed, Zero };

/// A rotation angle *θ* × *π*.
///
/// ```
/// # use feynman_path::angle::Angle;
/// assert_eq!( Angle::new(1, 2).omega_power(), Some(1) );
/// assert_eq!( Angle::new(1, 1).omega_power(), Some(2) );
/// assert_eq!( Angle::new(1, 3).omega_power(), None    );
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Angle(pub R64);

impl Angle {
    /// Construct a new `Angle` as `(numer / denom) × π`.
    ///
    /// *Panics if `denom` is zero.*
    pub fn new(numer: i64, denom: i64) -> Self { Self(R64::new(numer, denom)) }

    /// Approximate a floating-point number of half-turns by a rational one.
    ///
    /// Returns `None` for non-finite input or values that cannot be
    /// approximated with 64-bit integers.
    pub fn from_half_turns(theta: f64) -> Option<Self> {
        if !theta.is_finite() { return None; }
        R64::approximate_float(theta).map(Self)
    }

    /// Return the zero angle.
    pub fn zero() -> Self { Self(R64::zero()) }

    /// Return the angle *π*.
    pub fn pi() -> Self { Self::new(1, 1) }

    /// Return the angle *π*/2.
    pub fn pi2() -> Self { Self::new(1, 2) }

    /// Return the angle *π*/4.
    pub fn pi4() -> Self { Self::new(1, 4) }

    /// Return the number of half-turns as a floating-point number.
    pub fn half_turns(self) -> f64 {
        *self.0.numer() as f64 / *self.0.denom() as f64
    }

    /// Convert to radians.
    pub fn radians(self) -> f64 { self.half_turns() * PI }

    /// If exp(*iθπ*/2) is an integer power of *ω* = exp(*iπ*/4), return that
    /// power reduced modulo 8.
    pub fn omega_power(self) -> Option<i64> {
        // 2θ is an integer only for denominators 1 and 2; reduce before
        // doubling so that large numerators can't overflow
        let numer = *self.0.numer();
        match *self.0.denom() {
            1 => Some(numer.rem_euclid(4) * 2),
            2 => Some(numer.rem_euclid(8)),
            _ => None,
        }
    }

    /// Return the equivalent angle in [0, 4) half-turns, over which every
    /// rotation matrix is periodic.
    ///
    /// Angles whose reduced form can't be held in 64 bits are returned
    /// unchanged.
    pub fn reduced(self) -> Self {
        let numer = *self.0.numer() as i128;
        let denom = *self.0.denom() as i128;
        let rem = numer.rem_euclid(4 * denom);
        i64::try_from(rem)
            .map(|rem| Self(R64::new(rem, denom as i64)))
            .unwrap_or(self)
    }

    /// Render as LaTeX, e.g. `\frac{3\pi}{4}`.
    pub fn latex(self) -> String {
        let numer = *self.0.numer();
        let denom = *self.0.denom();
        if numer == 0 { return "0".to_string(); }
        let sign = if self.0.is_negative() { "-" } else { "" };
        let m = numer.abs();
        let top = if m == 1 { "\\pi".to_string() } else { format!("{}\\pi", m) };
        if denom == 1 {
            format!("{}{}", sign, top)
        } else {
            format!("{}\\frac{{{}}}{{{}}}", sign, top, denom)
        }
    }
}

impl From<R64> for Angle {
    fn from(r: R64) -> Self { Self(r) }
}

impl std::ops::Neg for Angle {
    type Output = Angle;

    fn neg(self) -> Self::Output { Self(-self.0) }
}

impl fmt::Display for Angle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let numer = *self.0.numer();
        let denom = *self.0.denom();
        match (numer, denom) {
            (0, _) => write!(f, "0"),
            (1, 1) => write!(f, "π"),
            (-1, 1) => write!(f, "-π"),
            (n, 1) => write!(f, "{}π", n),
            (1, d) => write!(f, "π/{}", d),
            (-1, d) => write!(f, "-π/{}", d),
            (n, d) => write!(f, "{}π/{}", n, d),
        }
    }
}
