//! Probability amplitudes that are exact where possible and numeric where
//! necessary.
//!
//! An [`Amplitude`] is either an element of the exact ring
//! [`DOmega`][crate::ring::DOmega] or a floating-point complex number. Exact
//! arithmetic is preferred since it keeps phases and magnitudes free of
//! rounding error (and labels readable); values fall back to numeric form when
//! an operand is already numeric, when an exact operation would overflow, or
//! when the size of the exact representation exceeds
//! [`MAX_EXACT_COMPLEXITY`].

use std::{ fmt, ops::{ Add, AddAssign, Mul, MulAssign, Neg, Sub } };
use num_complex::Complex64 as C64;
use num_traits::{ One, Zero };
use crate::ring::{ format_complex, DOmega, Notation };

/// Amplitudes with magnitude below this value are treated as zero.
pub const NEGLIGIBLE: f64 = 1e-8;

/// Tolerance for comparisons involving numeric amplitudes.
pub const EPSILON: f64 = 1e-12;

/// Largest [`DOmega::complexity`] kept in exact form.
pub const MAX_EXACT_COMPLEXITY: u32 = 40;

/// A complex probability amplitude.
#[derive(Copy, Clone, Debug)]
pub enum Amplitude {
    /// Exact closed form.
    Exact(DOmega),
    /// Numeric approximation.
    Approx(C64),
}

impl Amplitude {
    /// The amplitude 0.
    pub const ZERO: Self = Self::Exact(DOmega::ZERO);

    /// The amplitude 1.
    pub const ONE: Self = Self::Exact(DOmega::ONE);

    /// The amplitude 1/√2.
    pub const FRAC_1_SQRT_2: Self = Self::Exact(DOmega::FRAC_1_SQRT_2);

    /// The amplitude *i*.
    pub const I: Self = Self::Exact(DOmega::I);

    // keep an exact result only if it exists and is small enough
    fn exact_or(z: Option<DOmega>, fallback: impl FnOnce() -> C64) -> Self {
        match z {
            Some(z) if z.complexity() <= MAX_EXACT_COMPLEXITY => Self::Exact(z),
            _ => Self::Approx(fallback()),
        }
    }

    /// Return `true` if `self` is held in exact form.
    pub fn is_exact(&self) -> bool { self.as_exact().is_some() }

    /// Return the exact value, if there is one.
    pub fn as_exact(&self) -> Option<DOmega> {
        match self {
            Self::Exact(z) => Some(*z),
            Self::Approx(_) => None,
        }
    }

    /// Convert to a floating-point complex number.
    pub fn to_c64(&self) -> C64 {
        match self {
            Self::Exact(z) => (*z).into(),
            Self::Approx(z) => *z,
        }
    }

    /// Return a canonical form of `self`.
    ///
    /// Exact values are reduced, and demoted to numeric form if they have grown
    /// too complex. Numeric values have components smaller than 1e-15 in
    /// magnitude set to zero.
    pub fn simplify(self) -> Self {
        match self {
            Self::Exact(z) => Self::exact_or(Some(z.reduced()), || z.into()),
            Self::Approx(z) => {
                let snap = |x: f64| if x.abs() < 1e-15 { 0.0 } else { x };
                Self::Approx(C64::new(snap(z.re), snap(z.im)))
            },
        }
    }

    /// Squared modulus |*a*|².
    pub fn norm_sqr(&self) -> f64 {
        match self {
            Self::Exact(z) => match z.norm_sqr() {
                Some(n) => n.to_f64(),
                None => C64::from(*z).norm_sqr(),
            },
            Self::Approx(z) => z.norm_sqr(),
        }
    }

    /// Modulus |*a*|.
    ///
    /// Exact values use their exact squared modulus; numeric values use the
    /// ordinary complex norm.
    pub fn magnitude(&self) -> f64 { self.norm_sqr().sqrt() }

    /// Return `true` if the magnitude of `self` is below [`NEGLIGIBLE`].
    pub fn is_negligible(&self) -> bool {
        match self {
            Self::Exact(z) if z.is_zero() => true,
            _ => self.magnitude() < NEGLIGIBLE,
        }
    }

    /// Argument of `self` in radians, in (–π, π]. Zero has phase 0.
    pub fn phase(&self) -> f64 {
        if self.is_negligible() { return 0.0; }
        self.to_c64().arg()
    }

    /// Return `true` if `self` is a positive real number.
    pub fn is_real_positive(&self) -> bool {
        match self {
            Self::Exact(z) => match z.parts() {
                Some((re, im)) => im.is_zero() && re.signum() > 0,
                None => {
                    let c = C64::from(*z);
                    c.im.abs() < EPSILON && c.re > 0.0
                },
            },
            Self::Approx(c) => c.im.abs() < EPSILON && c.re > 0.0,
        }
    }

    /// Complex conjugate.
    pub fn conj(self) -> Self {
        match self {
            Self::Exact(z) => Self::Exact(z.conj()),
            Self::Approx(z) => Self::Approx(z.conj()),
        }
    }

    fn format(&self, notation: Notation) -> (String, bool) {
        match self {
            Self::Exact(z) => match z.parts() {
                Some((re, im)) => {
                    let compound
                        = (!re.is_zero() && !im.is_zero())
                        || re.is_compound()
                        || im.is_compound();
                    (format_complex(re, im, notation), compound)
                },
                None => Self::Approx((*z).into()).format(notation),
            },
            Self::Approx(z) => {
                let fmt = |x: f64| {
                    let s = format!("{:.3}", x);
                    let s = s.trim_end_matches('0').trim_end_matches('.');
                    if s == "-0" { "0".to_string() } else { s.to_string() }
                };
                let re = fmt(z.re);
                let im = fmt(z.im.abs());
                match (re.as_str(), im.as_str()) {
                    (_, "0") => (re, false),
                    ("0", _) if z.im < 0.0 => (format!("-{}i", im), false),
                    ("0", _) => (format!("{}i", im), false),
                    _ if z.im < 0.0 => (format!("{} - {}i", re, im), true),
                    _ => (format!("{} + {}i", re, im), true),
                }
            },
        }
    }

    /// Render as a LaTeX math-mode expression (without surrounding `$`).
    pub fn latex(&self) -> String { self.format(Notation::Latex).0 }

    /// Render as a LaTeX coefficient to be followed by another factor,
    /// parenthesizing sums.
    pub fn latex_factor(&self) -> String {
        let (s, compound) = self.format(Notation::Latex);
        if compound { format!("({})", s) } else { s }
    }
}

impl Default for Amplitude {
    fn default() -> Self { Self::ZERO }
}

impl From<DOmega> for Amplitude {
    fn from(z: DOmega) -> Self { Self::Exact(z) }
}

impl From<C64> for Amplitude {
    fn from(z: C64) -> Self { Self::Approx(z) }
}

impl From<f64> for Amplitude {
    fn from(x: f64) -> Self { Self::Approx(C64::new(x, 0.0)) }
}

impl From<i64> for Amplitude {
    fn from(n: i64) -> Self { Self::Exact(DOmega::from_int(n)) }
}

impl PartialEq for Amplitude {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Exact(l), Self::Exact(r)) => l == r,
            (l, r) => (l.to_c64() - r.to_c64()).norm() < EPSILON,
        }
    }
}

impl fmt::Display for Amplitude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(Notation::Plain).0)
    }
}

impl Neg for Amplitude {
    type Output = Self;

    fn neg(self) -> Self {
        match self {
            Self::Exact(z) => Self::exact_or(z.checked_neg(), || -C64::from(z)),
            Self::Approx(z) => Self::Approx(-z),
        }
    }
}

impl Add for Amplitude {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        match (self, rhs) {
            (Self::Exact(l), Self::Exact(r))
                => Self::exact_or(l.checked_add(r), || C64::from(l) + C64::from(r)),
            (l, r) => Self::Approx(l.to_c64() + r.to_c64()),
        }
    }
}

impl AddAssign for Amplitude {
    fn add_assign(&mut self, rhs: Self) { *self = *self + rhs; }
}

impl Sub for Amplitude {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        match (self, rhs) {
            (Self::Exact(l), Self::Exact(r))
                => Self::exact_or(l.checked_sub(r), || C64::from(l) - C64::from(r)),
            (l, r) => Self::Approx(l.to_c64() - r.to_c64()),
        }
    }
}

impl Mul for Amplitude {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        match (self, rhs) {
            (Self::Exact(l), Self::Exact(r))
                => Self::exact_or(l.checked_mul(r), || C64::from(l) * C64::from(r)),
            (l, r) => Self::Approx(l.to_c64() * r.to_c64()),
        }
    }
}

impl MulAssign for Amplitude {
    fn mul_assign(&mut self, rhs: Self) { *self = *self * rhs; }
}

impl Zero for Amplitude {
    fn zero() -> Self { Self::ZERO }

    fn is_zero(&self) -> bool { self.is_negligible() }
}

impl One for Amplitude {
    fn one() -> Self { Self::ONE }
}

impl std::iter::Sum for Amplitude {
    fn sum<I>(iter: I) -> Self
    where I: Iterator<Item = Self>
    {
        iter.fold(Self::ZERO, |acc, a| acc + a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::c;

    #[test]
    fn exact_arithmetic() {
        let h = Amplitude::FRAC_1_SQRT_2;
        assert_eq!(h * h + h * h, Amplitude::ONE);
        assert!((h * h - h * h).is_exact());
        assert!((h - h).is_negligible());
        assert_eq!(Amplitude::I * Amplitude::I, Amplitude::from(-1));
        assert_eq!(-Amplitude::ONE, Amplitude::from(-1));
        assert_eq!((h * h).as_exact(), Some(DOmega::ONE.half()));
    }

    #[test]
    fn mixed_arithmetic_is_numeric() {
        let a = Amplitude::FRAC_1_SQRT_2 * Amplitude::from(c!(2.0_f64.sqrt()));
        assert!(!a.is_exact());
        assert_eq!(a.as_exact(), None);
        assert_eq!(a, Amplitude::ONE);
    }

    #[test]
    fn complexity_fallback() {
        // (1 + 1/√2)^n grows its coefficients without bound
        let base = Amplitude::ONE + Amplitude::FRAC_1_SQRT_2;
        let mut a = Amplitude::ONE;
        let mut expected = C64::new(1.0, 0.0);
        for _ in 0..40 {
            a *= base;
            expected *= base.to_c64();
        }
        assert!(!a.is_exact());
        assert!((a.to_c64() - expected).norm() / expected.norm() < 1e-9);
    }

    #[test]
    fn magnitude_paths() {
        let exact = Amplitude::FRAC_1_SQRT_2;
        let approx = Amplitude::from(c!(0.0, std::f64::consts::FRAC_1_SQRT_2));
        assert!((exact.magnitude() - approx.magnitude()).abs() < 1e-15);
        assert!((exact.norm_sqr() - 0.5).abs() < 1e-15);
        assert!(Amplitude::ZERO.is_negligible());
        assert!(Amplitude::from(1e-9).is_negligible());
        assert!(!Amplitude::from(1e-7).is_negligible());
    }

    #[test]
    fn phase() {
        use std::f64::consts::{ FRAC_PI_2, FRAC_PI_4, PI };
        assert_eq!(Amplitude::ONE.phase(), 0.0);
        assert_eq!(Amplitude::FRAC_1_SQRT_2.phase(), 0.0);
        assert!((Amplitude::I.phase() - FRAC_PI_2).abs() < 1e-15);
        assert!((Amplitude::from(-1).phase() - PI).abs() < 1e-15);
        assert!((Amplitude::Exact(DOmega::OMEGA).phase() - FRAC_PI_4).abs() < 1e-15);
        assert_eq!(Amplitude::ZERO.phase(), 0.0);
    }

    #[test]
    fn real_positive() {
        assert!(Amplitude::ONE.is_real_positive());
        assert!(Amplitude::FRAC_1_SQRT_2.is_real_positive());
        assert!(!(-Amplitude::FRAC_1_SQRT_2).is_real_positive());
        assert!(!Amplitude::I.is_real_positive());
        assert!(Amplitude::from(0.3).is_real_positive());
        let z = Amplitude::ONE - Amplitude::FRAC_1_SQRT_2;
        assert!(z.is_real_positive());
    }

    #[test]
    fn simplify() {
        let a = Amplitude::from(c!(0.5, 1e-17)).simplify();
        assert_eq!(a.to_c64().im, 0.0);
        let h = Amplitude::FRAC_1_SQRT_2;
        assert_eq!((h * Amplitude::Exact(DOmega::SQRT_2)).simplify(), Amplitude::ONE);
    }

    #[test]
    fn labels() {
        assert_eq!(Amplitude::ONE.latex(), "1");
        assert_eq!(Amplitude::from(-1).latex(), "-1");
        assert_eq!(Amplitude::ZERO.latex(), "0");
        assert_eq!(Amplitude::FRAC_1_SQRT_2.latex(), "\\frac{1}{\\sqrt{2}}");
        assert_eq!((-Amplitude::FRAC_1_SQRT_2).latex(), "-\\frac{1}{\\sqrt{2}}");
        let w = Amplitude::Exact(DOmega::OMEGA);
        assert_eq!(
            w.latex_factor(),
            "(\\frac{1}{\\sqrt{2}} + \\frac{i}{\\sqrt{2}})",
        );
        assert_eq!(Amplitude::from(c!(0.5, -0.25)).latex(), "0.5 - 0.25i");
        assert_eq!(Amplitude::from(c!(0.0, -0.25)).latex(), "-0.25i");
        assert_eq!(Amplitude::from(0.9238795).latex(), "0.924");
        assert_eq!(Amplitude::FRAC_1_SQRT_2.to_string(), "1/√2");
    }
}
