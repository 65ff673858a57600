//! Exact complex numbers represented as members of the ring
//! **D**[*ω*], *ω* = exp(*iπ*/4), where **D** is the ring of dyadic rational
//! numbers.
//!
//! All such elements can be represented using five integers
//! (*k*, *a*, *b*, *c*, *d*), giving a complex number as
//! (*a* + *b* *i* + *c* *ω* + *d* *ω*\*) / 2<sup>*k*</sup>. This covers every
//! number of the form *a* (√2)<sup>*k*</sup> *i*<sup>*m*</sup> and all sums
//! thereof, which is everything the fixed gates (and rotations by multiples of
//! π/2) can produce.

use std::fmt;
use num_complex::Complex64 as C64;
use num_rational::Rational64 as R64;
use num_traits::{ Signed, Zero };

/// An element of the ring **D**[exp(*i* *π* / 4)].
///
/// Values are always kept in reduced form, where at least one of the four
/// integer coefficients is odd (or all are zero and `div2 == 0`). Since
/// {1, *i*, *ω*, *ω*\*} is a basis of the ring over **D**, the reduced form is
/// unique and equality is structural.
#[derive(Copy, Clone, Debug)]
pub struct DOmega {
    /// Exponent on the outer factor of 1/2.
    pub div2: i32,
    /// Purely real part.
    pub re: i64,
    /// Purely imaginary part.
    pub im: i64,
    /// exp(<i>i π</i> / 4) component.
    pub ph_pos: i64,
    /// exp(–<i>i π</i> / 4) component.
    pub ph_neg: i64,
}

// multiply `n` by 2^`k` for `k` ≥ 0, checking for overflow
fn checked_pow2_mul(n: i64, k: u32) -> Option<i64> {
    if k >= 63 { return if n == 0 { Some(0) } else { None }; }
    n.checked_mul(1_i64 << k)
}

// n / 2^k as a rational number
fn dyadic(n: i64, k: i32) -> Option<R64> {
    if k >= 0 {
        if k >= 63 { return None; }
        Some(R64::new(n, 1_i64 << k))
    } else {
        checked_pow2_mul(n, k.unsigned_abs()).map(R64::from_integer)
    }
}

impl DOmega {
    /// The constant value 0.
    pub const ZERO: Self =
        Self { div2: 0, re: 0, im: 0, ph_pos: 0, ph_neg: 0 };

    /// The real unit 1.
    pub const ONE: Self =
        Self { div2: 0, re: 1, im: 0, ph_pos: 0, ph_neg: 0 };

    /// The imaginary unit *i*.
    pub const I: Self =
        Self { div2: 0, re: 0, im: 1, ph_pos: 0, ph_neg: 0 };

    /// The positive-phase unit *ω* = exp(*i* *π* / 4).
    pub const OMEGA: Self =
        Self { div2: 0, re: 0, im: 0, ph_pos: 1, ph_neg: 0 };

    /// The real number √2 = *ω* + *ω*\*.
    pub const SQRT_2: Self =
        Self { div2: 0, re: 0, im: 0, ph_pos: 1, ph_neg: 1 };

    /// The real number 1/√2.
    pub const FRAC_1_SQRT_2: Self =
        Self { div2: 1, re: 0, im: 0, ph_pos: 1, ph_neg: 1 };

    /// Create a new, reduced `DOmega`.
    pub fn new(div2: i32, re: i64, im: i64, ph_pos: i64, ph_neg: i64) -> Self {
        Self { div2, re, im, ph_pos, ph_neg }.reduced()
    }

    /// Create a new integer-valued `DOmega`.
    pub fn from_int(n: i64) -> Self { Self::new(0, n, 0, 0, 0) }

    /// Return *ω*<sup>`pow`</sup>.
    pub fn omega_pow(pow: i64) -> Self { Self::ONE.rot(pow) }

    fn coeffs(&self) -> [i64; 4] { [self.re, self.im, self.ph_pos, self.ph_neg] }

    /// Return `true` if `self` is exactly zero.
    pub fn is_zero(&self) -> bool { self.coeffs().iter().all(|c| *c == 0) }

    /// Divide out all common factors of two from the coefficients.
    pub fn reduce(&mut self) {
        let Some(pow)
            = self.coeffs().into_iter()
            .filter(|c| *c != 0)
            .map(|c| c.trailing_zeros())
            .min()
        else {
            self.div2 = 0;
            return;
        };
        self.div2 -= pow as i32;
        self.re >>= pow;
        self.im >>= pow;
        self.ph_pos >>= pow;
        self.ph_neg >>= pow;
    }

    /// Return a reduced copy of `self`.
    pub fn reduced(mut self) -> Self {
        self.reduce();
        self
    }

    /// Size of the representation: the largest coefficient bit length plus
    /// the magnitude of the power-of-two exponent.
    pub fn complexity(&self) -> u32 {
        let bits
            = self.coeffs().into_iter()
            .map(|c| 64 - c.unsigned_abs().leading_zeros())
            .max()
            .unwrap_or(0);
        bits + self.div2.unsigned_abs()
    }

    /// Multiply by a power of two.
    pub fn mul2(mut self, pow: i32) -> Self {
        if !self.is_zero() { self.div2 -= pow; }
        self
    }

    /// Alias for `self.mul2(-1)`.
    pub fn half(self) -> Self { self.mul2(-1) }

    /// Multiply by an integer power of *ω*.
    pub fn rot(self, pow: i64) -> Self {
        // (a + b i + c ω + d ω*) ω = d + c i + a ω - b ω*
        (0..pow.rem_euclid(8))
            .fold(self, |z, _| {
                Self {
                    div2: z.div2,
                    re: z.ph_neg,
                    im: z.ph_pos,
                    ph_pos: z.re,
                    ph_neg: -z.im,
                }
            })
    }

    /// Complex conjugate.
    pub fn conj(self) -> Self {
        Self {
            div2: self.div2,
            re: self.re,
            im: -self.im,
            ph_pos: self.ph_neg,
            ph_neg: self.ph_pos,
        }
    }

    fn aligned(self, rhs: Self) -> Option<([i64; 4], [i64; 4], i32)> {
        let div2 = self.div2.max(rhs.div2);
        let ls = (div2 - self.div2) as u32;
        let rs = (div2 - rhs.div2) as u32;
        let mut l = self.coeffs();
        let mut r = rhs.coeffs();
        for c in l.iter_mut() { *c = checked_pow2_mul(*c, ls)?; }
        for c in r.iter_mut() { *c = checked_pow2_mul(*c, rs)?; }
        Some((l, r, div2))
    }

    fn from_coeffs(div2: i32, c: [i64; 4]) -> Self {
        Self::new(div2, c[0], c[1], c[2], c[3])
    }

    /// Checked addition, returning `None` on overflow.
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        if self.is_zero() { return Some(rhs); }
        if rhs.is_zero() { return Some(self); }
        let (l, r, div2) = self.aligned(rhs)?;
        let mut c = [0; 4];
        for k in 0..4 { c[k] = l[k].checked_add(r[k])?; }
        Some(Self::from_coeffs(div2, c))
    }

    /// Checked subtraction, returning `None` on overflow.
    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.checked_add(rhs.checked_neg()?)
    }

    /// Checked negation, returning `None` on overflow.
    pub fn checked_neg(self) -> Option<Self> {
        Some(Self {
            div2: self.div2,
            re: self.re.checked_neg()?,
            im: self.im.checked_neg()?,
            ph_pos: self.ph_pos.checked_neg()?,
            ph_neg: self.ph_neg.checked_neg()?,
        })
    }

    /// Checked multiplication, returning `None` on overflow.
    pub fn checked_mul(self, rhs: Self) -> Option<Self> {
        // i ω = -ω*, i ω* = ω, ω² = i, ω*² = -i, ω ω* = 1
        fn dot(terms: [(i64, i64); 4]) -> Option<i64> {
            terms.into_iter()
                .try_fold(0_i64, |acc, (x, y)| acc.checked_add(x.checked_mul(y)?))
        }
        let Self { div2: k, re: a, im: b, ph_pos: c, ph_neg: d } = self;
        let Self { div2: j, re: e, im: f, ph_pos: g, ph_neg: h } = rhs;
        let re = dot([(a, e), (-b, f), (c, h), (d, g)])?;
        let im = dot([(a, f), (b, e), (c, g), (-d, h)])?;
        let ph_pos = dot([(a, g), (b, h), (c, e), (d, f)])?;
        let ph_neg = dot([(a, h), (-b, g), (-c, f), (d, e)])?;
        Some(Self::new(k.checked_add(j)?, re, im, ph_pos, ph_neg))
    }

    /// Exact squared modulus |*z*|², returning `None` on overflow.
    pub fn norm_sqr(self) -> Option<Surd> {
        let n = self.checked_mul(self.conj())?;
        // n is real: n = re + ph_pos (ω + ω*) = re + ph_pos √2
        Some(Surd { rat: dyadic(n.re, n.div2)?, rt2: dyadic(n.ph_pos, n.div2)? })
    }

    /// Exact real and imaginary parts, returning `None` if they cannot be
    /// represented with 64-bit rationals.
    pub fn parts(self) -> Option<(Surd, Surd)> {
        // ω = (√2 + i √2) / 2, ω* = (√2 - i √2) / 2
        let k = self.div2;
        let re = Surd {
            rat: dyadic(self.re, k)?,
            rt2: dyadic(self.ph_pos.checked_add(self.ph_neg)?, k.checked_add(1)?)?,
        };
        let im = Surd {
            rat: dyadic(self.im, k)?,
            rt2: dyadic(self.ph_pos.checked_sub(self.ph_neg)?, k.checked_add(1)?)?,
        };
        Some((re, im))
    }
}

impl PartialEq for DOmega {
    fn eq(&self, other: &Self) -> bool {
        let l = self.reduced();
        let r = other.reduced();
        l.div2 == r.div2 && l.coeffs() == r.coeffs()
    }
}

impl Eq for DOmega { }

impl From<DOmega> for C64 {
    fn from(z: DOmega) -> Self {
        use std::f64::consts::FRAC_1_SQRT_2 as ONRT2;
        const OMEGA: C64 = C64 { re: ONRT2, im:  ONRT2 };
        const OMEGA_CONJ: C64 = C64 { re: ONRT2, im: -ONRT2 };
        let a = z.re as f64;
        let b = z.im as f64;
        let c = z.ph_pos as f64;
        let d = z.ph_neg as f64;
        (C64::new(a, b) + c * OMEGA + d * OMEGA_CONJ) / 2.0_f64.powi(z.div2)
    }
}

impl From<i64> for DOmega {
    fn from(n: i64) -> Self { Self::from_int(n) }
}

impl fmt::Display for DOmega {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.parts() {
            Some((re, im)) => write!(f, "{}", format_complex(re, im, Notation::Plain)),
            None => write!(f, "{}", C64::from(*self)),
        }
    }
}

/// An exact real number of the form *p* + *q* √2 with rational *p*, *q*.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Surd {
    /// Rational part.
    pub rat: R64,
    /// Coefficient on √2.
    pub rt2: R64,
}

impl Surd {
    /// Return `true` if `self` is zero.
    pub fn is_zero(&self) -> bool { self.rat.is_zero() && self.rt2.is_zero() }

    /// Convert to a floating-point number.
    pub fn to_f64(&self) -> f64 {
        fn r2f(a: R64) -> f64 { *a.numer() as f64 / *a.denom() as f64 }
        r2f(self.rat) + r2f(self.rt2) * std::f64::consts::SQRT_2
    }

    // write as (a + b √2) / d with integer a, b and d > 0
    fn terms(&self) -> Option<(i64, i64, i64)> {
        let (p, q) = (self.rat, self.rt2);
        let d = lcm(*p.denom(), *q.denom())?;
        let a = p.numer().checked_mul(d / p.denom())?;
        let b = q.numer().checked_mul(d / q.denom())?;
        Some((a, b, d))
    }

    /// Return `true` if `self` is printed as a sum of two terms outside of a
    /// fraction, i.e. would need parentheses next to another factor.
    pub(crate) fn is_compound(&self) -> bool {
        matches!(self.terms(), Some((a, b, 1)) if a != 0 && b != 0)
    }
}

fn lcm(a: i64, b: i64) -> Option<i64> {
    fn gcd(mut a: i64, mut b: i64) -> i64 {
        while b != 0 {
            let t = b;
            b = a % b;
            a = t;
        }
        a.abs()
    }
    (a / gcd(a, b)).checked_mul(b).map(|l| l.abs())
}

/// Output flavor for printed numbers.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Notation {
    Latex,
    Plain,
}

impl Notation {
    fn sqrt2(self) -> &'static str {
        match self {
            Self::Latex => "\\sqrt{2}",
            Self::Plain => "√2",
        }
    }

    fn frac(self, num: &str, den: &str) -> String {
        match self {
            Self::Latex => format!("\\frac{{{}}}{{{}}}", num, den),
            Self::Plain if num.contains(' ') => format!("({})/{}", num, den),
            Self::Plain => format!("{}/{}", num, den),
        }
    }
}

// `m` copies of `unit`, dropping a leading 1
fn coeff(m: i64, unit: &str) -> String {
    if m == 1 && !unit.is_empty() { unit.to_string() } else { format!("{}{}", m, unit) }
}

/// Format a [`Surd`] times `unit` (either `""` or `"i"`).
pub(crate) fn format_surd(s: Surd, unit: &str, notation: Notation) -> String {
    let Some((a, b, d)) = s.terms() else {
        return format!("{:.3}{}", s.to_f64(), unit);
    };
    let rt2 = notation.sqrt2();
    match (a, b) {
        (0, 0) => "0".to_string(),
        (a, 0) => {
            let sign = if a < 0 { "-" } else { "" };
            let num = coeff(a.abs(), unit);
            if d == 1 {
                format!("{}{}", sign, num)
            } else {
                format!("{}{}", sign, notation.frac(&num, &d.to_string()))
            }
        },
        (0, b) => {
            let sign = if b < 0 { "-" } else { "" };
            let m = b.abs();
            if d % 2 == 0 {
                // m √2 / d = m / ((d / 2) √2)
                let num = coeff(m, unit);
                let den
                    = if d == 2 {
                        rt2.to_string()
                    } else {
                        format!("{}{}", d / 2, rt2)
                    };
                format!("{}{}", sign, notation.frac(&num, &den))
            } else {
                let lead = if m == 1 { String::new() } else { m.to_string() };
                let num = format!("{}{}{}", lead, rt2, unit);
                if d == 1 {
                    format!("{}{}", sign, num)
                } else {
                    format!("{}{}", sign, notation.frac(&num, &d.to_string()))
                }
            }
        },
        (a, b) => {
            let op = if b < 0 { "-" } else { "+" };
            let m = b.abs();
            let lead = if m == 1 { String::new() } else { m.to_string() };
            let mut num = format!("{} {} {}{}", a, op, lead, rt2);
            if !unit.is_empty() { num = format!("({}){}", num, unit); }
            if d == 1 { num } else { notation.frac(&num, &d.to_string()) }
        },
    }
}

/// Format a complex number given as exact real and imaginary parts.
pub(crate) fn format_complex(re: Surd, im: Surd, notation: Notation) -> String {
    match (re.is_zero(), im.is_zero()) {
        (true, true) => "0".to_string(),
        (false, true) => format_surd(re, "", notation),
        (true, false) => format_surd(im, "i", notation),
        (false, false) => {
            let r = format_surd(re, "", notation);
            let i = format_surd(im, "i", notation);
            match i.strip_prefix('-') {
                Some(rest) => format!("{} - {}", r, rest),
                None => format!("{} + {}", r, i),
            }
        },
    }
}

impl fmt::Display for Surd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_surd(*self, "", Notation::Plain))
    }
}

impl Surd {
    /// Return the sign of `self` as `-1`, `0`, or `1`, computed exactly when
    /// possible.
    pub fn signum(&self) -> i64 {
        let (a, b) = (self.rat, self.rt2);
        if b.is_zero() { return a.signum().to_integer(); }
        if a.is_zero() || a.signum() == b.signum() {
            return b.signum().to_integer();
        }
        // opposite signs: compare a² with 2 b²
        let lhs = a.numer().checked_mul(*a.numer())
            .zip(b.denom().checked_mul(*b.denom()));
        let rhs = b.numer().checked_mul(*b.numer()).and_then(|n| n.checked_mul(2))
            .zip(a.denom().checked_mul(*a.denom()));
        match (lhs, rhs) {
            (Some((an2, bd2)), Some((bn2, ad2))) => {
                match (an2 as i128 * bd2 as i128).cmp(&(bn2 as i128 * ad2 as i128)) {
                    std::cmp::Ordering::Greater => a.signum().to_integer(),
                    std::cmp::Ordering::Less => b.signum().to_integer(),
                    std::cmp::Ordering::Equal => 0,
                }
            },
            _ => self.to_f64().signum() as i64,
        }
    }
}
