//! The fixed catalog of gates that can be drawn in a path sum diagram.
//!
//! Gates are named by short tokens like `h0` or `cnot0,1`: the name is the
//! leading alphabetic run and the arguments are comma-separated qubit indices.
//! Rotation gates additionally take an angle (in half-turns), which is always
//! supplied separately from the token.

use std::{ fmt, str::FromStr };
use ndarray::{ self as nd, Array2 };
use num_complex::Complex64 as C64;
use thiserror::Error;
use crate::{ amplitude::Amplitude, angle::Angle, ring::DOmega };

#[derive(Debug, Error)]
pub enum GateError {
    /// Returned for gate names outside the catalog.
    #[error("unsupported gate '{0}'")]
    UnsupportedGate(String),

    /// Returned when a gate token carries the wrong number of qubit indices.
    #[error("gate '{name}' takes {expected} qubit argument(s), but got {got}")]
    Arity { name: String, expected: usize, got: usize },

    /// Returned when a gate argument is not a non-negative integer.
    #[error("invalid argument '{arg}' in gate token '{token}'")]
    BadArgument { token: String, arg: String },

    /// Returned when a rotation gate is given without an angle.
    #[error("rotation gate '{0}' requires an angle")]
    MissingAngle(String),

    /// Returned when a non-rotation gate is given an angle.
    #[error("gate '{0}' does not take an angle")]
    UnexpectedAngle(String),

    /// Returned when a floating-point angle cannot be used.
    #[error("invalid rotation angle {0}")]
    InvalidAngle(f64),

    /// Returned when a two-qubit gate targets the same qubit twice.
    #[error("gate '{0}' targets qubit {1} twice")]
    RepeatedQubit(String, usize),
}
pub type GateResult<T> = Result<T, GateError>;
use GateError::*;

/// A gate name and its qubit arguments, as parsed from text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GateToken {
    /// Leading alphabetic run of the token.
    pub name: String,
    /// Comma-separated integer arguments.
    pub args: Vec<usize>,
}

impl GateToken {
    /// Split a token like `cnot0,1` into name and arguments.
    pub fn parse(token: &str) -> GateResult<Self> {
        let token = token.trim();
        let split
            = token.find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(token.len());
        let (name, rest) = token.split_at(split);
        let args: Vec<usize>
            = if rest.is_empty() {
                Vec::new()
            } else {
                rest.split(',')
                    .map(|arg| {
                        arg.trim().parse::<usize>()
                            .map_err(|_| BadArgument {
                                token: token.to_string(),
                                arg: arg.to_string(),
                            })
                    })
                    .collect::<GateResult<_>>()?
            };
        Ok(Self { name: name.to_string(), args })
    }
}

impl FromStr for GateToken {
    type Err = GateError;

    fn from_str(s: &str) -> GateResult<Self> { Self::parse(s) }
}

impl fmt::Display for GateToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        let mut args = self.args.iter();
        if let Some(a) = args.next() { write!(f, "{}", a)?; }
        for a in args { write!(f, ",{}", a)?; }
        Ok(())
    }
}

/// A gate token together with the angle for rotation gates.
#[derive(Clone, Debug, PartialEq)]
pub struct GateSpec {
    pub token: String,
    pub angle: Option<Angle>,
}

impl GateSpec {
    /// Create a new `GateSpec` with no angle.
    pub fn new(token: &str) -> Self {
        Self { token: token.to_string(), angle: None }
    }

    /// Create a new `GateSpec` for a rotation by `angle` half-turns.
    pub fn rotation(token: &str, angle: Angle) -> Self {
        Self { token: token.to_string(), angle: Some(angle) }
    }
}

impl From<&str> for GateSpec {
    fn from(token: &str) -> Self { Self::new(token) }
}

impl fmt::Display for GateSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.angle {
            Some(angle) => write!(f, "{}({})", self.token, angle),
            None => write!(f, "{}", self.token),
        }
    }
}

/// A gate from the fixed catalog.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Gate {
    /// Hadamard.
    H(usize),
    /// Pauli *X*.
    X(usize),
    /// Pauli *Y*.
    Y(usize),
    /// Pauli *Z*.
    Z(usize),
    /// Rotation about *x*.
    Rx(usize, Angle),
    /// Rotation about *y*.
    Ry(usize, Angle),
    /// Rotation about *z*.
    Rz(usize, Angle),
    /// *X* on the second qubit, controlled by the first.
    Cnot(usize, usize),
}

impl Gate {
    /// Build a gate from a parsed token and an optional angle.
    pub fn from_token(token: &GateToken, angle: Option<Angle>) -> GateResult<Self> {
        let name = token.name.to_ascii_lowercase();
        let arity
            = match name.as_str() {
                "h" | "x" | "y" | "z" | "rx" | "ry" | "rz" => 1,
                "cnot" | "cx" => 2,
                _ => { return Err(UnsupportedGate(token.name.clone())); },
            };
        if token.args.len() != arity {
            return Err(Arity {
                name: token.name.clone(),
                expected: arity,
                got: token.args.len(),
            });
        }
        let rotation = name.starts_with('r');
        match (rotation, angle) {
            (true, None) => { return Err(MissingAngle(token.name.clone())); },
            (false, Some(_)) => { return Err(UnexpectedAngle(token.name.clone())); },
            _ => { },
        }
        let a = token.args[0];
        let theta = angle.unwrap_or_else(Angle::zero);
        let gate
            = match name.as_str() {
                "h" => Self::H(a),
                "x" => Self::X(a),
                "y" => Self::Y(a),
                "z" => Self::Z(a),
                "rx" => Self::Rx(a, theta),
                "ry" => Self::Ry(a, theta),
                "rz" => Self::Rz(a, theta),
                _ => {
                    let b = token.args[1];
                    if a == b { return Err(RepeatedQubit(token.name.clone(), a)); }
                    Self::Cnot(a, b)
                },
            };
        Ok(gate)
    }

    /// Parse a gate token, with an optional angle for rotation gates.
    pub fn parse(token: &str, angle: Option<Angle>) -> GateResult<Self> {
        Self::from_token(&GateToken::parse(token)?, angle)
    }

    /// Build a gate from a [`GateSpec`].
    pub fn from_spec(spec: &GateSpec) -> GateResult<Self> {
        Self::parse(&spec.token, spec.angle)
    }

    /// Build a rotation gate from a floating-point number of half-turns.
    pub fn parse_rotation(token: &str, half_turns: f64) -> GateResult<Self> {
        let angle
            = Angle::from_half_turns(half_turns)
            .ok_or(InvalidAngle(half_turns))?;
        Self::parse(token, Some(angle))
    }

    /// Return the qubits acted on by `self`, in argument order.
    pub fn qubits(&self) -> Vec<usize> {
        match *self {
            Self::H(k) | Self::X(k) | Self::Y(k) | Self::Z(k)
            | Self::Rx(k, _) | Self::Ry(k, _) | Self::Rz(k, _) => vec![k],
            Self::Cnot(c, t) => vec![c, t],
        }
    }

    /// Return the gate name as used in tokens.
    pub fn name(&self) -> &'static str {
        match self {
            Self::H(..) => "h",
            Self::X(..) => "x",
            Self::Y(..) => "y",
            Self::Z(..) => "z",
            Self::Rx(..) => "rx",
            Self::Ry(..) => "ry",
            Self::Rz(..) => "rz",
            Self::Cnot(..) => "cnot",
        }
    }

    /// Return the 2×2 matrix of a single-qubit gate, indexed as
    /// `[output bit, input bit]`, or `None` for [`Cnot`][Self::Cnot].
    pub fn matrix(&self) -> Option<Array2<Amplitude>> {
        let o = Amplitude::ZERO;
        let l = Amplitude::ONE;
        let h = Amplitude::FRAC_1_SQRT_2;
        let i = Amplitude::I;
        let mat
            = match *self {
                Self::H(_) => nd::array![[h, h], [h, -h]],
                Self::X(_) => nd::array![[o, l], [l, o]],
                Self::Y(_) => nd::array![[o, -i], [i, o]],
                Self::Z(_) => nd::array![[l, o], [o, -l]],
                Self::Rx(_, theta) => {
                    let (c, s) = half_angle_cos_sin(theta);
                    let mis = -(i * s);
                    nd::array![[c, mis], [mis, c]]
                },
                Self::Ry(_, theta) => {
                    let (c, s) = half_angle_cos_sin(theta);
                    nd::array![[c, -s], [s, c]]
                },
                Self::Rz(_, theta) => {
                    let (neg, pos) = half_angle_phases(theta);
                    nd::array![[neg, o], [o, pos]]
                },
                Self::Cnot(..) => { return None; },
            };
        Some(mat)
    }

    /// Render the transition label drawn above a gate's arrows, in LaTeX.
    pub fn latex(&self) -> String {
        match *self {
            Self::H(k) => format!("H_{{{}}}", k),
            Self::X(k) => format!("X_{{{}}}", k),
            Self::Y(k) => format!("Y_{{{}}}", k),
            Self::Z(k) => format!("Z_{{{}}}", k),
            Self::Rx(k, theta) => format!("R_{{x,{}}}({})", k, theta.latex()),
            Self::Ry(k, theta) => format!("R_{{y,{}}}({})", k, theta.latex()),
            Self::Rz(k, theta) => format!("R_{{z,{}}}({})", k, theta.latex()),
            Self::Cnot(c, t) => format!("CNOT_{{{}{}}}", c, t),
        }
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Rx(k, theta) | Self::Ry(k, theta) | Self::Rz(k, theta)
                => write!(f, "{}{}({})", self.name(), k, theta),
            Self::Cnot(c, t) => write!(f, "cnot{},{}", c, t),
            _ => write!(f, "{}{}", self.name(), self.qubits()[0]),
        }
    }
}

// cos(θπ/2), sin(θπ/2)
fn half_angle_cos_sin(theta: Angle) -> (Amplitude, Amplitude) {
    match theta.omega_power() {
        Some(n) => {
            let pos = DOmega::omega_pow(n);
            let neg = DOmega::omega_pow(-n);
            let cos = pos.checked_add(neg).map(DOmega::half);
            // (ω^n - ω^-n) / 2i = -i (ω^n - ω^-n) / 2
            let sin = pos.checked_sub(neg).map(|z| z.half().rot(-2));
            match (cos, sin) {
                (Some(c), Some(s)) => (c.into(), s.into()),
                _ => numeric_cos_sin(theta),
            }
        },
        None => numeric_cos_sin(theta),
    }
}

fn numeric_cos_sin(theta: Angle) -> (Amplitude, Amplitude) {
    let (s, c) = (theta.reduced().radians() / 2.0).sin_cos();
    (Amplitude::from(c), Amplitude::from(s))
}

// exp(-iθπ/2), exp(iθπ/2)
fn half_angle_phases(theta: Angle) -> (Amplitude, Amplitude) {
    match theta.omega_power() {
        Some(n) => (DOmega::omega_pow(-n).into(), DOmega::omega_pow(n).into()),
        None => {
            let phi = theta.reduced().radians() / 2.0;
            (C64::cis(-phi).into(), C64::cis(phi).into())
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_unitary(gate: Gate) {
        let m = gate.matrix().unwrap();
        for r in 0..2 {
            for c in 0..2 {
                let dot: C64
                    = (0..2)
                    .map(|k| m[[k, r]].to_c64().conj() * m[[k, c]].to_c64())
                    .sum();
                let expected = if r == c { 1.0 } else { 0.0 };
                assert!(
                    (dot - C64::new(expected, 0.0)).norm() < 1e-12,
                    "{} is not unitary", gate,
                );
            }
        }
    }

    #[test]
    fn parse_tokens() {
        let tok = GateToken::parse("cnot0,1").unwrap();
        assert_eq!(tok, GateToken { name: "cnot".into(), args: vec![0, 1] });
        let tok = GateToken::parse("h12").unwrap();
        assert_eq!(tok, GateToken { name: "h".into(), args: vec![12] });
        assert_eq!(tok.to_string(), "h12");
        let tok = GateToken::parse("z").unwrap();
        assert!(tok.args.is_empty());
        assert!(matches!(GateToken::parse("h0,x"), Err(BadArgument { .. })));
    }

    #[test]
    fn build_gates() {
        assert_eq!(Gate::parse("h0", None).unwrap(), Gate::H(0));
        assert_eq!(Gate::parse("H1", None).unwrap(), Gate::H(1));
        assert_eq!(Gate::parse("cnot1,0", None).unwrap(), Gate::Cnot(1, 0));
        assert_eq!(Gate::parse("cx0,2", None).unwrap(), Gate::Cnot(0, 2));
        assert_eq!(
            Gate::parse("rz0", Some(Angle::pi())).unwrap(),
            Gate::Rz(0, Angle::pi()),
        );
        assert_eq!(
            Gate::parse_rotation("ry1", 0.5).unwrap(),
            Gate::Ry(1, Angle::pi2()),
        );
        assert_eq!(
            Gate::from_spec(&GateSpec::rotation("rx2", Angle::pi4())).unwrap(),
            Gate::Rx(2, Angle::pi4()),
        );
    }

    #[test]
    fn gate_errors() {
        assert!(matches!(Gate::parse("t0", None), Err(UnsupportedGate(_))));
        assert!(matches!(Gate::parse("h0,1", None), Err(Arity { .. })));
        assert!(matches!(Gate::parse("cnot0", None), Err(Arity { .. })));
        assert!(matches!(Gate::parse("rx0", None), Err(MissingAngle(_))));
        assert!(matches!(
            Gate::parse("x0", Some(Angle::pi())),
            Err(UnexpectedAngle(_)),
        ));
        assert!(matches!(Gate::parse("cnot1,1", None), Err(RepeatedQubit(..))));
        assert!(matches!(
            Gate::parse_rotation("rx0", f64::NAN),
            Err(InvalidAngle(_)),
        ));
    }

    #[test]
    fn matrices_are_unitary() {
        let gates = [
            Gate::H(0), Gate::X(0), Gate::Y(0), Gate::Z(0),
            Gate::Rx(0, Angle::pi2()), Gate::Ry(0, Angle::new(3, 2)),
            Gate::Rz(0, Angle::pi()), Gate::Rx(0, Angle::new(1, 3)),
            Gate::Ry(0, Angle::pi4()), Gate::Rz(0, Angle::new(-2, 7)),
        ];
        for gate in gates { assert_unitary(gate); }
        assert!(Gate::Cnot(0, 1).matrix().is_none());
    }

    #[test]
    fn exact_rotations() {
        let m = Gate::Rz(0, Angle::pi()).matrix().unwrap();
        assert_eq!(m[[0, 0]], -Amplitude::I);
        assert!(m[[0, 0]].is_exact());
        assert_eq!(m[[1, 1]], Amplitude::I);

        let m = Gate::Rx(0, Angle::pi()).matrix().unwrap();
        assert_eq!(m[[0, 0]], Amplitude::ZERO);
        assert_eq!(m[[1, 0]], -Amplitude::I);
        assert!(m[[1, 0]].is_exact());

        let m = Gate::Ry(0, Angle::pi2()).matrix().unwrap();
        assert_eq!(m[[0, 0]], Amplitude::FRAC_1_SQRT_2);
        assert_eq!(m[[0, 1]], -Amplitude::FRAC_1_SQRT_2);
        assert!(m.iter().all(Amplitude::is_exact));

        let m = Gate::Ry(0, Angle::pi4()).matrix().unwrap();
        assert!(!m[[0, 0]].is_exact());
    }

    #[test]
    fn huge_angles() {
        let m = Gate::parse_rotation("rz0", 6e18).unwrap().matrix().unwrap();
        assert_eq!(m[[0, 0]], Amplitude::ONE);
        assert_eq!(m[[1, 1]], Amplitude::ONE);

        let m = Gate::Rz(0, Angle::new(i64::MAX, 1)).matrix().unwrap();
        assert_eq!(m[[0, 0]], Amplitude::I);
        assert_eq!(m[[1, 1]], -Amplitude::I);
        assert_eq!(m[[0, 0]].as_exact(), Some(DOmega::I));

        let m = Gate::Rx(0, Angle::new(i64::MAX, 1)).matrix().unwrap();
        assert_eq!(m[[0, 0]], Amplitude::ZERO);
        assert_eq!(m[[0, 1]], Amplitude::I);

        // numeric path: same matrix as the reduced angle
        let huge = Gate::Ry(0, Angle::new(i64::MAX, 3)).matrix().unwrap();
        let small
            = Gate::Ry(0, Angle::new(i64::MAX, 3).reduced()).matrix().unwrap();
        assert_eq!(huge, small);
        assert_unitary(Gate::Ry(0, Angle::new(i64::MAX, 3)));
        assert_unitary(Gate::Rx(0, Angle::new(i64::MIN + 1, 5)));
    }

    #[test]
    fn labels() {
        assert_eq!(Gate::H(0).latex(), "H_{0}");
        assert_eq!(Gate::Cnot(0, 1).latex(), "CNOT_{01}");
        assert_eq!(Gate::Rx(1, Angle::pi2()).latex(), "R_{x,1}(\\frac{\\pi}{2})");
        assert_eq!(Gate::Rz(0, Angle::pi()).to_string(), "rz0(π)");
        assert_eq!(Gate::Cnot(2, 0).to_string(), "cnot2,0");
    }
}
