//! This package draws [Feynman path sum][path-sum] diagrams for small quantum
//! circuits: pictures of how each basis-state amplitude of a register branches
//! and recombines as gates are applied one at a time.
//!
//! - [`ring`] and [`amplitude`] provide exact arithmetic over the ring
//! ℤ\[1/2, *ω*\] (*ω* = exp(*iπ*/4)) with a floating-point fallback, so that
//! amplitudes like 1/√2 stay exact and cancel cleanly.
//! - [`gate`] holds the fixed gate catalog and its parsing from tokens like
//! `h0` or `cnot0,1`.
//! - [`state`] tracks the sequence of superposition snapshots.
//! - [`diagram`] lays out arrows and labels for every gate application, using
//! [`config`] for geometry, [`style`] for arrow colors, and [`label`] for
//! rendering LaTeX labels; [`scene`] writes the result as SVG (or PNG/PDF via
//! an external converter).
//! - [`circuit`] writes the same gate list as a conventional
//! [qcircuit][qcircuit] diagram, and [`render`] drives batches of renders
//! with the usual file naming.
//!
//! ```no_run
//! use feynman_path::{ label::LabelCache, render::RenderJob };
//!
//! let labels = LabelCache::default();
//! RenderJob::new("bell", 2, ["h0", "cnot0,1"])
//!     .with_sequence(true)
//!     .run(&labels)
//!     .unwrap();
//! ```
//!
//! [path-sum]: https://en.wikipedia.org/wiki/Path_integral_formulation
//! [qcircuit]: https://ctan.org/pkg/qcircuit
//!
//! # Further reading
//! - R. P. Feynman, "Space-time approach to non-relativistic quantum
//! mechanics." Rev. Mod. Phys. **20**, 367 (1948).
//! - N. J. Ross and P. Selinger, "Optimal ancilla-free Clifford+T
//! approximation of z-rotations."
//! [arXiv:1403.2975](https://arxiv.org/abs/1403.2975)
//!

pub mod ring;
pub mod amplitude;
pub mod angle;
pub mod gate;
pub mod state;
pub mod style;
pub mod config;
pub mod label;
pub mod scene;
pub mod diagram;
pub mod circuit;
pub mod render;
pub(crate) mod vizdefs;

pub extern crate num_complex;
/// Handy macro to create `num_complex::Complex64`s from more natural and
/// succinct syntax.
///
/// ```
/// use std::f64::consts::PI;
/// use num_complex::Complex64;
/// use feynman_path::c;
///
/// assert_eq!( c!(i (-1.0)),    Complex64::new(0.0, -1.0)      );
/// assert_eq!( c!(e PI),        Complex64::cis(PI)             );
/// assert_eq!( c!(1.0),         Complex64::new(1.0, 0.0)       );
/// assert_eq!( c!(1.0 + i 1.0), Complex64::new(1.0, 1.0)       );
/// assert_eq!( c!(1.0 - i 1.0), Complex64::new(1.0, -1.0)      );
/// assert_eq!( c!(1.0, 1.0),    Complex64::new(1.0, 1.0)       );
/// assert_eq!( c!(1.0, e PI),   Complex64::from_polar(1.0, PI) );
/// ```
#[macro_export]
macro_rules! c {
    ( i $im:expr )
        => { $crate::num_complex::Complex64::new(0.0, $im) };
    ( e $ph:expr )
        => { $crate::num_complex::Complex64::cis($ph) };
    ( $re:expr )
        => { $crate::num_complex::Complex64::new($re, 0.0) };
    ( $re:literal + i $im:literal )
        => { $crate::num_complex::Complex64::new($re, $im) };
    ( $re:literal - i $im:literal )
        => { $crate::num_complex::Complex64::new($re, -$im) };
    ( $r:expr, e $ph:expr )
        => { $crate::num_complex::Complex64::from_polar($r, $ph) };
    ( $re:expr, $im:expr )
        => { $crate::num_complex::Complex64::new($re, $im) };
}
