//! Mapping from amplitudes to arrow colors and widths.
//!
//! Under the default [`ColorScheme::Wheel`], an arrow's hue encodes the phase
//! of its coefficient (phase 0 is blue) and its saturation encodes the
//! magnitude. [`ColorScheme::TwoTone`] draws real positive coefficients in
//! blue and everything else in orange.

use std::fmt;
use crate::{
    amplitude::Amplitude,
    vizdefs::{ ARROW_STROKE, BLUE, HUE_OFFSET, MAX_SAT, MIN_SAT, ORANGE },
};

/// An sRGB color.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Convert from hue (degrees), saturation, and value (both in `[0, 1]`).
    pub fn from_hsv(hue: f64, sat: f64, val: f64) -> Self {
        let h = hue.rem_euclid(360.0) / 60.0;
        let s = sat.clamp(0.0, 1.0);
        let v = val.clamp(0.0, 1.0);
        let c = v * s;
        let x = c * (1.0 - (h.rem_euclid(2.0) - 1.0).abs());
        let (r, g, b)
            = match h as u32 {
                0 => (c, x, 0.0),
                1 => (x, c, 0.0),
                2 => (0.0, c, x),
                3 => (0.0, x, c),
                4 => (x, 0.0, c),
                _ => (c, 0.0, x),
            };
        let m = v - c;
        let to_u8 = |f: f64| ((f + m) * 255.0).round().clamp(0.0, 255.0) as u8;
        Self(to_u8(r), to_u8(g), to_u8(b))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

/// How arrow colors are chosen.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ColorScheme {
    /// Phase → hue, magnitude → saturation.
    #[default]
    Wheel,
    /// Blue for real positive coefficients, orange otherwise.
    TwoTone,
}

/// Return the color of an arrow carrying `coeff`.
pub fn arrow_color(coeff: &Amplitude, scheme: ColorScheme) -> Rgb {
    match scheme {
        ColorScheme::TwoTone => {
            if coeff.is_real_positive() { BLUE } else { ORANGE }
        },
        ColorScheme::Wheel => {
            let hue = HUE_OFFSET + coeff.phase().to_degrees();
            let mag = coeff.magnitude().min(1.0);
            let sat = MIN_SAT + (MAX_SAT - MIN_SAT) * mag;
            Rgb::from_hsv(hue, sat, 1.0)
        },
    }
}

/// Return the stroke width of an arrow carrying `coeff`, never less than
/// `min_width` × the width at unit magnitude.
pub fn arrow_width(coeff: &Amplitude, min_width: f64) -> f64 {
    ARROW_STROKE * coeff.magnitude().min(1.0).max(min_width)
}
