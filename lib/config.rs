//! Layout constants and the geometry derived from them.
//!
//! Every position in a diagram is a function of a bitstring's row, a time
//! step, and the constants in [`LayoutConfig`]. Coordinates have *y* pointing
//! up, with the rows of all basis states centered on *y* = 0; time step *t*
//! sits at *x* = *t* × `w_time`.

use thiserror::Error;
use tracing::warn;
use crate::{
    scene::{ Bounds, Point },
    state::BitString,
    style::ColorScheme,
    vizdefs::BASE_FONTSIZE,
};

#[derive(Debug, Error)]
pub enum LayoutError {
    /// Returned when a spacing or font size is not a positive, finite number.
    #[error("layout constant '{0}' must be positive and finite, but got {1}")]
    NonPositive(&'static str, f64),

    /// Returned when a fraction is not a finite number in `[0, 1]`.
    #[error("layout constant '{0}' must lie in [0, 1], but got {1}")]
    NotAFraction(&'static str, f64),

    /// Returned when the arrow inset is negative or not finite.
    #[error("arrow inset must be non-negative and finite, but got {0}")]
    BadArrowSpace(f64),
}
pub type LayoutResult<T> = Result<T, LayoutError>;

/// Constants controlling the size and placement of everything drawn.
///
/// All lengths are in SVG user units (px).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LayoutConfig {
    /// Horizontal distance between time steps.
    pub w_time: f64,
    /// Vertical distance between rows.
    pub h_state: f64,
    /// Font size of amplitude labels.
    pub font: f64,
    /// Font size of gate labels.
    pub gate_font: f64,
    /// Width of an amplitude label, in units of `font`.
    pub ws_label: f64,
    /// Inset of arrow ends from the label column, in units of half the label
    /// width. Clamped to `ws_label / 2`.
    pub arrow_space: f64,
    /// Smallest arrow width, as a fraction of the width at unit magnitude.
    pub min_arrow_width: f64,
    /// How arrows are colored.
    pub color_scheme: ColorScheme,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            w_time: 120.0,
            h_state: 40.0,
            font: 12.0,
            gate_font: 16.0,
            ws_label: 6.0,
            arrow_space: 1.0,
            min_arrow_width: 0.1,
            color_scheme: ColorScheme::Wheel,
        }
    }
}

impl LayoutConfig {
    /// Return defaults with the label width and time spacing scaled for
    /// `n_qubits`-long bitstrings.
    pub fn for_qubits(n_qubits: usize) -> Self {
        let ws_label = 4.0 + 0.55 * n_qubits as f64;
        Self {
            w_time: 60.0 + 12.0 * ws_label,
            ws_label,
            ..Self::default()
        }
    }

    pub fn with_w_time(mut self, w_time: f64) -> Self {
        self.w_time = w_time;
        self
    }

    pub fn with_h_state(mut self, h_state: f64) -> Self {
        self.h_state = h_state;
        self
    }

    pub fn with_font(mut self, font: f64) -> Self {
        self.font = font;
        self
    }

    pub fn with_gate_font(mut self, gate_font: f64) -> Self {
        self.gate_font = gate_font;
        self
    }

    pub fn with_ws_label(mut self, ws_label: f64) -> Self {
        self.ws_label = ws_label;
        self
    }

    pub fn with_arrow_space(mut self, arrow_space: f64) -> Self {
        self.arrow_space = arrow_space;
        self
    }

    pub fn with_min_arrow_width(mut self, min_arrow_width: f64) -> Self {
        self.min_arrow_width = min_arrow_width;
        self
    }

    pub fn with_color_scheme(mut self, color_scheme: ColorScheme) -> Self {
        self.color_scheme = color_scheme;
        self
    }

    /// Check all constants, clamping the arrow inset if needed.
    pub fn validated(mut self) -> LayoutResult<Self> {
        let positive = [
            ("w_time", self.w_time),
            ("h_state", self.h_state),
            ("font", self.font),
            ("gate_font", self.gate_font),
            ("ws_label", self.ws_label),
        ];
        if let Some((name, val))
            = positive.into_iter().find(|(_, v)| !v.is_finite() || *v <= 0.0)
        {
            return Err(LayoutError::NonPositive(name, val));
        }
        if !(0.0..=1.0).contains(&self.min_arrow_width) {
            return Err(
                LayoutError::NotAFraction("min_arrow_width", self.min_arrow_width));
        }
        if !self.arrow_space.is_finite() || self.arrow_space < 0.0 {
            return Err(LayoutError::BadArrowSpace(self.arrow_space));
        }
        let max_space = self.ws_label / 2.0;
        if self.arrow_space > max_space {
            warn!(
                arrow_space = self.arrow_space,
                clamped = max_space,
                "arrow inset exceeds half the label width",
            );
            self.arrow_space = max_space;
        }
        Ok(self)
    }

    /// Validate `self` and derive the geometry for `n_qubits` qubits.
    pub fn layout(self, n_qubits: usize) -> LayoutResult<Layout> {
        let config = self.validated()?;
        let w_label = config.font * config.ws_label;
        Ok(Layout {
            config,
            rows: 1_usize << n_qubits,
            w_label,
            arrow_off: w_label / 2.0 * config.arrow_space,
        })
    }
}

/// Geometry derived from a validated [`LayoutConfig`] for a fixed number of
/// qubits.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Layout {
    config: LayoutConfig,
    rows: usize,
    w_label: f64,
    arrow_off: f64,
}

impl Layout {
    pub fn config(&self) -> &LayoutConfig { &self.config }

    /// Number of basis states, i.e. rows.
    pub fn rows(&self) -> usize { self.rows }

    /// Width of an amplitude label.
    pub fn w_label(&self) -> f64 { self.w_label }

    /// Horizontal inset of arrow ends.
    pub fn arrow_off(&self) -> f64 { self.arrow_off }

    fn mid_row(&self) -> f64 { (self.rows - 1) as f64 / 2.0 }

    /// Anchor position of `key` at time step `t`.
    pub fn position(&self, key: &BitString, t: usize) -> Point {
        Point {
            x: t as f64 * self.config.w_time,
            y: (self.mid_row() - key.index() as f64) * self.config.h_state,
        }
    }

    /// Start and end points of the arrow from `source` at time step `t` to
    /// `dest` at `t + 1`.
    pub fn arrow_endpoints(&self, source: &BitString, dest: &BitString, t: usize)
        -> (Point, Point)
    {
        let Point { x: x1, y: y1 } = self.position(source, t);
        let Point { x: x2, y: y2 } = self.position(dest, t + 1);
        let x1 = x1 + self.arrow_off;
        let x2 = x2 - self.arrow_off;
        let xx1 = x1 + self.w_label / 2.0 - self.arrow_off;
        let xx2 = x2 - self.w_label / 2.0 + self.arrow_off;
        let dx = x2 - x1;
        let (yy1, yy2)
            = if dx.abs() < f64::EPSILON {
                (y1, y2)
            } else {
                (
                    y1 + (y2 - y1) * (xx1 - x1) / dx,
                    y2 - (y2 - y1) * (x2 - xx2) / dx,
                )
            };
        (Point { x: xx1, y: yy1 }, Point { x: xx2, y: yy2 })
    }

    /// Position of the right-aligned amplitude label for `key` at time step
    /// `t`.
    pub fn state_label_anchor(&self, key: &BitString, t: usize) -> Point {
        let Point { x, y } = self.position(key, t);
        Point { x: x + self.w_label / 2.0 - self.config.font * 0.2, y }
    }

    /// The two strokes of the cross drawn over a vanished amplitude label.
    pub fn cross_out(&self, key: &BitString, t: usize) -> [(Point, Point); 2] {
        let Point { x, y } = self.position(key, t);
        let ys = self.config.font / 2.0 * 1.4;
        let xs = self.w_label / 2.0 * 0.7;
        let xf = self.config.font;
        [
            (Point { x: x + xf - xs, y: y - ys }, Point { x: x + xf + xs, y: y + ys }),
            (Point { x: x + xf - xs, y: y + ys }, Point { x: x + xf + xs, y: y - ys }),
        ]
    }

    /// Position of the centered gate label between time steps `t` and
    /// `t + 1`.
    pub fn transition_anchor(&self, t: usize) -> Point {
        Point {
            x: (t as f64 + 0.5) * self.config.w_time,
            y: self.mid_row() * self.config.h_state
                + self.config.font / 2.0
                + self.config.gate_font * 1.5,
        }
    }

    /// Scale applied to amplitude labels.
    pub fn label_scale(&self) -> f64 { self.config.font / BASE_FONTSIZE }

    /// Scale applied to gate labels.
    pub fn gate_scale(&self) -> f64 { self.config.gate_font / BASE_FONTSIZE }

    /// Visible region of a diagram with `steps` snapshots.
    pub fn bounds(&self, steps: usize) -> Bounds {
        let c = &self.config;
        let spans = steps.saturating_sub(1) as f64;
        let rows = (self.rows - 1) as f64;
        Bounds {
            x: -self.w_label / 2.0 + c.font,
            y: -rows / 2.0 * c.h_state - c.font * 1.5,
            w: spans * c.w_time + self.w_label - c.font * 0.5,
            h: rows * c.h_state + c.font * 2.0 + c.gate_font * 3.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> BitString { BitString::parse(s).unwrap() }

    fn close(a: f64, b: f64) -> bool { (a - b).abs() < 1e-9 }

    #[test]
    fn qubit_defaults() {
        let cfg = LayoutConfig::for_qubits(2);
        assert!(close(cfg.ws_label, 5.1));
        assert!(close(cfg.w_time, 121.2));
        assert_eq!(cfg.font, 12.0);
        assert_eq!(cfg.h_state, 40.0);
    }

    #[test]
    fn validation() {
        let cfg = LayoutConfig::default().with_font(0.0);
        assert!(matches!(cfg.validated(), Err(LayoutError::NonPositive("font", _))));
        let cfg = LayoutConfig::default().with_w_time(f64::NAN);
        assert!(matches!(cfg.validated(), Err(LayoutError::NonPositive("w_time", _))));
        let cfg = LayoutConfig::default().with_min_arrow_width(2.0);
        assert!(matches!(cfg.validated(), Err(LayoutError::NotAFraction(..))));
        let cfg = LayoutConfig::default().with_arrow_space(-1.0);
        assert!(matches!(cfg.validated(), Err(LayoutError::BadArrowSpace(_))));
    }

    #[test]
    fn arrow_space_is_clamped() {
        let cfg = LayoutConfig::default().with_arrow_space(10.0).validated().unwrap();
        assert_eq!(cfg.arrow_space, 3.0);
        let layout = LayoutConfig::default().with_arrow_space(10.0).layout(1).unwrap();
        assert_eq!(layout.arrow_off(), 36.0 * 3.0);
    }

    #[test]
    fn positions() {
        let layout = LayoutConfig::default().layout(2).unwrap();
        assert_eq!(layout.rows(), 4);
        assert_eq!(layout.position(&key("00"), 0), Point { x: 0.0, y: 60.0 });
        assert_eq!(layout.position(&key("10"), 1), Point { x: 120.0, y: 20.0 });
        assert_eq!(layout.position(&key("11"), 2), Point { x: 240.0, y: -60.0 });
        let anchor = layout.state_label_anchor(&key("01"), 0);
        assert!(close(anchor.x, 33.6) && close(anchor.y, -20.0));
        assert_eq!(layout.transition_anchor(1), Point { x: 180.0, y: 90.0 });
    }

    #[test]
    fn arrows() {
        let layout = LayoutConfig::default().layout(1).unwrap();
        // w_label = 72, arrow_off = 36
        let (a, b) = layout.arrow_endpoints(&key("0"), &key("0"), 0);
        assert_eq!(a, Point { x: 36.0, y: 20.0 });
        assert_eq!(b, Point { x: 84.0, y: 20.0 });
        let (a, b) = layout.arrow_endpoints(&key("0"), &key("1"), 2);
        assert_eq!((a.x, b.x), (276.0, 324.0));
        assert_eq!((a.y, b.y), (20.0, -20.0));

        let layout = LayoutConfig::default().with_arrow_space(0.5).layout(1).unwrap();
        // arrow_off = 18, so the arrow spans x in [36, 84] on a line from
        // (18, 20) to (102, -20)
        let (a, b) = layout.arrow_endpoints(&key("0"), &key("1"), 0);
        assert!(close(a.x, 36.0) && close(b.x, 84.0));
        assert!(close(a.y, 20.0 - 40.0 * 18.0 / 84.0));
        assert!(close(b.y, -20.0 + 40.0 * 18.0 / 84.0));
    }

    #[test]
    fn degenerate_arrow() {
        let layout
            = LayoutConfig::default()
            .with_w_time(72.0)
            .layout(1)
            .unwrap();
        let (a, b) = layout.arrow_endpoints(&key("0"), &key("1"), 0);
        assert!(a.y.is_finite() && b.y.is_finite());
        assert_eq!((a.y, b.y), (20.0, -20.0));
    }

    #[test]
    fn cross_out() {
        let layout = LayoutConfig::default().layout(1).unwrap();
        let [(a, b), (c, d)] = layout.cross_out(&key("0"), 0);
        assert!(close(a.x, 12.0 - 25.2) && close(a.y, 20.0 - 8.4));
        assert!(close(b.x, 12.0 + 25.2) && close(b.y, 20.0 + 8.4));
        assert!(close(c.y, b.y) && close(d.y, a.y));
    }

    #[test]
    fn bounds() {
        let layout = LayoutConfig::default().layout(2).unwrap();
        let b = layout.bounds(3);
        assert_eq!(b.x, -36.0 + 12.0);
        assert_eq!(b.y, -60.0 - 18.0);
        assert_eq!(b.w, 240.0 + 72.0 - 6.0);
        assert_eq!(b.h, 120.0 + 24.0 + 48.0);
        assert_eq!(layout.label_scale(), 1.0);
        assert!(close(layout.gate_scale(), 4.0 / 3.0));
    }
}
