use crate::style::Rgb;

pub const FONT: &str = "DejaVu Serif, Times New Roman, serif";
pub const BASE_FONTSIZE: f64 = 12.0; // px; labels are scaled relative to this
pub const ARROW_STROKE: f64 = 3.0; // px at unit magnitude
pub const ARROW_HEAD: f64 = 4.0; // marker scale, in stroke widths
pub const CROSS_STROKE: f64 = 1.0; // px

pub const BLUE  : Rgb = Rgb(0x22, 0x66, 0xff); // real positive
pub const ORANGE: Rgb = Rgb(0xee, 0x77, 0x00); // everything else
pub const RED   : Rgb = Rgb(0xff, 0x00, 0x00); // cross-outs

// color wheel: hue of BLUE at phase 0, saturation grows with magnitude
pub const HUE_OFFSET: f64 = 221.538_461_538_461_5; // deg
pub const MIN_SAT: f64 = 0.25;
pub const MAX_SAT: f64 = 0.866_666_666_666_666_7;

pub const SVG_CONVERTER: &str = "rsvg-convert";
pub const SVG_CONVERTER_VAR: &str = "FEYNMAN_PATH_SVG_CONVERTER";
