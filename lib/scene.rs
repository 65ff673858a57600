//! Drawing primitives, the append-only [`Scene`] that collects them, and the
//! [`Drawing`] snapshot that can be written out as SVG, PNG, or PDF.
//!
//! Scene coordinates have *y* pointing up; the flip to SVG's downward *y* axis
//! happens only when a [`Drawing`] is serialized. PNG and PDF output pipe the
//! SVG through an external converter program (`rsvg-convert` by default, or
//! whatever `FEYNMAN_PATH_SVG_CONVERTER` names).

use std::{
    env,
    fmt,
    fs,
    io::{ self, Write },
    path::Path,
    process::{ Command, Stdio },
    rc::Rc,
    thread,
};
use itertools::Itertools;
use thiserror::Error;
use tracing::debug;
use crate::{
    label::Label,
    style::Rgb,
    vizdefs::{
        ARROW_HEAD,
        BASE_FONTSIZE,
        FONT,
        SVG_CONVERTER,
        SVG_CONVERTER_VAR,
    },
};

#[derive(Debug, Error)]
pub enum DrawError {
    #[error("I/O error: {0}")]
    IOError(#[from] std::io::Error),

    /// Returned when the converter program cannot be started.
    #[error("failed to run '{program}': {source}")]
    ConverterSpawn { program: String, source: std::io::Error },

    /// Returned when the converter program exits unsuccessfully.
    #[error("'{program}' exited with {status}: {stderr}")]
    ConverterFailed { program: String, status: std::process::ExitStatus, stderr: String },

    /// Returned for non-positive or non-finite PNG scale factors.
    #[error("invalid pixel scale {0}")]
    BadScale(f64),
}
pub type DrawResult<T> = Result<T, DrawError>;

/// A point in scene coordinates.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// An axis-aligned rectangle; (`x`, `y`) is its lower-left corner.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

/// Horizontal alignment of a label relative to its position.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Anchor {
    Start,
    #[default]
    Middle,
    End,
}

impl Anchor {
    fn svg(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Middle => "middle",
            Self::End => "end",
        }
    }
}

/// A single drawn element.
#[derive(Clone, Debug, PartialEq)]
pub enum Primitive {
    /// A straight arrow with its head at `to`.
    Arrow { from: Point, to: Point, color: Rgb, width: f64 },
    /// A rendered label, vertically centered on `at`.
    Label { at: Point, label: Rc<Label>, scale: f64, anchor: Anchor },
    /// A plain line segment.
    Line { from: Point, to: Point, color: Rgb, width: f64 },
}

/// An append-only collection of primitives.
#[derive(Clone, Debug, Default)]
pub struct Scene {
    primitives: Vec<Primitive>,
}

impl Scene {
    /// Create a new, empty scene.
    pub fn new() -> Self { Self::default() }

    /// Append a primitive.
    pub fn push(&mut self, prim: Primitive) { self.primitives.push(prim); }

    /// Return the number of primitives.
    pub fn len(&self) -> usize { self.primitives.len() }

    /// Return `true` if nothing has been drawn.
    pub fn is_empty(&self) -> bool { self.primitives.is_empty() }

    /// Return all primitives in drawing order.
    pub fn primitives(&self) -> &[Primitive] { &self.primitives }

    /// Count the arrows.
    pub fn count_arrows(&self) -> usize {
        self.primitives.iter()
            .filter(|p| matches!(p, Primitive::Arrow { .. }))
            .count()
    }

    /// Count the labels.
    pub fn count_labels(&self) -> usize {
        self.primitives.iter()
            .filter(|p| matches!(p, Primitive::Label { .. }))
            .count()
    }

    /// Count the plain lines.
    pub fn count_lines(&self) -> usize {
        self.primitives.iter()
            .filter(|p| matches!(p, Primitive::Line { .. }))
            .count()
    }

    /// Freeze the current contents within `bounds`.
    pub fn to_drawing(&self, bounds: Bounds) -> Drawing {
        Drawing { bounds, primitives: self.primitives.clone() }
    }
}

/// An immutable, size-bounded rendering of a [`Scene`].
///
/// The [`Display`][fmt::Display] implementation writes a standalone SVG
/// document.
#[derive(Clone, Debug, PartialEq)]
pub struct Drawing {
    pub bounds: Bounds,
    pub primitives: Vec<Primitive>,
}

// compact decimal output: at most 3 places, no trailing zeros
fn num(x: f64) -> String {
    let s = format!("{:.3}", x);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}

fn marker_id(color: Rgb) -> String {
    format!("arrow-{:02x}{:02x}{:02x}", color.0, color.1, color.2)
}

impl Drawing {
    /// Colors of all arrows, in order of first appearance.
    pub fn arrow_colors(&self) -> Vec<Rgb> {
        self.primitives.iter()
            .filter_map(|p| match p {
                Primitive::Arrow { color, .. } => Some(*color),
                _ => None,
            })
            .unique()
            .collect()
    }

    /// Write `self` as SVG to `path`.
    pub fn save_svg<P>(&self, path: P) -> DrawResult<()>
    where P: AsRef<Path>
    {
        fs::OpenOptions::new()
            .write(true)
            .append(false)
            .create(true)
            .truncate(true)
            .open(path)?
            .write_all(format!("{}", self).as_bytes())?;
        Ok(())
    }

    /// Write `self` as a PNG image to `path`, with `scale` pixels per unit.
    pub fn save_png<P>(&self, path: P, scale: f64) -> DrawResult<()>
    where P: AsRef<Path>
    {
        if !scale.is_finite() || scale <= 0.0 { return Err(DrawError::BadScale(scale)); }
        let bytes = self.convert(&["--format", "png", "--zoom", &scale.to_string()])?;
        write_bytes(path, &bytes)
    }

    /// Write `self` as a PDF document to `path`.
    pub fn save_pdf<P>(&self, path: P) -> DrawResult<()>
    where P: AsRef<Path>
    {
        let bytes = self.convert(&["--format", "pdf"])?;
        write_bytes(path, &bytes)
    }

    // pipe the SVG through the converter and collect its output
    fn convert(&self, args: &[&str]) -> DrawResult<Vec<u8>> {
        let program
            = env::var(SVG_CONVERTER_VAR)
            .unwrap_or_else(|_| SVG_CONVERTER.to_string());
        self.convert_with(&program, args)
    }

    fn convert_with(&self, program: &str, args: &[&str]) -> DrawResult<Vec<u8>> {
        let mut child
            = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| DrawError::ConverterSpawn {
                program: program.to_string(),
                source,
            })?;
        // the converter may fill its stdout before it has read all of its
        // input, so stdin is fed from its own thread while output is drained
        let svg = self.to_string().into_bytes();
        let writer
            = child.stdin.take()
            .map(|mut stdin| thread::spawn(move || stdin.write_all(&svg)));
        let output = child.wait_with_output()?;
        let written
            = match writer {
                Some(handle) => handle.join()
                    .unwrap_or_else(|_| {
                        Err(io::Error::new(io::ErrorKind::Other, "stdin writer panicked"))
                    }),
                None => Ok(()),
            };
        if !output.status.success() {
            return Err(DrawError::ConverterFailed {
                program: program.to_string(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        written?;
        debug!(program, bytes = output.stdout.len(), "converted drawing");
        Ok(output.stdout)
    }
}

fn write_bytes<P>(path: P, bytes: &[u8]) -> DrawResult<()>
where P: AsRef<Path>
{
    fs::OpenOptions::new()
        .write(true)
        .append(false)
        .create(true)
        .truncate(true)
        .open(path)?
        .write_all(bytes)?;
    Ok(())
}

impl fmt::Display for Drawing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Bounds { x, y, w, h } = self.bounds;
        writeln!(f, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>")?;
        writeln!(f,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" \
            width=\"{w}\" height=\"{h}\" viewBox=\"{x} {y} {w} {h}\">",
            w = num(w),
            h = num(h),
            x = num(x),
            y = num(-(y + h)),
        )?;
        writeln!(f, "<defs>")?;
        for color in self.arrow_colors() {
            // 1 marker unit = ARROW_HEAD stroke widths; the head is 1 unit long
            writeln!(f,
                "<marker id=\"{id}\" viewBox=\"-0.1 -0.5 1.2 1\" \
                refX=\"0.5\" refY=\"0\" markerWidth=\"{mw}\" \
                markerHeight=\"{mh}\" markerUnits=\"strokeWidth\" \
                orient=\"auto\">\
                <path d=\"M 0 -0.5 L 1 0 L 0 0.5 Z\" fill=\"{color}\"/>\
                </marker>",
                id = marker_id(color),
                mw = num(ARROW_HEAD * 1.2),
                mh = num(ARROW_HEAD),
                color = color,
            )?;
        }
        writeln!(f, "</defs>")?;
        writeln!(f, "<g font-family=\"{}\">", FONT)?;
        for prim in self.primitives.iter() {
            match prim {
                Primitive::Arrow { from, to, color, width } => {
                    // stop the shaft inside the head so it doesn't poke out
                    // past the tip
                    let (dx, dy) = (to.x - from.x, to.y - from.y);
                    let len = (dx * dx + dy * dy).sqrt();
                    let pull = (ARROW_HEAD * width / 2.0).min(len);
                    let (ex, ey)
                        = if len > 0.0 {
                            (to.x - dx / len * pull, to.y - dy / len * pull)
                        } else {
                            (to.x, to.y)
                        };
                    writeln!(f,
                        "<path d=\"M {} {} L {} {}\" stroke=\"{}\" \
                        stroke-width=\"{}\" fill=\"none\" \
                        marker-end=\"url(#{})\"/>",
                        num(from.x), num(-from.y), num(ex), num(-ey),
                        color, num(*width), marker_id(*color),
                    )?;
                },
                Primitive::Label { at, label, scale, anchor } => {
                    writeln!(f,
                        "<text x=\"{}\" y=\"{}\" font-size=\"{}\" \
                        text-anchor=\"{}\" dominant-baseline=\"central\">{}</text>",
                        num(at.x), num(-at.y), num(BASE_FONTSIZE * scale),
                        anchor.svg(), label.markup,
                    )?;
                },
                Primitive::Line { from, to, color, width } => {
                    writeln!(f,
                        "<line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" \
                        stroke=\"{}\" stroke-width=\"{}\"/>",
                        num(from.x), num(-from.y), num(to.x), num(-to.y),
                        color, num(*width),
                    )?;
                },
            }
        }
        writeln!(f, "</g>")?;
        write!(f, "</svg>")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::label::{ LabelRenderer, TextRenderer };
    use super::*;

    fn sample() -> Scene {
        let label = Rc::new(TextRenderer.render("$1\\ket{0}$").unwrap());
        let mut scene = Scene::new();
        scene.push(Primitive::Label {
            at: Point { x: 33.6, y: 0.0 },
            label,
            scale: 1.0,
            anchor: Anchor::End,
        });
        scene.push(Primitive::Arrow {
            from: Point { x: 36.0, y: 20.0 },
            to: Point { x: 84.0, y: 20.0 },
            color: Rgb(0x22, 0x66, 0xff),
            width: 3.0,
        });
        scene.push(Primitive::Arrow {
            from: Point { x: 36.0, y: 20.0 },
            to: Point { x: 84.0, y: -20.0 },
            color: Rgb(0xee, 0x77, 0x00),
            width: 1.5,
        });
        scene.push(Primitive::Arrow {
            from: Point { x: 36.0, y: -20.0 },
            to: Point { x: 84.0, y: -20.0 },
            color: Rgb(0x22, 0x66, 0xff),
            width: 1.5,
        });
        scene.push(Primitive::Line {
            from: Point { x: 0.0, y: 0.0 },
            to: Point { x: 10.0, y: 10.0 },
            color: Rgb(0xff, 0x00, 0x00),
            width: 1.0,
        });
        scene
    }

    #[test]
    fn numbers() {
        assert_eq!(num(1.0), "1");
        assert_eq!(num(-0.0001), "0");
        assert_eq!(num(2.5), "2.5");
        assert_eq!(num(-33.6), "-33.6");
        assert_eq!(num(1.23456), "1.235");
    }

    #[test]
    fn scene_counts() {
        let scene = sample();
        assert_eq!(scene.len(), 5);
        assert_eq!(scene.count_arrows(), 3);
        assert_eq!(scene.count_labels(), 1);
        assert_eq!(scene.count_lines(), 1);
    }

    #[test]
    fn svg_output() {
        let bounds = Bounds { x: -24.0, y: -38.0, w: 186.0, h: 92.0 };
        let drawing = sample().to_drawing(bounds);
        assert_eq!(
            drawing.arrow_colors(),
            [Rgb(0x22, 0x66, 0xff), Rgb(0xee, 0x77, 0x00)],
        );
        let svg = drawing.to_string();
        assert!(svg.starts_with("<?xml"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("viewBox=\"-24 -54 186 92\""));
        assert_eq!(svg.matches("<marker ").count(), 2);
        assert!(svg.contains("id=\"arrow-2266ff\""));
        assert!(svg.contains("marker-end=\"url(#arrow-ee7700)\""));
        // first arrow: horizontal, shaft pulled back 6 units, y flipped
        assert!(svg.contains("d=\"M 36 -20 L 78 -20\""));
        assert!(svg.contains("text-anchor=\"end\""));
        assert!(svg.contains(">1|0⟩</text>"));
        assert!(svg.contains("<line x1=\"0\" y1=\"0\" x2=\"10\" y2=\"-10\""));
        // rendering is repeatable
        assert_eq!(svg, drawing.to_string());
    }

    #[test]
    fn save_svg() {
        let drawing = sample().to_drawing(Bounds::default());
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.svg");
        drawing.save_svg(&path).unwrap();
        let read = fs::read_to_string(&path).unwrap();
        assert_eq!(read, drawing.to_string());
        // existing files are overwritten
        drawing.save_svg(&path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), read);
    }

    #[cfg(unix)]
    #[test]
    fn converter_pipes_large_drawings() {
        let mut scene = Scene::new();
        for k in 0..20_000 {
            let y = k as f64;
            scene.push(Primitive::Line {
                from: Point { x: 0.0, y },
                to: Point { x: 100.0, y },
                color: Rgb(0x44, 0x44, 0x44),
                width: 1.0,
            });
        }
        let drawing = scene.to_drawing(Bounds::default());
        let svg = drawing.to_string();
        assert!(svg.len() > 1 << 20);
        let out = drawing.convert_with("cat", &[]).unwrap();
        assert_eq!(out, svg.into_bytes());
    }

    #[cfg(unix)]
    #[test]
    fn converter_errors() {
        let drawing = sample().to_drawing(Bounds::default());
        let res = drawing.convert_with("feynman-path-no-such-converter", &[]);
        assert!(matches!(res, Err(DrawError::ConverterSpawn { .. })));
        let res = drawing.convert_with("false", &[]);
        assert!(matches!(res, Err(DrawError::ConverterFailed { .. })));
        let res
            = drawing.convert_with(
                "sh", &["-c", "cat > /dev/null; echo 'bad input' >&2; exit 3"]);
        match res {
            Err(DrawError::ConverterFailed { status, stderr, .. }) => {
                assert_eq!(status.code(), Some(3));
                assert_eq!(stderr, "bad input");
            },
            _ => panic!("expected converter failure"),
        }
    }

    #[test]
    fn bad_scale() {
        let drawing = sample().to_drawing(Bounds::default());
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("never-written.png");
        assert!(matches!(drawing.save_png(&path, 0.0), Err(DrawError::BadScale(_))));
        assert!(matches!(drawing.save_png(&path, f64::NAN), Err(DrawError::BadScale(_))));
        assert!(!path.exists());
    }
}
