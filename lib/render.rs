//! Batch rendering of gate sequences to files.
//!
//! A [`RenderJob`] renders either a path sum diagram or a box-and-wire circuit
//! for a list of gates. Output files are named `<name>.<ext>`; in sequence
//! mode, one file is written per prefix of the gate list (including the empty
//! prefix) as `<name>-NN.<ext>`; circuit renders append `-circuit` to the
//! name.

use std::{ fs, io::Write, path::{ Path, PathBuf } };
use itertools::Itertools;
use thiserror::Error;
use tracing::{ info, warn };
use crate::{
    circuit::{ qcircuit_document, CircuitError },
    config::LayoutConfig,
    diagram::{ Diagram, DiagramError, DiagramResult },
    gate::GateSpec,
    label::LabelCache,
    scene::DrawError,
};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Diagram(#[from] DiagramError),

    #[error(transparent)]
    Draw(#[from] DrawError),

    #[error(transparent)]
    Circuit(#[from] CircuitError),

    #[error("I/O error: {0}")]
    IOError(#[from] std::io::Error),
}
pub type RenderResult<T> = Result<T, RenderError>;

/// Output formats for path sum diagrams.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Formats {
    pub svg: bool,
    pub png: bool,
    pub pdf: bool,
}

impl Formats {
    /// SVG only.
    pub fn svg() -> Self { Self { svg: true, png: false, pdf: false } }

    /// Return `self`, falling back to SVG if nothing is selected.
    pub fn or_default_svg(self) -> Self {
        if self.svg || self.png || self.pdf { self } else { Self::svg() }
    }
}

/// Build a path sum diagram for `gates` with layout constants scaled for
/// `n_qubits`.
pub fn path_sum_diagram<'c>(
    n_qubits: usize,
    gates: &[GateSpec],
    labels: &'c LabelCache,
) -> DiagramResult<Diagram<'c>>
{
    let mut diagram
        = Diagram::new(n_qubits, None, LayoutConfig::for_qubits(n_qubits), labels)?;
    for spec in gates.iter() {
        diagram.apply_spec(spec)?;
    }
    Ok(diagram)
}

/// A batch of renders for one gate list.
#[derive(Clone, Debug)]
pub struct RenderJob {
    /// Base file name, without extension.
    pub name: String,
    pub n_qubits: usize,
    pub gates: Vec<GateSpec>,
    /// Render every prefix of `gates` as a numbered file.
    pub sequence: bool,
    /// Write a box-and-wire circuit as LaTeX instead of a path sum diagram.
    pub circuit: bool,
    pub formats: Formats,
    /// Pixels per unit for PNG output.
    pub scale: f64,
    pub out_dir: PathBuf,
}

impl RenderJob {
    /// Create a new job writing SVG files to the current directory.
    pub fn new<I, G>(name: &str, n_qubits: usize, gates: I) -> Self
    where
        I: IntoIterator<Item = G>,
        G: Into<GateSpec>,
    {
        Self {
            name: name.to_string(),
            n_qubits,
            gates: gates.into_iter().map(|g| g.into()).collect(),
            sequence: false,
            circuit: false,
            formats: Formats::default(),
            scale: 1.0,
            out_dir: PathBuf::from("."),
        }
    }

    pub fn with_sequence(mut self, sequence: bool) -> Self {
        self.sequence = sequence;
        self
    }

    pub fn with_circuit(mut self, circuit: bool) -> Self {
        self.circuit = circuit;
        self
    }

    pub fn with_formats(mut self, formats: Formats) -> Self {
        self.formats = formats;
        self
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_out_dir<P>(mut self, out_dir: P) -> Self
    where P: AsRef<Path>
    {
        self.out_dir = out_dir.as_ref().to_path_buf();
        self
    }

    /// Return the base name and gate list of every file set to be written.
    pub fn renders(&self) -> Vec<(String, &[GateSpec])> {
        let suffix = if self.circuit { "-circuit" } else { "" };
        if self.sequence {
            (0..=self.gates.len())
                .map(|k| {
                    (format!("{}-{:02}{}", self.name, k, suffix), &self.gates[..k])
                })
                .collect()
        } else {
            vec![(format!("{}{}", self.name, suffix), &self.gates[..])]
        }
    }

    /// Return the requested output formats that a circuit render can't
    /// produce.
    pub fn ignored_formats(&self) -> Vec<&'static str> {
        if !self.circuit { return Vec::new(); }
        [(self.formats.png, "png"), (self.formats.pdf, "pdf")].into_iter()
            .filter_map(|(requested, ext)| requested.then_some(ext))
            .collect()
    }

    /// Write all files, returning their paths in the order written.
    pub fn run(&self, labels: &LabelCache) -> RenderResult<Vec<PathBuf>> {
        let ignored = self.ignored_formats();
        if !ignored.is_empty() {
            warn!(
                name = %self.name,
                formats = %ignored.join(","),
                "circuit renders are written only as LaTeX source",
            );
        }
        let mut written: Vec<PathBuf> = Vec::new();
        for (name, gates) in self.renders() {
            let gates_str = gates.iter().join(" ");
            if self.circuit {
                let tokens: Vec<&str>
                    = gates.iter().map(|g| g.token.as_str()).collect();
                let doc = qcircuit_document(self.n_qubits, &tokens)?;
                let path = self.out_dir.join(format!("{}.tex", name));
                fs::OpenOptions::new()
                    .write(true)
                    .append(false)
                    .create(true)
                    .truncate(true)
                    .open(&path)?
                    .write_all(doc.as_bytes())?;
                info!(path = %path.display(), gates = %gates_str, "saved");
                written.push(path);
                continue;
            }
            let drawing = path_sum_diagram(self.n_qubits, gates, labels)?.draw();
            let formats = self.formats.or_default_svg();
            if formats.pdf {
                let path = self.out_dir.join(format!("{}.pdf", name));
                drawing.save_pdf(&path)?;
                info!(path = %path.display(), gates = %gates_str, "saved");
                written.push(path);
            }
            if formats.svg {
                let path = self.out_dir.join(format!("{}.svg", name));
                drawing.save_svg(&path)?;
                info!(path = %path.display(), gates = %gates_str, "saved");
                written.push(path);
            }
            if formats.png {
                let path = self.out_dir.join(format!("{}.png", name));
                drawing.save_png(&path, self.scale)?;
                info!(path = %path.display(), gates = %gates_str, "saved");
                written.push(path);
            }
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use crate::{ angle::Angle, state::BitString, amplitude::Amplitude };
    use super::*;

    #[test]
    fn naming() {
        let job = RenderJob::new("bell", 2, ["h0", "cnot0,1"]);
        let names: Vec<String> = job.renders().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["bell"]);

        let job = job.with_sequence(true);
        let renders = job.renders();
        let names: Vec<&str> = renders.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["bell-00", "bell-01", "bell-02"]);
        assert_eq!(renders[0].1.len(), 0);
        assert_eq!(renders[2].1.len(), 2);

        let job = job.with_circuit(true);
        let names: Vec<String> = job.renders().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["bell-00-circuit", "bell-01-circuit", "bell-02-circuit"]);
    }

    #[test]
    fn circuit_ignores_images() {
        let all = Formats { svg: true, png: true, pdf: true };
        let job = RenderJob::new("ent", 2, ["h0"]).with_formats(all);
        assert!(job.ignored_formats().is_empty());
        let job = job.with_circuit(true);
        assert_eq!(job.ignored_formats(), ["png", "pdf"]);
        let job = job.with_formats(Formats::svg());
        assert!(job.ignored_formats().is_empty());
        let job = job.with_formats(Formats { svg: false, png: false, pdf: true });
        assert_eq!(job.ignored_formats(), ["pdf"]);
    }

    #[test]
    fn default_format() {
        assert_eq!(Formats::default().or_default_svg(), Formats::svg());
        let png = Formats { svg: false, png: true, pdf: false };
        assert_eq!(png.or_default_svg(), png);
    }

    #[test]
    fn builds_diagram() {
        let labels = LabelCache::default();
        let gates = [
            GateSpec::new("h0"),
            GateSpec::new("cnot0,1"),
            GateSpec::rotation("rz1", Angle::pi2()),
        ];
        let diagram = path_sum_diagram(2, &gates, &labels).unwrap();
        assert_eq!(diagram.time(), 3);
        let h = Amplitude::FRAC_1_SQRT_2;
        let last = diagram.latest();
        let b00 = BitString::parse("00").unwrap();
        let b11 = BitString::parse("11").unwrap();
        assert_eq!(
            last.amplitude(&b00),
            h * Amplitude::from(crate::ring::DOmega::omega_pow(-1)),
        );
        assert_eq!(
            last.amplitude(&b11),
            h * Amplitude::from(crate::ring::DOmega::omega_pow(1)),
        );
        assert!(path_sum_diagram(2, &[GateSpec::new("q0")], &labels).is_err());
    }
}
