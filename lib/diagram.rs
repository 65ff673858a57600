//! Path sum diagrams.
//!
//! A [`Diagram`] owns a [`StateSequence`] and the [`Scene`] drawn from it.
//! Every gate application draws one arrow per branch transition, a gate label
//! above the arrows, and an amplitude label for every entry of the new
//! snapshot (crossed out if the entry vanished) before the vanished entries
//! are pruned from the stored state. Nothing drawn is ever removed, so a
//! diagram can be [drawn][Diagram::draw] at any point and again after more
//! gates have been applied.
//!
//! ```
//! use feynman_path::{ diagram::Diagram, config::LayoutConfig, label::LabelCache };
//!
//! let labels = LabelCache::default();
//! let mut diagram
//!     = Diagram::new(2, None, LayoutConfig::for_qubits(2), &labels).unwrap();
//! for token in ["h0", "cnot0,1"] {
//!     diagram.apply_token(token, None).unwrap();
//! }
//! let svg = diagram.draw().to_string();
//! assert!(svg.contains("|11⟩"));
//! ```

use thiserror::Error;
use crate::{
    amplitude::Amplitude,
    angle::Angle,
    config::{ Layout, LayoutConfig, LayoutError },
    gate::{ Gate, GateError, GateSpec },
    label::{ LabelCache, LabelError },
    scene::{ Anchor, Drawing, Primitive, Scene },
    state::{ BitString, Snapshot, StateError, StateSequence, Transition },
    style::{ arrow_color, arrow_width },
    vizdefs::{ CROSS_STROKE, RED },
};

#[derive(Debug, Error)]
pub enum DiagramError {
    #[error(transparent)]
    Gate(#[from] GateError),

    #[error(transparent)]
    State(#[from] StateError),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    Label(#[from] LabelError),
}
pub type DiagramResult<T> = Result<T, DiagramError>;

/// Return the LaTeX label for amplitude `amp` on basis state `key`.
pub fn state_latex(amp: &Amplitude, key: &BitString) -> String {
    format!("${}\\ket{{{}}}$", amp.latex_factor(), key)
}

/// A path sum diagram under construction.
#[derive(Debug)]
pub struct Diagram<'c> {
    layout: Layout,
    states: StateSequence,
    scene: Scene,
    labels: &'c LabelCache,
}

impl<'c> Diagram<'c> {
    /// Create a new diagram on `n_qubits` qubits, starting from `init` (or
    /// the all-zero state), and draw the initial amplitude labels.
    pub fn new(
        n_qubits: usize,
        init: Option<Snapshot>,
        config: LayoutConfig,
        labels: &'c LabelCache,
    ) -> DiagramResult<Self>
    {
        let states = StateSequence::new(n_qubits, init)?;
        let layout = config.layout(n_qubits)?;
        let mut diagram = Self { layout, states, scene: Scene::new(), labels };
        let init = diagram.states.latest().clone();
        diagram.draw_states(&init, 0)?;
        Ok(diagram)
    }

    /// Return the number of qubits.
    pub fn n_qubits(&self) -> usize { self.states.n_qubits() }

    /// Return the current time step, i.e. the number of gates applied.
    pub fn time(&self) -> usize { self.states.time() }

    /// Return the stored (pruned) snapshots.
    pub fn states(&self) -> &StateSequence { &self.states }

    /// Return the latest stored snapshot.
    pub fn latest(&self) -> &Snapshot { self.states.latest() }

    /// Return everything drawn so far.
    pub fn scene(&self) -> &Scene { &self.scene }

    /// Return the geometry in use.
    pub fn layout(&self) -> &Layout { &self.layout }

    fn draw_states(&mut self, snapshot: &Snapshot, t: usize) -> DiagramResult<()> {
        let scale = self.layout.label_scale();
        for (key, amp) in snapshot.iter() {
            let label = self.labels.get(&state_latex(amp, key))?;
            self.scene.push(Primitive::Label {
                at: self.layout.state_label_anchor(key, t),
                label,
                scale,
                anchor: Anchor::End,
            });
            if amp.is_negligible() {
                for (from, to) in self.layout.cross_out(key, t) {
                    self.scene.push(Primitive::Line {
                        from,
                        to,
                        color: RED,
                        width: CROSS_STROKE,
                    });
                }
            }
        }
        Ok(())
    }

    fn draw_arrow(&mut self, transition: &Transition, t: usize) {
        let config = self.layout.config();
        let (from, to)
            = self.layout.arrow_endpoints(&transition.source, &transition.dest, t);
        self.scene.push(Primitive::Arrow {
            from,
            to,
            color: arrow_color(&transition.coeff, config.color_scheme),
            width: arrow_width(&transition.coeff, config.min_arrow_width),
        });
    }

    /// Apply `gate`, drawing its arrows and labels.
    pub fn apply(&mut self, gate: &Gate) -> DiagramResult<()> {
        self.apply_styled(gate, "")
    }

    /// Like [`apply`][Self::apply], but prefix the gate label with
    /// `pre_latex`, e.g. `\color{red!80!black}` to highlight the gate.
    pub fn apply_styled(&mut self, gate: &Gate, pre_latex: &str)
        -> DiagramResult<()>
    {
        let t = self.states.time();
        // render the only caller-controlled label before touching the state
        let gate_label
            = self.labels.get(&format!("${}{}$", pre_latex, gate.latex()))?;
        let evolution = self.states.apply(gate)?;
        for transition in evolution.transitions.iter() {
            self.draw_arrow(transition, t);
        }
        self.scene.push(Primitive::Label {
            at: self.layout.transition_anchor(t),
            label: gate_label,
            scale: self.layout.gate_scale(),
            anchor: Anchor::Middle,
        });
        self.draw_states(&evolution.next, t + 1)?;
        Ok(())
    }

    /// Parse and apply a gate token such as `h0` or `cnot0,1`.
    pub fn apply_token(&mut self, token: &str, angle: Option<Angle>)
        -> DiagramResult<()>
    {
        let gate = Gate::parse(token, angle)?;
        self.apply(&gate)
    }

    /// Apply the gate described by `spec`.
    pub fn apply_spec(&mut self, spec: &GateSpec) -> DiagramResult<()> {
        let gate = Gate::from_spec(spec)?;
        self.apply(&gate)
    }

    /// Snapshot the current drawing, sized for the current number of time
    /// steps.
    pub fn draw(&self) -> Drawing {
        self.scene.to_drawing(self.layout.bounds(self.states.len()))
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        scene::{ Bounds, Point },
        style::{ ColorScheme, Rgb },
        vizdefs::{ BLUE, ORANGE },
    };
    use super::*;

    fn key(s: &str) -> BitString { BitString::parse(s).unwrap() }

    fn labels_of(scene: &Scene) -> Vec<String> {
        scene.primitives().iter()
            .filter_map(|p| match p {
                Primitive::Label { label, .. } => Some(label.latex.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn initial_labels() {
        let cache = LabelCache::default();
        let diagram = Diagram::new(2, None, LayoutConfig::default(), &cache).unwrap();
        assert_eq!(diagram.time(), 0);
        assert_eq!(diagram.scene().count_labels(), 1);
        assert_eq!(diagram.scene().count_arrows(), 0);
        assert_eq!(labels_of(diagram.scene()), ["$1\\ket{00}$"]);

        let init = Snapshot::from_strs(
            1,
            [("0", Amplitude::FRAC_1_SQRT_2), ("1", -Amplitude::FRAC_1_SQRT_2)],
        ).unwrap();
        let diagram
            = Diagram::new(1, Some(init), LayoutConfig::default(), &cache).unwrap();
        assert_eq!(
            labels_of(diagram.scene()),
            ["$\\frac{1}{\\sqrt{2}}\\ket{0}$", "$-\\frac{1}{\\sqrt{2}}\\ket{1}$"],
        );
    }

    #[test]
    fn draw_order() {
        let cache = LabelCache::default();
        let mut diagram
            = Diagram::new(1, None, LayoutConfig::default(), &cache).unwrap();
        diagram.apply(&Gate::H(0)).unwrap();
        let prims = diagram.scene().primitives();
        assert_eq!(prims.len(), 1 + 2 + 1 + 2);
        assert!(matches!(prims[0], Primitive::Label { anchor: Anchor::End, .. }));
        assert!(matches!(prims[1], Primitive::Arrow { .. }));
        assert!(matches!(prims[2], Primitive::Arrow { .. }));
        assert!(matches!(prims[3], Primitive::Label { anchor: Anchor::Middle, .. }));
        assert!(matches!(prims[4], Primitive::Label { anchor: Anchor::End, .. }));
        assert_eq!(
            labels_of(diagram.scene())[1..],
            [
                "$H_{0}$",
                "$\\frac{1}{\\sqrt{2}}\\ket{0}$",
                "$\\frac{1}{\\sqrt{2}}\\ket{1}$",
            ],
        );
        match &prims[1] {
            Primitive::Arrow { from, to, .. } => {
                assert_eq!(*from, Point { x: 36.0, y: 20.0 });
                assert_eq!(*to, Point { x: 84.0, y: 20.0 });
            },
            _ => unreachable!(),
        }
    }

    #[test]
    fn cross_out_then_prune() {
        let cache = LabelCache::default();
        let mut diagram
            = Diagram::new(1, None, LayoutConfig::default(), &cache).unwrap();
        for g in ["h0", "z0"] { diagram.apply_token(g, None).unwrap(); }
        assert_eq!(diagram.scene().count_lines(), 0);
        diagram.apply_token("h0", None).unwrap();
        assert_eq!(diagram.scene().count_lines(), 2);
        assert!(labels_of(diagram.scene()).contains(&"$0\\ket{0}$".to_string()));
        assert_eq!(diagram.latest().len(), 1);
        assert!(!diagram.latest().contains(&key("0")));

        // the pruned entry sends no arrows on the next gate
        let arrows = diagram.scene().count_arrows();
        diagram.apply_token("x0", None).unwrap();
        assert_eq!(diagram.scene().count_arrows(), arrows + 1);
    }

    #[test]
    fn two_tone_colors() {
        let cache = LabelCache::default();
        let config = LayoutConfig::default().with_color_scheme(ColorScheme::TwoTone);
        let init = Snapshot::from_strs(1, [("1", Amplitude::ONE)]).unwrap();
        let mut diagram = Diagram::new(1, Some(init), config, &cache).unwrap();
        diagram.apply(&Gate::H(0)).unwrap();
        let colors: Vec<Rgb>
            = diagram.scene().primitives().iter()
            .filter_map(|p| match p {
                Primitive::Arrow { color, .. } => Some(*color),
                _ => None,
            })
            .collect();
        assert_eq!(colors, [BLUE, ORANGE]);
    }

    #[test]
    fn styled_gate_label() {
        let cache = LabelCache::default();
        let mut diagram
            = Diagram::new(2, None, LayoutConfig::for_qubits(2), &cache).unwrap();
        diagram.apply_styled(&Gate::Cnot(0, 1), "\\color{red!80!black}").unwrap();
        assert!(labels_of(diagram.scene())
            .contains(&"$\\color{red!80!black}CNOT_{01}$".to_string()));
        // a bad style fails before the state advances
        assert!(matches!(
            diagram.apply_styled(&Gate::H(0), "\\color{mauve}"),
            Err(DiagramError::Label(_)),
        ));
        assert_eq!(diagram.time(), 1);
    }

    #[test]
    fn drawing_grows_monotonically() {
        let cache = LabelCache::default();
        let mut diagram
            = Diagram::new(2, None, LayoutConfig::default(), &cache).unwrap();
        let mut prev = diagram.draw();
        for g in ["h0", "h1", "cnot0,1", "h0", "h1"] {
            diagram.apply_token(g, None).unwrap();
            let next = diagram.draw();
            assert!(next.primitives.len() > prev.primitives.len());
            assert_eq!(next.primitives[..prev.primitives.len()], prev.primitives[..]);
            assert!(next.bounds.w > prev.bounds.w);
            assert_eq!(next.bounds.h, prev.bounds.h);
            prev = next;
        }
        assert_eq!(diagram.draw(), diagram.draw());
        assert_eq!(diagram.states().len(), 6);
    }

    #[test]
    fn bounds() {
        let cache = LabelCache::default();
        let mut diagram
            = Diagram::new(2, None, LayoutConfig::default(), &cache).unwrap();
        diagram.apply_token("h0", None).unwrap();
        diagram.apply_token("h1", None).unwrap();
        assert_eq!(
            diagram.draw().bounds,
            Bounds { x: -24.0, y: -78.0, w: 306.0, h: 192.0 },
        );
    }

    #[test]
    fn rotations() {
        let cache = LabelCache::default();
        let mut diagram
            = Diagram::new(1, None, LayoutConfig::default(), &cache).unwrap();
        diagram.apply_spec(&GateSpec::rotation("rz0", Angle::pi())).unwrap();
        assert_eq!(diagram.latest().amplitude(&key("0")), -Amplitude::I);
        assert!(labels_of(diagram.scene())
            .contains(&"$R_{z,0}(\\pi)$".to_string()));
        assert!(labels_of(diagram.scene()).contains(&"$-i\\ket{0}$".to_string()));
    }

    #[test]
    fn errors() {
        let cache = LabelCache::default();
        assert!(matches!(
            Diagram::new(0, None, LayoutConfig::default(), &cache),
            Err(DiagramError::State(StateError::QubitCount(0))),
        ));
        assert!(matches!(
            Diagram::new(1, None, LayoutConfig::default().with_h_state(-1.0), &cache),
            Err(DiagramError::Layout(_)),
        ));
        let mut diagram
            = Diagram::new(2, None, LayoutConfig::default(), &cache).unwrap();
        assert!(matches!(
            diagram.apply_token("t0", None),
            Err(DiagramError::Gate(GateError::UnsupportedGate(_))),
        ));
        assert!(matches!(
            diagram.apply_token("h3", None),
            Err(DiagramError::State(StateError::QubitOutOfRange { qubit: 3, .. })),
        ));
        assert_eq!(diagram.time(), 0);
        assert_eq!(diagram.scene().count_labels(), 1);
    }
}
