//! Conventional box-and-wire circuit diagrams, written as LaTeX source for the
//! [qcircuit] package.
//!
//! One-argument gates are drawn as boxes named after the gate. Two-argument
//! gates whose names begin with "C" are drawn as controlled gates: CNOT gets a
//! target mark, everything else a box on the target wire. Compiling the
//! resulting document is left to an external LaTeX toolchain.
//!
//! [qcircuit]: https://ctan.org/pkg/qcircuit

use thiserror::Error;
use crate::gate::{ GateError, GateToken };

#[derive(Debug, Error)]
pub enum CircuitError {
    #[error("unsupported circuit diagram gate '{0}'")]
    Unsupported(String),

    #[error("gate '{0}' targets qubit {1}, but the circuit only has {2}")]
    QubitOutOfRange(String, usize, usize),

    #[error(transparent)]
    Gate(#[from] GateError),
}
pub type CircuitResult<T> = Result<T, CircuitError>;
use CircuitError::*;

// capitalize the first letter
fn display_name(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Build the rows of a `\Qcircuit` environment for `n_qubits` qubits and
/// gate tokens like `h0` or `cnot0,1`, one row per qubit.
pub fn qcircuit_body<S>(n_qubits: usize, tokens: &[S]) -> CircuitResult<String>
where S: AsRef<str>
{
    let mut rows: Vec<String>
        = (0..n_qubits).map(|k| format!("\\lstick{{q_{{{}}}}}", k)).collect();
    for token in tokens.iter() {
        let token = GateToken::parse(token.as_ref())?;
        if let Some(&q) = token.args.iter().find(|q| **q >= n_qubits) {
            return Err(QubitOutOfRange(token.to_string(), q, n_qubits));
        }
        let name = display_name(&token.name);
        match token.args[..] {
            [q] => {
                for (k, row) in rows.iter_mut().enumerate() {
                    if k == q {
                        row.push_str(&format!(" & \\gate{{{}}}", name));
                    } else {
                        row.push_str(" & \\qw");
                    }
                }
            },
            [c, t] if name.to_uppercase().starts_with('C') && c != t => {
                let targ
                    = if name.to_uppercase() == "CNOT" {
                        " & \\targ".to_string()
                    } else {
                        format!(" & \\gate{{{}}}", name)
                    };
                let ctrl_len = t as i64 - c as i64;
                for (k, row) in rows.iter_mut().enumerate() {
                    if k == c {
                        row.push_str(&format!(" & \\ctrl{{{}}}", ctrl_len));
                    } else if k == t {
                        row.push_str(&targ);
                    } else {
                        row.push_str(" & \\qw");
                    }
                }
            },
            _ => { return Err(Unsupported(token.to_string())); },
        }
    }
    for row in rows.iter_mut() { row.push_str(" & \\qw \\\\"); }
    Ok(rows.join("\n"))
}

/// Wrap [`qcircuit_body`] in a standalone LaTeX document.
pub fn qcircuit_document<S>(n_qubits: usize, tokens: &[S]) -> CircuitResult<String>
where S: AsRef<str>
{
    let body = qcircuit_body(n_qubits, tokens)?;
    let doc = format!(
"\\documentclass[border={{22pt 6pt}}]{{standalone}}
\\usepackage[braket, qm]{{qcircuit}}
\\usepackage{{xcolor}}
\\begin{{document}}
\\Qcircuit @C=1em @R=0.5em @!R {{
{}
}}
\\end{{document}}
",
        body,
    );
    Ok(doc)
}
