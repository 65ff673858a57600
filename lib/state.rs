//! Superposition snapshots and their evolution under gates.
//!
//! A [`Snapshot`] maps [`BitString`]s to [`Amplitude`]s, with entries kept in
//! insertion order so that everything derived from it (branch transitions,
//! drawn labels) comes out in a deterministic order. A [`StateSequence`] holds
//! one snapshot per time step and grows by one snapshot per gate.

use std::fmt;
use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::{ debug, trace };
use crate::{ amplitude::Amplitude, gate::Gate };

/// Largest number of qubits a state may have.
pub const MAX_QUBITS: usize = 16;

#[derive(Debug, Error)]
pub enum StateError {
    /// Returned when the number of qubits is zero or too large.
    #[error("number of qubits must be between 1 and 16, but got {0}")]
    QubitCount(usize),

    /// Returned when a bitstring contains characters other than `0` and `1`.
    #[error("malformed bitstring '{0}'")]
    BadBitString(String),

    /// Returned when a bitstring has the wrong number of qubits.
    #[error("expected a bitstring of {expected} qubit(s), but got {got}")]
    LengthMismatch { expected: usize, got: usize },

    /// Returned when a gate targets a qubit that does not exist.
    #[error("qubit index {qubit} out of range for {n_qubits} qubit(s)")]
    QubitOutOfRange { qubit: usize, n_qubits: usize },

    /// Returned when an explicit initial state has no entries.
    #[error("initial state must have at least one entry")]
    EmptyState,
}
pub type StateResult<T> = Result<T, StateError>;
use StateError::*;

fn check_qubit_count(n: usize) -> StateResult<()> {
    (1..=MAX_QUBITS).contains(&n).then_some(()).ok_or(QubitCount(n))
}

/// A basis state of a fixed number of qubits.
///
/// Bit *k* holds the value of qubit *k*, so the integer value of the bits
/// (with qubit 0 as the least significant digit) is the state's row in the
/// enumeration of all 2<sup>*n*</sup> basis states. Bitstrings are written
/// with qubit 0 first.
///
/// ```
/// # use feynman_path::state::BitString;
/// let b = BitString::parse("10").unwrap();
/// assert_eq!( b.index(), 1    );
/// assert!(    b.bit(0)        );
/// assert_eq!( b.flipped(1).to_string(), "11" );
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BitString {
    bits: u64,
    len: usize,
}

impl BitString {
    /// Return the all-zero bitstring on `len` qubits.
    pub fn zeros(len: usize) -> Self { Self { bits: 0, len } }

    /// Return the bitstring in row `index` of the enumeration on `len`
    /// qubits.
    pub fn from_index(index: usize, len: usize) -> Self {
        let mask = if len >= 64 { u64::MAX } else { (1_u64 << len) - 1 };
        Self { bits: index as u64 & mask, len }
    }

    /// Parse a string of `0`s and `1`s, qubit 0 first.
    pub fn parse(s: &str) -> StateResult<Self> {
        let s = s.trim();
        if s.is_empty() || s.len() > MAX_QUBITS {
            return Err(BadBitString(s.to_string()));
        }
        let bits
            = s.chars().enumerate()
            .try_fold(0_u64, |acc, (k, c)| {
                match c {
                    '0' => Ok(acc),
                    '1' => Ok(acc | (1 << k)),
                    _ => Err(BadBitString(s.to_string())),
                }
            })?;
        Ok(Self { bits, len: s.len() })
    }

    /// Return the number of qubits.
    pub fn len(&self) -> usize { self.len }

    /// Return `true` if `self` has no qubits.
    pub fn is_empty(&self) -> bool { self.len == 0 }

    /// Return the row index of `self` in the enumeration of basis states.
    pub fn index(&self) -> usize { self.bits as usize }

    /// Return the value of qubit `k`.
    pub fn bit(&self, k: usize) -> bool { (self.bits >> k) & 1 == 1 }

    /// Return a copy with qubit `k` set to `value`.
    pub fn with_bit(self, k: usize, value: bool) -> Self {
        let bits = if value { self.bits | (1 << k) } else { self.bits & !(1 << k) };
        Self { bits, len: self.len }
    }

    /// Return a copy with qubit `k` flipped.
    pub fn flipped(self, k: usize) -> Self {
        Self { bits: self.bits ^ (1 << k), len: self.len }
    }

    /// Iterate over all basis states on `len` qubits in row order.
    pub fn all(len: usize) -> impl Iterator<Item = Self> {
        (0..1_usize << len).map(move |idx| Self::from_index(idx, len))
    }
}

impl fmt::Display for BitString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for k in 0..self.len {
            write!(f, "{}", if self.bit(k) { '1' } else { '0' })?;
        }
        Ok(())
    }
}

impl std::str::FromStr for BitString {
    type Err = StateError;

    fn from_str(s: &str) -> StateResult<Self> { Self::parse(s) }
}

/// The full state at one time step.
#[derive(Clone, Debug)]
pub struct Snapshot {
    n_qubits: usize,
    entries: Vec<(BitString, Amplitude)>,
    index: FxHashMap<BitString, usize>,
}

impl Snapshot {
    /// Create a new, empty snapshot on `n_qubits` qubits.
    pub fn new(n_qubits: usize) -> StateResult<Self> {
        check_qubit_count(n_qubits)?;
        Ok(Self { n_qubits, entries: Vec::new(), index: FxHashMap::default() })
    }

    /// Create a snapshot with all amplitude on the all-zero bitstring.
    pub fn ground(n_qubits: usize) -> StateResult<Self> {
        let mut snapshot = Self::new(n_qubits)?;
        snapshot.accumulate(BitString::zeros(n_qubits), Amplitude::ONE)?;
        Ok(snapshot)
    }

    /// Create a snapshot from a list of entries. Repeated bitstrings have
    /// their amplitudes summed.
    pub fn from_entries<I>(n_qubits: usize, entries: I) -> StateResult<Self>
    where I: IntoIterator<Item = (BitString, Amplitude)>
    {
        let mut snapshot = Self::new(n_qubits)?;
        for (key, amp) in entries {
            snapshot.accumulate(key, amp)?;
        }
        if snapshot.is_empty() { return Err(EmptyState); }
        Ok(snapshot)
    }

    /// Create a snapshot from bitstrings written as text.
    pub fn from_strs<'a, I>(n_qubits: usize, entries: I) -> StateResult<Self>
    where I: IntoIterator<Item = (&'a str, Amplitude)>
    {
        let entries: Vec<(BitString, Amplitude)>
            = entries.into_iter()
            .map(|(s, amp)| BitString::parse(s).map(|b| (b, amp)))
            .collect::<StateResult<_>>()?;
        Self::from_entries(n_qubits, entries)
    }

    /// Return the number of qubits.
    pub fn n_qubits(&self) -> usize { self.n_qubits }

    /// Return the number of entries.
    pub fn len(&self) -> usize { self.entries.len() }

    /// Return `true` if there are no entries.
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// Add `amp` to the amplitude on `key`, appending a new entry if `key` is
    /// not already present.
    pub fn accumulate(&mut self, key: BitString, amp: Amplitude)
        -> StateResult<()>
    {
        if key.len() != self.n_qubits {
            return Err(LengthMismatch { expected: self.n_qubits, got: key.len() });
        }
        if let Some(&k) = self.index.get(&key) {
            self.entries[k].1 += amp;
        } else {
            self.index.insert(key, self.entries.len());
            self.entries.push((key, amp));
        }
        Ok(())
    }

    /// Return the amplitude on `key`, if there is an entry for it.
    pub fn get(&self, key: &BitString) -> Option<&Amplitude> {
        self.index.get(key).map(|k| &self.entries[*k].1)
    }

    /// Return the amplitude on `key`, treating missing entries as zero.
    pub fn amplitude(&self, key: &BitString) -> Amplitude {
        self.get(key).copied().unwrap_or(Amplitude::ZERO)
    }

    /// Return `true` if there is an entry for `key`.
    pub fn contains(&self, key: &BitString) -> bool {
        self.index.contains_key(key)
    }

    /// Iterate over all entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&BitString, &Amplitude)> + '_ {
        self.entries.iter().map(|(key, amp)| (key, amp))
    }

    /// Return a copy with every amplitude simplified.
    pub fn simplified(&self) -> Self {
        let entries
            = self.entries.iter()
            .map(|(key, amp)| (*key, amp.simplify()))
            .collect();
        Self { n_qubits: self.n_qubits, entries, index: self.index.clone() }
    }

    /// Return a copy with all negligible entries removed.
    pub fn pruned(&self) -> Self {
        let entries: Vec<(BitString, Amplitude)>
            = self.entries.iter()
            .filter(|(_, amp)| !amp.is_negligible())
            .copied()
            .collect();
        let index
            = entries.iter().enumerate()
            .map(|(k, (key, _))| (*key, k))
            .collect();
        Self { n_qubits: self.n_qubits, entries, index }
    }

    /// Return the sum of |amplitude|² over all entries.
    pub fn total_probability(&self) -> f64 {
        self.entries.iter().map(|(_, amp)| amp.norm_sqr()).sum()
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.entries.len();
        for (k, (key, amp)) in self.entries.iter().enumerate() {
            write!(f, "({}) |{}⟩", amp, key)?;
            if k < n - 1 { write!(f, " + ")?; }
        }
        Ok(())
    }
}

/// One branch of a gate application, drawn as an arrow.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Transition {
    pub source: BitString,
    pub dest: BitString,
    /// Factor applied to the source amplitude along this branch.
    pub coeff: Amplitude,
}

/// The result of applying one gate to a snapshot.
#[derive(Clone, Debug)]
pub struct Evolution {
    /// The new snapshot before negligible entries are removed.
    pub next: Snapshot,
    /// Branch transitions in the order they were generated.
    pub transitions: Vec<Transition>,
}

fn check_gate(gate: &Gate, n_qubits: usize) -> StateResult<()> {
    gate.qubits().into_iter()
        .find(|q| *q >= n_qubits)
        .map_or(Ok(()), |qubit| Err(QubitOutOfRange { qubit, n_qubits }))
}

/// Apply `gate` to `snapshot`.
///
/// Single-qubit gates send each entry along up to two branches, the
/// zero-branch first; branches with zero coefficient are skipped entirely.
/// CNOT permutes entries. Contributions to the same bitstring are summed and
/// simplified, but nothing is pruned.
pub fn evolve(snapshot: &Snapshot, gate: &Gate) -> StateResult<Evolution> {
    let n = snapshot.n_qubits();
    check_gate(gate, n)?;
    let mut next = Snapshot::new(n)?;
    let mut transitions: Vec<Transition> = Vec::new();
    if let Gate::Cnot(c, t) = *gate {
        for (key, amp) in snapshot.iter() {
            let dest = if key.bit(c) { key.flipped(t) } else { *key };
            transitions.push(
                Transition { source: *key, dest, coeff: Amplitude::ONE });
            next.accumulate(dest, *amp)?;
        }
    } else if let Some(mat) = gate.matrix() {
        let q = gate.qubits()[0];
        for (key, amp) in snapshot.iter() {
            let b = key.bit(q) as usize;
            for out in [false, true] {
                let coeff = mat[[out as usize, b]];
                if coeff.is_negligible() { continue; }
                let dest = key.with_bit(q, out);
                transitions.push(Transition { source: *key, dest, coeff });
                next.accumulate(dest, coeff * *amp)?;
            }
        }
    }
    Ok(Evolution { next: next.simplified(), transitions })
}

/// The append-only list of snapshots, one per time step.
#[derive(Clone, Debug)]
pub struct StateSequence {
    n_qubits: usize,
    snapshots: Vec<Snapshot>,
}

impl StateSequence {
    /// Create a new sequence starting from `init`, or from the all-zero
    /// state if `None`.
    pub fn new(n_qubits: usize, init: Option<Snapshot>) -> StateResult<Self> {
        check_qubit_count(n_qubits)?;
        let init
            = match init {
                Some(snapshot) => {
                    if snapshot.n_qubits() != n_qubits {
                        return Err(LengthMismatch {
                            expected: n_qubits,
                            got: snapshot.n_qubits(),
                        });
                    }
                    if snapshot.is_empty() { return Err(EmptyState); }
                    snapshot
                },
                None => Snapshot::ground(n_qubits)?,
            };
        Ok(Self { n_qubits, snapshots: vec![init] })
    }

    /// Return the number of qubits.
    pub fn n_qubits(&self) -> usize { self.n_qubits }

    /// Return the number of snapshots, which is always at least 1.
    pub fn len(&self) -> usize { self.snapshots.len() }

    /// Always `false`.
    pub fn is_empty(&self) -> bool { self.snapshots.is_empty() }

    /// Return the time step of the latest snapshot.
    pub fn time(&self) -> usize { self.snapshots.len() - 1 }

    /// Return the latest snapshot.
    pub fn latest(&self) -> &Snapshot {
        &self.snapshots[self.snapshots.len() - 1]
    }

    /// Return all snapshots in time order.
    pub fn snapshots(&self) -> &[Snapshot] { &self.snapshots }

    /// Apply `gate` to the latest snapshot and store the pruned result.
    ///
    /// The returned [`Evolution`] holds the unpruned snapshot so that entries
    /// driven to zero can still be drawn.
    pub fn apply(&mut self, gate: &Gate) -> StateResult<Evolution> {
        let evolution = evolve(self.latest(), gate)?;
        let t = self.time();
        for (key, amp) in evolution.next.iter() {
            if amp.is_negligible() {
                trace!(time = t + 1, state = %key, amplitude = %amp, "pruned");
            }
        }
        let pruned = evolution.next.pruned();
        debug!(
            gate = %gate,
            time = t,
            transitions = evolution.transitions.len(),
            entries = pruned.len(),
            "applied gate",
        );
        self.snapshots.push(pruned);
        Ok(evolution)
    }
}
