// First-order chord transition model.
//
// Learned from a corpus of compositions (each an ordered list of chord
// symbols). Every adjacent pair `(chord, next)` is one observation of `next`
// following `chord`; the final chord of each composition additionally gets
// one observation of `Successor::End`. Counts are then normalized per source
// chord into exact rational probabilities.
//
// Probabilities are `Ratio<u64>`, never floats: the sampler compares them
// against exact rational thresholds (sampler.rs), and the per-source sum must
// be exactly one.
//
// A model is built once per run and never mutated afterwards.

use num_rational::Ratio;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// Opaque chord name, compared by exact string equality.
pub type ChordSymbol = String;

/// One observed chord sequence.
pub type Composition = Vec<ChordSymbol>;

/// What can follow a chord: another chord, or the end of the composition.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Successor {
    Chord(ChordSymbol),
    End,
}

impl fmt::Display for Successor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Successor::Chord(c) => f.write_str(c),
            Successor::End => f.write_str("<end>"),
        }
    }
}

/// A successor together with its exact empirical probability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub probability: Ratio<u64>,
    pub successor: Successor,
}

/// Raw observation counts, per source chord, in first-observation order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransitionCounts {
    counts: BTreeMap<ChordSymbol, Vec<(Successor, u64)>>,
}

impl TransitionCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record every transition in one composition. Empty compositions
    /// contribute nothing.
    pub fn observe(&mut self, composition: &[ChordSymbol]) {
        let Some(last) = composition.last() else {
            return;
        };
        for pair in composition.windows(2) {
            self.increment(&pair[0], Successor::Chord(pair[1].clone()));
        }
        self.increment(last, Successor::End);
    }

    fn increment(&mut self, source: &str, successor: Successor) {
        let row = self.counts.entry(source.to_string()).or_default();
        match row.iter_mut().find(|(s, _)| *s == successor) {
            Some((_, n)) => *n += 1,
            None => row.push((successor, 1)),
        }
    }

    /// How many times `successor` was observed after `source`.
    pub fn count(&self, source: &str, successor: &Successor) -> u64 {
        self.counts
            .get(source)
            .and_then(|row| row.iter().find(|(s, _)| s == successor))
            .map_or(0, |(_, n)| *n)
    }

    /// Total observations out of `source`.
    pub fn total(&self, source: &str) -> u64 {
        self.counts
            .get(source)
            .map_or(0, |row| row.iter().map(|(_, n)| n).sum())
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Per-source-chord weighted successor table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransitionModel {
    table: BTreeMap<ChordSymbol, Vec<Transition>>,
    counts: TransitionCounts,
}

impl TransitionModel {
    /// Learn a model from a corpus. Never fails; an empty corpus (or one
    /// made only of empty compositions) yields an empty model.
    pub fn build<C>(compositions: &[C]) -> Self
    where
        C: AsRef<[ChordSymbol]>,
    {
        let mut counts = TransitionCounts::new();
        for composition in compositions {
            counts.observe(composition.as_ref());
        }
        Self::from_counts(counts)
    }

    /// Normalize raw counts into probabilities.
    ///
    /// Each successor keeps its own probability (not a running sum). Rows
    /// are sorted by ascending probability; equal probabilities keep their
    /// first-observation order.
    pub fn from_counts(counts: TransitionCounts) -> Self {
        let mut table = BTreeMap::new();
        for (source, row) in &counts.counts {
            let total: u64 = row.iter().map(|(_, n)| n).sum();
            let mut transitions: Vec<Transition> = row
                .iter()
                .map(|(successor, n)| Transition {
                    probability: Ratio::new(*n, total),
                    successor: successor.clone(),
                })
                .collect();
            transitions.sort_by_key(|t| t.probability);
            table.insert(source.clone(), transitions);
        }
        debug!(sources = table.len(), "built transition model");
        Self { table, counts }
    }

    /// A model with arbitrary rows and no counts, for exercising the sampler
    /// on tables the builder would never produce.
    #[cfg(test)]
    pub(crate) fn from_table(table: BTreeMap<ChordSymbol, Vec<Transition>>) -> Self {
        Self {
            table,
            counts: TransitionCounts::default(),
        }
    }

    /// Source chords in sorted order.
    pub fn sources(&self) -> impl Iterator<Item = &ChordSymbol> {
        self.table.keys()
    }

    /// Successors of `source`, or `None` if it never appeared as a source.
    pub fn transitions(&self, source: &str) -> Option<&[Transition]> {
        self.table.get(source).map(Vec::as_slice)
    }

    /// Probability of `successor` following `source` (zero if unobserved).
    pub fn probability(&self, source: &str, successor: &Successor) -> Ratio<u64> {
        self.transitions(source)
            .and_then(|row| row.iter().find(|t| t.successor == *successor))
            .map_or(Ratio::from_integer(0), |t| t.probability)
    }

    pub fn counts(&self) -> &TransitionCounts {
        &self.counts
    }

    /// Number of source chords.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}
