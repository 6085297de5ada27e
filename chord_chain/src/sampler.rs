// Sequence sampling from a transition model.
//
// A walk starts at a source chord chosen uniformly from the model and takes
// at most `max_steps` further steps. Each step draws an exact rational
// threshold in [0, 1) and considers the successors whose own probability is
// at least the threshold. Among those the smallest probability wins; equal
// smallest probabilities are broken uniformly with one extra draw. When no
// successor clears the threshold the threshold is redrawn, up to
// `max_retries` draws per step.
//
// This is not cumulative-distribution sampling. For a row {1/4: A, 3/4: B}
// a threshold below 1/4 selects A, one in [1/4, 3/4) selects B, and one at
// or above 3/4 is redrawn, so A comes out a third of the time. The
// selection rule is kept as-is for compatibility with existing output.
//
// All randomness comes from the caller's `RandomSource`; a seeded source
// reproduces the walk exactly.

use crate::chain::{ChordSymbol, Successor, Transition, TransitionModel};
use chord_chain_prng::{RandomSource, UNIT_BITS};
use num_rational::Ratio;
use thiserror::Error;
use tracing::{debug, trace};

/// Steps taken after the starting chord unless configured otherwise.
pub const DEFAULT_MAX_STEPS: usize = 8;

/// Threshold draws allowed per step before giving up.
pub const DEFAULT_MAX_RETRIES: u32 = 10_000;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SampleError {
    #[error("transition model is empty; nothing to sample")]
    EmptyModel,
    #[error("chord '{0}' is not a source chord in the model")]
    DanglingChord(ChordSymbol),
    #[error("chord '{0}' has no transitions available")]
    NoTransitions(ChordSymbol),
    #[error("no successor of '{chord}' cleared the threshold after {attempts} draws")]
    RetryExhausted { chord: ChordSymbol, attempts: u32 },
}

/// Walks a borrowed `TransitionModel`.
#[derive(Debug, Clone, Copy)]
pub struct Sampler<'a> {
    model: &'a TransitionModel,
    max_steps: usize,
    max_retries: u32,
}

impl<'a> Sampler<'a> {
    pub fn new(model: &'a TransitionModel) -> Self {
        Self {
            model,
            max_steps: DEFAULT_MAX_STEPS,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// At least one draw is always made.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    /// Generate one sequence: between 1 and `max_steps + 1` chords, never
    /// containing the end marker.
    pub fn sample(&self, rng: &mut impl RandomSource) -> Result<Vec<ChordSymbol>, SampleError> {
        let start = self.choose_start(rng)?;
        debug!(start = %start, "starting walk");

        let mut current = start.clone();
        let mut sequence = vec![start];
        for step in 0..self.max_steps {
            match self.next_successor(&current, rng)? {
                Successor::End => {
                    debug!(step, "reached end marker");
                    return Ok(sequence);
                }
                Successor::Chord(next) => {
                    debug!(step, from = %current, to = %next, "transition");
                    sequence.push(next.clone());
                    current = next;
                }
            }
        }
        debug!(len = sequence.len(), "step limit reached");
        Ok(sequence)
    }

    /// Uniform choice over every source chord in the model.
    pub fn choose_start(&self, rng: &mut impl RandomSource) -> Result<ChordSymbol, SampleError> {
        if self.model.is_empty() {
            return Err(SampleError::EmptyModel);
        }
        let index = rng.range_usize(0, self.model.len());
        self.model
            .sources()
            .nth(index)
            .cloned()
            .ok_or(SampleError::EmptyModel)
    }

    /// Pick what follows `current`.
    pub fn next_successor(
        &self,
        current: &str,
        rng: &mut impl RandomSource,
    ) -> Result<Successor, SampleError> {
        let row = self
            .model
            .transitions(current)
            .ok_or_else(|| SampleError::DanglingChord(current.to_string()))?;
        if row.is_empty() {
            return Err(SampleError::NoTransitions(current.to_string()));
        }

        for attempt in 1..=self.max_retries {
            let threshold = draw_threshold(rng);
            if let Some(successor) = select_min_above(row, threshold, rng) {
                return Ok(successor.clone());
            }
            trace!(chord = current, attempt, %threshold, "threshold above every successor, redrawing");
        }
        Err(SampleError::RetryExhausted {
            chord: current.to_string(),
            attempts: self.max_retries,
        })
    }
}

/// Sample with the default retry cap.
pub fn sample_sequence(
    model: &TransitionModel,
    max_steps: usize,
    rng: &mut impl RandomSource,
) -> Result<Vec<ChordSymbol>, SampleError> {
    Sampler::new(model).with_max_steps(max_steps).sample(rng)
}

/// Uniform exact rational in [0, 1).
fn draw_threshold(rng: &mut impl RandomSource) -> Ratio<u64> {
    Ratio::new(rng.next_unit_numerator(), 1u64 << UNIT_BITS)
}

/// Smallest probability that is still >= `threshold`; ties broken uniformly.
fn select_min_above<'r>(
    row: &'r [Transition],
    threshold: Ratio<u64>,
    rng: &mut impl RandomSource,
) -> Option<&'r Successor> {
    let min = row
        .iter()
        .map(|t| t.probability)
        .filter(|p| *p >= threshold)
        .min()?;
    let tied: Vec<&Transition> = row.iter().filter(|t| t.probability == min).collect();
    let pick = if tied.len() > 1 {
        rng.range_usize(0, tied.len())
    } else {
        0
    };
    Some(&tied[pick].successor)
}
