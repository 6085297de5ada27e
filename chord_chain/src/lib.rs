// Chord Chain: first-order Markov chord progression generator.
//
// Learns how often each chord follows another in a corpus of real
// progressions, walks the learned table to produce a new progression, and
// writes it out as a MIDI file with one chord per beat.
//
// Architecture:
// - chain.rs: Transition counting and exact-rational probability model
// - sampler.rs: Seeded walk over the model (min-above-threshold selection,
//   bounded threshold redraws)
// - corpus.rs: JSON dataset loading and major/minor filtering
// - chord.rs: Chord symbol parsing into MIDI pitches
// - midi.rs: Standard MIDI File rendering via `midly`
// - pipeline.rs: Run configuration and the end-to-end generate step
// - error.rs: Crate-wide error type
//
// The generator is deterministic given a seed, supporting reproducible output.

pub mod chain;
pub mod chord;
pub mod corpus;
pub mod error;
pub mod midi;
pub mod pipeline;
pub mod sampler;

pub use chain::{ChordSymbol, Composition, Successor, Transition, TransitionModel};
pub use error::{Error, Result};
pub use sampler::{SampleError, Sampler, sample_sequence};
