// End-to-end generation: dataset → filtered corpus → model → sequence → MIDI.
//
// One `RandomSource` is threaded through every random decision in a run, in
// a fixed order: tonality (if not given), start chord and transition draws,
// then tempo (if not given). The same seed and options therefore reproduce
// the same file.

use crate::chain::{ChordSymbol, Composition, TransitionModel};
use crate::chord::PitchLookup;
use crate::corpus::{Corpus, Tonality};
use crate::error::Result;
use crate::midi::{random_tempo, write_midi};
use crate::sampler::{DEFAULT_MAX_RETRIES, DEFAULT_MAX_STEPS, Sampler};
use chord_chain_prng::RandomSource;
use std::path::PathBuf;
use tracing::info;

/// Resolved options for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateConfig {
    pub dataset: PathBuf,
    pub midi: PathBuf,
    /// `None` picks major or minor at random.
    pub tonality: Option<Tonality>,
    /// `None` picks a tempo at random.
    pub tempo_bpm: Option<u16>,
    pub max_steps: usize,
    pub max_retries: u32,
}

impl GenerateConfig {
    pub fn new(dataset: impl Into<PathBuf>, midi: impl Into<PathBuf>) -> Self {
        Self {
            dataset: dataset.into(),
            midi: midi.into(),
            tonality: None,
            tempo_bpm: None,
            max_steps: DEFAULT_MAX_STEPS,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

/// What a run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    pub tonality: Tonality,
    pub compositions: usize,
    pub source_chords: usize,
    pub sequence: Vec<ChordSymbol>,
    pub tempo_bpm: u16,
}

/// Build a model from filtered compositions and sample one sequence.
pub fn compose(
    compositions: &[Composition],
    config: &GenerateConfig,
    rng: &mut impl RandomSource,
) -> Result<(TransitionModel, Vec<ChordSymbol>)> {
    let model = TransitionModel::build(compositions);
    let sequence = Sampler::new(&model)
        .with_max_steps(config.max_steps)
        .with_max_retries(config.max_retries)
        .sample(rng)?;
    Ok((model, sequence))
}

/// Run the whole pipeline and write the MIDI file.
pub fn run(
    config: &GenerateConfig,
    lookup: &impl PitchLookup,
    rng: &mut impl RandomSource,
) -> Result<Generation> {
    let corpus = Corpus::load(&config.dataset)?;
    let tonality = config.tonality.unwrap_or_else(|| Tonality::random(rng));
    let compositions = corpus.filter(tonality);
    info!(%tonality, compositions = compositions.len(), "filtered corpus");
    let (model, sequence) = compose(&compositions, config, rng)?;
    info!(sequence = ?sequence, "generated sequence");

    let tempo_bpm = config.tempo_bpm.unwrap_or_else(|| random_tempo(rng));
    write_midi(&sequence, tempo_bpm, lookup, &config.midi)?;
    info!(path = %config.midi.display(), tempo_bpm, "wrote MIDI");

    Ok(Generation {
        tonality,
        compositions: compositions.len(),
        source_chords: model.len(),
        sequence,
        tempo_bpm,
    })
}
