// Chord Chain generator — CLI entry point.
//
// Learns chord transitions from a JSON dataset, samples one progression and
// writes it to MIDI. The pipeline: load → filter by tonality → build model →
// sample → render.
//
// Usage:
//   cargo run -p chord_chain -- --midi out.mid [--dataset compositions.json]
//     [--seed N] [--mode major|minor] [--tempo BPM] [--max-steps N]
//
// Set RUST_LOG=chord_chain=debug to trace every sampling step.

use chord_chain::chord::ChordNames;
use chord_chain::corpus::Tonality;
use chord_chain::pipeline::{GenerateConfig, run};
use chord_chain::sampler::{DEFAULT_MAX_RETRIES, DEFAULT_MAX_STEPS};
use chord_chain_prng::ChainRng;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

/// Generate a chord progression from a corpus and write it as MIDI.
#[derive(Parser, Debug)]
#[command(name = "generate")]
#[command(version)]
struct Args {
    /// Where the MIDI output should be written
    #[arg(long)]
    midi: PathBuf,

    /// JSON dataset of compositions
    #[arg(long, default_value = "compositions.json", env = "CHORD_CHAIN_DATASET")]
    dataset: PathBuf,

    /// Seed for reproducible output (random if omitted)
    #[arg(long, env = "CHORD_CHAIN_SEED")]
    seed: Option<u64>,

    /// Train on major or minor compositions only (random if omitted)
    #[arg(long)]
    mode: Option<Tonality>,

    /// Tempo in BPM (random 40-80 if omitted)
    #[arg(long)]
    tempo: Option<u16>,

    /// Maximum chords generated after the starting chord
    #[arg(long, default_value_t = DEFAULT_MAX_STEPS)]
    max_steps: usize,

    /// Threshold draws allowed per step before giving up
    #[arg(long, default_value_t = DEFAULT_MAX_RETRIES)]
    max_retries: u32,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chord_chain=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let (mut rng, seed) = match args.seed {
        Some(s) => (ChainRng::new(s), s),
        None => ChainRng::from_entropy(),
    };

    let config = GenerateConfig {
        dataset: args.dataset,
        midi: args.midi,
        tonality: args.mode,
        tempo_bpm: args.tempo,
        max_steps: args.max_steps,
        max_retries: args.max_retries,
    };

    println!("=== Chord Chain Generator ===");
    println!("Dataset: {}", config.dataset.display());
    println!("Output: {}", config.midi.display());
    println!("Seed: {}", seed);
    info!(?config, seed, "starting run");

    match run(&config, &ChordNames, &mut rng) {
        Ok(generation) => {
            println!(
                "Mode: {} ({} compositions, {} distinct chords)",
                generation.tonality, generation.compositions, generation.source_chords
            );
            println!("Tempo: {} BPM", generation.tempo_bpm);
            println!("Generated sequence: {}", generation.sequence.join(" "));
            println!();
            println!("Play with: timidity {} (or any MIDI player)", config.midi.display());
        }
        Err(e) => {
            eprintln!("Error: {e}");
            // Distinguish an unusable model from bad input or I/O.
            std::process::exit(if e.is_model_failure() { 2 } else { 1 });
        }
    }
}
