// End-to-end tests: dataset file in, MIDI file out.

use chord_chain::chord::ChordNames;
use chord_chain::corpus::Tonality;
use chord_chain::pipeline::{GenerateConfig, run};
use chord_chain::{Error, SampleError};
use chord_chain_prng::ChainRng;
use std::path::Path;

const DATASET: &str = r#"{
    "pop-1": { "is_minor": false, "chords": ["C", "G", "Am", "F"] },
    "pop-2": { "is_minor": false, "chords": ["C", "F", "G", "C"] },
    "pop-3": { "is_minor": false, "chords": ["F", "G", "Em", "Am"] },
    "sad-1": { "is_minor": true, "chords": ["Am", "F", "C", "G"] },
    "empty": { "is_minor": true, "chords": [] }
}"#;

fn write_dataset(dir: &Path, body: &str) -> std::path::PathBuf {
    let path = dir.join("compositions.json");
    std::fs::write(&path, body).unwrap();
    path
}

#[test]
fn minor_run_reproduces_only_path() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = write_dataset(dir.path(), DATASET);
    let midi = dir.path().join("out.mid");

    let mut config = GenerateConfig::new(&dataset, &midi);
    config.tonality = Some(Tonality::Minor);
    config.tempo_bpm = Some(60);

    let generation = run(&config, &ChordNames, &mut ChainRng::new(3)).unwrap();
    assert_eq!(generation.tonality, Tonality::Minor);
    assert_eq!(generation.compositions, 2);
    assert_eq!(generation.source_chords, 4);
    assert_eq!(generation.tempo_bpm, 60);
    let path = ["Am", "F", "C", "G"];
    assert!(path.ends_with(&generation.sequence.iter().map(String::as_str).collect::<Vec<_>>()));

    let bytes = std::fs::read(&midi).unwrap();
    let smf = midly::Smf::parse(&bytes).unwrap();
    assert_eq!(smf.tracks.len(), 1);
}

#[test]
fn same_seed_same_file() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = write_dataset(dir.path(), DATASET);
    let a = dir.path().join("a.mid");
    let b = dir.path().join("b.mid");

    let ga = run(&GenerateConfig::new(&dataset, &a), &ChordNames, &mut ChainRng::new(77)).unwrap();
    let gb = run(&GenerateConfig::new(&dataset, &b), &ChordNames, &mut ChainRng::new(77)).unwrap();
    assert_eq!(ga, gb);
    assert!((40..=80).contains(&ga.tempo_bpm));
    assert!(!ga.sequence.is_empty() && ga.sequence.len() <= 9);
    assert_eq!(std::fs::read(&a).unwrap(), std::fs::read(&b).unwrap());
}

#[test]
fn filtered_to_nothing_is_empty_model() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = write_dataset(
        dir.path(),
        r#"{ "only": { "is_minor": false, "chords": ["C", "G"] } }"#,
    );
    let midi = dir.path().join("out.mid");
    let mut config = GenerateConfig::new(&dataset, &midi);
    config.tonality = Some(Tonality::Minor);

    let err = run(&config, &ChordNames, &mut ChainRng::new(1)).unwrap_err();
    assert!(matches!(err, Error::Sample(SampleError::EmptyModel)));
    assert!(err.is_model_failure());
    assert!(!midi.exists());
}

#[test]
fn missing_dataset_is_corpus_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = GenerateConfig::new(dir.path().join("nope.json"), dir.path().join("out.mid"));
    let err = run(&config, &ChordNames, &mut ChainRng::new(1)).unwrap_err();
    assert!(matches!(err, Error::Corpus(_)));
    assert!(!err.is_model_failure());
}

#[test]
fn unknown_chord_is_render_error() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = write_dataset(
        dir.path(),
        r#"{ "odd": { "is_minor": true, "chords": ["Qm"] } }"#,
    );
    let mut config = GenerateConfig::new(&dataset, dir.path().join("out.mid"));
    config.tonality = Some(Tonality::Minor);
    let err = run(&config, &ChordNames, &mut ChainRng::new(1)).unwrap_err();
    assert!(matches!(err, Error::Render(_)));
}
