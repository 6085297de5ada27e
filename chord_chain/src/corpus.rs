// Training corpus loading and tonality filtering.
//
// The dataset is a JSON object mapping a composition id to an entry:
//
//   { "song-1": { "is_minor": true, "chords": ["Am", "F", "C", "G"] }, ... }
//
// Unknown fields in an entry are ignored. Entries keep the order they have
// in the file (`serde_json` is built with `preserve_order`): that order
// decides which successor of a chord is observed first, and so which seed
// produces which progression.
//
// Each run trains on a single tonality: either the one requested on the
// command line or a fair coin flip from the run's random source.

use crate::chain::Composition;
use chord_chain_prng::RandomSource;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("failed to read dataset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid dataset JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Major/minor tag used to select which compositions a run learns from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tonality {
    Major,
    Minor,
}

impl Tonality {
    /// Fair coin flip.
    pub fn random(rng: &mut impl RandomSource) -> Self {
        if rng.coin() {
            Tonality::Minor
        } else {
            Tonality::Major
        }
    }

    pub fn is_minor(self) -> bool {
        self == Tonality::Minor
    }
}

impl fmt::Display for Tonality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tonality::Major => f.write_str("major"),
            Tonality::Minor => f.write_str("minor"),
        }
    }
}

impl FromStr for Tonality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "major" => Ok(Tonality::Major),
            "minor" => Ok(Tonality::Minor),
            _ => Err(format!("unknown tonality '{s}' (expected major or minor)")),
        }
    }
}

/// One dataset entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusEntry {
    pub is_minor: bool,
    pub chords: Composition,
}

/// The full, unfiltered dataset, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Corpus {
    pub entries: Vec<(String, CorpusEntry)>,
}

impl Corpus {
    pub fn load(path: &Path) -> Result<Self, CorpusError> {
        let data = std::fs::read_to_string(path).map_err(|source| CorpusError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let corpus = Self::from_json_str(&data)?;
        info!(path = %path.display(), entries = corpus.len(), "loaded dataset");
        Ok(corpus)
    }

    pub fn from_json_str(data: &str) -> Result<Self, CorpusError> {
        let object: Map<String, Value> = serde_json::from_str(data)?;
        let entries = object
            .into_iter()
            .map(|(id, value)| Ok((id, serde_json::from_value::<CorpusEntry>(value)?)))
            .collect::<Result<Vec<_>, serde_json::Error>>()?;
        Ok(Corpus { entries })
    }

    /// Chord lists of every entry with the given tonality, tag stripped.
    pub fn filter(&self, tonality: Tonality) -> Vec<Composition> {
        self.entries
            .iter()
            .map(|(_, e)| e)
            .filter(|e| e.is_minor == tonality.is_minor())
            .map(|e| e.chords.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
