// Chord symbol to pitch lookup.
//
// Parses a chord name such as "C", "F#m7", "Bbmaj7" or "C/E" into MIDI note
// numbers. All notes are folded into the octave starting at middle C
// (60..=71): a chord is a set of pitch classes rendered in closed position,
// not a voiced chord. A slash bass is placed first and not repeated.
//
// The sampler never looks at chord structure; only the MIDI renderer uses
// this module, through the `PitchLookup` trait.

use thiserror::Error;

/// MIDI note number of middle C; every pitch lands in `BASE_PITCH..BASE_PITCH + 12`.
pub const BASE_PITCH: u8 = 60;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChordError {
    #[error("empty chord symbol")]
    Empty,
    #[error("unknown root note in chord '{0}'")]
    UnknownRoot(String),
    #[error("unknown chord quality '{quality}' in chord '{symbol}'")]
    UnknownQuality { symbol: String, quality: String },
}

/// Maps a chord symbol to the pitches that sound for it.
pub trait PitchLookup {
    fn pitches(&self, symbol: &str) -> Result<Vec<u8>, ChordError>;
}

/// The built-in chord-name parser.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChordNames;

impl PitchLookup for ChordNames {
    fn pitches(&self, symbol: &str) -> Result<Vec<u8>, ChordError> {
        chord_pitches(symbol)
    }
}

/// A parsed chord symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chord {
    /// Pitch class of the root (C = 0).
    pub root: u8,
    /// Semitones above the root, root first.
    pub intervals: &'static [u8],
    /// Pitch class of a slash bass, if any.
    pub bass: Option<u8>,
}

impl Chord {
    pub fn parse(symbol: &str) -> Result<Self, ChordError> {
        let symbol = symbol.trim();
        if symbol.is_empty() {
            return Err(ChordError::Empty);
        }
        let (root, rest) =
            parse_note(symbol).ok_or_else(|| ChordError::UnknownRoot(symbol.to_string()))?;

        // "6/9" is a quality, not a slash chord.
        if let Some(intervals) = quality_intervals(rest) {
            return Ok(Chord { root, intervals, bass: None });
        }

        let (quality, bass) = match rest.rsplit_once('/') {
            Some((quality, bass_name)) => {
                let bass = match parse_note(bass_name) {
                    Some((pc, "")) => pc,
                    _ => return Err(ChordError::UnknownRoot(symbol.to_string())),
                };
                (quality, Some(bass))
            }
            None => (rest, None),
        };
        let intervals = quality_intervals(quality).ok_or_else(|| ChordError::UnknownQuality {
            symbol: symbol.to_string(),
            quality: quality.to_string(),
        })?;
        Ok(Chord { root, intervals, bass })
    }

    /// Pitch classes (0..12), bass first when present, without repeats.
    pub fn pitch_classes(&self) -> Vec<u8> {
        let mut out: Vec<u8> = Vec::with_capacity(self.intervals.len() + 1);
        if let Some(bass) = self.bass {
            out.push(bass);
        }
        for &iv in self.intervals {
            let pc = (self.root + iv) % 12;
            if !out.contains(&pc) {
                out.push(pc);
            }
        }
        out
    }

    pub fn pitches(&self) -> Vec<u8> {
        self.pitch_classes().into_iter().map(|pc| BASE_PITCH + pc).collect()
    }
}

/// MIDI pitches for a chord symbol.
pub fn chord_pitches(symbol: &str) -> Result<Vec<u8>, ChordError> {
    Ok(Chord::parse(symbol)?.pitches())
}

/// Leading note name (letter plus optional `#`/`b`) and the remainder.
fn parse_note(s: &str) -> Option<(u8, &str)> {
    let mut chars = s.chars();
    let natural = match chars.next()? {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => return None,
    };
    let rest = &s[1..];
    match rest.chars().next() {
        Some('#') => Some(((natural + 1) % 12, &rest[1..])),
        Some('b') => Some(((natural + 11) % 12, &rest[1..])),
        _ => Some((natural, rest)),
    }
}

/// Semitone offsets for a chord quality suffix.
fn quality_intervals(quality: &str) -> Option<&'static [u8]> {
    let intervals: &'static [u8] = match quality {
        "" | "maj" | "M" => &[0, 4, 7],
        "m" | "min" | "-" => &[0, 3, 7],
        "dim" => &[0, 3, 6],
        "aug" | "+" => &[0, 4, 8],
        "sus2" => &[0, 2, 7],
        "sus4" | "sus" => &[0, 5, 7],
        "5" => &[0, 7],
        "6" => &[0, 4, 7, 9],
        "m6" => &[0, 3, 7, 9],
        "69" | "6/9" => &[0, 4, 7, 9, 14],
        "7" => &[0, 4, 7, 10],
        "maj7" | "M7" => &[0, 4, 7, 11],
        "m7" | "min7" | "-7" => &[0, 3, 7, 10],
        "dim7" => &[0, 3, 6, 9],
        "m7b5" | "m7-5" => &[0, 3, 6, 10],
        "mM7" | "mmaj7" => &[0, 3, 7, 11],
        "7sus4" => &[0, 5, 7, 10],
        "7b5" | "7-5" => &[0, 4, 6, 10],
        "aug7" | "7+5" | "7#5" => &[0, 4, 8, 10],
        "add9" | "add2" => &[0, 4, 7, 14],
        "madd9" => &[0, 3, 7, 14],
        "9" => &[0, 4, 7, 10, 14],
        "maj9" => &[0, 4, 7, 11, 14],
        "m9" => &[0, 3, 7, 10, 14],
        "7b9" => &[0, 4, 7, 10, 13],
        "7#9" => &[0, 4, 7, 10, 15],
        "11" => &[0, 4, 7, 10, 14, 17],
        "m11" => &[0, 3, 7, 10, 14, 17],
        "13" => &[0, 4, 7, 10, 14, 21],
        "maj13" => &[0, 4, 7, 11, 14, 21],
        _ => return None,
    };
    Some(intervals)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triads() {
        assert_eq!(chord_pitches("C").unwrap(), vec![60, 64, 67]);
        assert_eq!(chord_pitches("Am").unwrap(), vec![69, 60, 64]);
        assert_eq!(chord_pitches("Bdim").unwrap(), vec![71, 62, 65]);
        assert_eq!(chord_pitches("Eaug").unwrap(), vec![64, 68, 60]);
    }

    #[test]
    fn test_accidentals_fold_to_same_pitch() {
        assert_eq!(chord_pitches("C#").unwrap(), chord_pitches("Db").unwrap());
        assert_eq!(chord_pitches("Bbmaj7").unwrap(), vec![70, 62, 65, 69]);
        assert_eq!(chord_pitches("F#m7").unwrap(), vec![66, 69, 61, 64]);
    }

    #[test]
    fn test_sevenths_and_extensions() {
        assert_eq!(chord_pitches("G7").unwrap(), vec![67, 71, 62, 65]);
        assert_eq!(chord_pitches("Cmaj7").unwrap(), vec![60, 64, 67, 71]);
        assert_eq!(chord_pitches("Dm9").unwrap(), vec![62, 65, 69, 60, 64]);
        assert_eq!(chord_pitches("C6/9").unwrap(), vec![60, 64, 67, 69, 62]);
    }

    #[test]
    fn test_slash_bass_first_without_repeat() {
        assert_eq!(chord_pitches("C/E").unwrap(), vec![64, 60, 67]);
        assert_eq!(chord_pitches("Am/G").unwrap(), vec![67, 69, 60, 64]);
        assert_eq!(chord_pitches("D/F#").unwrap(), vec![66, 62, 69]);
    }

    #[test]
    fn test_all_pitches_in_base_octave() {
        for symbol in ["B13", "Abmaj13", "Gbm11", "Cb", "B#"] {
            for p in chord_pitches(symbol).unwrap() {
                assert!((BASE_PITCH..BASE_PITCH + 12).contains(&p), "{symbol}: {p}");
            }
        }
    }

    #[test]
    fn test_errors() {
        assert_eq!(chord_pitches(""), Err(ChordError::Empty));
        assert_eq!(chord_pitches("  "), Err(ChordError::Empty));
        assert_eq!(chord_pitches("H7"), Err(ChordError::UnknownRoot("H7".to_string())));
        assert_eq!(chord_pitches("C/X"), Err(ChordError::UnknownRoot("C/X".to_string())));
        assert!(matches!(
            chord_pitches("Cwhatever"),
            Err(ChordError::UnknownQuality { .. })
        ));
    }

    #[test]
    fn test_lookup_trait() {
        let lookup = ChordNames;
        assert_eq!(lookup.pitches("F").unwrap(), vec![65, 69, 60]);
    }
}
