// MIDI output for generated chord sequences.
//
// Each chord occupies one quarter note. All of a chord's pitches start
// together on the chord's beat and stop on the next beat; the n-th pitch of
// a chord goes out on channel n. Output is a single-track Standard MIDI
// File with a tempo event at tick 0.
//
// Uses the `midly` crate for MIDI writing.

use crate::chain::ChordSymbol;
use crate::chord::{ChordError, PitchLookup};
use chord_chain_prng::RandomSource;
use midly::{
    Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind,
    num::{u4, u7, u15, u24, u28},
};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Ticks per quarter note in MIDI output.
pub const TICKS_PER_QUARTER: u16 = 480;

/// Note velocity for every chord tone.
const VELOCITY: u8 = 100;

/// MIDI has 16 channels and each chord tone takes its own.
const MAX_NOTES_PER_CHORD: usize = 16;

/// Highest MIDI note number.
const MAX_PITCH: u8 = 127;

/// Slowest tempo whose microseconds-per-quarter still fits in 24 bits.
pub const MIN_TEMPO_BPM: u16 = 4;

/// Range a tempo is drawn from when none is given.
pub const RANDOM_TEMPO_BPM: (u16, u16) = (40, 80);

#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Chord(#[from] ChordError),
    #[error("chord '{chord}' has {notes} notes; at most {max} fit on separate channels", max = MAX_NOTES_PER_CHORD)]
    TooManyNotes { chord: ChordSymbol, notes: usize },
    #[error("chord '{chord}' maps to pitch {pitch}, above the MIDI maximum of {max}", max = MAX_PITCH)]
    PitchOutOfRange { chord: ChordSymbol, pitch: u8 },
    #[error("tempo {0} BPM is below the minimum of {min}", min = MIN_TEMPO_BPM)]
    InvalidTempo(u16),
    #[error("failed to write MIDI file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Pick a tempo uniformly from `RANDOM_TEMPO_BPM`, inclusive.
pub fn random_tempo(rng: &mut impl RandomSource) -> u16 {
    rng.range_u16_inclusive(RANDOM_TEMPO_BPM.0, RANDOM_TEMPO_BPM.1)
}

/// Render a sequence and write it to `path`.
pub fn write_midi(
    sequence: &[ChordSymbol],
    tempo_bpm: u16,
    lookup: &impl PitchLookup,
    path: &Path,
) -> Result<(), RenderError> {
    let smf = render(sequence, tempo_bpm, lookup)?;
    let mut buf = Vec::new();
    let io_err = |source| RenderError::Io {
        path: path.to_path_buf(),
        source,
    };
    smf.write_std(&mut buf).map_err(io_err)?;
    std::fs::write(path, &buf).map_err(io_err)?;
    debug!(path = %path.display(), bytes = buf.len(), "wrote MIDI file");
    Ok(())
}

/// Convert a chord sequence to an in-memory SMF.
pub fn render(
    sequence: &[ChordSymbol],
    tempo_bpm: u16,
    lookup: &impl PitchLookup,
) -> Result<Smf<'static>, RenderError> {
    if tempo_bpm < MIN_TEMPO_BPM {
        return Err(RenderError::InvalidTempo(tempo_bpm));
    }

    let mut smf = Smf::new(Header::new(
        Format::SingleTrack,
        Timing::Metrical(u15::new(TICKS_PER_QUARTER)),
    ));

    let mut track: Track<'static> = Vec::new();
    let tempo_microseconds = 60_000_000 / tempo_bpm as u32;
    track.push(meta(MetaMessage::Tempo(u24::new(tempo_microseconds))));
    track.push(meta(MetaMessage::TrackName(b"Chords")));

    for chord in sequence {
        let pitches = lookup.pitches(chord)?;
        if pitches.len() > MAX_NOTES_PER_CHORD {
            return Err(RenderError::TooManyNotes {
                chord: chord.clone(),
                notes: pitches.len(),
            });
        }
        if let Some(&pitch) = pitches.iter().find(|&&p| p > MAX_PITCH) {
            return Err(RenderError::PitchOutOfRange {
                chord: chord.clone(),
                pitch,
            });
        }

        // All note-ons share the chord's start tick; the previous chord's
        // note-offs already advanced time to it.
        for (channel, &pitch) in pitches.iter().enumerate() {
            track.push(TrackEvent {
                delta: u28::new(0),
                kind: note(channel, MidiMessage::NoteOn {
                    key: u7::new(pitch),
                    vel: u7::new(VELOCITY),
                }),
            });
        }
        for (channel, &pitch) in pitches.iter().enumerate() {
            let delta = if channel == 0 { TICKS_PER_QUARTER as u32 } else { 0 };
            track.push(TrackEvent {
                delta: u28::new(delta),
                kind: note(channel, MidiMessage::NoteOff {
                    key: u7::new(pitch),
                    vel: u7::new(0),
                }),
            });
        }
    }

    track.push(meta(MetaMessage::EndOfTrack));
    smf.tracks.push(track);
    Ok(smf)
}

fn meta(message: MetaMessage<'static>) -> TrackEvent<'static> {
    TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(message),
    }
}

fn note(channel: usize, message: MidiMessage) -> TrackEventKind<'static> {
    TrackEventKind::Midi {
        channel: u4::new(channel as u8),
        message,
    }
}
