// MIDI export of a finished cantus firmus.
//
// Writes a Standard MIDI File (Format 1): a tempo track followed by one
// melody track where every note of the line is a whole note. Pitches come
// from `Pitch::midi` (C4 = 60), clamped into the 0-127 key range.
//
// Uses the `midly` crate for encoding.

use crate::cantus::CantusFirmus;
use crate::error::{CantusError, Result};
use midly::{
    Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind,
    num::{u4, u7, u15, u24, u28},
};
use std::path::Path;

/// Ticks per quarter note in MIDI output.
const TICKS_PER_QUARTER: u16 = 480;

/// Each note of the line lasts four quarters.
const TICKS_PER_NOTE: u32 = TICKS_PER_QUARTER as u32 * 4;

/// Church organ.
const PROGRAM: u8 = 19;

const VELOCITY: u8 = 80;

/// Encode `cf` and write it to `path`.
pub fn write_midi(cf: &CantusFirmus, path: &Path, tempo_bpm: u16) -> Result<()> {
    let buf = encode_midi(cf, tempo_bpm)?;
    std::fs::write(path, &buf)?;
    Ok(())
}

/// Encode `cf` as SMF bytes.
pub fn encode_midi(cf: &CantusFirmus, tempo_bpm: u16) -> Result<Vec<u8>> {
    if tempo_bpm == 0 {
        return Err(CantusError::Midi("tempo must be at least 1 BPM".into()));
    }
    let smf = cantus_to_smf(cf, tempo_bpm);
    let mut buf = Vec::new();
    smf.write(&mut buf)
        .map_err(|e| CantusError::Midi(e.to_string()))?;
    Ok(buf)
}

fn key_number(midi: i32) -> u7 {
    u7::new(midi.clamp(0, 127) as u8)
}

/// Convert a line to an in-memory SMF.
pub fn cantus_to_smf(cf: &CantusFirmus, tempo_bpm: u16) -> Smf<'static> {
    let mut smf = Smf::new(Header::new(
        Format::Parallel,
        Timing::Metrical(u15::new(TICKS_PER_QUARTER)),
    ));

    let tempo_microseconds = 60_000_000 / u32::from(tempo_bpm.max(1));
    let tempo_track: Track<'static> = vec![
        TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::Tempo(u24::new(tempo_microseconds))),
        },
        TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
        },
    ];
    smf.tracks.push(tempo_track);

    let channel = u4::new(0);
    let mut track: Track<'static> = vec![
        TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::TrackName(b"Cantus firmus")),
        },
        TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Midi {
                channel,
                message: MidiMessage::ProgramChange {
                    program: u7::new(PROGRAM),
                },
            },
        },
    ];

    for note in cf.notes() {
        let key = key_number(note.midi());
        track.push(TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Midi {
                channel,
                message: MidiMessage::NoteOn {
                    key,
                    vel: u7::new(VELOCITY),
                },
            },
        });
        track.push(TrackEvent {
            delta: u28::new(TICKS_PER_NOTE),
            kind: TrackEventKind::Midi {
                channel,
                message: MidiMessage::NoteOff {
                    key,
                    vel: u7::new(0),
                },
            },
        });
    }

    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });
    smf.tracks.push(track);

    smf
}
