// Tonal context: a spelled tonic plus a mode.
//
// The key is what turns diatonic interval sizes into concrete pitches.
// `interval_from_pitch(pitch, 3)` is "a third above `pitch` within this
// key", with the accidental of the landing scale degree applied, so in
// F major a fourth above F4 is Bb4 and in G mixolydian a step below G4 is F4.
//
// Signed sizes follow the usual musician's convention: +2 is a step up,
// -2 a step down, +8 an octave up. Sizes 1, 0 and -1 all mean "stay".

use crate::mode::Mode;
use crate::pitch::{Letter, Pitch};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Key {
    pub tonic: Pitch,
    pub mode: Mode,
}

impl Key {
    pub fn new(tonic: Pitch, mode: Mode) -> Self {
        Key { tonic, mode }
    }

    /// Move `pitch` by a signed diatonic interval size within this key.
    pub fn interval_from_pitch(&self, pitch: &Pitch, size: i32) -> Pitch {
        let steps = match size {
            s if s > 1 => s - 1,
            s if s < -1 => s + 1,
            _ => 0,
        };
        let target = pitch.diatonic_index() + steps;
        let letter = Letter::from_index(target);
        let octave = target.div_euclid(7);
        self.spell(letter, octave)
    }

    /// The in-key pitch with the given letter and octave.
    fn spell(&self, letter: Letter, octave: i32) -> Pitch {
        let degree = (letter.index() - self.tonic.letter().index()).rem_euclid(7) as usize;
        let tonic_pc = self.tonic.midi().rem_euclid(12);
        let wanted_pc = (tonic_pc + self.mode.intervals()[degree] as i32).rem_euclid(12);
        // Smallest alteration (-6..=5) that turns the natural letter into the
        // wanted pitch class.
        let accidental = (wanted_pc - letter.natural_semitone() + 18).rem_euclid(12) - 6;
        Pitch::new(letter, accidental as i8, octave as i8)
    }

    /// Every pitch of this key from `low` up to `high` inclusive, stepping
    /// diatonically from `low`.
    pub fn pitches_between(&self, low: &Pitch, high: &Pitch) -> Vec<Pitch> {
        let mut out = Vec::new();
        let mut current = *low;
        while !current.is_higher(high) {
            out.push(current);
            current = self.interval_from_pitch(&current, 2);
        }
        out
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tonic = self.tonic.to_string();
        let name = tonic.trim_end_matches(|c: char| c.is_ascii_digit() || c == '-');
        write!(f, "{} {}", name, self.mode)
    }
}
