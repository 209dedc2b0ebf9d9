// Spelled pitches and named intervals.
//
// A `Pitch` keeps its letter name, accidental and octave rather than just a
// MIDI number, because counterpoint rules are stated in diatonic terms: F to
// B is an augmented fourth (forbidden) even though it spans the same six
// semitones as the diminished fifth B to F. `Pitch::interval` returns that
// diatonic name; `Pitch::midi` is still available for comparing heights and
// for MIDI export.
//
// The string form is scientific pitch notation (`C4`, `F#4`, `Bb3`), which
// also serves as the pitch's stable identity in config files and JSON output.

use crate::error::CantusError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Natural letter names, in ascending order from C.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Letter {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl Letter {
    pub const ALL: [Letter; 7] = [
        Letter::C,
        Letter::D,
        Letter::E,
        Letter::F,
        Letter::G,
        Letter::A,
        Letter::B,
    ];

    /// Position within the octave (C = 0 .. B = 6).
    pub fn index(self) -> i32 {
        self as i32
    }

    /// Letter at a (possibly negative or > 6) diatonic position, wrapping.
    pub fn from_index(index: i32) -> Letter {
        Self::ALL[index.rem_euclid(7) as usize]
    }

    /// Semitones above C of the natural (unaltered) letter.
    pub fn natural_semitone(self) -> i32 {
        match self {
            Letter::C => 0,
            Letter::D => 2,
            Letter::E => 4,
            Letter::F => 5,
            Letter::G => 7,
            Letter::A => 9,
            Letter::B => 11,
        }
    }

    fn from_char(c: char) -> Option<Letter> {
        match c.to_ascii_uppercase() {
            'C' => Some(Letter::C),
            'D' => Some(Letter::D),
            'E' => Some(Letter::E),
            'F' => Some(Letter::F),
            'G' => Some(Letter::G),
            'A' => Some(Letter::A),
            'B' => Some(Letter::B),
            _ => None,
        }
    }

    fn as_char(self) -> char {
        match self {
            Letter::C => 'C',
            Letter::D => 'D',
            Letter::E => 'E',
            Letter::F => 'F',
            Letter::G => 'G',
            Letter::A => 'A',
            Letter::B => 'B',
        }
    }
}

/// A spelled pitch: letter, accidental (semitones, + is sharp) and octave.
/// Octave numbering follows scientific pitch notation, so C4 is middle C.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Pitch {
    letter: Letter,
    accidental: i8,
    octave: i8,
}

impl Pitch {
    pub fn new(letter: Letter, accidental: i8, octave: i8) -> Self {
        Pitch {
            letter,
            accidental,
            octave,
        }
    }

    pub fn letter(&self) -> Letter {
        self.letter
    }

    pub fn accidental(&self) -> i8 {
        self.accidental
    }

    pub fn octave(&self) -> i8 {
        self.octave
    }

    /// MIDI note number (C4 = 60). May fall outside 0..=127 for extreme
    /// octaves; callers exporting MIDI clamp.
    pub fn midi(&self) -> i32 {
        (self.octave as i32 + 1) * 12 + self.letter.natural_semitone() + self.accidental as i32
    }

    /// Count of letter steps above C0, ignoring accidentals.
    pub fn diatonic_index(&self) -> i32 {
        self.octave as i32 * 7 + self.letter.index()
    }

    /// Named interval between this pitch and `other`, regardless of which
    /// one is higher.
    pub fn interval(&self, other: &Pitch) -> Interval {
        let (low, high) = if other.diatonic_index() >= self.diatonic_index() {
            (self, other)
        } else {
            (other, self)
        };
        let number = (high.diatonic_index() - low.diatonic_index()) as u32 + 1;
        let mut semitones = high.midi() - low.midi();
        if number == 1 {
            semitones = semitones.abs();
        }
        Interval::from_number_and_semitones(number, semitones)
    }

    pub fn is_lower(&self, other: &Pitch) -> bool {
        self.midi() < other.midi()
    }

    pub fn is_higher(&self, other: &Pitch) -> bool {
        self.midi() > other.midi()
    }
}

impl Ord for Pitch {
    fn cmp(&self, other: &Self) -> Ordering {
        self.midi()
            .cmp(&other.midi())
            .then_with(|| self.diatonic_index().cmp(&other.diatonic_index()))
    }
}

impl PartialOrd for Pitch {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter.as_char())?;
        let symbol = if self.accidental > 0 { '#' } else { 'b' };
        for _ in 0..self.accidental.unsigned_abs() {
            write!(f, "{symbol}")?;
        }
        write!(f, "{}", self.octave)
    }
}

impl FromStr for Pitch {
    type Err = CantusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CantusError::InvalidPitch(s.to_string());
        let trimmed = s.trim();
        let mut chars = trimmed.chars();
        let letter = chars.next().and_then(Letter::from_char).ok_or_else(invalid)?;
        let rest = chars.as_str();
        let octave_start = rest
            .find(|c: char| c.is_ascii_digit() || c == '-')
            .ok_or_else(invalid)?;
        let (accidentals, octave) = rest.split_at(octave_start);
        let mut accidental: i8 = 0;
        for c in accidentals.chars() {
            match c {
                '#' => accidental += 1,
                'b' => accidental -= 1,
                _ => return Err(invalid()),
            }
            if accidental.abs() > 2 {
                return Err(invalid());
            }
        }
        let octave: i8 = octave.parse().map_err(|_| invalid())?;
        if !(-1..=9).contains(&octave) {
            return Err(invalid());
        }
        Ok(Pitch::new(letter, accidental, octave))
    }
}

impl TryFrom<String> for Pitch {
    type Error = CantusError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Pitch> for String {
    fn from(p: Pitch) -> String {
        p.to_string()
    }
}

/// Interval quality. Augmented and diminished carry a multiplicity so that
/// doubly altered intervals never compare equal to singly altered ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quality {
    Diminished(u8),
    Minor,
    Perfect,
    Major,
    Augmented(u8),
}

/// A named interval: diatonic number (1 = unison, 8 = octave) and quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Interval {
    pub quality: Quality,
    pub number: u32,
}

/// Melodic intervals allowed between consecutive notes of a cantus firmus.
pub const MELODIC_INTERVALS: [Interval; 9] = [
    Interval::new(Quality::Minor, 2),
    Interval::new(Quality::Major, 2),
    Interval::new(Quality::Minor, 3),
    Interval::new(Quality::Major, 3),
    Interval::new(Quality::Perfect, 4),
    Interval::new(Quality::Perfect, 5),
    Interval::new(Quality::Minor, 6),
    Interval::new(Quality::Major, 6),
    Interval::new(Quality::Perfect, 8),
];

impl Interval {
    pub const fn new(quality: Quality, number: u32) -> Self {
        Interval { quality, number }
    }

    /// Unsigned diatonic size (2 = a step, 3 = a third, ...).
    pub fn size(&self) -> u32 {
        self.number
    }

    /// True for the intervals a cantus firmus may move by (and outline).
    pub fn is_melodic_consonance(&self) -> bool {
        MELODIC_INTERVALS.contains(self)
    }

    fn from_number_and_semitones(number: u32, semitones: i32) -> Interval {
        const MAJOR_OR_PERFECT: [i32; 7] = [0, 2, 4, 5, 7, 9, 11];
        let degree = ((number - 1) % 7) as usize;
        let octaves = ((number - 1) / 7) as i32;
        let diff = semitones - (MAJOR_OR_PERFECT[degree] + 12 * octaves);
        let perfect_class = matches!(degree, 0 | 3 | 4);
        let quality = match (perfect_class, diff) {
            (true, 0) => Quality::Perfect,
            (false, 0) => Quality::Major,
            (false, -1) => Quality::Minor,
            (_, d) if d > 0 => Quality::Augmented(d as u8),
            (true, d) => Quality::Diminished((-d) as u8),
            (false, d) => Quality::Diminished((-d - 1) as u8),
        };
        Interval { quality, number }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.quality {
            Quality::Perfect => write!(f, "P")?,
            Quality::Major => write!(f, "M")?,
            Quality::Minor => write!(f, "m")?,
            Quality::Augmented(n) => write!(f, "{}", "A".repeat(n as usize))?,
            Quality::Diminished(n) => write!(f, "{}", "d".repeat(n as usize))?,
        }
        write!(f, "{}", self.number)
    }
}
