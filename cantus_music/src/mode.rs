// Modes a cantus firmus can be written in.
//
// Each mode is a seven-note diatonic pattern described by its semitone
// offsets from the tonic. `key.rs` combines a mode with a spelled tonic to
// produce concrete scale pitches; nothing else in the crate looks at
// semitone patterns directly.

use crate::error::CantusError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The supported modes. `Major` and `Minor` are the Ionian and Aeolian
/// patterns under their modern names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// C D E F G A B
    Major,
    /// A B C D E F G (natural minor)
    Minor,
    /// D E F G A B C (minor with raised 6th)
    Dorian,
    /// E F G A B C D (half step from 1 to 2)
    Phrygian,
    /// F G A B C D E (raised 4th)
    Lydian,
    /// G A B C D E F (major with lowered 7th)
    Mixolydian,
}

impl Mode {
    pub const ALL: [Mode; 6] = [
        Mode::Major,
        Mode::Minor,
        Mode::Dorian,
        Mode::Phrygian,
        Mode::Lydian,
        Mode::Mixolydian,
    ];

    /// Semitone offsets from the tonic to each of the seven scale degrees.
    pub fn intervals(self) -> [u8; 7] {
        match self {
            Mode::Major => [0, 2, 4, 5, 7, 9, 11],
            Mode::Minor => [0, 2, 3, 5, 7, 8, 10],
            Mode::Dorian => [0, 2, 3, 5, 7, 9, 10],
            Mode::Phrygian => [0, 1, 3, 5, 7, 8, 10],
            Mode::Lydian => [0, 2, 4, 6, 7, 9, 11],
            Mode::Mixolydian => [0, 2, 4, 5, 7, 9, 10],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Mode::Major => "major",
            Mode::Minor => "minor",
            Mode::Dorian => "dorian",
            Mode::Phrygian => "phrygian",
            Mode::Lydian => "lydian",
            Mode::Mixolydian => "mixolydian",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Mode {
    type Err = CantusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "major" | "ionian" => Ok(Mode::Major),
            "minor" | "aeolian" => Ok(Mode::Minor),
            "dorian" => Ok(Mode::Dorian),
            "phrygian" => Ok(Mode::Phrygian),
            "lydian" => Ok(Mode::Lydian),
            "mixolydian" => Ok(Mode::Mixolydian),
            _ => Err(CantusError::UnknownMode(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_mode_starts_on_tonic_and_ascends() {
        for mode in Mode::ALL {
            let iv = mode.intervals();
            assert_eq!(iv[0], 0, "{mode} should start on the tonic");
            assert!(iv.windows(2).all(|w| w[0] < w[1]), "{mode} should ascend");
            assert!(iv[6] < 12);
        }
    }

    #[test]
    fn test_parse_names_and_aliases() {
        assert_eq!("Major".parse::<Mode>().unwrap(), Mode::Major);
        assert_eq!("aeolian".parse::<Mode>().unwrap(), Mode::Minor);
        assert_eq!(" dorian ".parse::<Mode>().unwrap(), Mode::Dorian);
        assert!(matches!(
            "locrian".parse::<Mode>(),
            Err(CantusError::UnknownMode(_))
        ));
    }

    #[test]
    fn test_display_roundtrips_through_parse() {
        for mode in Mode::ALL {
            assert_eq!(mode.to_string().parse::<Mode>().unwrap(), mode);
        }
    }

    #[test]
    fn test_serde_uses_lowercase_names() {
        let json = serde_json::to_string(&Mode::Mixolydian).unwrap();
        assert_eq!(json, "\"mixolydian\"");
        let back: Mode = serde_json::from_str("\"phrygian\"").unwrap();
        assert_eq!(back, Mode::Phrygian);
    }
}
