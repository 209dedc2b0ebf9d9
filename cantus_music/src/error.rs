// Error type for the cantus firmus generator.
//
// Only configuration and I/O problems are errors. A search that exhausts its
// frontier without finishing a melody is a normal outcome and is reported
// through `SearchOutcome::best == None`, never through this type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CantusError {
    #[error("invalid pitch '{0}': expected scientific pitch notation such as C4, F#4 or Bb3")]
    InvalidPitch(String),

    #[error("unknown mode '{0}'")]
    UnknownMode(String),

    #[error("a seed cantus firmus needs at least one note")]
    EmptySeed,

    #[error("seed must start on its tonic {tonic}, but starts on {first}")]
    SeedNotOnTonic { tonic: String, first: String },

    #[error("target length {length} is too short: a cantus firmus needs at least {min} notes")]
    TargetLengthTooShort { length: usize, min: usize },

    #[error("seed already has {seed_len} notes, which reaches the target length {length}")]
    SeedTooLong { seed_len: usize, length: usize },

    #[error("max range must be between 1 and {max}, got {0}", max = crate::config::MAX_RANGE_LIMIT)]
    InvalidMaxRange(u32),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("could not encode MIDI: {0}")]
    Midi(String),
}

pub type Result<T> = std::result::Result<T, CantusError>;
