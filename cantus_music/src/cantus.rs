// The cantus firmus under construction.
//
// A `CantusFirmus` is a key plus a non-empty, append-only list of pitches
// whose first pitch is the key's tonic. Extending it returns a new value, so
// the search frontier can hold many diverging variants of the same prefix
// without any of them observing the others.

use crate::error::{CantusError, Result};
use crate::key::Key;
use crate::mode::Mode;
use crate::pitch::Pitch;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CantusFirmus {
    key: Key,
    notes: Vec<Pitch>,
}

impl CantusFirmus {
    /// A one-note cantus firmus: just the tonic.
    pub fn new(tonic: Pitch, mode: Mode) -> Self {
        CantusFirmus {
            key: Key::new(tonic, mode),
            notes: vec![tonic],
        }
    }

    /// Build from existing notes. The first note becomes the tonic.
    pub fn from_notes(notes: Vec<Pitch>, mode: Mode) -> Result<Self> {
        let tonic = *notes.first().ok_or(CantusError::EmptySeed)?;
        Ok(CantusFirmus {
            key: Key::new(tonic, mode),
            notes,
        })
    }

    /// Build from existing notes in an explicit key, checking that the
    /// notes start on that key's tonic.
    pub fn with_key(key: Key, notes: Vec<Pitch>) -> Result<Self> {
        let first = *notes.first().ok_or(CantusError::EmptySeed)?;
        if first != key.tonic {
            return Err(CantusError::SeedNotOnTonic {
                tonic: key.tonic.to_string(),
                first: first.to_string(),
            });
        }
        Ok(CantusFirmus { key, notes })
    }

    pub fn key(&self) -> &Key {
        &self.key
    }

    pub fn notes(&self) -> &[Pitch] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Pitch> {
        self.notes.get(index)
    }

    pub fn first(&self) -> &Pitch {
        &self.notes[0]
    }

    pub fn last(&self) -> &Pitch {
        &self.notes[self.notes.len() - 1]
    }

    /// A new cantus firmus with `pitch` appended.
    pub fn add_note(&self, pitch: Pitch) -> CantusFirmus {
        let mut notes = Vec::with_capacity(self.notes.len() + 1);
        notes.extend_from_slice(&self.notes);
        notes.push(pitch);
        CantusFirmus {
            key: self.key,
            notes,
        }
    }
}

impl fmt::Display for CantusFirmus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, note) in self.notes.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{note}")?;
        }
        Ok(())
    }
}
