// Hard constraints on the next note of a partial cantus firmus.
//
// Rebuilt for every expansion from the sequence and its stats:
// - a pitch window keeping the whole line within `max_range`, lifted by a
//   step when the current high note has been repeated so a later, single
//   climax stays possible;
// - a blacklist against oscillation (1-3-1) and repeated two- and
//   three-note cells;
// - the coverage rules: every scale pitch inside the range must be sung
//   before the final note, and no pitch gets a third use while only one to
//   three pitches have been used twice.
//
// `build_constraints` returns `None` when the branch cannot be completed at
// all; the driver simply drops it.

use crate::cantus::CantusFirmus;
use crate::pitch::Pitch;
use crate::stats::CfStats;
use std::collections::BTreeSet;

/// The window and blacklist for one expansion step.
#[derive(Debug, Clone)]
pub struct Constraints {
    pub min_note: Pitch,
    pub max_note: Pitch,
    blacklist: BTreeSet<Pitch>,
}

impl Constraints {
    pub fn in_range(&self, pitch: &Pitch) -> bool {
        !pitch.is_higher(&self.max_note) && !pitch.is_lower(&self.min_note)
    }

    pub fn is_blacklisted(&self, pitch: &Pitch) -> bool {
        self.blacklist.contains(pitch)
    }

    pub fn blacklist(&mut self, pitch: Pitch) {
        self.blacklist.insert(pitch);
    }

    pub fn blacklisted(&self) -> impl Iterator<Item = &Pitch> {
        self.blacklist.iter()
    }

    /// Whether `candidate` may follow `last`: a melodic consonance, inside
    /// the window, and not blacklisted.
    pub fn allows(&self, last: &Pitch, candidate: &Pitch) -> bool {
        last.interval(candidate).is_melodic_consonance()
            && self.in_range(candidate)
            && !self.is_blacklisted(candidate)
    }
}

/// Build the constraints for choosing note number `cf.len() + 1` of a line
/// that must reach `target_length` notes.
pub fn build_constraints(
    cf: &CantusFirmus,
    stats: &CfStats,
    target_length: usize,
    max_range: u32,
) -> Option<Constraints> {
    let key = cf.key();
    let range = max_range as i32;
    let len = cf.len();

    let max_note = key.interval_from_pitch(&stats.lowest_note, range);
    let mut min_note = key.interval_from_pitch(&stats.highest_note, -range);
    if stats.usage(&stats.highest_note) > 1 {
        min_note = key.interval_from_pitch(&min_note, 2);
        // Choosing the final note: no climax can follow any more.
        if len + 1 == target_length {
            return None;
        }
    }

    let mut constraints = Constraints {
        min_note,
        max_note,
        blacklist: BTreeSet::new(),
    };

    // No 1-3-1 or 1-4-1.
    if len >= 2 && (stats.last_interval == 3 || stats.last_interval == 4) {
        constraints.blacklist(cf.notes()[len - 2]);
    }

    // Two-note cells such as 2 1 2 1.
    if len >= 3 && cf.notes()[len - 3] == cf.notes()[len - 1] {
        constraints.blacklist(cf.notes()[len - 2]);
    }

    // Three-note cells such as 3 2 1 3 2 1.
    if len >= 5
        && cf.notes()[len - 5] == cf.notes()[len - 2]
        && cf.notes()[len - 4] == cf.notes()[len - 1]
    {
        constraints.blacklist(cf.notes()[len - 3]);
    }

    let unused = stats.unused_in_range();
    if target_length > len + 1 {
        // The last note is the tonic, so every pitch must be in place one
        // note before the end.
        let remaining = (target_length - len - 1) as i64;
        if remaining <= unused {
            if remaining < unused {
                return None;
            }
            for pitch in stats.note_usage.keys() {
                constraints.blacklist(*pitch);
            }
        } else {
            let used_twice = stats.times_used(2);
            if (1..=3).contains(&used_twice) {
                for (pitch, &count) in &stats.note_usage {
                    if count == 2 {
                        constraints.blacklist(*pitch);
                    }
                }
            }
        }
    } else if unused != 0 {
        return None;
    }

    Some(constraints)
}
