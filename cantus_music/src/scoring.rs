// Heuristic priority of a (partial) cantus firmus.
//
// The priority orders the search frontier (best-first) and ranks finished
// candidates. It starts from the sequence length, so longer prefixes are
// preferred and the search dives toward complete melodies, and subtracts
// penalties for lopsided note usage, too few steps, repeated octave leaps,
// and too many or too few leaps. Only the relative order matters.
//
// `ScoredCantus` wraps a sequence with write-once caches for its stats and
// priority: once computed for a candidate, neither is computed again.

use crate::cantus::CantusFirmus;
use crate::stats::{CfStats, StatsProvider};
use std::cell::OnceCell;

/// Intervals per desired step: steps should make up at least 1/1.85 (~54%)
/// of all intervals.
const INTERVALS_PER_DESIRED_STEP: f64 = 1.85;

/// Leaps allowed before each extra one costs a point.
const MAX_UNPENALIZED_LEAPS: u32 = 4;

/// Score a sequence of `length` notes with the given stats.
pub fn priority(length: usize, stats: &CfStats) -> f64 {
    let len = length as f64;
    let mut score = len;

    // Uneven emphasis across the pitches of the range.
    let spread = stats.note_weights.std_deviation;
    if spread > 1.0 && length > 2 {
        score -= (spread - 1.0) * len;
    }

    if length > 3 {
        let desired_seconds = (len - 1.0) / INTERVALS_PER_DESIRED_STEP;
        let seconds = stats.interval_count(2) as f64;
        if seconds < desired_seconds {
            score -= desired_seconds - seconds;
        }
    }

    // Every octave leap after the first.
    let octaves = stats.interval_count(8);
    if octaves > 1 {
        score -= (octaves - 1) as f64;
    }

    if stats.leaps > MAX_UNPENALIZED_LEAPS {
        score -= (stats.leaps - MAX_UNPENALIZED_LEAPS) as f64;
    } else if length >= 5 {
        // Roughly 2-4 leaps for 8-16 notes; never a bonus.
        let deduction = (stats.leaps as f64 - len / 4.0) * 2.0;
        if deduction < 0.0 {
            score += deduction;
        }
    }

    score
}

/// A candidate sequence with lazily computed, never recomputed, stats and
/// priority.
#[derive(Debug, Clone)]
pub struct ScoredCantus {
    cantus: CantusFirmus,
    stats: OnceCell<CfStats>,
    priority: OnceCell<f64>,
}

impl ScoredCantus {
    pub fn new(cantus: CantusFirmus) -> Self {
        ScoredCantus {
            cantus,
            stats: OnceCell::new(),
            priority: OnceCell::new(),
        }
    }

    pub fn cantus(&self) -> &CantusFirmus {
        &self.cantus
    }

    pub fn into_cantus(self) -> CantusFirmus {
        self.cantus
    }

    pub fn stats(&self, provider: &impl StatsProvider) -> &CfStats {
        self.stats.get_or_init(|| provider.compute(&self.cantus))
    }

    pub fn priority(&self, provider: &impl StatsProvider) -> f64 {
        *self
            .priority
            .get_or_init(|| priority(self.cantus.len(), self.stats(provider)))
    }
}

impl From<CantusFirmus> for ScoredCantus {
    fn from(cantus: CantusFirmus) -> Self {
        ScoredCantus::new(cantus)
    }
}
