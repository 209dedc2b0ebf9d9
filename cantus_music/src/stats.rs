// Derived statistics of a (partial) cantus firmus.
//
// Everything the scorer and the constraint rules need to know about a
// sequence is computed here in one pass over its notes: extremes, usage
// counts, the histogram of how many pitches have been used k times, the
// interval histogram, the current directional run ("outline") and the
// spread of note usage across the range.
//
// Stats are a snapshot. They are attached to a sequence through
// `scoring::ScoredCantus`, which computes them at most once per candidate.
// The `StatsProvider` trait is the seam that lets tests count or replace
// the computation.

use crate::cantus::CantusFirmus;
use crate::pitch::{Interval, Pitch};
use std::collections::BTreeMap;

/// Mean and population standard deviation of a set of weights.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightSummary {
    pub mean: f64,
    pub std_deviation: f64,
}

impl WeightSummary {
    pub fn of(weights: &[f64]) -> WeightSummary {
        if weights.is_empty() {
            return WeightSummary {
                mean: 0.0,
                std_deviation: 0.0,
            };
        }
        let n = weights.len() as f64;
        let mean = weights.iter().sum::<f64>() / n;
        let variance = weights.iter().map(|w| (w - mean).powi(2)).sum::<f64>() / n;
        WeightSummary {
            mean,
            std_deviation: variance.sqrt(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CfStats {
    pub lowest_note: Pitch,
    pub highest_note: Pitch,
    /// Times each pitch has been used.
    pub note_usage: BTreeMap<Pitch, u32>,
    /// For each usage count k, how many distinct pitches were used exactly k times.
    pub times_notes_used: BTreeMap<u32, u32>,
    /// For each unsigned interval size, how often it occurs between neighbours.
    pub interval_usage: BTreeMap<u32, u32>,
    /// Number of scale pitches from lowest to highest, inclusive.
    pub range: u32,
    pub unique_notes: u32,
    /// Unsigned size of the last interval; 0 for a single note.
    pub last_interval: u32,
    pub is_ascending: bool,
    /// Notes in the current run moving in one direction, including both ends.
    pub last_outline_length: usize,
    /// Interval from the start of the current run to the last note.
    pub outlined_interval: Interval,
    pub outlined_interval_size: u32,
    /// Intervals larger than a step.
    pub leaps: u32,
    /// Spread of usage counts over every scale pitch in the range.
    pub note_weights: WeightSummary,
}

impl CfStats {
    pub fn compute(cf: &CantusFirmus) -> CfStats {
        let notes = cf.notes();
        let first = *cf.first();
        let last = *cf.last();

        let mut lowest_note = first;
        let mut highest_note = first;
        let mut note_usage: BTreeMap<Pitch, u32> = BTreeMap::new();
        for note in notes {
            if note.is_lower(&lowest_note) {
                lowest_note = *note;
            }
            if note.is_higher(&highest_note) {
                highest_note = *note;
            }
            *note_usage.entry(*note).or_insert(0) += 1;
        }

        let mut times_notes_used: BTreeMap<u32, u32> = BTreeMap::new();
        for &count in note_usage.values() {
            *times_notes_used.entry(count).or_insert(0) += 1;
        }

        let mut interval_usage: BTreeMap<u32, u32> = BTreeMap::new();
        let mut leaps = 0;
        for pair in notes.windows(2) {
            let size = pair[0].interval(&pair[1]).size();
            *interval_usage.entry(size).or_insert(0) += 1;
            if size > 2 {
                leaps += 1;
            }
        }

        let ascending = |i: usize| notes[i].is_higher(&notes[i - 1]);
        let (last_interval, is_ascending, last_outline_length) = if notes.len() >= 2 {
            let n = notes.len();
            let direction = ascending(n - 1);
            let mut run = 2;
            while run < n && ascending(n - run) == direction {
                run += 1;
            }
            (notes[n - 2].interval(&last).size(), direction, run)
        } else {
            (0, true, 1)
        };
        let outline_start = notes[notes.len() - last_outline_length];
        let outlined_interval = outline_start.interval(&last);

        let range = lowest_note.interval(&highest_note).size();
        let weights: Vec<f64> = cf
            .key()
            .pitches_between(&lowest_note, &highest_note)
            .iter()
            .map(|p| note_usage.get(p).copied().unwrap_or(0) as f64)
            .collect();

        CfStats {
            lowest_note,
            highest_note,
            unique_notes: note_usage.len() as u32,
            note_usage,
            times_notes_used,
            interval_usage,
            range,
            last_interval,
            is_ascending,
            last_outline_length,
            outlined_interval,
            outlined_interval_size: outlined_interval.size(),
            leaps,
            note_weights: WeightSummary::of(&weights),
        }
    }

    pub fn usage(&self, pitch: &Pitch) -> u32 {
        self.note_usage.get(pitch).copied().unwrap_or(0)
    }

    /// How many distinct pitches have been used exactly `times` times.
    pub fn times_used(&self, times: u32) -> u32 {
        self.times_notes_used.get(&times).copied().unwrap_or(0)
    }

    pub fn interval_count(&self, size: u32) -> u32 {
        self.interval_usage.get(&size).copied().unwrap_or(0)
    }

    /// Scale pitches inside the current range that have not been used yet.
    pub fn unused_in_range(&self) -> i64 {
        self.range as i64 - self.unique_notes as i64
    }

    /// +1 when the current run ascends, -1 when it descends.
    pub fn direction(&self) -> i32 {
        if self.is_ascending { 1 } else { -1 }
    }
}

/// Source of `CfStats` for a sequence.
pub trait StatsProvider {
    fn compute(&self, cf: &CantusFirmus) -> CfStats;
}

/// The standard provider: a straight call to `CfStats::compute`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MelodicStats;

impl StatsProvider for MelodicStats {
    fn compute(&self, cf: &CantusFirmus) -> CfStats {
        CfStats::compute(cf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::Mode;

    fn cf(names: &[&str]) -> CantusFirmus {
        let notes = names.iter().map(|n| n.parse().unwrap()).collect();
        CantusFirmus::from_notes(notes, Mode::Major).unwrap()
    }

    fn p(s: &str) -> Pitch {
        s.parse().unwrap()
    }

    #[test]
    fn test_single_note() {
        let stats = CfStats::compute(&cf(&["C4"]));
        assert_eq!(stats.range, 1);
        assert_eq!(stats.unique_notes, 1);
        assert_eq!(stats.last_interval, 0);
        assert_eq!(stats.last_outline_length, 1);
        assert_eq!(stats.outlined_interval_size, 1);
        assert_eq!(stats.leaps, 0);
    }

    #[test]
    fn test_stepwise_turn() {
        let stats = CfStats::compute(&cf(&["C4", "D4", "E4", "F4", "E4"]));
        assert_eq!(stats.lowest_note, p("C4"));
        assert_eq!(stats.highest_note, p("F4"));
        assert_eq!(stats.range, 4);
        assert_eq!(stats.unique_notes, 4);
        assert_eq!(stats.usage(&p("E4")), 2);
        assert_eq!(stats.times_used(1), 3);
        assert_eq!(stats.times_used(2), 1);
        assert_eq!(stats.times_used(3), 0);
        assert_eq!(stats.interval_count(2), 4);
        assert_eq!(stats.last_interval, 2);
        assert!(!stats.is_ascending);
        assert_eq!(stats.direction(), -1);
        assert_eq!(stats.last_outline_length, 2);
        assert_eq!(stats.outlined_interval.to_string(), "m2");
        assert_eq!(stats.leaps, 0);
        assert_eq!(stats.unused_in_range(), 0);
        assert!((stats.note_weights.mean - 1.25).abs() < 1e-9);
        assert!((stats.note_weights.std_deviation - 0.1875f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_arpeggiated_run() {
        let stats = CfStats::compute(&cf(&["C4", "E4", "G4", "C5"]));
        assert!(stats.is_ascending);
        assert_eq!(stats.last_outline_length, 4);
        assert_eq!(stats.outlined_interval.to_string(), "P8");
        assert_eq!(stats.outlined_interval_size, 8);
        assert_eq!(stats.last_interval, 4);
        assert_eq!(stats.leaps, 3);
        assert_eq!(stats.interval_count(3), 2);
        assert_eq!(stats.interval_count(4), 1);
        assert_eq!(stats.range, 8);
        assert_eq!(stats.unused_in_range(), 4);
    }

    #[test]
    fn test_weights_count_unused_pitches_as_zero() {
        // C and E used, D skipped: weights [1, 0, 1].
        let stats = CfStats::compute(&cf(&["C4", "E4"]));
        assert!((stats.note_weights.mean - 2.0 / 3.0).abs() < 1e-9);
        assert!(stats.note_weights.std_deviation > 0.0);
    }

    #[test]
    fn test_weight_summary_empty_and_flat() {
        assert_eq!(WeightSummary::of(&[]).std_deviation, 0.0);
        assert_eq!(WeightSummary::of(&[2.0, 2.0, 2.0]).std_deviation, 0.0);
    }
}
