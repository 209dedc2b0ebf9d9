// Candidate generation: which notes may come next, in what order.
//
// Three situations:
// - Start (one note so far): any interval from the opening table, weighted.
// - Leap recovery (last interval larger than a third): the line must turn
//   back by a step or a third, and only if the run that led into the leap
//   outlines a consonance.
// - Normal step: two pools, one turning around (any consonant outline may
//   turn) and one continuing (only while the run is short). Continuing by
//   more than a step is only offered straight after a step.
//
// Each pool is a `WeightedBag` drained into draw order, so the result is a
// weighted-random preference order rather than a single pick. The driver
// pushes the list in reverse, which makes the first entry the first one
// expanded among equally scored siblings.

use crate::cantus::CantusFirmus;
use crate::config::GeneratorConfig;
use crate::pitch::Pitch;
use crate::rules::Constraints;
use crate::stats::CfStats;
use cantus_prng::{RandomSource, WeightedBag};

/// Opening intervals and their weights. Upward motion is favoured; large
/// downward leaps are rare.
const START_WEIGHTS: [(i32, f64); 12] = [
    (2, 4.0),
    (3, 4.0),
    (4, 3.0),
    (5, 4.0),
    (6, 4.0),
    (8, 1.0),
    (-2, 3.0),
    (-3, 1.0),
    (-4, 3.0),
    (-5, 1.0),
    (-6, 3.0),
    (-8, 0.5),
];

/// Turning back after a leap.
const AFTER_LEAP_WEIGHTS: [(i32, f64); 2] = [(2, 2.0), (3, 1.0)];

const DIRECTION_CHANGE_WEIGHTS: [(i32, f64); 6] =
    [(2, 2.0), (3, 2.0), (4, 2.0), (5, 2.0), (6, 2.0), (8, 1.0)];

fn same_direction_weight(size: i32) -> f64 {
    match size {
        2 => 7.0,
        3 => 3.0,
        _ => 1.0,
    }
}

/// Opening intervals available for a line of `target_length` notes whose
/// span may not exceed `max_range`.
pub fn start_intervals(
    target_length: usize,
    max_range: u32,
    config: &GeneratorConfig,
) -> Vec<(i32, f64)> {
    START_WEIGHTS
        .iter()
        .copied()
        .filter(|&(size, _)| {
            // An octave needs room to be recovered from.
            !(size.abs() == 8 && target_length < config.octave_start_min_length)
        })
        .filter(|&(size, _)| size.unsigned_abs() <= max_range)
        .collect()
}

/// Second notes for a one-note sequence, in weighted-random order.
pub fn start_choices(
    cf: &CantusFirmus,
    target_length: usize,
    max_range: u32,
    config: &GeneratorConfig,
    rng: &mut impl RandomSource,
) -> Vec<Pitch> {
    let mut bag = WeightedBag::new();
    for (size, weight) in start_intervals(target_length, max_range, config) {
        bag.add(cf.key().interval_from_pitch(cf.last(), size), weight);
    }
    bag.drain(rng)
}

/// Legal next notes in preference order, or `None` when the sequence has
/// leapt into a run it cannot turn away from.
///
/// May extend the blacklist in `constraints` (triad outlines after a third).
pub fn next_note_choices(
    cf: &CantusFirmus,
    stats: &CfStats,
    constraints: &mut Constraints,
    config: &GeneratorConfig,
    rng: &mut impl RandomSource,
) -> Option<Vec<Pitch>> {
    let key = cf.key();
    let last = *cf.last();
    let direction = stats.direction();
    let can_change_direction = stats.outlined_interval.is_melodic_consonance();

    if stats.last_interval > 3 {
        if !can_change_direction {
            return None;
        }
        let mut bag = WeightedBag::new();
        for (size, weight) in AFTER_LEAP_WEIGHTS {
            let note = key.interval_from_pitch(&last, size * -direction);
            if constraints.allows(&last, &note) {
                bag.add(note, weight);
            }
        }
        return Some(bag.drain(rng));
    }

    let mut direction_change = Vec::new();
    if can_change_direction {
        // Turning after a third must not spell out a triad. Larger intervals
        // took the leap branch above.
        if stats.last_interval == 3 {
            constraints.blacklist(key.interval_from_pitch(&last, 5 * -direction));
            constraints.blacklist(key.interval_from_pitch(&last, 6 * -direction));
        }
        let mut bag = WeightedBag::new();
        for (size, weight) in DIRECTION_CHANGE_WEIGHTS {
            let note = key.interval_from_pitch(&last, size * -direction);
            if constraints.allows(&last, &note) {
                bag.add(note, weight);
            }
        }
        direction_change = bag.drain(rng);
    }

    let mut same_direction = Vec::new();
    if stats.last_outline_length < config.max_outline_length {
        let sizes: &[i32] = match (stats.last_interval, stats.last_outline_length) {
            (2, run) if run > 2 => &[2, 3],
            (2, _) => &[2, 3, 4, 5],
            _ => &[2],
        };
        let mut bag = WeightedBag::new();
        for &size in sizes {
            if size as u32 + stats.outlined_interval_size - 1 > config.max_outline_size {
                continue;
            }
            let note = key.interval_from_pitch(&last, size * direction);
            if constraints.allows(&last, &note) {
                bag.add(note, same_direction_weight(size));
            }
        }
        same_direction = bag.drain(rng);
    }

    let choices = if rng.random_bool(config.continue_direction_probability) {
        same_direction.extend(direction_change);
        same_direction
    } else {
        direction_change.extend(same_direction);
        direction_change
    };
    Some(choices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::Mode;
    use crate::rules::build_constraints;
    use cantus_prng::CantusRng;

    fn cf(names: &[&str]) -> CantusFirmus {
        let notes = names.iter().map(|n| n.parse().unwrap()).collect();
        CantusFirmus::from_notes(notes, Mode::Major).unwrap()
    }

    fn p(s: &str) -> Pitch {
        s.parse().unwrap()
    }

    fn choices_with(names: &[&str], target: usize, config: &GeneratorConfig) -> Option<Vec<Pitch>> {
        let cf = cf(names);
        let stats = CfStats::compute(&cf);
        let mut constraints = build_constraints(&cf, &stats, target, 10).unwrap();
        next_note_choices(&cf, &stats, &mut constraints, config, &mut CantusRng::new(3))
    }

    fn sorted(mut pitches: Vec<Pitch>) -> Vec<Pitch> {
        pitches.sort();
        pitches
    }

    #[test]
    fn test_no_octave_start_for_short_lines() {
        let config = GeneratorConfig::default();
        for length in 4..10 {
            let intervals = start_intervals(length, 10, &config);
            assert!(intervals.iter().all(|&(s, _)| s.abs() != 8));
            assert_eq!(intervals.len(), 10);
        }
        let long = start_intervals(10, 10, &config);
        assert!(long.iter().any(|&(s, _)| s == 8));
        assert!(long.iter().any(|&(s, _)| s == -8));
    }

    #[test]
    fn test_start_respects_max_range() {
        let config = GeneratorConfig::default();
        let intervals = start_intervals(12, 4, &config);
        assert!(intervals.iter().all(|&(s, _)| s.abs() <= 4));
        assert!(start_intervals(12, 1, &config).is_empty());
    }

    #[test]
    fn test_start_choices_are_distinct_scale_pitches() {
        let config = GeneratorConfig::default();
        let seed = cf(&["C4"]);
        let choices = start_choices(&seed, 8, 10, &config, &mut CantusRng::new(1));
        assert_eq!(choices.len(), 10);
        assert!(!choices.contains(&p("C5")));
        assert!(choices.contains(&p("A4")));
        assert!(choices.contains(&p("E3")));
    }

    #[test]
    fn test_leap_recovery_turns_back() {
        let config = GeneratorConfig::default();
        let choices = choices_with(&["C4", "A4"], 10, &config).unwrap();
        assert_eq!(sorted(choices), vec![p("F4"), p("G4")]);
    }

    #[test]
    fn test_fourth_takes_leap_recovery() {
        let config = GeneratorConfig::default();
        let cf = cf(&["C4", "F4"]);
        let stats = CfStats::compute(&cf);
        let mut constraints = build_constraints(&cf, &stats, 10, 10).unwrap();
        let before: Vec<Pitch> = constraints.blacklisted().copied().collect();
        let choices =
            next_note_choices(&cf, &stats, &mut constraints, &config, &mut CantusRng::new(4))
                .unwrap();
        assert_eq!(sorted(choices), vec![p("D4"), p("E4")]);
        let after: Vec<Pitch> = constraints.blacklisted().copied().collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_leap_into_dissonant_outline_is_dead() {
        let config = GeneratorConfig::default();
        assert!(choices_with(&["C4", "D4", "E4", "F4", "B4"], 14, &config).is_none());
    }

    #[test]
    fn test_normal_step_offers_both_pools() {
        let config = GeneratorConfig::default();
        let choices = choices_with(&["C4", "D4"], 12, &config).unwrap();
        let expected = ["E4", "F4", "G4", "A4", "C4", "B3", "A3", "G3", "F3", "D3"];
        assert_eq!(choices.len(), expected.len());
        for name in expected {
            assert!(choices.contains(&p(name)), "missing {name}");
        }
    }

    #[test]
    fn test_pool_order_follows_coin() {
        let same_first = GeneratorConfig {
            continue_direction_probability: 1.0,
            ..GeneratorConfig::default()
        };
        let choices = choices_with(&["C4", "D4"], 12, &same_first).unwrap();
        assert!(choices[..4].iter().all(|n| n.is_higher(&p("D4"))));
        assert!(choices[4..].iter().all(|n| n.is_lower(&p("D4"))));

        let turn_first = GeneratorConfig {
            continue_direction_probability: 0.0,
            ..GeneratorConfig::default()
        };
        let choices = choices_with(&["C4", "D4"], 12, &turn_first).unwrap();
        assert!(choices[..6].iter().all(|n| n.is_lower(&p("D4"))));
    }

    #[test]
    fn test_long_run_must_turn() {
        let config = GeneratorConfig {
            continue_direction_probability: 1.0,
            ..GeneratorConfig::default()
        };
        let choices = choices_with(&["C4", "D4", "E4", "F4", "G4"], 14, &config).unwrap();
        assert!(!choices.is_empty());
        assert!(choices.iter().all(|n| n.is_lower(&p("G4"))));
    }

    #[test]
    fn test_only_step_or_third_after_three_steps() {
        let config = GeneratorConfig {
            continue_direction_probability: 1.0,
            ..GeneratorConfig::default()
        };
        let choices = choices_with(&["C4", "D4", "E4"], 14, &config).unwrap();
        let upward: Vec<Pitch> = choices.into_iter().filter(|n| n.is_higher(&p("E4"))).collect();
        assert_eq!(sorted(upward), vec![p("F4"), p("G4")]);
    }

    #[test]
    fn test_no_triad_outline_after_third() {
        let config = GeneratorConfig::default();
        let cf = cf(&["C4", "E4"]);
        let stats = CfStats::compute(&cf);
        let mut constraints = build_constraints(&cf, &stats, 12, 10).unwrap();
        let choices =
            next_note_choices(&cf, &stats, &mut constraints, &config, &mut CantusRng::new(9))
                .unwrap();
        assert!(constraints.is_blacklisted(&p("A3")));
        assert!(constraints.is_blacklisted(&p("G3")));
        assert!(!choices.contains(&p("A3")));
        assert!(!choices.contains(&p("G3")));
        assert!(!choices.contains(&p("C4")));
        assert!(choices.contains(&p("D4")));
    }
}
