// Generator configuration and search requests.
//
// Tunable parameters of the search live in `GeneratorConfig`, which can be
// loaded from JSON (every field is optional; missing fields take the
// defaults below). A `SearchRequest` carries the per-run choices (seed
// sequence, target length, max range); whatever it leaves unset is drawn from
// the config with the run's random source when the request is resolved.
//
// All validation happens here, before the search loop starts. The search
// itself never fails; it either finds a cantus firmus or reports none.

use crate::cantus::CantusFirmus;
use crate::error::{CantusError, Result};
use crate::mode::Mode;
use crate::pitch::{Letter, Pitch};
use cantus_prng::RandomSource;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Shortest target length with room for the start, the scale-degree-2
/// approach and the final tonic.
pub const MIN_TARGET_LENGTH: usize = 4;

/// Widest allowed `max_range`, as an interval size: nine octaves. Keeps the
/// pitch window within representable octaves.
pub const MAX_RANGE_LIMIT: u32 = 64;

fn check_max_range(range: u32) -> Result<()> {
    if range == 0 || range > MAX_RANGE_LIMIT {
        return Err(CantusError::InvalidMaxRange(range));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Tonics to choose from when no seed is given.
    pub default_tonics: Vec<Pitch>,
    /// Modes to choose from when no seed is given.
    pub default_modes: Vec<Mode>,
    /// Inclusive bounds for a randomly chosen target length.
    pub min_length: usize,
    pub max_length: usize,
    /// Largest allowed span from lowest to highest note, as an interval
    /// size (10 = a tenth).
    pub max_range: u32,
    /// Finished candidates to collect before picking the best.
    pub candidates_to_build: usize,
    /// Second notes pushed after the first. 1 keeps the search narrow right
    /// after the tonic, which gives more varied results between seeds.
    pub start_branches: usize,
    /// Chance that same-direction continuations are explored before
    /// direction changes.
    pub continue_direction_probability: f64,
    /// Most notes allowed in a row moving one way.
    pub max_outline_length: usize,
    /// Largest interval size a single-direction run may outline.
    pub max_outline_size: u32,
    /// Shortest target length for which an opening octave leap is offered.
    pub octave_start_min_length: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            default_tonics: vec![
                Pitch::new(Letter::G, 0, 4),
                Pitch::new(Letter::F, 0, 4),
                Pitch::new(Letter::A, 0, 4),
            ],
            default_modes: vec![Mode::Major, Mode::Minor, Mode::Dorian, Mode::Mixolydian],
            min_length: 8,
            max_length: 16,
            max_range: 10,
            candidates_to_build: 3,
            start_branches: 1,
            continue_direction_probability: 0.65,
            max_outline_length: 5,
            max_outline_size: 8,
            octave_start_min_length: 10,
        }
    }
}

impl GeneratorConfig {
    /// Load from a JSON file and validate.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json(&data)
    }

    pub fn from_json(data: &str) -> Result<Self> {
        let config: GeneratorConfig = serde_json::from_str(data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(CantusError::InvalidConfig(msg));
        if self.default_tonics.is_empty() {
            return invalid("default_tonics must not be empty".into());
        }
        if self.default_modes.is_empty() {
            return invalid("default_modes must not be empty".into());
        }
        if self.min_length < MIN_TARGET_LENGTH {
            return invalid(format!(
                "min_length {} is below the minimum of {MIN_TARGET_LENGTH}",
                self.min_length
            ));
        }
        if self.min_length > self.max_length {
            return invalid(format!(
                "min_length {} exceeds max_length {}",
                self.min_length, self.max_length
            ));
        }
        check_max_range(self.max_range)?;
        if self.candidates_to_build == 0 {
            return invalid("candidates_to_build must be at least 1".into());
        }
        if self.start_branches == 0 {
            return invalid("start_branches must be at least 1".into());
        }
        if !(0.0..=1.0).contains(&self.continue_direction_probability) {
            return invalid(format!(
                "continue_direction_probability {} is outside [0, 1]",
                self.continue_direction_probability
            ));
        }
        if self.max_outline_length < 2 {
            return invalid("max_outline_length must be at least 2".into());
        }
        if self.max_outline_size < 2 {
            return invalid("max_outline_size must be at least 2".into());
        }
        Ok(())
    }
}

/// Per-run choices. `None` fields are filled in from the config.
#[derive(Debug, Clone, Default)]
pub struct SearchRequest {
    pub seed: Option<CantusFirmus>,
    pub target_length: Option<usize>,
    pub max_range: Option<u32>,
}

impl SearchRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(mut self, seed: CantusFirmus) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn target_length(mut self, length: usize) -> Self {
        self.target_length = Some(length);
        self
    }

    pub fn max_range(mut self, range: u32) -> Self {
        self.max_range = Some(range);
        self
    }

    /// Fill in defaults (drawing from `rng` where needed) and validate.
    ///
    /// Draw order is fixed: tonic, mode, then length, each only when the
    /// request leaves it unset.
    pub fn resolve(
        self,
        config: &GeneratorConfig,
        rng: &mut impl RandomSource,
    ) -> Result<ResolvedRequest> {
        config.validate()?;
        let seed = match self.seed {
            Some(seed) => seed,
            None => {
                let tonic = *rng
                    .choose(&config.default_tonics)
                    .ok_or_else(|| CantusError::InvalidConfig("no default tonics".into()))?;
                let mode = *rng
                    .choose(&config.default_modes)
                    .ok_or_else(|| CantusError::InvalidConfig("no default modes".into()))?;
                CantusFirmus::new(tonic, mode)
            }
        };
        if seed.first() != &seed.key().tonic {
            return Err(CantusError::SeedNotOnTonic {
                tonic: seed.key().tonic.to_string(),
                first: seed.first().to_string(),
            });
        }
        let target_length = match self.target_length {
            Some(length) => length,
            None => rng.range_usize_inclusive(config.min_length, config.max_length),
        };
        if target_length < MIN_TARGET_LENGTH {
            return Err(CantusError::TargetLengthTooShort {
                length: target_length,
                min: MIN_TARGET_LENGTH,
            });
        }
        if seed.len() >= target_length {
            return Err(CantusError::SeedTooLong {
                seed_len: seed.len(),
                length: target_length,
            });
        }
        let max_range = self.max_range.unwrap_or(config.max_range);
        check_max_range(max_range)?;
        Ok(ResolvedRequest {
            seed,
            target_length,
            max_range,
        })
    }
}

/// A fully specified, validated search request.
#[derive(Debug, Clone)]
pub struct ResolvedRequest {
    pub seed: CantusFirmus,
    pub target_length: usize,
    pub max_range: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use cantus_prng::CantusRng;

    #[test]
    fn test_default_config_is_valid() {
        assert!(GeneratorConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = GeneratorConfig::from_json(
            r#"{ "default_tonics": ["D4"], "default_modes": ["dorian"], "max_range": 8 }"#,
        )
        .unwrap();
        assert_eq!(config.default_tonics, vec!["D4".parse().unwrap()]);
        assert_eq!(config.default_modes, vec![Mode::Dorian]);
        assert_eq!(config.max_range, 8);
        assert_eq!(config.min_length, 8);
        assert_eq!(config.candidates_to_build, 3);
    }

    #[test]
    fn test_invalid_json_values_rejected() {
        assert!(matches!(
            GeneratorConfig::from_json(r#"{ "default_tonics": [] }"#),
            Err(CantusError::InvalidConfig(_))
        ));
        assert!(matches!(
            GeneratorConfig::from_json(r#"{ "min_length": 12, "max_length": 9 }"#),
            Err(CantusError::InvalidConfig(_))
        ));
        assert!(matches!(
            GeneratorConfig::from_json(r#"{ "max_range": 0 }"#),
            Err(CantusError::InvalidMaxRange(0))
        ));
        assert!(matches!(
            GeneratorConfig::from_json(r#"{ "max_range": 1000 }"#),
            Err(CantusError::InvalidMaxRange(1000))
        ));
        assert!(matches!(
            GeneratorConfig::from_json(r#"{ "continue_direction_probability": 1.5 }"#),
            Err(CantusError::InvalidConfig(_))
        ));
        assert!(matches!(
            GeneratorConfig::from_json(r#"{ "default_tonics": ["X9"] }"#),
            Err(CantusError::Json(_))
        ));
    }

    #[test]
    fn test_resolve_draws_defaults_from_config() {
        let config = GeneratorConfig::default();
        let mut rng = CantusRng::new(11);
        for _ in 0..50 {
            let resolved = SearchRequest::new().resolve(&config, &mut rng).unwrap();
            assert!((8..=16).contains(&resolved.target_length));
            assert_eq!(resolved.max_range, 10);
            assert_eq!(resolved.seed.len(), 1);
            assert!(config.default_tonics.contains(resolved.seed.first()));
            assert!(config.default_modes.contains(&resolved.seed.key().mode));
        }
    }

    #[test]
    fn test_resolve_keeps_explicit_values() {
        let seed = CantusFirmus::new("C4".parse().unwrap(), Mode::Major);
        let resolved = SearchRequest::new()
            .seed(seed.clone())
            .target_length(8)
            .max_range(10)
            .resolve(&GeneratorConfig::default(), &mut CantusRng::new(0))
            .unwrap();
        assert_eq!(resolved.seed, seed);
        assert_eq!(resolved.target_length, 8);
        assert_eq!(resolved.max_range, 10);
    }

    #[test]
    fn test_resolve_rejects_bad_requests() {
        let config = GeneratorConfig::default();
        let mut rng = CantusRng::new(0);
        assert!(matches!(
            SearchRequest::new().target_length(3).resolve(&config, &mut rng),
            Err(CantusError::TargetLengthTooShort { length: 3, .. })
        ));
        assert!(matches!(
            SearchRequest::new().target_length(0).resolve(&config, &mut rng),
            Err(CantusError::TargetLengthTooShort { .. })
        ));
        assert!(matches!(
            SearchRequest::new().max_range(0).resolve(&config, &mut rng),
            Err(CantusError::InvalidMaxRange(0))
        ));
        assert!(matches!(
            SearchRequest::new().max_range(1000).resolve(&config, &mut rng),
            Err(CantusError::InvalidMaxRange(1000))
        ));
        assert!(matches!(
            SearchRequest::new()
                .max_range(i32::MAX as u32)
                .resolve(&config, &mut rng),
            Err(CantusError::InvalidMaxRange(_))
        ));
        assert!(
            SearchRequest::new()
                .max_range(MAX_RANGE_LIMIT)
                .resolve(&config, &mut rng)
                .is_ok()
        );
        let long_seed = CantusFirmus::from_notes(
            ["C4", "D4", "E4", "D4"].iter().map(|n| n.parse().unwrap()).collect(),
            Mode::Major,
        )
        .unwrap();
        assert!(matches!(
            SearchRequest::new()
                .seed(long_seed)
                .target_length(4)
                .resolve(&config, &mut rng),
            Err(CantusError::SeedTooLong { .. })
        ));
    }
}
