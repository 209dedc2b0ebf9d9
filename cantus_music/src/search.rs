// Stochastic best-first search for a cantus firmus.
//
// The driver keeps a `Frontier` of partial sequences ordered by heuristic
// priority. Each iteration pops the best one and expands it:
// - a lone tonic gets its opening interval from the weighted start table;
// - anything else gets its legal next notes from `candidates`, filtered by
//   the per-step `rules`;
// - the penultimate note is forced to scale degree 2 and the final note to
//   the tonic, so a branch whose candidates lack them dies there.
//
// Finished lines go into a small completed pool. The search stops when the
// pool holds `candidates_to_build` lines or the frontier runs dry, then
// ranks the pool by priority. Running out without a finished line is a
// normal outcome (`best: None`), not an error.
//
// All randomness comes from the caller's `RandomSource`, so a fixed seed
// and config reproduce the same search exactly.

use crate::candidates::{next_note_choices, start_choices};
use crate::cantus::CantusFirmus;
use crate::config::{GeneratorConfig, ResolvedRequest, SearchRequest};
use crate::error::Result;
use crate::frontier::Frontier;
use crate::key::Key;
use crate::rules::build_constraints;
use crate::scoring::ScoredCantus;
use crate::stats::{MelodicStats, StatsProvider};
use cantus_prng::RandomSource;
use log::{debug, info, trace, warn};
use serde::Serialize;

/// What became of one popped sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum Expansion {
    /// No legal continuation; the branch is dropped.
    Dead,
    /// Continuations in preference order (first = most preferred).
    Extended(Vec<CantusFirmus>),
    /// The final note was placed.
    Completed(CantusFirmus),
}

/// A finished line and its priority.
#[derive(Debug, Clone, Serialize)]
pub struct RankedCantus {
    pub cantus: CantusFirmus,
    pub priority: f64,
}

/// Result of one search run.
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    /// Highest-ranked finished line, if any was found.
    pub best: Option<CantusFirmus>,
    /// Every finished line, best first.
    pub ranked: Vec<RankedCantus>,
    pub key: Key,
    pub target_length: usize,
    pub max_range: u32,
    /// Sequences popped from the frontier.
    pub expansions: u64,
}

/// The search driver, generic over where sequence statistics come from.
#[derive(Debug, Clone)]
pub struct CantusSearch<P: StatsProvider = MelodicStats> {
    config: GeneratorConfig,
    stats: P,
}

impl CantusSearch<MelodicStats> {
    pub fn new(config: GeneratorConfig) -> Self {
        CantusSearch {
            config,
            stats: MelodicStats,
        }
    }
}

impl Default for CantusSearch<MelodicStats> {
    fn default() -> Self {
        CantusSearch::new(GeneratorConfig::default())
    }
}

impl<P: StatsProvider> CantusSearch<P> {
    pub fn with_stats(config: GeneratorConfig, stats: P) -> Self {
        CantusSearch { config, stats }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Resolve `request` against the config and search.
    ///
    /// Errors only for invalid requests or config; an exhausted search is
    /// an `Ok` outcome with `best: None`.
    pub fn run(
        &self,
        request: SearchRequest,
        rng: &mut impl RandomSource,
    ) -> Result<SearchOutcome> {
        let resolved = request.resolve(&self.config, rng)?;
        Ok(self.run_resolved(&resolved, rng))
    }

    pub fn run_resolved(
        &self,
        request: &ResolvedRequest,
        rng: &mut impl RandomSource,
    ) -> SearchOutcome {
        info!(
            "searching for a cantus firmus in {}: {} notes, max range {}",
            request.seed.key(),
            request.target_length,
            request.max_range
        );

        let mut frontier = Frontier::new();
        let seed = ScoredCantus::new(request.seed.clone());
        let seed_priority = seed.priority(&self.stats);
        frontier.push(seed, seed_priority);

        let mut completed: Vec<ScoredCantus> = Vec::new();
        let mut expansions = 0u64;

        while completed.len() < self.config.candidates_to_build {
            let Some((candidate, priority)) = frontier.pop() else {
                break;
            };
            expansions += 1;
            debug!("pop {expansions}: {} (priority {priority:.3})", candidate.cantus());

            match self.expand(&candidate, request, rng) {
                Expansion::Dead => trace!("dead branch: {}", candidate.cantus()),
                Expansion::Extended(next) => {
                    // Reversed so the most preferred is inserted last and wins ties.
                    for cantus in next.into_iter().rev() {
                        let scored = ScoredCantus::new(cantus);
                        let priority = scored.priority(&self.stats);
                        frontier.push(scored, priority);
                    }
                }
                Expansion::Completed(cantus) => {
                    debug!("completed: {cantus}");
                    completed.push(ScoredCantus::new(cantus));
                }
            }
        }

        let mut ranked: Vec<RankedCantus> = completed
            .into_iter()
            .map(|scored| RankedCantus {
                priority: scored.priority(&self.stats),
                cantus: scored.into_cantus(),
            })
            .collect();
        ranked.sort_by(|a, b| b.priority.total_cmp(&a.priority));

        let best = ranked.first().map(|r| r.cantus.clone());
        match &best {
            Some(cantus) => {
                info!(
                    "found {} candidate(s) after {expansions} expansions; best: {cantus}",
                    ranked.len()
                );
                for (rank, r) in ranked.iter().enumerate() {
                    info!("  #{} {:.3} {}", rank + 1, r.priority, r.cantus);
                }
            }
            None => warn!(
                "no cantus firmus of {} notes within range {} in {} ({expansions} expansions)",
                request.target_length,
                request.max_range,
                request.seed.key()
            ),
        }

        SearchOutcome {
            best,
            ranked,
            key: *request.seed.key(),
            target_length: request.target_length,
            max_range: request.max_range,
            expansions,
        }
    }

    /// Expand one popped sequence.
    pub fn expand(
        &self,
        candidate: &ScoredCantus,
        request: &ResolvedRequest,
        rng: &mut impl RandomSource,
    ) -> Expansion {
        let cf = candidate.cantus();
        let target = request.target_length;
        let len = cf.len();

        if len == 1 {
            let mut openings = start_choices(cf, target, request.max_range, &self.config, rng);
            openings.truncate(self.config.start_branches);
            trace!("openings: {}", pitch_list(&openings));
            return Expansion::Extended(openings.into_iter().map(|p| cf.add_note(p)).collect());
        }

        let stats = candidate.stats(&self.stats);
        let Some(mut constraints) = build_constraints(cf, stats, target, request.max_range)
        else {
            return Expansion::Dead;
        };
        let Some(choices) = next_note_choices(cf, stats, &mut constraints, &self.config, rng)
        else {
            return Expansion::Dead;
        };
        trace!(
            "window {}..{}, blacklist [{}], choices [{}]",
            constraints.min_note,
            constraints.max_note,
            pitch_list(constraints.blacklisted()),
            pitch_list(&choices)
        );

        if len + 2 == target {
            let degree_two = cf.key().interval_from_pitch(cf.first(), 2);
            if choices.contains(&degree_two) {
                Expansion::Extended(vec![cf.add_note(degree_two)])
            } else {
                Expansion::Dead
            }
        } else if len + 1 == target {
            let tonic = *cf.first();
            if choices.contains(&tonic) {
                Expansion::Completed(cf.add_note(tonic))
            } else {
                Expansion::Dead
            }
        } else {
            Expansion::Extended(choices.into_iter().map(|p| cf.add_note(p)).collect())
        }
    }
}

fn pitch_list<'a>(pitches: impl IntoIterator<Item = &'a crate::pitch::Pitch>) -> String {
    pitches
        .into_iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Search with the default config. `None` fields are drawn from the config
/// defaults using `rng`.
pub fn search(
    seed: Option<CantusFirmus>,
    target_length: Option<usize>,
    max_range: Option<u32>,
    rng: &mut impl RandomSource,
) -> Result<Option<CantusFirmus>> {
    let request = SearchRequest {
        seed,
        target_length,
        max_range,
    };
    Ok(CantusSearch::default().run(request, rng)?.best)
}
