// Cantus Firmus Generator
//
// Generates a single melodic line ("cantus firmus") in the style of species
// counterpoint by a stochastic best-first search over partial note
// sequences. A heuristic priority orders the frontier, a weighted-random
// candidate generator proposes next notes, and hard constraint rules prune
// continuations that break the style or can no longer finish.
//
// Architecture:
// - error.rs: CantusError and the crate Result alias
// - mode.rs: Mode definitions (major, minor, dorian, phrygian, lydian, mixolydian)
// - pitch.rs: Spelled pitches and named diatonic intervals
// - key.rs: Tonic + mode; diatonic stepping within the key
// - cantus.rs: The append-only note sequence
// - stats.rs: Derived statistics of a sequence + the StatsProvider seam
// - scoring.rs: Heuristic priority and the memoizing ScoredCantus wrapper
// - frontier.rs: Max-priority queue of partial sequences
// - rules.rs: Per-step pitch window and blacklist
// - candidates.rs: Weighted candidate generation (start, leap recovery, steps)
// - search.rs: The best-first driver, completed pool and ranking
// - config.rs: JSON-loadable GeneratorConfig and SearchRequest resolution
// - midi.rs: Standard MIDI File export of a finished line
//
// The generator is deterministic given a seed, supporting reproducible output.

pub mod candidates;
pub mod cantus;
pub mod config;
pub mod error;
pub mod frontier;
pub mod key;
pub mod midi;
pub mod mode;
pub mod pitch;
pub mod rules;
pub mod scoring;
pub mod search;
pub mod stats;

pub use cantus::CantusFirmus;
pub use config::{GeneratorConfig, SearchRequest};
pub use error::{CantusError, Result};
pub use key::Key;
pub use mode::Mode;
pub use pitch::{Interval, Pitch};
pub use search::{CantusSearch, SearchOutcome, search};
