// Cantus Firmus Generator: CLI entry point.
//
// Runs one best-first search and prints the result; optionally writes it to
// a MIDI file and/or dumps the full outcome as JSON.
//
// Usage:
//   cantus [output.mid] [--seed N] [--tonic PITCH] [--mode MODE]
//     [--prefix "C4 E4 D4"] [--length N] [--max-range N] [--config FILE]
//     [--tempo BPM] [--json]
//
// Logging goes through env_logger; RUST_LOG=cantus_music=debug prints every
// frontier pop, =trace adds the per-step blacklists and candidate lists.
//
// Exit codes: 0 on success, 1 on invalid arguments or config, 2 when no
// cantus firmus exists for the given parameters.

use cantus_music::cantus::CantusFirmus;
use cantus_music::config::{GeneratorConfig, SearchRequest};
use cantus_music::error::{CantusError, Result};
use cantus_music::midi::write_midi;
use cantus_music::mode::Mode;
use cantus_music::pitch::Pitch;
use cantus_music::search::{CantusSearch, SearchOutcome};
use cantus_prng::CantusRng;
use clap::Parser;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(author, version, about = "Generate a species-counterpoint cantus firmus")]
struct Args {
    /// Write the result to this MIDI file
    #[arg(value_name = "OUTPUT_MID")]
    output: Option<PathBuf>,

    /// RNG seed (random when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Tonic pitch, e.g. G4 or Bb3 (drawn from the config when omitted)
    #[arg(long)]
    tonic: Option<Pitch>,

    /// Mode: major, minor, dorian, phrygian, lydian, mixolydian
    #[arg(long)]
    mode: Option<Mode>,

    /// Opening notes to continue from, space separated; the first is the
    /// tonic. Needs --mode and replaces --tonic
    #[arg(long, requires = "mode", conflicts_with = "tonic")]
    prefix: Option<String>,

    /// Number of notes (drawn from the config range when omitted)
    #[arg(long)]
    length: Option<usize>,

    /// Largest span from lowest to highest note, as an interval size
    #[arg(long)]
    max_range: Option<u32>,

    /// Generator config (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// MIDI tempo in BPM
    #[arg(long, default_value_t = 60)]
    tempo: u16,

    /// Print the full outcome as JSON instead of the text report
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    match run(&args) {
        Ok(true) => {}
        Ok(false) => std::process::exit(2),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

/// Returns whether a cantus firmus was found.
fn run(args: &Args) -> Result<bool> {
    let mut config = match &args.config {
        Some(path) => GeneratorConfig::load(path)?,
        None => GeneratorConfig::default(),
    };
    if let Some(tonic) = args.tonic {
        config.default_tonics = vec![tonic];
    }
    if let Some(mode) = args.mode {
        config.default_modes = vec![mode];
    }

    let mut request = SearchRequest::new();
    if let Some(prefix) = &args.prefix {
        let mode = args.mode.ok_or_else(|| {
            CantusError::InvalidConfig("--prefix needs --mode".into())
        })?;
        request = request.seed(parse_prefix(prefix, mode)?);
    }
    if let Some(length) = args.length {
        request = request.target_length(length);
    }
    if let Some(range) = args.max_range {
        request = request.max_range(range);
    }

    let mut rng = match args.seed {
        Some(seed) => CantusRng::new(seed),
        None => CantusRng::from_entropy(),
    };
    let outcome = CantusSearch::new(config).run(request, &mut rng)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_report(&outcome, args.seed);
    }

    let Some(best) = &outcome.best else {
        eprintln!(
            "No cantus firmus of {} notes fits within a range of {} in {}.",
            outcome.target_length, outcome.max_range, outcome.key
        );
        return Ok(false);
    };

    if let Some(path) = &args.output {
        write_midi(best, path, args.tempo)?;
        if !args.json {
            print_midi_written(path, best.len(), args.tempo);
        }
    }
    Ok(true)
}

fn parse_prefix(prefix: &str, mode: Mode) -> Result<CantusFirmus> {
    let notes = prefix
        .split_whitespace()
        .map(str::parse)
        .collect::<Result<Vec<Pitch>>>()?;
    if notes.is_empty() {
        return Err(CantusError::EmptySeed);
    }
    CantusFirmus::from_notes(notes, mode)
}

fn print_report(outcome: &SearchOutcome, seed: Option<u64>) {
    println!("=== Cantus Firmus Generator ===");
    println!("Key: {}", outcome.key);
    println!("Length: {} notes", outcome.target_length);
    println!("Max range: {}", outcome.max_range);
    if let Some(s) = seed {
        println!("Seed: {s}");
    }
    println!("Expansions: {}", outcome.expansions);
    println!();

    if outcome.ranked.is_empty() {
        return;
    }
    for (rank, ranked) in outcome.ranked.iter().enumerate() {
        println!("  #{} ({:.2})  {}", rank + 1, ranked.priority, ranked.cantus);
    }
    if let Some(best) = &outcome.best {
        println!();
        println!("Best: {best}");
    }
}

fn print_midi_written(path: &Path, notes: usize, tempo: u16) {
    // Whole notes: four beats each.
    let seconds = notes as f64 * 4.0 * 60.0 / f64::from(tempo);
    println!("Wrote {} ({seconds:.0}s at {tempo} BPM)", path.display());
}
