//! set-maths CLI: combine two named sets and export the registry as CSV.
//!
//! Usage:
//!   set-maths --first=set21 --second=set22       Combine two sets once
//!   set-maths set21 set22                        Same, positional names
//!   set-maths --auto --rounds=2                  Combine every ordered pair, twice
//!   set-maths --lucas-lehmer=4423                Lucas-Lehmer test of 2^4423 - 1
//!
//! Options:
//!   --first=<name>            First set (default: set21)
//!   --second=<name>           Second set (default: set22)
//!   --limit=<N>               Pairs to combine (default: length of the shorter set)
//!   --threads=<N>             Worker threads, N >= 1 (default: available parallelism)
//!   --output=<path>           CSV output path (default: results.csv)
//!   --seed-file=<path>        JSON seed file replacing the built-in sets
//!   --mersenne                Also register 2^p - 1 for every exponent p in set21
//!   --auto                    Auto mode over all ordered pairs
//!   --rounds=<N>              Auto-mode rounds (default: 1)
//!   --checkpoint=<path>       Lucas-Lehmer checkpoint file (default: checkpoint.json)
//!   --checkpoint-every=<N>    Save the checkpoint every N iterations (default: 1000)
//!
//! Malformed numeric values are rejected rather than replaced by defaults.
//! Logging is controlled with RUST_LOG (e.g. RUST_LOG=debug).

use std::path::Path;
use std::str::FromStr;
use std::sync::atomic::AtomicBool;

use set_maths::checkpoint::{run_lucas_lehmer, LucasLehmerOutcome, DEFAULT_CHECKPOINT_INTERVAL};
use set_maths::combinator::CombineConfig;
use set_maths::orchestrate::{run_auto, run_pair, PassOutcome};
use set_maths::registry::Registry;
use set_maths::seed;
use set_maths::{export, SetError};

/// CLI configuration parsed from command-line arguments.
#[derive(Debug, Clone, PartialEq)]
struct CliConfig {
    mode: Mode,
    first: String,
    second: String,
    limit: Option<usize>,
    threads: Option<usize>,
    output: String,
    seed_file: Option<String>,
    mersenne: bool,
    rounds: u32,
    checkpoint: String,
    checkpoint_every: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Pair,
    Auto,
    LucasLehmer(u64),
}

fn flag_value<'a>(args: &'a [String], key: &str) -> Option<&'a str> {
    args.iter().find_map(|a| a.strip_prefix(key))
}

/// Parse `key` if present; a value that does not parse is an error.
fn parse_flag<T: FromStr>(args: &[String], key: &str) -> Result<Option<T>, SetError> {
    flag_value(args, key)
        .map(|v| {
            v.parse::<T>().map_err(|_| SetError::InvalidArgument {
                flag: key.trim_end_matches('=').to_string(),
                value: v.to_string(),
            })
        })
        .transpose()
}

fn parse_args(args: &[String]) -> Result<CliConfig, SetError> {
    let positional: Vec<&String> = args.iter().skip(1).filter(|a| !a.starts_with("--")).collect();

    let mode = if let Some(p) = parse_flag::<u64>(args, "--lucas-lehmer=")? {
        Mode::LucasLehmer(p)
    } else if args.iter().any(|a| a == "--auto") {
        Mode::Auto
    } else {
        Mode::Pair
    };

    let first = flag_value(args, "--first=")
        .map(str::to_string)
        .or_else(|| positional.first().map(|s| s.to_string()))
        .unwrap_or_else(|| "set21".to_string());

    let second = flag_value(args, "--second=")
        .map(str::to_string)
        .or_else(|| positional.get(1).map(|s| s.to_string()))
        .unwrap_or_else(|| "set22".to_string());

    let limit = parse_flag::<usize>(args, "--limit=")?;

    let threads = parse_flag::<usize>(args, "--threads=")?;
    if threads == Some(0) {
        return Err(SetError::InvalidArgument {
            flag: "--threads".to_string(),
            value: "0".to_string(),
        });
    }

    let output = flag_value(args, "--output=")
        .map(str::to_string)
        .unwrap_or_else(|| "results.csv".to_string());

    let seed_file = flag_value(args, "--seed-file=").map(str::to_string);

    let rounds = parse_flag::<u32>(args, "--rounds=")?.unwrap_or(1);

    let checkpoint = flag_value(args, "--checkpoint=")
        .map(str::to_string)
        .unwrap_or_else(|| "checkpoint.json".to_string());

    let checkpoint_every = parse_flag::<u64>(args, "--checkpoint-every=")?.unwrap_or(DEFAULT_CHECKPOINT_INTERVAL);
    if checkpoint_every == 0 {
        return Err(SetError::InvalidArgument {
            flag: "--checkpoint-every".to_string(),
            value: "0".to_string(),
        });
    }

    Ok(CliConfig {
        mode,
        first,
        second,
        limit,
        threads,
        output,
        seed_file,
        mersenne: args.iter().any(|a| a == "--mersenne"),
        rounds,
        checkpoint,
        checkpoint_every,
    })
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let config = match parse_args(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    };

    println!("========================================");
    println!("  set-maths: prime set combination");
    println!("========================================");
    println!();

    let result = match config.mode {
        Mode::LucasLehmer(p) => run_lucas_lehmer_mode(p, &config),
        Mode::Pair | Mode::Auto => run(&config),
    };
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    println!();
    println!("========================================");
    println!("  Done.");
    println!("========================================");
}

fn run(config: &CliConfig) -> Result<(), SetError> {
    let mut registry = match &config.seed_file {
        Some(path) => seed::load_seed_file(path)?,
        None => seed::default_registry()?,
    };

    if config.mersenne {
        let numbers = seed::mersenne_numbers(&registry, "set21")?;
        if let Some(name) = registry.register_nonempty(numbers)? {
            println!("Registered Mersenne numbers of set21 as {}", name);
        }
    }

    print_registry(&registry);

    let combine_config = match config.threads {
        Some(workers) => CombineConfig::with_workers(workers),
        None => CombineConfig::default(),
    };
    println!("Workers: {}", combine_config.workers);
    println!();

    if config.mode == Mode::Auto {
        let stop = AtomicBool::new(false);
        let summary = run_auto(&mut registry, config.rounds, &combine_config, &stop)?;
        for pass in &summary.passes {
            print_pass(pass);
        }
        println!(
            "Auto mode: {} rounds, {} passes, {} new sets",
            summary.rounds_completed,
            summary.passes.len(),
            summary.registered_names().len()
        );
    } else {
        let pass = run_pair(&mut registry, &config.first, &config.second, config.limit, &combine_config)?;
        print_pass(&pass);
    }

    let summary = export(&registry, &config.output)?;
    println!();
    println!(
        "Results saved to {} ({} columns, {} rows)",
        summary.path.display(),
        summary.columns,
        summary.rows
    );
    Ok(())
}

fn run_lucas_lehmer_mode(p: u64, config: &CliConfig) -> Result<(), SetError> {
    println!("--- Lucas-Lehmer Mode ---");
    println!("  Exponent: {}", p);
    println!("  Checkpoint: {} (every {} iterations)", config.checkpoint, config.checkpoint_every);
    println!();

    let stop = AtomicBool::new(false);
    let run = run_lucas_lehmer(p, Path::new(&config.checkpoint), config.checkpoint_every, &stop)?;
    if let Some(iteration) = run.resumed_from {
        println!("Resumed from iteration {}", iteration);
    }
    match run.outcome {
        LucasLehmerOutcome::Prime => println!("2^{} - 1 is prime", p),
        LucasLehmerOutcome::Composite => println!("2^{} - 1 is composite", p),
        LucasLehmerOutcome::Interrupted { iteration } => {
            println!("Stopped at iteration {}; rerun to resume from {}", iteration, config.checkpoint)
        }
    }
    Ok(())
}

fn print_registry(registry: &Registry) {
    println!("Sets:");
    for (name, values) in registry.iter() {
        println!("  {:>8} | {:>6} values", name, values.len());
    }
    println!();
}

fn print_pass(pass: &PassOutcome) {
    println!(
        "{} x {} ({} pairs, {:.2}s)",
        pass.first,
        pass.second,
        pass.limit,
        pass.duration.as_secs_f64()
    );
    if pass.registered.is_empty() {
        println!("  no prime results");
    }
    for set in &pass.registered {
        println!("  {:>10} -> {:>8} ({} values)", set.operation.to_string(), set.name, set.len);
    }
    println!("Processed. Next set index is: {}", pass.next_set_index);
}
