//! prime-bench: benchmark and query harness for primecache.
//!
//! Subcommands:
//! - `bench`: time every algorithm at levels 101, 1001, 10001, ...
//! - `is-prime N` / `primes N`: answer one query with one algorithm
//! - `list`: show the algorithm registry
//! - `config`: print the default configuration file
//!
//! Logs go to stderr, filtered by `RUST_LOG` (default `warn`); results go to
//! stdout in the mode picked by `--json` / `--raw`.

mod alloc;
mod bench;
mod commands;
mod format;
mod oracles;

use std::process;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::ArgMatches;
use primecache_store::OracleConfig;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::alloc::CountingAllocator;
use bench::{BenchFunction, BenchOptions};
use commands::build_cli;
use format::{
    format_algorithms, format_bench, format_error, format_is_prime, format_primes, OutputMode,
};
use oracles::{build_oracle, describe, ALGORITHMS};

#[global_allocator]
static GLOBAL: CountingAllocator = CountingAllocator;

fn main() {
    init_tracing();

    let matches = build_cli().get_matches();
    let output_mode = output_mode(&matches);

    if let Err(e) = run(&matches, output_mode) {
        eprintln!("{}", format_error(&e, output_mode));
        process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Global flags may appear before or after the subcommand.
fn global_flag(matches: &ArgMatches, name: &str) -> bool {
    matches.get_flag(name)
        || matches
            .subcommand()
            .map(|(_, sub)| sub.get_flag(name))
            .unwrap_or(false)
}

fn output_mode(matches: &ArgMatches) -> OutputMode {
    if global_flag(matches, "json") {
        OutputMode::Json
    } else if global_flag(matches, "raw") {
        OutputMode::Raw
    } else {
        OutputMode::Human
    }
}

fn load_config(matches: &ArgMatches) -> Result<OracleConfig> {
    let path = matches.get_one::<String>("config").or_else(|| {
        matches
            .subcommand()
            .and_then(|(_, sub)| sub.get_one::<String>("config"))
    });
    match path {
        Some(path) => {
            let config = OracleConfig::from_file(path)
                .with_context(|| format!("failed to load config {}", path))?;
            info!(path = %path, max_bound = config.max_bound, "loaded configuration");
            Ok(config)
        }
        None => Ok(OracleConfig::default()),
    }
}

fn run(matches: &ArgMatches, mode: OutputMode) -> Result<()> {
    let config = load_config(matches)?;

    match matches.subcommand() {
        Some(("bench", sub)) => run_bench(sub, &config, mode),
        Some(("is-prime", sub)) => {
            let n = *sub.get_one::<i64>("n").context("missing N")?;
            let algorithm = query_algorithm(sub);
            let mut oracle = build_oracle(algorithm, &config)?;
            let prime = oracle.is_prime(n)?;
            println!("{}", format_is_prime(algorithm, n, prime, mode));
            Ok(())
        }
        Some(("primes", sub)) => {
            let n = *sub.get_one::<i64>("n").context("missing N")?;
            let algorithm = query_algorithm(sub);
            let mut oracle = build_oracle(algorithm, &config)?;
            let primes = oracle.primes_up_to(n)?;
            let formatted = format_primes(algorithm, n, &primes, mode);
            if !formatted.is_empty() {
                println!("{}", formatted);
            }
            Ok(())
        }
        Some(("list", _)) => {
            let entries: Vec<(&str, &str)> =
                ALGORITHMS.iter().map(|&name| (name, describe(name))).collect();
            println!("{}", format_algorithms(&entries, mode));
            Ok(())
        }
        Some(("config", _)) => {
            print!("{}", OracleConfig::default_toml());
            Ok(())
        }
        Some((other, _)) => bail!("unknown command: {}", other),
        None => bail!("no command given"),
    }
}

fn query_algorithm(sub: &ArgMatches) -> &str {
    sub.get_one::<String>("algorithm")
        .map(String::as_str)
        .unwrap_or(commands::DEFAULT_QUERY_ALGORITHM)
}

fn run_bench(sub: &ArgMatches, config: &OracleConfig, mode: OutputMode) -> Result<()> {
    let function = sub
        .get_one::<String>("function")
        .map(String::as_str)
        .unwrap_or("all");
    let functions = match BenchFunction::parse_list(function) {
        Some(functions) => functions,
        None => bail!("unknown function: {}", function),
    };

    let mut options = BenchOptions {
        functions,
        ..BenchOptions::default()
    };
    if let Some(&max_level) = sub.get_one::<usize>("max-level") {
        options.max_level = max_level;
    }
    if let Some(&ms) = sub.get_one::<u64>("min-time-ms") {
        options.min_time = Duration::from_millis(ms);
    }
    if let Some(algorithms) = sub.get_many::<String>("algorithm") {
        options.algorithms = algorithms.cloned().collect();
    }
    options.cold = sub.get_flag("cold");

    info!(
        levels = options.max_level,
        algorithms = options.algorithms.len(),
        cold = options.cold,
        "starting benchmark"
    );

    let mut rows = Vec::new();
    bench::run(&options, config, |row| rows.push(row))?;
    println!("{}", format_bench(&rows, mode));
    Ok(())
}
