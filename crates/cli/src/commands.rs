//! Clap command tree definition.

use clap::{value_parser, Arg, ArgAction, Command};

use crate::oracles::ALGORITHMS;

/// Algorithm used by single queries when `--algorithm` is absent.
pub const DEFAULT_QUERY_ALGORITHM: &str = "shared";

/// Build the complete CLI command tree.
pub fn build_cli() -> Command {
    Command::new("prime-bench")
        .about("Benchmark and query prime number algorithms")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .value_name("FILE")
                .help("TOML configuration for the memoizing stores")
                .global(true),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("JSON output mode")
                .action(ArgAction::SetTrue)
                .conflicts_with("raw")
                .global(true),
        )
        .arg(
            Arg::new("raw")
                .long("raw")
                .help("Raw output mode (tab-separated, no alignment)")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(build_bench())
        .subcommand(build_is_prime())
        .subcommand(build_primes())
        .subcommand(Command::new("list").about("List available algorithms"))
        .subcommand(Command::new("config").about("Print the default configuration file"))
}

fn algorithm_arg() -> Arg {
    Arg::new("algorithm")
        .long("algorithm")
        .short('a')
        .value_name("NAME")
        .value_parser(ALGORITHMS)
}

fn number_arg() -> Arg {
    Arg::new("n")
        .required(true)
        .value_name("N")
        .allow_negative_numbers(true)
        .value_parser(value_parser!(i64))
}

fn build_bench() -> Command {
    Command::new("bench")
        .about("Time every algorithm at levels 101, 1001, 10001, ...")
        .arg(
            Arg::new("max-level")
                .long("max-level")
                .short('l')
                .value_name("N")
                .default_value("5")
                .value_parser(value_parser!(usize))
                .help("Number of levels to run"),
        )
        .arg(
            algorithm_arg()
                .action(ArgAction::Append)
                .help("Algorithm to benchmark (repeatable, default: all)"),
        )
        .arg(
            Arg::new("function")
                .long("function")
                .short('f')
                .value_name("FUNCTION")
                .default_value("all")
                .value_parser(["primes-up-to", "is-prime", "all"])
                .help("Operation to time"),
        )
        .arg(
            Arg::new("min-time-ms")
                .long("min-time-ms")
                .value_name("MS")
                .default_value("1000")
                .value_parser(value_parser!(u64))
                .help("Minimum wall time per measurement"),
        )
        .arg(
            Arg::new("cold")
                .long("cold")
                .action(ArgAction::SetTrue)
                .help("Build a fresh oracle for every iteration"),
        )
}

fn build_is_prime() -> Command {
    Command::new("is-prime")
        .about("Test one integer for primality")
        .arg(number_arg().help("Integer to test"))
        .arg(
            algorithm_arg()
                .default_value(DEFAULT_QUERY_ALGORITHM)
                .help("Algorithm to answer with"),
        )
}

fn build_primes() -> Command {
    Command::new("primes")
        .about("List every prime up to N")
        .arg(number_arg().help("Inclusive upper bound"))
        .arg(
            algorithm_arg()
                .default_value(DEFAULT_QUERY_ALGORITHM)
                .help("Algorithm to answer with"),
        )
}
