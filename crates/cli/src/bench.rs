//! Benchmark runner.
//!
//! For each (function, algorithm, level) triple the runner repeats the
//! operation in growing batches until one batch takes at least `min_time`,
//! then reports that batch: iterations, wall time, and allocation counts.
//!
//! Levels are `101, 1001, 10001, ...`: each one order of magnitude larger
//! than the last, always ending in 1.

use std::hint::black_box;
use std::time::{Duration, Instant};

use primecache_core::{OracleResult, PrimeOracle};
use primecache_store::OracleConfig;
use serde::Serialize;
use tracing::debug;

use crate::alloc::AllocSnapshot;
use crate::oracles::build_oracle;

/// Default number of levels (`101` up to `1000001`).
pub const DEFAULT_MAX_LEVEL: usize = 5;

/// Batches never grow past this many iterations.
const MAX_ITERATIONS: u64 = 1_000_000_000;

/// Which oracle operation to time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BenchFunction {
    /// Collect every prime up to the level
    PrimesUpTo,
    /// Test the level itself for primality
    IsPrime,
}

impl BenchFunction {
    /// Command-line spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            BenchFunction::PrimesUpTo => "primes-up-to",
            BenchFunction::IsPrime => "is-prime",
        }
    }

    /// Parse a `--function` value; `all` expands to both.
    pub fn parse_list(value: &str) -> Option<Vec<BenchFunction>> {
        match value {
            "primes-up-to" => Some(vec![BenchFunction::PrimesUpTo]),
            "is-prime" => Some(vec![BenchFunction::IsPrime]),
            "all" => Some(vec![BenchFunction::PrimesUpTo, BenchFunction::IsPrime]),
            _ => None,
        }
    }

    fn call(&self, oracle: &mut dyn PrimeOracle, level: i64) -> OracleResult<()> {
        match self {
            BenchFunction::PrimesUpTo => {
                black_box(oracle.primes_up_to(black_box(level))?);
            }
            BenchFunction::IsPrime => {
                black_box(oracle.is_prime(black_box(level))?);
            }
        }
        Ok(())
    }
}

/// What to run.
#[derive(Debug, Clone)]
pub struct BenchOptions {
    /// Number of levels, starting at 101
    pub max_level: usize,
    /// Registry names to time, in report order
    pub algorithms: Vec<String>,
    /// Operations to time
    pub functions: Vec<BenchFunction>,
    /// Minimum wall time of the reported batch
    pub min_time: Duration,
    /// Build a fresh oracle for every iteration instead of reusing one
    pub cold: bool,
}

impl Default for BenchOptions {
    fn default() -> Self {
        BenchOptions {
            max_level: DEFAULT_MAX_LEVEL,
            algorithms: crate::oracles::ALGORITHMS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            functions: vec![BenchFunction::PrimesUpTo, BenchFunction::IsPrime],
            min_time: Duration::from_secs(1),
            cold: false,
        }
    }
}

/// One line of the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchRow {
    /// Operation timed, as spelled on the command line
    pub function: &'static str,
    /// Registry name of the oracle
    pub algorithm: String,
    /// Argument passed to the operation
    pub level: i64,
    /// Iterations in the reported batch
    pub iterations: u64,
    /// Wall time of the reported batch
    pub total_secs: f64,
    /// Mean time per iteration
    pub avg_ns: u64,
    /// Mean heap allocations per iteration
    pub allocs_per_op: u64,
    /// Mean bytes allocated per iteration
    pub bytes_per_op: u64,
}

/// `count` levels starting at 101.
pub fn levels(count: usize) -> Vec<i64> {
    let mut out = Vec::with_capacity(count);
    let mut level = 101i64;
    for _ in 0..count {
        out.push(level);
        match (level - 1).checked_mul(10) {
            Some(next) => level = next + 1,
            None => break,
        }
    }
    out
}

/// Run every configured benchmark, handing each row to `emit` as it finishes.
pub fn run<F>(options: &BenchOptions, config: &OracleConfig, mut emit: F) -> anyhow::Result<()>
where
    F: FnMut(BenchRow),
{
    let levels = levels(options.max_level);
    for &function in &options.functions {
        for algorithm in &options.algorithms {
            // Warm runs share one oracle across every level of an algorithm.
            let mut warm = if options.cold {
                None
            } else {
                Some(build_oracle(algorithm, config)?)
            };
            for &level in &levels {
                let row = match warm.as_mut() {
                    Some(oracle) => measure(function, algorithm, level, options.min_time, || {
                        function.call(oracle.as_mut(), level)
                    })?,
                    None => measure(function, algorithm, level, options.min_time, || {
                        let mut oracle = build_oracle(algorithm, config)?;
                        function.call(oracle.as_mut(), level)
                    })?,
                };
                debug!(
                    function = row.function,
                    algorithm = %row.algorithm,
                    level,
                    iterations = row.iterations,
                    "benchmark finished"
                );
                emit(row);
            }
        }
    }
    Ok(())
}

/// Time `op` in batches of growing size until one batch lasts `min_time`.
pub fn measure<F>(
    function: BenchFunction,
    algorithm: &str,
    level: i64,
    min_time: Duration,
    mut op: F,
) -> OracleResult<BenchRow>
where
    F: FnMut() -> OracleResult<()>,
{
    let mut iterations: u64 = 1;
    loop {
        let before = AllocSnapshot::now();
        let start = Instant::now();
        for _ in 0..iterations {
            op()?;
        }
        let elapsed = start.elapsed();
        let allocated = AllocSnapshot::now().since(&before);

        if elapsed >= min_time || iterations >= MAX_ITERATIONS {
            return Ok(BenchRow {
                function: function.as_str(),
                algorithm: algorithm.to_string(),
                level,
                iterations,
                total_secs: elapsed.as_secs_f64(),
                avg_ns: (elapsed.as_nanos() / iterations as u128) as u64,
                allocs_per_op: allocated.allocations / iterations,
                bytes_per_op: allocated.bytes / iterations,
            });
        }
        iterations = next_batch(iterations, elapsed, min_time);
    }
}

/// Predict a batch size that reaches `min_time`, growing at least 2x and at
/// most 100x per round.
fn next_batch(iterations: u64, elapsed: Duration, min_time: Duration) -> u64 {
    let per_op = (elapsed.as_nanos() / iterations as u128).max(1);
    let wanted = (min_time.as_nanos() * 6 / 5 / per_op) as u64;
    wanted
        .max(iterations.saturating_mul(2))
        .min(iterations.saturating_mul(100))
        .min(MAX_ITERATIONS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_sequence() {
        assert_eq!(levels(0), Vec::<i64>::new());
        assert_eq!(levels(1), vec![101]);
        assert_eq!(
            levels(DEFAULT_MAX_LEVEL),
            vec![101, 1_001, 10_001, 100_001, 1_000_001]
        );
    }

    #[test]
    fn test_levels_stop_before_overflow() {
        let all = levels(100);
        assert_eq!(all.len(), 17);
        assert_eq!(*all.last().unwrap(), 1_000_000_000_000_000_001);
    }

    #[test]
    fn test_parse_function_list() {
        assert_eq!(
            BenchFunction::parse_list("all"),
            Some(vec![BenchFunction::PrimesUpTo, BenchFunction::IsPrime])
        );
        assert_eq!(
            BenchFunction::parse_list("is-prime"),
            Some(vec![BenchFunction::IsPrime])
        );
        assert_eq!(BenchFunction::parse_list("sum"), None);
    }

    #[test]
    fn test_next_batch_grows_within_bounds() {
        let min = Duration::from_millis(100);
        assert_eq!(next_batch(1, Duration::from_millis(50), min), 2);
        assert_eq!(next_batch(1, Duration::from_nanos(10), min), 100);
        assert_eq!(next_batch(10, Duration::from_millis(1), min), 1_000);
    }

    #[test]
    fn test_measure_reaches_min_time() {
        let mut calls = 0u64;
        let row = measure(
            BenchFunction::IsPrime,
            "test",
            101,
            Duration::from_millis(20),
            || {
                calls += 1;
                std::thread::sleep(Duration::from_millis(1));
                Ok(())
            },
        )
        .unwrap();
        assert!(row.total_secs >= 0.02);
        assert!(row.iterations >= 1);
        assert!(calls >= row.iterations);
        assert!(row.avg_ns >= 1_000_000);
    }

    #[test]
    fn test_run_emits_one_row_per_combination() {
        let options = BenchOptions {
            max_level: 2,
            algorithms: vec!["memo".to_string(), "naive".to_string()],
            functions: vec![BenchFunction::PrimesUpTo, BenchFunction::IsPrime],
            min_time: Duration::from_millis(1),
            cold: false,
        };
        let mut rows = Vec::new();
        run(&options, &OracleConfig::default(), |row| rows.push(row)).unwrap();
        assert_eq!(rows.len(), 8);
        assert_eq!(rows[0].function, "primes-up-to");
        assert_eq!(rows[0].algorithm, "memo");
        assert_eq!(rows[0].level, 101);
        assert_eq!(rows[1].level, 1_001);
        assert_eq!(rows[7].function, "is-prime");
        assert!(rows.iter().all(|r| r.iterations >= 1));
    }

    #[test]
    fn test_cold_run_counts_allocations() {
        let options = BenchOptions {
            max_level: 1,
            algorithms: vec!["shared".to_string()],
            functions: vec![BenchFunction::PrimesUpTo],
            min_time: Duration::from_millis(1),
            cold: true,
        };
        let mut rows = Vec::new();
        run(&options, &OracleConfig::default(), |row| rows.push(row)).unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].allocs_per_op >= 1);
        assert!(rows[0].bytes_per_op >= 26 * 8);
    }

    #[test]
    fn test_unknown_algorithm_fails() {
        let options = BenchOptions {
            algorithms: vec!["erat9".to_string()],
            ..BenchOptions::default()
        };
        assert!(run(&options, &OracleConfig::default(), |_| {}).is_err());
    }

    #[test]
    fn test_bound_error_propagates() {
        let options = BenchOptions {
            max_level: 3,
            algorithms: vec!["memo".to_string()],
            functions: vec![BenchFunction::PrimesUpTo],
            min_time: Duration::from_millis(1),
            cold: false,
        };
        let config = OracleConfig {
            max_bound: 5_000,
            ..OracleConfig::default()
        };
        let mut rows = Vec::new();
        let err = run(&options, &config, |row| rows.push(row)).unwrap_err();
        assert!(err.to_string().contains("Bound exceeded"));
        assert_eq!(rows.len(), 2);
    }
}
