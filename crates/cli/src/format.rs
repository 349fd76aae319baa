//! Result → human/json/raw string formatting.
//!
//! Three modes:
//! - **Human** (default): aligned table, e.g. `(boolean) true`, `(integer) 25`
//! - **JSON** (`--json`): `serde_json::to_string_pretty`
//! - **Raw** (`--raw`): tab-separated values, no alignment, no prefixes

use serde_json::json;

use crate::bench::BenchRow;

/// Output formatting mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
    Raw,
}

const BENCH_HEADER: [&str; 8] = [
    "Function",
    "Algorithm",
    "Parameter",
    "Iterations",
    "Total Time (s)",
    "Average Time (ns)",
    "Allocs/op",
    "Bytes/op",
];

fn bench_cells(row: &BenchRow) -> [String; 8] {
    [
        row.function.to_string(),
        row.algorithm.clone(),
        row.level.to_string(),
        row.iterations.to_string(),
        format!("{:.6}", row.total_secs),
        row.avg_ns.to_string(),
        row.allocs_per_op.to_string(),
        row.bytes_per_op.to_string(),
    ]
}

/// Format a benchmark report.
pub fn format_bench(rows: &[BenchRow], mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => {
            serde_json::to_string_pretty(rows).unwrap_or_else(|e| format_json_error(&e))
        }
        OutputMode::Raw => {
            let mut lines = vec![BENCH_HEADER.join("\t")];
            lines.extend(rows.iter().map(|r| bench_cells(r).join("\t")));
            lines.join("\n")
        }
        OutputMode::Human => {
            let header: Vec<String> = BENCH_HEADER.iter().map(|s| s.to_string()).collect();
            let body: Vec<Vec<String>> = rows.iter().map(|r| bench_cells(r).to_vec()).collect();
            render_table(&header, &body)
        }
    }
}

/// Left-align text columns, right-align numeric ones, two spaces apart.
fn render_table(header: &[String], body: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = header.iter().map(|h| h.len()).collect();
    for row in body {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.len());
        }
    }

    let render = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(&widths)
            .enumerate()
            .map(|(i, (cell, &w))| {
                if i < 2 {
                    format!("{:<w$}", cell, w = w)
                } else {
                    format!("{:>w$}", cell, w = w)
                }
            })
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = Vec::with_capacity(body.len() + 2);
    lines.push(render(header));
    lines.push(
        widths
            .iter()
            .map(|&w| "-".repeat(w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    lines.extend(body.iter().map(|row| render(row.as_slice())));
    lines.join("\n")
}

/// Format a primality answer.
pub fn format_is_prime(algorithm: &str, n: i64, prime: bool, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => serde_json::to_string_pretty(&json!({
            "algorithm": algorithm,
            "n": n,
            "prime": prime,
        }))
        .unwrap_or_else(|e| format_json_error(&e)),
        OutputMode::Raw => u8::from(prime).to_string(),
        OutputMode::Human => format!("(boolean) {}", prime),
    }
}

/// Format a prime listing.
pub fn format_primes(algorithm: &str, n: i64, primes: &[u64], mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => serde_json::to_string_pretty(&json!({
            "algorithm": algorithm,
            "n": n,
            "count": primes.len(),
            "primes": primes,
        }))
        .unwrap_or_else(|e| format_json_error(&e)),
        OutputMode::Raw => primes
            .iter()
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .join("\n"),
        OutputMode::Human => {
            if primes.is_empty() {
                return "(empty list)".to_string();
            }
            let mut out = format!("(integer) {} primes <= {}", primes.len(), n);
            for (i, p) in primes.iter().enumerate() {
                out.push_str(&format!("\n{}) {}", i + 1, p));
            }
            out
        }
    }
}

/// Format the algorithm listing.
pub fn format_algorithms(entries: &[(&str, &str)], mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => {
            let list: Vec<_> = entries
                .iter()
                .map(|(name, about)| json!({ "name": name, "description": about }))
                .collect();
            serde_json::to_string_pretty(&list).unwrap_or_else(|e| format_json_error(&e))
        }
        OutputMode::Raw => entries
            .iter()
            .map(|(name, _)| name.to_string())
            .collect::<Vec<_>>()
            .join("\n"),
        OutputMode::Human => {
            let width = entries.iter().map(|(n, _)| n.len()).max().unwrap_or(0);
            entries
                .iter()
                .map(|(name, about)| format!("{:<w$}  {}", name, about, w = width))
                .collect::<Vec<_>>()
                .join("\n")
        }
    }
}

/// Format an error.
pub fn format_error(err: &anyhow::Error, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => serde_json::to_string_pretty(&json!({
            "error": format!("{:#}", err)
        }))
        .unwrap_or_else(|_| format!("{{\"error\": \"{}\"}}", err)),
        OutputMode::Raw => format!("{:#}", err),
        OutputMode::Human => format!("(error) {:#}", err),
    }
}

fn format_json_error(e: &serde_json::Error) -> String {
    format!("{{\"error\": \"serialization failed: {}\"}}", e)
}
