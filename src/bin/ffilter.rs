use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::process;
use std::time::Instant;

use clap::Parser;
use memchr::memchr_iter;
use rayon::prelude::*;

use filter_rs::common::io::{read_file, read_stdin, FileData};
use filter_rs::common::{io_error_msg, reset_sigpipe};
use filter_rs::pipeline::{filter_compact, FilterConfig, DEFAULT_CAPACITY};
use filter_rs::vector::filter_scalar;

/// Lanes per vector; the unit the pipeline transfers and stores.
const WIDTH: usize = 8;

/// Input size above which the --verify recount uses rayon.
/// Below this, serial counting is faster than paying thread pool init.
const VERIFY_PARALLEL_THRESHOLD: usize = 1 << 20;

#[derive(Parser)]
#[command(
    name = "filter",
    about = "Keep numeric values >= RATIO, densely repacked in input order"
)]
struct Cli {
    /// Keep values greater than or equal to RATIO (inclusive)
    #[arg(
        short = 't',
        long = "threshold",
        value_name = "RATIO",
        allow_negative_numbers = true
    )]
    threshold: f64,

    /// Print only the number of surviving values
    #[arg(short = 'c', long = "count")]
    count: bool,

    /// Channel depth between pipeline stages
    #[arg(long = "capacity", value_name = "N", default_value_t = DEFAULT_CAPACITY)]
    capacity: usize,

    /// Cross-check the pipeline output against the scalar reference
    #[arg(long = "verify")]
    verify: bool,

    /// Report elapsed time and throughput on stderr
    #[arg(long = "stats")]
    stats: bool,

    /// File to process (reads stdin if absent or "-")
    file: Option<String>,
}

fn main() {
    reset_sigpipe();
    let cli = Cli::parse();

    // NaN and infinities would defeat the never-matching tail padding.
    if !cli.threshold.is_finite() {
        eprintln!("filter: threshold must be a finite number");
        process::exit(1);
    }

    let (data, source) = match cli.file.as_deref() {
        None | Some("-") => match read_stdin() {
            Ok(d) => (FileData::Owned(d), "standard input".to_string()),
            Err(e) => {
                eprintln!("filter: standard input: {}", io_error_msg(&e));
                process::exit(1);
            }
        },
        Some(path) => match read_file(Path::new(path)) {
            Ok(d) => (d, path.to_string()),
            Err(e) => {
                eprintln!("filter: {}: {}", path, io_error_msg(&e));
                process::exit(1);
            }
        },
    };

    let mut values = parse_values(&data, &source);
    let n = values.len();

    // The pipeline requires a multiple of the vector width; pad the ragged
    // tail with NaN, which can never satisfy a finite threshold.
    let padded = (n + WIDTH - 1) / WIDTH * WIDTH;
    values.resize(padded, f64::NAN);

    let mut config = FilterConfig::new(cli.threshold);
    config.capacity = cli.capacity;

    let started = Instant::now();
    let result = match filter_compact::<f64, WIDTH>(&values, &config) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("filter: {}", e);
            process::exit(1);
        }
    };
    let elapsed = started.elapsed();
    let matches = result.matches.unwrap_or(0) as usize;
    let flat = result.flattened();

    if cli.verify {
        verify(&values[..n], cli.threshold, matches, &flat);
    }

    if cli.stats {
        let secs = elapsed.as_secs_f64().max(f64::MIN_POSITIVE);
        let bytes = (n + matches) * std::mem::size_of::<f64>();
        eprintln!(
            "filter: {} values in, {} out, {:.6}s, {:.1} MB/s",
            n,
            matches,
            elapsed.as_secs_f64(),
            1e-6 * bytes as f64 / secs
        );
    }

    let stdout = io::stdout().lock();
    let mut out = BufWriter::with_capacity(64 * 1024, stdout);
    if cli.count {
        let _ = writeln!(out, "{}", matches);
    } else {
        for value in &flat[..matches] {
            let _ = writeln!(out, "{}", value);
        }
    }
    let _ = out.flush();
}

/// Parse newline-separated numeric values. Blank lines are skipped;
/// anything unparsable is a hard error naming the offending line.
fn parse_values(data: &[u8], source: &str) -> Vec<f64> {
    let mut values = Vec::new();
    let mut start = 0;
    let mut lineno = 0;
    for end in memchr_iter(b'\n', data).chain(std::iter::once(data.len())) {
        lineno += 1;
        let line = &data[start..end];
        start = end + 1;
        let text = match std::str::from_utf8(line) {
            Ok(t) => t.trim(),
            Err(_) => {
                eprintln!("filter: {}:{}: invalid value", source, lineno);
                process::exit(1);
            }
        };
        if text.is_empty() {
            continue;
        }
        match text.parse::<f64>() {
            Ok(v) => values.push(v),
            Err(_) => {
                eprintln!("filter: {}:{}: invalid value '{}'", source, lineno, text);
                process::exit(1);
            }
        }
    }
    values
}

/// Recompute the result with the scalar reference and fail hard on any
/// discrepancy in count or contents.
fn verify(input: &[f64], threshold: f64, matches: usize, flat: &[f64]) {
    // Independent recount, parallel for large inputs.
    let expected_count = if input.len() >= VERIFY_PARALLEL_THRESHOLD {
        input.par_iter().filter(|&&v| v >= threshold).count()
    } else {
        input.iter().filter(|&&v| v >= threshold).count()
    };
    if matches != expected_count {
        eprintln!(
            "filter: verification failed: {} surviving values, expected {}",
            matches, expected_count
        );
        process::exit(1);
    }

    let mut expected = Vec::new();
    filter_scalar(input, threshold, &mut expected);
    for (i, (got, want)) in flat[..matches].iter().zip(expected.iter()).enumerate() {
        if got != want {
            eprintln!(
                "filter: verification failed at {}: {}, expected {}",
                i, got, want
            );
            process::exit(1);
        }
    }
}
