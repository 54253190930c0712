//! Throughput benchmark

use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::Result;
use crate::hasher::{Algorithm, HasherOptions};
use crate::params::{HEADER_NONCE_OFFSET, HEADER_SIZE};

/// Result of a timed benchmark run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BenchmarkReport {
    pub algorithm: Algorithm,
    pub hashes: u64,
    pub elapsed: Duration,
    pub hashes_per_second: f64,
}

/// Synthetic 80-byte header used as benchmark input
pub fn sample_header() -> [u8; HEADER_SIZE] {
    core::array::from_fn(|i| (i * 7 + 13) as u8)
}

/// Hash a synthetic header for at least `duration`, varying the nonce each time
///
/// The clock is checked once per [`Algorithm::benchmark_batch`] hashes, so
/// the run may overshoot by up to one batch.
pub fn run(
    algorithm: Algorithm,
    options: &HasherOptions,
    duration: Duration,
) -> Result<BenchmarkReport> {
    let mut hasher = algorithm.hasher(options)?;
    let batch = algorithm.benchmark_batch();
    let mut header = sample_header();
    let mut hashes = 0u64;

    let started = Instant::now();
    loop {
        for _ in 0..batch {
            let nonce = hashes as u32;
            header[HEADER_NONCE_OFFSET..].copy_from_slice(&nonce.to_le_bytes());
            core::hint::black_box(hasher.hash(&header));
            hashes += 1;
        }
        if started.elapsed() >= duration {
            break;
        }
    }
    let elapsed = started.elapsed();

    let report = BenchmarkReport {
        algorithm,
        hashes,
        elapsed,
        hashes_per_second: hash_rate(hashes, elapsed),
    };
    debug!(
        algorithm = %algorithm,
        hashes,
        elapsed_ms = elapsed.as_millis() as u64,
        rate = report.hashes_per_second,
        "benchmark finished"
    );
    Ok(report)
}

/// Hashes per second, zero when no time elapsed
pub fn hash_rate(hashes: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs == 0.0 {
        return 0.0;
    }
    hashes as f64 / secs
}
