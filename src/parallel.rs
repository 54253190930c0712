//! Multi-threaded nonce search
//!
//! The core search is single-threaded. Here an inclusive nonce range is cut
//! into contiguous, disjoint sub-ranges, one per thread, each searched by an
//! independent hasher. The lowest nonce found across sub-ranges is the same
//! nonce a sequential scan would return; the hash count is the total work
//! done by all threads.

use std::thread;

use tracing::{debug, info};

use crate::algorithm::{
    self, Algorithm, Difficulty, HasherOptions, MiningResult, NonceLayout, PowError,
};

/// Everything a worker needs to run its share of a search
#[derive(Debug, Clone)]
pub struct SearchJob {
    pub algorithm: Algorithm,
    pub options: HasherOptions,
    pub data: Vec<u8>,
    pub layout: NonceLayout,
    pub difficulty: Difficulty,
}

/// Split `[start, end]` into at most `parts` contiguous sub-ranges
///
/// Sub-ranges are in ascending order and differ in length by at most one.
pub fn split_range(start: u64, end: u64, parts: usize) -> Vec<(u64, u64)> {
    if start > end {
        return Vec::new();
    }

    // Width of [start, end] minus one, so the full u64 range does not overflow
    let span = end - start;
    let parts = (parts.max(1) as u64).min(span.saturating_add(1));
    let base = span / parts;
    let extra = span % parts + 1;

    let mut ranges = Vec::with_capacity(parts as usize);
    let mut lo = start;
    for i in 0..parts {
        let len_minus_one = if i < extra { base } else { base - 1 };
        let hi = lo + len_minus_one;
        ranges.push((lo, hi));
        if hi == end {
            break;
        }
        lo = hi + 1;
    }
    ranges
}

/// Search `[start, end]` on `threads` worker threads
pub fn search(
    job: &SearchJob,
    start: u64,
    end: u64,
    threads: usize,
) -> Result<MiningResult, PowError> {
    if start > end {
        return Err(PowError::InvalidNonceRange { start, end });
    }

    let ranges = split_range(start, end, threads);
    info!(
        algorithm = %job.algorithm,
        start,
        end,
        threads = ranges.len(),
        "starting nonce search"
    );

    let results: Vec<Result<MiningResult, PowError>> = thread::scope(|scope| {
        let handles: Vec<_> = ranges
            .iter()
            .enumerate()
            .map(|(worker, &(lo, hi))| {
                scope.spawn(move || {
                    let mut hasher = job.algorithm.hasher(&job.options)?;
                    let result = algorithm::search(
                        &job.data,
                        job.layout,
                        &job.difficulty,
                        lo,
                        hi,
                        hasher.as_mut(),
                    )?;
                    debug!(
                        worker,
                        lo,
                        hi,
                        hashes = result.hash_count,
                        found = result.found(),
                        "worker done"
                    );
                    Ok(result)
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| match handle.join() {
                Ok(result) => result,
                Err(panic) => std::panic::resume_unwind(panic),
            })
            .collect()
    });

    let mut merged = MiningResult {
        nonce: None,
        hash_count: 0,
        digest: None,
    };
    // Ranges are ascending, so the first hit is the lowest nonce
    for result in results {
        let result = result?;
        merged.hash_count += result.hash_count;
        if merged.nonce.is_none() && result.nonce.is_some() {
            merged.nonce = result.nonce;
            merged.digest = result.digest;
        }
    }

    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blake3_job(data: &[u8], bits: u32) -> SearchJob {
        SearchJob {
            algorithm: Algorithm::Blake3,
            options: HasherOptions::default(),
            data: data.to_vec(),
            layout: NonceLayout::Append,
            difficulty: Difficulty::LeadingZeros(bits),
        }
    }

    #[test]
    fn test_split_covers_range_exactly() {
        for (start, end, parts) in [(0, 99, 4), (5, 5, 8), (0, 10, 3), (7, 1000, 7), (0, 2, 16)] {
            let ranges = split_range(start, end, parts);
            assert!(ranges.len() <= parts);
            assert_eq!(ranges.first().unwrap().0, start);
            assert_eq!(ranges.last().unwrap().1, end);
            for pair in ranges.windows(2) {
                assert_eq!(pair[0].1 + 1, pair[1].0);
            }
            let lens: Vec<u64> = ranges.iter().map(|(lo, hi)| hi - lo + 1).collect();
            let (min, max) = (lens.iter().min().unwrap(), lens.iter().max().unwrap());
            assert!(max - min <= 1);
        }
    }

    #[test]
    fn test_split_full_u64_range() {
        let ranges = split_range(0, u64::MAX, 4);
        assert_eq!(ranges.len(), 4);
        assert_eq!(ranges[0].0, 0);
        assert_eq!(ranges[3].1, u64::MAX);
    }

    #[test]
    fn test_split_empty_and_zero_parts() {
        assert!(split_range(10, 9, 4).is_empty());
        assert_eq!(split_range(3, 8, 0), vec![(3, 8)]);
    }

    #[test]
    fn test_parallel_matches_sequential_nonce() {
        let job = blake3_job(b"parallel search", 6);
        let sequential = algorithm::mine_blake3(b"parallel search", 6, 0, 20_000).unwrap();
        let parallel = search(&job, 0, 20_000, 4).unwrap();

        assert_eq!(parallel.nonce, sequential.nonce);
        assert_eq!(parallel.digest, sequential.digest);
        assert!(parallel.hash_count >= sequential.hash_count);
    }

    #[test]
    fn test_parallel_exhausted_range() {
        let job = blake3_job(b"nothing here", 256);
        let result = search(&job, 0, 99, 3).unwrap();
        assert_eq!(result.nonce, None);
        assert_eq!(result.hash_count, 100);
    }

    #[test]
    fn test_parallel_header_layout_errors_propagate() {
        let job = SearchJob {
            algorithm: Algorithm::Sha256d,
            options: HasherOptions::default(),
            data: vec![0u8; 10],
            layout: NonceLayout::BITCOIN_HEADER,
            difficulty: Difficulty::LeadingZeros(0),
        };
        assert!(matches!(
            search(&job, 0, 10, 2),
            Err(PowError::NonceOffsetOutOfBounds { .. })
        ));
        assert!(matches!(
            search(&job, 5, 1, 2),
            Err(PowError::InvalidNonceRange { start: 5, end: 1 })
        ));
    }
}
