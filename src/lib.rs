//! powhash miner library
//!
//! Host-side pieces of the proof-of-work CPU miner: configuration loading
//! and multi-threaded nonce range splitting on top of the single-threaded
//! core engine.
//!
//! # Example
//!
//! ```rust
//! use powhash::algorithm::{Algorithm, Difficulty, HasherOptions, NonceLayout};
//! use powhash::parallel::{self, SearchJob};
//!
//! let job = SearchJob {
//!     algorithm: Algorithm::Blake3,
//!     options: HasherOptions::default(),
//!     data: b"payload".to_vec(),
//!     layout: NonceLayout::Append,
//!     difficulty: Difficulty::LeadingZeros(4),
//! };
//!
//! let result = parallel::search(&job, 0, 10_000, 4).unwrap();
//! assert!(result.nonce.is_some());
//! ```

// Re-export the core algorithm
pub use powhash_core as algorithm;

pub mod config;
pub mod parallel;

// Convenience re-exports
pub use algorithm::{Algorithm, Digest, MiningResult, PowError, Target};
pub use config::{ConfigError, MinerConfig};
