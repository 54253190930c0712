//! Algorithm parameters
//!
//! Fixed sizes shared by the hash primitives and the miner.

/// Digest size of every primitive
pub const DIGEST_SIZE: usize = 32;

/// SHA-256 and BLAKE3 message block size in bytes
pub const BLOCK_SIZE: usize = 64;

/// Salsa20/8 block size in bytes (one scrypt sub-block)
pub const SALSA_BLOCK_SIZE: usize = 64;

/// Scratchpad size of the RandomX-light VM hash (256 KB)
pub const SCRATCHPAD_SIZE: usize = 256 * 1024;

/// Bytes produced per scratchpad fill step
pub const SCRATCHPAD_STEP: usize = 16;

/// Register file size of the RandomX-light VM hash
pub const REGISTER_FILE_SIZE: usize = 256;

/// Pseudo-instructions executed per VM hash
pub const VM_INSTRUCTIONS: usize = 2048;

/// Length of a mining block header
pub const HEADER_SIZE: usize = 80;

/// Offset of the little-endian u32 nonce inside a block header
pub const HEADER_NONCE_OFFSET: usize = 76;

/// Litecoin scrypt cost parameter
pub const SCRYPT_LITECOIN_N: u32 = 1024;

/// Litecoin scrypt block size factor
pub const SCRYPT_LITECOIN_R: u32 = 1;

/// Litecoin scrypt parallelization factor
pub const SCRYPT_LITECOIN_P: u32 = 1;

/// Engine version reported over the C ABI
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
