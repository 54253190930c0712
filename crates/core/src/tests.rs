//! End-to-end tests across algorithms and the nonce search

use proptest::prelude::*;

use crate::{
    Algorithm, Difficulty, HasherOptions, NonceLayout, PowError, ScryptParams, Target, blake3,
    meets_difficulty, mine_blake3, mine_sha256d, randomx, scrypt, search, sha256,
};

/// Bitcoin genesis block header (nonce 2083236893)
const GENESIS_HEADER: &str = "0100000000000000000000000000000000000000000000000000000000000000\
                              000000003ba3edfd7a7b12b27ac72c3e67768f617fc81bc3888a51323a9fb8aa\
                              4b1e5e4a29ab5f49ffff001d1dac2b7c";

const GENESIS_NONCE: u32 = 2083236893;

fn genesis_header() -> [u8; 80] {
    hex::decode(GENESIS_HEADER).unwrap().try_into().unwrap()
}

fn all_digests(input: &[u8]) -> Vec<[u8; 32]> {
    vec![
        sha256::digest(input),
        sha256::digest_double(input),
        blake3::hash(input),
        scrypt::hash(input, &ScryptParams::new(16, 1, 1).unwrap()).unwrap(),
        randomx::hash(input, input),
    ]
}

#[test]
fn test_every_algorithm_handles_empty_input() {
    let digests = all_digests(b"");
    assert_eq!(digests.len(), 5);
    for digest in &digests {
        assert_eq!(digest.len(), 32);
    }
    assert_eq!(digests, all_digests(b""));
}

#[test]
fn test_different_inputs_produce_different_hashes() {
    let first = all_digests(b"input 1");
    let second = all_digests(b"input 2");
    for (a, b) in first.iter().zip(&second) {
        assert_ne!(a, b);
    }
}

#[test]
fn test_genesis_header_hash() {
    let digest = sha256::digest_double(&genesis_header());
    assert_eq!(
        hex::encode(digest),
        "6fe28c0ab6f1b372c1a6a246ae63f74f931e8365e15a089c68d6190000000000"
    );

    let target = Target::from_compact(0x1d00ffff).unwrap();
    assert!(target.is_met_by(&digest));
}

#[test]
fn test_mine_genesis_nonce() {
    let mut header = genesis_header();
    header[76..80].copy_from_slice(&0u32.to_le_bytes());
    let target = Target::from_compact(0x1d00ffff).unwrap();

    let result = mine_sha256d(&header, &target, GENESIS_NONCE - 3, GENESIS_NONCE + 7).unwrap();
    assert_eq!(result.nonce, Some(GENESIS_NONCE as u64));
    assert_eq!(result.hash_count, 4);
    assert_eq!(
        result.digest.map(hex::encode).as_deref(),
        Some("6fe28c0ab6f1b372c1a6a246ae63f74f931e8365e15a089c68d6190000000000")
    );
}

#[test]
fn test_zero_bit_difficulty_takes_first_nonce() {
    let result = mine_blake3(b"any data", 0, 1000, 2000).unwrap();
    assert_eq!(result.nonce, Some(1000));
    assert_eq!(result.hash_count, 1);
}

#[test]
fn test_impossible_target_exhausts_range() {
    let result = mine_sha256d(&[0x42; 80], &Target::ZERO, 0, 99).unwrap();
    assert_eq!(result.nonce, None);
    assert_eq!(result.hash_count, 100);
}

#[test]
fn test_repeated_search_is_idempotent() {
    let header = genesis_header();
    let target = Target::from_compact(0x1d00ffff).unwrap();
    let (start, end) = (GENESIS_NONCE - 50, GENESIS_NONCE + 50);

    let first = mine_sha256d(&header, &target, start, end).unwrap();
    let second = mine_sha256d(&header, &target, start, end).unwrap();
    assert!(first.found());
    assert_eq!(first, second);

    // Easy target, found after some work
    let easy = Target::from_compact(0x2000ffff).unwrap();
    let first = mine_sha256d(&[0x42; 80], &easy, 0, 100_000).unwrap();
    let second = mine_sha256d(&[0x42; 80], &easy, 0, 100_000).unwrap();
    assert!(first.found());
    assert_eq!(first, second);

    let first = mine_sha256d(&[0x42; 80], &Target::ZERO, 0, 99).unwrap();
    let second = mine_sha256d(&[0x42; 80], &Target::ZERO, 0, 99).unwrap();
    assert!(!first.found());
    assert_eq!(first, second);
}

#[test]
fn test_max_target_accepts_first_candidate() {
    let result = mine_sha256d(&[0x42; 80], &Target::MAX, 17, 99).unwrap();
    assert_eq!(result.nonce, Some(17));
    assert_eq!(result.hash_count, 1);
}

#[test]
fn test_invalid_range_rejected_before_hashing() {
    let mut calls = 0u32;
    let mut counting = |input: &[u8]| {
        calls += 1;
        sha256::digest(input)
    };
    let err = search(
        b"data",
        NonceLayout::Append,
        &Difficulty::LeadingZeros(0),
        5,
        4,
        &mut counting,
    )
    .unwrap_err();
    assert_eq!(err, PowError::InvalidNonceRange { start: 5, end: 4 });
    assert_eq!(calls, 0);
}

#[test]
fn test_scrypt_search_reuses_workspace() {
    let options = HasherOptions {
        scrypt: ScryptParams::new(32, 1, 1).unwrap(),
        randomx_key: None,
    };
    let mut hasher = Algorithm::Scrypt.hasher(&options).unwrap();
    let result = search(
        b"scrypt candidate",
        NonceLayout::Append,
        &Difficulty::LeadingZeros(4),
        0,
        10_000,
        hasher.as_mut(),
    )
    .unwrap();

    let nonce = result.nonce.expect("4 bits within 10k nonces");
    let mut candidate = b"scrypt candidate".to_vec();
    candidate.extend_from_slice(&nonce.to_le_bytes());
    let digest = scrypt::hash(&candidate, &options.scrypt).unwrap();
    assert!(meets_difficulty(&digest, 4));
}

#[test]
fn test_randomx_search_with_fixed_key() {
    let options = HasherOptions {
        randomx_key: Some(b"epoch seed".to_vec()),
        ..Default::default()
    };
    let mut hasher = Algorithm::RandomX.hasher(&options).unwrap();
    let result = search(
        b"blob",
        NonceLayout::Append,
        &Difficulty::LeadingZeros(0),
        3,
        3,
        hasher.as_mut(),
    )
    .unwrap();

    let mut candidate = b"blob".to_vec();
    candidate.extend_from_slice(&3u64.to_le_bytes());
    assert_eq!(
        result.digest,
        Some(randomx::hash(&candidate, b"epoch seed"))
    );
}

#[test]
fn test_avalanche_effect() {
    let input1 = b"test input";
    let mut input2 = input1.to_vec();
    input2[0] ^= 1;

    for (hash1, hash2) in all_digests(input1).iter().zip(all_digests(&input2)) {
        let diff_bits: u32 = hash1
            .iter()
            .zip(hash2)
            .map(|(a, b)| (a ^ b).count_ones())
            .sum();
        assert!(
            (90..=166).contains(&diff_bits),
            "Avalanche effect: {} bits differ (expected ~128)",
            diff_bits
        );
    }
}

fn brute_force_first(data: &[u8], bits: u32, start: u64, end: u64) -> (Option<u64>, u64) {
    let mut count = 0;
    for nonce in start..=end {
        let mut candidate = data.to_vec();
        candidate.extend_from_slice(&nonce.to_le_bytes());
        count += 1;
        if meets_difficulty(&blake3::hash(&candidate), bits) {
            return (Some(nonce), count);
        }
    }
    (None, count)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_digests_are_32_bytes_and_deterministic(
        input in proptest::collection::vec(any::<u8>(), 0..300),
    ) {
        prop_assert_eq!(sha256::digest(&input), sha256::digest(&input));
        prop_assert_eq!(blake3::hash(&input), blake3::hash(&input));
        prop_assert_eq!(sha256::digest(&input).len(), 32);
    }

    #[test]
    fn prop_search_returns_smallest_nonce(
        data in proptest::collection::vec(any::<u8>(), 0..40),
        bits in 0u32..6,
        start in 0u64..1000,
        span in 0u64..200,
    ) {
        let end = start + span;
        let result = mine_blake3(&data, bits, start, end).unwrap();
        let (expected_nonce, expected_count) = brute_force_first(&data, bits, start, end);
        prop_assert_eq!(result.nonce, expected_nonce);
        prop_assert_eq!(result.hash_count, expected_count);
    }

    #[test]
    fn prop_target_order_matches_integer_order(a in any::<[u8; 32]>(), b in any::<[u8; 32]>()) {
        // Compare as little-endian 256-bit integers
        let a_be: Vec<u8> = a.iter().rev().copied().collect();
        let b_be: Vec<u8> = b.iter().rev().copied().collect();
        prop_assert_eq!(Target::from_le_bytes(b).is_met_by(&a), a_be <= b_be);
    }

    #[test]
    fn prop_hasher_trait_matches_free_function(
        input in proptest::collection::vec(any::<u8>(), 0..128),
    ) {
        let mut hasher = Algorithm::Blake3.hasher(&HasherOptions::default()).unwrap();
        prop_assert_eq!(hasher.hash(&input), blake3::hash(&input));
    }
}
