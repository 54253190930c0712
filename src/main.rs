//! powhash CLI
//!
//! Command-line front end for the proof-of-work engine.
//!
//! # Commands
//!
//! - `hash` - Compute a single digest
//! - `mine-header` - Mine an 80-byte block header with double SHA-256
//! - `mine` - Mine `data || nonce` for leading zero bits with any algorithm
//! - `benchmark` - Measure hash rate
//! - `params` - Print algorithm parameters

use clap::{Args, Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

use powhash::algorithm::{
    self, benchmark, Algorithm, Difficulty, HasherOptions, NonceLayout, PowHasher,
    HEADER_NONCE_OFFSET, HEADER_SIZE, REGISTER_FILE_SIZE, SCRATCHPAD_SIZE, VM_INSTRUCTIONS,
};
use powhash::config::MinerConfig;
use powhash::parallel::{self, SearchJob};
use powhash::{MiningResult, Target};

#[derive(Parser)]
#[command(name = "powhash")]
#[command(version)]
#[command(about = "Multi-algorithm proof-of-work CPU miner")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (default: ~/.powhash/config.json if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log filter, e.g. `info` or `powhash_core=debug` (overrides RUST_LOG)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct InputArgs {
    /// Input as hex
    #[arg(long)]
    hex: Option<String>,

    /// Input as UTF-8 text
    #[arg(long)]
    text: Option<String>,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct TargetArgs {
    /// Target as 64 hex characters, most significant byte first
    #[arg(long)]
    target: Option<String>,

    /// Compact target (nBits), e.g. 1d00ffff
    #[arg(long)]
    bits: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute a single digest
    Hash {
        /// sha256, sha256d, blake3, scrypt or randomx (default: from config)
        #[arg(short, long)]
        algorithm: Option<Algorithm>,

        #[command(flatten)]
        input: InputArgs,

        /// RandomX-light key as hex (default: from config, else the input)
        #[arg(long)]
        key: Option<String>,
    },

    /// Mine an 80-byte block header with double SHA-256
    MineHeader {
        /// Block header as 160 hex characters
        #[arg(long)]
        header: String,

        #[command(flatten)]
        target: TargetArgs,

        /// First nonce to try
        #[arg(long, default_value = "0")]
        start: u32,

        /// Last nonce to try (inclusive)
        #[arg(long, default_value_t = u32::MAX)]
        end: u32,

        /// Number of threads to use (default: number of CPU cores)
        #[arg(short, long)]
        threads: Option<usize>,
    },

    /// Mine `data || nonce (u64 LE)` for leading zero bits
    Mine {
        #[arg(short, long)]
        algorithm: Option<Algorithm>,

        /// Data prefix as hex
        #[arg(long)]
        data: String,

        /// Target difficulty (number of leading zero bits)
        #[arg(short, long, default_value = "16")]
        difficulty: u32,

        #[arg(long, default_value = "0")]
        start: u64,

        #[arg(long, default_value_t = u64::MAX)]
        end: u64,

        /// Number of threads to use (default: number of CPU cores)
        #[arg(short, long)]
        threads: Option<usize>,
    },

    /// Run performance benchmark
    Benchmark {
        /// Algorithm name or `all`
        #[arg(short, long, default_value = "all")]
        algorithm: String,

        /// Duration per algorithm in milliseconds
        #[arg(long, default_value = "2000")]
        duration_ms: u64,
    },

    /// Print algorithm parameters
    Params,
}

fn main() {
    let cli = Cli::parse();

    let config = match MinerConfig::load_or_default(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(cli.log_level.as_deref().or(config.log_level.as_deref()));

    let result = match cli.command {
        Commands::Hash {
            algorithm,
            input,
            key,
        } => cmd_hash(&config, algorithm, &input, key.as_deref(), cli.json),
        Commands::MineHeader {
            header,
            target,
            start,
            end,
            threads,
        } => cmd_mine_header(&config, &header, &target, start, end, threads, cli.json),
        Commands::Mine {
            algorithm,
            data,
            difficulty,
            start,
            end,
            threads,
        } => cmd_mine(
            &config, algorithm, &data, difficulty, start, end, threads, cli.json,
        ),
        Commands::Benchmark {
            algorithm,
            duration_ms,
        } => cmd_benchmark(&config, &algorithm, duration_ms, cli.json),
        Commands::Params => cmd_params(&config, cli.json),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Install the stderr subscriber; stdout carries only results
fn init_logging(level: Option<&str>) {
    let filter = match level {
        Some(directive) => EnvFilter::new(directive),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn decode_hex(label: &str, s: &str) -> anyhow::Result<Vec<u8>> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(s).map_err(|e| anyhow::anyhow!("Invalid {} hex: {}", label, e))
}

fn resolve_algorithm(config: &MinerConfig, flag: Option<Algorithm>) -> anyhow::Result<Algorithm> {
    match flag {
        Some(algorithm) => Ok(algorithm),
        None => Ok(config.algorithm()?),
    }
}

fn resolve_threads(config: &MinerConfig, flag: Option<usize>) -> usize {
    flag.or(config.threads).unwrap_or_else(num_cpus::get).max(1)
}

fn cmd_hash(
    config: &MinerConfig,
    algorithm: Option<Algorithm>,
    input: &InputArgs,
    key: Option<&str>,
    as_json: bool,
) -> anyhow::Result<()> {
    let algorithm = resolve_algorithm(config, algorithm)?;
    let data = match (&input.hex, &input.text) {
        (Some(hex_str), _) => decode_hex("input", hex_str)?,
        (None, Some(text)) => text.as_bytes().to_vec(),
        (None, None) => anyhow::bail!("Provide --hex or --text"),
    };

    let mut options = config.hasher_options()?;
    if let Some(key) = key {
        options.randomx_key = Some(decode_hex("key", key)?);
    }

    let mut hasher = algorithm.hasher(&options)?;
    let digest = hasher.hash(&data);

    if as_json {
        println!(
            "{}",
            json!({
                "algorithm": algorithm.name(),
                "input_len": data.len(),
                "digest": hex::encode(digest),
            })
        );
    } else {
        println!("{}", hex::encode(digest));
    }

    Ok(())
}

fn print_mining_result(
    algorithm: Algorithm,
    result: &MiningResult,
    elapsed: Duration,
    as_json: bool,
) {
    let hashrate = benchmark::hash_rate(result.hash_count, elapsed);

    if as_json {
        println!(
            "{}",
            json!({
                "algorithm": algorithm.name(),
                "found": result.found(),
                "nonce": result.nonce,
                "digest": result.digest.map(hex::encode),
                "hash_count": result.hash_count,
                "elapsed_secs": elapsed.as_secs_f64(),
                "hashes_per_second": hashrate,
            })
        );
        return;
    }

    match (result.nonce, result.digest) {
        (Some(nonce), Some(digest)) => {
            println!("Found valid hash!");
            println!("Nonce: {}", nonce);
            println!("Hash: {}", hex::encode(digest));
        }
        _ => println!("No valid nonce in range"),
    }
    println!("Hashes computed: {}", result.hash_count);
    println!("Time elapsed: {:.2}s", elapsed.as_secs_f64());
    println!("Hashrate: {:.2} H/s", hashrate);
}

fn cmd_mine_header(
    config: &MinerConfig,
    header_hex: &str,
    target: &TargetArgs,
    start: u32,
    end: u32,
    threads: Option<usize>,
    as_json: bool,
) -> anyhow::Result<()> {
    let header = decode_hex("header", header_hex)?;
    if header.len() != HEADER_SIZE {
        anyhow::bail!("Header must be {HEADER_SIZE} bytes, got {}", header.len());
    }

    let target = match (&target.target, &target.bits) {
        (Some(hex_str), _) => Target::from_hex(hex_str)?,
        (None, Some(bits)) => {
            let bits = u32::from_str_radix(bits.trim_start_matches("0x"), 16)
                .map_err(|e| anyhow::anyhow!("Invalid compact bits: {}", e))?;
            Target::from_compact(bits)?
        }
        (None, None) => anyhow::bail!("Provide --target or --bits"),
    };

    let threads = resolve_threads(config, threads);
    if !as_json {
        println!("Mining header with sha256d...");
        println!("Target: {}", target);
        println!("Nonces: {}..={}", start, end);
        println!("Threads: {}", threads);
    }

    let job = SearchJob {
        algorithm: Algorithm::Sha256d,
        options: HasherOptions::default(),
        data: header,
        layout: NonceLayout::BITCOIN_HEADER,
        difficulty: Difficulty::Target(target),
    };

    let started = Instant::now();
    let result = parallel::search(&job, start as u64, end as u64, threads)?;
    print_mining_result(Algorithm::Sha256d, &result, started.elapsed(), as_json);

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn cmd_mine(
    config: &MinerConfig,
    algorithm: Option<Algorithm>,
    data_hex: &str,
    difficulty: u32,
    start: u64,
    end: u64,
    threads: Option<usize>,
    as_json: bool,
) -> anyhow::Result<()> {
    let algorithm = resolve_algorithm(config, algorithm)?;
    let data = decode_hex("data", data_hex)?;
    let threads = resolve_threads(config, threads);

    if !as_json {
        println!("Mining with {}...", algorithm);
        println!("Difficulty: {} bits", difficulty);
        println!("Nonces: {}..={}", start, end);
        println!("Threads: {}", threads);
    }

    let job = SearchJob {
        algorithm,
        options: config.hasher_options()?,
        data,
        layout: NonceLayout::Append,
        difficulty: Difficulty::LeadingZeros(difficulty),
    };

    let started = Instant::now();
    let result = parallel::search(&job, start, end, threads)?;
    print_mining_result(algorithm, &result, started.elapsed(), as_json);

    Ok(())
}

fn cmd_benchmark(
    config: &MinerConfig,
    algorithm: &str,
    duration_ms: u64,
    as_json: bool,
) -> anyhow::Result<()> {
    let algorithms: Vec<Algorithm> = if algorithm.eq_ignore_ascii_case("all") {
        Algorithm::ALL.to_vec()
    } else {
        vec![algorithm.parse()?]
    };
    let options = config.hasher_options()?;
    let duration = Duration::from_millis(duration_ms);

    if !as_json {
        println!("Running benchmark for {} ms per algorithm...", duration_ms);
    }

    let mut reports = Vec::with_capacity(algorithms.len());
    for algorithm in algorithms {
        let report = benchmark::run(algorithm, &options, duration)?;
        if !as_json {
            println!(
                "  {:<8} {:>14.2} H/s  ({} hashes in {:.2}s)",
                report.algorithm.name(),
                report.hashes_per_second,
                report.hashes,
                report.elapsed.as_secs_f64()
            );
        }
        reports.push(report);
    }

    if as_json {
        let rows: Vec<_> = reports
            .iter()
            .map(|r| {
                json!({
                    "algorithm": r.algorithm.name(),
                    "hashes": r.hashes,
                    "elapsed_secs": r.elapsed.as_secs_f64(),
                    "hashes_per_second": r.hashes_per_second,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
    }

    Ok(())
}

fn cmd_params(config: &MinerConfig, as_json: bool) -> anyhow::Result<()> {
    let scrypt = config.scrypt_params()?;

    if as_json {
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "version": algorithm::VERSION,
                "scrypt": {
                    "n": scrypt.n(),
                    "r": scrypt.r(),
                    "p": scrypt.p(),
                    "memory_bytes": scrypt.table_len(),
                },
                "randomx_light": {
                    "scratchpad_bytes": SCRATCHPAD_SIZE,
                    "register_file_bytes": REGISTER_FILE_SIZE,
                    "instructions": VM_INSTRUCTIONS,
                },
                "header": {
                    "size": HEADER_SIZE,
                    "nonce_offset": HEADER_NONCE_OFFSET,
                },
            }))?
        );
        return Ok(());
    }

    println!("powhash-core {}", algorithm::VERSION);
    println!("\nAlgorithms:");
    for algorithm in Algorithm::ALL {
        println!("  {}", algorithm);
    }
    println!("\nScrypt parameters:");
    println!("  N: {}", scrypt.n());
    println!("  r: {}", scrypt.r());
    println!("  p: {}", scrypt.p());
    println!("  Memory: {} KB", scrypt.table_len() / 1024);
    println!("\nRandomX-light parameters:");
    println!("  Scratchpad: {} KB", SCRATCHPAD_SIZE / 1024);
    println!("  Register file: {} bytes", REGISTER_FILE_SIZE);
    println!("  Instructions: {}", VM_INSTRUCTIONS);

    Ok(())
}
