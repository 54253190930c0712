//! Miner configuration
//!
//! JSON file with every field optional:
//!
//! ```json
//! {
//!   "algorithm": "scrypt",
//!   "scrypt_n": 1024,
//!   "scrypt_r": 1,
//!   "scrypt_p": 1,
//!   "randomx_key": "00ff",
//!   "threads": 4,
//!   "log_level": "debug"
//! }
//! ```

use std::fs;
use std::path::Path;
#[cfg(feature = "cli")]
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::algorithm::{
    Algorithm, HasherOptions, PowError, ScryptParams, SCRYPT_LITECOIN_N, SCRYPT_LITECOIN_P,
    SCRYPT_LITECOIN_R,
};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config value: {0}")]
    Invalid(#[from] PowError),
}

/// Persistent miner settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MinerConfig {
    /// Default algorithm for `hash`, `mine` and `benchmark`
    pub algorithm: String,
    pub scrypt_n: u32,
    pub scrypt_r: u32,
    pub scrypt_p: u32,
    /// Hex-encoded RandomX-light key; the input is used when absent
    pub randomx_key: Option<String>,
    /// Worker threads (default: number of CPU cores)
    pub threads: Option<usize>,
    /// Log filter directive, e.g. `info` or `powhash_core=debug`
    pub log_level: Option<String>,
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::Sha256d.name().to_string(),
            scrypt_n: SCRYPT_LITECOIN_N,
            scrypt_r: SCRYPT_LITECOIN_R,
            scrypt_p: SCRYPT_LITECOIN_P,
            randomx_key: None,
            threads: None,
            log_level: None,
        }
    }
}

impl MinerConfig {
    /// Load a config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Save as pretty-printed JSON, creating parent directories
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Load `path` if given, else the default file if it exists, else defaults
    #[cfg(feature = "cli")]
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let default = default_config_path();
                if default.exists() {
                    Self::load(&default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn algorithm(&self) -> Result<Algorithm, ConfigError> {
        Ok(self.algorithm.parse()?)
    }

    pub fn scrypt_params(&self) -> Result<ScryptParams, ConfigError> {
        Ok(ScryptParams::new(self.scrypt_n, self.scrypt_r, self.scrypt_p)?)
    }

    pub fn randomx_key(&self) -> Result<Option<Vec<u8>>, ConfigError> {
        self.randomx_key
            .as_deref()
            .map(|key| hex::decode(key).map_err(|e| ConfigError::Invalid(e.into())))
            .transpose()
    }

    /// Hasher options with every value validated
    pub fn hasher_options(&self) -> Result<HasherOptions, ConfigError> {
        Ok(HasherOptions {
            scrypt: self.scrypt_params()?,
            randomx_key: self.randomx_key()?,
        })
    }
}

/// Get the default config file path
#[cfg(feature = "cli")]
pub fn default_config_path() -> PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".powhash").join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("powhash-config-test-{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn test_defaults() {
        let config = MinerConfig::default();
        assert_eq!(config.algorithm().unwrap(), Algorithm::Sha256d);
        assert_eq!(config.scrypt_params().unwrap(), ScryptParams::LITECOIN);
        assert_eq!(config.randomx_key().unwrap(), None);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = MinerConfig::from_json(r#"{"algorithm": "scrypt", "scrypt_n": 2048}"#)
            .unwrap();
        assert_eq!(config.algorithm().unwrap(), Algorithm::Scrypt);
        assert_eq!(config.scrypt_n, 2048);
        assert_eq!(config.scrypt_r, 1);
        assert_eq!(config.threads, None);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let config = MinerConfig::from_json(r#"{"scrypt_n": 0}"#).unwrap();
        assert!(matches!(
            config.scrypt_params(),
            Err(ConfigError::Invalid(_))
        ));

        let config = MinerConfig::from_json(r#"{"algorithm": "md5"}"#).unwrap();
        assert!(config.algorithm().is_err());

        let config = MinerConfig::from_json(r#"{"randomx_key": "zz"}"#).unwrap();
        assert!(config.hasher_options().is_err());

        assert!(matches!(
            MinerConfig::from_json("{not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_randomx_key_hex() {
        let config = MinerConfig::from_json(r#"{"randomx_key": "00ff10"}"#)
            .unwrap();
        let options = config.hasher_options().unwrap();
        assert_eq!(options.randomx_key, Some(vec![0x00, 0xff, 0x10]));
    }

    #[test]
    fn test_save_and_load() {
        let path = scratch_path("saved.json");
        let config = MinerConfig {
            algorithm: "randomx".to_string(),
            threads: Some(3),
            log_level: Some("debug".to_string()),
            ..Default::default()
        };

        config.save(&path).unwrap();
        assert_eq!(MinerConfig::load(&path).unwrap(), config);

        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let path = scratch_path("does-not-exist.json");
        assert!(matches!(MinerConfig::load(&path), Err(ConfigError::Io(_))));
    }
}
