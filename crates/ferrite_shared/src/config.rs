//! # Configuration
//!
//! Sizing knobs for containers and allocators, loaded from TOML once at
//! startup.
//!
//! ## Example
//!
//! ```rust,ignore
//! let config = FerriteConfig::load("config/ferrite.toml")?;
//! let pool: ObjectPool<Packet> = ObjectPool::from_config(&config.pool)?;
//! ```
//!
//! ```toml
//! [hash_map]
//! initial_capacity = 16
//!
//! [pool]
//! blocks_per_chunk = 64
//!
//! [arena]
//! size_bytes = 65536
//! default_alignment = 8
//! ```

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::constants::{
    DEFAULT_ALIGNMENT, DEFAULT_ARENA_SIZE, DEFAULT_BLOCKS_PER_CHUNK, DEFAULT_HASH_MAP_CAPACITY,
};

/// Errors raised while loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid TOML or has the wrong shape.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value parsed fine but is unusable.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Hash map sizing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HashMapConfig {
    /// Slot count before the first rehash.
    pub initial_capacity: usize,
}

impl Default for HashMapConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_HASH_MAP_CAPACITY,
        }
    }
}

/// Object pool sizing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PoolConfig {
    /// Blocks allocated each time the pool grows.
    pub blocks_per_chunk: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            blocks_per_chunk: DEFAULT_BLOCKS_PER_CHUNK,
        }
    }
}

/// Linear allocator sizing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArenaConfig {
    /// Region size in bytes.
    pub size_bytes: usize,
    /// Alignment used by untyped allocations. Must be a power of two.
    pub default_alignment: usize,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            size_bytes: DEFAULT_ARENA_SIZE,
            default_alignment: DEFAULT_ALIGNMENT,
        }
    }
}

/// Top-level configuration. Every section is optional.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FerriteConfig {
    /// `[hash_map]` section.
    pub hash_map: HashMapConfig,
    /// `[pool]` section.
    pub pool: PoolConfig,
    /// `[arena]` section.
    pub arena: ArenaConfig,
}

impl FerriteConfig {
    /// Parses and validates configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns error if the TOML is malformed or a value is out of range.
    pub fn from_toml_str(source: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML config file.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or fails [`Self::from_toml_str`].
    pub fn load<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Rejects values the containers would refuse at construction.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad field.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.pool.blocks_per_chunk == 0 {
            return Err(ConfigError::Invalid(
                "pool.blocks_per_chunk must be greater than zero".to_string(),
            ));
        }
        if self.arena.size_bytes == 0 {
            return Err(ConfigError::Invalid(
                "arena.size_bytes must be greater than zero".to_string(),
            ));
        }
        if !self.arena.default_alignment.is_power_of_two() {
            return Err(ConfigError::Invalid(format!(
                "arena.default_alignment must be a power of two, got {}",
                self.arena.default_alignment
            )));
        }
        Ok(())
    }
}
