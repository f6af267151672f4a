//! # Ferrite Shared
//!
//! Defaults and configuration consumed by `ferrite_core`.
//!
//! ## RULE
//!
//! This crate must NEVER depend on `ferrite_core`. Data flows one way:
//! configuration goes in, containers and allocators come out.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod config;
pub mod constants;

pub use config::{ArenaConfig, ConfigError, ConfigResult, FerriteConfig, HashMapConfig, PoolConfig};
pub use constants::{
    DEFAULT_ALIGNMENT, DEFAULT_ARENA_SIZE, DEFAULT_BLOCKS_PER_CHUNK, DEFAULT_HASH_MAP_CAPACITY,
    MAX_LOAD_FACTOR_DENOMINATOR, MAX_LOAD_FACTOR_NUMERATOR,
};
