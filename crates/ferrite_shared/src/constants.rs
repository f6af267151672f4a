//! # Defaults
//!
//! Values used whenever a config file leaves a field out.

// =============================================================================
// CONTAINERS
// =============================================================================

/// Initial slot count of a `SimpleHashMap` built with `new()`.
pub const DEFAULT_HASH_MAP_CAPACITY: usize = 16;

/// Load factor numerator (3/4 = 0.75).
///
/// Kept as a ratio so the rehash check stays in integer arithmetic.
pub const MAX_LOAD_FACTOR_NUMERATOR: usize = 3;

/// Load factor denominator.
pub const MAX_LOAD_FACTOR_DENOMINATOR: usize = 4;

// =============================================================================
// MEMORY
// =============================================================================

/// Blocks carved out of every object-pool chunk.
pub const DEFAULT_BLOCKS_PER_CHUNK: usize = 64;

/// Default linear-allocator region size in bytes (64 KiB).
pub const DEFAULT_ARENA_SIZE: usize = 64 * 1024;

/// Default alignment for untyped allocations: one machine word.
pub const DEFAULT_ALIGNMENT: usize = std::mem::size_of::<usize>();
