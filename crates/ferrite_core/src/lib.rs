//! # Ferrite Core
//!
//! Containers and memory primitives with explicit failure signalling:
//! - Fixed-capacity ring buffer that evicts the oldest element when full
//! - Open-addressing hash map with tombstone deletion
//! - Fixed-size array with checked access
//! - Bump and aligned allocators, a chunked object pool, intrusive reference counting
//!
//! ## Failure Rules
//!
//! 1. **Exhaustion is a value** - allocators return `None`, never panic
//! 2. **Empty access is an error** - `front`/`top` on nothing return [`CoreError`]
//! 3. **Capacity is validated once** - constructors reject zero sizes
//!
//! ## Example
//!
//! ```rust,ignore
//! use ferrite_core::{CircularBuffer, LinearAllocator};
//!
//! let mut ring = CircularBuffer::new(3)?;
//! ring.push("a");
//!
//! let mut arena = LinearAllocator::new(1024)?;
//! let block = arena.allocate(64, 16).expect("fits");
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod containers;
pub mod error;
pub mod memory;

pub use containers::{CircularBuffer, Queue, SimpleHashMap, Stack, StaticArray};
pub use error::{CoreError, CoreResult};
pub use memory::{
    AlignedMemory, Allocation, Allocator, IntrusivePtr, LinearAllocator, ObjectPool, PoolPtr,
    PooledObject, RefCounted, RefCounter,
};

pub use ferrite_shared::{ArenaConfig, FerriteConfig, HashMapConfig, PoolConfig};
