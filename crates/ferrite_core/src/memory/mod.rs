//! # Memory Management
//!
//! Arena, pool and reference-counting building blocks.
//!
//! ## Components
//!
//! - [`Allocator`]: the interface region allocators share
//! - [`LinearAllocator`]: bump allocation over one fixed region, reset in O(1)
//! - [`AlignedMemory`]: an owned heap block with a compile-time alignment
//! - [`ObjectPool`]: fixed-size blocks carved from chunks, recycled through a free list
//! - [`IntrusivePtr`]: shared ownership with the count stored in the object
//! - [`align`]: power-of-two rounding used by the allocators

pub mod align;
mod aligned;
mod allocator;
mod intrusive;
mod linear;
mod pool;

pub use aligned::AlignedMemory;
pub use allocator::Allocator;
pub use intrusive::{IntrusivePtr, RefCounted, RefCounter};
pub use linear::{Allocation, LinearAllocator};
pub use pool::{ObjectPool, PoolPtr, PooledObject};
