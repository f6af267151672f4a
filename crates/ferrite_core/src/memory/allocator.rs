//! # Allocator Interface
//!
//! The surface shared by region allocators, so callers can take
//! `&mut dyn Allocator` or `impl Allocator` instead of a concrete arena.

use super::linear::Allocation;

/// A region allocator that hands out [`Allocation`] handles.
///
/// Implementors report exhaustion as `None` and never panic on it.
pub trait Allocator {
    /// Reserves `size` bytes aligned to `alignment`.
    ///
    /// Returns `None` if the request does not fit or `alignment` is not a
    /// power of two.
    fn allocate(&mut self, size: usize, alignment: usize) -> Option<Allocation>;

    /// Gives one allocation back. Allocators without per-allocation
    /// bookkeeping may ignore it.
    fn deallocate(&mut self, allocation: Allocation);

    /// Bytes handed out and not yet reclaimed, padding excluded.
    fn allocated_bytes(&self) -> usize;

    /// Reclaims every allocation at once.
    fn reset(&mut self);
}
