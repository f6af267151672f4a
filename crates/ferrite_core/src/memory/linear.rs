//! # Linear Allocator
//!
//! A bump allocator over one fixed byte region. Individual allocations are
//! never freed; the whole region is reclaimed at once by `reset()`.

use bytemuck::Pod;
use ferrite_shared::{ArenaConfig, DEFAULT_ALIGNMENT};

use super::align::align_up;
use super::allocator::Allocator;
use crate::error::{CoreError, CoreResult};

/// Backing bytes of a [`LinearAllocator`].
enum Region<'buf> {
    /// Allocated and freed by the allocator.
    Owned(Box<[u8]>),
    /// Supplied by the caller, who must keep it alive.
    Borrowed(&'buf mut [u8]),
}

impl Region<'_> {
    #[inline]
    fn bytes(&self) -> &[u8] {
        match self {
            Region::Owned(bytes) => bytes,
            Region::Borrowed(bytes) => bytes,
        }
    }

    #[inline]
    fn bytes_mut(&mut self) -> &mut [u8] {
        match self {
            Region::Owned(bytes) => bytes,
            Region::Borrowed(bytes) => bytes,
        }
    }
}

/// A granted allocation: a byte range inside the allocator's region.
///
/// Handles are plain data. A handle issued before the latest
/// [`LinearAllocator::reset`] no longer resolves to memory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Allocation {
    /// Start of the range, relative to the region base.
    offset: usize,
    /// Length of the range in bytes.
    size: usize,
    /// Reset generation the handle was issued in.
    generation: u64,
}

impl Allocation {
    /// Start of the range, relative to the region base.
    #[inline]
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Length of the range in bytes.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }
}

/// A bump-pointer allocator over a fixed region.
///
/// Allocation is an aligned offset bump. Alignment is computed on the real
/// address of the region, so typed views of an allocation are always
/// correctly aligned.
///
/// # Thread Safety
///
/// This allocator is NOT thread-safe. Use one allocator per thread.
///
/// # Example
///
/// ```rust,ignore
/// let mut arena = LinearAllocator::new(16)?;
/// assert!(arena.allocate(10, 1).is_some());
/// assert!(arena.allocate(10, 1).is_none()); // only 6 bytes left
///
/// arena.reset();
/// assert!(arena.allocate(10, 1).is_some());
/// ```
pub struct LinearAllocator<'buf> {
    /// The backing region.
    region: Region<'buf>,
    /// First unused byte. Never exceeds the region size.
    offset: usize,
    /// Sum of requested sizes, padding excluded.
    allocated_bytes: usize,
    /// Bumped on every reset to retire older handles.
    generation: u64,
    /// Alignment used by [`Self::allocate_default`].
    default_alignment: usize,
}

impl LinearAllocator<'static> {
    /// Creates an allocator that owns a fresh region of `size` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ZeroCapacity`] if `size` is zero.
    pub fn new(size: usize) -> CoreResult<Self> {
        if size == 0 {
            return Err(CoreError::ZeroCapacity {
                what: "LinearAllocator size",
            });
        }
        Ok(Self::with_region(Region::Owned(vec![0u8; size].into_boxed_slice())))
    }

    /// Creates an owning allocator sized from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the size is zero or the default alignment is not a
    /// power of two.
    pub fn from_config(config: &ArenaConfig) -> CoreResult<Self> {
        if !config.default_alignment.is_power_of_two() {
            return Err(CoreError::InvalidAlignment(config.default_alignment));
        }
        let mut allocator = Self::new(config.size_bytes)?;
        allocator.default_alignment = config.default_alignment;
        Ok(allocator)
    }
}

impl<'buf> LinearAllocator<'buf> {
    /// Creates an allocator over a caller-supplied buffer.
    ///
    /// The allocator does not own the buffer; the borrow keeps it alive for
    /// as long as the allocator exists.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ZeroCapacity`] if `buffer` is empty.
    pub fn new_in(buffer: &'buf mut [u8]) -> CoreResult<Self> {
        if buffer.is_empty() {
            return Err(CoreError::ZeroCapacity {
                what: "LinearAllocator buffer",
            });
        }
        Ok(Self::with_region(Region::Borrowed(buffer)))
    }

    fn with_region(region: Region<'buf>) -> Self {
        Self {
            region,
            offset: 0,
            allocated_bytes: 0,
            generation: 0,
            default_alignment: DEFAULT_ALIGNMENT,
        }
    }

    /// Reserves `size` bytes aligned to `alignment`.
    ///
    /// Returns `None` if the aligned range does not fit in what is left of
    /// the region, or if `alignment` is not a power of two. The offset only
    /// moves on success.
    pub fn allocate(&mut self, size: usize, alignment: usize) -> Option<Allocation> {
        let base = self.base_address();
        let aligned = align_up(base + self.offset, alignment)?;
        let aligned_offset = aligned - base;
        let end = aligned_offset.checked_add(size)?;

        if end > self.capacity() {
            tracing::trace!(
                "LinearAllocator exhausted: requested {} (align {}), {} bytes left",
                size,
                alignment,
                self.remaining_bytes()
            );
            return None;
        }

        self.offset = end;
        self.allocated_bytes += size;

        Some(Allocation {
            offset: aligned_offset,
            size,
            generation: self.generation,
        })
    }

    /// Reserves `size` bytes at the configured default alignment.
    pub fn allocate_default(&mut self, size: usize) -> Option<Allocation> {
        self.allocate(size, self.default_alignment)
    }

    /// Reserves room for `count` values of `T`, aligned for `T`.
    pub fn alloc_slice<T: Pod>(&mut self, count: usize) -> Option<Allocation> {
        let size = std::mem::size_of::<T>().checked_mul(count)?;
        self.allocate(size, std::mem::align_of::<T>())
    }

    /// Does nothing.
    ///
    /// A bump allocator keeps no per-allocation bookkeeping, so single
    /// allocations cannot be returned. Use [`Self::reset`].
    pub fn deallocate(&mut self, allocation: Allocation) {
        tracing::trace!(
            "LinearAllocator::deallocate ignored for {} bytes at offset {}",
            allocation.size,
            allocation.offset
        );
    }

    /// Rewinds to an empty region.
    ///
    /// Every handle issued so far stops resolving. Contents of the region
    /// are left as they are.
    pub fn reset(&mut self) {
        tracing::trace!(
            "LinearAllocator reset: released {} bytes (generation {})",
            self.offset,
            self.generation
        );
        self.offset = 0;
        self.allocated_bytes = 0;
        self.generation = self.generation.wrapping_add(1);
    }

    /// Bytes of `allocation`, or `None` if it predates the latest reset.
    #[must_use]
    pub fn bytes(&self, allocation: &Allocation) -> Option<&[u8]> {
        let range = self.live_range(allocation)?;
        self.region.bytes().get(range)
    }

    /// Mutable bytes of `allocation`, or `None` if it predates the latest
    /// reset.
    pub fn bytes_mut(&mut self, allocation: &Allocation) -> Option<&mut [u8]> {
        let range = self.live_range(allocation)?;
        self.region.bytes_mut().get_mut(range)
    }

    /// Typed view of `allocation`.
    ///
    /// Returns `None` for retired handles or when the range does not fit
    /// `T`'s size and alignment.
    pub fn slice_mut<T: Pod>(&mut self, allocation: &Allocation) -> Option<&mut [T]> {
        bytemuck::try_cast_slice_mut(self.bytes_mut(allocation)?).ok()
    }

    /// Sum of granted sizes since the last reset, padding excluded.
    #[inline]
    #[must_use]
    pub const fn allocated_bytes(&self) -> usize {
        self.allocated_bytes
    }

    /// Bytes consumed so far, padding included.
    #[inline]
    #[must_use]
    pub const fn used(&self) -> usize {
        self.offset
    }

    /// Bytes left after the current offset.
    #[inline]
    #[must_use]
    pub fn remaining_bytes(&self) -> usize {
        self.capacity() - self.offset
    }

    /// Fraction of the region consumed, in `[0, 1]`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn utilization(&self) -> f64 {
        self.offset as f64 / self.capacity() as f64
    }

    /// Total region size in bytes.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.region.bytes().len()
    }

    /// Returns `true` if the allocator frees its region on drop.
    #[inline]
    #[must_use]
    pub const fn owns_memory(&self) -> bool {
        matches!(self.region, Region::Owned(_))
    }

    /// Alignment used by [`Self::allocate_default`].
    #[inline]
    #[must_use]
    pub const fn default_alignment(&self) -> usize {
        self.default_alignment
    }

    /// Address of the first region byte, as an opaque number.
    #[inline]
    fn base_address(&self) -> usize {
        self.region.bytes().as_ptr() as usize
    }

    fn live_range(&self, allocation: &Allocation) -> Option<std::ops::Range<usize>> {
        if allocation.generation != self.generation {
            return None;
        }
        Some(allocation.offset..allocation.offset + allocation.size)
    }
}

impl Allocator for LinearAllocator<'_> {
    // Each call resolves to the inherent method of the same name.
    fn allocate(&mut self, size: usize, alignment: usize) -> Option<Allocation> {
        LinearAllocator::allocate(self, size, alignment)
    }

    fn deallocate(&mut self, allocation: Allocation) {
        LinearAllocator::deallocate(self, allocation);
    }

    fn allocated_bytes(&self) -> usize {
        LinearAllocator::allocated_bytes(self)
    }

    fn reset(&mut self) {
        LinearAllocator::reset(self);
    }
}

impl std::fmt::Debug for LinearAllocator<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinearAllocator")
            .field("capacity", &self.capacity())
            .field("offset", &self.offset)
            .field("allocated_bytes", &self.allocated_bytes)
            .field("owns_memory", &self.owns_memory())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exhaustion_and_reset() {
        let mut arena = LinearAllocator::new(16).unwrap();

        assert!(arena.allocate(10, 1).is_some());
        assert!(arena.allocate(10, 1).is_none());
        assert_eq!(arena.remaining_bytes(), 6);

        arena.reset();
        assert!(arena.allocate(10, 1).is_some());
    }

    #[test]
    fn test_failed_allocation_keeps_offset() {
        let mut arena = LinearAllocator::new(8).unwrap();
        let _ = arena.allocate(4, 1).unwrap();
        assert!(arena.allocate(16, 1).is_none());
        assert_eq!(arena.used(), 4);
    }

    #[test]
    fn test_zero_size_rejected() {
        assert!(matches!(
            LinearAllocator::new(0),
            Err(CoreError::ZeroCapacity { .. })
        ));
        let mut empty: [u8; 0] = [];
        assert!(LinearAllocator::new_in(&mut empty).is_err());
    }

    #[test]
    fn test_bad_alignment_is_refused() {
        let mut arena = LinearAllocator::new(64).unwrap();
        assert!(arena.allocate(4, 0).is_none());
        assert!(arena.allocate(4, 3).is_none());
        assert_eq!(arena.used(), 0);
    }

    #[test]
    fn test_typed_slices_are_aligned() {
        let mut arena = LinearAllocator::new(256).unwrap();
        let _ = arena.allocate(3, 1).unwrap();

        let words = arena.alloc_slice::<u64>(4).unwrap();
        assert_eq!(words.size(), 32);

        let view = arena.slice_mut::<u64>(&words).unwrap();
        view.copy_from_slice(&[1, 2, 3, 4]);
        assert_eq!(arena.slice_mut::<u64>(&words).unwrap()[3], 4);
    }

    #[test]
    fn test_allocated_bytes_excludes_padding() {
        let mut arena = LinearAllocator::new(64).unwrap();
        let _ = arena.allocate(1, 1).unwrap();
        let _ = arena.allocate(8, 8).unwrap();

        assert_eq!(arena.allocated_bytes(), 9);
        assert!(arena.used() >= 9);
        assert!(arena.utilization() > 0.0);
    }

    #[test]
    fn test_reset_retires_handles() {
        let mut arena = LinearAllocator::new(32).unwrap();
        let old = arena.allocate(8, 1).unwrap();
        assert!(arena.bytes_mut(&old).is_some());

        arena.reset();
        assert!(arena.bytes(&old).is_none());
        assert!(arena.bytes_mut(&old).is_none());

        let fresh = arena.allocate(8, 1).unwrap();
        assert!(arena.bytes(&fresh).is_some());
    }

    /// Fills through the trait object until the allocator refuses.
    fn fill(allocator: &mut dyn Allocator, size: usize) -> usize {
        let mut granted = 0;
        while allocator.allocate(size, 1).is_some() {
            granted += 1;
        }
        granted
    }

    #[test]
    fn test_allocator_trait_object() {
        let mut arena = LinearAllocator::new(64).unwrap();

        assert_eq!(fill(&mut arena, 16), 4);
        assert_eq!(Allocator::allocated_bytes(&arena), 64);

        Allocator::reset(&mut arena);
        assert_eq!(arena.used(), 0);
        assert_eq!(fill(&mut arena, 32), 2);
    }

    #[test]
    fn test_borrowed_region() {
        let mut backing = [0u8; 32];
        {
            let mut arena = LinearAllocator::new_in(&mut backing).unwrap();
            assert!(!arena.owns_memory());

            let a = arena.allocate(4, 1).unwrap();
            arena.bytes_mut(&a).unwrap().copy_from_slice(b"fe26");
            arena.deallocate(a);
            assert_eq!(arena.used(), 4);
        }
        assert_eq!(&backing[..4], b"fe26");
    }

    #[test]
    fn test_from_config() {
        let arena = LinearAllocator::from_config(&ArenaConfig {
            size_bytes: 128,
            default_alignment: 16,
        })
        .unwrap();
        assert_eq!(arena.capacity(), 128);
        assert_eq!(arena.default_alignment(), 16);

        let err = LinearAllocator::from_config(&ArenaConfig {
            size_bytes: 128,
            default_alignment: 6,
        })
        .unwrap_err();
        assert_eq!(err, CoreError::InvalidAlignment(6));
    }
}
