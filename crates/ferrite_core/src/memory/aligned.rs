//! # Aligned Memory
//!
//! Heap blocks with a compile-time alignment, for buffers that must start on
//! a cache line or a SIMD lane boundary.

#![allow(unsafe_code)]
//!
//! ## Safety Note
//!
//! The block is a raw `std::alloc` allocation. Its layout is rebuilt from
//! `size` and `ALIGN` on drop, and both are fixed after construction.

use std::alloc::{self, Layout};
use std::ops::{Deref, DerefMut};
use std::ptr::NonNull;

use bytemuck::Pod;

use crate::error::{CoreError, CoreResult};

/// A zero-initialised heap block aligned to `ALIGN` bytes, freed on drop.
///
/// Moving the value moves ownership of the block; the address never changes.
///
/// # Example
///
/// ```rust,ignore
/// let mut lanes: AlignedMemory<32> = AlignedMemory::new(512)?;
/// lanes[0] = 0xAA;
/// let floats = lanes.cast_slice_mut::<f32>().expect("32 is enough for f32");
/// ```
pub struct AlignedMemory<const ALIGN: usize> {
    ptr: NonNull<u8>,
    size: usize,
}

// SAFETY: the block is owned exclusively, like `Box<[u8]>`.
unsafe impl<const ALIGN: usize> Send for AlignedMemory<ALIGN> {}
// SAFETY: shared access only hands out `&[u8]`.
unsafe impl<const ALIGN: usize> Sync for AlignedMemory<ALIGN> {}

impl<const ALIGN: usize> AlignedMemory<ALIGN> {
    /// Allocates `size` zeroed bytes aligned to `ALIGN`.
    ///
    /// Aborts through [`alloc::handle_alloc_error`] if the system allocator
    /// is out of memory.
    ///
    /// # Errors
    ///
    /// - [`CoreError::ZeroCapacity`] if `size` is zero
    /// - [`CoreError::InvalidAlignment`] if `ALIGN` is not a power of two
    /// - [`CoreError::LayoutOverflow`] if `size` rounded up to `ALIGN`
    ///   exceeds `isize::MAX`
    pub fn new(size: usize) -> CoreResult<Self> {
        if size == 0 {
            return Err(CoreError::ZeroCapacity {
                what: "AlignedMemory size",
            });
        }
        let layout = Self::layout(size)?;

        // SAFETY: the layout has a non-zero size.
        let raw = unsafe { alloc::alloc_zeroed(layout) };
        let Some(ptr) = NonNull::new(raw) else {
            alloc::handle_alloc_error(layout);
        };

        tracing::trace!("AlignedMemory allocated {} bytes aligned to {}", size, ALIGN);
        Ok(Self { ptr, size })
    }

    fn layout(size: usize) -> CoreResult<Layout> {
        if !ALIGN.is_power_of_two() {
            return Err(CoreError::InvalidAlignment(ALIGN));
        }
        Layout::from_size_align(size, ALIGN).map_err(|_| CoreError::LayoutOverflow {
            size,
            alignment: ALIGN,
        })
    }

    /// Size of the block in bytes.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Alignment of the block in bytes.
    #[inline]
    #[must_use]
    pub const fn alignment(&self) -> usize {
        ALIGN
    }

    /// Address of the first byte.
    #[inline]
    #[must_use]
    pub const fn as_ptr(&self) -> *const u8 {
        self.ptr.as_ptr()
    }

    /// Mutable address of the first byte.
    #[inline]
    #[must_use]
    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.ptr.as_ptr()
    }

    /// Typed view of the whole block.
    ///
    /// Returns `None` if the size is not a multiple of `size_of::<T>()` or
    /// `ALIGN` is too small for `T`.
    #[must_use]
    pub fn cast_slice<T: Pod>(&self) -> Option<&[T]> {
        bytemuck::try_cast_slice(&**self).ok()
    }

    /// Mutable typed view of the whole block. See [`Self::cast_slice`].
    pub fn cast_slice_mut<T: Pod>(&mut self) -> Option<&mut [T]> {
        bytemuck::try_cast_slice_mut(&mut **self).ok()
    }
}

impl<const ALIGN: usize> Deref for AlignedMemory<ALIGN> {
    type Target = [u8];

    #[inline]
    fn deref(&self) -> &[u8] {
        // SAFETY: `size` initialised bytes live at `ptr` until drop.
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.size) }
    }
}

impl<const ALIGN: usize> DerefMut for AlignedMemory<ALIGN> {
    #[inline]
    fn deref_mut(&mut self) -> &mut [u8] {
        // SAFETY: as in `deref`; `&mut self` makes the access unique.
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.size) }
    }
}

impl<const ALIGN: usize> Drop for AlignedMemory<ALIGN> {
    fn drop(&mut self) {
        // SAFETY: `new` validated this exact layout and allocated `ptr` with it.
        unsafe {
            let layout = Layout::from_size_align_unchecked(self.size, ALIGN);
            alloc::dealloc(self.ptr.as_ptr(), layout);
        }
    }
}

impl<const ALIGN: usize> std::fmt::Debug for AlignedMemory<ALIGN> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlignedMemory")
            .field("ptr", &self.ptr)
            .field("size", &self.size)
            .field("alignment", &ALIGN)
            .finish()
    }
}
