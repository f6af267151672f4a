//! # Object Pool
//!
//! Fixed-size block allocator for objects that are frequently acquired and
//! released.
//!
//! ## Safety Note
//!
//! Blocks are raw storage whose lifetime the pool manages by hand. All
//! unsafe code of the pool lives in this module; every block is either a
//! free-list link or a live `T`, never both.

#![allow(unsafe_code)]
//!
//! ## Layout
//!
//! ```text
//!   chunk 0                         chunk 1 (grown on demand)
//!  ┌───────┬───────┬───────┐       ┌───────┬───────┬───────┐
//!  │ live T│ next ─┼─► next┼──┐    │ next ─┼─► next┼─► None│
//!  └───────┴───────┴───────┘  │    └───────┴───────┴───────┘
//!                             │        ▲
//!                             └────────┘
//!  free list head ─► first free block of the newest chunk
//! ```
//!
//! ## Thread Safety
//!
//! `acquire` and `release` serialize on one mutex. No fairness is implied.

use std::marker::PhantomData;
use std::mem::ManuallyDrop;
use std::ops::{Deref, DerefMut};
use std::ptr::NonNull;
use std::sync::atomic::{AtomicU64, Ordering};

use ferrite_shared::{PoolConfig, DEFAULT_BLOCKS_PER_CHUNK};
use parking_lot::Mutex;

use crate::error::{CoreError, CoreResult};

/// Source of pool identities, used to match handles to their pool.
static NEXT_POOL_ID: AtomicU64 = AtomicU64::new(0);

/// One slot of a chunk: a live value or a free-list link.
#[repr(C)]
union Block<T> {
    value: ManuallyDrop<T>,
    next: Option<NonNull<Block<T>>>,
}

/// State guarded by the pool mutex.
struct FreeList<T> {
    /// Chunk allocations, released when the pool drops.
    chunks: Vec<NonNull<[Block<T>]>>,
    /// First free block.
    head: Option<NonNull<Block<T>>>,
    total_blocks: usize,
    used_blocks: usize,
}

impl<T> FreeList<T> {
    /// Allocates a chunk, threads its blocks onto the free list and returns
    /// the new head.
    fn grow(&mut self, blocks_per_chunk: usize) -> NonNull<Block<T>> {
        let chunk: Box<[Block<T>]> = (0..blocks_per_chunk).map(|_| Block { next: None }).collect();
        // SAFETY: Box::into_raw never returns null.
        let chunk = unsafe { NonNull::new_unchecked(Box::into_raw(chunk)) };
        let first = chunk.cast::<Block<T>>();
        let base = first.as_ptr();

        for i in 0..blocks_per_chunk {
            let next = if i + 1 < blocks_per_chunk {
                // SAFETY: i + 1 is inside the chunk, so the pointer is non-null.
                Some(unsafe { NonNull::new_unchecked(base.add(i + 1)) })
            } else {
                self.head
            };
            // SAFETY: i is inside the chunk and nobody else can see it yet.
            unsafe { base.add(i).write(Block { next }) };
        }

        self.chunks.push(chunk);
        self.head = Some(first);
        self.total_blocks += blocks_per_chunk;
        first
    }
}

/// A thread-safe pool of fixed-size blocks for values of type `T`.
///
/// Starts with one chunk of `blocks_per_chunk` blocks and grows by one chunk
/// whenever the free list runs dry. It never shrinks.
///
/// # Ownership
///
/// [`acquire`](Self::acquire) hands out a [`PoolPtr`] that must be given
/// back through [`release`](Self::release). A handle that is dropped instead
/// leaks its block for the lifetime of the pool, and dropping the pool never
/// runs destructors of objects still checked out. Use
/// [`acquire_pooled`](Self::acquire_pooled) for automatic return.
///
/// # Example
///
/// ```rust,ignore
/// struct Particle { x: f32, y: f32, life: f32 }
///
/// let pool: ObjectPool<Particle> = ObjectPool::new(1024)?;
///
/// let mut p = pool.acquire(Particle { x: 0.0, y: 0.0, life: 1.0 });
/// p.life -= 0.1;
/// pool.release(p);
/// ```
pub struct ObjectPool<T> {
    /// Free list and chunk ownership.
    free_list: Mutex<FreeList<T>>,
    /// Blocks allocated per growth step.
    blocks_per_chunk: usize,
    /// Identity stamped into every handle this pool issues.
    id: u64,
}

// SAFETY: the pool owns its blocks; values cross threads only as `T`.
unsafe impl<T: Send> Send for ObjectPool<T> {}
// SAFETY: shared access only reaches the free list through the mutex, and
// values are reachable only through unique `PoolPtr` handles.
unsafe impl<T: Send> Sync for ObjectPool<T> {}

impl<T> ObjectPool<T> {
    /// Creates a pool that grows `blocks_per_chunk` blocks at a time.
    ///
    /// The first chunk is allocated immediately.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ZeroCapacity`] if `blocks_per_chunk` is zero.
    pub fn new(blocks_per_chunk: usize) -> CoreResult<Self> {
        if blocks_per_chunk == 0 {
            return Err(CoreError::ZeroCapacity {
                what: "ObjectPool blocks_per_chunk",
            });
        }
        Ok(Self::with_chunk_size(blocks_per_chunk))
    }

    /// Creates a pool sized from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ZeroCapacity`] if the chunk size is zero.
    pub fn from_config(config: &PoolConfig) -> CoreResult<Self> {
        Self::new(config.blocks_per_chunk)
    }

    fn with_chunk_size(blocks_per_chunk: usize) -> Self {
        let mut free_list = FreeList {
            chunks: Vec::new(),
            head: None,
            total_blocks: 0,
            used_blocks: 0,
        };
        free_list.grow(blocks_per_chunk);

        Self {
            free_list: Mutex::new(free_list),
            blocks_per_chunk,
            id: NEXT_POOL_ID.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// Moves `value` into a free block and returns a handle to it.
    ///
    /// Grows the pool by one chunk if no block is free.
    pub fn acquire(&self, value: T) -> PoolPtr<'_, T> {
        let block = {
            let mut list = self.free_list.lock();
            let block = match list.head {
                Some(block) => block,
                None => {
                    let block = list.grow(self.blocks_per_chunk);
                    tracing::debug!(
                        "ObjectPool grew to {} chunks ({} blocks)",
                        list.chunks.len(),
                        list.total_blocks
                    );
                    block
                }
            };
            // SAFETY: blocks on the free list hold the `next` variant.
            list.head = unsafe { block.as_ref().next };
            list.used_blocks += 1;
            block
        };

        // SAFETY: the block left the free list above, so this thread is its
        // only user.
        unsafe {
            block.as_ptr().write(Block {
                value: ManuallyDrop::new(value),
            });
        }

        PoolPtr {
            ptr: block.cast::<T>(),
            pool_id: self.id,
            _pool: PhantomData,
        }
    }

    /// Like [`acquire`](Self::acquire), but the object returns to the pool
    /// when the wrapper drops.
    pub fn acquire_pooled(&self, value: T) -> PooledObject<'_, T> {
        PooledObject {
            ptr: ManuallyDrop::new(self.acquire(value)),
            pool: self,
        }
    }

    /// Drops the object behind `ptr` and returns its block to the free list.
    ///
    /// Passing `None` does nothing.
    ///
    /// # Panics
    ///
    /// Panics if `ptr` was issued by a different pool.
    pub fn release<'p>(&self, ptr: impl Into<Option<PoolPtr<'p, T>>>)
    where
        T: 'p,
    {
        let Some(ptr) = ptr.into() else {
            return;
        };
        assert_eq!(
            ptr.pool_id, self.id,
            "PoolPtr released into a pool that did not issue it"
        );

        // SAFETY: the handle is unique and points at a live value.
        unsafe { std::ptr::drop_in_place(ptr.ptr.as_ptr()) };

        let block = ptr.ptr.cast::<Block<T>>();
        let mut list = self.free_list.lock();
        // SAFETY: the value is gone, so the block may hold a link again.
        unsafe { block.as_ptr().write(Block { next: list.head }) };
        list.head = Some(block);
        list.used_blocks -= 1;
    }

    /// Total blocks across all chunks.
    #[must_use]
    pub fn total_blocks(&self) -> usize {
        self.free_list.lock().total_blocks
    }

    /// Blocks currently holding live objects.
    #[must_use]
    pub fn used_blocks(&self) -> usize {
        self.free_list.lock().used_blocks
    }

    /// Blocks on the free list.
    #[must_use]
    pub fn free_blocks(&self) -> usize {
        let list = self.free_list.lock();
        list.total_blocks - list.used_blocks
    }

    /// Live blocks divided by total blocks.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn utilization(&self) -> f64 {
        let list = self.free_list.lock();
        list.used_blocks as f64 / list.total_blocks as f64
    }

    /// Number of chunks allocated so far.
    #[must_use]
    pub fn chunk_count(&self) -> usize {
        self.free_list.lock().chunks.len()
    }

    /// Blocks added per growth step.
    #[inline]
    #[must_use]
    pub const fn blocks_per_chunk(&self) -> usize {
        self.blocks_per_chunk
    }
}

impl<T> Default for ObjectPool<T> {
    fn default() -> Self {
        Self::with_chunk_size(DEFAULT_BLOCKS_PER_CHUNK)
    }
}

impl<T> Drop for ObjectPool<T> {
    fn drop(&mut self) {
        let list = self.free_list.get_mut();
        if list.used_blocks > 0 {
            tracing::debug!(
                "ObjectPool dropped with {} objects still checked out",
                list.used_blocks
            );
        }
        for chunk in list.chunks.drain(..) {
            // SAFETY: every chunk came from Box::into_raw in `grow`. Blocks
            // have no drop glue, so outstanding values are not destroyed.
            drop(unsafe { Box::from_raw(chunk.as_ptr()) });
        }
    }
}

impl<T> std::fmt::Debug for ObjectPool<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let list = self.free_list.lock();
        f.debug_struct("ObjectPool")
            .field("blocks_per_chunk", &self.blocks_per_chunk)
            .field("chunks", &list.chunks.len())
            .field("total_blocks", &list.total_blocks)
            .field("used_blocks", &list.used_blocks)
            .finish()
    }
}

/// Unique handle to an object checked out of an [`ObjectPool`].
///
/// Not `Clone`: one handle per live object, consumed by
/// [`ObjectPool::release`]. The `'pool` lifetime keeps the pool alive while
/// the handle exists.
pub struct PoolPtr<'pool, T> {
    ptr: NonNull<T>,
    pool_id: u64,
    _pool: PhantomData<&'pool ObjectPool<T>>,
}

// SAFETY: a handle owns its value exclusively, like `Box<T>`.
unsafe impl<T: Send> Send for PoolPtr<'_, T> {}
// SAFETY: shared handles only give out `&T`.
unsafe impl<T: Sync> Sync for PoolPtr<'_, T> {}

impl<T> Deref for PoolPtr<'_, T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        // SAFETY: the value is live until the handle is released, and the
        // pool outlives the handle.
        unsafe { self.ptr.as_ref() }
    }
}

impl<T> DerefMut for PoolPtr<'_, T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: as in `deref`; `&mut self` makes the access unique.
        unsafe { self.ptr.as_mut() }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for PoolPtr<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("PoolPtr").field(&**self).finish()
    }
}

/// RAII wrapper that returns its object to the pool on drop.
pub struct PooledObject<'pool, T> {
    ptr: ManuallyDrop<PoolPtr<'pool, T>>,
    pool: &'pool ObjectPool<T>,
}

impl<'pool, T> PooledObject<'pool, T> {
    /// Returns the object to the pool now.
    pub fn release(self) {
        drop(self);
    }

    /// Detaches the handle; the caller becomes responsible for releasing it.
    #[must_use]
    pub fn into_inner(self) -> PoolPtr<'pool, T> {
        let mut this = ManuallyDrop::new(self);
        // SAFETY: `this` is never dropped, so the handle is taken exactly once.
        unsafe { ManuallyDrop::take(&mut this.ptr) }
    }
}

impl<T> Deref for PooledObject<'_, T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        &self.ptr
    }
}

impl<T> DerefMut for PooledObject<'_, T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut T {
        &mut self.ptr
    }
}

impl<T> Drop for PooledObject<'_, T> {
    fn drop(&mut self) {
        // SAFETY: drop runs once and `into_inner` bypasses it.
        let ptr = unsafe { ManuallyDrop::take(&mut self.ptr) };
        self.pool.release(ptr);
    }
}
