//! # Intrusive Reference Counting
//!
//! A reference count that lives inside the managed object, plus the smart
//! pointer that drives it. Prefer `Arc` unless the count must share the
//! object's allocation.

#![allow(unsafe_code)]

use std::marker::PhantomData;
use std::ops::Deref;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Atomic reference count, born at 1.
///
/// The counter never frees anything itself; [`release`](Self::release)
/// reports when the last reference is gone and the caller destroys the
/// object.
pub struct RefCounter {
    count: AtomicUsize,
}

impl RefCounter {
    /// Creates a counter holding one reference.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            count: AtomicUsize::new(1),
        }
    }

    /// Adds a reference.
    #[inline]
    pub fn add_ref(&self) {
        // New references are made from existing ones, so no ordering is
        // needed on the increment.
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    /// Drops a reference. Returns `true` if it was the last one.
    ///
    /// # Safety
    ///
    /// The caller must own one reference, must not use it afterwards, and
    /// must destroy the object exactly once when this returns `true`.
    #[inline]
    #[must_use]
    pub unsafe fn release(&self) -> bool {
        self.count.fetch_sub(1, Ordering::AcqRel) == 1
    }

    /// Current number of references.
    #[inline]
    #[must_use]
    pub fn count(&self) -> usize {
        self.count.load(Ordering::Relaxed)
    }
}

impl Default for RefCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RefCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("RefCounter").field(&self.count()).finish()
    }
}

/// An object that embeds its own [`RefCounter`].
///
/// ```rust,ignore
/// struct Texture {
///     refs: RefCounter,
///     pixels: Vec<u8>,
/// }
///
/// // SAFETY: `refs` is a field of `self` and is never swapped out.
/// unsafe impl RefCounted for Texture {
///     fn ref_counter(&self) -> &RefCounter {
///         &self.refs
///     }
/// }
/// ```
///
/// # Safety
///
/// [`IntrusivePtr`] frees the object as soon as this counter reaches zero,
/// so implementors must guarantee that `ref_counter`:
///
/// - returns a counter stored inside `self` (a field, not a `static` or a
///   counter owned by another object),
/// - returns a counter no other object can reach,
/// - returns the same counter on every call for the life of `self`.
pub unsafe trait RefCounted {
    /// The embedded counter.
    fn ref_counter(&self) -> &RefCounter;
}

/// Shared-ownership pointer whose count lives in the pointee.
///
/// - Creating from a fresh object does not increment (the object starts at 1).
/// - `clone` increments; moving does not touch the count.
/// - Drop and [`reset`](Self::reset) decrement and destroy on zero.
pub struct IntrusivePtr<T: RefCounted> {
    ptr: Option<NonNull<T>>,
    _owns: PhantomData<T>,
}

// SAFETY: same rules as `Arc<T>`; the count is atomic.
unsafe impl<T: RefCounted + Send + Sync> Send for IntrusivePtr<T> {}
// SAFETY: same rules as `Arc<T>`.
unsafe impl<T: RefCounted + Send + Sync> Sync for IntrusivePtr<T> {}

impl<T: RefCounted> IntrusivePtr<T> {
    /// Moves `value` to the heap and adopts its initial reference.
    ///
    /// `value` must carry a fresh counter (count 1, as built by
    /// [`RefCounter::new`]). A counter that was bumped with
    /// [`RefCounter::add_ref`] beforehand never reaches zero and the object
    /// leaks. Debug builds assert on it.
    #[must_use]
    pub fn new(value: T) -> Self {
        debug_assert_eq!(
            value.ref_counter().count(),
            1,
            "IntrusivePtr::new expects a fresh counter"
        );
        let raw = Box::into_raw(Box::new(value));
        Self {
            ptr: NonNull::new(raw),
            _owns: PhantomData,
        }
    }

    /// A pointer to nothing.
    #[must_use]
    pub const fn null() -> Self {
        Self {
            ptr: None,
            _owns: PhantomData,
        }
    }

    /// Adopts one existing reference to `*raw` without incrementing.
    ///
    /// # Safety
    ///
    /// `raw` must be null or come from [`Self::into_raw`] (or `Box::into_raw`
    /// of a value whose counter is 1), and the reference it stands for must
    /// not be adopted twice.
    #[must_use]
    pub unsafe fn from_raw(raw: *mut T) -> Self {
        Self {
            ptr: NonNull::new(raw),
            _owns: PhantomData,
        }
    }

    /// Gives up ownership of the reference without decrementing.
    ///
    /// Returns null for a null pointer. Pass the result to
    /// [`Self::from_raw`] to avoid leaking.
    #[must_use]
    pub fn into_raw(self) -> *mut T {
        let this = std::mem::ManuallyDrop::new(self);
        this.ptr.map_or(std::ptr::null_mut(), NonNull::as_ptr)
    }

    /// Returns the pointee, if any.
    #[inline]
    #[must_use]
    pub fn get(&self) -> Option<&T> {
        // SAFETY: while this pointer holds a reference the pointee is alive.
        self.ptr.map(|ptr| unsafe { &*ptr.as_ptr() })
    }

    /// Returns `true` if this points at nothing.
    #[inline]
    #[must_use]
    pub const fn is_null(&self) -> bool {
        self.ptr.is_none()
    }

    /// Number of references to the pointee, 0 for null.
    #[must_use]
    pub fn use_count(&self) -> usize {
        self.get().map_or(0, |value| value.ref_counter().count())
    }

    /// Drops this reference now and becomes null.
    pub fn reset(&mut self) {
        *self = Self::null();
    }

    /// Returns `true` if both point at the same object (or both are null).
    #[must_use]
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        a.ptr == b.ptr
    }
}

impl<T: RefCounted> Clone for IntrusivePtr<T> {
    fn clone(&self) -> Self {
        if let Some(value) = self.get() {
            value.ref_counter().add_ref();
        }
        Self {
            ptr: self.ptr,
            _owns: PhantomData,
        }
    }
}

impl<T: RefCounted> Drop for IntrusivePtr<T> {
    fn drop(&mut self) {
        let Some(ptr) = self.ptr.take() else {
            return;
        };
        // SAFETY: this pointer owns one reference and gives it up here. The
        // `RefCounted` contract makes the counter private to this object, so
        // zero means nobody else can reach it. It was boxed in `new` or
        // adopted through `from_raw`.
        unsafe {
            if ptr.as_ref().ref_counter().release() {
                drop(Box::from_raw(ptr.as_ptr()));
            }
        }
    }
}

impl<T: RefCounted> Deref for IntrusivePtr<T> {
    type Target = T;

    /// # Panics
    ///
    /// Panics on a null pointer.
    fn deref(&self) -> &T {
        match self.get() {
            Some(value) => value,
            None => panic!("dereferenced a null IntrusivePtr"),
        }
    }
}

impl<T: RefCounted> Default for IntrusivePtr<T> {
    fn default() -> Self {
        Self::null()
    }
}

impl<T: RefCounted + std::fmt::Debug> std::fmt::Debug for IntrusivePtr<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.get() {
            Some(value) => f.debug_tuple("IntrusivePtr").field(value).finish(),
            None => f.write_str("IntrusivePtr(null)"),
        }
    }
}
