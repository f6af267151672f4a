//! # Circular Buffer
//!
//! Fixed-capacity ring buffer that overwrites its oldest element when full.

use crate::error::{CoreError, CoreResult};

/// A ring buffer over a pre-allocated backing array.
///
/// Pushing into a full buffer silently evicts the oldest element, so the
/// buffer always holds the most recent `capacity` values in push order.
///
/// # Thread Safety
///
/// This buffer is NOT thread-safe. Wrap it in a mutex to share it.
///
/// # Example
///
/// ```rust,ignore
/// let mut samples = CircularBuffer::new(3)?;
/// for s in ["a", "b", "c", "d"] {
///     samples.push(s);
/// }
/// assert_eq!(samples.pop(), Some("b"));
/// ```
pub struct CircularBuffer<T> {
    /// Backing storage. `None` marks a slot outside the live window.
    buffer: Box<[Option<T>]>,
    /// Index of the oldest element.
    head: usize,
    /// Index the next push writes to.
    tail: usize,
    /// Number of live elements.
    len: usize,
}

impl<T> CircularBuffer<T> {
    /// Creates an empty buffer holding at most `capacity` elements.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ZeroCapacity`] if `capacity` is zero.
    pub fn new(capacity: usize) -> CoreResult<Self> {
        if capacity == 0 {
            return Err(CoreError::ZeroCapacity {
                what: "CircularBuffer capacity",
            });
        }

        let buffer: Vec<Option<T>> = (0..capacity).map(|_| None).collect();

        Ok(Self {
            buffer: buffer.into_boxed_slice(),
            head: 0,
            tail: 0,
            len: 0,
        })
    }

    /// Appends `item`, evicting the oldest element if the buffer is full.
    pub fn push(&mut self, item: T) {
        let capacity = self.capacity();

        // Overwriting drops the evicted element in place.
        self.buffer[self.tail] = Some(item);
        self.tail = (self.tail + 1) % capacity;

        if self.len < capacity {
            self.len += 1;
        } else {
            self.head = (self.head + 1) % capacity;
        }
    }

    /// Removes and returns the oldest element, or `None` if empty.
    pub fn pop(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }

        let item = self.buffer[self.head].take();
        self.head = (self.head + 1) % self.capacity();
        self.len -= 1;
        item
    }

    /// Returns the oldest element.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EmptyContainer`] if the buffer is empty.
    pub fn front(&self) -> CoreResult<&T> {
        self.slot(self.head)
    }

    /// Returns the oldest element mutably.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EmptyContainer`] if the buffer is empty.
    pub fn front_mut(&mut self) -> CoreResult<&mut T> {
        self.slot_mut(self.head)
    }

    /// Returns the newest element.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EmptyContainer`] if the buffer is empty.
    pub fn back(&self) -> CoreResult<&T> {
        self.slot(self.back_index())
    }

    /// Returns the newest element mutably.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EmptyContainer`] if the buffer is empty.
    pub fn back_mut(&mut self) -> CoreResult<&mut T> {
        let index = self.back_index();
        self.slot_mut(index)
    }

    /// Returns the number of live elements.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns the fixed capacity.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Returns `true` if no elements are stored.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns `true` if the next push will evict.
    #[inline]
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.len == self.capacity()
    }

    /// Drops every element and rewinds the indices.
    pub fn clear(&mut self) {
        for slot in self.buffer.iter_mut() {
            *slot = None;
        }
        self.head = 0;
        self.tail = 0;
        self.len = 0;
    }

    /// Iterates from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        let capacity = self.capacity();
        (0..self.len).filter_map(move |offset| self.buffer[(self.head + offset) % capacity].as_ref())
    }

    #[inline]
    fn back_index(&self) -> usize {
        (self.tail + self.capacity() - 1) % self.capacity()
    }

    fn slot(&self, index: usize) -> CoreResult<&T> {
        if self.is_empty() {
            return Err(CoreError::EmptyContainer("CircularBuffer"));
        }
        self.buffer[index]
            .as_ref()
            .ok_or(CoreError::EmptyContainer("CircularBuffer"))
    }

    fn slot_mut(&mut self, index: usize) -> CoreResult<&mut T> {
        if self.is_empty() {
            return Err(CoreError::EmptyContainer("CircularBuffer"));
        }
        self.buffer[index]
            .as_mut()
            .ok_or(CoreError::EmptyContainer("CircularBuffer"))
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for CircularBuffer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
