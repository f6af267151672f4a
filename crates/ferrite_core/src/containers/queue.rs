//! # Queue
//!
//! FIFO container that reports emptiness instead of returning defaults.

use std::collections::VecDeque;

use crate::error::{CoreError, CoreResult};

/// A growable FIFO queue.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Queue<T> {
    data: VecDeque<T>,
}

impl<T> Queue<T> {
    /// Creates an empty queue.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            data: VecDeque::new(),
        }
    }

    /// Creates an empty queue with room for `capacity` elements.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: VecDeque::with_capacity(capacity),
        }
    }

    /// Appends `item` at the back.
    #[inline]
    pub fn push(&mut self, item: T) {
        self.data.push_back(item);
    }

    /// Removes the front element, or `None` if empty.
    #[inline]
    pub fn pop(&mut self) -> Option<T> {
        self.data.pop_front()
    }

    /// Returns the oldest element.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EmptyContainer`] if the queue is empty.
    pub fn front(&self) -> CoreResult<&T> {
        self.data.front().ok_or(CoreError::EmptyContainer("Queue"))
    }

    /// Returns the newest element.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EmptyContainer`] if the queue is empty.
    pub fn back(&self) -> CoreResult<&T> {
        self.data.back().ok_or(CoreError::EmptyContainer("Queue"))
    }

    /// Returns the number of elements.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the queue holds nothing.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Drops every element.
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Reserves room for `additional` more elements.
    pub fn reserve(&mut self, additional: usize) {
        self.data.reserve(additional);
    }
}
