//! # Stack
//!
//! LIFO container that reports emptiness instead of returning defaults.

use crate::error::{CoreError, CoreResult};

/// A growable LIFO stack.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Stack<T> {
    data: Vec<T>,
}

impl<T> Stack<T> {
    /// Creates an empty stack.
    #[must_use]
    pub const fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// Creates an empty stack with room for `capacity` elements.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    /// Pushes `item` on top.
    #[inline]
    pub fn push(&mut self, item: T) {
        self.data.push(item);
    }

    /// Removes the top element, or `None` if empty.
    #[inline]
    pub fn pop(&mut self) -> Option<T> {
        self.data.pop()
    }

    /// Returns the top element.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EmptyContainer`] if the stack is empty.
    pub fn top(&self) -> CoreResult<&T> {
        self.data.last().ok_or(CoreError::EmptyContainer("Stack"))
    }

    /// Returns the top element mutably.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EmptyContainer`] if the stack is empty.
    pub fn top_mut(&mut self) -> CoreResult<&mut T> {
        self.data.last_mut().ok_or(CoreError::EmptyContainer("Stack"))
    }

    /// Returns the number of elements.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the stack holds nothing.
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
