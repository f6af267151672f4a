//! # Static Array
//!
//! An inline `[T; N]` with checked access that reports out-of-range indices
//! as errors. Indexing with `[]` still panics like a plain array.

use std::ops::{Index, IndexMut};

use crate::error::{CoreError, CoreResult};

/// A fixed-size array of exactly `N` elements stored inline.
///
/// # Example
///
/// ```rust,ignore
/// let mut position: StaticArray<f64, 3> = StaticArray::try_from_iter([1.0, 2.0])?;
/// position[2] = 10.0;
/// assert!(position.at(3).is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct StaticArray<T, const N: usize> {
    data: [T; N],
}

impl<T: Default, const N: usize> StaticArray<T, N> {
    /// Creates an array of `N` default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: std::array::from_fn(|_| T::default()),
        }
    }

    /// Fills the leading elements from `items`, leaving the rest default.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::TooManyElements`] if `items` yields more than
    /// `N` values.
    pub fn try_from_iter<I: IntoIterator<Item = T>>(items: I) -> CoreResult<Self> {
        let mut array = Self::new();
        let mut items = items.into_iter().fuse();

        for slot in &mut array.data {
            match items.next() {
                Some(item) => *slot = item,
                None => break,
            }
        }
        if items.next().is_some() {
            return Err(CoreError::TooManyElements { capacity: N });
        }
        Ok(array)
    }
}

impl<T, const N: usize> StaticArray<T, N> {
    /// Wraps an existing array.
    #[must_use]
    pub const fn from_array(data: [T; N]) -> Self {
        Self { data }
    }

    /// Returns the element at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::IndexOutOfRange`] if `index >= N`.
    pub fn at(&self, index: usize) -> CoreResult<&T> {
        self.data
            .get(index)
            .ok_or(CoreError::IndexOutOfRange { index, len: N })
    }

    /// Returns the element at `index` mutably.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::IndexOutOfRange`] if `index >= N`.
    pub fn at_mut(&mut self, index: usize) -> CoreResult<&mut T> {
        self.data
            .get_mut(index)
            .ok_or(CoreError::IndexOutOfRange { index, len: N })
    }

    /// Returns the first element.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EmptyContainer`] if `N` is zero.
    pub fn front(&self) -> CoreResult<&T> {
        self.data.first().ok_or(CoreError::EmptyContainer("StaticArray"))
    }

    /// Returns the last element.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EmptyContainer`] if `N` is zero.
    pub fn back(&self) -> CoreResult<&T> {
        self.data.last().ok_or(CoreError::EmptyContainer("StaticArray"))
    }

    /// Always `N`.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        N
    }

    /// Returns `true` only for `N == 0`.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    /// Overwrites every element with a clone of `value`.
    pub fn fill(&mut self, value: T)
    where
        T: Clone,
    {
        self.data.fill(value);
    }

    /// Iterates in index order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }

    /// Iterates mutably in index order.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.data.iter_mut()
    }

    /// The elements as a slice.
    #[must_use]
    pub const fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// The elements as a mutable slice.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Unwraps the inner array.
    #[must_use]
    pub fn into_inner(self) -> [T; N] {
        self.data
    }
}

impl<T: Default, const N: usize> Default for StaticArray<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> From<[T; N]> for StaticArray<T, N> {
    fn from(data: [T; N]) -> Self {
        Self::from_array(data)
    }
}

impl<T, const N: usize> Index<usize> for StaticArray<T, N> {
    type Output = T;

    #[inline]
    fn index(&self, index: usize) -> &T {
        &self.data[index]
    }
}

impl<T, const N: usize> IndexMut<usize> for StaticArray<T, N> {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.data[index]
    }
}

impl<'a, T, const N: usize> IntoIterator for &'a StaticArray<T, N> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T, const N: usize> IntoIterator for &'a mut StaticArray<T, N> {
    type Item = &'a mut T;
    type IntoIter = std::slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}
