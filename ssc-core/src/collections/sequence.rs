//! Insertion-ordered growable sequence

use alloc::vec::Vec;
use core::slice;

/// Homogeneous, insertion-ordered container
///
/// Elements keep their relative order across appends and removals, and
/// out-of-range lookups return `None` instead of panicking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence<T> {
    items: Vec<T>,
}

impl<T> Default for Sequence<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Sequence<T> {
    /// Create an empty sequence
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Add an element at the end, returning its index
    pub fn append(&mut self, item: T) -> usize {
        self.items.push(item);
        self.items.len() - 1
    }

    /// Element at `index`, if in bounds
    pub fn at(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    /// Mutable element at `index`, if in bounds
    pub fn at_mut(&mut self, index: usize) -> Option<&mut T> {
        self.items.get_mut(index)
    }

    /// Remove the element at `index` and hand it back
    ///
    /// Later elements move down one position; their order is unchanged.
    pub fn remove(&mut self, index: usize) -> Option<T> {
        if index < self.items.len() {
            Some(self.items.remove(index))
        } else {
            None
        }
    }

    /// Index of the first element matching `predicate`
    pub fn position<P: FnMut(&T) -> bool>(&self, predicate: P) -> Option<usize> {
        self.items.iter().position(predicate)
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the sequence holds no elements
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Drop every element
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Iterate in insertion order
    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.items.iter()
    }
}

impl<T> IntoIterator for Sequence<T> {
    type Item = T;
    type IntoIter = alloc::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Sequence<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
