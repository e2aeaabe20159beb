// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Small sorted sets for pressed buttons and keys.
//!
//! Input state holds a handful of pressed items at a time, so a sorted inline
//! vector beats a hash set. Iteration is always in ascending order, which is
//! the order synthesized press and release events are emitted in.
//!
//! ```
//! use understory_event_state::set::SmallSet;
//!
//! let mut held: SmallSet<u16> = SmallSet::new();
//! held.insert(30);
//! held.insert(10);
//! held.insert(30);
//! assert_eq!(held.iter().collect::<Vec<_>>(), [10, 30]);
//!
//! let mut released = SmallSet::new();
//! held.difference_into(&mut released, &[10].into_iter().collect());
//! assert_eq!(released.iter().collect::<Vec<_>>(), [30]);
//! ```

use core::fmt;

use smallvec::SmallVec;

/// Sorted, duplicate-free set stored inline for small sizes.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SmallSet<T: Copy + Ord> {
    items: SmallVec<[T; 8]>,
}

impl<T: Copy + Ord> SmallSet<T> {
    /// Create an empty set.
    pub fn new() -> Self {
        Self {
            items: SmallVec::new(),
        }
    }

    /// Insert `item`. Returns `false` if it was already present.
    pub fn insert(&mut self, item: T) -> bool {
        match self.items.binary_search(&item) {
            Ok(_) => false,
            Err(pos) => {
                self.items.insert(pos, item);
                true
            }
        }
    }

    /// Remove `item`. Returns `false` if it was absent.
    pub fn remove(&mut self, item: T) -> bool {
        match self.items.binary_search(&item) {
            Ok(pos) => {
                self.items.remove(pos);
                true
            }
            Err(_) => false,
        }
    }

    /// Whether `item` is present.
    pub fn contains(&self, item: T) -> bool {
        self.items.binary_search(&item).is_ok()
    }

    /// The `index`-th smallest item.
    pub fn get(&self, index: usize) -> Option<T> {
        self.items.get(index).copied()
    }

    /// Smallest item.
    pub fn first(&self) -> Option<T> {
        self.items.first().copied()
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Remove every item.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Items in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        self.items.iter().copied()
    }

    /// Replace `dest` with the items of `self` that are not in `other`.
    pub fn difference_into(&self, dest: &mut Self, other: &Self) {
        dest.items.clear();
        dest.items
            .extend(self.items.iter().copied().filter(|i| !other.contains(*i)));
    }

    /// Overwrite `dest` with the contents of `self`, reusing its storage.
    pub fn copy_to(&self, dest: &mut Self) {
        dest.items.clear();
        dest.items.extend_from_slice(&self.items);
    }
}

impl<T: Copy + Ord> Default for SmallSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy + Ord + fmt::Debug> fmt::Debug for SmallSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.items.iter()).finish()
    }
}

impl<T: Copy + Ord> FromIterator<T> for SmallSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        for item in iter {
            set.insert(item);
        }
        set
    }
}

impl<T: Copy + Ord> Extend<T> for SmallSet<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.insert(item);
        }
    }
}
