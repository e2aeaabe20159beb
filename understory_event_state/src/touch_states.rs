// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Touch ID resolution and jitter filtering.
//!
//! Many touch drivers report contact positions without stable IDs. The
//! [`TouchIdAllocator`] reconstructs IDs frame to frame by matching each
//! contact to its nearest neighbour in the previous frame:
//!
//! - With no previous points, every point gets a fresh ID.
//! - With at least as many points as before, each old point claims its
//!   nearest unclaimed new point; new points left over get fresh IDs.
//! - With fewer points than before, each new point claims its nearest
//!   unclaimed old point.
//!
//! IDs that no longer appear are released. Fresh IDs are always the smallest
//! positive integer not in use. The matching is greedy, not globally optimal;
//! touch frames hold a handful of points. Equidistant candidates resolve to
//! the lowest index.
//!
//! ```
//! use understory_event_state::touch::{TouchPoint, TouchState};
//! use understory_event_state::touch_states::TouchIdAllocator;
//!
//! let mut ids = TouchIdAllocator::new();
//! let empty = TouchState::<u32>::new();
//!
//! let mut first = TouchState::<u32>::new();
//! first.add_point(TouchPoint::new(0, 10, 10));
//! ids.assign_ids(&mut first, &empty);
//! assert_eq!(first.points()[0].id, 1);
//!
//! let mut second = TouchState::<u32>::new();
//! second.add_point(TouchPoint::new(0, 12, 11));
//! ids.assign_ids(&mut second, &first);
//! assert_eq!(second.points()[0].id, 1);
//! ```

use smallvec::SmallVec;

use crate::set::SmallSet;
use crate::touch::{TouchPoint, TouchState};

/// Hands out the smallest free positive touch ID.
#[derive(Clone, Debug)]
pub struct TouchIdAllocator {
    in_use: SmallSet<u32>,
    next: u32,
}

impl TouchIdAllocator {
    /// No IDs in use.
    pub fn new() -> Self {
        Self {
            in_use: SmallSet::new(),
            next: 1,
        }
    }

    /// Take the smallest free ID.
    pub fn acquire(&mut self) -> u32 {
        let mut id = self.next.max(1);
        while self.in_use.contains(id) {
            id += 1;
        }
        self.in_use.insert(id);
        self.next = id + 1;
        tracing::debug!(id, "touch id acquired");
        id
    }

    /// Return `id` to the pool.
    pub fn release(&mut self, id: u32) {
        if !self.in_use.remove(id) {
            return;
        }
        let mut next = 1;
        while self.in_use.contains(next) {
            next += 1;
        }
        self.next = next;
        tracing::debug!(id, "touch id released");
    }

    /// Whether `id` is currently handed out.
    pub fn is_in_use(&self, id: u32) -> bool {
        self.in_use.contains(id)
    }

    /// Release every ID.
    pub fn reset(&mut self) {
        self.in_use.clear();
        self.next = 1;
    }

    /// Give the points of `state` IDs continuing those of `old`.
    pub fn assign_ids<W: Copy + Eq>(&mut self, state: &mut TouchState<W>, old: &TouchState<W>) {
        if old.is_empty() {
            for p in state.points_mut() {
                p.id = self.acquire();
            }
        } else if state.len() >= old.len() {
            let mut claimed: SmallVec<[bool; 8]> = SmallVec::from_elem(false, state.len());
            for o in old.points() {
                let Some(i) = nearest(o, state.points(), &claimed) else {
                    debug_assert!(false, "every old point has an unclaimed partner");
                    continue;
                };
                claimed[i] = true;
                state.points_mut()[i].id = o.id;
            }
            for (p, taken) in state.points_mut().iter_mut().zip(&claimed) {
                if !taken {
                    p.id = self.acquire();
                }
            }
        } else {
            let mut claimed: SmallVec<[bool; 8]> = SmallVec::from_elem(false, old.len());
            for p in state.points_mut() {
                let Some(j) = nearest(p, old.points(), &claimed) else {
                    debug_assert!(false, "every new point has an unclaimed partner");
                    continue;
                };
                claimed[j] = true;
                p.id = old.points()[j].id;
            }
        }

        for o in old.points() {
            if state.point_for_id(o.id).is_none() {
                self.release(o.id);
            }
        }
    }
}

impl Default for TouchIdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Index of the unclaimed candidate closest to `from`; ties go to the lowest index.
fn nearest(from: &TouchPoint, candidates: &[TouchPoint], claimed: &[bool]) -> Option<usize> {
    let mut best: Option<(usize, i64)> = None;
    for (i, c) in candidates.iter().enumerate() {
        if claimed[i] {
            continue;
        }
        let d = from.distance_squared(c);
        if best.is_none_or(|(_, bd)| d < bd) {
            best = Some((i, d));
        }
    }
    best.map(|(i, _)| i)
}

/// Pin points that moved less than `radius` from their previous position.
///
/// Points are matched to `old` by ID. Applying the filter again to its own
/// output changes nothing.
pub fn filter_small_moves<W: Copy + Eq>(state: &mut TouchState<W>, old: &TouchState<W>, radius: u32) {
    let limit = i64::from(radius) * i64::from(radius);
    for p in state.points_mut() {
        if let Some(o) = old.point_for_id(p.id)
            && p.distance_squared(o) < limit
        {
            p.x = o.x;
            p.y = o.y;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    fn frame(points: &[(i32, i32)]) -> TouchState<u32> {
        let mut s = TouchState::new();
        for &(x, y) in points {
            s.add_point(TouchPoint::new(0, x, y));
        }
        s
    }

    fn ids(s: &TouchState<u32>) -> Vec<u32> {
        s.points().iter().map(|p| p.id).collect()
    }

    #[test]
    fn single_contact_lifecycle() {
        let mut alloc = TouchIdAllocator::new();
        let mut f1 = frame(&[(10, 10)]);
        alloc.assign_ids(&mut f1, &TouchState::new());
        assert_eq!(ids(&f1), [1]);

        let mut f2 = frame(&[(12, 11)]);
        alloc.assign_ids(&mut f2, &f1);
        assert_eq!(ids(&f2), [1]);

        let mut f3 = frame(&[]);
        alloc.assign_ids(&mut f3, &f2);
        assert!(!alloc.is_in_use(1));

        let mut f4 = frame(&[(300, 300)]);
        alloc.assign_ids(&mut f4, &f3);
        assert_eq!(ids(&f4), [1]);
    }

    #[test]
    fn moving_contact_keeps_its_id() {
        let mut alloc = TouchIdAllocator::new();
        let mut prev = frame(&[(0, 0), (200, 200)]);
        alloc.assign_ids(&mut prev, &TouchState::new());
        for step in 1..20 {
            let mut next = frame(&[(200 + step, 200 - step), (step * 3, step * 2)]);
            alloc.assign_ids(&mut next, &prev);
            assert_eq!(next.point_for_id(1).map(|p| p.x), Some(step * 3));
            assert_eq!(next.point_for_id(2).map(|p| p.x), Some(200 + step));
            prev = next;
        }
    }

    #[test]
    fn fresh_ids_fill_the_lowest_gap() {
        let mut alloc = TouchIdAllocator::new();
        let mut a = frame(&[(0, 0), (100, 0), (200, 0)]);
        alloc.assign_ids(&mut a, &TouchState::new());
        assert_eq!(ids(&a), [1, 2, 3]);

        // The middle contact lifts.
        let mut b = frame(&[(0, 0), (200, 0)]);
        alloc.assign_ids(&mut b, &a);
        assert_eq!(ids(&b), [1, 3]);

        // A new contact appears far from both.
        let mut c = frame(&[(0, 0), (200, 0), (500, 500)]);
        alloc.assign_ids(&mut c, &b);
        assert_eq!(ids(&c), [1, 3, 2]);
    }

    #[test]
    fn equidistant_candidates_resolve_to_lowest_index() {
        let mut alloc = TouchIdAllocator::new();
        let mut a = frame(&[(10, 0)]);
        alloc.assign_ids(&mut a, &TouchState::new());
        let mut b = frame(&[(0, 0), (20, 0)]);
        alloc.assign_ids(&mut b, &a);
        assert_eq!(ids(&b), [1, 2]);
    }

    #[test]
    fn small_moves_are_pinned_idempotently() {
        let mut old = TouchState::<u32>::new();
        old.add_point(TouchPoint::new(1, 100, 100));
        old.add_point(TouchPoint::new(2, 300, 300));
        let mut next = TouchState::<u32>::new();
        next.add_point(TouchPoint::new(1, 103, 104));
        next.add_point(TouchPoint::new(2, 330, 300));

        filter_small_moves(&mut next, &old, 20);
        assert_eq!(next.points()[0], TouchPoint::new(1, 100, 100));
        assert_eq!(next.points()[1], TouchPoint::new(2, 330, 300));

        let once = next.clone();
        filter_small_moves(&mut next, &old, 20);
        assert_eq!(next, once);
    }
}
