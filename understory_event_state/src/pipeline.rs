// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Touch filter pipeline.
//!
//! Raw touch frames pass through a [`TouchPipeline`] before they reach
//! [`TouchInput`](crate::touch_input::TouchInput). Each [`TouchFilter`] may
//! rewrite the frame in place or swallow it. Filters run from the highest
//! [`priority`](TouchFilter::priority) to the lowest; filters that need stable
//! IDs sit below [`PRIORITY_ID`], where [`AssignIdsFilter`] runs.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use crate::touch::TouchState;
use crate::touch_states::{TouchIdAllocator, filter_small_moves};

/// Priority of filters that work on raw driver output.
pub const PRIORITY_PRE_ID: i32 = 100;
/// Priority of the ID assignment filter.
pub const PRIORITY_ID: i32 = -100;
/// Priority of filters that rely on stable IDs.
pub const PRIORITY_POST_ID: i32 = -200;

/// One stage of the touch pipeline.
pub trait TouchFilter<W> {
    /// Rewrite `state` in place. Return `true` to drop the frame.
    fn filter(&mut self, state: &mut TouchState<W>) -> bool;

    /// Write a held-back frame into `state` at the end of a batch.
    ///
    /// Returns `true` if `state` now holds a frame to deliver.
    fn flush(&mut self, state: &mut TouchState<W>) -> bool {
        let _ = state;
        false
    }

    /// Run order; higher runs first.
    fn priority(&self) -> i32;
}

/// Gives points stable IDs from frame to frame.
#[derive(Clone, Debug)]
pub struct AssignIdsFilter<W> {
    ids: TouchIdAllocator,
    previous: TouchState<W>,
}

impl<W: Copy + Eq> AssignIdsFilter<W> {
    /// No previous frame.
    pub fn new() -> Self {
        Self {
            ids: TouchIdAllocator::new(),
            previous: TouchState::new(),
        }
    }
}

impl<W: Copy + Eq> Default for AssignIdsFilter<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Copy + Eq> TouchFilter<W> for AssignIdsFilter<W> {
    fn filter(&mut self, state: &mut TouchState<W>) -> bool {
        self.ids.assign_ids(state, &self.previous);
        state.copy_to(&mut self.previous);
        false
    }

    fn priority(&self) -> i32 {
        PRIORITY_ID
    }
}

/// Default jitter radius in pixels.
pub const DEFAULT_TOUCH_RADIUS: u32 = 20;

/// Holds points still until they leave a small radius.
#[derive(Clone, Debug)]
pub struct SmallMoveFilter<W> {
    radius: u32,
    previous: TouchState<W>,
}

impl<W: Copy + Eq> SmallMoveFilter<W> {
    /// Filter with the [default radius](DEFAULT_TOUCH_RADIUS).
    pub fn new() -> Self {
        Self::with_radius(DEFAULT_TOUCH_RADIUS)
    }

    /// Filter with a custom radius in pixels.
    pub fn with_radius(radius: u32) -> Self {
        Self {
            radius,
            previous: TouchState::new(),
        }
    }

    /// Radius in pixels.
    pub fn radius(&self) -> u32 {
        self.radius
    }
}

impl<W: Copy + Eq> Default for SmallMoveFilter<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Copy + Eq> TouchFilter<W> for SmallMoveFilter<W> {
    fn filter(&mut self, state: &mut TouchState<W>) -> bool {
        filter_small_moves(state, &self.previous, self.radius);
        state.copy_to(&mut self.previous);
        false
    }

    fn priority(&self) -> i32 {
        PRIORITY_POST_ID
    }
}

/// Ordered list of touch filters.
pub struct TouchPipeline<W> {
    filters: Vec<Box<dyn TouchFilter<W>>>,
}

impl<W: Copy + Eq + 'static> TouchPipeline<W> {
    /// Pipeline without filters.
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// Insert `filter` by priority, after filters of equal priority.
    pub fn add_filter(&mut self, filter: Box<dyn TouchFilter<W>>) {
        let at = self
            .filters
            .iter()
            .position(|f| f.priority() < filter.priority())
            .unwrap_or(self.filters.len());
        self.filters.insert(at, filter);
    }

    /// Number of filters.
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Returns `true` if no filter is installed.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Run every filter over `state`. Returns `true` if a filter dropped it.
    pub fn filter(&mut self, state: &mut TouchState<W>) -> bool {
        for f in &mut self.filters {
            if f.filter(state) {
                tracing::trace!(priority = f.priority(), "touch frame dropped by filter");
                return true;
            }
        }
        false
    }

    /// Ask filters for a held-back frame.
    ///
    /// The first filter that produces one writes it into `state`; the filters
    /// after it then run over it as usual. Returns `true` if `state` should be
    /// delivered.
    pub fn flush(&mut self, state: &mut TouchState<W>) -> bool {
        let Some(at) = self.filters.iter_mut().position(|f| f.flush(state)) else {
            return false;
        };
        for f in &mut self.filters[at + 1..] {
            if f.filter(state) {
                return false;
            }
        }
        true
    }
}

impl<W: Copy + Eq + 'static> Default for TouchPipeline<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W> fmt::Debug for TouchPipeline<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let priorities: Vec<i32> = self.filters.iter().map(|f| f.priority()).collect();
        f.debug_struct("TouchPipeline")
            .field("filters", &priorities)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::touch::TouchPoint;
    use alloc::rc::Rc;
    use core::cell::RefCell;

    /// Records its tag on every call and drops frames with more than `limit` points.
    struct Probe {
        tag: i32,
        limit: usize,
        log: Rc<RefCell<Vec<i32>>>,
        held: Option<TouchPoint>,
    }

    impl TouchFilter<u32> for Probe {
        fn filter(&mut self, state: &mut TouchState<u32>) -> bool {
            self.log.borrow_mut().push(self.tag);
            state.len() > self.limit
        }

        fn flush(&mut self, state: &mut TouchState<u32>) -> bool {
            let Some(p) = self.held.take() else {
                return false;
            };
            state.clear();
            state.add_point(p);
            true
        }

        fn priority(&self) -> i32 {
            self.tag
        }
    }

    fn probe(tag: i32, limit: usize, log: &Rc<RefCell<Vec<i32>>>) -> Box<Probe> {
        Box::new(Probe {
            tag,
            limit,
            log: log.clone(),
            held: None,
        })
    }

    #[test]
    fn filters_run_by_descending_priority() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut pipeline = TouchPipeline::<u32>::new();
        pipeline.add_filter(probe(PRIORITY_POST_ID, 10, &log));
        pipeline.add_filter(probe(PRIORITY_PRE_ID, 10, &log));
        pipeline.add_filter(probe(PRIORITY_ID, 10, &log));

        let mut state = TouchState::new();
        assert!(!pipeline.filter(&mut state));
        assert_eq!(*log.borrow(), [PRIORITY_PRE_ID, PRIORITY_ID, PRIORITY_POST_ID]);
    }

    #[test]
    fn dropping_filter_stops_the_frame() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut pipeline = TouchPipeline::<u32>::new();
        pipeline.add_filter(probe(1, 0, &log));
        pipeline.add_filter(probe(0, 10, &log));

        let mut state = TouchState::new();
        state.add_point(TouchPoint::new(0, 1, 1));
        assert!(pipeline.filter(&mut state));
        assert_eq!(*log.borrow(), [1]);
    }

    #[test]
    fn flushed_frames_pass_through_later_filters() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut pipeline = TouchPipeline::<u32>::new();
        let mut holder = probe(PRIORITY_PRE_ID, 10, &log);
        holder.held = Some(TouchPoint::new(0, 40, 40));
        pipeline.add_filter(holder);
        pipeline.add_filter(Box::new(AssignIdsFilter::new()));

        let mut state = TouchState::new();
        assert!(pipeline.flush(&mut state));
        assert_eq!(state.points(), &[TouchPoint::new(1, 40, 40)]);
        assert!(!pipeline.flush(&mut state), "nothing left to flush");
        assert!(log.borrow().is_empty(), "the flushing filter is not rerun");
    }

    #[test]
    fn builtin_filters_assign_ids_then_pin_jitter() {
        let mut pipeline = TouchPipeline::<u32>::new();
        pipeline.add_filter(Box::new(SmallMoveFilter::new()));
        pipeline.add_filter(Box::new(AssignIdsFilter::new()));

        let mut a = TouchState::new();
        a.add_point(TouchPoint::new(0, 100, 100));
        assert!(!pipeline.filter(&mut a));
        assert_eq!(a.points(), &[TouchPoint::new(1, 100, 100)]);

        let mut b = TouchState::new();
        b.add_point(TouchPoint::new(0, 105, 98));
        pipeline.filter(&mut b);
        assert_eq!(b.points(), &[TouchPoint::new(1, 100, 100)]);

        let mut c = TouchState::new();
        c.add_point(TouchPoint::new(0, 150, 100));
        pipeline.filter(&mut c);
        assert_eq!(c.points(), &[TouchPoint::new(1, 150, 100)]);
    }
}
