// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Coalescing of touch frames that differ only in position.
//!
//! Drivers that read several raw reports per wakeup fill the pending frame
//! through [`TouchLookahead::state_mut`] and call
//! [`push_state`](TouchLookahead::push_state) after each report. A pushed
//! frame with the same IDs as the one before it replaces that frame; a frame
//! with a different shape first commits the one before it. At the end of the
//! wakeup [`flush_state`](TouchLookahead::flush_state) commits whatever is
//! still held. Presses and releases are never lost; intermediate positions
//! may be.

use crate::pipeline::TouchPipeline;
use crate::touch::TouchState;

/// Pending and previous touch frames.
#[derive(Clone, Debug)]
pub struct TouchLookahead<W> {
    pending: TouchState<W>,
    previous: TouchState<W>,
    holding: bool,
}

impl<W: Copy + Eq + 'static> TouchLookahead<W> {
    /// Nothing held.
    pub fn new() -> Self {
        Self {
            pending: TouchState::new(),
            previous: TouchState::new(),
            holding: false,
        }
    }

    /// Frame the driver fills before the next push.
    ///
    /// It keeps the contents of the last push, so single-touch drivers can
    /// update just what changed.
    pub fn state_mut(&mut self) -> &mut TouchState<W> {
        &mut self.pending
    }

    /// Whether a frame is held back.
    pub fn is_holding(&self) -> bool {
        self.holding
    }

    /// Run the pending frame through `pipeline`, then hold it, committing the
    /// previously held frame first if the two cannot be folded.
    pub fn push_state(&mut self, pipeline: &mut TouchPipeline<W>, mut commit: impl FnMut(&TouchState<W>)) {
        if pipeline.filter(&mut self.pending) {
            return;
        }
        if self.holding && !self.pending.can_be_folded_with(&self.previous) {
            commit(&self.previous);
        } else if self.holding {
            tracing::trace!(points = self.pending.len(), "touch frame folded");
        }
        self.pending.copy_to(&mut self.previous);
        self.holding = true;
    }

    /// Commit the held frame, then any frame the pipeline still holds back.
    pub fn flush_state(&mut self, pipeline: &mut TouchPipeline<W>, mut commit: impl FnMut(&TouchState<W>)) {
        if self.holding {
            commit(&self.previous);
            self.holding = false;
        }
        if pipeline.flush(&mut self.previous) {
            commit(&self.previous);
        }
    }
}

impl<W: Copy + Eq + 'static> Default for TouchLookahead<W> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::AssignIdsFilter;
    use crate::touch::TouchPoint;
    use alloc::boxed::Box;
    use alloc::vec::Vec;

    fn ids_pipeline() -> TouchPipeline<u32> {
        let mut pipeline = TouchPipeline::new();
        pipeline.add_filter(Box::new(AssignIdsFilter::new()));
        pipeline
    }

    fn snapshot(s: &TouchState<u32>) -> Vec<(u32, i32, i32)> {
        s.points().iter().map(|p| (p.id, p.x, p.y)).collect()
    }

    #[test]
    fn moves_fold_and_shape_changes_commit() {
        let mut pipeline = ids_pipeline();
        let mut lookahead = TouchLookahead::new();
        let mut committed = Vec::new();

        // Press, two moves, a second finger, flush.
        lookahead.state_mut().add_point(TouchPoint::new(0, 10, 10));
        lookahead.push_state(&mut pipeline, |s| committed.push(snapshot(s)));
        assert!(committed.is_empty(), "the first frame is held");

        for x in [12, 14] {
            lookahead.state_mut().point_zero_mut().x = x;
            lookahead.push_state(&mut pipeline, |s| committed.push(snapshot(s)));
        }
        assert!(committed.is_empty(), "moves fold into the held frame");

        lookahead.state_mut().add_point(TouchPoint::new(0, 200, 200));
        lookahead.push_state(&mut pipeline, |s| committed.push(snapshot(s)));
        assert_eq!(committed, [vec_of(&[(1, 14, 10)])]);

        lookahead.flush_state(&mut pipeline, |s| committed.push(snapshot(s)));
        assert_eq!(
            committed,
            [vec_of(&[(1, 14, 10)]), vec_of(&[(1, 14, 10), (2, 200, 200)])]
        );
        assert!(!lookahead.is_holding());

        lookahead.flush_state(&mut pipeline, |s| committed.push(snapshot(s)));
        assert_eq!(committed.len(), 2, "flushing twice commits once");
    }

    fn vec_of(points: &[(u32, i32, i32)]) -> Vec<(u32, i32, i32)> {
        points.to_vec()
    }
}
