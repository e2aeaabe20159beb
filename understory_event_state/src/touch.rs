// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Multi-touch frame state.
//!
//! A [`TouchState`] is one frame of touch input: an ordered list of
//! [`TouchPoint`]s, each identified by a stable ID once IDs have been
//! assigned. ID `0` marks a point whose ID is not known yet.
//!
//! Storage keeps released slots around so a driver can refill the same state
//! every frame without allocating. [`TouchState::point_zero_mut`] brings the
//! first slot back to life for single-touch drivers that only ever write one
//! point.
//!
//! ```
//! use understory_event_state::touch::{TouchPoint, TouchState};
//!
//! let mut frame = TouchState::<u32>::new();
//! frame.add_point(TouchPoint::new(2, 10, 10));
//! frame.add_point(TouchPoint::new(1, 50, 50));
//! frame.sort_points_by_id();
//! frame.assign_primary_id();
//! assert_eq!(frame.primary_id(), Some(1));
//! assert_eq!(frame.point_for_id(2).map(|p| p.x), Some(10));
//! ```

use smallvec::SmallVec;

use crate::error::TouchError;
use crate::platform::Platform;

/// Unassigned touch ID.
pub const NO_ID: u32 = 0;

/// One contact point in screen coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct TouchPoint {
    /// Stable ID, or [`NO_ID`].
    pub id: u32,
    /// Horizontal screen position.
    pub x: i32,
    /// Vertical screen position.
    pub y: i32,
}

impl TouchPoint {
    /// Create a point.
    pub const fn new(id: u32, x: i32, y: i32) -> Self {
        Self { id, x, y }
    }

    /// Squared distance to `other`.
    pub fn distance_squared(&self, other: &Self) -> i64 {
        let dx = i64::from(self.x) - i64::from(other.x);
        let dy = i64::from(self.y) - i64::from(other.y);
        dx * dx + dy * dy
    }
}

/// One frame of touch points.
#[derive(Clone, Debug)]
pub struct TouchState<W> {
    slots: SmallVec<[TouchPoint; 4]>,
    count: usize,
    primary_id: Option<u32>,
    window: Option<W>,
}

impl<W: Copy + Eq> TouchState<W> {
    /// Empty frame.
    pub fn new() -> Self {
        Self {
            slots: SmallVec::new(),
            count: 0,
            primary_id: None,
            window: None,
        }
    }

    /// Live points, in order.
    pub fn points(&self) -> &[TouchPoint] {
        &self.slots[..self.count]
    }

    /// Live points, mutable.
    pub fn points_mut(&mut self) -> &mut [TouchPoint] {
        &mut self.slots[..self.count]
    }

    /// Number of live points.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Returns `true` if no point is live.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Point at `index`.
    pub fn point(&self, index: usize) -> Option<&TouchPoint> {
        self.points().get(index)
    }

    /// Live point with ID `id`.
    pub fn point_for_id(&self, id: u32) -> Option<&TouchPoint> {
        self.points().iter().find(|p| p.id == id)
    }

    /// Append a point and return it for editing.
    pub fn add_point(&mut self, point: TouchPoint) -> &mut TouchPoint {
        if self.count < self.slots.len() {
            self.slots[self.count] = point;
        } else {
            self.slots.push(point);
        }
        self.count += 1;
        &mut self.slots[self.count - 1]
    }

    /// First point, for single-touch drivers.
    ///
    /// With no live points, the first slot is made live again with whatever it
    /// held before (a zeroed point if it never held one).
    pub fn point_zero_mut(&mut self) -> &mut TouchPoint {
        if self.slots.is_empty() {
            self.slots.push(TouchPoint::default());
        }
        if self.count == 0 {
            self.count = 1;
        }
        &mut self.slots[0]
    }

    /// Remove the point at `index`, keeping the order of the rest.
    pub fn remove_point(&mut self, index: usize) -> Result<TouchPoint, TouchError> {
        self.check(index)?;
        let removed = self.slots[index];
        self.slots[index..self.count].rotate_left(1);
        self.count -= 1;
        Ok(removed)
    }

    /// Overwrite the point at `index`.
    pub fn set_point(&mut self, index: usize, point: TouchPoint) -> Result<(), TouchError> {
        self.check(index)?;
        self.slots[index] = point;
        Ok(())
    }

    /// Drop every live point. Slots stay allocated.
    pub fn clear(&mut self) {
        self.count = 0;
    }

    /// Overwrite `dest` with this state.
    pub fn copy_to(&self, dest: &mut Self) {
        dest.slots.clear();
        dest.slots.extend_from_slice(self.points());
        dest.count = self.count;
        dest.primary_id = self.primary_id;
        dest.window = self.window;
    }

    /// Order live points by ascending ID.
    pub fn sort_points_by_id(&mut self) {
        self.points_mut().sort_by_key(|p| p.id);
    }

    /// Keep the primary ID while its point is live; otherwise promote the
    /// first point, or clear it when there are no points.
    pub fn assign_primary_id(&mut self) {
        let keep = self
            .primary_id
            .is_some_and(|id| id != NO_ID && self.point_for_id(id).is_some());
        if !keep {
            self.primary_id = self.points().first().map(|p| p.id);
        }
    }

    /// Start from `from`'s primary ID when this frame has none of its own.
    pub(crate) fn inherit_primary_id(&mut self, from: &Self) {
        if self.primary_id.is_none() {
            self.primary_id = from.primary_id;
        }
    }

    /// Start from `from`'s cached window when this frame has none of its own.
    pub(crate) fn inherit_window(&mut self, from: &Self) {
        if self.window.is_none() {
            self.window = from.window;
        }
    }

    /// ID of the primary point.
    pub fn primary_id(&self) -> Option<u32> {
        self.primary_id
    }

    /// Primary point, if live.
    pub fn primary_point(&self) -> Option<&TouchPoint> {
        self.primary_id.and_then(|id| self.point_for_id(id))
    }

    /// Whether this frame has the same shape as `other`: the same number of
    /// points with the same IDs. Coordinates may differ.
    pub fn can_be_folded_with(&self, other: &Self) -> bool {
        self.count == other.count
            && self
                .points()
                .iter()
                .all(|p| other.point_for_id(p.id).is_some())
    }

    /// Cached window, without any lookup.
    pub fn cached_window(&self) -> Option<W> {
        self.window
    }

    /// Window the frame belongs to.
    ///
    /// Looks the window up at the primary point (or the first point) when
    /// nothing is cached or when `recalculate` is set, falling back to
    /// `fallback` when no window is there. A cached window the platform
    /// reports as closed is dropped first.
    pub fn window<P: Platform<Window = W>>(
        &mut self,
        recalculate: bool,
        fallback: Option<W>,
        platform: &P,
    ) -> Option<W> {
        if let Some(w) = self.window
            && !platform.window_exists(w)
        {
            fn log_dropped<P: Platform>(w: P::Window) {
                tracing::debug!(?w, "dropping closed window from touch state");
            }
            log_dropped::<P>(w);
            self.window = None;
        }
        if self.window.is_none() || recalculate {
            let anchor = self.primary_point().or_else(|| self.points().first()).copied();
            self.window = anchor
                .and_then(|p| platform.window_at(p.x, p.y))
                .or(fallback);
        }
        self.window
    }

    fn check(&self, index: usize) -> Result<(), TouchError> {
        if index < self.count {
            Ok(())
        } else {
            Err(TouchError::PointIndexOutOfRange {
                index,
                count: self.count,
            })
        }
    }
}

impl<W: Copy + Eq> Default for TouchState<W> {
    fn default() -> Self {
        Self::new()
    }
}

/// Order-sensitive comparison of the live points.
impl<W: Copy + Eq> PartialEq for TouchState<W> {
    fn eq(&self, other: &Self) -> bool {
        self.points() == other.points()
    }
}

impl<W: Copy + Eq> Eq for TouchState<W> {}
