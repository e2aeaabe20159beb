// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Touch state and touch event synthesis.
//!
//! [`TouchInput::set_state`] compares a new frame with the current one and
//! delivers the difference as batches of [`TouchEvent`]s, each batch framed by
//! [`notify_begin_touch`](crate::platform::Platform::notify_begin_touch) and
//! [`notify_end_touch`](crate::platform::Platform::notify_end_touch):
//!
//! - When the frame moves to another window, every old point is released in
//!   the old window, then every new point is pressed in the new one, as two
//!   separate batches.
//! - Otherwise one batch reports each old point as `Still`, `Moved`, or
//!   `Released` (in ID order), followed by `Pressed` for points that are new.
//!
//! An identical frame produces nothing. While any point is down, the frame
//! stays with the window it started in.

use crate::modifiers::Modifiers;
use crate::platform::Platform;
use crate::touch::{TouchPoint, TouchState};

/// Kind of touch event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TouchAction {
    /// The point went down.
    Pressed,
    /// The point lifted.
    Released,
    /// The point moved.
    Moved,
    /// The point did not move.
    Still,
}

/// Synthesized touch event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TouchEvent {
    /// What happened.
    pub action: TouchAction,
    /// Point ID.
    pub id: u32,
    /// Position relative to the window.
    pub x: i32,
    /// Position relative to the window.
    pub y: i32,
    /// Screen position.
    pub screen_x: i32,
    /// Screen position.
    pub screen_y: i32,
    /// Whether this is the primary point of its frame.
    pub primary: bool,
}

/// Current touch frame and its event synthesis.
#[derive(Clone, Debug)]
pub struct TouchInput<W> {
    state: TouchState<W>,
}

impl<W: Copy + Eq> TouchInput<W> {
    /// No points down.
    pub fn new() -> Self {
        Self {
            state: TouchState::new(),
        }
    }

    /// Copy the current frame into `target`.
    pub fn state(&self, target: &mut TouchState<W>) {
        self.state.copy_to(target);
    }

    pub(crate) fn current(&self) -> &TouchState<W> {
        &self.state
    }

    /// Move to `new_state`, emitting the events for the transition.
    ///
    /// Points are ordered by ID and the primary point is kept while it stays
    /// down. A frame without a cached window stays in the current window
    /// while any point is down. `key_modifiers` are reported with every batch.
    pub fn set_state<P: Platform<Window = W>>(
        &mut self,
        new_state: &TouchState<W>,
        key_modifiers: Modifiers,
        platform: &mut P,
    ) {
        let mut next = new_state.clone();
        next.sort_points_by_id();
        next.inherit_primary_id(&self.state);
        next.assign_primary_id();
        if !self.state.is_empty() {
            next.inherit_window(&self.state);
        }

        let old_window = self.state.window(false, None, &*platform);
        let recalculate = self.state.is_empty();
        let window = next.window(recalculate, old_window, &*platform);
        let modifiers = key_modifiers & Modifiers::KEYS;

        if next != self.state {
            if window != old_window {
                if let Some(w) = old_window {
                    dispatch_all(platform, w, &self.state, TouchAction::Released, modifiers);
                }
                if let Some(w) = window {
                    dispatch_all(platform, w, &next, TouchAction::Pressed, modifiers);
                }
            } else if let Some(w) = window {
                self.dispatch_diff(platform, w, &next, modifiers);
            }
        }

        tracing::debug!(points = next.len(), primary = ?next.primary_id(), "touch state adopted");
        self.state = next;
    }

    fn dispatch_diff<P: Platform<Window = W>>(
        &self,
        platform: &mut P,
        window: W,
        next: &TouchState<W>,
        modifiers: Modifiers,
    ) {
        let old = &self.state;
        let fresh = next
            .points()
            .iter()
            .filter(|p| old.point_for_id(p.id).is_none())
            .count();
        platform.notify_begin_touch(window, modifiers, old.len() + fresh);

        for o in old.points() {
            let (action, point, primary) = match next.point_for_id(o.id) {
                Some(n) if n.x == o.x && n.y == o.y => {
                    (TouchAction::Still, *n, next.primary_id() == Some(n.id))
                }
                Some(n) => (TouchAction::Moved, *n, next.primary_id() == Some(n.id)),
                None => (TouchAction::Released, *o, old.primary_id() == Some(o.id)),
            };
            emit(platform, window, action, point, primary);
        }
        for n in next.points() {
            if old.point_for_id(n.id).is_none() {
                emit(
                    platform,
                    window,
                    TouchAction::Pressed,
                    *n,
                    next.primary_id() == Some(n.id),
                );
            }
        }

        platform.notify_end_touch(window);
    }
}

impl<W: Copy + Eq> Default for TouchInput<W> {
    fn default() -> Self {
        Self::new()
    }
}

/// One batch reporting every point of `state` with the same action.
fn dispatch_all<P: Platform>(
    platform: &mut P,
    window: P::Window,
    state: &TouchState<P::Window>,
    action: TouchAction,
    modifiers: Modifiers,
) {
    if state.is_empty() {
        return;
    }
    platform.notify_begin_touch(window, modifiers, state.len());
    for p in state.points() {
        emit(platform, window, action, *p, state.primary_id() == Some(p.id));
    }
    platform.notify_end_touch(window);
}

fn emit<P: Platform>(
    platform: &mut P,
    window: P::Window,
    action: TouchAction,
    point: TouchPoint,
    primary: bool,
) {
    let (ox, oy) = platform.window_origin(window);
    let event = TouchEvent {
        action,
        id: point.id,
        x: point.x - ox,
        y: point.y - oy,
        screen_x: point.x,
        screen_y: point.y,
        primary,
    };
    tracing::trace!(?action, id = point.id, x = event.x, y = event.y, ?window, "touch event");
    platform.notify_next_touch(window, &event);
}
