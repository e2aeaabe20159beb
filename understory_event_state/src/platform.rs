// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The windowing layer the trackers talk to.
//!
//! Input trackers do not know about windows, views, or cursors. They resolve
//! screen positions through a [`Platform`] and deliver every synthesized event
//! to it. Coordinates are integer screen pixels; window-relative coordinates
//! are derived from [`Platform::window_origin`].

use core::fmt::Debug;

use crate::key::KeyEvent;
use crate::modifiers::Modifiers;
use crate::mouse::MouseEvent;
use crate::touch_input::TouchEvent;

/// Window lookup, cursor control, and event sinks.
pub trait Platform {
    /// Handle identifying a window.
    type Window: Copy + Eq + Debug;

    /// Screen width and height in pixels.
    fn screen_size(&self) -> (i32, i32);

    /// Topmost window containing the screen point, if any.
    fn window_at(&self, x: i32, y: i32) -> Option<Self::Window>;

    /// Window with keyboard focus, if any.
    fn focused_window(&self) -> Option<Self::Window>;

    /// Whether `window` is still open.
    ///
    /// Cached windows that no longer exist are dropped and resolved again.
    fn window_exists(&self, window: Self::Window) -> bool {
        let _ = window;
        true
    }

    /// Screen position of the window's top-left corner.
    fn window_origin(&self, window: Self::Window) -> (i32, i32);

    /// Move the system cursor.
    fn set_cursor_position(&mut self, x: i32, y: i32);

    /// Deliver a mouse event.
    fn notify_mouse(&mut self, window: Self::Window, event: &MouseEvent);

    /// Open a batch of `count` touch events.
    fn notify_begin_touch(&mut self, window: Self::Window, modifiers: Modifiers, count: usize);

    /// Deliver one touch event of the open batch.
    fn notify_next_touch(&mut self, window: Self::Window, event: &TouchEvent);

    /// Close the open touch batch.
    fn notify_end_touch(&mut self, window: Self::Window);

    /// Deliver a key event.
    fn notify_key(&mut self, window: Self::Window, event: &KeyEvent);
}
