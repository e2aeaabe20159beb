// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording platform for unit tests.

use alloc::vec;
use alloc::vec::Vec;

use crate::key::{KeyAction, KeyCode, KeyEvent};
use crate::modifiers::Modifiers;
use crate::mouse::{MouseAction, MouseButton, MouseEvent};
use crate::platform::Platform;
use crate::touch_input::{TouchAction, TouchEvent};

/// One observed platform call. Coordinates are window relative.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Note {
    Cursor(i32, i32),
    Mouse(u32, MouseAction, Option<MouseButton>, i32, i32),
    BeginTouch(u32, usize),
    Touch(u32, TouchAction, u32, i32, i32),
    EndTouch(u32),
    Key(u32, KeyAction, KeyCode, Modifiers),
}

impl Note {
    pub(crate) fn window(&self) -> Option<u32> {
        match *self {
            Self::Cursor(..) => None,
            Self::Mouse(w, ..)
            | Self::BeginTouch(w, _)
            | Self::Touch(w, ..)
            | Self::EndTouch(w)
            | Self::Key(w, ..) => Some(w),
        }
    }
}

/// Screen with rectangular windows `(id, x, y, width, height)`; later windows
/// are on top.
#[derive(Debug)]
pub(crate) struct Recorder {
    pub(crate) screen: (i32, i32),
    pub(crate) windows: Vec<(u32, i32, i32, i32, i32)>,
    pub(crate) closed: Vec<u32>,
    pub(crate) focused: Option<u32>,
    pub(crate) notes: Vec<Note>,
    pub(crate) mouse: Vec<MouseEvent>,
}

impl Recorder {
    /// 800×600 screen covered by window 1.
    pub(crate) fn single_window() -> Self {
        Self {
            screen: (800, 600),
            windows: vec![(1, 0, 0, 800, 600)],
            closed: Vec::new(),
            focused: None,
            notes: Vec::new(),
            mouse: Vec::new(),
        }
    }

    /// 800×600 screen split into window 1 (left half) and window 2 (right half).
    pub(crate) fn two_windows() -> Self {
        Self {
            windows: vec![(1, 0, 0, 400, 600), (2, 400, 0, 400, 600)],
            ..Self::single_window()
        }
    }

    pub(crate) fn close(&mut self, window: u32) {
        self.closed.push(window);
    }

    /// Touch notes only, including batch markers.
    pub(crate) fn touch_notes(&self) -> Vec<Note> {
        self.notes
            .iter()
            .filter(|n| matches!(n, Note::BeginTouch(..) | Note::Touch(..) | Note::EndTouch(_)))
            .cloned()
            .collect()
    }

    fn is_open(&self, window: u32) -> bool {
        !self.closed.contains(&window)
    }
}

impl Platform for Recorder {
    type Window = u32;

    fn screen_size(&self) -> (i32, i32) {
        self.screen
    }

    fn window_at(&self, x: i32, y: i32) -> Option<u32> {
        self.windows
            .iter()
            .rev()
            .find(|&&(id, wx, wy, w, h)| {
                self.is_open(id) && x >= wx && y >= wy && x < wx + w && y < wy + h
            })
            .map(|w| w.0)
    }

    fn focused_window(&self) -> Option<u32> {
        self.focused
    }

    fn window_exists(&self, window: u32) -> bool {
        self.is_open(window) && self.windows.iter().any(|w| w.0 == window)
    }

    fn window_origin(&self, window: u32) -> (i32, i32) {
        self.windows
            .iter()
            .find(|w| w.0 == window)
            .map_or((0, 0), |w| (w.1, w.2))
    }

    fn set_cursor_position(&mut self, x: i32, y: i32) {
        self.notes.push(Note::Cursor(x, y));
    }

    fn notify_mouse(&mut self, window: u32, event: &MouseEvent) {
        self.notes.push(Note::Mouse(
            window,
            event.action,
            event.button,
            event.x,
            event.y,
        ));
        self.mouse.push(*event);
    }

    fn notify_begin_touch(&mut self, window: u32, _modifiers: Modifiers, count: usize) {
        self.notes.push(Note::BeginTouch(window, count));
    }

    fn notify_next_touch(&mut self, window: u32, event: &TouchEvent) {
        self.notes.push(Note::Touch(
            window,
            event.action,
            event.id,
            event.x,
            event.y,
        ));
    }

    fn notify_end_touch(&mut self, window: u32) {
        self.notes.push(Note::EndTouch(window));
    }

    fn notify_key(&mut self, window: u32, event: &KeyEvent) {
        self.notes
            .push(Note::Key(window, event.action, event.code, event.modifiers));
    }
}
