// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_event_state --heading-base-level=0

//! Understory Event State: raw input state tracking.
//!
//! Input drivers report what the hardware looks like *now*: which keys are
//! held, where the pointer is, where each finger touches. This crate keeps the
//! previous state of each device and turns every new state into the ordered
//! events that lead from one to the other.
//!
//! ## Devices
//!
//! - [`KeyInput`](key::KeyInput): releases, then presses, to the focused
//!   window.
//! - [`MouseInput`](mouse::MouseInput): exit, enter, move or drag, button
//!   downs and ups, and wheel, with positions clamped to the screen and a
//!   pointer grab while a button is held.
//! - [`TouchInput`](touch_input::TouchInput): batches of pressed, moved,
//!   still, and released points, keyed by stable point IDs.
//!
//! Touch frames pass through a [`TouchPipeline`](pipeline::TouchPipeline)
//! first. The stock filters assign IDs by nearest match
//! ([`touch_states`]) and hold points still within a jitter radius. A
//! [`TouchLookahead`](lookahead::TouchLookahead) folds frames that differ only
//! in position, and a [`MouseInputSynthesizer`](synth::MouseInputSynthesizer)
//! can drive the mouse from the primary touch point.
//!
//! [`InputTracker`](tracker::InputTracker) owns all of the above for one input
//! thread. Window lookup and event delivery go through a
//! [`Platform`](platform::Platform) you implement.
//!
//! ## Example
//!
//! ```
//! use understory_event_state::key::KeyEvent;
//! use understory_event_state::modifiers::Modifiers;
//! use understory_event_state::mouse::{MouseAction, MouseButton, MouseEvent, MouseState};
//! use understory_event_state::platform::Platform;
//! use understory_event_state::touch_input::TouchEvent;
//! use understory_event_state::tracker::InputTracker;
//!
//! /// One full-screen window that records mouse actions.
//! #[derive(Default)]
//! struct Screen {
//!     seen: Vec<MouseAction>,
//! }
//!
//! impl Platform for Screen {
//!     type Window = u8;
//!     fn screen_size(&self) -> (i32, i32) { (640, 480) }
//!     fn window_at(&self, _x: i32, _y: i32) -> Option<u8> { Some(0) }
//!     fn focused_window(&self) -> Option<u8> { Some(0) }
//!     fn window_origin(&self, _window: u8) -> (i32, i32) { (0, 0) }
//!     fn set_cursor_position(&mut self, _x: i32, _y: i32) {}
//!     fn notify_mouse(&mut self, _window: u8, event: &MouseEvent) { self.seen.push(event.action) }
//!     fn notify_begin_touch(&mut self, _window: u8, _modifiers: Modifiers, _count: usize) {}
//!     fn notify_next_touch(&mut self, _window: u8, _event: &TouchEvent) {}
//!     fn notify_end_touch(&mut self, _window: u8) {}
//!     fn notify_key(&mut self, _window: u8, _event: &KeyEvent) {}
//! }
//!
//! let mut screen = Screen::default();
//! let mut tracker = InputTracker::<u8>::new();
//!
//! let mut state = MouseState::new();
//! tracker.mouse_state(&mut state);
//! state.set_position(900, 20);
//! state.press_button(MouseButton::Primary);
//! tracker.set_mouse_state(state, &mut screen);
//!
//! assert_eq!(screen.seen, [MouseAction::Drag, MouseAction::Down]);
//! let mut now = MouseState::new();
//! tracker.mouse_state(&mut now);
//! assert_eq!(now.x(), 639);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod config;
pub mod error;
pub mod key;
pub mod lookahead;
pub mod modifiers;
pub mod mouse;
pub mod pipeline;
pub mod platform;
pub mod set;
pub mod synth;
pub mod touch;
pub mod touch_input;
pub mod touch_states;
pub mod tracker;

#[cfg(test)]
mod testing;

pub use config::InputConfig;
pub use error::TouchError;
pub use key::{KeyCode, KeyInput, KeyState};
pub use modifiers::Modifiers;
pub use mouse::{MouseButton, MouseInput, MouseState};
pub use platform::Platform;
pub use touch::{TouchPoint, TouchState};
pub use touch_input::TouchInput;
pub use tracker::InputTracker;
