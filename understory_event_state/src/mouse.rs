// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pointer state and mouse event synthesis.
//!
//! ## Overview
//!
//! A driver proposes a complete new [`MouseState`] (position, held buttons,
//! wheel motion). [`MouseInput::set_state`] compares it with the current state
//! and emits the events that take observers from one to the other, one
//! transition at a time:
//!
//! 1. `Exit` from the old window, if the window under the pointer changed.
//! 2. The system cursor follows the new position.
//! 3. Nothing more if no window is under the new position.
//! 4. `Enter` into the new window, if it changed.
//! 5. `Move`, or `Drag` while the new state holds a button, if the window or
//!    the position changed.
//! 6. `Down` per newly held button, then `Up` per released button, in
//!    ascending button order. Each event's modifiers reflect the buttons held
//!    after that single change.
//! 7. `Wheel` if the new state carries wheel motion.
//!
//! Positions are clamped to the screen before anything else happens.
//!
//! ## Pointer grab
//!
//! While a button is held, the window under the pointer is not looked up
//! again: a drag stays with the window it started in.
//!
//! ```
//! # use understory_event_state::mouse::{MouseButton, MouseState};
//! let mut state = MouseState::<u32>::new();
//! state.set_position(10, 20);
//! state.press_button(MouseButton::Secondary);
//! assert_eq!(state.button(), Some(MouseButton::Secondary));
//! ```

use crate::modifiers::Modifiers;
use crate::platform::Platform;
use crate::set::SmallSet;

/// Mouse button.
///
/// The declaration order is the order simultaneous changes are reported in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MouseButton {
    /// Usually the left button.
    Primary,
    /// Usually the right button.
    Secondary,
    /// Middle button or wheel click.
    Middle,
    /// Back side button.
    Back,
    /// Forward side button.
    Forward,
}

impl MouseButton {
    /// Modifier flag set while this button is held.
    pub fn modifier(self) -> Modifiers {
        match self {
            Self::Primary => Modifiers::BUTTON_PRIMARY,
            Self::Secondary => Modifiers::BUTTON_SECONDARY,
            Self::Middle => Modifiers::BUTTON_MIDDLE,
            Self::Back => Modifiers::BUTTON_BACK,
            Self::Forward => Modifiers::BUTTON_FORWARD,
        }
    }
}

/// One wheel notch, if any.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Wheel {
    /// No wheel motion.
    #[default]
    None,
    /// Scrolled away from the user.
    Up,
    /// Scrolled towards the user.
    Down,
}

/// Pointer position, held buttons, and the window under the pointer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MouseState<W> {
    x: i32,
    y: i32,
    buttons: SmallSet<MouseButton>,
    wheel: Wheel,
    window: Option<W>,
}

impl<W: Copy + Eq> MouseState<W> {
    /// Pointer at the origin, nothing held.
    pub fn new() -> Self {
        Self {
            x: 0,
            y: 0,
            buttons: SmallSet::new(),
            wheel: Wheel::None,
            window: None,
        }
    }

    /// Horizontal screen position.
    pub fn x(&self) -> i32 {
        self.x
    }

    /// Vertical screen position.
    pub fn y(&self) -> i32 {
        self.y
    }

    /// Set the screen position. The cached window is kept until it is
    /// resolved again.
    pub fn set_position(&mut self, x: i32, y: i32) {
        self.x = x;
        self.y = y;
    }

    /// Mark `button` as held.
    pub fn press_button(&mut self, button: MouseButton) {
        self.buttons.insert(button);
    }

    /// Mark `button` as released.
    pub fn release_button(&mut self, button: MouseButton) {
        self.buttons.remove(button);
    }

    /// Whether `button` is held.
    pub fn is_pressed(&self, button: MouseButton) -> bool {
        self.buttons.contains(button)
    }

    /// Held buttons.
    pub fn buttons(&self) -> &SmallSet<MouseButton> {
        &self.buttons
    }

    /// Lowest held button, reported as the button of motion events.
    pub fn button(&self) -> Option<MouseButton> {
        self.buttons.first()
    }

    /// Button part of the modifier mask.
    pub fn modifiers(&self) -> Modifiers {
        self.buttons
            .iter()
            .fold(Modifiers::empty(), |m, b| m | b.modifier())
    }

    /// Pending wheel motion.
    pub fn wheel(&self) -> Wheel {
        self.wheel
    }

    /// Set the wheel motion for the next update.
    pub fn set_wheel(&mut self, wheel: Wheel) {
        self.wheel = wheel;
    }

    /// Cached window, without any lookup.
    pub fn cached_window(&self) -> Option<W> {
        self.window
    }

    /// Window under the pointer.
    ///
    /// Looks the window up when nothing is cached or when `recalculate` is
    /// set; otherwise trusts the cache. A cached window the platform reports
    /// as closed is dropped first.
    pub fn window<P: Platform<Window = W>>(&mut self, recalculate: bool, platform: &P) -> Option<W> {
        if let Some(w) = self.window
            && !platform.window_exists(w)
        {
            fn log_dropped<P: Platform>(w: P::Window) {
                tracing::debug!(?w, "dropping closed window from mouse state");
            }
            log_dropped::<P>(w);
            self.window = None;
        }
        if self.window.is_none() || recalculate {
            self.window = platform.window_at(self.x, self.y);
        }
        self.window
    }

    /// Overwrite `dest` with this state.
    pub fn copy_to(&self, dest: &mut Self) {
        dest.x = self.x;
        dest.y = self.y;
        self.buttons.copy_to(&mut dest.buttons);
        dest.wheel = self.wheel;
        dest.window = self.window;
    }
}

impl<W: Copy + Eq> Default for MouseState<W> {
    fn default() -> Self {
        Self::new()
    }
}

/// Kind of mouse event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MouseAction {
    /// The pointer entered a window.
    Enter,
    /// The pointer left a window.
    Exit,
    /// The pointer moved with no button held.
    Move,
    /// The pointer moved with a button held.
    Drag,
    /// A button went down.
    Down,
    /// A button went up.
    Up,
    /// The wheel turned.
    Wheel,
}

/// Synthesized mouse event.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MouseEvent {
    /// What happened.
    pub action: MouseAction,
    /// Button that changed, or the lowest held button for other actions.
    pub button: Option<MouseButton>,
    /// Position relative to the window.
    pub x: i32,
    /// Position relative to the window.
    pub y: i32,
    /// Screen position.
    pub screen_x: i32,
    /// Screen position.
    pub screen_y: i32,
    /// Keyboard modifiers and held buttons.
    pub modifiers: Modifiers,
    /// Whether this press should open a context menu.
    pub popup_trigger: bool,
    /// Whether the event was derived from another device (touch).
    pub synthesized: bool,
    /// Vertical scroll amount for [`MouseAction::Wheel`]; positive is up.
    pub wheel_delta: f64,
}

/// Current pointer state and its event synthesis.
#[derive(Clone, Debug)]
pub struct MouseInput<W> {
    state: MouseState<W>,
    scratch: SmallSet<MouseButton>,
    wheel_delta: f64,
}

impl<W: Copy + Eq> MouseInput<W> {
    /// Pointer at the origin with nothing held, one scroll unit per wheel notch.
    pub fn new() -> Self {
        Self::with_wheel_delta(1.0)
    }

    /// Like [`MouseInput::new`] with a custom scroll amount per wheel notch.
    pub fn with_wheel_delta(wheel_delta: f64) -> Self {
        Self {
            state: MouseState::new(),
            scratch: SmallSet::new(),
            wheel_delta,
        }
    }

    /// Copy the current state into `target`.
    pub fn state(&self, target: &mut MouseState<W>) {
        self.state.copy_to(target);
    }

    /// Move to `new_state`, emitting the events for the transition.
    ///
    /// `key_modifiers` are combined into every event's modifiers;
    /// `synthesized` marks events derived from touch input.
    pub fn set_state<P: Platform<Window = W>>(
        &mut self,
        mut new_state: MouseState<W>,
        synthesized: bool,
        key_modifiers: Modifiers,
        platform: &mut P,
    ) {
        let (width, height) = platform.screen_size();
        new_state.x = new_state.x.clamp(0, (width - 1).max(0));
        new_state.y = new_state.y.clamp(0, (height - 1).max(0));

        let old_window = self.state.window(false, &*platform);
        let recalculate = self.state.buttons.is_empty();
        if !recalculate && new_state.window.is_none() {
            new_state.window = old_window;
        }
        let window = new_state.window(recalculate, &*platform);
        let key_modifiers = key_modifiers & Modifiers::KEYS;

        let old = MouseEvent {
            action: MouseAction::Exit,
            button: self.state.button(),
            x: 0,
            y: 0,
            screen_x: self.state.x,
            screen_y: self.state.y,
            modifiers: self.state.modifiers() | key_modifiers,
            popup_trigger: false,
            synthesized,
            wheel_delta: 0.0,
        };

        if old_window != window
            && let Some(old_window) = old_window
        {
            deliver(platform, old_window, old);
        }

        let moved = new_state.x != self.state.x || new_state.y != self.state.y;
        if moved {
            platform.set_cursor_position(new_state.x, new_state.y);
        }

        let Some(window) = window else {
            tracing::trace!(x = new_state.x, y = new_state.y, "pointer outside every window");
            self.adopt(new_state);
            return;
        };

        let at_new = MouseEvent {
            screen_x: new_state.x,
            screen_y: new_state.y,
            ..old
        };

        if old_window != Some(window) {
            deliver(
                platform,
                window,
                MouseEvent {
                    action: MouseAction::Enter,
                    ..at_new
                },
            );
        }

        if old_window != Some(window) || moved {
            let action = if new_state.buttons.is_empty() {
                MouseAction::Move
            } else {
                MouseAction::Drag
            };
            deliver(platform, window, MouseEvent { action, ..at_new });
        }

        let mut held = self.state.modifiers();

        new_state
            .buttons
            .difference_into(&mut self.scratch, &self.state.buttons);
        for button in self.scratch.iter() {
            held |= button.modifier();
            deliver(
                platform,
                window,
                MouseEvent {
                    action: MouseAction::Down,
                    button: Some(button),
                    modifiers: held | key_modifiers,
                    popup_trigger: button == MouseButton::Secondary,
                    ..at_new
                },
            );
        }

        self.state
            .buttons
            .difference_into(&mut self.scratch, &new_state.buttons);
        for button in self.scratch.iter() {
            held.remove(button.modifier());
            deliver(
                platform,
                window,
                MouseEvent {
                    action: MouseAction::Up,
                    button: Some(button),
                    modifiers: held | key_modifiers,
                    ..at_new
                },
            );
        }

        let delta = match new_state.wheel {
            Wheel::None => None,
            Wheel::Up => Some(self.wheel_delta),
            Wheel::Down => Some(-self.wheel_delta),
        };
        if let Some(wheel_delta) = delta {
            deliver(
                platform,
                window,
                MouseEvent {
                    action: MouseAction::Wheel,
                    button: new_state.button(),
                    modifiers: held | key_modifiers,
                    wheel_delta,
                    ..at_new
                },
            );
        }

        self.adopt(new_state);
    }

    fn adopt(&mut self, mut new_state: MouseState<W>) {
        new_state.wheel = Wheel::None;
        tracing::debug!(
            x = new_state.x,
            y = new_state.y,
            buttons = new_state.buttons.len(),
            "mouse state adopted"
        );
        self.state = new_state;
    }
}

impl<W: Copy + Eq> Default for MouseInput<W> {
    fn default() -> Self {
        Self::new()
    }
}

fn deliver<P: Platform>(platform: &mut P, window: P::Window, mut event: MouseEvent) {
    let (ox, oy) = platform.window_origin(window);
    event.x = event.screen_x - ox;
    event.y = event.screen_y - oy;
    tracing::trace!(action = ?event.action, button = ?event.button, x = event.x, y = event.y, ?window, "mouse event");
    platform.notify_mouse(window, &event);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Note, Recorder};
    use alloc::vec;
    use alloc::vec::Vec;

    fn at(x: i32, y: i32, buttons: &[MouseButton]) -> MouseState<u32> {
        let mut s = MouseState::new();
        s.set_position(x, y);
        for &b in buttons {
            s.press_button(b);
        }
        s
    }

    fn settle(input: &mut MouseInput<u32>, p: &mut Recorder, state: MouseState<u32>) {
        input.set_state(state, false, Modifiers::empty(), p);
        p.notes.clear();
        p.mouse.clear();
    }

    #[test]
    fn positions_are_clamped_to_the_screen() {
        let mut p = Recorder::single_window();
        let mut input = MouseInput::new();
        for (x, y) in [(-10, -10), (800, 600), (5000, -1), (-1, 300)] {
            input.set_state(at(x, y, &[]), false, Modifiers::empty(), &mut p);
            let mut s = MouseState::new();
            input.state(&mut s);
            assert!((0..800).contains(&s.x()), "x {} out of range", s.x());
            assert!((0..600).contains(&s.y()), "y {} out of range", s.y());
        }
    }

    #[test]
    fn window_change_orders_exit_enter_drag_down() {
        let mut p = Recorder::two_windows();
        let mut input = MouseInput::new();
        settle(&mut input, &mut p, at(100, 100, &[]));

        input.set_state(at(500, 100, &[MouseButton::Primary]), false, Modifiers::empty(), &mut p);
        assert_eq!(
            p.notes,
            vec![
                Note::Mouse(1, MouseAction::Exit, None, 100, 100),
                Note::Cursor(500, 100),
                Note::Mouse(2, MouseAction::Enter, None, 100, 100),
                Note::Mouse(2, MouseAction::Drag, None, 100, 100),
                Note::Mouse(2, MouseAction::Down, Some(MouseButton::Primary), 100, 100),
            ]
        );
    }

    #[test]
    fn clamped_drag_in_same_window() {
        let mut p = Recorder::single_window();
        let mut input = MouseInput::new();
        settle(&mut input, &mut p, at(5, 5, &[]));

        input.set_state(at(-3, 700, &[MouseButton::Primary]), false, Modifiers::empty(), &mut p);
        assert_eq!(
            p.notes,
            vec![
                Note::Cursor(0, 599),
                Note::Mouse(1, MouseAction::Drag, None, 0, 599),
                Note::Mouse(1, MouseAction::Down, Some(MouseButton::Primary), 0, 599),
            ]
        );
        let mut s = MouseState::new();
        input.state(&mut s);
        assert_eq!((s.x(), s.y()), (0, 599));
    }

    #[test]
    fn each_button_change_is_its_own_event() {
        let mut p = Recorder::single_window();
        let mut input = MouseInput::new();
        settle(&mut input, &mut p, at(10, 10, &[]));

        input.set_state(
            at(10, 10, &[MouseButton::Primary, MouseButton::Secondary]),
            false,
            Modifiers::empty(),
            &mut p,
        );
        input.set_state(at(10, 10, &[MouseButton::Secondary]), false, Modifiers::empty(), &mut p);

        let buttons: Vec<_> = p.mouse.iter().map(|e| (e.action, e.button)).collect();
        assert_eq!(
            buttons,
            vec![
                (MouseAction::Down, Some(MouseButton::Primary)),
                (MouseAction::Down, Some(MouseButton::Secondary)),
                (MouseAction::Up, Some(MouseButton::Primary)),
            ]
        );
        assert_eq!(
            p.mouse[0].modifiers,
            Modifiers::BUTTON_PRIMARY,
            "modifiers grow one button at a time"
        );
        assert_eq!(
            p.mouse[1].modifiers,
            Modifiers::BUTTON_PRIMARY | Modifiers::BUTTON_SECONDARY
        );
        assert!(p.mouse[1].popup_trigger);
        assert_eq!(p.mouse[2].modifiers, Modifiers::BUTTON_SECONDARY);

        let mut s = MouseState::new();
        input.state(&mut s);
        assert!(s.is_pressed(MouseButton::Secondary));
        assert!(!s.is_pressed(MouseButton::Primary));
    }

    #[test]
    fn leaving_every_window_emits_exit_only() {
        let mut p = Recorder::single_window();
        p.windows[0].3 = 100;
        let mut input = MouseInput::new();
        settle(&mut input, &mut p, at(10, 10, &[]));

        input.set_state(at(300, 10, &[MouseButton::Primary]), false, Modifiers::empty(), &mut p);
        assert_eq!(
            p.notes,
            vec![
                Note::Mouse(1, MouseAction::Exit, None, 10, 10),
                Note::Cursor(300, 10),
            ]
        );
    }

    #[test]
    fn drag_keeps_the_grabbing_window() {
        let mut p = Recorder::two_windows();
        let mut input = MouseInput::new();
        settle(&mut input, &mut p, at(100, 100, &[MouseButton::Primary]));

        input.set_state(at(500, 100, &[MouseButton::Primary]), false, Modifiers::empty(), &mut p);
        let windows: Vec<_> = p.notes.iter().filter_map(Note::window).collect();
        assert_eq!(windows, vec![1], "drag is delivered to the window it started in");
    }

    #[test]
    fn closed_cached_window_is_resolved_again() {
        let mut p = Recorder::two_windows();
        let mut input = MouseInput::new();
        settle(&mut input, &mut p, at(100, 100, &[]));
        p.close(1);

        input.set_state(at(100, 100, &[]), false, Modifiers::empty(), &mut p);
        assert!(p.notes.is_empty(), "no exit is sent to a closed window");
    }

    #[test]
    fn wheel_is_transient_and_carries_key_modifiers() {
        let mut p = Recorder::single_window();
        let mut input = MouseInput::with_wheel_delta(3.0);
        settle(&mut input, &mut p, at(10, 10, &[]));

        let mut s = at(10, 10, &[]);
        s.set_wheel(Wheel::Down);
        input.set_state(s, false, Modifiers::CONTROL | Modifiers::BUTTON_MIDDLE, &mut p);
        assert_eq!(p.mouse.len(), 1);
        assert_eq!(p.mouse[0].action, MouseAction::Wheel);
        assert_eq!(p.mouse[0].wheel_delta, -3.0);
        assert_eq!(p.mouse[0].modifiers, Modifiers::CONTROL);

        let mut now = MouseState::new();
        input.state(&mut now);
        assert_eq!(now.wheel(), Wheel::None);
    }
}
