// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Keyboard state and key event synthesis.
//!
//! A driver reports the full set of held keys; [`KeyInput::set_state`] turns
//! the difference to the previous set into release and press events for the
//! focused window.

use crate::modifiers::Modifiers;
use crate::platform::Platform;
use crate::set::SmallSet;

/// Platform key code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KeyCode(pub u16);

impl KeyCode {
    /// Shift.
    pub const SHIFT: Self = Self(0x10);
    /// Control.
    pub const CONTROL: Self = Self(0x11);
    /// Alt.
    pub const ALT: Self = Self(0x12);
    /// Meta, command, or windows key.
    pub const META: Self = Self(0x9D);

    /// Modifier this key contributes while held.
    pub fn modifier(self) -> Modifiers {
        match self {
            Self::SHIFT => Modifiers::SHIFT,
            Self::CONTROL => Modifiers::CONTROL,
            Self::ALT => Modifiers::ALT,
            Self::META => Modifiers::META,
            _ => Modifiers::empty(),
        }
    }
}

/// Held keys.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyState {
    keys: SmallSet<KeyCode>,
    modifiers: Modifiers,
}

impl KeyState {
    /// No keys held.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `key` as held.
    pub fn press_key(&mut self, key: KeyCode) {
        self.keys.insert(key);
        self.modifiers |= key.modifier();
    }

    /// Mark `key` as released.
    pub fn release_key(&mut self, key: KeyCode) {
        self.keys.remove(key);
        self.modifiers.remove(key.modifier());
    }

    /// Release everything, e.g. on focus loss.
    pub fn clear(&mut self) {
        self.keys.clear();
        self.modifiers = Modifiers::empty();
    }

    /// Whether `key` is held.
    pub fn is_pressed(&self, key: KeyCode) -> bool {
        self.keys.contains(key)
    }

    /// Held keys in ascending code order.
    pub fn keys(&self) -> &SmallSet<KeyCode> {
        &self.keys
    }

    /// Keyboard modifiers implied by the held keys.
    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    /// Overwrite `dest` with this state.
    pub fn copy_to(&self, dest: &mut Self) {
        self.keys.copy_to(&mut dest.keys);
        dest.modifiers = self.modifiers;
    }
}

/// Kind of key event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyAction {
    /// The key went down.
    Press,
    /// The key went up.
    Release,
}

/// Synthesized key event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    /// Press or release.
    pub action: KeyAction,
    /// Key that changed.
    pub code: KeyCode,
    /// Modifiers after the change.
    pub modifiers: Modifiers,
}

/// Current keyboard state and its event synthesis.
#[derive(Clone, Debug, Default)]
pub struct KeyInput {
    state: KeyState,
    scratch: SmallSet<KeyCode>,
}

impl KeyInput {
    /// Create with no keys held.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy the current state into `target`.
    pub fn state(&self, target: &mut KeyState) {
        self.state.copy_to(target);
    }

    /// Modifiers of the current state.
    pub fn modifiers(&self) -> Modifiers {
        self.state.modifiers
    }

    /// Move to `new_state`, emitting a release per released key, then a press
    /// per newly held key, each in ascending code order.
    ///
    /// Every event carries the modifiers of the keys held at that point. With
    /// no focused window the state is adopted silently.
    pub fn set_state<P: Platform>(&mut self, new_state: &KeyState, platform: &mut P) {
        let window = platform.focused_window();

        self.state.keys.difference_into(&mut self.scratch, &new_state.keys);
        for code in self.scratch.iter() {
            self.state.release_key(code);
            emit(platform, window, KeyAction::Release, code, self.state.modifiers);
        }

        new_state.keys.difference_into(&mut self.scratch, &self.state.keys);
        for code in self.scratch.iter() {
            self.state.press_key(code);
            emit(platform, window, KeyAction::Press, code, self.state.modifiers);
        }

        new_state.copy_to(&mut self.state);
    }
}

fn emit<P: Platform>(
    platform: &mut P,
    window: Option<P::Window>,
    action: KeyAction,
    code: KeyCode,
    modifiers: Modifiers,
) {
    let Some(window) = window else {
        return;
    };
    tracing::trace!(?action, code = code.0, ?window, "key event");
    platform.notify_key(
        window,
        &KeyEvent {
            action,
            code,
            modifiers,
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Note, Recorder};
    use alloc::vec;

    const A: KeyCode = KeyCode(0x41);
    const B: KeyCode = KeyCode(0x42);

    fn keys(codes: &[KeyCode]) -> KeyState {
        let mut s = KeyState::new();
        for &c in codes {
            s.press_key(c);
        }
        s
    }

    #[test]
    fn releases_come_before_presses() {
        let mut p = Recorder::single_window();
        p.focused = Some(1);
        let mut input = KeyInput::new();
        input.set_state(&keys(&[A]), &mut p);
        p.notes.clear();

        input.set_state(&keys(&[KeyCode::SHIFT, B]), &mut p);
        assert_eq!(
            p.notes,
            vec![
                Note::Key(1, KeyAction::Release, A, Modifiers::empty()),
                Note::Key(1, KeyAction::Press, KeyCode::SHIFT, Modifiers::SHIFT),
                Note::Key(1, KeyAction::Press, B, Modifiers::SHIFT),
            ]
        );
    }

    #[test]
    fn unfocused_changes_are_adopted_silently() {
        let mut p = Recorder::single_window();
        let mut input = KeyInput::new();
        input.set_state(&keys(&[KeyCode::CONTROL]), &mut p);
        assert!(p.notes.is_empty());
        assert_eq!(input.modifiers(), Modifiers::CONTROL);

        let mut copy = KeyState::new();
        input.state(&mut copy);
        assert!(copy.is_pressed(KeyCode::CONTROL));
        copy.clear();
        assert_eq!(input.modifiers(), Modifiers::CONTROL, "readers get copies");
    }
}
