// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mouse emulation from touch input.

use crate::modifiers::Modifiers;
use crate::mouse::{MouseButton, MouseInput, MouseState};
use crate::platform::Platform;
use crate::touch::TouchState;

/// Drives a [`MouseInput`] from the primary point of touch frames.
///
/// While a point is down the pointer follows the primary point with the
/// primary button held. When the last point lifts the button is released
/// where the pointer was. Every emitted mouse event is marked as synthesized.
#[derive(Clone, Debug)]
pub struct MouseInputSynthesizer<W> {
    scratch: MouseState<W>,
}

impl<W: Copy + Eq> MouseInputSynthesizer<W> {
    /// Create a synthesizer.
    pub fn new() -> Self {
        Self {
            scratch: MouseState::new(),
        }
    }

    /// Feed one committed touch frame.
    pub fn set_state<P: Platform<Window = W>>(
        &mut self,
        touch: &TouchState<W>,
        mouse: &mut MouseInput<W>,
        key_modifiers: Modifiers,
        platform: &mut P,
    ) {
        mouse.state(&mut self.scratch);
        match touch.primary_point() {
            Some(p) => {
                self.scratch.set_position(p.x, p.y);
                self.scratch.press_button(MouseButton::Primary);
            }
            None => self.scratch.release_button(MouseButton::Primary),
        }
        mouse.set_state(self.scratch.clone(), true, key_modifiers, platform);
    }
}

impl<W: Copy + Eq> Default for MouseInputSynthesizer<W> {
    fn default() -> Self {
        Self::new()
    }
}
