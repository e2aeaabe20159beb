// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Modifier masks attached to synthesized events.

bitflags::bitflags! {
    /// Keyboard modifiers and held mouse buttons at the time of an event.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Modifiers: u16 {
        /// A shift key is held.
        const SHIFT = 1 << 0;
        /// A control key is held.
        const CONTROL = 1 << 1;
        /// An alt key is held.
        const ALT = 1 << 2;
        /// A meta (command, windows) key is held.
        const META = 1 << 3;
        /// The primary mouse button is held.
        const BUTTON_PRIMARY = 1 << 4;
        /// The secondary mouse button is held.
        const BUTTON_SECONDARY = 1 << 5;
        /// The middle mouse button is held.
        const BUTTON_MIDDLE = 1 << 6;
        /// The back mouse button is held.
        const BUTTON_BACK = 1 << 7;
        /// The forward mouse button is held.
        const BUTTON_FORWARD = 1 << 8;
    }
}

impl Modifiers {
    /// Keyboard part of the mask.
    pub const KEYS: Self = Self::SHIFT
        .union(Self::CONTROL)
        .union(Self::ALT)
        .union(Self::META);

    /// Mouse button part of the mask.
    pub const BUTTONS: Self = Self::KEYS.complement();
}
