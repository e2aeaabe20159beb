// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracker configuration.

use crate::pipeline::DEFAULT_TOUCH_RADIUS;

/// Settings for an [`InputTracker`](crate::tracker::InputTracker).
///
/// ```
/// use understory_event_state::config::InputConfig;
///
/// let config = InputConfig::new()
///     .with_touch_radius(8)
///     .with_mouse_emulation(false);
/// assert_eq!(config.touch_radius, 8);
/// assert!(config.assign_touch_ids);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InputConfig {
    /// Jitter radius in pixels below which touch points are held still.
    /// Zero disables the filter.
    pub touch_radius: u32,
    /// Assign touch IDs by nearest match, for drivers that do not report them.
    pub assign_touch_ids: bool,
    /// Fold pushed touch frames that differ only in position.
    pub touch_lookahead: bool,
    /// Drive the mouse from the primary touch point.
    pub emulate_mouse_from_touch: bool,
    /// Scroll amount per wheel notch.
    pub wheel_delta: f64,
}

impl InputConfig {
    /// Defaults: 20 pixel jitter radius, ID assignment, lookahead and mouse
    /// emulation on, one scroll unit per notch.
    pub const fn new() -> Self {
        Self {
            touch_radius: DEFAULT_TOUCH_RADIUS,
            assign_touch_ids: true,
            touch_lookahead: true,
            emulate_mouse_from_touch: true,
            wheel_delta: 1.0,
        }
    }

    /// Set the jitter radius.
    pub const fn with_touch_radius(mut self, radius: u32) -> Self {
        self.touch_radius = radius;
        self
    }

    /// Turn touch ID assignment on or off.
    pub const fn with_touch_ids(mut self, assign: bool) -> Self {
        self.assign_touch_ids = assign;
        self
    }

    /// Turn touch lookahead on or off.
    pub const fn with_touch_lookahead(mut self, lookahead: bool) -> Self {
        self.touch_lookahead = lookahead;
        self
    }

    /// Turn mouse emulation from touch on or off.
    pub const fn with_mouse_emulation(mut self, emulate: bool) -> Self {
        self.emulate_mouse_from_touch = emulate;
        self
    }

    /// Set the scroll amount per wheel notch.
    pub const fn with_wheel_delta(mut self, delta: f64) -> Self {
        self.wheel_delta = delta;
        self
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self::new()
    }
}
