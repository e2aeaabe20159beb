// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! One owner for every input device.
//!
//! [`InputTracker`] holds the keyboard, mouse, and touch state of one input
//! thread. Drivers propose new states through it; the tracker keeps key
//! modifiers flowing into pointer events, runs touch frames through the
//! filter pipeline and lookahead, and emulates the mouse from touch when
//! configured to. Readers get copies of the current states.

use alloc::boxed::Box;

use crate::config::InputConfig;
use crate::key::{KeyInput, KeyState};
use crate::lookahead::TouchLookahead;
use crate::modifiers::Modifiers;
use crate::mouse::{MouseInput, MouseState};
use crate::pipeline::{AssignIdsFilter, SmallMoveFilter, TouchFilter, TouchPipeline};
use crate::platform::Platform;
use crate::synth::MouseInputSynthesizer;
use crate::touch::TouchState;
use crate::touch_input::TouchInput;

/// Keyboard, mouse, and touch state of one input thread.
#[derive(Debug)]
pub struct InputTracker<W> {
    config: InputConfig,
    devices: Devices<W>,
    pipeline: TouchPipeline<W>,
    lookahead: TouchLookahead<W>,
}

#[derive(Debug)]
struct Devices<W> {
    keys: KeyInput,
    mouse: MouseInput<W>,
    touch: TouchInput<W>,
    synth: Option<MouseInputSynthesizer<W>>,
}

impl<W: Copy + Eq + 'static> Devices<W> {
    fn commit_touch<P: Platform<Window = W>>(&mut self, state: &TouchState<W>, platform: &mut P) {
        let modifiers = self.keys.modifiers();
        self.touch.set_state(state, modifiers, platform);
        if let Some(synth) = &mut self.synth {
            synth.set_state(self.touch.current(), &mut self.mouse, modifiers, platform);
        }
    }
}

impl<W: Copy + Eq + 'static> InputTracker<W> {
    /// Tracker with the default [`InputConfig`].
    pub fn new() -> Self {
        Self::with_config(InputConfig::new())
    }

    /// Tracker with `config`. The touch pipeline gets the filters the config
    /// asks for.
    pub fn with_config(config: InputConfig) -> Self {
        let mut pipeline = TouchPipeline::new();
        if config.assign_touch_ids {
            pipeline.add_filter(Box::new(AssignIdsFilter::new()));
        }
        if config.touch_radius > 0 {
            pipeline.add_filter(Box::new(SmallMoveFilter::with_radius(config.touch_radius)));
        }
        Self {
            config,
            devices: Devices {
                keys: KeyInput::new(),
                mouse: MouseInput::with_wheel_delta(config.wheel_delta),
                touch: TouchInput::new(),
                synth: config
                    .emulate_mouse_from_touch
                    .then(MouseInputSynthesizer::new),
            },
            pipeline,
            lookahead: TouchLookahead::new(),
        }
    }

    /// Configuration in use.
    pub fn config(&self) -> &InputConfig {
        &self.config
    }

    /// Install an extra touch filter.
    pub fn add_touch_filter(&mut self, filter: Box<dyn TouchFilter<W>>) {
        self.pipeline.add_filter(filter);
    }

    /// Keyboard modifiers currently held.
    pub fn modifiers(&self) -> Modifiers {
        self.devices.keys.modifiers()
    }

    /// Propose a new keyboard state.
    pub fn set_key_state<P: Platform<Window = W>>(&mut self, state: &KeyState, platform: &mut P) {
        self.devices.keys.set_state(state, platform);
    }

    /// Copy the keyboard state into `target`.
    pub fn key_state(&self, target: &mut KeyState) {
        self.devices.keys.state(target);
    }

    /// Propose a new mouse state.
    pub fn set_mouse_state<P: Platform<Window = W>>(&mut self, state: MouseState<W>, platform: &mut P) {
        let modifiers = self.devices.keys.modifiers();
        self.devices.mouse.set_state(state, false, modifiers, platform);
    }

    /// Copy the mouse state into `target`.
    pub fn mouse_state(&self, target: &mut MouseState<W>) {
        self.devices.mouse.state(target);
    }

    /// Propose a complete touch frame, bypassing the lookahead.
    ///
    /// A frame still held by the lookahead is committed first.
    pub fn set_touch_state<P: Platform<Window = W>>(&mut self, state: &TouchState<W>, platform: &mut P) {
        self.flush_touch_state(platform);
        let mut state = state.clone();
        if !self.pipeline.filter(&mut state) {
            self.devices.commit_touch(&state, platform);
        }
    }

    /// Frame to fill before [`push_touch_state`](Self::push_touch_state).
    pub fn touch_state_mut(&mut self) -> &mut TouchState<W> {
        self.lookahead.state_mut()
    }

    /// Submit the frame filled through [`touch_state_mut`](Self::touch_state_mut).
    ///
    /// With lookahead on, the frame may be held until the next push or
    /// [`flush_touch_state`](Self::flush_touch_state).
    pub fn push_touch_state<P: Platform<Window = W>>(&mut self, platform: &mut P) {
        if self.config.touch_lookahead {
            let devices = &mut self.devices;
            self.lookahead
                .push_state(&mut self.pipeline, |s| devices.commit_touch(s, platform));
        } else {
            let state = self.lookahead.state_mut();
            if !self.pipeline.filter(state) {
                self.devices.commit_touch(state, platform);
            }
        }
    }

    /// Commit any touch frame held back.
    pub fn flush_touch_state<P: Platform<Window = W>>(&mut self, platform: &mut P) {
        let devices = &mut self.devices;
        self.lookahead
            .flush_state(&mut self.pipeline, |s| devices.commit_touch(s, platform));
    }

    /// Copy the committed touch frame into `target`.
    pub fn touch_state(&self, target: &mut TouchState<W>) {
        self.devices.touch.state(target);
    }
}

impl<W: Copy + Eq + 'static> Default for InputTracker<W> {
    fn default() -> Self {
        Self::new()
    }
}
