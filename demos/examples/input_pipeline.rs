// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Raw device states in, routed UI events out.
//!
//! This example wires `understory_event_state` to `understory_responder`:
//! - an `InputTracker` turns raw key, mouse, and touch states into events,
//! - a small `Platform` resolves windows and hit tests one button,
//! - a `Router` carries each event through the managers of the hit path.
//!
//! Run:
//! - `cargo run -p understory_demos --example input_pipeline`
//! - `RUST_LOG=trace cargo run -p understory_demos --example input_pipeline`

use std::sync::Arc;

use hashbrown::HashMap;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use understory_event_state::key::{KeyAction, KeyCode, KeyEvent, KeyState};
use understory_event_state::modifiers::Modifiers;
use understory_event_state::mouse::{MouseAction, MouseButton, MouseEvent, MouseState};
use understory_event_state::platform::Platform;
use understory_event_state::touch::TouchPoint;
use understory_event_state::touch_input::TouchEvent;
use understory_event_state::tracker::InputTracker;
use understory_responder::chain::EventDispatcher;
use understory_responder::error::DispatchError;
use understory_responder::event::{ANY, Event, EventType};
use understory_responder::handler::{HandlerPriority, handler};
use understory_responder::manager::EventHandlerManager;
use understory_responder::router::Router;

/// Payload carried through the responder chain.
#[derive(Clone, Copy, Debug)]
enum Input {
    Mouse(MouseEvent),
    Touch(TouchEvent),
    Key(KeyEvent),
}

static INPUT: EventType = EventType::new("INPUT", &ANY);
static MOUSE: EventType = EventType::new("MOUSE", &INPUT);
static TOUCH: EventType = EventType::new("TOUCH", &INPUT);
static KEY: EventType = EventType::new("KEY", &INPUT);

const MAIN: u32 = 1;
const POPUP: u32 = 2;
const BUTTON: u32 = 11;

const ENTER: KeyCode = KeyCode(0x0D);
const LETTER_S: KeyCode = KeyCode(0x53);

type Dispatchers = HashMap<u32, Arc<dyn EventDispatcher<u32, Input>>>;

/// A 640×480 screen with a main window and a popup in its top-right corner.
struct Desktop {
    router: Router<u32, Dispatchers, HashMap<u32, u32>>,
    focus: u32,
}

impl Desktop {
    fn fire(&self, target: u32, event_type: &'static EventType, input: Input) {
        if let Some(left) = self.router.fire_event(target, Event::new(event_type, input)) {
            debug!(node = target, event = ?left.payload(), "not handled");
        }
    }

    /// Node under a window-relative point.
    fn hit(window: u32, x: i32, y: i32) -> u32 {
        if window == MAIN && (100..200).contains(&x) && (100..150).contains(&y) {
            BUTTON
        } else {
            window
        }
    }
}

impl Platform for Desktop {
    type Window = u32;

    fn screen_size(&self) -> (i32, i32) {
        (640, 480)
    }

    fn window_at(&self, x: i32, y: i32) -> Option<u32> {
        if x >= 400 && y < 200 {
            Some(POPUP)
        } else {
            Some(MAIN)
        }
    }

    fn focused_window(&self) -> Option<u32> {
        Some(MAIN)
    }

    fn window_origin(&self, window: u32) -> (i32, i32) {
        if window == POPUP { (400, 0) } else { (0, 0) }
    }

    fn set_cursor_position(&mut self, x: i32, y: i32) {
        debug!(x, y, "cursor");
    }

    fn notify_mouse(&mut self, window: u32, event: &MouseEvent) {
        self.fire(Self::hit(window, event.x, event.y), &MOUSE, Input::Mouse(*event));
    }

    fn notify_begin_touch(&mut self, window: u32, modifiers: Modifiers, count: usize) {
        debug!(window, count, ?modifiers, "touch batch");
    }

    fn notify_next_touch(&mut self, window: u32, event: &TouchEvent) {
        self.fire(Self::hit(window, event.x, event.y), &TOUCH, Input::Touch(*event));
    }

    fn notify_end_touch(&mut self, window: u32) {
        debug!(window, "touch batch done");
    }

    fn notify_key(&mut self, _window: u32, event: &KeyEvent) {
        self.fire(self.focus, &KEY, Input::Key(*event));
    }
}

fn build_scene() -> Result<Desktop, DispatchError> {
    let window = EventHandlerManager::<u32, Input>::new(MAIN);
    let button = EventHandlerManager::<u32, Input>::new(BUTTON);
    let popup = EventHandlerManager::<u32, Input>::new(POPUP);

    window.add_event_filter(
        &INPUT,
        handler(|e: &mut Event<u32, Input>| debug!(ty = e.event_type().name(), "main window saw")),
        HandlerPriority::Preferred,
    )?;
    // Shortcuts run only if nothing closer to the focus handled the key.
    window.add_event_handler(
        &KEY,
        handler(|e: &mut Event<u32, Input>| {
            if let Input::Key(k) = *e.payload()
                && k.action == KeyAction::Press
                && k.code == LETTER_S
                && k.modifiers.contains(Modifiers::CONTROL)
            {
                info!("main window: save shortcut");
                e.consume();
            }
        }),
        HandlerPriority::Default,
    )?;

    button.add_event_handler(
        &MOUSE,
        handler(|e: &mut Event<u32, Input>| {
            if let Input::Mouse(m) = *e.payload()
                && m.action == MouseAction::Down
            {
                info!(synthesized = m.synthesized, "button pressed");
                e.consume();
            }
        }),
        HandlerPriority::Preferred,
    )?;
    button.add_event_handler(
        &KEY,
        handler(|e: &mut Event<u32, Input>| {
            if let Input::Key(k) = *e.payload()
                && k.action == KeyAction::Press
                && k.code == ENTER
            {
                info!("button activated from keyboard");
                e.consume();
            }
        }),
        HandlerPriority::Preferred,
    )?;

    popup.add_event_handler(
        &TOUCH,
        handler(|e: &mut Event<u32, Input>| {
            if let Input::Touch(t) = *e.payload() {
                info!(action = ?t.action, id = t.id, x = t.x, y = t.y, "popup touch");
            }
        }),
        HandlerPriority::Preferred,
    )?;

    let mut dispatchers: Dispatchers = HashMap::new();
    dispatchers.insert(MAIN, Arc::new(window));
    dispatchers.insert(BUTTON, Arc::new(button));
    dispatchers.insert(POPUP, Arc::new(popup));
    let parents: HashMap<u32, u32> = [(BUTTON, MAIN)].into_iter().collect();

    Ok(Desktop {
        router: Router::with_parent(dispatchers, parents),
        focus: BUTTON,
    })
}

fn main() -> Result<(), DispatchError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut desktop = build_scene()?;
    let mut tracker = InputTracker::<u32>::new();

    // Click the button.
    let mut mouse = MouseState::new();
    tracker.mouse_state(&mut mouse);
    mouse.set_position(150, 120);
    tracker.set_mouse_state(mouse.clone(), &mut desktop);
    mouse.press_button(MouseButton::Primary);
    tracker.set_mouse_state(mouse.clone(), &mut desktop);
    mouse.release_button(MouseButton::Primary);
    tracker.set_mouse_state(mouse, &mut desktop);

    // Enter activates the focused button; Ctrl+S bubbles to the window.
    let mut keys = KeyState::new();
    keys.press_key(ENTER);
    tracker.set_key_state(&keys, &mut desktop);
    keys.clear();
    keys.press_key(KeyCode::CONTROL);
    keys.press_key(LETTER_S);
    tracker.set_key_state(&keys, &mut desktop);
    keys.clear();
    tracker.set_key_state(&keys, &mut desktop);

    // A finger drags across the popup. Small wiggles are held still and
    // moves between pushes are folded until the flush.
    tracker
        .touch_state_mut()
        .add_point(TouchPoint::new(0, 450, 50));
    tracker.push_touch_state(&mut desktop);
    tracker.flush_touch_state(&mut desktop);
    for x in [455, 480, 520] {
        tracker.touch_state_mut().point_zero_mut().x = x;
        tracker.push_touch_state(&mut desktop);
    }
    tracker.flush_touch_state(&mut desktop);
    tracker.touch_state_mut().clear();
    tracker.push_touch_state(&mut desktop);
    tracker.flush_touch_state(&mut desktop);

    Ok(())
}
