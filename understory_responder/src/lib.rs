// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_responder --heading-base-level=0

//! Understory Responder: an event dispatch chain for UI input.
//!
//! ## Overview
//!
//! An event travels along an [`EventDispatchChain`](chain::EventDispatchChain),
//! a root→target list of [`EventDispatcher`](chain::EventDispatcher)s. Each
//! dispatcher captures the event on the way down and bubbles it on the way
//! up. Consuming the event stops both.
//!
//! ## Handlers
//!
//! [`EventHandlerManager`](manager::EventHandlerManager) is the dispatcher
//! most objects use. It keeps filters (capture phase) and handlers (bubble
//! phase) per [`EventType`](event::EventType); a handler registered for a
//! super type sees every subtype. Registrations carry a
//! [`HandlerPriority`](handler::HandlerPriority):
//!
//! - `Preferred` handlers run in registration order during the regular pass.
//! - `Default` handlers are deferred until the whole chain is done, and run
//!   only if nothing consumed the event and no one prevented defaults.
//!
//! Handlers can be held weakly through
//! [`WeakEventHandler`](handler::WeakEventHandler); dropping the owning
//! [`EventHandler`](handler::EventHandler) unregisters them.
//!
//! ## Routing
//!
//! [`Router`](router::Router) builds the chain for a target from a
//! [`ParentLookup`](router::ParentLookup) and a
//! [`DispatcherLookup`](router::DispatcherLookup), then fires the event.
//! [`EventRedirector`](redirector::EventRedirector) forwards captured events
//! to other dispatchers, for example from a window to its popups.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use hashbrown::HashMap;
//! use understory_responder::chain::EventDispatcher;
//! use understory_responder::event::{ANY, Event, EventType};
//! use understory_responder::handler::{HandlerPriority, handler};
//! use understory_responder::manager::EventHandlerManager;
//! use understory_responder::router::Router;
//!
//! static KEY_PRESSED: EventType = EventType::new("KEY_PRESSED", &ANY);
//!
//! let window = EventHandlerManager::<u32, char>::new(1);
//! let field = EventHandlerManager::<u32, char>::new(2);
//!
//! // The window inserts text unless something else handles the key first.
//! window
//!     .add_event_handler(
//!         &KEY_PRESSED,
//!         handler(|e: &mut Event<u32, char>| {
//!             if e.payload().is_alphanumeric() {
//!                 e.consume();
//!             }
//!         }),
//!         HandlerPriority::Default,
//!     )
//!     .unwrap();
//! // The field swallows tabs.
//! field
//!     .add_event_filter(
//!         &KEY_PRESSED,
//!         handler(|e: &mut Event<u32, char>| {
//!             if *e.payload() == '\t' {
//!                 e.consume();
//!             }
//!         }),
//!         HandlerPriority::Preferred,
//!     )
//!     .unwrap();
//!
//! let mut dispatchers: HashMap<u32, Arc<dyn EventDispatcher<u32, char>>> = HashMap::new();
//! dispatchers.insert(1, Arc::new(window));
//! dispatchers.insert(2, Arc::new(field));
//! let parents: HashMap<u32, u32> = [(2, 1)].into_iter().collect();
//! let router = Router::with_parent(dispatchers, parents);
//!
//! assert!(router.fire_event(2, Event::new(&KEY_PRESSED, '\t')).is_none());
//! assert!(router.fire_event(2, Event::new(&KEY_PRESSED, 'a')).is_none());
//! assert!(router.fire_event(2, Event::new(&KEY_PRESSED, '!')).is_some());
//! ```

extern crate alloc;

pub mod chain;
pub mod composite;
pub mod context;
pub mod error;
pub mod event;
pub mod handler;
pub mod manager;
pub mod redirector;
pub mod router;

pub use chain::{EventDispatchChain, EventDispatcher};
pub use composite::CompositeEventHandler;
pub use context::EventDispatchContext;
pub use error::DispatchError;
pub use event::{Event, EventType};
pub use handler::{EventHandler, HandlerPriority, WeakEventHandler};
pub use manager::EventHandlerManager;
pub use redirector::EventRedirector;
pub use router::Router;
