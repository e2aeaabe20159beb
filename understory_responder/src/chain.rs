// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Event dispatchers and the chain that strings them together.
//!
//! A chain lists dispatchers root first. [`EventDispatchChain::dispatch_event`]
//! hands the event to the next dispatcher together with the rest of the chain
//! as its tail. The provided [`EventDispatcher::dispatch_event`] is the basic
//! capture → tail → bubble step, so a chain of basic dispatchers yields the
//! familiar sequence: capture root→target, then bubble target→root.
//!
//! ```
//! use std::sync::Arc;
//! use understory_responder::chain::{EventDispatchChain, EventDispatcher};
//! use understory_responder::context::EventDispatchContext;
//! use understory_responder::event::{ANY, Event, EventType};
//! use understory_responder::handler::{HandlerPriority, handler};
//! use understory_responder::manager::EventHandlerManager;
//!
//! static CLICK: EventType = EventType::new("CLICK", &ANY);
//!
//! let root = Arc::new(EventHandlerManager::<u32, ()>::new(1));
//! let leaf = Arc::new(EventHandlerManager::<u32, ()>::new(2));
//! leaf.add_event_handler(&CLICK, handler(|e| e.consume()), HandlerPriority::Preferred)
//!     .unwrap();
//!
//! let mut chain = EventDispatchChain::<u32, ()>::new();
//! chain.append(root).append(leaf);
//!
//! let result = EventDispatchContext::dispatch_event(&mut chain, Event::new(&CLICK, ()));
//! assert!(result.is_none(), "the leaf consumed the click");
//! ```

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use crate::context::EventDispatchContext;
use crate::event::Event;

/// One step of a dispatch chain.
///
/// Implementations override the capturing and bubbling hooks and keep the
/// provided [`dispatch_event`](Self::dispatch_event), or take over the whole
/// step. Hooks return `None` once the event is consumed.
pub trait EventDispatcher<K, P>: Send + Sync {
    /// Dispatch `event` here and through `tail`.
    fn dispatch_event(
        &self,
        event: Event<K, P>,
        tail: &mut EventDispatchChain<K, P>,
    ) -> Option<Event<K, P>> {
        let event = self
            .dispatch_capturing_event(event, tail.context_mut())
            .filter(|e| !e.is_consumed())?;
        let event = tail.dispatch_event(event)?;
        self.dispatch_bubbling_event(event, tail.context_mut())
            .filter(|e| !e.is_consumed())
    }

    /// Capturing hook; passes the event through by default.
    fn dispatch_capturing_event(
        &self,
        event: Event<K, P>,
        _ctx: &mut EventDispatchContext<K, P>,
    ) -> Option<Event<K, P>> {
        Some(event)
    }

    /// Bubbling hook; passes the event through by default.
    fn dispatch_bubbling_event(
        &self,
        event: Event<K, P>,
        _ctx: &mut EventDispatchContext<K, P>,
    ) -> Option<Event<K, P>> {
        Some(event)
    }
}

/// Ordered list of dispatchers, root first, with a cursor marking the tail.
pub struct EventDispatchChain<K, P> {
    dispatchers: Vec<Arc<dyn EventDispatcher<K, P>>>,
    cursor: usize,
    pub(crate) context: EventDispatchContext<K, P>,
}

impl<K, P> EventDispatchChain<K, P> {
    /// Create an empty chain.
    pub fn new() -> Self {
        Self {
            dispatchers: Vec::new(),
            cursor: 0,
            context: EventDispatchContext::new(),
        }
    }

    /// Add a dispatcher at the target end.
    pub fn append(&mut self, dispatcher: Arc<dyn EventDispatcher<K, P>>) -> &mut Self {
        self.dispatchers.push(dispatcher);
        self
    }

    /// Add a dispatcher at the root end.
    pub fn prepend(&mut self, dispatcher: Arc<dyn EventDispatcher<K, P>>) -> &mut Self {
        self.dispatchers.insert(0, dispatcher);
        self
    }

    /// Number of dispatchers.
    pub fn len(&self) -> usize {
        self.dispatchers.len()
    }

    /// Returns `true` if there are no dispatchers.
    pub fn is_empty(&self) -> bool {
        self.dispatchers.is_empty()
    }

    /// Rewind to the first dispatcher so the chain can be reused.
    ///
    /// Default handlers left on the chain's context are dropped.
    pub fn reset(&mut self) {
        self.cursor = 0;
        self.context = EventDispatchContext::new();
    }

    /// Remove every dispatcher and rewind.
    pub fn clear(&mut self) {
        self.dispatchers.clear();
        self.reset();
    }

    /// Innermost dispatch context.
    pub fn context_mut(&mut self) -> &mut EventDispatchContext<K, P> {
        &mut self.context
    }

    /// Dispatch to the next dispatcher with the remainder of the chain as tail.
    ///
    /// Once the chain is exhausted the event is returned unchanged.
    ///
    /// Default handlers registered on the way are left on the chain's context
    /// and never run; use [`EventDispatchContext::dispatch_event`] to run them.
    pub fn dispatch_event(&mut self, event: Event<K, P>) -> Option<Event<K, P>> {
        let Some(dispatcher) = self.dispatchers.get(self.cursor).cloned() else {
            return Some(event);
        };
        self.cursor += 1;
        let result = dispatcher.dispatch_event(event, self);
        self.cursor -= 1;
        result
    }
}

impl<K, P> Default for EventDispatchChain<K, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, P> fmt::Debug for EventDispatchChain<K, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDispatchChain")
            .field("len", &self.dispatchers.len())
            .field("cursor", &self.cursor)
            .field("context", &self.context)
            .finish()
    }
}
