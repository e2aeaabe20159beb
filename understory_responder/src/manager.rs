// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-object filter and handler registry.
//!
//! ## Overview
//!
//! An [`EventHandlerManager`] belongs to one event source (a node, a window)
//! and keeps one [`CompositeEventHandler`] per event type. As an
//! [`EventDispatcher`] it runs filters on the way down and handlers on the way
//! up, for the event's concrete type first and then for each super type up to
//! the root.
//!
//! ## Source
//!
//! Before any filter or handler runs, the event is re-attributed to the
//! manager's source, so handlers always see their own object as the source.
//!
//! ## Concurrent modification
//!
//! Dispatch works on a snapshot of the composite taken under the lock. A
//! handler may register or unregister on the same manager while it runs; the
//! change applies from the next event on. A handler removed mid-dispatch
//! still runs for the event in flight. Other threads may do the same.
//!
//! ## Default priority
//!
//! Registrations with [`HandlerPriority::Default`] do not run during the
//! regular pass. The manager hands a deferred pass to the dispatch context,
//! which runs it once the whole chain is done, if nothing consumed the event.

use core::fmt;

use hashbrown::HashMap;
use parking_lot::Mutex;

use crate::chain::EventDispatcher;
use crate::composite::CompositeEventHandler;
use crate::context::EventDispatchContext;
use crate::error::DispatchError;
use crate::event::{Event, EventType};
use crate::handler::{EventHandler, Handler, HandlerIdentity, HandlerPriority};

type Composites<K, P> = HashMap<&'static EventType, CompositeEventHandler<K, P>>;

/// Filters and handlers of one event source, keyed by event type.
pub struct EventHandlerManager<K, P> {
    source: K,
    composites: Mutex<Composites<K, P>>,
}

impl<K: Copy + Eq, P> EventHandlerManager<K, P> {
    /// Create an empty manager for `source`.
    pub fn new(source: K) -> Self {
        Self {
            source,
            composites: Mutex::new(HashMap::new()),
        }
    }

    /// Object events are attributed to while passing this manager.
    pub fn source(&self) -> K {
        self.source
    }

    /// Register a bubbling handler for `event_type`.
    ///
    /// Registering the same handler twice is a no-op. Fails if `handler` is a
    /// weak handler whose owner is already gone.
    pub fn add_event_handler(
        &self,
        event_type: &'static EventType,
        handler: impl Into<Handler<K, P>>,
        priority: HandlerPriority,
    ) -> Result<(), DispatchError> {
        let handler = live(event_type, handler.into())?;
        self.composites
            .lock()
            .entry(event_type)
            .or_default()
            .add_event_handler(handler, priority);
        Ok(())
    }

    /// Unregister a bubbling handler; no-op if it was never registered.
    pub fn remove_event_handler(&self, event_type: &'static EventType, handler: &impl HandlerIdentity) {
        if let Some(composite) = self.composites.lock().get_mut(event_type) {
            composite.remove_event_handler(handler);
        }
    }

    /// Register a capturing filter for `event_type`.
    ///
    /// Registering the same filter twice is a no-op. Fails if `filter` is a
    /// weak handler whose owner is already gone.
    pub fn add_event_filter(
        &self,
        event_type: &'static EventType,
        filter: impl Into<Handler<K, P>>,
        priority: HandlerPriority,
    ) -> Result<(), DispatchError> {
        let filter = live(event_type, filter.into())?;
        self.composites
            .lock()
            .entry(event_type)
            .or_default()
            .add_event_filter(filter, priority);
        Ok(())
    }

    /// Unregister a capturing filter; no-op if it was never registered.
    pub fn remove_event_filter(&self, event_type: &'static EventType, filter: &impl HandlerIdentity) {
        if let Some(composite) = self.composites.lock().get_mut(event_type) {
            composite.remove_event_filter(filter);
        }
    }

    /// Set or clear the primary handler for `event_type`.
    ///
    /// The primary handler runs after every other bubbling handler of its type.
    pub fn set_event_handler(&self, event_type: &'static EventType, handler: Option<EventHandler<K, P>>) {
        let mut composites = self.composites.lock();
        match handler {
            Some(h) => composites
                .entry(event_type)
                .or_default()
                .set_event_handler(Some(h)),
            None => {
                if let Some(composite) = composites.get_mut(event_type) {
                    composite.set_event_handler(None);
                }
            }
        }
    }

    /// Primary handler for `event_type`, if set.
    pub fn event_handler(&self, event_type: &'static EventType) -> Option<EventHandler<K, P>> {
        self.composites
            .lock()
            .get(event_type)
            .and_then(|c| c.event_handler().cloned())
    }

    /// Whether a live filter is registered for exactly `event_type`.
    pub fn has_filter(&self, event_type: &'static EventType) -> bool {
        self.composites
            .lock()
            .get_mut(event_type)
            .is_some_and(|c| c.has_filter())
    }

    /// Whether a live handler or primary handler is registered for exactly `event_type`.
    pub fn has_handler(&self, event_type: &'static EventType) -> bool {
        self.composites
            .lock()
            .get_mut(event_type)
            .is_some_and(|c| c.has_handler())
    }

    fn snapshot(
        &self,
        event_type: &'static EventType,
        wanted: impl FnOnce(&mut CompositeEventHandler<K, P>) -> bool,
    ) -> Option<CompositeEventHandler<K, P>> {
        let mut composites = self.composites.lock();
        let composite = composites.get_mut(event_type)?;
        wanted(composite).then(|| composite.clone())
    }

    fn attribute(&self, event: Event<K, P>) -> Event<K, P> {
        if event.source() == Some(self.source) {
            event
        } else {
            event.copy_for(self.source)
        }
    }
}

fn live<K, P>(event_type: &'static EventType, handler: Handler<K, P>) -> Result<Handler<K, P>, DispatchError> {
    if handler.is_disconnected() {
        tracing::warn!(event_type = event_type.name(), "refusing to register a dropped handler");
        return Err(DispatchError::DisconnectedHandler {
            event_type: event_type.name(),
        });
    }
    Ok(handler)
}

impl<K, P> EventDispatcher<K, P> for EventHandlerManager<K, P>
where
    K: Copy + Eq + Send + Sync + 'static,
    P: 'static,
{
    fn dispatch_capturing_event(
        &self,
        mut event: Event<K, P>,
        ctx: &mut EventDispatchContext<K, P>,
    ) -> Option<Event<K, P>> {
        for ty in event.event_type().ancestors() {
            let Some(mut composite) = self.snapshot(ty, |c| c.has_filter()) else {
                continue;
            };
            event = self.attribute(event);
            if composite.dispatch_capturing_event(&mut event, false) {
                let source = self.source;
                ctx.add_default_handler(&event, move |e| {
                    let prev = e.replace_source(Some(source));
                    composite.dispatch_capturing_event(e, true);
                    e.replace_source(prev);
                });
            }
            if event.is_consumed() {
                return None;
            }
        }
        Some(event)
    }

    fn dispatch_bubbling_event(
        &self,
        mut event: Event<K, P>,
        ctx: &mut EventDispatchContext<K, P>,
    ) -> Option<Event<K, P>> {
        for ty in event.event_type().ancestors() {
            let Some(mut composite) = self.snapshot(ty, |c| c.has_handler()) else {
                continue;
            };
            event = self.attribute(event);
            if composite.dispatch_bubbling_event(&mut event, false) {
                let source = self.source;
                ctx.add_default_handler(&event, move |e| {
                    let prev = e.replace_source(Some(source));
                    composite.dispatch_bubbling_event(e, true);
                    e.replace_source(prev);
                });
            }
            if event.is_consumed() {
                return None;
            }
        }
        Some(event)
    }
}

impl<K: fmt::Debug, P> fmt::Debug for EventHandlerManager<K, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHandlerManager")
            .field("source", &self.source)
            .field("event_types", &self.composites.lock().len())
            .finish()
    }
}
