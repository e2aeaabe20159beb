// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-event-type registry of filters and handlers.
//!
//! A [`CompositeEventHandler`] stores, in registration order, every filter and
//! handler registered for one event type on one source, plus the single
//! primary handler slot (the `on_xxx` style property).
//!
//! ## Passes
//!
//! Each phase is dispatched in two passes:
//!
//! - The regular pass (`dispatch_default == false`) runs
//!   [`HandlerPriority::Preferred`] records in order until the event is
//!   consumed, and reports whether any [`HandlerPriority::Default`] records
//!   were seen.
//! - The default pass (`dispatch_default == true`) runs only the default
//!   records, and only while the event is neither consumed nor default
//!   prevented. The handler manager defers this pass to the end of the chain.
//!
//! Consumption stops handler invocation, not the walk: disconnected weak
//! records are pruned wherever they sit in the list.

use alloc::vec::Vec;
use core::fmt;

use crate::event::Event;
use crate::handler::{EventHandler, Handler, HandlerIdentity, HandlerPriority};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum RecordKind {
    Filter,
    Handler,
}

struct Record<K, P> {
    handler: Handler<K, P>,
    kind: RecordKind,
    priority: HandlerPriority,
}

impl<K, P> Record<K, P> {
    fn is_default(&self) -> bool {
        self.priority == HandlerPriority::Default
    }
}

impl<K, P> Clone for Record<K, P> {
    fn clone(&self) -> Self {
        Self {
            handler: self.handler.clone(),
            kind: self.kind,
            priority: self.priority,
        }
    }
}

/// Ordered filters and handlers for one event type.
pub struct CompositeEventHandler<K, P> {
    records: Vec<Record<K, P>>,
    event_handler: Option<EventHandler<K, P>>,
}

impl<K: Copy + Eq, P> CompositeEventHandler<K, P> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            event_handler: None,
        }
    }

    /// Set or clear the primary handler, which runs after all bubbling handlers.
    pub fn set_event_handler(&mut self, handler: Option<EventHandler<K, P>>) {
        self.event_handler = handler;
    }

    /// Primary handler, if set.
    pub fn event_handler(&self) -> Option<&EventHandler<K, P>> {
        self.event_handler.as_ref()
    }

    /// Register a bubbling handler; no-op if it is already registered as a handler.
    pub fn add_event_handler(&mut self, handler: impl Into<Handler<K, P>>, priority: HandlerPriority) {
        self.add(handler.into(), RecordKind::Handler, priority);
    }

    /// Unregister a bubbling handler; no-op if absent.
    pub fn remove_event_handler(&mut self, handler: &impl HandlerIdentity) {
        self.remove(handler, RecordKind::Handler);
    }

    /// Register a capturing filter; no-op if it is already registered as a filter.
    pub fn add_event_filter(&mut self, filter: impl Into<Handler<K, P>>, priority: HandlerPriority) {
        self.add(filter.into(), RecordKind::Filter, priority);
    }

    /// Unregister a capturing filter; no-op if absent.
    pub fn remove_event_filter(&mut self, filter: &impl HandlerIdentity) {
        self.remove(filter, RecordKind::Filter);
    }

    /// Whether any live filter is registered. Prunes disconnected records.
    pub fn has_filter(&mut self) -> bool {
        self.prune();
        self.records.iter().any(|r| r.kind == RecordKind::Filter)
    }

    /// Whether any live handler, or the primary handler, is registered.
    /// Prunes disconnected records.
    pub fn has_handler(&mut self) -> bool {
        self.prune();
        self.event_handler.is_some() || self.records.iter().any(|r| r.kind == RecordKind::Handler)
    }

    /// Number of records, including ones not yet pruned.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty() && self.event_handler.is_none()
    }

    /// Run the capturing filters.
    ///
    /// Returns `true` if the regular pass saw default-priority filters that
    /// still need a default pass.
    pub fn dispatch_capturing_event(&mut self, event: &mut Event<K, P>, dispatch_default: bool) -> bool {
        self.dispatch(RecordKind::Filter, event, dispatch_default)
    }

    /// Run the bubbling handlers, then the primary handler on the regular pass.
    ///
    /// Returns `true` if the regular pass saw default-priority handlers that
    /// still need a default pass.
    pub fn dispatch_bubbling_event(&mut self, event: &mut Event<K, P>, dispatch_default: bool) -> bool {
        let has_default = self.dispatch(RecordKind::Handler, event, dispatch_default);
        if !dispatch_default
            && !event.is_consumed()
            && let Some(h) = &self.event_handler
        {
            h(event);
        }
        has_default
    }

    fn dispatch(&mut self, kind: RecordKind, event: &mut Event<K, P>, dispatch_default: bool) -> bool {
        let mut has_default = false;
        let mut i = 0;
        while i < self.records.len() {
            if self.records[i].handler.is_disconnected() {
                tracing::trace!(index = i, "pruning disconnected event handler");
                self.records.remove(i);
                continue;
            }
            let record = &self.records[i];
            i += 1;
            if record.kind != kind {
                continue;
            }
            if dispatch_default {
                if record.is_default() && !event.is_consumed() && !event.is_default_prevented() {
                    record.handler.call(event);
                }
            } else if record.is_default() {
                has_default = true;
            } else if !event.is_consumed() {
                record.handler.call(event);
            }
        }
        has_default
    }

    fn add(&mut self, handler: Handler<K, P>, kind: RecordKind, priority: HandlerPriority) {
        self.prune();
        let id = handler.handler_id();
        if self
            .records
            .iter()
            .any(|r| r.kind == kind && r.handler.handler_id() == id)
        {
            return;
        }
        self.records.push(Record {
            handler,
            kind,
            priority,
        });
    }

    fn remove(&mut self, handler: &impl HandlerIdentity, kind: RecordKind) {
        let id = handler.handler_id();
        if let Some(pos) = self
            .records
            .iter()
            .position(|r| r.kind == kind && r.handler.handler_id() == id)
        {
            self.records.remove(pos);
        }
    }

    fn prune(&mut self) {
        self.records.retain(|r| !r.handler.is_disconnected());
    }
}

impl<K: Copy + Eq, P> Default for CompositeEventHandler<K, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, P> Clone for CompositeEventHandler<K, P> {
    fn clone(&self) -> Self {
        Self {
            records: self.records.clone(),
            event_handler: self.event_handler.clone(),
        }
    }
}

impl<K, P> fmt::Debug for CompositeEventHandler<K, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeEventHandler")
            .field("records", &self.records.len())
            .field("event_handler", &self.event_handler.is_some())
            .finish()
    }
}
