// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deferred default handlers.
//!
//! An [`EventDispatchContext`] collects "default" behaviours registered while
//! an event travels through a chain, and runs them once the chain is done, in
//! registration order, only if nothing consumed the event.
//!
//! The context lives on the [`EventDispatchChain`]. Each call to
//! [`EventDispatchContext::dispatch_event`] installs a fresh context for the
//! duration of the dispatch and restores the outer one afterwards, also when a
//! handler panics. Dispatchers reach the innermost context through the tail
//! they are handed.
//!
//! ## States
//!
//! A context has no default handlers, is accumulating them, or has had its
//! defaults prevented. Prevention is one-way: it drops every accumulated
//! handler and turns later registrations into no-ops.
//!
//! ```
//! use understory_responder::context::EventDispatchContext;
//! use understory_responder::event::{ANY, Event};
//!
//! let mut ctx = EventDispatchContext::<u32, ()>::new();
//! let mut event = Event::new(&ANY, ());
//! ctx.add_default_handler(&event, |e| e.consume());
//! assert_eq!(ctx.default_handler_count(), 1);
//!
//! event.prevent_default();
//! ctx.add_default_handler(&event, |e| e.consume());
//! assert!(ctx.is_default_prevented());
//! assert_eq!(ctx.default_handler_count(), 0);
//! ```

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;
use core::mem;

use crate::chain::EventDispatchChain;
use crate::event::Event;

/// Deferred default behaviour.
pub type DefaultHandler<K, P> = Box<dyn FnOnce(&mut Event<K, P>) + Send>;

enum DefaultHandlers<K, P> {
    None,
    Accumulating(Vec<DefaultHandler<K, P>>),
    Prevented,
}

/// Default handlers registered during one dispatch.
pub struct EventDispatchContext<K, P> {
    defaults: DefaultHandlers<K, P>,
}

impl<K, P> EventDispatchContext<K, P> {
    /// Create a context with no default handlers.
    pub fn new() -> Self {
        Self {
            defaults: DefaultHandlers::None,
        }
    }

    /// Register a default handler for `event`.
    ///
    /// If the event already has its default prevented, the context switches
    /// to the prevented state instead; once prevented, registration is a no-op.
    pub fn add_default_handler(
        &mut self,
        event: &Event<K, P>,
        handler: impl FnOnce(&mut Event<K, P>) + Send + 'static,
    ) {
        if event.is_default_prevented() {
            self.prevent_default();
            return;
        }
        match &mut self.defaults {
            DefaultHandlers::Prevented => {}
            DefaultHandlers::Accumulating(handlers) => handlers.push(Box::new(handler)),
            DefaultHandlers::None => {
                self.defaults = DefaultHandlers::Accumulating(alloc::vec![
                    Box::new(handler) as DefaultHandler<K, P>
                ]);
            }
        }
    }

    /// Drop every default handler and ignore later registrations.
    pub fn prevent_default(&mut self) {
        if !self.is_default_prevented() {
            tracing::trace!("default handlers prevented");
        }
        self.defaults = DefaultHandlers::Prevented;
    }

    /// Whether defaults have been prevented.
    pub fn is_default_prevented(&self) -> bool {
        matches!(self.defaults, DefaultHandlers::Prevented)
    }

    /// Number of pending default handlers.
    pub fn default_handler_count(&self) -> usize {
        match &self.defaults {
            DefaultHandlers::Accumulating(handlers) => handlers.len(),
            DefaultHandlers::None | DefaultHandlers::Prevented => 0,
        }
    }

    /// Run `event` through `chain` with a fresh context, then run the default
    /// handlers it collected.
    ///
    /// Default handlers run in registration order, only if the chain returned
    /// the event unconsumed and defaults were not prevented, and stop at the
    /// first one that consumes the event. Returns `None` if the event ended
    /// up consumed.
    pub fn dispatch_event(
        chain: &mut EventDispatchChain<K, P>,
        event: Event<K, P>,
    ) -> Option<Event<K, P>> {
        let (result, context) = {
            let scope = ContextScope::enter(chain);
            let result = scope.chain.dispatch_event(event);
            (result, mem::take(&mut scope.chain.context))
        };
        let event = result.filter(|e| !e.is_consumed())?;
        context.run_default_handlers(event)
    }

    fn run_default_handlers(self, mut event: Event<K, P>) -> Option<Event<K, P>> {
        let DefaultHandlers::Accumulating(handlers) = self.defaults else {
            return Some(event);
        };
        tracing::trace!(count = handlers.len(), "running default handlers");
        for handler in handlers {
            if event.is_default_prevented() {
                break;
            }
            handler(&mut event);
            if event.is_consumed() {
                return None;
            }
        }
        Some(event)
    }
}

impl<K, P> Default for EventDispatchContext<K, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, P> fmt::Debug for EventDispatchContext<K, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &self.defaults {
            DefaultHandlers::None => "none",
            DefaultHandlers::Accumulating(_) => "accumulating",
            DefaultHandlers::Prevented => "prevented",
        };
        f.debug_struct("EventDispatchContext")
            .field("state", &state)
            .field("handlers", &self.default_handler_count())
            .finish()
    }
}

/// Installs a fresh context on a chain and puts the outer one back on drop.
struct ContextScope<'a, K, P> {
    chain: &'a mut EventDispatchChain<K, P>,
    outer: Option<EventDispatchContext<K, P>>,
}

impl<'a, K, P> ContextScope<'a, K, P> {
    fn enter(chain: &'a mut EventDispatchChain<K, P>) -> Self {
        let outer = mem::take(&mut chain.context);
        Self {
            chain,
            outer: Some(outer),
        }
    }
}

impl<K, P> Drop for ContextScope<'_, K, P> {
    fn drop(&mut self) {
        if let Some(outer) = self.outer.take() {
            self.chain.context = outer;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::EventDispatcher;
    use crate::event::{ANY, EventType};
    use alloc::sync::Arc;
    use alloc::vec;
    use core::sync::atomic::{AtomicUsize, Ordering};
    use parking_lot::Mutex;

    static KEY: EventType = EventType::new("KEY", &ANY);

    type Log = Arc<Mutex<Vec<&'static str>>>;

    /// Registers one default handler during capture; optionally consumes while bubbling.
    struct Node {
        log: Log,
        consume_in_bubble: bool,
        consume_in_default: bool,
    }

    impl EventDispatcher<u32, ()> for Node {
        fn dispatch_capturing_event(
            &self,
            event: Event<u32, ()>,
            ctx: &mut EventDispatchContext<u32, ()>,
        ) -> Option<Event<u32, ()>> {
            let log = self.log.clone();
            let consume = self.consume_in_default;
            ctx.add_default_handler(&event, move |e| {
                log.lock().push("default");
                if consume {
                    e.consume();
                }
            });
            Some(event)
        }

        fn dispatch_bubbling_event(
            &self,
            mut event: Event<u32, ()>,
            _ctx: &mut EventDispatchContext<u32, ()>,
        ) -> Option<Event<u32, ()>> {
            self.log.lock().push("bubble");
            if self.consume_in_bubble {
                event.consume();
                return None;
            }
            Some(event)
        }
    }

    fn chain_of(nodes: Vec<Node>) -> EventDispatchChain<u32, ()> {
        let mut chain = EventDispatchChain::new();
        for n in nodes {
            chain.append(Arc::new(n));
        }
        chain
    }

    fn node(log: &Log, consume_in_bubble: bool, consume_in_default: bool) -> Node {
        Node {
            log: log.clone(),
            consume_in_bubble,
            consume_in_default,
        }
    }

    #[test]
    fn default_runs_once_when_nothing_consumes() {
        let log = Log::default();
        let mut chain = chain_of(vec![node(&log, false, false)]);
        let out = EventDispatchContext::dispatch_event(&mut chain, Event::new(&KEY, ()));
        assert!(out.is_some());
        assert_eq!(*log.lock(), vec!["bubble", "default"]);
    }

    #[test]
    fn default_skipped_when_chain_consumes() {
        let log = Log::default();
        let mut chain = chain_of(vec![node(&log, true, false)]);
        let out = EventDispatchContext::dispatch_event(&mut chain, Event::new(&KEY, ()));
        assert!(out.is_none());
        assert_eq!(*log.lock(), vec!["bubble"]);
    }

    #[test]
    fn defaults_stop_at_first_consumer() {
        let log = Log::default();
        let mut chain = chain_of(vec![node(&log, false, true), node(&log, false, false)]);
        let out = EventDispatchContext::dispatch_event(&mut chain, Event::new(&KEY, ()));
        assert!(out.is_none());
        assert_eq!(*log.lock(), vec!["bubble", "bubble", "default"]);
    }

    #[test]
    fn prevented_event_runs_no_defaults() {
        let log = Log::default();
        let mut chain = chain_of(vec![node(&log, false, false)]);
        let mut event = Event::new(&KEY, ());
        event.prevent_default();
        let out = EventDispatchContext::dispatch_event(&mut chain, event);
        assert!(out.is_some());
        assert_eq!(*log.lock(), vec!["bubble"]);
    }

    #[test]
    fn prevention_is_one_way() {
        let mut ctx = EventDispatchContext::<u32, ()>::new();
        let event = Event::new(&KEY, ());
        ctx.add_default_handler(&event, |_| {});
        ctx.prevent_default();
        ctx.add_default_handler(&event, |_| {});
        assert!(ctx.is_default_prevented());
        assert_eq!(ctx.default_handler_count(), 0);
    }

    #[test]
    fn outer_context_is_restored_after_nested_dispatch() {
        let mut chain = chain_of(vec![]);
        let event = Event::new(&KEY, ());
        chain.context_mut().add_default_handler(&event, |_| {});
        EventDispatchContext::dispatch_event(&mut chain, Event::new(&KEY, ()));
        assert_eq!(chain.context_mut().default_handler_count(), 1);
    }

    #[test]
    fn outer_context_is_restored_when_a_handler_panics() {
        struct Panics;
        impl EventDispatcher<u32, ()> for Panics {
            fn dispatch_capturing_event(
                &self,
                _event: Event<u32, ()>,
                _ctx: &mut EventDispatchContext<u32, ()>,
            ) -> Option<Event<u32, ()>> {
                panic!("handler failure");
            }
        }

        let calls = Arc::new(AtomicUsize::new(0));
        let mut chain = EventDispatchChain::<u32, ()>::new();
        chain.append(Arc::new(Panics));
        let event = Event::new(&KEY, ());
        let c = calls.clone();
        chain.context_mut().add_default_handler(&event, move |_| {
            c.fetch_add(1, Ordering::Relaxed);
        });

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            EventDispatchContext::dispatch_event(&mut chain, Event::new(&KEY, ()))
        }));
        assert!(result.is_err(), "handler panics propagate to the caller");
        assert_eq!(chain.context_mut().default_handler_count(), 1);
    }
}
