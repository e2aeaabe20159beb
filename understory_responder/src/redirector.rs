// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Forward events to other dispatchers instead of the rest of the chain.
//!
//! An [`EventRedirector`] sits in a chain (typically for a window or scene)
//! and hands every event it captures to a list of child dispatchers, wrapped
//! as [`REDIRECTED`](crate::event::REDIRECTED). The event then stops at the
//! redirector. Events wrapped as [`DIRECT`](crate::event::DIRECT) are
//! unwrapped and continue down the chain untouched.
//!
//! The child list may change at any time, from any thread, including from a
//! child that is being dispatched to. A dispatch iterates the snapshot it
//! started with.

use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;
use core::mem;

use arc_swap::ArcSwap;
use parking_lot::Mutex;

use crate::chain::{EventDispatchChain, EventDispatcher};
use crate::context::EventDispatchContext;
use crate::event::Event;

type Dispatchers<K, P> = Vec<Arc<dyn EventDispatcher<K, P>>>;

/// Callback for events that arrive already redirected.
///
/// Receives the redirecting source and the unwrapped original event.
pub type RedirectHook<K, P> = Box<dyn Fn(Option<K>, &Event<K, P>) + Send + Sync>;

/// Dispatcher that fans captured events out to child dispatchers.
pub struct EventRedirector<K, P> {
    source: K,
    dispatchers: ArcSwap<Dispatchers<K, P>>,
    chain: Mutex<EventDispatchChain<K, P>>,
    on_redirected: Option<RedirectHook<K, P>>,
}

impl<K: Copy + Eq, P: Clone> EventRedirector<K, P> {
    /// Create a redirector for `source` with no children.
    pub fn new(source: K) -> Self {
        Self {
            source,
            dispatchers: ArcSwap::from_pointee(Vec::new()),
            chain: Mutex::new(EventDispatchChain::new()),
            on_redirected: None,
        }
    }

    /// Install a hook for events that reach this redirector already redirected.
    pub fn with_redirect_hook(
        mut self,
        hook: impl Fn(Option<K>, &Event<K, P>) + Send + Sync + 'static,
    ) -> Self {
        self.on_redirected = Some(Box::new(hook));
        self
    }

    /// Object events are attributed to when this redirector wraps them.
    pub fn source(&self) -> K {
        self.source
    }

    /// Add a child dispatcher at the end of the list.
    pub fn add_event_dispatcher(&self, dispatcher: Arc<dyn EventDispatcher<K, P>>) {
        self.dispatchers.rcu(|cur| {
            let mut next = Dispatchers::clone(cur);
            next.push(dispatcher.clone());
            next
        });
    }

    /// Remove the first occurrence of `dispatcher`; no-op if absent.
    pub fn remove_event_dispatcher(&self, dispatcher: &Arc<dyn EventDispatcher<K, P>>) {
        self.dispatchers.rcu(|cur| {
            let mut next = Dispatchers::clone(cur);
            if let Some(pos) = next.iter().position(|d| Arc::ptr_eq(d, dispatcher)) {
                next.remove(pos);
            }
            next
        });
    }

    /// Number of child dispatchers.
    pub fn dispatcher_count(&self) -> usize {
        self.dispatchers.load().len()
    }

    fn redirect(&self, event: Event<K, P>, ctx: &mut EventDispatchContext<K, P>) {
        let was_redirected = event.is_redirected();
        let redirected = event.redirect(self.source);
        let children = self.dispatchers.load_full();

        if !children.is_empty() {
            let mut guard = self.chain.try_lock();
            let mut fresh;
            let chain = match guard.as_deref_mut() {
                Some(chain) => chain,
                None => {
                    tracing::trace!("redirector re-entered; using a private chain");
                    fresh = EventDispatchChain::new();
                    &mut fresh
                }
            };
            for child in children.iter() {
                chain.reset();
                mem::swap(chain.context_mut(), ctx);
                child.dispatch_event(redirected.clone(), chain);
                mem::swap(chain.context_mut(), ctx);
            }
        }

        if was_redirected && let Some(hook) = &self.on_redirected {
            let from = redirected.source();
            hook(from, &redirected.unwrap_envelope());
        }
    }
}

impl<K, P> EventDispatcher<K, P> for EventRedirector<K, P>
where
    K: Copy + Eq + Send + Sync,
    P: Clone,
{
    fn dispatch_capturing_event(
        &self,
        event: Event<K, P>,
        ctx: &mut EventDispatchContext<K, P>,
    ) -> Option<Event<K, P>> {
        if event.is_direct() {
            return Some(event.unwrap_envelope());
        }
        self.redirect(event, ctx);
        None
    }
}

impl<K: fmt::Debug, P> fmt::Debug for EventRedirector<K, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventRedirector")
            .field("source", &self.source)
            .field("dispatchers", &self.dispatchers.load().len())
            .field("has_hook", &self.on_redirected.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{ANY, EventType, REDIRECTED};
    use crate::handler::{HandlerPriority, handler};
    use crate::manager::EventHandlerManager;
    use alloc::vec;

    static KEY: EventType = EventType::new("KEY", &ANY);

    type Seen = Arc<Mutex<Vec<(u32, &'static str, Option<u32>)>>>;

    fn recorder(id: u32, seen: &Seen) -> Arc<dyn EventDispatcher<u32, &'static str>> {
        let m = EventHandlerManager::<u32, &'static str>::new(id);
        let seen = seen.clone();
        m.add_event_handler(
            &ANY,
            handler(move |e| {
                seen.lock()
                    .push((id, e.event_type().name(), e.source()));
            }),
            HandlerPriority::Preferred,
        )
        .unwrap();
        Arc::new(m)
    }

    fn dispatch(
        redirector: &Arc<EventRedirector<u32, &'static str>>,
        event: Event<u32, &'static str>,
    ) -> Option<Event<u32, &'static str>> {
        let mut chain = EventDispatchChain::<u32, &'static str>::new();
        chain.append(redirector.clone());
        EventDispatchContext::dispatch_event(&mut chain, event)
    }

    #[test]
    fn captured_events_are_forwarded_and_stopped() {
        let seen = Seen::default();
        let r = Arc::new(EventRedirector::<u32, &'static str>::new(100));
        r.add_event_dispatcher(recorder(1, &seen));
        r.add_event_dispatcher(recorder(2, &seen));
        assert_eq!(r.dispatcher_count(), 2);

        let out = dispatch(&r, Event::new(&KEY, "k"));
        assert!(out.is_none());
        assert_eq!(
            *seen.lock(),
            vec![(1, "REDIRECTED", Some(1)), (2, "REDIRECTED", Some(2))]
        );
    }

    #[test]
    fn direct_events_pass_through_unwrapped() {
        let seen = Seen::default();
        let r = Arc::new(EventRedirector::<u32, &'static str>::new(100));
        r.add_event_dispatcher(recorder(1, &seen));

        let out = dispatch(&r, Event::new(&KEY, "k").direct());
        let out = out.expect("direct events continue");
        assert_eq!(*out.event_type(), KEY);
        assert!(seen.lock().is_empty());
    }

    #[test]
    fn nested_redirectors_keep_one_envelope_and_call_hook() {
        let hooked = Arc::new(Mutex::new(Vec::new()));
        let h = hooked.clone();
        let inner = Arc::new(EventRedirector::<u32, &'static str>::new(200).with_redirect_hook(
            move |from: Option<u32>, e: &Event<u32, &'static str>| {
                h.lock().push((from, e.event_type().name(), *e.payload()));
            },
        ));
        let outer = Arc::new(EventRedirector::<u32, &'static str>::new(100));
        outer.add_event_dispatcher(inner.clone());

        let seen = Seen::default();
        inner.add_event_dispatcher(recorder(7, &seen));

        dispatch(&outer, Event::new(&KEY, "k"));
        assert_eq!(*seen.lock(), vec![(7, "REDIRECTED", Some(7))]);
        assert_eq!(*hooked.lock(), vec![(Some(100), "KEY", "k")]);
    }

    #[test]
    fn removal_matches_by_identity() {
        let seen = Seen::default();
        let r = EventRedirector::<u32, &'static str>::new(1);
        let a = recorder(1, &seen);
        let b = recorder(2, &seen);
        r.add_event_dispatcher(a.clone());
        r.add_event_dispatcher(b);
        r.remove_event_dispatcher(&a);
        r.remove_event_dispatcher(&a);
        assert_eq!(r.dispatcher_count(), 1);
    }

    /// Adds a new child from another thread while it is being dispatched to.
    struct Spawner {
        redirector: Arc<EventRedirector<u32, &'static str>>,
        late: Arc<dyn EventDispatcher<u32, &'static str>>,
    }

    impl EventDispatcher<u32, &'static str> for Spawner {
        fn dispatch_capturing_event(
            &self,
            event: Event<u32, &'static str>,
            _ctx: &mut EventDispatchContext<u32, &'static str>,
        ) -> Option<Event<u32, &'static str>> {
            std::thread::scope(|s| {
                s.spawn(|| self.redirector.add_event_dispatcher(self.late.clone()));
            });
            Some(event)
        }
    }

    #[test]
    fn children_added_mid_dispatch_see_the_next_event() {
        let seen = Seen::default();
        let r = Arc::new(EventRedirector::<u32, &'static str>::new(100));
        let spawner = Arc::new(Spawner {
            redirector: r.clone(),
            late: recorder(9, &seen),
        });
        r.add_event_dispatcher(spawner);

        dispatch(&r, Event::new(&KEY, "first"));
        assert!(seen.lock().is_empty());
        assert_eq!(r.dispatcher_count(), 2);

        dispatch(&r, Event::new(&KEY, "second"));
        assert_eq!(seen.lock().len(), 1);
        assert_eq!(seen.lock()[0].1, REDIRECTED.name());
    }
}
