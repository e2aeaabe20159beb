// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Event handler handles: strong, weak, and their identity.
//!
//! Handlers are shared closures. A registration normally keeps its handler
//! alive ([`Handler::Strong`]). A [`WeakEventHandler`] instead leaves ownership
//! with the caller: once every strong [`EventHandler`] clone is dropped, the
//! registration reports itself disconnected and is pruned the next time its
//! handler list is walked. Dropping the owner is the way to unregister.

use alloc::sync::{Arc, Weak};
use core::fmt;

use crate::event::Event;

/// Shared event handler closure.
pub type EventHandler<K, P> = Arc<dyn Fn(&mut Event<K, P>) + Send + Sync>;

/// Wrap a closure as an [`EventHandler`].
pub fn handler<K, P>(f: impl Fn(&mut Event<K, P>) + Send + Sync + 'static) -> EventHandler<K, P> {
    Arc::new(f)
}

/// Priority class of a filter or handler registration.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum HandlerPriority {
    /// Runs during the regular pass.
    #[default]
    Preferred,
    /// Deferred: runs only after the whole chain, if nothing consumed the event.
    Default,
}

/// Handler that does not keep its closure alive.
pub struct WeakEventHandler<K, P> {
    inner: Weak<dyn Fn(&mut Event<K, P>) + Send + Sync>,
}

impl<K, P> WeakEventHandler<K, P> {
    /// Create a weak handle to `handler`.
    pub fn new(handler: &EventHandler<K, P>) -> Self {
        Self {
            inner: Arc::downgrade(handler),
        }
    }

    /// Returns `true` once every strong owner has been dropped.
    pub fn was_garbage_collected(&self) -> bool {
        self.inner.strong_count() == 0
    }

    /// Strong handle, if the handler is still owned.
    pub fn upgrade(&self) -> Option<EventHandler<K, P>> {
        self.inner.upgrade()
    }
}

impl<K, P> Clone for WeakEventHandler<K, P> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<K, P> fmt::Debug for WeakEventHandler<K, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakEventHandler")
            .field("id", &self.handler_id())
            .field("collected", &self.was_garbage_collected())
            .finish()
    }
}

/// A registered handler: either owned or weakly held.
pub enum Handler<K, P> {
    /// Kept alive by the registration.
    Strong(EventHandler<K, P>),
    /// Owned elsewhere; pruned once the owner drops it.
    Weak(WeakEventHandler<K, P>),
}

impl<K, P> Handler<K, P> {
    /// Returns `true` if a weak handler's owner is gone.
    pub fn is_disconnected(&self) -> bool {
        match self {
            Self::Strong(_) => false,
            Self::Weak(w) => w.was_garbage_collected(),
        }
    }

    /// Invoke the handler. A disconnected weak handler does nothing.
    pub fn call(&self, event: &mut Event<K, P>) {
        match self {
            Self::Strong(h) => h(event),
            Self::Weak(w) => {
                if let Some(h) = w.upgrade() {
                    h(event);
                }
            }
        }
    }
}

impl<K, P> Clone for Handler<K, P> {
    fn clone(&self) -> Self {
        match self {
            Self::Strong(h) => Self::Strong(h.clone()),
            Self::Weak(w) => Self::Weak(w.clone()),
        }
    }
}

impl<K, P> fmt::Debug for Handler<K, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strong(_) => f.debug_tuple("Strong").field(&self.handler_id()).finish(),
            Self::Weak(w) => f.debug_tuple("Weak").field(w).finish(),
        }
    }
}

impl<K, P> From<EventHandler<K, P>> for Handler<K, P> {
    fn from(h: EventHandler<K, P>) -> Self {
        Self::Strong(h)
    }
}

impl<K, P> From<&EventHandler<K, P>> for Handler<K, P> {
    fn from(h: &EventHandler<K, P>) -> Self {
        Self::Strong(h.clone())
    }
}

impl<K, P> From<WeakEventHandler<K, P>> for Handler<K, P> {
    fn from(w: WeakEventHandler<K, P>) -> Self {
        Self::Weak(w)
    }
}

/// Identity of a handler closure: the address of its shared allocation.
///
/// A strong handle and a weak handle to the same closure share an id.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct HandlerId(usize);

/// Anything that refers to a handler closure.
pub trait HandlerIdentity {
    /// Identity of the referenced closure.
    fn handler_id(&self) -> HandlerId;
}

impl<K, P> HandlerIdentity for Arc<dyn Fn(&mut Event<K, P>) + Send + Sync> {
    fn handler_id(&self) -> HandlerId {
        HandlerId(Arc::as_ptr(self).cast::<()>() as usize)
    }
}

impl<K, P> HandlerIdentity for WeakEventHandler<K, P> {
    fn handler_id(&self) -> HandlerId {
        HandlerId(self.inner.as_ptr().cast::<()>() as usize)
    }
}

impl<K, P> HandlerIdentity for Handler<K, P> {
    fn handler_id(&self) -> HandlerId {
        match self {
            Self::Strong(h) => h.handler_id(),
            Self::Weak(w) => w.handler_id(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::ANY;
    use core::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn weak_handler_disconnects_when_owner_drops() {
        let calls = Arc::new(AtomicUsize::new(0));
        let c = calls.clone();
        let owner: EventHandler<u32, ()> = handler(move |_| {
            c.fetch_add(1, Ordering::Relaxed);
        });
        let weak = Handler::from(WeakEventHandler::new(&owner));
        let mut event = Event::new(&ANY, ());

        weak.call(&mut event);
        assert!(!weak.is_disconnected());
        drop(owner);
        assert!(weak.is_disconnected());
        weak.call(&mut event);
        assert_eq!(calls.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn strong_and_weak_share_identity() {
        let h: EventHandler<u32, ()> = handler(|_| {});
        let other: EventHandler<u32, ()> = handler(|_| {});
        let weak = WeakEventHandler::new(&h);
        assert_eq!(h.handler_id(), weak.handler_id());
        assert_ne!(h.handler_id(), other.handler_id());
        assert_eq!(Handler::from(&h).handler_id(), weak.handler_id());
    }
}
