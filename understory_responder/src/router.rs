// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Router implementation.
//!
//! ## Overview
//!
//! Builds the dispatch chain for a target node and fires events along it.
//! The chain holds one dispatcher per node on the root→target path, so a
//! dispatch runs capture root→target, then bubble target→root.
//!
//! ## Paths
//!
//! - The path is reconstructed through a [`ParentLookup`], starting at the
//!   target and walking up until a node has no parent.
//! - With [`NoParent`] the path is the target alone.
//! - Nodes the [`DispatcherLookup`] does not know are skipped; they take part
//!   in the path but contribute no dispatcher.
//!
//! ## Defaults
//!
//! [`Router::fire_event`] wraps the chain in a fresh
//! [`EventDispatchContext`], so default handlers registered along the path
//! run after the chain completes.

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;
use core::hash::Hash;
use core::marker::PhantomData;

use hashbrown::HashMap;

use crate::chain::{EventDispatchChain, EventDispatcher};
use crate::context::EventDispatchContext;
use crate::event::Event;

/// Parent relation used to reconstruct a root→target path.
pub trait ParentLookup<K> {
    /// Parent of `node`, or `None` at a root.
    fn parent_of(&self, node: &K) -> Option<K>;
}

/// Parent lookup for flat hierarchies: every node is a root.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoParent;

impl<K> ParentLookup<K> for NoParent {
    fn parent_of(&self, _node: &K) -> Option<K> {
        None
    }
}

impl<K: Copy + Eq + Hash> ParentLookup<K> for HashMap<K, K> {
    fn parent_of(&self, node: &K) -> Option<K> {
        self.get(node).copied()
    }
}

/// Maps nodes to the dispatcher that handles events for them.
pub trait DispatcherLookup<K> {
    /// Event payload the dispatchers accept.
    type Payload;

    /// Dispatcher for `node`, if it has one.
    fn dispatcher_of(&self, node: &K) -> Option<Arc<dyn EventDispatcher<K, Self::Payload>>>;
}

impl<K: Eq + Hash, P> DispatcherLookup<K> for HashMap<K, Arc<dyn EventDispatcher<K, P>>> {
    type Payload = P;

    fn dispatcher_of(&self, node: &K) -> Option<Arc<dyn EventDispatcher<K, P>>> {
        self.get(node).cloned()
    }
}

/// Builds dispatch chains from node ancestry.
///
/// Construct with [`Router::new`] for flat hierarchies, or with
/// [`Router::with_parent`] to reconstruct paths through a [`ParentLookup`].
pub struct Router<K, L: DispatcherLookup<K>, P: ParentLookup<K> = NoParent> {
    lookup: L,
    parent: P,
    _phantom: PhantomData<fn() -> K>,
}

impl<K: Copy + Eq, L: DispatcherLookup<K>, P: ParentLookup<K>> fmt::Debug for Router<K, L, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router").finish_non_exhaustive()
    }
}

impl<K: Copy + Eq, L: DispatcherLookup<K>, P: ParentLookup<K> + Default> Router<K, L, P> {
    /// Create a router with a default parent lookup.
    pub fn new(lookup: L) -> Self {
        Self::with_parent(lookup, P::default())
    }
}

impl<K: Copy + Eq, L: DispatcherLookup<K>, P: ParentLookup<K>> Router<K, L, P> {
    /// Create a router with an explicit parent lookup.
    pub fn with_parent(lookup: L, parent: P) -> Self {
        Self {
            lookup,
            parent,
            _phantom: PhantomData,
        }
    }

    /// Dispatcher lookup.
    pub fn lookup(&self) -> &L {
        &self.lookup
    }

    /// Root→target path for `target`.
    pub fn path_to(&self, target: K) -> Vec<K> {
        let mut out = Vec::new();
        let mut cur = target;
        // Collect to root; caller ensures acyclic ancestry.
        loop {
            out.push(cur);
            match self.parent.parent_of(&cur) {
                Some(p) => cur = p,
                None => break,
            }
        }
        out.reverse();
        out
    }

    /// Build a fresh chain for `target`.
    pub fn build_chain(&self, target: K) -> EventDispatchChain<K, L::Payload> {
        let mut chain = EventDispatchChain::new();
        self.build_chain_into(target, &mut chain);
        chain
    }

    /// Clear `chain` and fill it with the dispatchers on the path to `target`.
    pub fn build_chain_into(&self, target: K, chain: &mut EventDispatchChain<K, L::Payload>) {
        chain.clear();
        let mut cur = Some(target);
        while let Some(node) = cur {
            if let Some(d) = self.lookup.dispatcher_of(&node) {
                chain.prepend(d);
            }
            cur = self.parent.parent_of(&node);
        }
    }

    /// Fire `event` at `target` and run deferred defaults.
    ///
    /// Returns the event if it came out of the chain unconsumed.
    pub fn fire_event(
        &self,
        target: K,
        event: Event<K, L::Payload>,
    ) -> Option<Event<K, L::Payload>> {
        let mut chain = self.build_chain(target);
        tracing::trace!(
            event_type = event.event_type().name(),
            dispatchers = chain.len(),
            "firing event"
        );
        EventDispatchContext::dispatch_event(&mut chain, event.with_target(target))
    }
}
