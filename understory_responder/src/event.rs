// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Event types and the event record carried through a dispatch chain.
//!
//! ## Event types
//!
//! An [`EventType`] is a `static` item with a name and an optional super type.
//! Types form a tree rooted at [`ANY`]; dispatch walks from the concrete type of an
//! event up to the root, so a handler registered for a super type sees every
//! event of its subtypes.
//!
//! Event types compare and hash by identity: two distinct `static` items are
//! distinct types even if they share a name.
//!
//! ```
//! use understory_responder::event::{ANY, EventType};
//!
//! static INPUT: EventType = EventType::new("INPUT", &ANY);
//! static MOUSE: EventType = EventType::new("MOUSE", &INPUT);
//! static MOUSE_PRESSED: EventType = EventType::new("MOUSE_PRESSED", &MOUSE);
//!
//! assert!(MOUSE_PRESSED.is_subtype_of(&INPUT));
//! assert!(!INPUT.is_subtype_of(&MOUSE));
//! let names: Vec<_> = MOUSE_PRESSED.ancestors().map(|t| t.name()).collect();
//! assert_eq!(names, ["MOUSE_PRESSED", "MOUSE", "INPUT", "EVENT"]);
//! ```
//!
//! ## Envelopes
//!
//! [`Event::redirect`] and [`Event::direct`] wrap an event in one of the marker
//! types [`REDIRECTED`] or [`DIRECT`] while remembering the original type. The
//! [`EventRedirector`](crate::redirector::EventRedirector) uses them to tell
//! forwarded delivery apart from direct delivery.

use core::fmt;
use core::hash::{Hash, Hasher};

/// Hierarchical, statically allocated event type.
pub struct EventType {
    name: &'static str,
    super_type: Option<&'static EventType>,
}

impl EventType {
    /// Create a root type with no super type.
    pub const fn root(name: &'static str) -> Self {
        Self {
            name,
            super_type: None,
        }
    }

    /// Create a type below `super_type`.
    pub const fn new(name: &'static str, super_type: &'static Self) -> Self {
        Self {
            name,
            super_type: Some(super_type),
        }
    }

    /// Name of this type.
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Parent type, or `None` for a root.
    pub const fn super_type(&self) -> Option<&'static Self> {
        self.super_type
    }

    /// Returns `true` if `other` is this type or one of its ancestors.
    pub fn is_subtype_of(&self, other: &Self) -> bool {
        let mut cur = Some(self);
        while let Some(t) = cur {
            if t == other {
                return true;
            }
            cur = t.super_type.map(|s| s as &Self);
        }
        false
    }

    /// Iterate from this type up to (and including) its root.
    pub fn ancestors(&'static self) -> impl Iterator<Item = &'static Self> {
        core::iter::successors(Some(self), |t| t.super_type)
    }
}

impl PartialEq for EventType {
    fn eq(&self, other: &Self) -> bool {
        core::ptr::eq(self, other)
    }
}

impl Eq for EventType {}

impl Hash for EventType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        core::ptr::hash(self, state);
    }
}

impl fmt::Debug for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventType({})", self.name)
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Root of every event type hierarchy.
pub static ANY: EventType = EventType::root("EVENT");

/// Marker type for an event forwarded by an event redirector.
pub static REDIRECTED: EventType = EventType::new("REDIRECTED", &ANY);

/// Marker type for an event that must pass an event redirector untouched.
pub static DIRECT: EventType = EventType::new("DIRECT", &ANY);

/// An event travelling through a dispatch chain.
///
/// `K` identifies event sources and targets (for example a node id) and `P` is
/// the application payload. The event is moved through the chain by value;
/// dispatch steps return `None` once it has been consumed.
#[derive(Clone, Debug)]
pub struct Event<K, P> {
    event_type: &'static EventType,
    /// Type of the wrapped event while inside a `REDIRECTED`/`DIRECT` envelope.
    envelope: Option<&'static EventType>,
    source: Option<K>,
    target: Option<K>,
    consumed: bool,
    default_prevented: bool,
    payload: P,
}

impl<K, P> Event<K, P> {
    /// Create an unconsumed event with no source or target.
    pub fn new(event_type: &'static EventType, payload: P) -> Self {
        Self {
            event_type,
            envelope: None,
            source: None,
            target: None,
            consumed: false,
            default_prevented: false,
            payload,
        }
    }

    /// Set the source.
    pub fn with_source(mut self, source: K) -> Self {
        self.source = Some(source);
        self
    }

    /// Set the target.
    pub fn with_target(mut self, target: K) -> Self {
        self.target = Some(target);
        self
    }

    /// Current type; a marker type while the event is wrapped.
    pub fn event_type(&self) -> &'static EventType {
        self.event_type
    }

    /// Type of the event inside any envelope.
    pub fn original_event_type(&self) -> &'static EventType {
        self.envelope.unwrap_or(self.event_type)
    }

    /// Payload.
    pub fn payload(&self) -> &P {
        &self.payload
    }

    /// Mutable payload.
    pub fn payload_mut(&mut self) -> &mut P {
        &mut self.payload
    }

    /// Consume the event and return its payload.
    pub fn into_payload(self) -> P {
        self.payload
    }

    /// Mark the event as consumed; remaining handlers of the current pass are skipped.
    pub fn consume(&mut self) {
        self.consumed = true;
    }

    /// Whether the event has been consumed.
    pub fn is_consumed(&self) -> bool {
        self.consumed
    }

    /// Suppress default handlers for this event.
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    /// Whether default handlers have been suppressed.
    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }

    /// Re-attribute the event to `source`.
    ///
    /// The copy starts unconsumed, so each step of a chain decides
    /// consumption for itself.
    pub fn copy_for(mut self, source: K) -> Self {
        self.source = Some(source);
        self.consumed = false;
        self
    }

    /// Whether the event is wrapped as [`REDIRECTED`].
    pub fn is_redirected(&self) -> bool {
        *self.event_type == REDIRECTED
    }

    /// Whether the event is wrapped as [`DIRECT`].
    pub fn is_direct(&self) -> bool {
        *self.event_type == DIRECT
    }

    /// Wrap as [`REDIRECTED`] with `source` as the redirecting object.
    ///
    /// An already redirected event is returned unchanged, so nested
    /// redirectors do not wrap twice.
    pub fn redirect(self, source: K) -> Self {
        if self.is_redirected() {
            return self;
        }
        let mut event = self.unwrap_envelope();
        event.envelope = Some(event.event_type);
        event.event_type = &REDIRECTED;
        event.source = Some(source);
        event.consumed = false;
        event
    }

    /// Wrap as [`DIRECT`] so event redirectors let it through.
    pub fn direct(self) -> Self {
        if self.is_direct() {
            return self;
        }
        let mut event = self.unwrap_envelope();
        event.envelope = Some(event.event_type);
        event.event_type = &DIRECT;
        event
    }

    pub(crate) fn replace_source(&mut self, source: Option<K>) -> Option<K> {
        core::mem::replace(&mut self.source, source)
    }

    /// Remove any envelope and restore the original type.
    pub fn unwrap_envelope(mut self) -> Self {
        if let Some(original) = self.envelope.take() {
            self.event_type = original;
        }
        self
    }
}

impl<K: Copy, P> Event<K, P> {
    /// Object the event is currently attributed to.
    pub fn source(&self) -> Option<K> {
        self.source
    }

    /// Object the event was fired at.
    pub fn target(&self) -> Option<K> {
        self.target
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static INPUT: EventType = EventType::new("INPUT", &ANY);
    static KEY: EventType = EventType::new("KEY", &INPUT);
    static KEY_PRESSED: EventType = EventType::new("KEY_PRESSED", &KEY);
    static OTHER_KEY: EventType = EventType::new("KEY", &INPUT);

    #[test]
    fn identity_not_name_decides_equality() {
        assert_eq!(KEY, KEY);
        assert_ne!(KEY, OTHER_KEY);
        assert!(!KEY_PRESSED.is_subtype_of(&OTHER_KEY));
    }

    #[test]
    fn ancestors_end_at_root() {
        let chain: Vec<&'static EventType> = KEY_PRESSED.ancestors().collect();
        assert_eq!(chain.len(), 4);
        assert_eq!(*chain[3], ANY);
        assert!(chain[3].super_type().is_none());
    }

    #[test]
    fn copy_for_resets_consumed_and_keeps_target() {
        let mut e: Event<u32, ()> = Event::new(&KEY_PRESSED, ()).with_source(1).with_target(7);
        e.consume();
        let e = e.copy_for(2);
        assert_eq!(e.source(), Some(2));
        assert_eq!(e.target(), Some(7));
        assert!(!e.is_consumed());
    }

    #[test]
    fn redirect_wraps_once_and_unwraps_to_original() {
        let e: Event<u32, &str> = Event::new(&KEY_PRESSED, "a");
        let e = e.redirect(3);
        assert!(e.is_redirected());
        assert_eq!(*e.original_event_type(), KEY_PRESSED);

        let again = e.redirect(4);
        assert_eq!(again.source(), Some(3), "already wrapped events keep their envelope");

        let plain = again.unwrap_envelope();
        assert_eq!(*plain.event_type(), KEY_PRESSED);
        assert_eq!(*plain.payload(), "a");
    }

    #[test]
    fn direct_replaces_redirect_envelope() {
        let e: Event<u32, ()> = Event::new(&KEY, ()).redirect(1).direct();
        assert!(e.is_direct());
        assert_eq!(*e.original_event_type(), KEY);
    }
}
