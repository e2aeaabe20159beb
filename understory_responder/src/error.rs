// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Registration errors.

/// Errors reported when registering filters and handlers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    /// A weak handler was registered after its owner had already dropped it.
    #[error("handler for `{event_type}` was dropped before registration")]
    DisconnectedHandler {
        /// Name of the event type the registration targeted.
        event_type: &'static str,
    },
}
