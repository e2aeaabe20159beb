// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors from touch state editing.

/// Errors reported by [`TouchState`](crate::touch::TouchState) mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TouchError {
    /// A point index was not below the live point count.
    #[error("touch point index {index} out of range for {count} points")]
    PointIndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Live point count.
        count: usize,
    },
}
