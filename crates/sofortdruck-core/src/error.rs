// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Sofortdruck.
//
// Connection-phase errors are absorbed into the monitor's state machine and
// surfaced as an `Error(message)` state — they are never thrown to the UI.
// Print-phase errors are returned to the caller of `print()` directly.

use thiserror::Error;

/// Top-level error type for all Sofortdruck operations.
#[derive(Debug, Error)]
pub enum SofortError {
    // -- Connection errors (display text doubles as the UI category) --
    #[error("Printer not found")]
    PrinterNotFound,

    #[error("Network unreachable")]
    NetworkUnreachable,

    #[error("Connection timed out")]
    ConnectionTimedOut,

    #[error("Connection failed")]
    ConnectionFailed(String),

    // -- Print errors --
    #[error("image encoding failed: {0}")]
    EncodingFailed(String),

    #[error("print failed: {0}")]
    PrintTransport(String),

    // -- Framing / image errors --
    #[error("image processing failed: {0}")]
    ImageError(String),

    // -- Ambient --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SofortError {
    /// Whether this error belongs to the connection phase, i.e. should be
    /// absorbed into the state machine rather than returned to a caller.
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::PrinterNotFound
                | Self::NetworkUnreachable
                | Self::ConnectionTimedOut
                | Self::ConnectionFailed(_)
        )
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, SofortError>;
