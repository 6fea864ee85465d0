// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// sofortdruck-link — Printer link layer for the Sofortdruck engine.
//
// The actual WiFi wire protocol lives in an external printer package; this
// crate consumes it through the `PrinterLink`/`PrinterHandle` traits and
// builds the resilient part on top: a connection monitor that keeps a
// continuously-updated view of printer reachability with bounded exponential
// backoff, a stale-cache status refresh, and the framed-photo print pipeline.

pub mod classify;
pub mod monitor;
pub mod retry;
pub mod sim;
pub mod transport;

pub use monitor::{MonitorSnapshot, PrinterMonitor};
pub use retry::RetrySchedule;
pub use transport::{ImageEncoder, PrinterHandle, PrinterLink, ProgressCallback};
