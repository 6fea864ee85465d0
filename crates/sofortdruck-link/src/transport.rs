// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Collaborator contract for the external printer package.
//
// The wire protocol, device discovery, and image encoding for the printer's
// frame format are all owned by that package; we consume them through these
// traits so the monitor can be driven by a real device, a loopback
// simulator, or a scripted test double interchangeably.

use std::sync::Arc;

use async_trait::async_trait;
use image::DynamicImage;

use sofortdruck_core::error::Result;
use sofortdruck_core::types::{PrintProgress, PrinterInfo, PrinterModel};

/// Progress sink passed into a print operation. Invoked with discrete
/// (stage, percent, message) updates as the transfer advances.
pub type ProgressCallback = Arc<dyn Fn(PrintProgress) + Send + Sync>;

/// A live connection to one printer.
///
/// Exclusively owned by the connection monitor; never shared or aliased
/// externally. Dropping the handle tears the session down.
#[async_trait]
pub trait PrinterHandle: Send + Sync + 'static {
    /// The model reported by the device itself. Overrides whatever model
    /// the user selected in settings.
    async fn model(&self) -> PrinterModel;

    /// Fetch a fresh status snapshot (battery, prints remaining).
    async fn get_info(&self) -> Result<PrinterInfo>;

    /// Transfer an encoded frame to the printer and wait for the print to
    /// finish, reporting progress along the way.
    ///
    /// Note there is no timeout wrapping this call or the others on this
    /// trait; a hang in the underlying package stalls the caller.
    async fn print(&self, payload: Vec<u8>, on_progress: ProgressCallback) -> Result<()>;
}

/// Discovery entry point of the external printer package.
#[async_trait]
pub trait PrinterLink: Send + Sync + 'static {
    type Handle: PrinterHandle;

    /// Locate the printer at `host:port` and perform the pairing handshake.
    async fn detect(&self, host: &str, port: u16, pin_code: u16) -> Result<Self::Handle>;

    /// Obtain the wire-format encoder for the given model.
    fn encoder(&self, model: PrinterModel) -> Arc<dyn ImageEncoder>;
}

/// Encodes a composited print canvas into the printer's wire format.
pub trait ImageEncoder: Send + Sync {
    fn encode(&self, image: &DynamicImage) -> Result<Vec<u8>>;
}
