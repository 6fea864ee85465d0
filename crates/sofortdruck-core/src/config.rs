// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Connection settings: how to reach the printer and what film is loaded.
// Persisted as JSON by the host application.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::Result;
use crate::types::{Orientation, PrinterModel};

/// Factory-default printer address when joined to its ad-hoc network.
pub const DEFAULT_HOST: &str = "192.168.0.251";

/// Default control port.
pub const DEFAULT_PORT: u16 = 8080;

/// Loopback host, used against a local printer simulator.
pub const LOOPBACK_HOST: &str = "127.0.0.1";

/// How the printer is addressed on the network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionMode {
    /// The printer's factory-default ad-hoc address.
    Default,
    /// Loopback (printer simulator on this device).
    Loopback,
    /// User-supplied host and port.
    Custom { host: String, port: u16 },
}

impl ConnectionMode {
    /// Resolve to a concrete (host, port) pair.
    pub fn host_port(&self) -> (&str, u16) {
        match self {
            Self::Default => (DEFAULT_HOST, DEFAULT_PORT),
            Self::Loopback => (LOOPBACK_HOST, DEFAULT_PORT),
            Self::Custom { host, port } => (host.as_str(), *port),
        }
    }
}

/// Persistent connection settings.
///
/// `model` and `orientation` feed the framing transform; `model` is only
/// trusted until a live device reports its real model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionSettings {
    pub mode: ConnectionMode,
    /// Pairing PIN printed on the device.
    pub pin_code: u16,
    /// Film format used for framing until a device is detected.
    pub model: PrinterModel,
    /// Print orientation chosen while framing.
    pub orientation: Orientation,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            mode: ConnectionMode::Default,
            pin_code: 1111,
            model: PrinterModel::Mini,
            orientation: Orientation::Portrait,
        }
    }
}

impl ConnectionSettings {
    /// Load settings from a JSON file, falling back to defaults when the
    /// file does not exist yet.
    pub fn load_from(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "no settings file, using defaults");
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        let settings = serde_json::from_str(&raw)?;
        info!(path = %path.display(), "settings loaded");
        Ok(settings)
    }

    /// Save settings to a JSON file.
    pub fn save_to(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let raw = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), raw)?;
        debug!(path = %path.as_ref().display(), "settings saved");
        Ok(())
    }
}
