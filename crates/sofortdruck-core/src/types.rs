// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Sofortdruck instant-photo printer engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Instant-photo printer families and their paper formats.
///
/// The selected model is only a hint: it is used for framing and encoding
/// until a real device is detected, at which point the device's own model
/// report overrides it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrinterModel {
    /// Mini film (credit-card size).
    Mini,
    /// Square film.
    Square,
    /// Wide film (landscape-native).
    Wide,
}

impl PrinterModel {
    /// Print canvas dimensions in printer pixels, portrait orientation
    /// (width, height).
    pub fn print_size(&self) -> (u32, u32) {
        match self {
            Self::Mini => (600, 800),
            Self::Square => (800, 800),
            Self::Wide => (1260, 840),
        }
    }

    /// Human-readable film format name.
    pub fn film_name(&self) -> &'static str {
        match self {
            Self::Mini => "Mini",
            Self::Square => "Square",
            Self::Wide => "Wide",
        }
    }
}

/// Print orientation chosen by the user while framing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    Portrait,
    Landscape,
    PortraitUpsideDown,
    LandscapeFlipped,
}

impl Orientation {
    /// Clockwise rotation applied to the composited canvas before encoding.
    pub fn rotation_degrees(&self) -> u32 {
        match self {
            Self::Portrait => 0,
            Self::Landscape => 90,
            Self::PortraitUpsideDown => 180,
            Self::LandscapeFlipped => 270,
        }
    }

    /// Canvas dimensions for this orientation on the given model.
    ///
    /// 90/270 rotations swap width and height relative to the portrait
    /// print size.
    pub fn canvas_size(&self, model: PrinterModel) -> (u32, u32) {
        let (w, h) = model.print_size();
        match self.rotation_degrees() {
            90 | 270 => (h, w),
            _ => (w, h),
        }
    }
}

/// Immutable printer status snapshot.
///
/// Owned by the connection monitor; replaced wholesale on refresh, never
/// mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrinterInfo {
    /// Model name as reported by the device.
    pub model_name: String,
    /// Battery charge, 0–100.
    pub battery_percent: u8,
    /// Remaining prints in the loaded film pack.
    pub prints_remaining: u32,
    /// When this snapshot was fetched from the device.
    pub fetched_at: DateTime<Utc>,
}

/// Reachability state of the printer. Exactly one variant is active at a
/// time; transitions drive UI re-render. Not persisted.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionState {
    /// No printer handle held; a probe will attempt discovery.
    Searching,
    /// Discovery/handshake in flight (distinguishes first contact from
    /// steady-state polling in the UI).
    Connecting,
    /// Live handle held, with the latest status snapshot.
    Connected(PrinterInfo),
    /// Last probe failed; the message is the user-facing failure category.
    Error(String),
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected(_))
    }
}

/// Print progress stages reported by the printer package during a print.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrintStage {
    /// Encoding the framed image for the wire format.
    Preparing,
    /// Transmitting bytes to the printer.
    Sending,
    /// Printer is ejecting/developing the photo.
    Printing,
    /// Print finished.
    Complete,
}

/// A discrete progress update for the UI.
#[derive(Debug, Clone, PartialEq)]
pub struct PrintProgress {
    pub stage: PrintStage,
    /// Percentage complete, 0–100.
    pub percent: u8,
    /// Human-readable status line.
    pub message: String,
}
