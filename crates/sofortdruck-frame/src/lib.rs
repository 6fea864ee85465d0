// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// sofortdruck-frame — Framing transform for instant-photo printing.
//
// Converts the user's on-screen pan/zoom framing of a photo into a composited
// canvas of exactly the printer's pixel dimensions, ready for wire encoding.
// Pure geometry: no I/O, no hidden state.

pub mod framing;

pub use framing::{FramingParams, PrintJob, render_print_canvas, rotate_clockwise};
