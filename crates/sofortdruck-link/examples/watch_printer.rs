// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// End-to-end demo against the in-process printer simulator: watch the
// monitor back off while the "printer" is away, see it connect when the
// printer appears, then print a framed synthetic photo.
//
//   RUST_LOG=debug cargo run -p sofortdruck-link --example watch_printer

use std::sync::Arc;
use std::time::Duration;

use image::{DynamicImage, Rgba, RgbaImage};
use tokio::time::sleep;
use tracing::info;

use sofortdruck_core::config::{ConnectionMode, ConnectionSettings};
use sofortdruck_core::types::{Orientation, PrinterModel};
use sofortdruck_frame::{FramingParams, PrintJob};
use sofortdruck_link::monitor::PrinterMonitor;
use sofortdruck_link::sim::SimulatedLink;

#[tokio::main]
async fn main() -> sofortdruck_core::error::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let link = SimulatedLink::new(PrinterModel::Mini);
    let sim = link.behavior();
    sim.set_detect_error(Some("Connection refused"));

    let settings = ConnectionSettings {
        mode: ConnectionMode::Loopback,
        ..Default::default()
    };
    let monitor = Arc::new(PrinterMonitor::new(link, settings));

    // Log every snapshot change the way a UI would re-render on it.
    let mut rx = monitor.subscribe();
    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let snapshot = rx.borrow_and_update().clone();
            info!(?snapshot.state, retry_in = ?snapshot.retry_in_secs, "snapshot");
        }
    });

    monitor.start_monitoring();

    // Let the backoff grow, then "turn the printer on".
    sleep(Duration::from_secs(10)).await;
    info!("printer switched on");
    sim.set_detect_error(None);

    let mut rx = monitor.subscribe();
    while !rx.borrow_and_update().state.is_connected() {
        if rx.changed().await.is_err() {
            return Ok(());
        }
    }

    // A 3:4 gradient photo, framed with a slight zoom and pan.
    let photo = DynamicImage::ImageRgba8(RgbaImage::from_fn(900, 1200, |x, y| {
        Rgba([(x / 4) as u8, (y / 5) as u8, 160, 255])
    }));
    let job = PrintJob {
        image: photo,
        model: PrinterModel::Mini,
        orientation: Orientation::Portrait,
        params: FramingParams {
            scale: 1.4,
            offset: (12.0, -20.0),
            preview_size: (390.0, 520.0),
        },
    };

    monitor.print(job).await?;

    // Leave time for the progress display to clear, then shut down.
    sleep(Duration::from_secs(3)).await;
    monitor.stop_monitoring();
    Ok(())
}
