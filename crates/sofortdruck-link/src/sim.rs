// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scriptable in-process printer simulator.
//
// Implements the collaborator traits without any network. Used by the
// loopback connection mode demo and by the monitor's scenario tests: each
// failure mode is a raw transport-style error string, injected exactly where
// the real printer package would surface it.

use std::sync::Arc;
use std::sync::Mutex as StdMutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use image::DynamicImage;
use tracing::debug;

use sofortdruck_core::error::{Result, SofortError};
use sofortdruck_core::types::{PrintProgress, PrintStage, PrinterInfo, PrinterModel};

use crate::transport::{ImageEncoder, PrinterHandle, PrinterLink, ProgressCallback};

/// Scripted behavior and call counters, shared between the link, the handles
/// it hands out, and the test or demo driving the scenario.
#[derive(Debug)]
pub struct SimBehavior {
    detect_error: StdMutex<Option<String>>,
    info_error: StdMutex<Option<String>>,
    print_error: StdMutex<Option<String>>,
    detect_delay: StdMutex<Duration>,
    print_duration: StdMutex<Duration>,
    model: StdMutex<PrinterModel>,
    battery_percent: StdMutex<u8>,
    prints_remaining: StdMutex<u32>,
    detect_calls: AtomicUsize,
    info_calls: AtomicUsize,
    print_calls: AtomicUsize,
}

impl SimBehavior {
    fn new(model: PrinterModel) -> Self {
        Self {
            detect_error: StdMutex::new(None),
            info_error: StdMutex::new(None),
            print_error: StdMutex::new(None),
            detect_delay: StdMutex::new(Duration::ZERO),
            print_duration: StdMutex::new(Duration::from_secs(2)),
            model: StdMutex::new(model),
            battery_percent: StdMutex::new(80),
            prints_remaining: StdMutex::new(10),
            detect_calls: AtomicUsize::new(0),
            info_calls: AtomicUsize::new(0),
            print_calls: AtomicUsize::new(0),
        }
    }

    /// Make discovery fail with the given raw transport error text.
    pub fn set_detect_error(&self, text: Option<&str>) {
        *self.detect_error.lock().expect("sim lock poisoned") = text.map(String::from);
    }

    /// Make status fetches fail with the given raw transport error text.
    pub fn set_info_error(&self, text: Option<&str>) {
        *self.info_error.lock().expect("sim lock poisoned") = text.map(String::from);
    }

    /// Make prints fail with the given error text.
    pub fn set_print_error(&self, text: Option<&str>) {
        *self.print_error.lock().expect("sim lock poisoned") = text.map(String::from);
    }

    /// Delay before `detect` resolves (handshake time).
    pub fn set_detect_delay(&self, delay: Duration) {
        *self.detect_delay.lock().expect("sim lock poisoned") = delay;
    }

    /// Total simulated duration of a print.
    pub fn set_print_duration(&self, duration: Duration) {
        *self.print_duration.lock().expect("sim lock poisoned") = duration;
    }

    pub fn set_battery_percent(&self, percent: u8) {
        *self.battery_percent.lock().expect("sim lock poisoned") = percent.min(100);
    }

    pub fn set_prints_remaining(&self, prints: u32) {
        *self.prints_remaining.lock().expect("sim lock poisoned") = prints;
    }

    pub fn detect_calls(&self) -> usize {
        self.detect_calls.load(Ordering::SeqCst)
    }

    pub fn info_calls(&self) -> usize {
        self.info_calls.load(Ordering::SeqCst)
    }

    pub fn print_calls(&self) -> usize {
        self.print_calls.load(Ordering::SeqCst)
    }

    fn model(&self) -> PrinterModel {
        *self.model.lock().expect("sim lock poisoned")
    }

    fn info(&self) -> PrinterInfo {
        PrinterInfo {
            model_name: format!("Sofort {}", self.model().film_name()),
            battery_percent: *self.battery_percent.lock().expect("sim lock poisoned"),
            prints_remaining: *self.prints_remaining.lock().expect("sim lock poisoned"),
            fetched_at: Utc::now(),
        }
    }

    fn take_error(slot: &StdMutex<Option<String>>) -> Option<String> {
        slot.lock().expect("sim lock poisoned").clone()
    }
}

/// Simulated printer-package entry point.
pub struct SimulatedLink {
    behavior: Arc<SimBehavior>,
}

impl SimulatedLink {
    pub fn new(model: PrinterModel) -> Self {
        Self {
            behavior: Arc::new(SimBehavior::new(model)),
        }
    }

    /// Handle to the behavior script, for tests and demos.
    pub fn behavior(&self) -> Arc<SimBehavior> {
        Arc::clone(&self.behavior)
    }
}

#[async_trait]
impl PrinterLink for SimulatedLink {
    type Handle = SimulatedHandle;

    async fn detect(&self, host: &str, port: u16, _pin_code: u16) -> Result<Self::Handle> {
        self.behavior.detect_calls.fetch_add(1, Ordering::SeqCst);
        debug!(host, port, "simulated detect");

        let delay = *self.behavior.detect_delay.lock().expect("sim lock poisoned");
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if let Some(text) = SimBehavior::take_error(&self.behavior.detect_error) {
            return Err(SofortError::ConnectionFailed(text));
        }

        Ok(SimulatedHandle {
            behavior: Arc::clone(&self.behavior),
        })
    }

    fn encoder(&self, _model: PrinterModel) -> Arc<dyn ImageEncoder> {
        Arc::new(SimEncoder)
    }
}

/// A "connected" simulated printer.
pub struct SimulatedHandle {
    behavior: Arc<SimBehavior>,
}

#[async_trait]
impl PrinterHandle for SimulatedHandle {
    async fn model(&self) -> PrinterModel {
        self.behavior.model()
    }

    async fn get_info(&self) -> Result<PrinterInfo> {
        self.behavior.info_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(text) = SimBehavior::take_error(&self.behavior.info_error) {
            return Err(SofortError::ConnectionFailed(text));
        }
        Ok(self.behavior.info())
    }

    async fn print(&self, payload: Vec<u8>, on_progress: ProgressCallback) -> Result<()> {
        self.behavior.print_calls.fetch_add(1, Ordering::SeqCst);
        debug!(bytes = payload.len(), "simulated print");

        let step = *self.behavior.print_duration.lock().expect("sim lock poisoned") / 4;

        on_progress(PrintProgress {
            stage: PrintStage::Preparing,
            percent: 0,
            message: "Preparing photo".into(),
        });
        tokio::time::sleep(step).await;

        if let Some(text) = SimBehavior::take_error(&self.behavior.print_error) {
            return Err(SofortError::PrintTransport(text));
        }

        for percent in [25, 75] {
            on_progress(PrintProgress {
                stage: PrintStage::Sending,
                percent,
                message: "Sending to printer".into(),
            });
            tokio::time::sleep(step).await;
        }

        on_progress(PrintProgress {
            stage: PrintStage::Printing,
            percent: 90,
            message: "Printing".into(),
        });
        tokio::time::sleep(step).await;

        {
            let mut prints = self.behavior.prints_remaining.lock().expect("sim lock poisoned");
            *prints = prints.saturating_sub(1);
        }

        on_progress(PrintProgress {
            stage: PrintStage::Complete,
            percent: 100,
            message: "Print complete".into(),
        });
        Ok(())
    }
}

/// Passthrough encoder: raw RGBA bytes stand in for the wire format.
pub struct SimEncoder;

impl ImageEncoder for SimEncoder {
    fn encode(&self, image: &DynamicImage) -> Result<Vec<u8>> {
        if image.width() == 0 || image.height() == 0 {
            return Err(SofortError::EncodingFailed("empty canvas".into()));
        }
        Ok(image.to_rgba8().into_raw())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn detect_honors_scripted_error() {
        let link = SimulatedLink::new(PrinterModel::Mini);
        link.behavior().set_detect_error(Some("Connection refused"));

        let result = link.detect("127.0.0.1", 8080, 1111).await;
        assert!(matches!(result, Err(SofortError::ConnectionFailed(_))));
        assert_eq!(link.behavior().detect_calls(), 1);
    }

    #[tokio::test]
    async fn print_reports_progress_and_consumes_film() {
        let link = SimulatedLink::new(PrinterModel::Square);
        let sim = link.behavior();
        sim.set_prints_remaining(3);
        sim.set_print_duration(Duration::from_millis(4));

        let handle = link.detect("127.0.0.1", 8080, 1111).await.unwrap();
        let seen: Arc<StdMutex<Vec<u8>>> = Arc::new(StdMutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        handle
            .print(
                vec![0u8; 16],
                Arc::new(move |p| sink.lock().unwrap().push(p.percent)),
            )
            .await
            .unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![0, 25, 75, 90, 100]);
        assert_eq!(handle.get_info().await.unwrap().prints_remaining, 2);
    }
}
