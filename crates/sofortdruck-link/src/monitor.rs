// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Printer connection monitor.
//
// Owns the Searching → Connecting → Connected | Error state machine, a
// bounded-backoff retry schedule, and a cached status snapshot. A single
// probe-loop task drives it: probe, sleep, probe. While in the Error state a
// second lightweight task ticks the visible retry countdown once per second;
// it is cancelled before every probe so two countdowns can never race on the
// same displayed value. State is published through a `watch` channel — the
// monitor never touches the UI directly.
//
// The collaborator calls are not wrapped in timeouts: a hang in the printer
// package's handshake stalls the probe loop. Deliberate, see transport.rs.

use std::sync::Arc;
use std::sync::Mutex as StdMutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::{Mutex as AsyncMutex, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use sofortdruck_core::config::ConnectionSettings;
use sofortdruck_core::error::{Result, SofortError};
use sofortdruck_core::types::{ConnectionState, PrintProgress, PrintStage, PrinterInfo};
use sofortdruck_frame::PrintJob;

use crate::classify;
use crate::retry::RetrySchedule;
use crate::transport::{PrinterHandle, PrinterLink, ProgressCallback};

/// Cached status snapshots older than this are re-fetched on the next tick.
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// How long a completed print's progress stays visible.
const PROGRESS_LINGER: Duration = Duration::from_secs(2);

/// Poll spacing while a print suppresses probing.
const PRINTING_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Everything the UI needs to render the connection panel.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorSnapshot {
    /// Current connection state.
    pub state: ConnectionState,
    /// Seconds until the next automatic retry, while in the Error state.
    pub retry_in_secs: Option<u64>,
    /// Progress of an active (or just-finished) print.
    pub progress: Option<PrintProgress>,
}

impl Default for MonitorSnapshot {
    fn default() -> Self {
        Self {
            state: ConnectionState::Searching,
            retry_in_secs: None,
            progress: None,
        }
    }
}

/// Connection session: the live handle and what we know about it.
struct Session<H> {
    handle: Option<H>,
    info: Option<PrinterInfo>,
    last_fetch: Option<Instant>,
    schedule: RetrySchedule,
}

impl<H> Session<H> {
    fn new() -> Self {
        Self {
            handle: None,
            info: None,
            last_fetch: None,
            schedule: RetrySchedule::new(),
        }
    }

    fn drop_handle(&mut self) {
        self.handle = None;
        self.info = None;
        self.last_fetch = None;
    }
}

struct Shared<L: PrinterLink> {
    link: L,
    settings: StdMutex<ConnectionSettings>,
    /// The session lives behind an async mutex: at most one outstanding
    /// probe or print touches the handle at a time.
    session: AsyncMutex<Session<L::Handle>>,
    state_tx: watch::Sender<MonitorSnapshot>,
    is_printing: AtomicBool,
    countdown: StdMutex<Option<JoinHandle<()>>>,
    print_generation: AtomicU64,
}

impl<L: PrinterLink> Shared<L> {
    fn publish(&self, update: impl FnOnce(&mut MonitorSnapshot)) {
        self.state_tx.send_modify(update);
    }

    fn cancel_countdown(&self) {
        if let Some(task) = self
            .countdown
            .lock()
            .expect("countdown lock poisoned")
            .take()
        {
            task.abort();
        }
    }

    /// Tick the visible retry countdown once per second. Replaces any
    /// previous countdown task.
    fn spawn_countdown(shared: &Arc<Self>, interval: Duration) {
        let mut guard = shared.countdown.lock().expect("countdown lock poisoned");
        if let Some(task) = guard.take() {
            task.abort();
        }
        let shared = Arc::clone(shared);
        *guard = Some(tokio::spawn(async move {
            let mut remaining = interval.as_secs();
            while remaining > 0 {
                tokio::time::sleep(Duration::from_secs(1)).await;
                remaining -= 1;
                shared.publish(|s| s.retry_in_secs = Some(remaining));
            }
        }));
    }

    /// The probe loop. First probe fires without delay.
    async fn run_loop(self: Arc<Self>) {
        info!("probe loop started");
        loop {
            self.cancel_countdown();
            let interval = Self::probe(&self).await;
            tokio::time::sleep(interval).await;
        }
    }

    /// One probe: connect or refresh, returning the interval to the next
    /// tick. A print in flight suppresses the probe entirely — nothing
    /// mutates the connection state while printing.
    async fn probe(shared: &Arc<Self>) -> Duration {
        if shared.is_printing.load(Ordering::SeqCst) {
            debug!("print in flight — polling suspended");
            return PRINTING_POLL_INTERVAL;
        }

        let mut session = shared.session.lock().await;
        if session.handle.is_some() {
            Self::refresh_status(shared, &mut session).await
        } else {
            Self::connect(shared, &mut session).await
        }
    }

    /// Steady state: reuse the cached snapshot while fresh, re-fetch past
    /// the refresh threshold. Any fetch failure drops the handle.
    async fn refresh_status(shared: &Arc<Self>, session: &mut Session<L::Handle>) -> Duration {
        let fresh = session
            .last_fetch
            .map(|at| at.elapsed() < REFRESH_INTERVAL)
            .unwrap_or(false);
        if fresh {
            debug!("status cache fresh — skipping fetch");
            return session.schedule.current_interval();
        }

        let handle = session.handle.as_ref().expect("handle checked by caller");
        match handle.get_info().await {
            Ok(info) => {
                debug!(
                    battery = info.battery_percent,
                    prints = info.prints_remaining,
                    "status refreshed"
                );
                session.info = Some(info.clone());
                session.last_fetch = Some(Instant::now());
                session.schedule.reset();
                shared.publish(|s| {
                    s.state = ConnectionState::Connected(info);
                    s.retry_in_secs = None;
                });
                session.schedule.current_interval()
            }
            Err(err) => {
                warn!(error = %err, "status refresh failed — dropping handle");
                session.drop_handle();
                Self::fail(shared, session, err)
            }
        }
    }

    /// First contact: discovery handshake followed by an initial status
    /// fetch.
    async fn connect(shared: &Arc<Self>, session: &mut Session<L::Handle>) -> Duration {
        shared.publish(|s| {
            s.state = ConnectionState::Searching;
            s.retry_in_secs = None;
        });

        let (host, port, pin_code) = {
            let settings = shared.settings.lock().expect("settings lock poisoned");
            let (host, port) = settings.mode.host_port();
            (host.to_string(), port, settings.pin_code)
        };

        shared.publish(|s| s.state = ConnectionState::Connecting);
        debug!(host = %host, port, "probing for printer");

        let handle = match shared.link.detect(&host, port, pin_code).await {
            Ok(handle) => handle,
            Err(err) => return Self::fail(shared, session, err),
        };

        match handle.get_info().await {
            Ok(info) => {
                info!(
                    model = %info.model_name,
                    battery = info.battery_percent,
                    "printer connected"
                );
                session.handle = Some(handle);
                session.info = Some(info.clone());
                session.last_fetch = Some(Instant::now());
                session.schedule.reset();
                shared.publish(|s| {
                    s.state = ConnectionState::Connected(info);
                    s.retry_in_secs = None;
                });
                session.schedule.current_interval()
            }
            Err(err) => Self::fail(shared, session, err),
        }
    }

    /// Absorb a probe failure into the state machine and schedule the
    /// retry. The interval is computed at the pre-failure count, so the
    /// first failure waits the initial 3 seconds.
    fn fail(shared: &Arc<Self>, session: &mut Session<L::Handle>, err: SofortError) -> Duration {
        let classified = classify::refine(err);
        let interval = session.schedule.current_interval();
        session.schedule.record_failure();
        warn!(
            error = %classified,
            retry_count = session.schedule.retry_count(),
            retry_in = interval.as_secs_f64(),
            "probe failed"
        );
        shared.publish(|s| {
            s.state = ConnectionState::Error(classified.to_string());
            s.retry_in_secs = Some(interval.as_secs());
        });
        Self::spawn_countdown(shared, interval);
        interval
    }
}

/// Maintains a continuously-updated view of printer reachability and status
/// without overwhelming the device, and recovers automatically from
/// transient failures.
pub struct PrinterMonitor<L: PrinterLink> {
    shared: Arc<Shared<L>>,
    probe_loop: StdMutex<Option<JoinHandle<()>>>,
}

impl<L: PrinterLink> PrinterMonitor<L> {
    pub fn new(link: L, settings: ConnectionSettings) -> Self {
        let (state_tx, _) = watch::channel(MonitorSnapshot::default());
        Self {
            shared: Arc::new(Shared {
                link,
                settings: StdMutex::new(settings),
                session: AsyncMutex::new(Session::new()),
                state_tx,
                is_printing: AtomicBool::new(false),
                countdown: StdMutex::new(None),
                print_generation: AtomicU64::new(0),
            }),
            probe_loop: StdMutex::new(None),
        }
    }

    /// Subscribe to state snapshots.
    pub fn subscribe(&self) -> watch::Receiver<MonitorSnapshot> {
        self.shared.state_tx.subscribe()
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> MonitorSnapshot {
        self.shared.state_tx.borrow().clone()
    }

    pub fn is_printing(&self) -> bool {
        self.shared.is_printing.load(Ordering::SeqCst)
    }

    /// The cached status record, if a handle is (or recently was) held.
    /// Reused between refreshes to avoid chattering at the printer.
    pub async fn cached_info(&self) -> Option<PrinterInfo> {
        self.shared.session.lock().await.info.clone()
    }

    /// Start (or restart) the probe loop. Idempotent; the first probe fires
    /// without delay.
    pub fn start_monitoring(&self) {
        let mut guard = self.probe_loop.lock().expect("probe loop lock poisoned");
        if let Some(task) = guard.take() {
            task.abort();
        }
        self.shared.cancel_countdown();
        let shared = Arc::clone(&self.shared);
        *guard = Some(tokio::spawn(shared.run_loop()));
        debug!("monitoring started");
    }

    /// Cancel the probe loop and any pending countdown. Safe to call
    /// repeatedly.
    pub fn stop_monitoring(&self) {
        if let Some(task) = self.probe_loop.lock().expect("probe loop lock poisoned").take() {
            task.abort();
        }
        self.shared.cancel_countdown();
        debug!("monitoring stopped");
    }

    /// User-initiated retry from an error state: cancel the countdown,
    /// reset the backoff, and probe again immediately.
    pub async fn retry_now(&self) {
        info!("manual retry requested");
        self.stop_monitoring();
        {
            let mut session = self.shared.session.lock().await;
            session.schedule.reset();
        }
        self.shared.publish(|s| {
            s.state = ConnectionState::Searching;
            s.retry_in_secs = None;
        });
        self.start_monitoring();
    }

    /// Swap in new connection settings and invalidate the current handle
    /// and cached status, forcing the next probe through a full
    /// Searching → Connecting reconnect. The loop keeps running.
    pub async fn apply_settings(&self, settings: ConnectionSettings) {
        info!("settings changed — forcing reconnect");
        *self.shared.settings.lock().expect("settings lock poisoned") = settings;
        {
            let mut session = self.shared.session.lock().await;
            session.drop_handle();
        }
        self.shared.publish(|s| {
            s.state = ConnectionState::Searching;
            s.retry_in_secs = None;
        });
    }

    /// Print a framed photo on the connected printer.
    ///
    /// Fails fast with an encoding-class error when no handle is held (the
    /// printer dropped mid-framing). Probing is suppressed for the
    /// duration; progress flows into the snapshot and lingers for two
    /// seconds after completion. Print failures surface here and leave the
    /// connection state machine alone — the next routine probe re-evaluates
    /// reachability.
    #[instrument(skip(self, job))]
    pub async fn print(&self, job: PrintJob) -> Result<()> {
        self.shared.is_printing.store(true, Ordering::SeqCst);
        let generation = self.shared.print_generation.fetch_add(1, Ordering::SeqCst) + 1;

        let result = self.print_inner(job).await;
        self.shared.is_printing.store(false, Ordering::SeqCst);

        match &result {
            Ok(()) => {
                let shared = Arc::clone(&self.shared);
                tokio::spawn(async move {
                    tokio::time::sleep(PROGRESS_LINGER).await;
                    // A newer print owns the display now — leave it alone.
                    if shared.print_generation.load(Ordering::SeqCst) == generation {
                        shared.publish(|s| s.progress = None);
                    }
                });
            }
            Err(err) => {
                warn!(error = %err, "print failed");
                self.shared.publish(|s| s.progress = None);
            }
        }
        result
    }

    async fn print_inner(&self, job: PrintJob) -> Result<()> {
        let session = self.shared.session.lock().await;
        let handle = session
            .handle
            .as_ref()
            .ok_or_else(|| SofortError::EncodingFailed("no printer connected".into()))?;

        // The device's own model report wins over the settings hint.
        let model = handle.model().await;
        let job = PrintJob { model, ..job };

        self.shared.publish(|s| {
            s.progress = Some(PrintProgress {
                stage: PrintStage::Preparing,
                percent: 0,
                message: "Preparing photo".into(),
            });
        });

        let canvas = job.render()?;
        let payload = self.shared.link.encoder(model).encode(&canvas)?;
        debug!(bytes = payload.len(), "frame encoded");

        let progress_tx = self.shared.state_tx.clone();
        let on_progress: ProgressCallback = Arc::new(move |progress: PrintProgress| {
            progress_tx.send_modify(|s| s.progress = Some(progress));
        });

        handle.print(payload, on_progress).await?;
        info!("print complete");
        Ok(())
    }
}

impl<L: PrinterLink> Drop for PrinterMonitor<L> {
    fn drop(&mut self) {
        if let Ok(mut guard) = self.probe_loop.lock() {
            if let Some(task) = guard.take() {
                task.abort();
            }
        }
        if let Ok(mut guard) = self.shared.countdown.lock() {
            if let Some(task) = guard.take() {
                task.abort();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{SimBehavior, SimulatedLink};
    use image::{DynamicImage, Rgba, RgbaImage};
    use sofortdruck_core::types::{Orientation, PrinterModel};
    use sofortdruck_frame::FramingParams;
    use tokio::time::sleep;

    fn mini_monitor() -> (Arc<PrinterMonitor<SimulatedLink>>, Arc<SimBehavior>) {
        let link = SimulatedLink::new(PrinterModel::Mini);
        let sim = link.behavior();
        let monitor = Arc::new(PrinterMonitor::new(link, ConnectionSettings::default()));
        (monitor, sim)
    }

    fn test_job() -> PrintJob {
        let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            300,
            400,
            Rgba([40, 80, 120, 255]),
        ));
        PrintJob {
            image,
            model: PrinterModel::Mini,
            orientation: Orientation::Portrait,
            params: FramingParams::centered((300.0, 400.0)),
        }
    }

    fn secs(s: f64) -> Duration {
        Duration::from_secs_f64(s)
    }

    #[tokio::test(start_paused = true)]
    async fn refused_connection_backs_off_to_cap() {
        let (monitor, sim) = mini_monitor();
        sim.set_detect_error(Some("Connection refused"));
        monitor.start_monitoring();

        sleep(secs(0.05)).await;
        assert_eq!(
            monitor.snapshot().state,
            ConnectionState::Error("Printer not found".into())
        );
        assert_eq!(sim.detect_calls(), 1);

        // Probes at t = 3, 7.5, 14.25, 24.375 s — bounded exponential spacing.
        sleep(secs(3.3)).await;
        assert_eq!(sim.detect_calls(), 2);
        sleep(secs(4.5)).await;
        assert_eq!(sim.detect_calls(), 3);
        sleep(secs(6.75)).await;
        assert_eq!(sim.detect_calls(), 4);
        sleep(secs(10.125)).await;
        assert_eq!(sim.detect_calls(), 5);

        // Capped and sustained: one probe every 15 s from here on.
        sleep(secs(15.0)).await;
        assert_eq!(sim.detect_calls(), 6);
        sleep(secs(15.0)).await;
        assert_eq!(sim.detect_calls(), 7);
    }

    #[tokio::test(start_paused = true)]
    async fn countdown_ticks_down_in_error_state() {
        let (monitor, sim) = mini_monitor();
        sim.set_detect_error(Some("Connection refused"));
        monitor.start_monitoring();

        sleep(secs(0.05)).await;
        assert_eq!(monitor.snapshot().retry_in_secs, Some(3));

        sleep(secs(1.2)).await;
        assert_eq!(monitor.snapshot().retry_in_secs, Some(2));
        sleep(secs(1.0)).await;
        assert_eq!(monitor.snapshot().retry_in_secs, Some(1));

        // Second failed probe restarts the countdown at the grown interval.
        sleep(secs(0.95)).await;
        assert_eq!(monitor.snapshot().retry_in_secs, Some(4));
    }

    #[tokio::test(start_paused = true)]
    async fn retry_now_cancels_countdown_and_probes_immediately() {
        let (monitor, sim) = mini_monitor();
        sim.set_detect_error(Some("Connection refused"));
        monitor.start_monitoring();

        // Let the backoff grow past the initial interval.
        sleep(secs(8.0)).await;
        assert_eq!(sim.detect_calls(), 3);

        monitor.retry_now().await;
        sleep(secs(0.05)).await;

        // Immediate probe, schedule back at the initial interval.
        assert_eq!(sim.detect_calls(), 4);
        assert_eq!(
            monitor.snapshot().state,
            ConnectionState::Error("Printer not found".into())
        );
        assert_eq!(monitor.snapshot().retry_in_secs, Some(3));
    }

    #[tokio::test(start_paused = true)]
    async fn success_resets_backoff_after_failures() {
        let (monitor, sim) = mini_monitor();
        sim.set_detect_error(Some("Connection refused"));
        monitor.start_monitoring();

        sleep(secs(8.0)).await;
        assert_eq!(sim.detect_calls(), 3);

        // Printer appears; next probe (t = 14.25) connects.
        sim.set_detect_error(None);
        sleep(secs(7.0)).await;

        let snapshot = monitor.snapshot();
        assert!(snapshot.state.is_connected());
        assert_eq!(snapshot.retry_in_secs, None);
    }

    #[tokio::test(start_paused = true)]
    async fn connecting_state_is_visible_during_handshake() {
        let (monitor, sim) = mini_monitor();
        sim.set_detect_delay(Duration::from_secs(5));
        monitor.start_monitoring();

        sleep(secs(1.0)).await;
        assert_eq!(monitor.snapshot().state, ConnectionState::Connecting);

        sleep(secs(5.0)).await;
        assert!(monitor.snapshot().state.is_connected());
    }

    #[tokio::test(start_paused = true)]
    async fn connected_reuses_cached_status_within_threshold() {
        let (monitor, sim) = mini_monitor();
        monitor.start_monitoring();

        sleep(secs(0.05)).await;
        assert!(monitor.snapshot().state.is_connected());
        assert_eq!(sim.info_calls(), 1);

        // Ticks at 3, 6, … 27 s reuse the cache.
        sleep(secs(13.0)).await;
        assert_eq!(sim.info_calls(), 1);
        assert_eq!(
            monitor.cached_info().await.map(|info| info.battery_percent),
            Some(80)
        );

        // The tick past the 30 s threshold re-fetches.
        sleep(secs(17.2)).await;
        assert_eq!(sim.info_calls(), 2);
        assert!(monitor.snapshot().state.is_connected());
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_failure_drops_handle_and_reconnects() {
        let (monitor, sim) = mini_monitor();
        monitor.start_monitoring();

        sleep(secs(0.05)).await;
        assert!(monitor.snapshot().state.is_connected());
        assert_eq!(sim.detect_calls(), 1);

        sim.set_info_error(Some("connection reset by peer"));
        sleep(secs(31.0)).await;

        // Stale refresh failed: generic bucket, handle gone.
        assert_eq!(
            monitor.snapshot().state,
            ConnectionState::Error("Connection failed".into())
        );

        // Device recovers; the loop reconnects from scratch.
        sim.set_info_error(None);
        sleep(secs(4.0)).await;
        assert!(monitor.snapshot().state.is_connected());
        assert!(sim.detect_calls() >= 2);
    }

    #[tokio::test(start_paused = true)]
    async fn apply_settings_forces_full_reconnect() {
        let (monitor, sim) = mini_monitor();
        monitor.start_monitoring();

        sleep(secs(0.05)).await;
        assert!(monitor.snapshot().state.is_connected());
        assert_eq!(sim.detect_calls(), 1);

        monitor.apply_settings(ConnectionSettings::default()).await;
        assert_eq!(monitor.snapshot().state, ConnectionState::Searching);

        // Next tick goes through a full Searching → Connecting handshake
        // instead of reusing the old handle.
        sleep(secs(3.2)).await;
        assert_eq!(sim.detect_calls(), 2);
        assert_eq!(sim.info_calls(), 2);
        assert!(monitor.snapshot().state.is_connected());
    }

    #[tokio::test(start_paused = true)]
    async fn stop_monitoring_halts_probes_and_is_repeatable() {
        let (monitor, sim) = mini_monitor();
        sim.set_detect_error(Some("Connection refused"));
        monitor.start_monitoring();

        sleep(secs(10.0)).await;
        let calls = sim.detect_calls();
        assert!(calls >= 2);

        monitor.stop_monitoring();
        monitor.stop_monitoring();

        sleep(secs(60.0)).await;
        assert_eq!(sim.detect_calls(), calls);
    }

    #[tokio::test(start_paused = true)]
    async fn start_monitoring_is_idempotent() {
        let (monitor, sim) = mini_monitor();
        sim.set_detect_error(Some("Connection refused"));

        monitor.start_monitoring();
        sleep(secs(0.05)).await;
        assert_eq!(sim.detect_calls(), 1);

        // Restarting replaces the loop; the fresh loop probes immediately.
        monitor.start_monitoring();
        sleep(secs(0.05)).await;
        assert_eq!(sim.detect_calls(), 2);

        // The first loop's pending tick (t = 3.05) is gone; the shared
        // schedule is at count 2, so the next probe is 4.5 s after the
        // restart.
        sleep(secs(3.4)).await;
        assert_eq!(sim.detect_calls(), 2);
        sleep(secs(3.5)).await;
        assert_eq!(sim.detect_calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn print_without_handle_fails_fast() {
        let (monitor, sim) = mini_monitor();

        let result = monitor.print(test_job()).await;
        assert!(matches!(result, Err(SofortError::EncodingFailed(_))));
        assert_eq!(sim.print_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn print_forwards_progress_then_clears_it() {
        let (monitor, sim) = mini_monitor();
        monitor.start_monitoring();
        sleep(secs(0.05)).await;
        assert!(monitor.snapshot().state.is_connected());

        monitor.print(test_job()).await.unwrap();
        assert_eq!(sim.print_calls(), 1);

        let progress = monitor.snapshot().progress.expect("progress visible");
        assert_eq!(progress.stage, PrintStage::Complete);
        assert_eq!(progress.percent, 100);

        // Cosmetic linger: cleared two seconds after completion.
        sleep(secs(2.1)).await;
        assert_eq!(monitor.snapshot().progress, None);
    }

    #[tokio::test(start_paused = true)]
    async fn print_failure_surfaces_without_touching_connection_state() {
        let (monitor, sim) = mini_monitor();
        monitor.start_monitoring();
        sleep(secs(0.05)).await;
        assert!(monitor.snapshot().state.is_connected());

        sim.set_print_error(Some("transfer aborted"));
        let result = monitor.print(test_job()).await;
        assert!(matches!(result, Err(SofortError::PrintTransport(_))));

        // The state machine is untouched; progress is cleared right away.
        assert!(monitor.snapshot().state.is_connected());
        assert_eq!(monitor.snapshot().progress, None);
    }

    #[tokio::test(start_paused = true)]
    async fn printing_suppresses_probes() {
        let (monitor, sim) = mini_monitor();
        monitor.start_monitoring();
        sleep(secs(0.05)).await;
        assert!(monitor.snapshot().state.is_connected());

        // Arm a failure that a probe would hit, then start a print long
        // enough to span the stale-cache refresh threshold.
        sim.set_info_error(Some("connection refused"));
        sim.set_print_duration(Duration::from_secs(40));

        let printer = Arc::clone(&monitor);
        let print_task = tokio::spawn(async move { printer.print(test_job()).await });

        sleep(secs(0.1)).await;
        assert!(monitor.is_printing());

        // Ticks land while the print runs (including past the 30 s refresh
        // threshold) but none of them may mutate the connection state.
        sleep(secs(31.0)).await;
        assert!(monitor.snapshot().state.is_connected());

        print_task.await.unwrap().unwrap();
        assert!(!monitor.is_printing());

        // Polling resumes; the armed failure now lands and is classified.
        sleep(secs(4.0)).await;
        assert_eq!(
            monitor.snapshot().state,
            ConnectionState::Error("Printer not found".into())
        );
    }
}
