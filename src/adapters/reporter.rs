//! Brightness report adapters.
//!
//! The control loop must never block on the network, so reporting is
//! split in two:
//!
//! - [`QueuedReporter`] — the loop-side [`ReporterPort`]: a non-blocking
//!   `try_send` into a bounded channel.  A full queue drops the value
//!   (fire-and-forget telemetry, loss is acceptable).
//! - [`ReportWorker`] — a dedicated thread draining the channel through
//!   the real transport, one value at a time, logging every outcome.
//!
//! [`HttpReporter`] is that transport: one POST per value with the duty
//! embedded both as a query parameter and as the JSON body field
//! `light_value`.  While the link is down it short-circuits without
//! attempting a call.

use core::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, SyncSender, TrySendError};
use std::thread;

use log::{info, warn};
#[cfg(target_os = "espidf")]
use serde::Serialize;

use crate::app::ports::{ReportError, ReporterPort};
use crate::config::SystemConfig;
use crate::error::Error;

/// Values parked between the loop and the worker before drops begin.
const REPORT_QUEUE_DEPTH: usize = 4;

// ───────────────────────────────────────────────────────────────
// Link state
// ───────────────────────────────────────────────────────────────

/// Written from the main loop after each WiFi poll, read by the worker.
static LINK_UP: AtomicBool = AtomicBool::new(false);

/// Publish the current link state for the report worker.
pub fn set_link_up(up: bool) {
    LINK_UP.store(up, Ordering::Release);
}

fn link_is_up() -> bool {
    LINK_UP.load(Ordering::Acquire)
}

// ───────────────────────────────────────────────────────────────
// HTTP transport
// ───────────────────────────────────────────────────────────────

/// JSON body of one report: `{"light_value": N}`.
#[cfg(target_os = "espidf")]
#[derive(Serialize)]
struct ReportPayload {
    light_value: u8,
}

/// Blocking HTTP POST transport.  Runs on the worker thread, never on
/// the control loop.
pub struct HttpReporter {
    endpoint: heapless::String<128>,
    #[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
    timeout_ms: u32,
    #[cfg(not(target_os = "espidf"))]
    sim_send_counter: u32,
}

impl HttpReporter {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            endpoint: config.report_endpoint.clone(),
            timeout_ms: config.report_timeout_ms,
            #[cfg(not(target_os = "espidf"))]
            sim_send_counter: 0,
        }
    }

    #[cfg(target_os = "espidf")]
    fn send(&mut self, duty: u8) -> Result<(), ReportError> {
        use embedded_svc::http::client::Client;
        use embedded_svc::io::Write as _;
        use esp_idf_svc::http::client::{Configuration, EspHttpConnection};

        let connection = EspHttpConnection::new(&Configuration {
            timeout: Some(core::time::Duration::from_millis(u64::from(self.timeout_ms))),
            ..Default::default()
        })
        .map_err(|_| ReportError::ConnectFailed)?;
        let mut client = Client::wrap(connection);

        let url = format!("{}?light_value={}", self.endpoint, duty);
        let payload =
            serde_json::to_vec(&ReportPayload { light_value: duty })
                .map_err(|_| ReportError::RequestFailed)?;

        let mut request = client
            .post(&url, &[("Content-Type", "application/json")])
            .map_err(|_| ReportError::ConnectFailed)?;
        request
            .write_all(&payload)
            .map_err(|_| ReportError::RequestFailed)?;
        let response = request.submit().map_err(|_| ReportError::RequestFailed)?;

        info!("Report: HTTP {} for duty={}", response.status(), duty);
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn send(&mut self, duty: u8) -> Result<(), ReportError> {
        self.sim_send_counter = self.sim_send_counter.wrapping_add(1);
        // Every 7th send fails, exercising the failure-logging path.
        if self.sim_send_counter % 7 == 0 {
            return Err(ReportError::RequestFailed);
        }
        info!("Report(sim): duty={} → {}", duty, self.endpoint);
        Ok(())
    }
}

impl ReporterPort for HttpReporter {
    fn report(&mut self, duty: u8) -> Result<(), ReportError> {
        if !link_is_up() {
            return Err(ReportError::LinkDown);
        }
        self.send(duty)
    }
}

// ───────────────────────────────────────────────────────────────
// Loop-side queue handle
// ───────────────────────────────────────────────────────────────

/// Non-blocking [`ReporterPort`] handed to the control loop.
pub struct QueuedReporter {
    tx: SyncSender<u8>,
}

impl ReporterPort for QueuedReporter {
    fn report(&mut self, duty: u8) -> Result<(), ReportError> {
        match self.tx.try_send(duty) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(ReportError::QueueFull),
            Err(TrySendError::Disconnected(_)) => Err(ReportError::WorkerGone),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Worker thread
// ───────────────────────────────────────────────────────────────

/// Owns the thread that performs the actual (possibly slow) transmissions.
pub struct ReportWorker {
    _handle: thread::JoinHandle<()>,
}

impl ReportWorker {
    /// Spawn the worker around a transport and return the loop-side handle.
    /// The worker exits when every [`QueuedReporter`] has been dropped.
    pub fn spawn(
        mut transport: impl ReporterPort + Send + 'static,
    ) -> Result<(Self, QueuedReporter), Error> {
        let (tx, rx) = mpsc::sync_channel::<u8>(REPORT_QUEUE_DEPTH);
        let handle = thread::Builder::new()
            .name("report".into())
            .stack_size(16 * 1024)
            .spawn(move || {
                while let Ok(duty) = rx.recv() {
                    match transport.report(duty) {
                        Ok(()) => {}
                        Err(e @ ReportError::LinkDown) => info!("Report: {}", e),
                        Err(e) => warn!("Report: {}", e),
                    }
                }
            })
            .map_err(|_| Error::Init("report worker spawn failed"))?;
        Ok((Self { _handle: handle }, QueuedReporter { tx }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::{Duration, Instant};

    #[test]
    fn queue_drops_when_full_and_reports_worker_gone() {
        let (tx, rx) = mpsc::sync_channel::<u8>(REPORT_QUEUE_DEPTH);
        let mut reporter = QueuedReporter { tx };

        for duty in 0..REPORT_QUEUE_DEPTH as u8 {
            assert_eq!(reporter.report(duty), Ok(()));
        }
        assert_eq!(reporter.report(99), Err(ReportError::QueueFull));

        drop(rx);
        assert_eq!(reporter.report(1), Err(ReportError::WorkerGone));
    }

    #[test]
    fn worker_drains_values_in_order() {
        struct Recording(Arc<Mutex<Vec<u8>>>);
        impl ReporterPort for Recording {
            fn report(&mut self, duty: u8) -> Result<(), ReportError> {
                self.0.lock().unwrap().push(duty);
                Ok(())
            }
        }

        let seen = Arc::new(Mutex::new(Vec::new()));
        let (_worker, mut reporter) = ReportWorker::spawn(Recording(seen.clone())).unwrap();

        for duty in [10u8, 20, 30] {
            reporter.report(duty).unwrap();
        }

        let deadline = Instant::now() + Duration::from_secs(2);
        while seen.lock().unwrap().len() < 3 {
            assert!(Instant::now() < deadline, "worker did not drain in time");
            thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(*seen.lock().unwrap(), vec![10, 20, 30]);
    }

    // Single test for the link flag: it is a shared static.
    #[test]
    fn http_reporter_short_circuits_while_link_down() {
        let mut http = HttpReporter::new(&SystemConfig::default());
        set_link_up(false);
        assert_eq!(http.report(42), Err(ReportError::LinkDown));
        set_link_up(true);
        assert_eq!(http.report(42), Ok(()));
        set_link_up(false);
    }
}
