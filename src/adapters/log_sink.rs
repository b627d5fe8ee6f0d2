//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the logger (UART / USB-CDC in production).  A future MQTT adapter
//! would implement the same trait.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started { calibration_window_ms } => {
                info!("START | calibrating for {} ms", calibration_window_ms);
            }
            AppEvent::CalibrationTightened { min, max } => {
                info!("CAL   | envelope now [{}, {}]", min, max);
            }
            AppEvent::CalibrationComplete { min, max } => {
                info!("CAL   | complete: min={} max={}", min, max);
            }
            AppEvent::Toggled { enabled } => {
                info!("LAMP  | turned {}", if *enabled { "ON" } else { "OFF" });
            }
            AppEvent::Sample { ambient, duty } => {
                info!("LIGHT | ambient={} | duty={}", ambient, duty);
            }
            AppEvent::ReportFailed(e) => {
                warn!("REPORT| {}", e);
            }
        }
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}
