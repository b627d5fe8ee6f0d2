//! System configuration parameters
//!
//! All tunable parameters for the lumidim controller.  The compiled-in
//! defaults match the reference hardware (0–4095 ADC, 10 s calibration,
//! 100 ms display refresh, 1 s reporting).

use serde::{Deserialize, Serialize};

use crate::error::Error;

const DEFAULT_REPORT_ENDPOINT: &str = "http://192.168.4.2:5000/light-sensor";

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Sensor ---
    /// Upper bound of the raw ADC domain (12-bit → 4095).
    pub sensor_raw_max: u16,

    // --- Calibration ---
    /// Duration of the startup calibration window (milliseconds).
    pub calibration_window_ms: u32,

    // --- Touch toggle ---
    /// Touch pad sensitivity threshold (counts below baseline).
    pub touch_threshold: u16,

    // --- Timing ---
    /// Control loop tick interval (milliseconds).
    pub loop_tick_ms: u32,
    /// Display trace refresh interval (milliseconds).
    pub display_refresh_interval_ms: u32,
    /// Brightness report interval (milliseconds).
    pub report_interval_ms: u32,

    // --- Reporting ---
    /// Collector endpoint for brightness reports.
    pub report_endpoint: heapless::String<128>,
    /// Per-request timeout for a report (milliseconds).
    pub report_timeout_ms: u32,

    // --- WiFi ---
    /// Station SSID.  Empty = networking disabled for this session.
    pub wifi_ssid: heapless::String<32>,
    /// Station password (empty for open networks).
    pub wifi_password: heapless::String<64>,
}

impl Default for SystemConfig {
    fn default() -> Self {
        let mut report_endpoint = heapless::String::new();
        let _ = report_endpoint.push_str(DEFAULT_REPORT_ENDPOINT);

        Self {
            sensor_raw_max: 4095,
            calibration_window_ms: 10_000,
            touch_threshold: 40,

            loop_tick_ms: 10,                 // 100 Hz sampling
            display_refresh_interval_ms: 100, // 10 Hz trace redraw
            report_interval_ms: 1000,         // 1 Hz telemetry

            report_endpoint,
            report_timeout_ms: 3000,

            wifi_ssid: heapless::String::new(),
            wifi_password: heapless::String::new(),
        }
    }
}

impl SystemConfig {
    /// Range-check the configuration before the control loop starts.
    pub fn validate(&self) -> Result<(), Error> {
        if self.sensor_raw_max == 0 {
            return Err(Error::Config("sensor_raw_max must be non-zero"));
        }
        if self.calibration_window_ms == 0 {
            return Err(Error::Config("calibration window must be non-zero"));
        }
        if self.loop_tick_ms == 0 {
            return Err(Error::Config("loop tick must be non-zero"));
        }
        if self.display_refresh_interval_ms < self.loop_tick_ms {
            return Err(Error::Config("display refresh faster than loop tick"));
        }
        if self.report_interval_ms < self.display_refresh_interval_ms {
            return Err(Error::Config("report interval faster than display refresh"));
        }
        if self.report_endpoint.is_empty() {
            return Err(Error::Config("report endpoint is empty"));
        }
        Ok(())
    }
}
