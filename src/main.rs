//! Lumidim firmware — main entry point.
//!
//! Hexagonal architecture around one cooperative control loop:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    Adapters (outer ring)                     │
//! │                                                              │
//! │  HardwareAdapter    TraceRenderer    ReportWorker            │
//! │  (Sensor+Dimmer)    (RendererPort)   (ReporterPort, thread)  │
//! │  WifiAdapter        LogEventSink     MonotonicClock          │
//! │                                                              │
//! │  ──────────────── Port Trait Boundary ────────────────────   │
//! │                                                              │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │             AppService (pure logic)                    │  │
//! │  │  Calibration · Mapping · Toggle · History · Cadence    │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The only work outside the loop is the touch ISR (one atomic store)
//! and the report worker thread (drains a bounded queue).
#![deny(unused_must_use)]

use anyhow::{anyhow, Result};
use log::{info, warn};

use lumidim::adapters::hardware::HardwareAdapter;
use lumidim::adapters::log_sink::LogEventSink;
use lumidim::adapters::renderer::TraceRenderer;
use lumidim::adapters::reporter::{self, HttpReporter, ReportWorker};
use lumidim::adapters::time::MonotonicClock;
use lumidim::adapters::wifi::{ConnectivityPort, WifiAdapter};
use lumidim::app::service::AppService;
use lumidim::config::SystemConfig;
use lumidim::drivers::dimmer::LampDimmer;
use lumidim::drivers::display::DisplayPanel;
use lumidim::drivers::touch::{self, ToggleController};
use lumidim::drivers::watchdog::Watchdog;
use lumidim::drivers::hw_init;
use lumidim::pins;
use lumidim::sensors::light::LightSensor;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init().map_err(|e| anyhow!("logger init failed: {e}"))?;

    info!("lumidim v{}", env!("CARGO_PKG_VERSION"));

    // ── 2. Configuration ──────────────────────────────────────
    let mut config = SystemConfig::default();
    if let (Some(ssid), Some(password)) = (
        option_env!("LUMIDIM_WIFI_SSID"),
        option_env!("LUMIDIM_WIFI_PASSWORD"),
    ) {
        let _ = config.wifi_ssid.push_str(ssid);
        let _ = config.wifi_password.push_str(password);
    }
    if let Some(endpoint) = option_env!("LUMIDIM_REPORT_ENDPOINT") {
        config.report_endpoint.clear();
        let _ = config.report_endpoint.push_str(endpoint);
    }
    config.validate().map_err(|e| anyhow!("{e}"))?;

    // ── 3. Peripherals ────────────────────────────────────────
    if let Err(e) = hw_init::init_peripherals() {
        // Peripheral init failure is critical — log and halt.
        // In production this triggers the watchdog reset after timeout.
        log::error!("HAL init failed: {} — halting", e);
        #[allow(clippy::empty_loop)]
        loop {}
    }
    touch::install(config.touch_threshold).map_err(|e| anyhow!("{e}"))?;
    let watchdog = Watchdog::new();
    let clock = MonotonicClock::new();

    // ── 4. WiFi station ───────────────────────────────────────
    let peripherals = esp_idf_svc::hal::peripherals::Peripherals::take()
        .map_err(|e| anyhow!("peripherals unavailable: {e}"))?;
    let mut wifi = WifiAdapter::new(peripherals.modem).map_err(|e| anyhow!("{e}"))?;
    if config.wifi_ssid.is_empty() {
        warn!("WiFi: no credentials baked in, reports will be skipped");
    } else {
        if let Err(e) = wifi
            .set_credentials(&config.wifi_ssid, &config.wifi_password)
            .and_then(|()| wifi.connect())
        {
            // Not fatal: the loop keeps controlling the lamp and the
            // adapter retries with backoff from poll().
            warn!("WiFi: initial connect failed ({e}), continuing offline");
        }
    }
    reporter::set_link_up(wifi.is_connected());

    // ── 5. Adapters ───────────────────────────────────────────
    let mut hw = HardwareAdapter::new(
        LightSensor::new(pins::LIGHT_ADC_GPIO),
        LampDimmer::new(),
    );
    let mut renderer = TraceRenderer::new(DisplayPanel::new().map_err(|e| anyhow!("{e}"))?);
    let (_report_worker, mut report_queue) =
        ReportWorker::spawn(HttpReporter::new(&config)).map_err(|e| anyhow!("{e}"))?;
    let mut sink = LogEventSink::new();

    // ── 6. Application core ───────────────────────────────────
    let mut app = AppService::new(&config, clock.uptime_ms(), ToggleController::new());
    app.start(&mut renderer, &mut sink);

    info!("System ready. Entering control loop.");

    // ── 7. Control loop ───────────────────────────────────────
    let tick = core::time::Duration::from_millis(u64::from(config.loop_tick_ms));
    loop {
        std::thread::sleep(tick);
        let now_ms = clock.uptime_ms();

        app.tick(now_ms, &mut hw, &mut renderer, &mut report_queue, &mut sink);

        // Connectivity housekeeping feeds the report worker's link flag.
        wifi.poll(now_ms);
        reporter::set_link_up(wifi.is_connected());

        watchdog.feed();
    }
}
