//! Application service — the hexagonal core.
//!
//! [`AppService`] owns the calibration window, the toggle controller, the
//! rolling brightness history and the cadence timers.  One [`tick`]
//! (`AppService::tick`) runs per loop iteration:
//!
//! ```text
//!  toggle check → (calibrating? observe : sample → map → drive)
//!               → history append → display cadence → report cadence
//! ```
//!
//! All I/O flows through port traits injected at call sites, making the
//! entire service testable with mock adapters.

use log::info;

use crate::brightness;
use crate::cadence::CadenceTimers;
use crate::calibration::{CalibrationWindow, SensorRange};
use crate::config::SystemConfig;
use crate::drivers::touch::ToggleController;
use crate::history::BrightnessHistory;

use super::events::AppEvent;
use super::ports::{
    DimmerPort, EventSink, LightSensorPort, RendererPort, ReporterPort, TraceGeometry,
};

/// Samples retained for the display trace (one per trace column).
pub const HISTORY_LEN: usize = 240;

/// Where the trace lives on the 240×135 panel.
pub const TRACE_REGION: TraceGeometry = TraceGeometry {
    origin_x: 0,
    origin_y: 0,
    width: 240,
    height: 130,
    capacity: HISTORY_LEN,
};

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AppService {
    calibration: CalibrationWindow,
    /// `Some` once the window has elapsed and the envelope is frozen.
    range: Option<SensorRange>,
    toggle: ToggleController,
    history: BrightnessHistory<HISTORY_LEN>,
    cadence: CadenceTimers,
    calibration_window_ms: u32,
    tick_count: u64,
}

impl AppService {
    /// Construct the service.  `now_ms` opens the calibration window and
    /// seeds both cadence timers.
    pub fn new(config: &SystemConfig, now_ms: u32, toggle: ToggleController) -> Self {
        Self {
            calibration: CalibrationWindow::new(
                now_ms,
                config.calibration_window_ms,
                config.sensor_raw_max,
            ),
            range: None,
            toggle,
            history: BrightnessHistory::new(),
            cadence: CadenceTimers::new(
                config.display_refresh_interval_ms,
                config.report_interval_ms,
                now_ms,
            ),
            calibration_window_ms: config.calibration_window_ms,
            tick_count: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Hand the renderer its one-time geometry and announce startup.
    pub fn start(&mut self, renderer: &mut impl RendererPort, sink: &mut impl EventSink) {
        renderer.draw_static(&TRACE_REGION);
        sink.emit(&AppEvent::Started {
            calibration_window_ms: self.calibration_window_ms,
        });
        info!("AppService started, calibrating");
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one full control cycle.
    ///
    /// The `hw` parameter satisfies **both** [`LightSensorPort`] and
    /// [`DimmerPort`] — this avoids a double mutable borrow while keeping
    /// the port boundary explicit.
    pub fn tick(
        &mut self,
        now_ms: u32,
        hw: &mut (impl LightSensorPort + DimmerPort),
        renderer: &mut impl RendererPort,
        reporter: &mut impl ReporterPort,
        sink: &mut impl EventSink,
    ) {
        self.tick_count += 1;

        // 1. Consume at most one pending touch edge.
        if let Some(enabled) = self.toggle.poll() {
            sink.emit(&AppEvent::Toggled { enabled });
        }

        // 2. Calibration phase: learn the envelope, lamp untouched.
        if self.range.is_none() {
            if self.calibration.is_calibrating(now_ms) {
                if self.calibration.observe(hw.read_raw()) {
                    let (min, max) = self.calibration.bounds();
                    sink.emit(&AppEvent::CalibrationTightened { min, max });
                }
                return;
            }
            // Window elapsed: freeze the envelope and fall through to
            // operating in the same iteration.
            let range = self.calibration.final_range();
            sink.emit(&AppEvent::CalibrationComplete {
                min: range.min,
                max: range.max,
            });
            self.range = Some(range);
        }
        let Some(range) = self.range else { return };

        // 3. Disabled: force the lamp dark, skip all optional work.
        if !self.toggle.is_enabled() {
            hw.set_duty(0);
            return;
        }

        // 4. Sample → map → drive → remember.
        let raw = hw.read_raw();
        let duty = brightness::duty_for_ambient(raw, range);
        hw.set_duty(duty);
        self.history.append(duty);
        sink.emit(&AppEvent::Sample { ambient: raw, duty });

        // 5. Independent cadences: neither may delay the other.
        if self.cadence.due_display(now_ms) {
            renderer.draw_trace(&self.history.ordered());
        }
        if self.cadence.due_report(now_ms) {
            if let Err(e) = reporter.report(duty) {
                sink.emit(&AppEvent::ReportFailed(e));
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Whether the lamp feature is currently enabled.
    pub fn is_enabled(&self) -> bool {
        self.toggle.is_enabled()
    }

    /// The frozen envelope, once calibration has completed.
    pub fn range(&self) -> Option<SensorRange> {
        self.range
    }

    /// Total control ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ports::ReportError;
    use core::sync::atomic::AtomicBool;

    struct MockHw {
        raw: u16,
        duties: Vec<u8>,
    }

    impl LightSensorPort for MockHw {
        fn read_raw(&mut self) -> u16 {
            self.raw
        }
    }

    impl DimmerPort for MockHw {
        fn set_duty(&mut self, duty: u8) {
            self.duties.push(duty);
        }
    }

    struct MockRenderer {
        static_draws: usize,
        trace_draws: usize,
    }

    impl RendererPort for MockRenderer {
        fn draw_static(&mut self, _geometry: &TraceGeometry) {
            self.static_draws += 1;
        }

        fn draw_trace(&mut self, _samples: &[u8]) {
            self.trace_draws += 1;
        }
    }

    struct MockReporter {
        reports: Vec<u8>,
    }

    impl ReporterPort for MockReporter {
        fn report(&mut self, duty: u8) -> Result<(), ReportError> {
            self.reports.push(duty);
            Ok(())
        }
    }

    struct RecordingSink {
        events: Vec<AppEvent>,
    }

    impl EventSink for RecordingSink {
        fn emit(&mut self, event: &AppEvent) {
            self.events.push(*event);
        }
    }

    struct Harness {
        app: AppService,
        touch: &'static AtomicBool,
        hw: MockHw,
        renderer: MockRenderer,
        reporter: MockReporter,
        sink: RecordingSink,
    }

    fn harness() -> Harness {
        let touch: &'static AtomicBool = Box::leak(Box::new(AtomicBool::new(false)));
        let app = AppService::new(
            &SystemConfig::default(),
            0,
            ToggleController::with_flag(touch),
        );
        Harness {
            app,
            touch,
            hw: MockHw { raw: 0, duties: Vec::new() },
            renderer: MockRenderer { static_draws: 0, trace_draws: 0 },
            reporter: MockReporter { reports: Vec::new() },
            sink: RecordingSink { events: Vec::new() },
        }
    }

    impl Harness {
        fn tick(&mut self, now_ms: u32) {
            self.app.tick(
                now_ms,
                &mut self.hw,
                &mut self.renderer,
                &mut self.reporter,
                &mut self.sink,
            );
        }
    }

    #[test]
    fn start_hands_geometry_to_renderer_once() {
        let mut h = harness();
        h.app.start(&mut h.renderer, &mut h.sink);
        assert_eq!(h.renderer.static_draws, 1);
        assert!(matches!(h.sink.events[0], AppEvent::Started { .. }));
    }

    #[test]
    fn calibration_phase_leaves_lamp_untouched() {
        let mut h = harness();
        h.hw.raw = 1500;
        h.tick(0);
        assert!(h.hw.duties.is_empty());
        assert!(h.app.range().is_none());
        assert!(h.reporter.reports.is_empty());
    }

    #[test]
    fn window_elapse_freezes_envelope_and_starts_operating() {
        let mut h = harness();
        h.hw.raw = 100;
        h.tick(0);
        h.hw.raw = 3000;
        h.tick(5_000);

        h.hw.raw = 100;
        h.tick(10_001);
        let range = h.app.range().expect("range frozen after window");
        assert_eq!((range.min, range.max), (100, 3000));
        // The same iteration already drove the lamp: darkest → full on.
        assert_eq!(h.hw.duties, vec![255]);
    }

    #[test]
    fn disabled_iteration_writes_zero_and_skips_everything() {
        let mut h = harness();
        h.hw.raw = 100;
        h.tick(0);
        h.tick(10_001);
        let baseline_trace_draws = h.renderer.trace_draws;
        let baseline_reports = h.reporter.reports.len();
        let history_before = h.app.history.ordered();

        // Simulate a touch edge, consumed on the next tick.
        h.touch.store(true, core::sync::atomic::Ordering::Release);
        h.hw.duties.clear();
        h.tick(10_011);

        assert!(!h.app.is_enabled());
        assert_eq!(h.hw.duties, vec![0]);
        assert_eq!(h.renderer.trace_draws, baseline_trace_draws);
        assert_eq!(h.reporter.reports.len(), baseline_reports);
        assert_eq!(h.app.history.ordered(), history_before);
    }

    #[test]
    fn report_failure_is_emitted_not_fatal() {
        struct FailingReporter;
        impl ReporterPort for FailingReporter {
            fn report(&mut self, _duty: u8) -> Result<(), ReportError> {
                Err(ReportError::QueueFull)
            }
        }

        let mut h = harness();
        h.hw.raw = 100;
        let mut failing = FailingReporter;
        h.app
            .tick(0, &mut h.hw, &mut h.renderer, &mut failing, &mut h.sink);
        h.app
            .tick(10_001, &mut h.hw, &mut h.renderer, &mut failing, &mut h.sink);
        assert!(h
            .sink
            .events
            .iter()
            .any(|e| matches!(e, AppEvent::ReportFailed(ReportError::QueueFull))));
        // Lamp output still applied.
        assert!(!h.hw.duties.is_empty());
    }
}
