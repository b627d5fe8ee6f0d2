//! Integration tests for the full control loop: calibration window →
//! inverse mapping → lamp output → history → cadence fan-out.
//!
//! These run on the host (x86_64) and drive [`AppService`] through mock
//! port implementations, verifying the end-to-end contracts without any
//! real hardware.

use core::sync::atomic::{AtomicBool, Ordering};

use lumidim::app::events::AppEvent;
use lumidim::app::ports::{
    DimmerPort, EventSink, LightSensorPort, RendererPort, ReporterPort, ReportError,
    TraceGeometry,
};
use lumidim::app::service::{AppService, HISTORY_LEN};
use lumidim::config::SystemConfig;
use lumidim::drivers::touch::ToggleController;

// ── Mock adapters ─────────────────────────────────────────────

#[derive(Default)]
struct MockHardware {
    raw: u16,
    duties: Vec<u8>,
}

impl MockHardware {
    fn last_duty(&self) -> Option<u8> {
        self.duties.last().copied()
    }
}

impl LightSensorPort for MockHardware {
    fn read_raw(&mut self) -> u16 {
        self.raw
    }
}

impl DimmerPort for MockHardware {
    fn set_duty(&mut self, duty: u8) {
        self.duties.push(duty);
    }
}

#[derive(Default)]
struct RecordingRenderer {
    geometry: Option<TraceGeometry>,
    traces: Vec<Vec<u8>>,
}

impl RendererPort for RecordingRenderer {
    fn draw_static(&mut self, geometry: &TraceGeometry) {
        self.geometry = Some(*geometry);
    }

    fn draw_trace(&mut self, samples: &[u8]) {
        self.traces.push(samples.to_vec());
    }
}

#[derive(Default)]
struct RecordingReporter {
    reports: Vec<u8>,
}

impl ReporterPort for RecordingReporter {
    fn report(&mut self, duty: u8) -> Result<(), ReportError> {
        self.reports.push(duty);
        Ok(())
    }
}

#[derive(Default)]
struct RecordingSink {
    events: Vec<AppEvent>,
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(*event);
    }
}

// ── Harness ───────────────────────────────────────────────────

struct Loop {
    app: AppService,
    touch: &'static AtomicBool,
    hw: MockHardware,
    renderer: RecordingRenderer,
    reporter: RecordingReporter,
    sink: RecordingSink,
}

impl Loop {
    fn new(config: &SystemConfig) -> Self {
        let touch: &'static AtomicBool = Box::leak(Box::new(AtomicBool::new(false)));
        Self {
            app: AppService::new(config, 0, ToggleController::with_flag(touch)),
            touch,
            hw: MockHardware::default(),
            renderer: RecordingRenderer::default(),
            reporter: RecordingReporter::default(),
            sink: RecordingSink::default(),
        }
    }

    fn tick(&mut self, now_ms: u32) {
        self.app.tick(
            now_ms,
            &mut self.hw,
            &mut self.renderer,
            &mut self.reporter,
            &mut self.sink,
        );
    }

    fn press_touch(&mut self) {
        self.touch.store(true, Ordering::Release);
    }
}

fn default_loop() -> Loop {
    Loop::new(&SystemConfig::default())
}

// ── Scenario 1: calibrate on alternating extremes, then map ──

#[test]
fn alternating_calibration_yields_expected_envelope_and_mapping() {
    let mut l = default_loop();

    // 10 s window at a 10 ms tick, readings alternating 100 / 3000.
    for (i, t) in (0..10_000u32).step_by(10).enumerate() {
        l.hw.raw = if i % 2 == 0 { 100 } else { 3000 };
        l.tick(t);
    }
    assert!(l.app.range().is_none(), "window still open at 9 990 ms");
    assert!(l.hw.duties.is_empty(), "lamp untouched while calibrating");

    // First tick past the window freezes [100, 3000] and operates.
    l.hw.raw = 100;
    l.tick(10_010);
    let range = l.app.range().expect("envelope frozen");
    assert_eq!((range.min, range.max), (100, 3000));
    assert_eq!(l.hw.last_duty(), Some(255), "darkest ambient → full duty");

    l.hw.raw = 3000;
    l.tick(10_020);
    assert_eq!(l.hw.last_duty(), Some(0), "brightest ambient → zero duty");

    l.hw.raw = 1550;
    l.tick(10_030);
    let duty = l.hw.last_duty().unwrap();
    assert!((127..=128).contains(&duty), "midpoint maps near half, got {duty}");
}

// ── Scenario 2: disabled iteration ────────────────────────────

#[test]
fn disabled_iteration_darkens_lamp_and_skips_history_and_reports() {
    let mut l = default_loop();
    l.hw.raw = 500;
    l.tick(0);
    l.tick(10_010); // seals the (degenerate-free) envelope, operates once

    let reports_before = l.reporter.reports.len();
    let traces_before = l.renderer.traces.len();
    let samples_before = l
        .sink
        .events
        .iter()
        .filter(|e| matches!(e, AppEvent::Sample { .. }))
        .count();

    l.press_touch();
    l.hw.duties.clear();
    l.tick(10_020);

    assert!(!l.app.is_enabled());
    assert_eq!(l.hw.duties, vec![0], "output channel written 0 exactly once");
    assert_eq!(l.reporter.reports.len(), reports_before, "reporter not invoked");
    assert_eq!(l.renderer.traces.len(), traces_before, "no redraw");
    let samples_after = l
        .sink
        .events
        .iter()
        .filter(|e| matches!(e, AppEvent::Sample { .. }))
        .count();
    assert_eq!(samples_after, samples_before, "no sample appended");
}

#[test]
fn second_touch_reenables_the_lamp() {
    let mut l = default_loop();
    l.hw.raw = 500;
    l.tick(0);
    l.tick(10_010);

    l.press_touch();
    l.tick(10_020);
    assert!(!l.app.is_enabled());

    l.press_touch();
    l.tick(10_030);
    assert!(l.app.is_enabled());
    assert_ne!(l.hw.last_duty(), Some(0));
}

// ── Scenario 3: independent cadences ──────────────────────────

#[test]
fn report_and_display_cadences_fire_independently() {
    let mut config = SystemConfig::default();
    config.calibration_window_ms = 0;
    let mut l = Loop::new(&config);
    l.hw.raw = 500;

    let mut report_times = Vec::new();
    let mut display_times = Vec::new();

    // t=0 is the last calibrating tick (window boundary is inclusive);
    // operation starts at t=10.
    for t in (0..=3000u32).step_by(10) {
        let reports = l.reporter.reports.len();
        let traces = l.renderer.traces.len();
        l.tick(t);
        if l.reporter.reports.len() > reports {
            report_times.push(t);
        }
        if l.renderer.traces.len() > traces {
            display_times.push(t);
        }
    }

    // Reports every 1000 ms, displays every 100 ms, neither disturbing
    // the other.
    assert_eq!(report_times, vec![10, 1010, 2010]);
    let expected_displays: Vec<u32> = (0..30).map(|i| 10 + i * 100).collect();
    assert_eq!(display_times, expected_displays);
}

// ── Toggle semantics across arbitrary iteration gaps ──────────

#[test]
fn one_edge_one_flip_regardless_of_iteration_count() {
    let mut l = default_loop();
    l.hw.raw = 500;
    l.tick(0);
    l.tick(10_010);
    assert!(l.app.is_enabled());

    l.press_touch();
    // Many iterations after a single edge: exactly one flip.
    for t in 0..50u32 {
        l.tick(10_020 + t * 10);
    }
    let toggles: Vec<_> = l
        .sink
        .events
        .iter()
        .filter(|e| matches!(e, AppEvent::Toggled { .. }))
        .collect();
    assert_eq!(toggles.len(), 1);
    assert!(!l.app.is_enabled());
}

// ── History feeds the renderer in order ───────────────────────

#[test]
fn renderer_receives_full_ordered_history() {
    let mut config = SystemConfig::default();
    config.calibration_window_ms = 0;
    let mut l = Loop::new(&config);

    l.hw.raw = 500;
    l.tick(0); // last calibrating tick (boundary inclusive)
    // Seals a flat envelope (min = max = 500), so the mapped duty is the
    // neutral fallback; the display cadence is due on the same tick.
    l.tick(10);
    let trace = l.renderer.traces.last().expect("display due immediately");
    assert_eq!(trace.len(), HISTORY_LEN);
    // One appended neutral sample sits at the newest position.
    assert_eq!(*trace.last().unwrap(), 128);
    assert!(trace[..HISTORY_LEN - 1].iter().all(|&v| v == 0));
}

// ── Degenerate calibration falls back to neutral duty ─────────

#[test]
fn flat_calibration_drives_neutral_duty() {
    let mut l = default_loop();
    l.hw.raw = 1800;
    for t in (0..10_000u32).step_by(500) {
        l.tick(t);
    }
    l.tick(10_010);
    assert_eq!(l.hw.last_duty(), Some(128));
}
