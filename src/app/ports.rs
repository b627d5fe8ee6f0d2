//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (sensor, lamp output, renderer, reporter, event sinks)
//! implement these traits.  The [`AppService`](super::service::AppService)
//! consumes them via generics, so the domain core never touches hardware
//! directly.

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this to sample ambient light.
pub trait LightSensorPort {
    /// One raw ADC reading in the sensor's fixed domain (0–4095).
    fn read_raw(&mut self) -> u16;
}

// ───────────────────────────────────────────────────────────────
// Lamp output port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the domain calls this to drive the lamp.
pub trait DimmerPort {
    /// Apply a PWM duty value (0 = dark, 255 = full on).
    fn set_duty(&mut self, duty: u8);
}

// ───────────────────────────────────────────────────────────────
// Renderer port (driven adapter: domain → display)
// ───────────────────────────────────────────────────────────────

/// Placement and capacity of the brightness trace on the display.
///
/// Handed to the renderer exactly once at startup so it can draw the
/// static frame; the per-tick redraw only receives the ordered samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceGeometry {
    pub origin_x: i32,
    pub origin_y: i32,
    pub width: u32,
    pub height: u32,
    /// Number of samples in one full trace (equals the history capacity).
    pub capacity: usize,
}

/// The domain hands the renderer an ordered value sequence; everything
/// about pixels is the adapter's concern.
pub trait RendererPort {
    /// Draw the static frame (border, axis labels).  Called once.
    fn draw_static(&mut self, geometry: &TraceGeometry);

    /// Redraw the trace from `samples`, ordered oldest→newest.
    fn draw_trace(&mut self, samples: &[u8]);
}

// ───────────────────────────────────────────────────────────────
// Reporter port (driven adapter: domain → telemetry collector)
// ───────────────────────────────────────────────────────────────

/// Failures from [`ReporterPort::report`].  Advisory only — the caller
/// logs them and moves on; there is no retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportError {
    /// The network link is down; no transmission was attempted.
    LinkDown,
    /// The hand-off queue to the report worker is full; value dropped.
    QueueFull,
    /// The report worker has shut down.
    WorkerGone,
    /// Could not reach the collector endpoint.
    ConnectFailed,
    /// The request was sent but failed or timed out.
    RequestFailed,
}

impl core::fmt::Display for ReportError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::LinkDown => write!(f, "link down, report skipped"),
            Self::QueueFull => write!(f, "report queue full, value dropped"),
            Self::WorkerGone => write!(f, "report worker gone"),
            Self::ConnectFailed => write!(f, "could not connect to collector"),
            Self::RequestFailed => write!(f, "report request failed"),
        }
    }
}

/// Fire-and-forget brightness telemetry.
pub trait ReporterPort {
    /// Hand off one duty value for transmission.  Loss is acceptable.
    fn report(&mut self, duty: u8) -> Result<(), ReportError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go (serial log, a
/// future MQTT channel, etc.).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
