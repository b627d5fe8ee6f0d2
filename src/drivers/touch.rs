//! Touch-sensitive lamp toggle.
//!
//! ## Hardware
//!
//! ESP32 capacitive touch pad with the hardware sensitivity threshold
//! doing the debouncing.  The ISR's only job is to record that an edge
//! happened: one atomic store, then return.  All real logic runs in the
//! main loop via [`ToggleController::poll`].
//!
//! ## Coalescing
//!
//! The pending flag is a single boolean, not a queue: a second edge
//! arriving before the loop consumes the first is lost.  For a
//! manually-operated control that is the intended behaviour — the lamp
//! flips once per perceived press.

use core::sync::atomic::{AtomicBool, Ordering};

use log::info;

#[cfg(target_os = "espidf")]
use crate::error::Error;
#[cfg(target_os = "espidf")]
use crate::pins;

/// Single-producer/single-consumer edge flag.
/// Written by the ISR (`Release`), swapped out by the loop (`Acquire`).
static TOUCH_PENDING: AtomicBool = AtomicBool::new(false);

/// ISR-side half: record the edge and return immediately.
/// Safe to call from interrupt context (lock-free atomic store).
pub fn touch_isr_handler() {
    TOUCH_PENDING.store(true, Ordering::Release);
}

// ───────────────────────────────────────────────────────────────
// Loop-side controller
// ───────────────────────────────────────────────────────────────

/// Consumes pending touch edges and owns the lamp enable flag.
pub struct ToggleController {
    pending: &'static AtomicBool,
    enabled: bool,
}

impl ToggleController {
    /// Controller bound to the global ISR flag (production wiring).
    pub fn new() -> Self {
        Self::with_flag(&TOUCH_PENDING)
    }

    /// Controller bound to a caller-supplied flag (test wiring).
    pub fn with_flag(pending: &'static AtomicBool) -> Self {
        Self {
            pending,
            enabled: true,
        }
    }

    /// Consume at most one pending edge.  Returns the new enable state
    /// when an edge was consumed, `None` otherwise.  Exactly one flip
    /// happens per detected edge, no matter how many loop iterations
    /// pass before consumption.
    pub fn poll(&mut self) -> Option<bool> {
        if self.pending.swap(false, Ordering::AcqRel) {
            self.enabled = !self.enabled;
            info!("Touch: lamp {}", if self.enabled { "enabled" } else { "disabled" });
            Some(self.enabled)
        } else {
            None
        }
    }

    /// Current enable state.  Initial state is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl Default for ToggleController {
    fn default() -> Self {
        Self::new()
    }
}

// ───────────────────────────────────────────────────────────────
// Peripheral registration (ESP-IDF only)
// ───────────────────────────────────────────────────────────────

/// Configure the touch pad and register the edge ISR.
/// `threshold` is the sensitivity in counts below the untouched baseline.
#[cfg(target_os = "espidf")]
pub fn install(threshold: u16) -> Result<(), Error> {
    use esp_idf_svc::sys::*;

    // SAFETY: called once from main() before the loop starts; the legacy
    // touch driver is single-init.
    unsafe {
        if touch_pad_init() != ESP_OK {
            return Err(Error::Init("touch pad init failed"));
        }
        touch_pad_set_fsm_mode(touch_fsm_mode_t_TOUCH_FSM_MODE_TIMER);
        if touch_pad_config(pins::TOUCH_PAD as touch_pad_t, threshold) != ESP_OK {
            return Err(Error::Init("touch pad config failed"));
        }
        if touch_pad_isr_register(Some(touch_isr_trampoline), core::ptr::null_mut()) != ESP_OK {
            return Err(Error::Init("touch ISR register failed"));
        }
        touch_pad_intr_enable();
    }
    info!("Touch: pad {} armed (threshold {})", pins::TOUCH_PAD, threshold);
    Ok(())
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn touch_isr_trampoline(_arg: *mut core::ffi::c_void) {
    // Clear the interrupt status so the pad does not retrigger, then
    // record the edge.  Nothing else may run in this context.
    unsafe {
        esp_idf_svc::sys::touch_pad_clear_status();
    }
    touch_isr_handler();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn isolated() -> (ToggleController, &'static AtomicBool) {
        let flag: &'static AtomicBool = Box::leak(Box::new(AtomicBool::new(false)));
        (ToggleController::with_flag(flag), flag)
    }

    #[test]
    fn starts_enabled() {
        let (toggle, _) = isolated();
        assert!(toggle.is_enabled());
    }

    #[test]
    fn no_flip_without_signal() {
        let (mut toggle, _) = isolated();
        for _ in 0..10 {
            assert_eq!(toggle.poll(), None);
        }
        assert!(toggle.is_enabled());
    }

    #[test]
    fn exactly_one_flip_per_edge() {
        let (mut toggle, flag) = isolated();
        flag.store(true, Ordering::Release);
        // Several loop iterations may pass before and after consumption;
        // the edge still produces exactly one flip.
        assert_eq!(toggle.poll(), Some(false));
        assert_eq!(toggle.poll(), None);
        assert_eq!(toggle.poll(), None);
        assert!(!toggle.is_enabled());
    }

    #[test]
    fn edges_before_consumption_coalesce() {
        let (mut toggle, flag) = isolated();
        flag.store(true, Ordering::Release);
        flag.store(true, Ordering::Release);
        assert_eq!(toggle.poll(), Some(false));
        assert_eq!(toggle.poll(), None);
    }

    #[test]
    fn alternating_edges_alternate_state() {
        let (mut toggle, flag) = isolated();
        for expected in [false, true, false, true] {
            flag.store(true, Ordering::Release);
            assert_eq!(toggle.poll(), Some(expected));
        }
    }

    #[test]
    fn global_isr_handler_sets_global_flag() {
        // Uses the real ISR entry point against the global flag.
        TOUCH_PENDING.store(false, Ordering::SeqCst);
        let mut toggle = ToggleController::new();
        touch_isr_handler();
        assert_eq!(toggle.poll(), Some(false));
    }
}
