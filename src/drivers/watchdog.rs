//! Task Watchdog Timer (TWDT) driver.
//!
//! The control loop is designed to run indefinitely; if it ever stalls
//! the TWDT resets the device.  `feed()` must be called once per loop
//! iteration.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;
use log::info;
#[cfg(target_os = "espidf")]
use log::warn;

/// Loop stall budget before the device resets.
#[cfg(target_os = "espidf")]
const WATCHDOG_TIMEOUT_MS: u32 = 10_000;

pub struct Watchdog {
    #[cfg(target_os = "espidf")]
    subscribed: bool,
}

impl Watchdog {
    /// Initialise and subscribe the current task to the TWDT.
    #[cfg(target_os = "espidf")]
    pub fn new() -> Self {
        // SAFETY: TWDT calls are single-threaded at boot; the null task
        // handle subscribes the calling task.
        unsafe {
            let cfg = esp_task_wdt_config_t {
                timeout_ms: WATCHDOG_TIMEOUT_MS,
                idle_core_mask: 0,
                trigger_panic: true,
            };
            if esp_task_wdt_reconfigure(&cfg) != ESP_OK {
                warn!("Watchdog: reconfigure failed (may already be configured)");
            }

            let subscribed = esp_task_wdt_add(core::ptr::null_mut()) == ESP_OK;
            if subscribed {
                info!("Watchdog: armed ({} ms, panic on stall)", WATCHDOG_TIMEOUT_MS);
            } else {
                warn!("Watchdog: task subscribe failed");
            }
            Self { subscribed }
        }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new() -> Self {
        info!("Watchdog(sim): no-op");
        Self {}
    }

    /// Reset the stall budget.  Call once per loop iteration.
    pub fn feed(&self) {
        #[cfg(target_os = "espidf")]
        if self.subscribed {
            // SAFETY: only resets the calling task's TWDT entry.
            unsafe {
                esp_task_wdt_reset();
            }
        }
    }
}

impl Default for Watchdog {
    fn default() -> Self {
        Self::new()
    }
}
