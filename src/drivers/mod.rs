//! Hardware drivers: peripheral init, lamp PWM output, touch toggle,
//! display panel, and the task watchdog.
//!
//! Every driver is dual-target: real ESP-IDF calls under
//! `#[cfg(target_os = "espidf")]`, in-memory simulation otherwise so the
//! whole crate builds and tests on the host.

pub mod dimmer;
pub mod display;
pub mod hw_init;
pub mod touch;
pub mod watchdog;
