//! Dimmable lamp output (LEDC PWM, 5 kHz / 8-bit).
//!
//! ## Dual-target design
//!
//! On ESP-IDF: writes the LEDC duty register via hw_init.
//! On host/test: tracks the commanded duty in-memory only.

use log::warn;

use crate::drivers::hw_init;

pub struct LampDimmer {
    current_duty: u8,
}

impl LampDimmer {
    pub fn new() -> Self {
        Self { current_duty: 0 }
    }

    /// Apply a duty value (0 = dark, 255 = full on).
    /// A failed register write keeps the previous duty and is logged;
    /// the control loop carries on.
    pub fn set_duty(&mut self, duty: u8) {
        match hw_init::ledc_set(duty) {
            Ok(()) => self.current_duty = duty,
            Err(e) => warn!("Lamp: duty write failed — {}", e),
        }
    }

    /// Last duty successfully applied.
    pub fn current_duty(&self) -> u8 {
        self.current_duty
    }
}

impl Default for LampDimmer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_last_applied_duty() {
        let mut lamp = LampDimmer::new();
        assert_eq!(lamp.current_duty(), 0);
        lamp.set_duty(200);
        assert_eq!(lamp.current_duty(), 200);
        lamp.set_duty(0);
        assert_eq!(lamp.current_duty(), 0);
    }
}
