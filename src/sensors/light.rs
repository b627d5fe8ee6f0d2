//! Ambient light sensor (photoresistor divider on ADC1).
//!
//! Raw readings live in the 12-bit domain 0–4095; the calibration window
//! learns the environment's actual envelope inside it.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads the oneshot ADC channel initialised by hw_init.
//! On host/test: reads from a static `AtomicU16` for injection.

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicU16, Ordering};

use log::warn;

use crate::error::SensorError;

/// Upper bound of the raw ADC domain.
pub const RAW_MAX: u16 = 4095;

#[cfg(not(target_os = "espidf"))]
static SIM_LIGHT_ADC: AtomicU16 = AtomicU16::new(0);

/// Inject a raw reading for host-side tests and simulation.
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_ambient_raw(raw: u16) {
    SIM_LIGHT_ADC.store(raw, Ordering::Relaxed);
}

pub struct LightSensor {
    /// Last good reading, returned when a read fails.
    last_raw: u16,
    _adc_gpio: i32,
}

impl LightSensor {
    pub fn new(adc_gpio: i32) -> Self {
        Self {
            last_raw: 0,
            _adc_gpio: adc_gpio,
        }
    }

    /// One raw reading.  A failed or out-of-domain read is logged and the
    /// previous good value is returned — a flaky sensor must not disturb
    /// the control loop.
    pub fn read(&mut self) -> u16 {
        match self.read_adc() {
            Ok(raw) if raw <= RAW_MAX => {
                self.last_raw = raw;
                raw
            }
            Ok(_) => {
                warn!("Light: {}", SensorError::OutOfRange);
                self.last_raw
            }
            Err(e) => {
                warn!("Light: {}", e);
                self.last_raw
            }
        }
    }

    #[cfg(target_os = "espidf")]
    fn read_adc(&self) -> Result<u16, crate::error::Error> {
        crate::drivers::hw_init::adc1_read()
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_adc(&self) -> Result<u16, crate::error::Error> {
        Ok(SIM_LIGHT_ADC.load(Ordering::Relaxed))
    }
}
