//! Hardware adapter — bridges real peripherals to domain port traits.
//!
//! Owns the light sensor and the lamp dimmer, exposing them through
//! [`LightSensorPort`] and [`DimmerPort`].  On non-espidf targets the
//! underlying drivers use cfg-gated simulation stubs.

use crate::app::ports::{DimmerPort, LightSensorPort};
use crate::drivers::dimmer::LampDimmer;
use crate::sensors::light::LightSensor;

/// Concrete adapter that combines the board's I/O behind port traits.
pub struct HardwareAdapter {
    light: LightSensor,
    lamp: LampDimmer,
}

impl HardwareAdapter {
    pub fn new(light: LightSensor, lamp: LampDimmer) -> Self {
        Self { light, lamp }
    }

    /// Last duty actually applied to the lamp.
    pub fn lamp_duty(&self) -> u8 {
        self.lamp.current_duty()
    }
}

impl LightSensorPort for HardwareAdapter {
    fn read_raw(&mut self) -> u16 {
        self.light.read()
    }
}

impl DimmerPort for HardwareAdapter {
    fn set_duty(&mut self, duty: u8) {
        self.lamp.set_duty(duty);
    }
}
