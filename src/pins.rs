//! GPIO / peripheral pin assignments for the lumidim board.
//!
//! Single source of truth — every driver references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.

// ---------------------------------------------------------------------------
// Lamp output (LEDC PWM)
// ---------------------------------------------------------------------------

/// LEDC PWM channel output for the dimmable lamp.
pub const LAMP_PWM_GPIO: i32 = 26;
/// LEDC base frequency for the lamp channel (5 kHz — flicker-free, silent).
pub const LAMP_PWM_FREQ_HZ: u32 = 5_000;
/// LEDC timer resolution (bits).  8-bit gives 0 – 255 duty levels.
pub const PWM_RESOLUTION_BITS: u32 = 8;

// ---------------------------------------------------------------------------
// Ambient light sensor (ADC1)
// ---------------------------------------------------------------------------

/// Photoresistor divider output.  GPIO 33 = ADC1 channel 5 on ESP32.
pub const LIGHT_ADC_GPIO: i32 = 33;
/// ADC1 channel index for GPIO 33.
pub const LIGHT_ADC_CHANNEL: u32 = 5;

// ---------------------------------------------------------------------------
// Touch toggle input
// ---------------------------------------------------------------------------

/// Capacitive touch input.  GPIO 2 = touch pad 2 on ESP32.
pub const TOUCH_GPIO: i32 = 2;
/// Touch pad index for GPIO 2.
pub const TOUCH_PAD: u32 = 2;

// ---------------------------------------------------------------------------
// ST7789 display (SPI) — TTGO T-Display wiring
// ---------------------------------------------------------------------------

pub const DISPLAY_SPI_MOSI_GPIO: i32 = 19;
pub const DISPLAY_SPI_SCLK_GPIO: i32 = 18;
pub const DISPLAY_SPI_CS_GPIO: i32 = 5;
pub const DISPLAY_DC_GPIO: i32 = 16;
pub const DISPLAY_RST_GPIO: i32 = 23;
pub const DISPLAY_BACKLIGHT_GPIO: i32 = 4;
