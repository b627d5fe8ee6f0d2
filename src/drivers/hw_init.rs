//! One-shot hardware peripheral initialization.
//!
//! Configures the ambient-light ADC channel and the lamp LEDC PWM
//! timer/channel using raw ESP-IDF sys calls.  Called once from `main()`
//! before the control loop starts.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;
use log::info;

use crate::error::Error;
#[cfg(target_os = "espidf")]
use crate::error::{ActuatorError, SensorError};
#[cfg(target_os = "espidf")]
use crate::pins;

/// LEDC channel driving the lamp.
#[cfg(target_os = "espidf")]
const LEDC_CH_LAMP: ledc_channel_t = ledc_channel_t_LEDC_CHANNEL_0;

#[cfg(target_os = "espidf")]
pub fn init_peripherals() -> Result<(), Error> {
    // SAFETY: called once from main() before the control loop;
    // single-threaded at this point.
    unsafe {
        init_adc()?;
        init_ledc()?;
    }
    info!("hw_init: ADC + LEDC configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals() -> Result<(), Error> {
    info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

// ── ADC (oneshot) ─────────────────────────────────────────────

#[cfg(target_os = "espidf")]
static mut ADC1_HANDLE: adc_oneshot_unit_handle_t = core::ptr::null_mut();

#[cfg(target_os = "espidf")]
unsafe fn init_adc() -> Result<(), Error> {
    let init_cfg = adc_oneshot_unit_init_cfg_t {
        unit_id: adc_unit_t_ADC_UNIT_1,
        ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
        ..Default::default()
    };
    // SAFETY: ADC1_HANDLE is only written here, once at boot.
    let ret = unsafe { adc_oneshot_new_unit(&init_cfg, &raw mut ADC1_HANDLE) };
    if ret != ESP_OK {
        return Err(Error::Init("ADC1 unit init failed"));
    }

    // 11 dB attenuation: full 0 – 3.1 V photoresistor divider range.
    let chan_cfg = adc_oneshot_chan_cfg_t {
        atten: adc_atten_t_ADC_ATTEN_DB_11,
        bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
    };
    let ret = unsafe {
        adc_oneshot_config_channel(
            ADC1_HANDLE,
            pins::LIGHT_ADC_CHANNEL as adc_channel_t,
            &chan_cfg,
        )
    };
    if ret != ESP_OK {
        return Err(Error::Init("ADC1 channel config failed"));
    }
    Ok(())
}

/// One raw reading from the ambient-light channel (0 – 4095).
#[cfg(target_os = "espidf")]
pub fn adc1_read() -> Result<u16, Error> {
    let mut raw: i32 = 0;
    // SAFETY: ADC1_HANDLE was initialised in init_adc(); reads happen
    // only from the single loop context.
    let ret = unsafe {
        adc_oneshot_read(
            ADC1_HANDLE,
            pins::LIGHT_ADC_CHANNEL as adc_channel_t,
            &raw mut raw,
        )
    };
    if ret != ESP_OK {
        return Err(SensorError::AdcReadFailed.into());
    }
    Ok(raw as u16)
}

// ── LEDC (lamp PWM) ───────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_ledc() -> Result<(), Error> {
    let timer_cfg = ledc_timer_config_t {
        speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
        duty_resolution: ledc_timer_bit_t_LEDC_TIMER_8_BIT,
        timer_num: ledc_timer_t_LEDC_TIMER_0,
        freq_hz: pins::LAMP_PWM_FREQ_HZ,
        clk_cfg: ledc_clk_cfg_t_LEDC_AUTO_CLK,
        ..Default::default()
    };
    if unsafe { ledc_timer_config(&timer_cfg) } != ESP_OK {
        return Err(Error::Init("LEDC timer config failed"));
    }

    let channel_cfg = ledc_channel_config_t {
        gpio_num: pins::LAMP_PWM_GPIO,
        speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
        channel: LEDC_CH_LAMP,
        intr_type: ledc_intr_type_t_LEDC_INTR_DISABLE,
        timer_sel: ledc_timer_t_LEDC_TIMER_0,
        duty: 0,
        hpoint: 0,
        ..Default::default()
    };
    if unsafe { ledc_channel_config(&channel_cfg) } != ESP_OK {
        return Err(Error::Init("LEDC channel config failed"));
    }
    Ok(())
}

/// Write an 8-bit duty to the lamp channel.
#[cfg(target_os = "espidf")]
pub fn ledc_set(duty: u8) -> Result<(), Error> {
    // SAFETY: LEDC was configured in init_ledc(); duty writes happen
    // only from the single loop context.
    unsafe {
        if ledc_set_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, LEDC_CH_LAMP, u32::from(duty)) != ESP_OK
            || ledc_update_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, LEDC_CH_LAMP) != ESP_OK
        {
            return Err(ActuatorError::PwmWriteFailed.into());
        }
    }
    Ok(())
}

/// Host stub: duty writes are tracked by the dimmer driver itself.
#[cfg(not(target_os = "espidf"))]
pub fn ledc_set(_duty: u8) -> Result<(), Error> {
    Ok(())
}
