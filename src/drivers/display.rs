//! ST7789 display: RGB565 framebuffer + panel flush.
//!
//! Split in two so rendering stays hardware-free:
//!
//! - [`FrameBuffer`] implements `embedded_graphics::DrawTarget` over a
//!   plain RGB565 pixel array — renderers draw into it on any target.
//! - [`DisplayPanel`] pushes the finished framebuffer to the panel:
//!   esp_lcd over SPI on ESP-IDF, a no-op on the host.
//!
//! Panel geometry matches the TTGO T-Display (240×135, landscape).

use embedded_graphics::pixelcolor::raw::RawU16;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use log::info;
#[cfg(target_os = "espidf")]
use log::warn;

use crate::error::Error;
#[cfg(target_os = "espidf")]
use crate::pins;

pub const DISPLAY_WIDTH: u32 = 240;
pub const DISPLAY_HEIGHT: u32 = 135;

// ───────────────────────────────────────────────────────────────
// Framebuffer
// ───────────────────────────────────────────────────────────────

/// Row-major RGB565 framebuffer covering the whole panel.
pub struct FrameBuffer {
    pixels: Vec<u16>,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self {
            pixels: vec![0; (DISPLAY_WIDTH * DISPLAY_HEIGHT) as usize],
        }
    }

    /// Raw pixel data, row-major.
    pub fn data(&self) -> &[u16] {
        &self.pixels
    }

    /// One pixel, for assertions in tests.
    pub fn pixel(&self, x: u32, y: u32) -> u16 {
        self.pixels[(y * DISPLAY_WIDTH + x) as usize]
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl OriginDimensions for FrameBuffer {
    fn size(&self) -> Size {
        Size::new(DISPLAY_WIDTH, DISPLAY_HEIGHT)
    }
}

impl DrawTarget for FrameBuffer {
    type Color = Rgb565;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if (0..DISPLAY_WIDTH as i32).contains(&point.x)
                && (0..DISPLAY_HEIGHT as i32).contains(&point.y)
            {
                let idx = point.y as u32 * DISPLAY_WIDTH + point.x as u32;
                self.pixels[idx as usize] = RawU16::from(color).into_inner();
            }
        }
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// Panel
// ───────────────────────────────────────────────────────────────

/// The physical panel behind the framebuffer.
pub struct DisplayPanel {
    #[cfg(target_os = "espidf")]
    panel: esp_idf_svc::sys::esp_lcd_panel_handle_t,
}

#[cfg(target_os = "espidf")]
impl DisplayPanel {
    /// Bring up the SPI bus, the panel IO and the ST7789 itself.
    pub fn new() -> Result<Self, Error> {
        use esp_idf_svc::sys::*;

        // SAFETY: called once from main() before the loop; the SPI bus and
        // panel handles are owned by this struct for the process lifetime.
        unsafe {
            let bus_cfg = spi_bus_config_t {
                __bindgen_anon_1: spi_bus_config_t__bindgen_ty_1 {
                    mosi_io_num: pins::DISPLAY_SPI_MOSI_GPIO,
                },
                __bindgen_anon_2: spi_bus_config_t__bindgen_ty_2 { miso_io_num: -1 },
                sclk_io_num: pins::DISPLAY_SPI_SCLK_GPIO,
                __bindgen_anon_3: spi_bus_config_t__bindgen_ty_3 { quadwp_io_num: -1 },
                __bindgen_anon_4: spi_bus_config_t__bindgen_ty_4 { quadhd_io_num: -1 },
                max_transfer_sz: (DISPLAY_WIDTH * DISPLAY_HEIGHT * 2) as i32,
                ..Default::default()
            };
            if spi_bus_initialize(
                spi_host_device_t_SPI2_HOST,
                &bus_cfg,
                spi_common_dma_t_SPI_DMA_CH_AUTO,
            ) != ESP_OK
            {
                return Err(Error::Init("SPI bus init failed"));
            }

            let io_cfg = esp_lcd_panel_io_spi_config_t {
                cs_gpio_num: pins::DISPLAY_SPI_CS_GPIO,
                dc_gpio_num: pins::DISPLAY_DC_GPIO,
                spi_mode: 0,
                pclk_hz: 26_000_000,
                trans_queue_depth: 10,
                lcd_cmd_bits: 8,
                lcd_param_bits: 8,
                ..Default::default()
            };
            let mut io: esp_lcd_panel_io_handle_t = core::ptr::null_mut();
            if esp_lcd_new_panel_io_spi(
                spi_host_device_t_SPI2_HOST as usize as esp_lcd_spi_bus_handle_t,
                &io_cfg,
                &mut io,
            ) != ESP_OK
            {
                return Err(Error::Init("LCD panel IO init failed"));
            }

            let dev_cfg = esp_lcd_panel_dev_config_t {
                reset_gpio_num: pins::DISPLAY_RST_GPIO,
                bits_per_pixel: 16,
                ..Default::default()
            };
            let mut panel: esp_lcd_panel_handle_t = core::ptr::null_mut();
            if esp_lcd_new_panel_st7789(io, &dev_cfg, &mut panel) != ESP_OK {
                return Err(Error::Init("ST7789 panel init failed"));
            }

            esp_lcd_panel_reset(panel);
            esp_lcd_panel_init(panel);
            // Landscape with the T-Display's 240×135 window offset.
            esp_lcd_panel_swap_xy(panel, true);
            esp_lcd_panel_mirror(panel, false, true);
            esp_lcd_panel_set_gap(panel, 40, 53);
            esp_lcd_panel_invert_color(panel, true);
            esp_lcd_panel_disp_on_off(panel, true);

            // Backlight on.
            gpio_set_direction(
                pins::DISPLAY_BACKLIGHT_GPIO,
                gpio_mode_t_GPIO_MODE_OUTPUT,
            );
            gpio_set_level(pins::DISPLAY_BACKLIGHT_GPIO, 1);

            info!("Display: ST7789 up ({}x{})", DISPLAY_WIDTH, DISPLAY_HEIGHT);
            Ok(Self { panel })
        }
    }

    /// Push the full framebuffer to the panel.
    pub fn flush(&mut self, fb: &FrameBuffer) {
        use esp_idf_svc::sys::*;

        // SAFETY: panel handle valid for the process lifetime; the buffer
        // outlives the (blocking) draw call.
        let ret = unsafe {
            esp_lcd_panel_draw_bitmap(
                self.panel,
                0,
                0,
                DISPLAY_WIDTH as i32,
                DISPLAY_HEIGHT as i32,
                fb.data().as_ptr().cast(),
            )
        };
        if ret != ESP_OK {
            warn!("Display: flush failed (rc={})", ret);
        }
    }
}

#[cfg(not(target_os = "espidf"))]
impl DisplayPanel {
    pub fn new() -> Result<Self, Error> {
        info!("Display(sim): no panel attached");
        Ok(Self {})
    }

    pub fn flush(&mut self, _fb: &FrameBuffer) {}
}
