//! Brightness trace renderer.
//!
//! Implements [`RendererPort`] by drawing onto the RGB565 framebuffer and
//! flushing it to the panel.  The domain core only hands over geometry
//! (once) and the ordered sample sequence (each display tick) — every
//! pixel decision lives here.
//!
//! Layout mirrors the reference UI: white frame around the trace region,
//! "255"/"0" duty labels on the Y axis, "Time" on the X axis, and a green
//! one-pixel polyline for the trace itself.

use embedded_graphics::mono_font::ascii::FONT_6X10;
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Line, PrimitiveStyle, Rectangle};
use embedded_graphics::text::Text;
use log::warn;

use crate::app::ports::{RendererPort, TraceGeometry};
use crate::brightness::DUTY_MAX;
use crate::drivers::display::{DisplayPanel, FrameBuffer};

const COLOUR_BG: Rgb565 = Rgb565::BLACK;
const COLOUR_FRAME: Rgb565 = Rgb565::WHITE;
const COLOUR_TRACE: Rgb565 = Rgb565::GREEN;

pub struct TraceRenderer {
    fb: FrameBuffer,
    panel: DisplayPanel,
    /// Captured from `draw_static`; trace redraws need the same region.
    geometry: Option<TraceGeometry>,
}

impl TraceRenderer {
    pub fn new(panel: DisplayPanel) -> Self {
        Self {
            fb: FrameBuffer::new(),
            panel,
            geometry: None,
        }
    }

    /// Framebuffer access for host-side assertions.
    pub fn framebuffer(&self) -> &FrameBuffer {
        &self.fb
    }

    /// Frame border plus axis labels.  Redrawn with every trace update
    /// because the labels sit inside the cleared region.
    fn draw_frame(&mut self, g: &TraceGeometry) {
        let _ = Rectangle::new(
            Point::new(g.origin_x, g.origin_y),
            Size::new(g.width, g.height),
        )
        .into_styled(PrimitiveStyle::with_stroke(COLOUR_FRAME, 1))
        .draw(&mut self.fb);

        let label = MonoTextStyle::new(&FONT_6X10, COLOUR_FRAME);
        let x = g.origin_x;
        let y = g.origin_y;
        let w = g.width as i32;
        let h = g.height as i32;
        let _ = Text::new("255", Point::new(x + 3, y + 12), label).draw(&mut self.fb);
        let _ = Text::new("0", Point::new(x + 3, y + h - 4), label).draw(&mut self.fb);
        let _ = Text::new("Time", Point::new(x + w / 2 - 12, y + h - 4), label).draw(&mut self.fb);
        let _ = Text::new("Brightness", Point::new(x + w / 2 - 30, y + 12), label)
            .draw(&mut self.fb);
    }

    /// Screen Y for a duty value: 0 sits on the bottom edge, 255 on top.
    fn duty_to_y(g: &TraceGeometry, duty: u8) -> i32 {
        g.origin_y + g.height as i32 - i32::from(duty) * g.height as i32 / i32::from(DUTY_MAX)
    }
}

impl RendererPort for TraceRenderer {
    fn draw_static(&mut self, geometry: &TraceGeometry) {
        self.geometry = Some(*geometry);
        let _ = self.fb.clear(COLOUR_BG);
        self.draw_frame(geometry);
        self.panel.flush(&self.fb);
    }

    fn draw_trace(&mut self, samples: &[u8]) {
        let Some(g) = self.geometry else {
            warn!("Renderer: draw_trace before draw_static");
            return;
        };

        // Clear the interior, keep the one-pixel border.
        let _ = Rectangle::new(
            Point::new(g.origin_x + 1, g.origin_y + 1),
            Size::new(g.width.saturating_sub(2), g.height.saturating_sub(2)),
        )
        .into_styled(PrimitiveStyle::with_fill(COLOUR_BG))
        .draw(&mut self.fb);
        self.draw_frame(&g);

        // One sample per column, oldest on the left.
        let columns = samples.len().min(g.width as usize);
        let style = PrimitiveStyle::with_stroke(COLOUR_TRACE, 1);
        for i in 0..columns.saturating_sub(1) {
            let x = g.origin_x + i as i32;
            let y1 = Self::duty_to_y(&g, samples[i]);
            let y2 = Self::duty_to_y(&g, samples[i + 1]);
            let _ = Line::new(Point::new(x, y1), Point::new(x + 1, y2))
                .into_styled(style)
                .draw(&mut self.fb);
        }

        self.panel.flush(&self.fb);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::service::TRACE_REGION;
    use embedded_graphics::pixelcolor::raw::RawU16;

    fn raw(colour: Rgb565) -> u16 {
        RawU16::from(colour).into_inner()
    }

    fn renderer() -> TraceRenderer {
        let mut r = TraceRenderer::new(DisplayPanel::new().unwrap());
        r.draw_static(&TRACE_REGION);
        r
    }

    #[test]
    fn static_frame_draws_border() {
        let r = renderer();
        assert_eq!(r.framebuffer().pixel(0, 0), raw(COLOUR_FRAME));
        assert_eq!(r.framebuffer().pixel(239, 0), raw(COLOUR_FRAME));
        assert_eq!(r.framebuffer().pixel(0, 129), raw(COLOUR_FRAME));
    }

    #[test]
    fn flat_trace_lands_on_expected_row() {
        let mut r = renderer();
        let samples = [128u8; 240];
        r.draw_trace(&samples);
        // duty 128 → y = 130 - 128*130/255 = 65
        assert_eq!(r.framebuffer().pixel(10, 65), raw(COLOUR_TRACE));
        assert_eq!(r.framebuffer().pixel(200, 65), raw(COLOUR_TRACE));
    }

    #[test]
    fn trace_redraw_clears_previous_trace() {
        let mut r = renderer();
        r.draw_trace(&[128u8; 240]);
        r.draw_trace(&[0u8; 240]);
        assert_eq!(r.framebuffer().pixel(10, 65), raw(COLOUR_BG));
    }

    #[test]
    fn trace_before_static_is_ignored() {
        let mut r = TraceRenderer::new(DisplayPanel::new().unwrap());
        r.draw_trace(&[10u8; 240]);
        assert_eq!(r.framebuffer().pixel(0, 0), 0);
    }
}
