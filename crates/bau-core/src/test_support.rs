//! In-memory panel for renderer tests

use alloc::vec;
use alloc::vec::Vec;

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

use crate::display::Panel;
use crate::ui::{DISPLAY_HEIGHT_PX, DISPLAY_WIDTH_PX};

/// Bus error reported while `MockPanel::failing` is set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelFault;

pub struct MockPanel {
    pub ready: bool,
    pub blanked: bool,
    /// Reject every transfer with [`PanelFault`] while set
    pub failing: bool,
    /// Number of accepted `fill_contiguous` calls (one per framebuffer flush)
    pub flushes: usize,
    pixels: Vec<Option<Rgb565>>,
}

impl MockPanel {
    pub fn new() -> Self {
        Self {
            ready: true,
            blanked: true,
            failing: false,
            flushes: 0,
            pixels: vec![None; DISPLAY_WIDTH_PX as usize * DISPLAY_HEIGHT_PX as usize],
        }
    }

    pub fn not_ready() -> Self {
        Self {
            ready: false,
            ..Self::new()
        }
    }

    pub fn pixel(&self, point: Point) -> Option<Rgb565> {
        let (x, y) = (point.x as usize, point.y as usize);
        self.pixels
            .get(y * DISPLAY_WIDTH_PX as usize + x)
            .copied()
            .flatten()
    }
}

impl OriginDimensions for MockPanel {
    fn size(&self) -> Size {
        Size::new(DISPLAY_WIDTH_PX as u32, DISPLAY_HEIGHT_PX as u32)
    }
}

impl DrawTarget for MockPanel {
    type Color = Rgb565;
    type Error = PanelFault;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        if self.failing {
            return Err(PanelFault);
        }
        let width = DISPLAY_WIDTH_PX as i32;
        let height = DISPLAY_HEIGHT_PX as i32;
        for Pixel(p, color) in pixels {
            if (0..width).contains(&p.x) && (0..height).contains(&p.y) {
                self.pixels[(p.y * width + p.x) as usize] = Some(color);
            }
        }
        Ok(())
    }

    fn fill_contiguous<I>(&mut self, area: &Rectangle, colors: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Self::Color>,
    {
        if self.failing {
            return Err(PanelFault);
        }
        self.flushes += 1;
        self.draw_iter(
            area.points()
                .zip(colors)
                .map(|(pos, color)| Pixel(pos, color)),
        )
    }
}

impl Panel for MockPanel {
    fn is_ready(&self) -> bool {
        self.ready
    }

    fn set_blanking(&mut self, blank: bool) -> Result<(), Self::Error> {
        if self.failing {
            return Err(PanelFault);
        }
        self.blanked = blank;
        Ok(())
    }
}
