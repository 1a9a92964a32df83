//! RAM framebuffer with per-pixel change detection.
//!
//! The QR view is drawn into this buffer instead of the panel. After drawing,
//! only the rectangle containing changed pixels is flushed to the panel in a
//! single `fill_contiguous` call, so re-rendering an unchanged payload costs
//! no bus traffic at all.

use alloc::vec;
use alloc::vec::Vec;
use core::convert::Infallible;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use log::debug;

/// Bounding box of pixels that have changed since the last flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DirtyRect {
    min_x: usize,
    min_y: usize,
    max_x: usize,
    max_y: usize,
}

impl DirtyRect {
    /// Expand the dirty region to include the given pixel coordinate.
    fn expand(&mut self, x: usize, y: usize) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    /// Create a new dirty rect covering a single pixel.
    fn from_point(x: usize, y: usize) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x,
            max_y: y,
        }
    }

    fn to_rectangle(self) -> Rectangle {
        Rectangle::new(
            Point::new(self.min_x as i32, self.min_y as i32),
            Size::new(
                (self.max_x - self.min_x + 1) as u32,
                (self.max_y - self.min_y + 1) as u32,
            ),
        )
    }
}

/// Heap framebuffer implementing `DrawTarget<Color = Rgb565>`.
///
/// A 320x240 panel needs 153,600 bytes, which on the ESP32-S3 lands in PSRAM
/// via the global allocator.
pub struct FrameBuffer {
    width: usize,
    height: usize,
    pixels: Vec<Rgb565>,
    dirty: Option<DirtyRect>,
}

impl FrameBuffer {
    /// Allocate a framebuffer filled with `background`.
    ///
    /// The whole area starts dirty so the first flush paints every pixel.
    pub fn new(size: Size, background: Rgb565) -> Self {
        let width = size.width as usize;
        let height = size.height as usize;

        let mut frame = Self {
            width,
            height,
            pixels: vec![background; width * height],
            dirty: None,
        };
        frame.invalidate();
        frame
    }

    /// Mark every pixel dirty, e.g. after the panel lost its contents.
    pub fn invalidate(&mut self) {
        if self.width > 0 && self.height > 0 {
            self.dirty = Some(DirtyRect {
                min_x: 0,
                min_y: 0,
                max_x: self.width - 1,
                max_y: self.height - 1,
            });
        }
    }

    /// Area that the next flush will send, if any.
    pub fn dirty_area(&self) -> Option<Rectangle> {
        self.dirty.map(DirtyRect::to_rectangle)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.is_some()
    }

    pub fn pixel(&self, point: Point) -> Option<Rgb565> {
        let (x, y) = self.index_of(point)?;
        Some(self.pixels[y * self.width + x])
    }

    fn index_of(&self, point: Point) -> Option<(usize, usize)> {
        let x = usize::try_from(point.x).ok()?;
        let y = usize::try_from(point.y).ok()?;
        (x < self.width && y < self.height).then_some((x, y))
    }

    /// Write a single pixel, expanding the dirty rect only if the color changed.
    #[inline]
    fn set_pixel(&mut self, x: usize, y: usize, color: Rgb565) {
        let idx = y * self.width + x;
        if self.pixels[idx] != color {
            self.pixels[idx] = color;
            match &mut self.dirty {
                Some(rect) => rect.expand(x, y),
                None => self.dirty = Some(DirtyRect::from_point(x, y)),
            }
        }
    }

    /// Flush the dirty region to the panel, then reset the dirty state.
    ///
    /// Returns whether anything was sent. If nothing changed, this is a no-op.
    /// On a panel error the region stays dirty so the next flush resends it.
    pub fn flush<D>(&mut self, display: &mut D) -> Result<bool, D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        let Some(rect) = self.dirty.take() else {
            return Ok(false);
        };

        let area = rect.to_rectangle();
        debug!(
            "Flushing {}x{} dirty region at ({}, {})",
            area.size.width, area.size.height, rect.min_x, rect.min_y
        );

        let pixels = &self.pixels;
        let stride = self.width;
        let row_len = area.size.width as usize;
        let pixel_iter = (rect.min_y..=rect.max_y).flat_map(move |y| {
            let row_start = y * stride + rect.min_x;
            pixels[row_start..row_start + row_len].iter().copied()
        });

        if let Err(e) = display.fill_contiguous(&area, pixel_iter) {
            self.dirty = Some(rect);
            return Err(e);
        }
        Ok(true)
    }
}

impl OriginDimensions for FrameBuffer {
    fn size(&self) -> Size {
        Size::new(self.width as u32, self.height as u32)
    }
}

impl DrawTarget for FrameBuffer {
    type Color = Rgb565;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(coord, color) in pixels {
            if let Some((x, y)) = self.index_of(coord) {
                self.set_pixel(x, y, color);
            }
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let area = area.intersection(&self.bounding_box());
        let Some(bottom_right) = area.bottom_right() else {
            return Ok(());
        };

        for y in area.top_left.y..=bottom_right.y {
            for x in area.top_left.x..=bottom_right.x {
                self.set_pixel(x as usize, y as usize, color);
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        for y in 0..self.height {
            for x in 0..self.width {
                self.set_pixel(x, y, color);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::mock_display::MockDisplay;

    fn small() -> FrameBuffer {
        let mut fb = FrameBuffer::new(Size::new(8, 8), Rgb565::WHITE);
        // Drop the initial full-screen dirty state
        fb.dirty = None;
        fb
    }

    #[test]
    fn test_new_buffer_is_fully_dirty() {
        let fb = FrameBuffer::new(Size::new(8, 4), Rgb565::WHITE);
        assert_eq!(
            fb.dirty_area(),
            Some(Rectangle::new(Point::zero(), Size::new(8, 4)))
        );
    }

    #[test]
    fn test_invalidate_covers_whole_buffer() {
        let mut fb = small();
        fb.invalidate();
        assert_eq!(
            fb.dirty_area(),
            Some(Rectangle::new(Point::zero(), Size::new(8, 8)))
        );
    }

    #[test]
    fn test_unchanged_pixels_stay_clean() {
        let mut fb = small();
        fb.fill_solid(&Rectangle::new(Point::zero(), Size::new(8, 8)), Rgb565::WHITE)
            .unwrap();
        assert!(!fb.is_dirty());
    }

    #[test]
    fn test_dirty_rect_bounds_changed_pixels() {
        let mut fb = small();
        fb.fill_solid(&Rectangle::new(Point::new(2, 3), Size::new(2, 2)), Rgb565::BLACK)
            .unwrap();
        Pixel(Point::new(6, 1), Rgb565::BLACK).draw(&mut fb).unwrap();

        assert_eq!(
            fb.dirty_area(),
            Some(Rectangle::new(Point::new(2, 1), Size::new(5, 4)))
        );
        assert_eq!(fb.pixel(Point::new(3, 4)), Some(Rgb565::BLACK));
        assert_eq!(fb.pixel(Point::new(8, 0)), None);
    }

    #[test]
    fn test_out_of_bounds_fill_is_clipped() {
        let mut fb = small();
        fb.fill_solid(&Rectangle::new(Point::new(-4, 6), Size::new(6, 10)), Rgb565::RED)
            .unwrap();
        assert_eq!(
            fb.dirty_area(),
            Some(Rectangle::new(Point::new(0, 6), Size::new(2, 2)))
        );
    }

    #[test]
    fn test_flush_sends_only_dirty_region() {
        let mut fb = small();
        Pixel(Point::new(1, 1), Rgb565::BLACK).draw(&mut fb).unwrap();

        let mut display = MockDisplay::<Rgb565>::new();
        assert!(fb.flush(&mut display).unwrap());
        assert_eq!(display.get_pixel(Point::new(1, 1)), Some(Rgb565::BLACK));
        assert_eq!(display.get_pixel(Point::new(0, 0)), None);

        // Second flush has nothing to send
        assert!(!fb.flush(&mut display).unwrap());
    }

    #[test]
    fn test_failed_flush_keeps_region_dirty() {
        use crate::test_support::{MockPanel, PanelFault};

        let mut fb = small();
        Pixel(Point::new(3, 2), Rgb565::BLACK).draw(&mut fb).unwrap();
        let pending = fb.dirty_area();

        let mut panel = MockPanel::new();
        panel.failing = true;
        assert_eq!(fb.flush(&mut panel), Err(PanelFault));
        assert_eq!(fb.dirty_area(), pending);

        panel.failing = false;
        assert_eq!(fb.flush(&mut panel), Ok(true));
        assert_eq!(panel.pixel(Point::new(3, 2)), Some(Rgb565::BLACK));
        assert!(!fb.is_dirty());
    }
}
