//! Two-tone QR code view
//!
//! Encodes a text payload into a QR matrix and draws it as a square of
//! `size_px` pixels: a light background with a quiet zone, and one dark
//! square per set module, scaled by the largest integer factor that fits.

use alloc::vec;
use alloc::vec::Vec;
use core::cell::Cell;

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use log::debug;
use qrcodegen_no_heap::{QrCode as QrMatrix, QrCodeEcc, Version};

use crate::error::QrCapacityError;
use crate::ui::core::Drawable;

/// Light modules kept around the matrix on every side.
pub const QUIET_ZONE_MODULES: u32 = 2;

pub struct QrCodeView {
    bounds: Rectangle,
    dark: Rgb565,
    light: Rgb565,
    /// Row-major module matrix, `side * side` entries
    modules: Vec<bool>,
    side: u32,
    dirty: Cell<bool>,
    temp_buffer: Vec<u8>,
    out_buffer: Vec<u8>,
}

impl QrCodeView {
    /// Create an empty view of `size_px` x `size_px` at the origin.
    pub fn new(size_px: u32, dark: Rgb565, light: Rgb565) -> Self {
        Self {
            bounds: Rectangle::new(Point::zero(), Size::new(size_px, size_px)),
            dark,
            light,
            modules: Vec::new(),
            side: 0,
            dirty: Cell::new(true),
            temp_buffer: vec![0; Version::MAX.buffer_len()],
            out_buffer: vec![0; Version::MAX.buffer_len()],
        }
    }

    /// Move the view so it is centered in `area`.
    pub fn center_in(&mut self, area: Rectangle) {
        self.bounds = Rectangle::with_center(area.center(), self.bounds.size);
        self.dirty.set(true);
    }

    /// Re-encode the matrix from `text`.
    ///
    /// On error the previous matrix is kept.
    pub fn set_text(&mut self, text: &str) -> Result<(), QrCapacityError> {
        let size_px = self.bounds.size.width;
        let capacity_error = QrCapacityError {
            len: text.len(),
            size_px,
        };

        let qr = QrMatrix::encode_text(
            text,
            &mut self.temp_buffer,
            &mut self.out_buffer,
            QrCodeEcc::Low,
            Version::MIN,
            Version::MAX,
            None,
            true,
        )
        .map_err(|_| capacity_error)?;

        let side = qr.size() as u32;
        if side + 2 * QUIET_ZONE_MODULES > size_px {
            return Err(capacity_error);
        }

        self.modules.clear();
        for y in 0..qr.size() {
            for x in 0..qr.size() {
                self.modules.push(qr.get_module(x, y));
            }
        }
        self.side = side;
        self.dirty.set(true);

        debug!("QR matrix {}x{} for {} byte payload", side, side, text.len());
        Ok(())
    }

    /// Modules per side of the current matrix (0 before the first encode).
    pub fn modules_per_side(&self) -> u32 {
        self.side
    }

    /// Whether module `(x, y)` is dark.
    pub fn module(&self, x: u32, y: u32) -> bool {
        x < self.side && y < self.side && self.modules[(y * self.side + x) as usize]
    }

    /// Pixel area covered by module `(x, y)`.
    pub fn module_rect(&self, x: u32, y: u32) -> Option<Rectangle> {
        if x >= self.side || y >= self.side {
            return None;
        }
        let scale = self.scale();
        Some(Rectangle::new(
            self.matrix_origin() + Point::new((x * scale) as i32, (y * scale) as i32),
            Size::new(scale, scale),
        ))
    }

    fn scale(&self) -> u32 {
        self.bounds.size.width / (self.side + 2 * QUIET_ZONE_MODULES)
    }

    fn matrix_origin(&self) -> Point {
        let offset = (self.bounds.size.width - self.scale() * self.side) / 2;
        self.bounds.top_left + Point::new(offset as i32, offset as i32)
    }
}

impl Drawable for QrCodeView {
    fn draw<D: DrawTarget<Color = Rgb565>>(&self, display: &mut D) -> Result<(), D::Error> {
        if !self.dirty.get() {
            return Ok(());
        }

        display.fill_solid(&self.bounds, self.light)?;

        let scale = self.scale();
        let origin = self.matrix_origin();
        let module_size = Size::new(scale, scale);

        for y in 0..self.side {
            for x in 0..self.side {
                if self.modules[(y * self.side + x) as usize] {
                    let top_left = origin + Point::new((x * scale) as i32, (y * scale) as i32);
                    display.fill_solid(&Rectangle::new(top_left, module_size), self.dark)?;
                }
            }
        }

        self.dirty.set(false);
        Ok(())
    }

    fn bounds(&self) -> Rectangle {
        self.bounds
    }

    fn is_dirty(&self) -> bool {
        self.dirty.get()
    }

    fn mark_clean(&mut self) {
        self.dirty.set(false);
    }

    fn mark_dirty(&mut self) {
        self.dirty.set(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::mock_display::MockDisplay;

    fn view(size_px: u32) -> QrCodeView {
        QrCodeView::new(size_px, Rgb565::BLACK, Rgb565::WHITE)
    }

    #[test]
    fn test_version_one_matrix() {
        let mut qr = view(180);
        qr.set_text("NOTHING YET;").unwrap();
        assert_eq!(qr.modules_per_side(), 21);

        // Finder pattern corners are always dark
        assert!(qr.module(0, 0));
        assert!(qr.module(20, 0));
        assert!(qr.module(0, 20));
        // Separator next to the top-left finder is always light
        assert!(!qr.module(7, 0));
    }

    #[test]
    fn test_layout_is_centered_with_quiet_zone() {
        let mut qr = view(180);
        qr.set_text("NOTHING YET;").unwrap();
        qr.center_in(Rectangle::new(Point::zero(), Size::new(320, 240)));

        // 180 / (21 + 4) = 7px per module, 147px matrix, 16px margin
        let first = qr.module_rect(0, 0).unwrap();
        assert_eq!(first.size, Size::new(7, 7));
        assert_eq!(first.top_left, qr.bounds().top_left + Point::new(16, 16));
        assert_eq!(qr.bounds().size, Size::new(180, 180));
        assert!(qr.module_rect(21, 0).is_none());
    }

    #[test]
    fn test_too_small_for_matrix() {
        let mut qr = view(20);
        assert_eq!(
            qr.set_text("NOTHING YET;"),
            Err(QrCapacityError {
                len: 12,
                size_px: 20
            })
        );
        assert_eq!(qr.modules_per_side(), 0);
    }

    #[test]
    fn test_failed_encode_keeps_previous_matrix() {
        let mut qr = view(180);
        qr.set_text("NOTHING YET;").unwrap();

        let huge = "x".repeat(4000);
        assert!(qr.set_text(&huge).is_err());
        assert_eq!(qr.modules_per_side(), 21);
    }

    #[test]
    fn test_draw_paints_light_quiet_zone_and_dark_modules() {
        let mut qr = view(50);
        qr.set_text("A").unwrap();

        let mut display = MockDisplay::<Rgb565>::new();
        display.set_allow_overdraw(true);
        qr.draw(&mut display).unwrap();

        // 50 / 25 = 2px per module, 42px matrix, 4px margin
        assert_eq!(display.get_pixel(Point::new(0, 0)), Some(Rgb565::WHITE));
        assert_eq!(display.get_pixel(Point::new(4, 4)), Some(Rgb565::BLACK));
        assert_eq!(display.get_pixel(Point::new(5, 5)), Some(Rgb565::BLACK));
        assert!(!qr.is_dirty());
    }

    #[test]
    fn test_clean_view_draws_nothing() {
        let mut qr = view(50);
        qr.set_text("A").unwrap();
        qr.mark_clean();

        let mut display = MockDisplay::<Rgb565>::new();
        qr.draw(&mut display).unwrap();
        assert_eq!(display.get_pixel(Point::new(0, 0)), None);
    }
}
