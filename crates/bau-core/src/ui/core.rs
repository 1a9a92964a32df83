//! Core UI traits

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

/// A screen element that tracks whether its pixels are stale.
///
/// Drawing a clean element is a no-op, so a render pass can call `draw`
/// unconditionally.
pub trait Drawable {
    /// Paint the element inside [`bounds`](Self::bounds) and mark it clean
    fn draw<D: DrawTarget<Color = Rgb565>>(&self, display: &mut D) -> Result<(), D::Error>;

    fn bounds(&self) -> Rectangle;

    fn is_dirty(&self) -> bool;

    fn mark_clean(&mut self);

    /// Force the next `draw` to repaint, e.g. after the panel lost its contents
    fn mark_dirty(&mut self);
}
