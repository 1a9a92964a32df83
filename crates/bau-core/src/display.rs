//! Display panel abstraction
//!
//! The renderer draws through `embedded-graphics`, but it also needs to know
//! whether the panel came up and to lift blanking once the first frame is
//! on screen. Drivers and the simulator implement [`Panel`] for that.

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;

/// A drawable panel that reports readiness and controls blanking.
pub trait Panel: DrawTarget<Color = Rgb565> {
    /// Whether the panel finished initialization and accepts pixels.
    fn is_ready(&self) -> bool;

    /// Suppress (`true`) or show (`false`) panel output.
    fn set_blanking(&mut self, blank: bool) -> Result<(), Self::Error>;
}
