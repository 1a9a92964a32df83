//! QR display UI
//!
//! A single full-screen view: the Broadcast Audio URI as a two-tone QR code,
//! centered on a solid background.

pub mod components;
pub mod core;

pub use components::QrCodeView;
pub use self::core::Drawable;

use embedded_graphics::pixelcolor::{Rgb565, Rgb888};

/// Panel width of the reference hardware (ILI9342C).
pub const DISPLAY_WIDTH_PX: u16 = 320;

/// Panel height of the reference hardware (ILI9342C).
pub const DISPLAY_HEIGHT_PX: u16 = 240;

/// Convert a `0xRRGGBB` value to the panel's color format.
pub fn rgb565_from_hex(hex: u32) -> Rgb565 {
    let [_, r, g, b] = hex.to_be_bytes();
    Rgb888::new(r, g, b).into()
}
