//! [`Panel`] adapter for the mipidsi-driven ILI9342C

use embassy_time::Delay;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use embedded_hal::digital::OutputPin;
use log::debug;
use mipidsi::Display;
use mipidsi::interface::{Interface, InterfacePixelFormat};
use mipidsi::models::Model;

use bau_core::display::Panel;

/// LCD panel plus the power state it came up with.
///
/// Blanking maps to the controller's sleep mode, which keeps GRAM contents so
/// unblanking shows the last frame again.
pub struct DevicePanel<DI, M, RST>
where
    DI: Interface,
    M: Model,
    RST: OutputPin,
{
    display: Display<DI, M, RST>,
    powered: bool,
}

impl<DI, M, RST> DevicePanel<DI, M, RST>
where
    DI: Interface,
    M: Model<ColorFormat = Rgb565>,
    Rgb565: InterfacePixelFormat<DI::Word>,
    RST: OutputPin,
{
    pub fn new(display: Display<DI, M, RST>, powered: bool) -> Self {
        Self { display, powered }
    }
}

impl<DI, M, RST> Dimensions for DevicePanel<DI, M, RST>
where
    DI: Interface,
    M: Model<ColorFormat = Rgb565>,
    Rgb565: InterfacePixelFormat<DI::Word>,
    RST: OutputPin,
{
    fn bounding_box(&self) -> Rectangle {
        self.display.bounding_box()
    }
}

impl<DI, M, RST> DrawTarget for DevicePanel<DI, M, RST>
where
    DI: Interface,
    M: Model<ColorFormat = Rgb565>,
    Rgb565: InterfacePixelFormat<DI::Word>,
    RST: OutputPin,
{
    type Color = Rgb565;
    type Error = DI::Error;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        self.display.draw_iter(pixels)
    }

    fn fill_contiguous<I>(&mut self, area: &Rectangle, colors: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Self::Color>,
    {
        self.display.fill_contiguous(area, colors)
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        self.display.fill_solid(area, color)
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.display.clear(color)
    }
}

impl<DI, M, RST> Panel for DevicePanel<DI, M, RST>
where
    DI: Interface,
    M: Model<ColorFormat = Rgb565>,
    Rgb565: InterfacePixelFormat<DI::Word>,
    RST: OutputPin,
{
    fn is_ready(&self) -> bool {
        self.powered
    }

    fn set_blanking(&mut self, blank: bool) -> Result<(), Self::Error> {
        debug!("Panel blanking {}", if blank { "on" } else { "off" });
        if blank {
            self.display.sleep(&mut Delay)
        } else {
            self.display.wake(&mut Delay)
        }
    }
}
