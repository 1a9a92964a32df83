//! Configuration types
//!
//! Colors are `0xRRGGBB` values so config files stay readable; they are
//! converted to the panel format with [`rgb565_from_hex`].

use alloc::string::String;
use embedded_graphics::pixelcolor::Rgb565;
use serde::{Deserialize, Serialize};

use crate::error::PayloadError;
use crate::identity::{BdAddr, BroadcastId, BroadcastIdentity};
use crate::ui::rgb565_from_hex;

/// Text encoded before the first identity arrives.
pub const PLACEHOLDER_PAYLOAD: &str = "NOTHING YET;";

/// Default QR edge length in pixels.
pub const DEFAULT_QR_SIZE_PX: u32 = 180;

#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub display: RendererConfig,
    pub broadcast: BroadcastConfig,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct RendererConfig {
    pub qr_size_px: u32,
    pub dark_color: u32,
    pub light_color: u32,
    pub background_color: u32,
    pub placeholder: String,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            qr_size_px: DEFAULT_QR_SIZE_PX,
            dark_color: 0x000000,
            light_color: 0xFFFFFF,
            background_color: 0xFFFFFF,
            placeholder: String::from(PLACEHOLDER_PAYLOAD),
        }
    }
}

impl RendererConfig {
    pub fn dark(&self) -> Rgb565 {
        rgb565_from_hex(self.dark_color)
    }

    pub fn light(&self) -> Rgb565 {
        rgb565_from_hex(self.light_color)
    }

    pub fn background(&self) -> Rgb565 {
        rgb565_from_hex(self.background_color)
    }
}

/// Identity of the broadcast source shown at startup.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct BroadcastConfig {
    /// `06:05:04:03:02:01`, most significant byte first
    pub address: String,
    pub broadcast_id: u32,
    pub name: String,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            address: String::from("C0:00:00:00:00:01"),
            broadcast_id: 0x000001,
            name: String::from("Bau Source"),
        }
    }
}

impl BroadcastConfig {
    pub fn identity(&self) -> Result<BroadcastIdentity, PayloadError> {
        let address: BdAddr = self.address.parse()?;
        let broadcast_id = BroadcastId::new(self.broadcast_id)?;
        BroadcastIdentity::new(address, broadcast_id, self.name.as_bytes())
    }
}
