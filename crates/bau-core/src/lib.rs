//! Hardware-independent core library for the Broadcast Audio URI QR display
//!
//! This crate contains all platform-agnostic logic for showing a Bluetooth
//! broadcast-audio (Auracast) connection string as a QR code: the broadcast
//! identity types, the URI formatter and parser, the QR view, the
//! framebuffer, the renderer context and the display request task.
//!
//! It is `#![no_std]` with `extern crate alloc` so it compiles on both
//! embedded targets (ESP32-S3) and desktop hosts (for the simulator and tests).

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod config;
pub mod display;
pub mod display_manager;
pub mod error;
pub mod framebuffer;
pub mod identity;
pub mod renderer;
pub mod ui;
pub mod uri;

#[cfg(test)]
mod test_support;

pub use error::{PayloadError, QrCapacityError, RenderError, StageError, UriError};
pub use identity::{AddressType, BdAddr, BroadcastId, BroadcastIdentity};
pub use renderer::QrRenderer;
