//! UI components

pub mod qr_code;

pub use qr_code::{QUIET_ZONE_MODULES, QrCodeView};
