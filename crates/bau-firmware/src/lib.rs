//! ESP32-S3 firmware-specific modules for the Broadcast Audio URI display
//!
//! This crate contains hardware-specific code that cannot compile on desktop
//! targets: the PMIC power-up sequence, the mipidsi panel adapter and the
//! build-time broadcast identity.

#![no_std]

extern crate alloc;

pub mod panel;
pub mod power;
pub mod source;
