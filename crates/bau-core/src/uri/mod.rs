//! Bluetooth Broadcast Audio URI
//!
//! The QR code carries a `BLUETOOTH:` URI describing one broadcast source:
//!
//! ```text
//! BLUETOOTH:UUID:184F;BN:<base64-name>;SQ:1;AT:1;AD:<12-hex-addr>;AS:0;BI:<6-hex-id>;PI:FFFF;NS:1;BS:1;;
//! ```
//!
//! [`QrPayload`] builds that string into a bounded buffer and [`parse`]
//! reads it back into labelled fields, the way a phone-side scanner does.

mod format;
mod parse;

pub use format::{EncodedName, FIXED_PAYLOAD_LEN, QrPayload, encode_name};
pub use parse::{ScanFilter, UriField, parse, parse_identity};

/// URI scheme prefix.
pub const SCHEME: &str = "BLUETOOTH:";

/// Broadcast Audio Scan service UUID.
pub const BROADCAST_AUDIO_UUID: u16 = 0x184F;

/// Capacity of the formatted payload buffer in bytes.
pub const PAYLOAD_CAPACITY: usize = 1024;

/// Capacity of the intermediate base64 name buffer in bytes.
pub const ENCODED_NAME_CAPACITY: usize = 128;
