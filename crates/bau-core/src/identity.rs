//! Broadcast source identity
//!
//! A broadcast source is identified on the URI by its device address, its
//! 24-bit broadcast ID and a human-readable broadcast name. The types here
//! validate those bounds once, at construction, so the formatter only ever
//! sees values that fit its buffers.

use core::fmt::{self, Write};
use core::str::FromStr;

use heapless::{String, Vec};

use crate::error::PayloadError;
use crate::uri::ENCODED_NAME_CAPACITY;

/// Length of a Bluetooth device address in bytes.
pub const BD_ADDR_LEN: usize = 6;

/// Length of the address token on the URI (two hex digits per byte).
pub const ADDRESS_TOKEN_LEN: usize = BD_ADDR_LEN * 2;

/// Largest broadcast ID (24 bits).
pub const BROADCAST_ID_MAX: u32 = 0x00FF_FFFF;

/// Longest name whose base64 form still fits the encoded-name buffer.
pub const MAX_NAME_LEN: usize = ENCODED_NAME_CAPACITY / 4 * 3;

/// Bluetooth device address, stored in over-the-air (little-endian) order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BdAddr(pub [u8; BD_ADDR_LEN]);

impl BdAddr {
    pub const fn new(bytes: [u8; BD_ADDR_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; BD_ADDR_LEN] {
        &self.0
    }

    /// Twelve uppercase hex digits, most significant byte first.
    pub fn to_hex_token(&self) -> String<ADDRESS_TOKEN_LEN> {
        let mut token = String::new();
        for byte in self.0.iter().rev() {
            // 6 bytes always fill exactly ADDRESS_TOKEN_LEN digits
            let _ = write!(token, "{:02X}", byte);
        }
        token
    }

    /// Inverse of [`to_hex_token`](Self::to_hex_token).
    pub fn from_hex_token(token: &str) -> Option<Self> {
        if token.len() != ADDRESS_TOKEN_LEN || !token.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }

        let mut bytes = [0u8; BD_ADDR_LEN];
        for (i, slot) in bytes.iter_mut().rev().enumerate() {
            *slot = u8::from_str_radix(&token[i * 2..i * 2 + 2], 16).ok()?;
        }
        Some(Self(bytes))
    }
}

impl fmt::Display for BdAddr {
    /// Colon-separated, most significant byte first (`06:05:04:03:02:01`).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [b0, b1, b2, b3, b4, b5] = self.0;
        write!(
            f,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            b5, b4, b3, b2, b1, b0
        )
    }
}

impl FromStr for BdAddr {
    type Err = PayloadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; BD_ADDR_LEN];
        let mut parts = s.split(':');

        for slot in bytes.iter_mut().rev() {
            let part = parts.next().ok_or(PayloadError::InvalidAddress)?;
            if part.len() != 2 || !part.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(PayloadError::InvalidAddress);
            }
            *slot = u8::from_str_radix(part, 16).map_err(|_| PayloadError::InvalidAddress)?;
        }

        if parts.next().is_some() {
            return Err(PayloadError::InvalidAddress);
        }
        Ok(Self(bytes))
    }
}

/// Address type advertised alongside the device address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AddressType {
    Public = 0,
    Random = 1,
}

impl AddressType {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(AddressType::Public),
            1 => Some(AddressType::Random),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for AddressType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressType::Public => f.write_str("Public"),
            AddressType::Random => f.write_str("Random"),
        }
    }
}

/// 24-bit broadcast identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct BroadcastId(u32);

impl BroadcastId {
    pub fn new(value: u32) -> Result<Self, PayloadError> {
        if value > BROADCAST_ID_MAX {
            return Err(PayloadError::InvalidBroadcastId(value));
        }
        Ok(Self(value))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// Next ID, wrapping back to zero after `0xFFFFFF`.
    pub fn wrapping_next(self) -> Self {
        Self((self.0 + 1) & BROADCAST_ID_MAX)
    }
}

impl TryFrom<u32> for BroadcastId {
    type Error = PayloadError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for BroadcastId {
    /// Six zero-padded uppercase hex digits.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:06X}", self.0)
    }
}

/// Everything the URI needs to describe one broadcast source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastIdentity {
    pub address: BdAddr,
    pub broadcast_id: BroadcastId,
    name: Vec<u8, MAX_NAME_LEN>,
}

impl BroadcastIdentity {
    /// Build an identity, rejecting names whose base64 form would not fit
    /// the encoded-name buffer.
    pub fn new(address: BdAddr, broadcast_id: BroadcastId, name: &[u8]) -> Result<Self, PayloadError> {
        let name = Vec::from_slice(name).map_err(|_| PayloadError::BufferOverflow {
            field: "broadcast name",
            required: base64::encoded_len(name.len(), true).unwrap_or(usize::MAX),
            capacity: ENCODED_NAME_CAPACITY,
        })?;

        Ok(Self {
            address,
            broadcast_id,
            name,
        })
    }

    /// Build an identity from unvalidated raw parts.
    pub fn from_raw(address: [u8; BD_ADDR_LEN], broadcast_id: u32, name: &[u8]) -> Result<Self, PayloadError> {
        Self::new(BdAddr::new(address), BroadcastId::new(broadcast_id)?, name)
    }

    pub fn name(&self) -> &[u8] {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_address_token_is_byte_reversed() {
        let addr = BdAddr::new([0x01, 0x02, 0x03, 0x04, 0x05, 0x06]);
        assert_eq!(addr.to_hex_token().as_str(), "060504030201");
    }

    #[test]
    fn test_address_display_and_parse() {
        let addr = BdAddr::new([0xAB, 0x02, 0x03, 0x04, 0x05, 0xC6]);
        let mut text: String<17> = String::new();
        write!(text, "{}", addr).unwrap();
        assert_eq!(text.as_str(), "C6:05:04:03:02:AB");
        assert_eq!("C6:05:04:03:02:AB".parse::<BdAddr>(), Ok(addr));
        assert_eq!("c6:05:04:03:02:ab".parse::<BdAddr>(), Ok(addr));
    }

    #[test]
    fn test_address_parse_rejects_malformed() {
        for bad in ["", "C6:05:04:03:02", "C6:05:04:03:02:AB:00", "C6:05:04:03:02:G1", "C6:5:04:03:02:AB1"] {
            assert_eq!(bad.parse::<BdAddr>(), Err(PayloadError::InvalidAddress), "{bad}");
        }
    }

    #[test]
    fn test_hex_token_rejects_signs_and_length() {
        assert_eq!(BdAddr::from_hex_token("+60504030201"), None);
        assert_eq!(BdAddr::from_hex_token("0605040302"), None);
        assert_eq!(
            BdAddr::from_hex_token("060504030201"),
            Some(BdAddr::new([1, 2, 3, 4, 5, 6]))
        );
    }

    #[test]
    fn test_broadcast_id_range() {
        assert!(BroadcastId::new(0).is_ok());
        assert!(BroadcastId::new(BROADCAST_ID_MAX).is_ok());
        assert_eq!(
            BroadcastId::new(0x0100_0000),
            Err(PayloadError::InvalidBroadcastId(0x0100_0000))
        );
        assert_eq!(BroadcastId::new(BROADCAST_ID_MAX).unwrap().wrapping_next().get(), 0);
    }

    #[test]
    fn test_address_type_codes() {
        assert_eq!(AddressType::from_code(1), Some(AddressType::Random));
        assert_eq!(AddressType::from_code(2), None);
        assert_eq!(AddressType::Public.code(), 0);
    }

    #[test]
    fn test_name_at_limit_is_accepted() {
        let name = [b'x'; MAX_NAME_LEN];
        let identity = BroadcastIdentity::from_raw([0; 6], 1, &name).unwrap();
        assert_eq!(identity.name().len(), 96);
    }

    #[test]
    fn test_name_one_past_limit_overflows() {
        let name = [b'x'; MAX_NAME_LEN + 1];
        assert_eq!(
            BroadcastIdentity::from_raw([0; 6], 1, &name),
            Err(PayloadError::BufferOverflow {
                field: "broadcast name",
                required: 132,
                capacity: 128,
            })
        );
    }

    proptest! {
        #[test]
        fn prop_address_token_shape(bytes in any::<[u8; 6]>()) {
            let addr = BdAddr::new(bytes);
            let token = addr.to_hex_token();

            prop_assert_eq!(token.len(), 12);
            prop_assert!(token.bytes().all(|b| b.is_ascii_digit() || (b'A'..=b'F').contains(&b)));
            for (i, byte) in bytes.iter().rev().enumerate() {
                prop_assert_eq!(u8::from_str_radix(&token[i * 2..i * 2 + 2], 16).unwrap(), *byte);
            }
            prop_assert_eq!(BdAddr::from_hex_token(&token), Some(addr));
        }

        #[test]
        fn prop_broadcast_id_is_six_digits(value in 0u32..=BROADCAST_ID_MAX) {
            let mut text: String<8> = String::new();
            write!(text, "{}", BroadcastId::new(value).unwrap()).unwrap();

            prop_assert_eq!(text.len(), 6);
            prop_assert!(text.bytes().all(|b| b.is_ascii_digit() || (b'A'..=b'F').contains(&b)));
            prop_assert_eq!(u32::from_str_radix(&text, 16).unwrap(), value);
        }
    }
}
