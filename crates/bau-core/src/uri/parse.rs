//! Broadcast Audio URI parsing
//!
//! Reads a scanned `BLUETOOTH:` string back into typed fields. Only the keys
//! this display emits plus the broadcast code are recognised; anything else
//! is skipped so newer URIs still parse.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use super::SCHEME;
use crate::error::UriError;
use crate::identity::{AddressType, BdAddr, BroadcastId, BroadcastIdentity, MAX_NAME_LEN};

/// One recognised `KEY:VALUE` section of a Broadcast Audio URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UriField {
    Uuid(u16),
    BroadcastName(Vec<u8>),
    BroadcastCode(Vec<u8>),
    AddressType(AddressType),
    Address(BdAddr),
    AdvertisingSid(u8),
    BroadcastId(BroadcastId),
    PaInterval(u16),
    NumSubgroups(u8),
}

impl UriField {
    /// Key as it appears in the URI.
    pub fn key(&self) -> &'static str {
        match self {
            UriField::Uuid(_) => "UUID",
            UriField::BroadcastName(_) => "BN",
            UriField::BroadcastCode(_) => "BC",
            UriField::AddressType(_) => "AT",
            UriField::Address(_) => "AD",
            UriField::AdvertisingSid(_) => "AS",
            UriField::BroadcastId(_) => "BI",
            UriField::PaInterval(_) => "PI",
            UriField::NumSubgroups(_) => "NS",
        }
    }

    /// Human-readable field name.
    pub fn label(&self) -> &'static str {
        match self {
            UriField::Uuid(_) => "UUID",
            UriField::BroadcastName(_) => "Broadcast Name",
            UriField::BroadcastCode(_) => "Broadcast Code",
            UriField::AddressType(_) => "Address type",
            UriField::Address(_) => "Address",
            UriField::AdvertisingSid(_) => "Advertising SID",
            UriField::BroadcastId(_) => "Broadcast ID",
            UriField::PaInterval(_) => "PA interval",
            UriField::NumSubgroups(_) => "No. of subgroups",
        }
    }
}

impl fmt::Display for UriField {
    /// Formats the field value for display.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UriField::Uuid(uuid) => write!(f, "0x{:04X}", uuid),
            UriField::BroadcastName(bytes) | UriField::BroadcastCode(bytes) => {
                write!(f, "{}", String::from_utf8_lossy(bytes))
            }
            UriField::AddressType(kind) => write!(f, "{}", kind),
            UriField::Address(addr) => write!(f, "{}", addr),
            UriField::AdvertisingSid(sid) => write!(f, "0x{:02X}", sid),
            UriField::BroadcastId(id) => write!(f, "0x{}", id),
            UriField::PaInterval(interval) => write!(f, "0x{:04X}", interval),
            UriField::NumSubgroups(count) => write!(f, "0x{:02X}", count),
        }
    }
}

fn parse_hex(key: &'static str, value: &str) -> Result<u32, UriError> {
    if value.is_empty() || value.len() > 8 || !value.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(UriError::InvalidHex(key));
    }
    u32::from_str_radix(value, 16).map_err(|_| UriError::InvalidHex(key))
}

fn parse_hex_u8(key: &'static str, value: &str) -> Result<u8, UriError> {
    u8::try_from(parse_hex(key, value)?).map_err(|_| UriError::InvalidHex(key))
}

fn parse_hex_u16(key: &'static str, value: &str) -> Result<u16, UriError> {
    u16::try_from(parse_hex(key, value)?).map_err(|_| UriError::InvalidHex(key))
}

fn parse_base64(key: &'static str, value: &str) -> Result<Vec<u8>, UriError> {
    STANDARD
        .decode(value)
        .map_err(|_| UriError::InvalidBase64(key))
}

fn parse_field(key: &str, value: &str) -> Result<Option<UriField>, UriError> {
    let field = match key {
        "UUID" => UriField::Uuid(parse_hex_u16("UUID", value)?),
        "BN" => UriField::BroadcastName(parse_base64("BN", value)?),
        "BC" => UriField::BroadcastCode(parse_base64("BC", value)?),
        "AT" => {
            let code = parse_hex_u8("AT", value)?;
            UriField::AddressType(AddressType::from_code(code).ok_or(UriError::InvalidAddressType)?)
        }
        "AD" => UriField::Address(BdAddr::from_hex_token(value).ok_or(UriError::InvalidAddress)?),
        "AS" => UriField::AdvertisingSid(parse_hex_u8("AS", value)?),
        "BI" => {
            let raw = parse_hex("BI", value)?;
            UriField::BroadcastId(
                BroadcastId::new(raw).map_err(|_| UriError::InvalidBroadcastId(raw))?,
            )
        }
        "PI" => UriField::PaInterval(parse_hex_u16("PI", value)?),
        "NS" => UriField::NumSubgroups(parse_hex_u8("NS", value)?),
        _ => return Ok(None),
    };
    Ok(Some(field))
}

/// Parse a Broadcast Audio URI into its recognised fields, in URI order.
pub fn parse(uri: &str) -> Result<Vec<UriField>, UriError> {
    let body = uri.strip_prefix(SCHEME).ok_or(UriError::MissingScheme)?;

    let mut fields = Vec::new();
    for section in body.split(';') {
        let Some((key, value)) = section.split_once(':') else {
            continue;
        };
        if let Some(field) = parse_field(key, value)? {
            fields.push(field);
        }
    }
    Ok(fields)
}

/// Recover the broadcast identity (`AD`, `BI`, `BN`) from a URI.
pub fn parse_identity(uri: &str) -> Result<BroadcastIdentity, UriError> {
    let mut address = None;
    let mut broadcast_id = None;
    let mut name = None;

    for field in parse(uri)? {
        match field {
            UriField::Address(addr) => address = Some(addr),
            UriField::BroadcastId(id) => broadcast_id = Some(id),
            UriField::BroadcastName(bytes) => name = Some(bytes),
            _ => {}
        }
    }

    let address = address.ok_or(UriError::MissingField("AD"))?;
    let broadcast_id = broadcast_id.ok_or(UriError::MissingField("BI"))?;
    let name = name.ok_or(UriError::MissingField("BN"))?;

    // A decoded BN can be longer than a name this display would emit.
    BroadcastIdentity::new(address, broadcast_id, &name).map_err(|_| UriError::NameTooLong {
        len: name.len(),
        max: MAX_NAME_LEN,
    })
}

/// Suppresses repeated reports of the same scanned code.
///
/// A scanner sees the same code many times per second; only the first
/// sighting of a new, parseable URI is reported until [`clear`](Self::clear)
/// is called (no code in view).
#[derive(Debug, Default)]
pub struct ScanFilter {
    last: Option<String>,
}

impl ScanFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer a scanned string; returns its fields if it should be shown.
    pub fn offer(&mut self, raw: &str) -> Option<Vec<UriField>> {
        let fields = parse(raw).ok().filter(|fields| !fields.is_empty())?;

        if self.last.as_deref() == Some(raw) {
            return None;
        }

        self.last = Some(String::from(raw));
        Some(fields)
    }

    pub fn clear(&mut self) {
        self.last = None;
    }
}
