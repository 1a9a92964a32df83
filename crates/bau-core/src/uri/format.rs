//! Payload formatting into bounded buffers

use core::fmt::Write;

use base64::display::Base64Display;
use base64::engine::general_purpose::STANDARD;
use heapless::String;
use log::debug;

use super::{BROADCAST_AUDIO_UUID, ENCODED_NAME_CAPACITY, PAYLOAD_CAPACITY, SCHEME};
use crate::error::PayloadError;
use crate::identity::{AddressType, BroadcastIdentity};

// Fields this source always advertises the same way.
const STANDARD_QUALITY: u8 = 1;
const ADDRESS_TYPE: AddressType = AddressType::Random;
const ADVERTISING_SID: u8 = 0;
const PA_INTERVAL_UNKNOWN: u16 = 0xFFFF;
const NUM_SUBGROUPS: u8 = 1;
const BIS_SYNC: u8 = 1;

/// Payload length excluding the encoded name.
pub const FIXED_PAYLOAD_LEN: usize = 84;

/// Base64 form of a broadcast name.
pub type EncodedName = String<ENCODED_NAME_CAPACITY>;

/// Encode a name as padded standard base64.
///
/// The required length is checked before anything is written.
pub fn encode_name(name: &[u8]) -> Result<EncodedName, PayloadError> {
    let required = base64::encoded_len(name.len(), true).unwrap_or(usize::MAX);
    let overflow = PayloadError::BufferOverflow {
        field: "broadcast name",
        required,
        capacity: ENCODED_NAME_CAPACITY,
    };

    if required > ENCODED_NAME_CAPACITY {
        return Err(overflow);
    }

    let mut encoded = EncodedName::new();
    write!(encoded, "{}", Base64Display::new(name, &STANDARD)).map_err(|_| overflow)?;
    Ok(encoded)
}

/// Text handed to the QR encoder.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QrPayload {
    text: String<PAYLOAD_CAPACITY>,
}

impl QrPayload {
    pub const fn new() -> Self {
        Self {
            text: String::new(),
        }
    }

    /// Wrap arbitrary text, e.g. the placeholder shown before the first update.
    pub fn from_text(text: &str) -> Result<Self, PayloadError> {
        let mut payload = Self::new();
        payload
            .text
            .push_str(text)
            .map_err(|_| PayloadError::BufferOverflow {
                field: "payload",
                required: text.len(),
                capacity: PAYLOAD_CAPACITY,
            })?;
        Ok(payload)
    }

    /// Format the Broadcast Audio URI for `identity`.
    pub fn format(identity: &BroadcastIdentity) -> Result<Self, PayloadError> {
        let name = encode_name(identity.name())?;

        let required = FIXED_PAYLOAD_LEN + name.len();
        let overflow = PayloadError::BufferOverflow {
            field: "payload",
            required,
            capacity: PAYLOAD_CAPACITY,
        };
        if required > PAYLOAD_CAPACITY {
            return Err(overflow);
        }

        let mut text = String::new();
        write!(
            text,
            "{}UUID:{:04X};BN:{};SQ:{};AT:{};AD:{};AS:{};BI:{};PI:{:04X};NS:{};BS:{};;",
            SCHEME,
            BROADCAST_AUDIO_UUID,
            name,
            STANDARD_QUALITY,
            ADDRESS_TYPE.code(),
            identity.address.to_hex_token(),
            ADVERTISING_SID,
            identity.broadcast_id,
            PA_INTERVAL_UNKNOWN,
            NUM_SUBGROUPS,
            BIS_SYNC,
        )
        .map_err(|_| overflow)?;

        debug!("Formatted {} byte payload for {}", text.len(), identity.address);
        Ok(Self { text })
    }

    pub fn as_str(&self) -> &str {
        self.text.as_str()
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.text.as_bytes()
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{BdAddr, BroadcastId, MAX_NAME_LEN};
    use proptest::prelude::*;

    fn identity(name: &[u8], id: u32) -> BroadcastIdentity {
        BroadcastIdentity::new(
            BdAddr::new([0x01, 0x02, 0x03, 0x04, 0x05, 0x06]),
            BroadcastId::new(id).unwrap(),
            name,
        )
        .unwrap()
    }

    #[test]
    fn test_reference_payload() {
        let payload = QrPayload::format(&identity(b"Test", 0x000001)).unwrap();
        assert_eq!(
            payload.as_str(),
            "BLUETOOTH:UUID:184F;BN:VGVzdA==;SQ:1;AT:1;AD:060504030201;AS:0;BI:000001;PI:FFFF;NS:1;BS:1;;"
        );
    }

    #[test]
    fn test_fixed_length_matches_template() {
        let payload = QrPayload::format(&identity(b"", 0xABCDEF)).unwrap();
        assert_eq!(payload.len(), FIXED_PAYLOAD_LEN);
        assert!(payload.as_str().contains(";BN:;"));
        assert!(payload.as_str().contains(";BI:ABCDEF;"));
    }

    #[test]
    fn test_encode_name() {
        assert_eq!(encode_name(b"Test").unwrap().as_str(), "VGVzdA==");
        assert_eq!(encode_name(b"Bau Source").unwrap().as_str(), "QmF1IFNvdXJjZQ==");
        assert_eq!(encode_name(b"").unwrap().as_str(), "");
    }

    #[test]
    fn test_encode_name_limit() {
        let at_limit = [0xFFu8; MAX_NAME_LEN];
        assert_eq!(encode_name(&at_limit).unwrap().len(), ENCODED_NAME_CAPACITY);

        let past_limit = [0xFFu8; MAX_NAME_LEN + 1];
        assert_eq!(
            encode_name(&past_limit),
            Err(PayloadError::BufferOverflow {
                field: "broadcast name",
                required: 132,
                capacity: ENCODED_NAME_CAPACITY,
            })
        );
    }

    #[test]
    fn test_longest_payload_fits() {
        let payload = QrPayload::format(&identity(&[b'n'; MAX_NAME_LEN], 0xFFFFFF)).unwrap();
        assert_eq!(payload.len(), FIXED_PAYLOAD_LEN + ENCODED_NAME_CAPACITY);
    }

    #[test]
    fn test_from_text_overflow() {
        let long = "x".repeat(PAYLOAD_CAPACITY + 1);
        assert!(matches!(
            QrPayload::from_text(&long),
            Err(PayloadError::BufferOverflow { field: "payload", .. })
        ));
        assert_eq!(QrPayload::from_text("NOTHING YET;").unwrap().as_str(), "NOTHING YET;");
    }

    proptest! {
        #[test]
        fn prop_format_is_idempotent(
            name in proptest::collection::vec(any::<u8>(), 0..=MAX_NAME_LEN),
            id in 0u32..=0xFF_FFFF,
        ) {
            let identity = identity(&name, id);
            let first = QrPayload::format(&identity).unwrap();
            let second = QrPayload::format(&identity).unwrap();
            prop_assert_eq!(first.as_bytes(), second.as_bytes());
        }
    }
}
