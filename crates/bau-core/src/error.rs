//! Error types shared across the crate

use thiserror_no_std::Error;

/// Failures while building a broadcast identity or its URI payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PayloadError {
    /// A bounded buffer is too small for the input
    #[error("{field} needs {required} bytes but only {capacity} are available")]
    BufferOverflow {
        /// Which buffer overflowed
        field: &'static str,
        /// Bytes the input would need
        required: usize,
        /// Bytes the buffer can hold
        capacity: usize,
    },

    /// Broadcast IDs are 24-bit values
    #[error("broadcast ID {0:#X} does not fit in 24 bits")]
    InvalidBroadcastId(u32),

    /// Address text is not six colon-separated hex bytes
    #[error("malformed device address")]
    InvalidAddress,
}

/// Failures while parsing a Broadcast Audio URI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum UriError {
    #[error("URI does not start with BLUETOOTH:")]
    MissingScheme,

    #[error("URI has no {0} field")]
    MissingField(&'static str),

    #[error("invalid hex value in {0} field")]
    InvalidHex(&'static str),

    #[error("invalid base64 value in {0} field")]
    InvalidBase64(&'static str),

    #[error("AD field must be 12 hex digits")]
    InvalidAddress,

    #[error("unknown address type")]
    InvalidAddressType,

    #[error("broadcast ID {0:#X} does not fit in 24 bits")]
    InvalidBroadcastId(u32),

    /// `BN` decoded fine but is longer than a broadcast name may be
    #[error("broadcast name is {len} bytes, at most {max} allowed")]
    NameTooLong { len: usize, max: usize },
}

/// The payload cannot be drawn as a QR code of the configured size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{len} byte payload does not fit in a {size_px}px QR code")]
pub struct QrCapacityError {
    pub len: usize,
    pub size_px: u32,
}

/// Failures while preparing a new code, before anything is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StageError {
    #[error("{0}")]
    Payload(PayloadError),

    #[error("{0}")]
    QrCapacity(QrCapacityError),
}

impl From<PayloadError> for StageError {
    fn from(err: PayloadError) -> Self {
        StageError::Payload(err)
    }
}

impl From<QrCapacityError> for StageError {
    fn from(err: QrCapacityError) -> Self {
        StageError::QrCapacity(err)
    }
}

/// Failures of the renderer, generic over the panel's own error type.
#[derive(Debug, Error)]
pub enum RenderError<E> {
    /// The panel reported it is not ready at initialization
    #[error("display device not ready")]
    DeviceNotReady,

    #[error("{0}")]
    Payload(PayloadError),

    #[error("{0}")]
    QrCapacity(QrCapacityError),

    #[error("display error: {0:?}")]
    Display(E),
}

impl<E> From<PayloadError> for RenderError<E> {
    fn from(err: PayloadError) -> Self {
        RenderError::Payload(err)
    }
}

impl<E> From<QrCapacityError> for RenderError<E> {
    fn from(err: QrCapacityError) -> Self {
        RenderError::QrCapacity(err)
    }
}

impl<E> From<StageError> for RenderError<E> {
    fn from(err: StageError) -> Self {
        match err {
            StageError::Payload(err) => RenderError::Payload(err),
            StageError::QrCapacity(err) => RenderError::QrCapacity(err),
        }
    }
}
