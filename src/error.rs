//! Error types for the poweredup library.

use thiserror::Error;

use crate::protocol::MessageType;

/// The main error type for poweredup operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A command argument is outside its declared domain.
    #[error("invalid argument `{name}`: {reason}")]
    InvalidArgument { name: &'static str, reason: String },

    /// The device's port is detached or the hub link is down.
    #[error("not connected")]
    NotConnected,

    /// The command does not fit the port kind (virtual vs. physical).
    #[error("invalid port kind for port {port_id}: {reason}")]
    InvalidPortKind { port_id: u8, reason: &'static str },

    /// Length prefix does not describe the buffer.
    #[error("framing error: {0}")]
    Framing(#[from] FrameError),

    /// Message content failed a structural constraint.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// The message type has no codec for the requested direction.
    #[error("{direction} not supported for message type {message_type:?}")]
    NotSupported {
        message_type: MessageType,
        direction: Direction,
    },

    /// Malformed hex in a capability blob.
    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Timed out waiting for a hub notification.
    #[error("timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// Channel receive error.
    #[error("channel closed")]
    ChannelClosed,
}

/// Codec direction, used by [`Error::NotSupported`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Host to hub.
    Encode,
    /// Hub to host.
    Decode,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Encode => f.write_str("encode"),
            Self::Decode => f.write_str("decode"),
        }
    }
}

/// Frame-level errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    /// Buffer too short to contain the common header.
    #[error("frame too short: need at least {needed} bytes, got {got}")]
    TooShort { needed: usize, got: usize },

    /// Declared length differs from the buffer length.
    #[error("declared length {declared} does not match buffer length {actual}")]
    LengthMismatch { declared: usize, actual: usize },

    /// Message exceeds what the length prefix can express.
    #[error("message too large: {size} bytes exceeds maximum {max}")]
    TooLarge { size: usize, max: usize },
}

/// Variant-level decode errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// Unknown message type discriminant.
    #[error("unknown message type 0x{0:02x}")]
    UnknownMessageType(u8),

    /// Content shorter than the variant's fixed layout.
    #[error("{message} content too short: need {needed} bytes, got {got}")]
    TooShort {
        message: &'static str,
        needed: usize,
        got: usize,
    },

    /// A field carries a value outside its enumeration.
    #[error("invalid {field} value 0x{value:02x}")]
    InvalidField { field: &'static str, value: u8 },

    /// Mode information lacks one of the raw, percentage or SI ranges.
    #[error("no complete range information for port {port_id} mode {mode}")]
    MissingModeRange { port_id: u8, mode: u8 },
}

/// Result type alias for poweredup operations.
pub type Result<T> = std::result::Result<T, Error>;
