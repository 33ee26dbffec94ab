//! Typed hub messages.
//!
//! Each message variant is a typed view over the content that follows the
//! common header. Variants implement [`EncodeContent`] when the host sends
//! them and [`DecodeContent`] when the hub does. A variant may implement
//! only one direction; [`Message::encode_content`] reports the missing
//! direction as [`Error::NotSupported`].

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{DecodeError, Direction, Error, Result};
use crate::protocol::command::{
    CompletionInformation, ErrorCode, FeedbackFlags, PortOutputSubCommand, StartupInformation,
    pack_flags, unpack_flags,
};
use crate::protocol::message_type::MessageType;
use crate::types::{DataType, IoType};

/// Writes a variant's content bytes (everything after the common header).
pub trait EncodeContent {
    /// Number of content bytes this message encodes to.
    fn content_len(&self) -> usize;

    /// Appends the content bytes to `buf`.
    fn encode_content(&self, buf: &mut BytesMut);
}

/// Reads a variant from its content bytes.
pub trait DecodeContent: Sized {
    /// Decodes the content bytes of a message sent by hub `hub_id`.
    fn decode_content(hub_id: u8, data: &[u8]) -> std::result::Result<Self, DecodeError>;
}

/// Fails with [`DecodeError::TooShort`] if `data` is shorter than `needed`.
const fn ensure_len(
    message: &'static str,
    data: &[u8],
    needed: usize,
) -> std::result::Result<(), DecodeError> {
    if data.len() < needed {
        return Err(DecodeError::TooShort {
            message,
            needed,
            got: data.len(),
        });
    }
    Ok(())
}

/// Parses a null-terminated or fixed-length string from bytes.
fn parse_string(data: &[u8]) -> String {
    let len = data.iter().position(|&b| b == 0).unwrap_or(data.len());
    String::from_utf8_lossy(&data[..len]).into_owned()
}

// ==================== Port output commands ====================

/// Starts a single motor at a power level.
///
/// Format: `[port:1] [startup<<4|completion:1] [0x01] [power:1 signed]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortOutputCommandStartPower {
    pub hub_id: u8,
    pub port_id: u8,
    pub startup: StartupInformation,
    pub completion: CompletionInformation,
    pub power: i8,
}

impl EncodeContent for PortOutputCommandStartPower {
    fn content_len(&self) -> usize {
        4
    }

    fn encode_content(&self, buf: &mut BytesMut) {
        buf.put_u8(self.port_id);
        buf.put_u8(pack_flags(self.startup, self.completion));
        buf.put_u8(PortOutputSubCommand::StartPower.into());
        buf.put_i8(self.power);
    }
}

impl DecodeContent for PortOutputCommandStartPower {
    fn decode_content(hub_id: u8, data: &[u8]) -> std::result::Result<Self, DecodeError> {
        ensure_len("PortOutputCommandStartPower", data, 4)?;
        let mut cursor = std::io::Cursor::new(data);

        let port_id = cursor.get_u8();
        let (startup, completion) = unpack_flags(cursor.get_u8());
        cursor.advance(1); // sub-command
        let power = cursor.get_i8();

        Ok(Self {
            hub_id,
            port_id,
            startup,
            completion,
            power,
        })
    }
}

/// Starts both motors of a virtual port.
///
/// Format: `[port:1] [startup<<4|completion:1] [0x02] [power1:1 signed] [power2:1 signed]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortOutputCommandStartPower2 {
    pub hub_id: u8,
    pub port_id: u8,
    pub startup: StartupInformation,
    pub completion: CompletionInformation,
    pub power1: i8,
    pub power2: i8,
}

impl EncodeContent for PortOutputCommandStartPower2 {
    fn content_len(&self) -> usize {
        5
    }

    fn encode_content(&self, buf: &mut BytesMut) {
        buf.put_u8(self.port_id);
        buf.put_u8(pack_flags(self.startup, self.completion));
        buf.put_u8(PortOutputSubCommand::StartPower2.into());
        buf.put_i8(self.power1);
        buf.put_i8(self.power2);
    }
}

impl DecodeContent for PortOutputCommandStartPower2 {
    fn decode_content(hub_id: u8, data: &[u8]) -> std::result::Result<Self, DecodeError> {
        ensure_len("PortOutputCommandStartPower2", data, 5)?;
        let mut cursor = std::io::Cursor::new(data);

        let port_id = cursor.get_u8();
        let (startup, completion) = unpack_flags(cursor.get_u8());
        cursor.advance(1); // sub-command
        let power1 = cursor.get_i8();
        let power2 = cursor.get_i8();

        Ok(Self {
            hub_id,
            port_id,
            startup,
            completion,
            power1,
            power2,
        })
    }
}

/// Decodes a port output command by its sub-command byte.
pub(crate) fn decode_port_output_command(
    hub_id: u8,
    data: &[u8],
) -> std::result::Result<Message, DecodeError> {
    ensure_len("PortOutputCommand", data, 3)?;
    match PortOutputSubCommand::from_byte(data[2]) {
        Some(PortOutputSubCommand::StartPower) => Ok(Message::StartPower(
            PortOutputCommandStartPower::decode_content(hub_id, data)?,
        )),
        Some(PortOutputSubCommand::StartPower2) => Ok(Message::StartPower2(
            PortOutputCommandStartPower2::decode_content(hub_id, data)?,
        )),
        None => Err(DecodeError::InvalidField {
            field: "sub-command",
            value: data[2],
        }),
    }
}

/// Feedback for one port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortFeedback {
    pub port_id: u8,
    pub flags: FeedbackFlags,
}

/// Command feedback from the hub.
///
/// Format: `([port:1] [feedback:1])*`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortOutputCommandFeedback {
    pub hub_id: u8,
    pub feedback: Vec<PortFeedback>,
}

impl DecodeContent for PortOutputCommandFeedback {
    fn decode_content(hub_id: u8, data: &[u8]) -> std::result::Result<Self, DecodeError> {
        ensure_len("PortOutputCommandFeedback", data, 2)?;
        let feedback = data
            .chunks_exact(2)
            .map(|pair| PortFeedback {
                port_id: pair[0],
                flags: FeedbackFlags::from_byte(pair[1]),
            })
            .collect();
        Ok(Self { hub_id, feedback })
    }
}

// ==================== Port input format ====================

/// Current input format of a port, echoed by the hub after a setup request.
///
/// Format: `[port:1] [mode:1] [delta:4LE] [notify:1]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortInputFormatSingle {
    pub hub_id: u8,
    pub port_id: u8,
    pub mode: u8,
    pub delta_interval: u32,
    pub notification_enabled: bool,
}

impl DecodeContent for PortInputFormatSingle {
    fn decode_content(hub_id: u8, data: &[u8]) -> std::result::Result<Self, DecodeError> {
        ensure_len("PortInputFormatSingle", data, 7)?;
        let mut cursor = std::io::Cursor::new(data);

        Ok(Self {
            hub_id,
            port_id: cursor.get_u8(),
            mode: cursor.get_u8(),
            delta_interval: cursor.get_u32_le(),
            notification_enabled: cursor.get_u8() == 0x01,
        })
    }
}

/// Requests a port's input mode and notification threshold.
///
/// Format: `[port:1] [mode:1] [delta:4LE] [notify:1]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortInputFormatSetupSingle {
    pub hub_id: u8,
    pub port_id: u8,
    pub mode: u8,
    pub delta_interval: u32,
    pub notification_enabled: bool,
}

impl EncodeContent for PortInputFormatSetupSingle {
    fn content_len(&self) -> usize {
        7
    }

    fn encode_content(&self, buf: &mut BytesMut) {
        buf.put_u8(self.port_id);
        buf.put_u8(self.mode);
        buf.put_u32_le(self.delta_interval);
        buf.put_u8(u8::from(self.notification_enabled));
    }
}

/// Value of the port's current input mode.
///
/// Format: `[port:1] [value...]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortValueSingle {
    pub hub_id: u8,
    pub port_id: u8,
    pub data: Bytes,
}

impl DecodeContent for PortValueSingle {
    fn decode_content(hub_id: u8, data: &[u8]) -> std::result::Result<Self, DecodeError> {
        ensure_len("PortValueSingle", data, 2)?;
        Ok(Self {
            hub_id,
            port_id: data[0],
            data: Bytes::copy_from_slice(&data[1..]),
        })
    }
}

// ==================== Hub notifications ====================

/// A previously sent command was rejected by the hub.
///
/// Format: `[command_type:1] [error_code:1]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenericError {
    pub hub_id: u8,
    pub command_type: u8,
    pub error_code: ErrorCode,
}

impl EncodeContent for GenericError {
    fn content_len(&self) -> usize {
        2
    }

    fn encode_content(&self, buf: &mut BytesMut) {
        buf.put_u8(self.command_type);
        buf.put_u8(self.error_code.into());
    }
}

impl DecodeContent for GenericError {
    fn decode_content(hub_id: u8, data: &[u8]) -> std::result::Result<Self, DecodeError> {
        ensure_len("GenericError", data, 2)?;
        let error_code = ErrorCode::from_byte(data[1]).ok_or(DecodeError::InvalidField {
            field: "error code",
            value: data[1],
        })?;
        Ok(Self {
            hub_id,
            command_type: data[0],
            error_code,
        })
    }
}

/// What happened on an attached IO notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachedIoEvent {
    /// The peripheral was removed.
    Detached,
    /// A peripheral was attached to a physical port.
    Attached {
        io_type: IoType,
        hardware_revision: u32,
        software_revision: u32,
    },
    /// The hub created a virtual port from two physical ports.
    AttachedVirtual { io_type: IoType, port_a: u8, port_b: u8 },
}

/// Port attachment change.
///
/// Format:
/// ```text
/// [port:1] [event:1]
///   event 0x00: detached
///   event 0x01: [io_type:2LE] [hw_rev:4LE] [sw_rev:4LE]
///   event 0x02: [io_type:2LE] [port_a:1] [port_b:1]
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HubAttachedIo {
    pub hub_id: u8,
    pub port_id: u8,
    pub event: AttachedIoEvent,
}

impl DecodeContent for HubAttachedIo {
    fn decode_content(hub_id: u8, data: &[u8]) -> std::result::Result<Self, DecodeError> {
        ensure_len("HubAttachedIo", data, 2)?;
        let mut cursor = std::io::Cursor::new(data);
        let port_id = cursor.get_u8();
        let event_byte = cursor.get_u8();

        let event = match event_byte {
            0x00 => AttachedIoEvent::Detached,
            0x01 => {
                ensure_len("HubAttachedIo", data, 12)?;
                AttachedIoEvent::Attached {
                    io_type: IoType::from_raw(cursor.get_u16_le()),
                    hardware_revision: cursor.get_u32_le(),
                    software_revision: cursor.get_u32_le(),
                }
            }
            0x02 => {
                ensure_len("HubAttachedIo", data, 6)?;
                AttachedIoEvent::AttachedVirtual {
                    io_type: IoType::from_raw(cursor.get_u16_le()),
                    port_a: cursor.get_u8(),
                    port_b: cursor.get_u8(),
                }
            }
            value => {
                return Err(DecodeError::InvalidField {
                    field: "attached io event",
                    value,
                });
            }
        };

        Ok(Self {
            hub_id,
            port_id,
            event,
        })
    }
}

/// Virtual port setup action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VirtualPortAction {
    /// Tear down an existing virtual port.
    Disconnect { port_id: u8 },
    /// Bond two physical ports.
    Connect { port_a: u8, port_b: u8 },
}

/// Connects or disconnects a virtual port.
///
/// Format: `[0x00] [port:1]` or `[0x01] [port_a:1] [port_b:1]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VirtualPortSetup {
    pub hub_id: u8,
    pub action: VirtualPortAction,
}

impl EncodeContent for VirtualPortSetup {
    fn content_len(&self) -> usize {
        match self.action {
            VirtualPortAction::Disconnect { .. } => 2,
            VirtualPortAction::Connect { .. } => 3,
        }
    }

    fn encode_content(&self, buf: &mut BytesMut) {
        match self.action {
            VirtualPortAction::Disconnect { port_id } => {
                buf.put_u8(0x00);
                buf.put_u8(port_id);
            }
            VirtualPortAction::Connect { port_a, port_b } => {
                buf.put_u8(0x01);
                buf.put_u8(port_a);
                buf.put_u8(port_b);
            }
        }
    }
}

// ==================== Port information ====================

/// Port capability bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PortCapabilities(u8);

impl PortCapabilities {
    /// The hub can write to the port.
    pub const OUTPUT: Self = Self(1 << 0);
    /// The port reports values to the hub.
    pub const INPUT: Self = Self(1 << 1);
    /// Modes can be combined.
    pub const LOGICAL_COMBINABLE: Self = Self(1 << 2);
    /// Modes can be synchronized.
    pub const LOGICAL_SYNCHRONIZABLE: Self = Self(1 << 3);

    /// Creates capabilities from a raw byte.
    #[must_use]
    pub const fn from_byte(byte: u8) -> Self {
        Self(byte)
    }

    /// Check if a capability is set.
    #[must_use]
    pub const fn contains(self, flag: Self) -> bool {
        (self.0 & flag.0) == flag.0
    }
}

/// Port information content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortInfo {
    /// Mode overview.
    ModeInfo {
        capabilities: PortCapabilities,
        total_mode_count: u8,
        input_modes: u16,
        output_modes: u16,
    },
    /// Bitmasks of modes that can be combined.
    PossibleModeCombinations(Vec<u16>),
}

/// Port information.
///
/// Format:
/// ```text
/// [port:1] [info_type:1]
///   0x01: [capabilities:1] [mode_count:1] [input_modes:2LE] [output_modes:2LE]
///   0x02: [combination:2LE]*
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortInformation {
    pub hub_id: u8,
    pub port_id: u8,
    pub info: PortInfo,
}

impl DecodeContent for PortInformation {
    fn decode_content(hub_id: u8, data: &[u8]) -> std::result::Result<Self, DecodeError> {
        ensure_len("PortInformation", data, 2)?;
        let mut cursor = std::io::Cursor::new(data);
        let port_id = cursor.get_u8();

        let info = match cursor.get_u8() {
            0x01 => {
                ensure_len("PortInformation", data, 8)?;
                PortInfo::ModeInfo {
                    capabilities: PortCapabilities::from_byte(cursor.get_u8()),
                    total_mode_count: cursor.get_u8(),
                    input_modes: cursor.get_u16_le(),
                    output_modes: cursor.get_u16_le(),
                }
            }
            0x02 => PortInfo::PossibleModeCombinations(
                data[2..]
                    .chunks_exact(2)
                    .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                    .collect(),
            ),
            value => {
                return Err(DecodeError::InvalidField {
                    field: "port information type",
                    value,
                });
            }
        };

        Ok(Self {
            hub_id,
            port_id,
            info,
        })
    }
}

/// Port mode information content.
#[derive(Debug, Clone, PartialEq)]
pub enum ModeInfo {
    /// Mode name.
    Name(String),
    /// Raw value range.
    Raw { min: f32, max: f32 },
    /// Percentage range.
    Pct { min: f32, max: f32 },
    /// SI range.
    Si { min: f32, max: f32 },
    /// Unit symbol.
    Symbol(String),
    /// Input/output mapping bits.
    Mapping { input: u8, output: u8 },
    /// Dataset layout of the mode's values.
    ValueFormat {
        datasets: u8,
        data_type: DataType,
        figures: u8,
        decimals: u8,
    },
}

/// Port mode information.
///
/// Format: `[port:1] [mode:1] [info_type:1] [payload...]`
#[derive(Debug, Clone, PartialEq)]
pub struct PortModeInformation {
    pub hub_id: u8,
    pub port_id: u8,
    pub mode: u8,
    pub info: ModeInfo,
}

impl DecodeContent for PortModeInformation {
    fn decode_content(hub_id: u8, data: &[u8]) -> std::result::Result<Self, DecodeError> {
        const NAME: &str = "PortModeInformation";

        ensure_len(NAME, data, 3)?;
        let mut cursor = std::io::Cursor::new(data);
        let port_id = cursor.get_u8();
        let mode = cursor.get_u8();
        let info_type = cursor.get_u8();
        let payload = &data[3..];

        let read_range = |cursor: &mut std::io::Cursor<&[u8]>| {
            ensure_len(NAME, data, 11).map(|()| (cursor.get_f32_le(), cursor.get_f32_le()))
        };

        let info = match info_type {
            0x00 => ModeInfo::Name(parse_string(payload)),
            0x01 => {
                let (min, max) = read_range(&mut cursor)?;
                ModeInfo::Raw { min, max }
            }
            0x02 => {
                let (min, max) = read_range(&mut cursor)?;
                ModeInfo::Pct { min, max }
            }
            0x03 => {
                let (min, max) = read_range(&mut cursor)?;
                ModeInfo::Si { min, max }
            }
            0x04 => ModeInfo::Symbol(parse_string(payload)),
            0x05 => {
                ensure_len(NAME, data, 5)?;
                ModeInfo::Mapping {
                    input: cursor.get_u8(),
                    output: cursor.get_u8(),
                }
            }
            0x80 => {
                ensure_len(NAME, data, 7)?;
                let datasets = cursor.get_u8();
                let type_byte = cursor.get_u8();
                let data_type = DataType::from_byte(type_byte).ok_or(DecodeError::InvalidField {
                    field: "data type",
                    value: type_byte,
                })?;
                ModeInfo::ValueFormat {
                    datasets,
                    data_type,
                    figures: cursor.get_u8(),
                    decimals: cursor.get_u8(),
                }
            }
            value => {
                return Err(DecodeError::InvalidField {
                    field: "mode information type",
                    value,
                });
            }
        };

        Ok(Self {
            hub_id,
            port_id,
            mode,
            info,
        })
    }
}

// ==================== Message ====================

/// All messages handled by this library.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// Port attachment change.
    HubAttachedIo(HubAttachedIo),
    /// Hub rejected a command.
    GenericError(GenericError),
    /// Port information.
    PortInformation(PortInformation),
    /// Port mode information.
    PortModeInformation(PortModeInformation),
    /// Input format setup request.
    PortInputFormatSetupSingle(PortInputFormatSetupSingle),
    /// Value of a port's current mode.
    PortValueSingle(PortValueSingle),
    /// Current input format of a port.
    PortInputFormatSingle(PortInputFormatSingle),
    /// Virtual port setup request.
    VirtualPortSetup(VirtualPortSetup),
    /// Single motor power command.
    StartPower(PortOutputCommandStartPower),
    /// Dual motor power command.
    StartPower2(PortOutputCommandStartPower2),
    /// Command feedback.
    PortOutputCommandFeedback(PortOutputCommandFeedback),
}

macro_rules! impl_from_variant {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<$ty> for Message {
                fn from(message: $ty) -> Self {
                    Self::$variant(message)
                }
            }
        )*
    };
}

impl_from_variant!(
    HubAttachedIo(HubAttachedIo),
    GenericError(GenericError),
    PortInformation(PortInformation),
    PortModeInformation(PortModeInformation),
    PortInputFormatSetupSingle(PortInputFormatSetupSingle),
    PortValueSingle(PortValueSingle),
    PortInputFormatSingle(PortInputFormatSingle),
    VirtualPortSetup(VirtualPortSetup),
    StartPower(PortOutputCommandStartPower),
    StartPower2(PortOutputCommandStartPower2),
    PortOutputCommandFeedback(PortOutputCommandFeedback),
);

impl Message {
    /// Returns the message type discriminant.
    #[must_use]
    pub const fn message_type(&self) -> MessageType {
        match self {
            Self::HubAttachedIo(_) => MessageType::HubAttachedIo,
            Self::GenericError(_) => MessageType::GenericError,
            Self::PortInformation(_) => MessageType::PortInformation,
            Self::PortModeInformation(_) => MessageType::PortModeInformation,
            Self::PortInputFormatSetupSingle(_) => MessageType::PortInputFormatSetupSingle,
            Self::PortValueSingle(_) => MessageType::PortValueSingle,
            Self::PortInputFormatSingle(_) => MessageType::PortInputFormatSingle,
            Self::VirtualPortSetup(_) => MessageType::VirtualPortSetup,
            Self::StartPower(_) | Self::StartPower2(_) => MessageType::PortOutputCommand,
            Self::PortOutputCommandFeedback(_) => MessageType::PortOutputCommandFeedback,
        }
    }

    /// Returns the hub id carried in the header.
    #[must_use]
    pub const fn hub_id(&self) -> u8 {
        match self {
            Self::HubAttachedIo(m) => m.hub_id,
            Self::GenericError(m) => m.hub_id,
            Self::PortInformation(m) => m.hub_id,
            Self::PortModeInformation(m) => m.hub_id,
            Self::PortInputFormatSetupSingle(m) => m.hub_id,
            Self::PortValueSingle(m) => m.hub_id,
            Self::PortInputFormatSingle(m) => m.hub_id,
            Self::VirtualPortSetup(m) => m.hub_id,
            Self::StartPower(m) => m.hub_id,
            Self::StartPower2(m) => m.hub_id,
            Self::PortOutputCommandFeedback(m) => m.hub_id,
        }
    }

    /// Returns the encoder for this message, if the host ever sends it.
    fn encoder(&self) -> Option<&dyn EncodeContent> {
        match self {
            Self::GenericError(m) => Some(m),
            Self::PortInputFormatSetupSingle(m) => Some(m),
            Self::VirtualPortSetup(m) => Some(m),
            Self::StartPower(m) => Some(m),
            Self::StartPower2(m) => Some(m),
            Self::HubAttachedIo(_)
            | Self::PortInformation(_)
            | Self::PortModeInformation(_)
            | Self::PortValueSingle(_)
            | Self::PortInputFormatSingle(_)
            | Self::PortOutputCommandFeedback(_) => None,
        }
    }

    /// Returns the encoded content length.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotSupported`] for messages that are only received.
    pub fn content_len(&self) -> Result<usize> {
        self.encoder()
            .map(|encoder| encoder.content_len())
            .ok_or_else(|| self.encode_not_supported())
    }

    /// Appends the content bytes to `buf`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotSupported`] for messages that are only received.
    pub fn encode_content(&self, buf: &mut BytesMut) -> Result<()> {
        let encoder = self.encoder().ok_or_else(|| self.encode_not_supported())?;
        encoder.encode_content(buf);
        Ok(())
    }

    const fn encode_not_supported(&self) -> Error {
        Error::NotSupported {
            message_type: self.message_type(),
            direction: Direction::Encode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content(message: &Message) -> Vec<u8> {
        let mut buf = BytesMut::new();
        message.encode_content(&mut buf).unwrap();
        assert_eq!(buf.len(), message.content_len().unwrap());
        buf.to_vec()
    }

    #[test]
    fn test_decode_port_input_format_single() {
        let data = [0x02, 0x01, 0xE8, 0x03, 0x00, 0x00, 0x01];
        let message = PortInputFormatSingle::decode_content(0x00, &data).unwrap();
        assert_eq!(message.port_id, 2);
        assert_eq!(message.mode, 1);
        assert_eq!(message.delta_interval, 1000);
        assert!(message.notification_enabled);
    }

    #[test]
    fn test_notification_enabled_only_for_0x01() {
        let data = [0x02, 0x01, 0x00, 0x00, 0x00, 0x00, 0x02];
        let message = PortInputFormatSingle::decode_content(0x00, &data).unwrap();
        assert!(!message.notification_enabled);
    }

    #[test]
    fn test_port_input_format_single_too_short() {
        let err = PortInputFormatSingle::decode_content(0x00, &[0x02, 0x01, 0xE8]).unwrap_err();
        assert_eq!(
            err,
            DecodeError::TooShort {
                message: "PortInputFormatSingle",
                needed: 7,
                got: 3,
            }
        );
    }

    #[test]
    fn test_port_input_format_single_has_no_encoder() {
        let message = Message::PortInputFormatSingle(PortInputFormatSingle {
            hub_id: 0,
            port_id: 2,
            mode: 1,
            delta_interval: 1000,
            notification_enabled: true,
        });
        let mut buf = BytesMut::new();
        assert!(matches!(
            message.encode_content(&mut buf),
            Err(Error::NotSupported {
                message_type: MessageType::PortInputFormatSingle,
                direction: Direction::Encode,
            })
        ));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_encode_start_power() {
        let message = Message::StartPower(PortOutputCommandStartPower {
            hub_id: 0,
            port_id: 0x00,
            startup: StartupInformation::EXECUTE_IMMEDIATELY,
            completion: CompletionInformation::COMMAND_FEEDBACK,
            power: -100,
        });
        assert_eq!(content(&message), vec![0x00, 0x11, 0x01, 0x9C]);
    }

    #[test]
    fn test_encode_start_power2() {
        let message = Message::StartPower2(PortOutputCommandStartPower2 {
            hub_id: 0,
            port_id: 0x10,
            startup: StartupInformation::EXECUTE_IMMEDIATELY,
            completion: CompletionInformation::NO_ACTION,
            power1: 30,
            power2: -30,
        });
        assert_eq!(content(&message), vec![0x10, 0x10, 0x02, 0x1E, 0xE2]);
    }

    #[test]
    fn test_encode_input_format_setup() {
        let message = Message::PortInputFormatSetupSingle(PortInputFormatSetupSingle {
            hub_id: 0,
            port_id: 0x64,
            mode: 0,
            delta_interval: 0xFFFF_FFFF,
            notification_enabled: true,
        });
        assert_eq!(
            content(&message),
            vec![0x64, 0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0x01]
        );
    }

    #[test]
    fn test_encode_virtual_port_setup() {
        let connect = Message::VirtualPortSetup(VirtualPortSetup {
            hub_id: 0,
            action: VirtualPortAction::Connect {
                port_a: 0x00,
                port_b: 0x01,
            },
        });
        assert_eq!(content(&connect), vec![0x01, 0x00, 0x01]);

        let disconnect = Message::VirtualPortSetup(VirtualPortSetup {
            hub_id: 0,
            action: VirtualPortAction::Disconnect { port_id: 0x10 },
        });
        assert_eq!(content(&disconnect), vec![0x00, 0x10]);
    }

    #[test]
    fn test_decode_port_output_command_unknown_sub_command() {
        let err = decode_port_output_command(0, &[0x00, 0x11, 0x51, 0x00, 0x32]).unwrap_err();
        assert_eq!(
            err,
            DecodeError::InvalidField {
                field: "sub-command",
                value: 0x51,
            }
        );
    }

    #[test]
    fn test_decode_generic_error() {
        let message = GenericError::decode_content(0, &[0x81, 0x05]).unwrap();
        assert_eq!(message.command_type, 0x81);
        assert_eq!(message.error_code, ErrorCode::CommandNotRecognized);

        let err = GenericError::decode_content(0, &[0x81, 0x42]).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidField { value: 0x42, .. }));
    }

    #[test]
    fn test_decode_attached_io() {
        let mut data = vec![0x00, 0x01];
        data.extend_from_slice(&0x002E_u16.to_le_bytes());
        data.extend_from_slice(&0x1000_0000_u32.to_le_bytes());
        data.extend_from_slice(&0x1000_0000_u32.to_le_bytes());
        let message = HubAttachedIo::decode_content(0, &data).unwrap();
        assert_eq!(message.port_id, 0);
        assert_eq!(
            message.event,
            AttachedIoEvent::Attached {
                io_type: IoType::TECHNIC_LARGE_MOTOR,
                hardware_revision: 0x1000_0000,
                software_revision: 0x1000_0000,
            }
        );
    }

    #[test]
    fn test_decode_attached_virtual_io() {
        let message =
            HubAttachedIo::decode_content(0, &[0x10, 0x02, 0x2E, 0x00, 0x00, 0x01]).unwrap();
        assert_eq!(
            message.event,
            AttachedIoEvent::AttachedVirtual {
                io_type: IoType::TECHNIC_LARGE_MOTOR,
                port_a: 0,
                port_b: 1,
            }
        );
    }

    #[test]
    fn test_decode_detached_io() {
        let message = HubAttachedIo::decode_content(0, &[0x01, 0x00]).unwrap();
        assert_eq!(message.event, AttachedIoEvent::Detached);
    }

    #[test]
    fn test_decode_feedback() {
        let message =
            PortOutputCommandFeedback::decode_content(0, &[0x00, 0x0A, 0x01, 0x01]).unwrap();
        assert_eq!(message.feedback.len(), 2);
        assert_eq!(message.feedback[0].port_id, 0);
        assert!(message.feedback[0].flags.contains(FeedbackFlags::COMPLETED));
        assert!(message.feedback[1].flags.contains(FeedbackFlags::IN_PROGRESS));
    }

    #[test]
    fn test_decode_port_mode_information_name() {
        let data = [
            0x64, 0x00, 0x00, 0x47, 0x45, 0x53, 0x54, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        ];
        let message = PortModeInformation::decode_content(0, &data).unwrap();
        assert_eq!(message.info, ModeInfo::Name("GEST".into()));
    }

    #[test]
    fn test_decode_port_mode_information_range_too_short() {
        let err = PortModeInformation::decode_content(0, &[0x64, 0x00, 0x01, 0x00]).unwrap_err();
        assert!(matches!(err, DecodeError::TooShort { needed: 11, .. }));
    }

    #[test]
    fn test_decode_port_value_single() {
        let message = PortValueSingle::decode_content(0, &[0x01, 0x0A]).unwrap();
        assert_eq!(message.port_id, 1);
        assert_eq!(&message.data[..], &[0x0A]);
    }
}
