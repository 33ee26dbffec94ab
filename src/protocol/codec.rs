//! Message codec registry.
//!
//! Maps message type discriminants to content decoders. The registry is
//! built once and shared; decoding a buffer validates the common header,
//! looks up the decoder for the discriminant and hands it the content bytes.

use std::collections::HashMap;
use std::sync::LazyLock;

use bytes::{Bytes, BytesMut};

use crate::error::{DecodeError, Direction, Error, Result};
use crate::protocol::frame::{self, put_length, read_header, total_length};
use crate::protocol::message::{
    DecodeContent, GenericError, HubAttachedIo, Message, PortInformation,
    PortInputFormatSingle, PortModeInformation, PortOutputCommandFeedback, PortValueSingle,
    decode_port_output_command,
};
use crate::protocol::message_type::MessageType;

/// Decodes the content bytes of one message type.
pub type DecodeFn = fn(u8, &[u8]) -> std::result::Result<Message, DecodeError>;

static REGISTRY: LazyLock<CodecRegistry> = LazyLock::new(CodecRegistry::standard);

/// Decodes content into a variant and wraps it in [`Message`].
fn decode_as<M>(hub_id: u8, data: &[u8]) -> std::result::Result<Message, DecodeError>
where
    M: DecodeContent + Into<Message>,
{
    M::decode_content(hub_id, data).map(Into::into)
}

/// Table of content decoders keyed by message type.
#[derive(Debug, Clone)]
pub struct CodecRegistry {
    decoders: HashMap<MessageType, DecodeFn>,
}

impl CodecRegistry {
    /// Builds the registry of all messages the hub sends.
    #[must_use]
    pub fn standard() -> Self {
        let mut decoders: HashMap<MessageType, DecodeFn> = HashMap::new();
        decoders.insert(MessageType::HubAttachedIo, decode_as::<HubAttachedIo>);
        decoders.insert(MessageType::GenericError, decode_as::<GenericError>);
        decoders.insert(MessageType::PortInformation, decode_as::<PortInformation>);
        decoders.insert(
            MessageType::PortModeInformation,
            decode_as::<PortModeInformation>,
        );
        decoders.insert(MessageType::PortValueSingle, decode_as::<PortValueSingle>);
        decoders.insert(
            MessageType::PortInputFormatSingle,
            decode_as::<PortInputFormatSingle>,
        );
        decoders.insert(MessageType::PortOutputCommand, decode_port_output_command);
        decoders.insert(
            MessageType::PortOutputCommandFeedback,
            decode_as::<PortOutputCommandFeedback>,
        );
        Self { decoders }
    }

    /// Returns the process-wide registry.
    #[must_use]
    pub fn global() -> &'static Self {
        &REGISTRY
    }

    /// Decodes one complete message buffer.
    ///
    /// # Errors
    ///
    /// - [`Error::Framing`] if the length prefix does not match the buffer
    /// - [`Error::Decode`] for unknown discriminants or malformed content
    /// - [`Error::NotSupported`] for messages the host only sends
    pub fn decode(&self, data: &[u8]) -> Result<Message> {
        let header = read_header(data)?;

        let message_type = MessageType::from_byte(header.message_type)
            .ok_or(DecodeError::UnknownMessageType(header.message_type))?;

        let decoder = self
            .decoders
            .get(&message_type)
            .ok_or(Error::NotSupported {
                message_type,
                direction: Direction::Decode,
            })?;

        Ok(decoder(header.hub_id, &data[header.header_len..])?)
    }

    /// Encodes a message including its common header.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotSupported`] for messages the host only receives.
    pub fn encode(&self, message: &Message) -> Result<Bytes> {
        let content_len = message.content_len()?;
        let length = total_length(content_len);

        let mut buf = BytesMut::with_capacity(length);
        put_length(&mut buf, length)?;
        buf.extend_from_slice(&[message.hub_id(), message.message_type().into()]);
        message.encode_content(&mut buf)?;

        debug_assert_eq!(buf.len(), length);
        Ok(buf.freeze())
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

/// Decodes a message with the global registry.
///
/// # Errors
///
/// See [`CodecRegistry::decode`].
pub fn decode(data: &[u8]) -> Result<Message> {
    CodecRegistry::global().decode(data)
}

/// Encodes a message with the global registry.
///
/// # Errors
///
/// See [`CodecRegistry::encode`].
pub fn encode(message: &Message) -> Result<Bytes> {
    CodecRegistry::global().encode(message)
}

/// Frames raw content without going through a typed message.
///
/// # Errors
///
/// Returns a framing error if the content is too large.
pub fn encode_raw(hub_id: u8, message_type: MessageType, content: &[u8]) -> Result<Bytes> {
    Ok(frame::encode(hub_id, message_type.into(), content)?)
}
