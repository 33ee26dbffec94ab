//! Protocol definitions for hub communication.
//!
//! This module contains the low-level protocol types including:
//! - Common header encoding/decoding
//! - Message type discriminants
//! - Output command constants
//! - Typed messages and the codec registry
//! - Static port capability blobs

pub mod capability;
pub mod codec;
pub mod command;
pub mod frame;
pub mod message;
pub mod message_type;

pub use codec::{CodecRegistry, decode, encode};
pub use command::{
    CompletionInformation, ErrorCode, FeedbackFlags, PortOutputSubCommand, SpecialSpeed,
    StartupInformation,
};
pub use frame::{Header, MAX_MESSAGE_LEN};
pub use message::{
    AttachedIoEvent, GenericError, HubAttachedIo, Message, ModeInfo, PortFeedback,
    PortInformation, PortInputFormatSetupSingle, PortInputFormatSingle, PortModeInformation,
    PortOutputCommandFeedback, PortOutputCommandStartPower, PortOutputCommandStartPower2,
    PortValueSingle, VirtualPortAction, VirtualPortSetup,
};
pub use message_type::MessageType;
