//! Message type discriminants for the hub protocol.
//!
//! The message type is the byte following the hub id in the common header
//! and selects the layout of the content that follows.

/// Message type discriminants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MessageType {
    // Hub related (0x01-0x0F)
    /// Hub property request/update.
    HubProperties = 0x01,
    /// Hub actions (switch off, disconnect, ...).
    HubActions = 0x02,
    /// Hub alerts.
    HubAlerts = 0x03,
    /// Port attached/detached notification.
    HubAttachedIo = 0x04,
    /// Generic error for a previously sent command.
    GenericError = 0x05,

    // Port input (0x21-0x48)
    /// Request port information.
    PortInformationRequest = 0x21,
    /// Request port mode information.
    PortModeInformationRequest = 0x22,
    /// Set up the input format of a single mode.
    PortInputFormatSetupSingle = 0x41,
    /// Set up a combined input format.
    PortInputFormatSetupCombinedMode = 0x42,
    /// Port information.
    PortInformation = 0x43,
    /// Port mode information.
    PortModeInformation = 0x44,
    /// Value of a single mode.
    PortValueSingle = 0x45,
    /// Values of a combined mode.
    PortValueCombinedMode = 0x46,
    /// Current single input format.
    PortInputFormatSingle = 0x47,
    /// Current combined input format.
    PortInputFormatCombinedMode = 0x48,

    // Output (0x61-0x82)
    /// Connect or disconnect a virtual port.
    VirtualPortSetup = 0x61,
    /// Port output command.
    PortOutputCommand = 0x81,
    /// Port output command feedback.
    PortOutputCommandFeedback = 0x82,
}

impl MessageType {
    /// Attempts to parse a message type from a byte.
    #[must_use]
    pub const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(Self::HubProperties),
            0x02 => Some(Self::HubActions),
            0x03 => Some(Self::HubAlerts),
            0x04 => Some(Self::HubAttachedIo),
            0x05 => Some(Self::GenericError),
            0x21 => Some(Self::PortInformationRequest),
            0x22 => Some(Self::PortModeInformationRequest),
            0x41 => Some(Self::PortInputFormatSetupSingle),
            0x42 => Some(Self::PortInputFormatSetupCombinedMode),
            0x43 => Some(Self::PortInformation),
            0x44 => Some(Self::PortModeInformation),
            0x45 => Some(Self::PortValueSingle),
            0x46 => Some(Self::PortValueCombinedMode),
            0x47 => Some(Self::PortInputFormatSingle),
            0x48 => Some(Self::PortInputFormatCombinedMode),
            0x61 => Some(Self::VirtualPortSetup),
            0x81 => Some(Self::PortOutputCommand),
            0x82 => Some(Self::PortOutputCommandFeedback),
            _ => None,
        }
    }

}

impl From<MessageType> for u8 {
    fn from(message_type: MessageType) -> Self {
        message_type as Self
    }
}
