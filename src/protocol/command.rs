//! Output command constants for the hub protocol.
//!
//! Port output commands carry a sub-command byte and a packed byte of
//! startup and completion information ahead of their parameters.

/// Port output sub-commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PortOutputSubCommand {
    /// Start a single motor at a power level.
    StartPower = 0x01,
    /// Start both motors of a virtual port at individual power levels.
    StartPower2 = 0x02,
}

impl PortOutputSubCommand {
    /// Attempts to parse a sub-command from a byte.
    #[must_use]
    pub const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(Self::StartPower),
            0x02 => Some(Self::StartPower2),
            _ => None,
        }
    }
}

impl From<PortOutputSubCommand> for u8 {
    fn from(cmd: PortOutputSubCommand) -> Self {
        cmd as Self
    }
}

/// Startup information flags (upper nibble of the packed byte).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StartupInformation(u8);

impl StartupInformation {
    /// Queue the command if the hub's buffer is busy.
    pub const BUFFER_IF_NECESSARY: Self = Self(0x00);

    /// Execute immediately, discarding the current command.
    pub const EXECUTE_IMMEDIATELY: Self = Self(0x01);

    /// Creates flags from a raw nibble.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & 0x0F)
    }

    /// Returns the raw nibble.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Check if a flag is set.
    #[must_use]
    pub const fn contains(self, flag: Self) -> bool {
        (self.0 & flag.0) == flag.0
    }
}

impl std::ops::BitOr for StartupInformation {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Completion information flags (lower nibble of the packed byte).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CompletionInformation(u8);

impl CompletionInformation {
    /// No feedback requested.
    pub const NO_ACTION: Self = Self(0x00);

    /// The hub emits command feedback notifications.
    pub const COMMAND_FEEDBACK: Self = Self(0x01);

    /// Creates flags from a raw nibble.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & 0x0F)
    }

    /// Returns the raw nibble.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Check if a flag is set.
    #[must_use]
    pub const fn contains(self, flag: Self) -> bool {
        (self.0 & flag.0) == flag.0
    }
}

impl std::ops::BitOr for CompletionInformation {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Packs startup and completion information into the wire byte.
#[must_use]
pub const fn pack_flags(startup: StartupInformation, completion: CompletionInformation) -> u8 {
    (startup.bits() << 4) | completion.bits()
}

/// Splits the wire byte into startup and completion information.
#[must_use]
pub const fn unpack_flags(byte: u8) -> (StartupInformation, CompletionInformation) {
    (
        StartupInformation::from_bits(byte >> 4),
        CompletionInformation::from_bits(byte),
    )
}

/// Power values with a special meaning outside the percentage range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i8)]
pub enum SpecialSpeed {
    /// Motor coasts freely.
    Float = 0,
    /// Motor brakes and holds.
    Brake = 127,
}

impl From<SpecialSpeed> for i8 {
    fn from(speed: SpecialSpeed) -> Self {
        speed as Self
    }
}

/// Error codes carried by generic error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ErrorCode {
    /// Acknowledged.
    Ack = 0x01,
    /// Multiple acknowledged.
    MAck = 0x02,
    /// Buffer overflow.
    BufferOverflow = 0x03,
    /// Timeout.
    Timeout = 0x04,
    /// Command not recognized.
    CommandNotRecognized = 0x05,
    /// Invalid use (e.g. parameter errors).
    InvalidUse = 0x06,
    /// Overcurrent.
    Overcurrent = 0x07,
    /// Internal error.
    InternalError = 0x08,
}

impl ErrorCode {
    /// Attempts to parse an error code from a byte.
    #[must_use]
    pub const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(Self::Ack),
            0x02 => Some(Self::MAck),
            0x03 => Some(Self::BufferOverflow),
            0x04 => Some(Self::Timeout),
            0x05 => Some(Self::CommandNotRecognized),
            0x06 => Some(Self::InvalidUse),
            0x07 => Some(Self::Overcurrent),
            0x08 => Some(Self::InternalError),
            _ => None,
        }
    }
}

impl From<ErrorCode> for u8 {
    fn from(code: ErrorCode) -> Self {
        code as Self
    }
}

/// Feedback flags reported per port in command feedback messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FeedbackFlags(u8);

impl FeedbackFlags {
    /// Buffer empty, command in progress.
    pub const IN_PROGRESS: Self = Self(0x01);

    /// Buffer empty, command completed.
    pub const COMPLETED: Self = Self(0x02);

    /// Current command discarded.
    pub const DISCARDED: Self = Self(0x04);

    /// Port idle.
    pub const IDLE: Self = Self(0x08);

    /// Buffer busy or full.
    pub const BUSY_FULL: Self = Self(0x10);

    /// Creates flags from a raw byte.
    #[must_use]
    pub const fn from_byte(byte: u8) -> Self {
        Self(byte)
    }

    /// Returns the raw byte value.
    #[must_use]
    pub const fn as_byte(self) -> u8 {
        self.0
    }

    /// Check if a flag is set.
    #[must_use]
    pub const fn contains(self, flag: Self) -> bool {
        (self.0 & flag.0) == flag.0
    }
}
