//! Typed mode values and calibration.

/// A mode value: the physical-unit reading and its calibrated percentage.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Value<T> {
    /// Value in SI units.
    pub si: T,
    /// Value in percent of the mode's range.
    pub pct: T,
}

/// Wire data type of a mode's datasets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DataType {
    /// Signed 8-bit.
    I8 = 0x00,
    /// Signed 16-bit, little-endian.
    I16 = 0x01,
    /// Signed 32-bit, little-endian.
    I32 = 0x02,
    /// IEEE 754 single precision, little-endian.
    F32 = 0x03,
}

impl DataType {
    /// Attempts to parse a data type from a byte.
    #[must_use]
    pub const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(Self::I8),
            0x01 => Some(Self::I16),
            0x02 => Some(Self::I32),
            0x03 => Some(Self::F32),
            _ => None,
        }
    }

    /// Size of one dataset in bytes.
    #[must_use]
    pub const fn width(self) -> usize {
        match self {
            Self::I8 => 1,
            Self::I16 => 2,
            Self::I32 | Self::F32 => 4,
        }
    }
}

/// A numeric type a mode value can be delivered as.
pub trait ModeValue: Copy + Default + PartialEq + Send + Sync + std::fmt::Debug + 'static {
    /// Wire representation of this type.
    const DATA_TYPE: DataType;

    /// Reads one little-endian value. `bytes` holds at least `DATA_TYPE.width()` bytes.
    fn read_le(bytes: &[u8]) -> Self;

    /// Widens to `f64` for calibration.
    fn to_f64(self) -> f64;

    /// Narrows from `f64`, rounding and saturating integer types.
    fn from_f64(value: f64) -> Self;
}

impl ModeValue for i8 {
    const DATA_TYPE: DataType = DataType::I8;

    fn read_le(bytes: &[u8]) -> Self {
        Self::from_le_bytes([bytes[0]])
    }

    fn to_f64(self) -> f64 {
        f64::from(self)
    }

    fn from_f64(value: f64) -> Self {
        // `as` saturates for float-to-int
        value.round() as Self
    }
}

impl ModeValue for i16 {
    const DATA_TYPE: DataType = DataType::I16;

    fn read_le(bytes: &[u8]) -> Self {
        Self::from_le_bytes([bytes[0], bytes[1]])
    }

    fn to_f64(self) -> f64 {
        f64::from(self)
    }

    fn from_f64(value: f64) -> Self {
        value.round() as Self
    }
}

impl ModeValue for i32 {
    const DATA_TYPE: DataType = DataType::I32;

    fn read_le(bytes: &[u8]) -> Self {
        Self::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    fn to_f64(self) -> f64 {
        f64::from(self)
    }

    fn from_f64(value: f64) -> Self {
        value.round() as Self
    }
}

impl ModeValue for f32 {
    const DATA_TYPE: DataType = DataType::F32;

    fn read_le(bytes: &[u8]) -> Self {
        Self::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    fn to_f64(self) -> f64 {
        f64::from(self)
    }

    fn from_f64(value: f64) -> Self {
        value as Self
    }
}

/// Linear calibration of a mode, as described by the hub's mode information.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModeScale {
    /// Raw range reported on the wire.
    pub raw: (f64, f64),
    /// Percentage range.
    pub pct: (f64, f64),
    /// SI range.
    pub si: (f64, f64),
}

impl ModeScale {
    /// A scale where raw, percentage and SI values coincide.
    #[must_use]
    pub const fn identity(min: f64, max: f64) -> Self {
        Self {
            raw: (min, max),
            pct: (min, max),
            si: (min, max),
        }
    }

    /// Converts a raw reading into its SI and percentage values.
    #[must_use]
    pub fn calibrate<T: ModeValue>(&self, raw: T) -> Value<T> {
        let raw = raw.to_f64();
        Value {
            si: T::from_f64(map_range(raw, self.raw, self.si)),
            pct: T::from_f64(map_range(raw, self.raw, self.pct)),
        }
    }
}

/// Maps `value` linearly from one range onto another.
fn map_range(value: f64, from: (f64, f64), to: (f64, f64)) -> f64 {
    let span = from.1 - from.0;
    if span == 0.0 {
        return to.0;
    }
    to.0 + (value - from.0) * (to.1 - to.0) / span
}
