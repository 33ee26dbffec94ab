//! Port and attached IO types.

/// Type of peripheral attached to a port, as reported by the hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IoType(u16);

impl IoType {
    /// Basic motor.
    pub const MOTOR: Self = Self(0x0001);
    /// Train motor.
    pub const SYSTEM_TRAIN_MOTOR: Self = Self(0x0002);
    /// Hub LED.
    pub const RGB_LIGHT: Self = Self(0x0017);
    /// Technic large motor.
    pub const TECHNIC_LARGE_MOTOR: Self = Self(0x002E);
    /// Technic XL motor.
    pub const TECHNIC_XLARGE_MOTOR: Self = Self(0x002F);
    /// Technic medium hub gesture sensor.
    pub const TECHNIC_MEDIUM_HUB_GEST_SENSOR: Self = Self(0x0036);

    /// Creates an IO type from its raw value.
    #[must_use]
    pub const fn from_raw(raw: u16) -> Self {
        Self(raw)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn raw(self) -> u16 {
        self.0
    }

    /// Returns true for IO types that accept power commands.
    #[must_use]
    pub const fn is_motor(self) -> bool {
        matches!(self.0, 0x0001 | 0x0002 | 0x002E | 0x002F)
    }
}

/// Whether a port is physical or a hub-created composite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortKind {
    /// A physical attachment point.
    Physical,
    /// A virtual port bonding two physical ports.
    Virtual {
        /// First bonded port.
        port_a: u8,
        /// Second bonded port.
        port_b: u8,
    },
}

impl PortKind {
    /// Returns true for virtual ports.
    #[must_use]
    pub const fn is_virtual(&self) -> bool {
        matches!(self, Self::Virtual { .. })
    }
}
