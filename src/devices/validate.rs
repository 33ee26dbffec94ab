//! Preconditions shared by device commands.
//!
//! Every check runs before a message is built, so a rejected command never
//! reaches the transport.

use crate::devices::DevicePort;
use crate::error::{Error, Result};
use crate::protocol::SpecialSpeed;

/// Accepts power in `-100..=100` or the brake value `127`.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] naming `name` for anything else.
pub fn validate_power(power: i8, name: &'static str) -> Result<()> {
    if (-100..=100).contains(&power) || power == i8::from(SpecialSpeed::Brake) {
        return Ok(());
    }
    Err(Error::InvalidArgument {
        name,
        reason: format!("{power} is outside -100..=100 and is not 127 (brake)"),
    })
}

/// Requires an attached port on a connected hub.
///
/// # Errors
///
/// Returns [`Error::NotConnected`] otherwise.
pub fn require_connected(port: &DevicePort) -> Result<()> {
    if port.is_connected() {
        Ok(())
    } else {
        Err(Error::NotConnected)
    }
}

/// Requires a virtual port.
///
/// # Errors
///
/// Returns [`Error::InvalidPortKind`] for physical ports.
pub fn require_virtual(port: &DevicePort) -> Result<()> {
    if port.kind().is_virtual() {
        Ok(())
    } else {
        Err(Error::InvalidPortKind {
            port_id: port.port_id(),
            reason: "dual-motor commands need a virtual port",
        })
    }
}

/// Requires a physical port.
///
/// # Errors
///
/// Returns [`Error::InvalidPortKind`] for virtual ports.
pub fn require_physical(port: &DevicePort) -> Result<()> {
    if port.kind().is_virtual() {
        Err(Error::InvalidPortKind {
            port_id: port.port_id(),
            reason: "single-motor commands need a physical port",
        })
    } else {
        Ok(())
    }
}
