//! Devices attached to hub ports.
//!
//! A device is a [`DevicePort`] plus the properties its kind exposes. The set
//! of device kinds is closed; what a kind can do is expressed by the
//! capability traits it implements:
//!
//! - [`PowerCommands`]: single-port power on physical ports
//! - [`DualPowerCommands`]: two-motor power on virtual ports
//! - [`ModeSubscription`]: input format setup
//!
//! Every command validates its arguments, then the link state, then the
//! port kind, and only then builds and sends a message.

pub mod gesture;
pub mod motor;
pub mod validate;
pub mod virtual_port;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::commands::MessageSender;
use crate::error::Result;
use crate::protocol::{
    CompletionInformation, PortInputFormatSetupSingle, PortOutputCommandStartPower,
    PortOutputCommandStartPower2, SpecialSpeed, StartupInformation,
};
use crate::types::PortKind;

pub use gesture::GestureSensor;
pub use motor::Motor;
pub use virtual_port::{VirtualPort, VirtualPortManager};

/// Startup behaviour used by the convenience commands.
pub const DEFAULT_STARTUP: StartupInformation = StartupInformation::EXECUTE_IMMEDIATELY;

/// Completion behaviour used by the convenience commands.
pub const DEFAULT_COMPLETION: CompletionInformation = CompletionInformation::COMMAND_FEEDBACK;

/// A port on a hub, as seen by the device bound to it.
#[derive(Clone)]
pub struct DevicePort {
    hub_id: u8,
    port_id: u8,
    kind: PortKind,
    attached: Arc<AtomicBool>,
    sender: Arc<dyn MessageSender>,
}

impl std::fmt::Debug for DevicePort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DevicePort")
            .field("hub_id", &self.hub_id)
            .field("port_id", &self.port_id)
            .field("kind", &self.kind)
            .field("attached", &self.is_attached())
            .finish_non_exhaustive()
    }
}

impl DevicePort {
    /// Creates a port handle.
    ///
    /// `attached` is shared with whoever tracks attachment notifications.
    #[must_use]
    pub fn new(
        hub_id: u8,
        port_id: u8,
        kind: PortKind,
        attached: Arc<AtomicBool>,
        sender: Arc<dyn MessageSender>,
    ) -> Self {
        Self {
            hub_id,
            port_id,
            kind,
            attached,
            sender,
        }
    }

    /// Returns the hub id.
    #[must_use]
    pub const fn hub_id(&self) -> u8 {
        self.hub_id
    }

    /// Returns the port id.
    #[must_use]
    pub const fn port_id(&self) -> u8 {
        self.port_id
    }

    /// Returns the port kind.
    #[must_use]
    pub const fn kind(&self) -> PortKind {
        self.kind
    }

    /// Returns true while the hub reports the port as attached.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::Acquire)
    }

    /// Returns true if the port is attached and the hub link is up.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.is_attached() && self.sender.is_connected()
    }

    /// Starts a single motor with explicit startup and completion behaviour.
    ///
    /// # Errors
    ///
    /// - [`crate::Error::InvalidArgument`] if `power` is not in `-100..=100` or `127`
    /// - [`crate::Error::NotConnected`] if the port is detached or the hub is down
    /// - [`crate::Error::InvalidPortKind`] on a virtual port
    /// - any transport error
    pub async fn start_power_with(
        &self,
        power: i8,
        startup: StartupInformation,
        completion: CompletionInformation,
    ) -> Result<()> {
        validate::validate_power(power, "power")?;
        validate::require_connected(self)?;
        validate::require_physical(self)?;

        tracing::debug!("port {}: start power {power}", self.port_id);
        let message = PortOutputCommandStartPower {
            hub_id: self.hub_id,
            port_id: self.port_id,
            startup,
            completion,
            power,
        };
        self.sender.send_message(message.into()).await
    }

    /// Starts a single motor.
    ///
    /// # Errors
    ///
    /// See [`DevicePort::start_power_with`].
    pub async fn start_power(&self, power: i8) -> Result<()> {
        self.start_power_with(power, DEFAULT_STARTUP, DEFAULT_COMPLETION)
            .await
    }

    /// Starts both motors of a virtual port with explicit behaviour flags.
    ///
    /// # Errors
    ///
    /// - [`crate::Error::InvalidArgument`] naming the offending power
    /// - [`crate::Error::NotConnected`] if the port is detached or the hub is down
    /// - [`crate::Error::InvalidPortKind`] on a physical port
    /// - any transport error
    pub async fn start_power_pair_with(
        &self,
        power1: i8,
        power2: i8,
        startup: StartupInformation,
        completion: CompletionInformation,
    ) -> Result<()> {
        validate::validate_power(power1, "power_on_motor1")?;
        validate::validate_power(power2, "power_on_motor2")?;
        validate::require_connected(self)?;
        validate::require_virtual(self)?;

        tracing::debug!("port {}: start power {power1}/{power2}", self.port_id);
        let message = PortOutputCommandStartPower2 {
            hub_id: self.hub_id,
            port_id: self.port_id,
            startup,
            completion,
            power1,
            power2,
        };
        self.sender.send_message(message.into()).await
    }

    /// Starts both motors of a virtual port.
    ///
    /// # Errors
    ///
    /// See [`DevicePort::start_power_pair_with`].
    pub async fn start_power_pair(&self, power1: i8, power2: i8) -> Result<()> {
        self.start_power_pair_with(power1, power2, DEFAULT_STARTUP, DEFAULT_COMPLETION)
            .await
    }

    /// Asks the hub to report values of `mode`.
    ///
    /// The hub answers with a port input format notification, after which
    /// values for this mode arrive.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NotConnected`] if the port is detached or the
    /// hub is down, or any transport error.
    pub async fn set_input_format(
        &self,
        mode: u8,
        delta_interval: u32,
        notification_enabled: bool,
    ) -> Result<()> {
        validate::require_connected(self)?;

        tracing::debug!(
            "port {}: input format mode {mode} delta {delta_interval} notify {notification_enabled}",
            self.port_id
        );
        let message = PortInputFormatSetupSingle {
            hub_id: self.hub_id,
            port_id: self.port_id,
            mode,
            delta_interval,
            notification_enabled,
        };
        self.sender.send_message(message.into()).await
    }
}

/// Common interface of all device kinds.
pub trait Device {
    /// Returns the port the device is bound to.
    fn port(&self) -> &DevicePort;

    /// Returns the port id.
    fn port_id(&self) -> u8 {
        self.port().port_id()
    }

    /// Returns true if the device can receive commands.
    fn is_connected(&self) -> bool {
        self.port().is_connected()
    }
}

/// Single-port power control.
pub trait PowerCommands: Device {
    /// Starts the motor at `power` percent, or brakes for `127`.
    fn start_power(&self, power: i8) -> impl Future<Output = Result<()>> + Send + '_ {
        self.port().start_power(power)
    }

    /// Stops the motor and holds its position.
    fn stop_by_brake(&self) -> impl Future<Output = Result<()>> + Send + '_ {
        self.start_power(SpecialSpeed::Brake.into())
    }

    /// Stops the motor and lets it coast.
    fn stop_by_float(&self) -> impl Future<Output = Result<()>> + Send + '_ {
        self.start_power(SpecialSpeed::Float.into())
    }
}

/// Two-motor power control.
pub trait DualPowerCommands: Device {
    /// Starts both motors of a virtual port.
    fn start_power_pair(
        &self,
        power1: i8,
        power2: i8,
    ) -> impl Future<Output = Result<()>> + Send + '_ {
        self.port().start_power_pair(power1, power2)
    }
}

/// Input format setup.
pub trait ModeSubscription: Device {
    /// Asks the hub to report values of `mode`.
    fn set_input_format(
        &self,
        mode: u8,
        delta_interval: u32,
        notification_enabled: bool,
    ) -> impl Future<Output = Result<()>> + Send + '_ {
        self.port()
            .set_input_format(mode, delta_interval, notification_enabled)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;
    use std::sync::atomic::AtomicBool;

    use tokio::sync::Mutex;

    use super::DevicePort;
    use crate::commands::{CommandSender, MessageSender};
    use crate::transport::{ChannelPeer, ChannelTransport, Transport};
    use crate::types::PortKind;

    /// A connected sender and the hub end of its link.
    pub(crate) async fn sender() -> (Arc<dyn MessageSender>, ChannelPeer) {
        let (mut transport, peer) = ChannelTransport::pair(16);
        transport.connect().await.unwrap();
        let sender = CommandSender::new(
            Arc::new(Mutex::new(transport)),
            Arc::new(AtomicBool::new(true)),
        );
        (Arc::new(sender), peer)
    }

    /// An attached port on a connected hub.
    pub(crate) async fn port(port_id: u8, kind: PortKind) -> (DevicePort, ChannelPeer) {
        let (sender, peer) = sender().await;
        let port = DevicePort::new(0, port_id, kind, Arc::new(AtomicBool::new(true)), sender);
        (port, peer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    const VIRTUAL: PortKind = PortKind::Virtual {
        port_a: 0,
        port_b: 1,
    };

    #[tokio::test]
    async fn test_start_power_bytes() {
        let (port, mut peer) = testing::port(0, PortKind::Physical).await;

        port.start_power(50).await.unwrap();
        assert_eq!(
            peer.recv().await.unwrap().as_ref(),
            &[0x07, 0x00, 0x81, 0x00, 0x11, 0x01, 0x32]
        );
    }

    #[tokio::test]
    async fn test_start_power_acceptance() {
        let (port, mut peer) = testing::port(0, PortKind::Physical).await;

        for power in i8::MIN..=i8::MAX {
            let result = port.start_power(power).await;
            let sent = peer.try_recv();
            if (-100..=100).contains(&power) || power == 127 {
                assert!(result.is_ok(), "power {power}");
                assert_eq!(sent.unwrap()[6], power.to_le_bytes()[0]);
            } else {
                assert!(matches!(result, Err(Error::InvalidArgument { name: "power", .. })));
                assert!(sent.is_none());
            }
        }
    }

    #[tokio::test]
    async fn test_argument_checked_before_connection() {
        let (port, mut peer) = testing::port(0, PortKind::Physical).await;
        port.attached.store(false, Ordering::Release);

        assert!(matches!(
            port.start_power(101).await,
            Err(Error::InvalidArgument { .. })
        ));
        assert!(matches!(port.start_power(10).await, Err(Error::NotConnected)));
        assert!(peer.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_dual_command_on_physical_port() {
        let (port, mut peer) = testing::port(0, PortKind::Physical).await;

        let result = port.start_power_pair(10, 20).await;
        assert!(matches!(result, Err(Error::InvalidPortKind { port_id: 0, .. })));
        assert!(peer.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_single_command_on_virtual_port() {
        let (port, mut peer) = testing::port(0x10, VIRTUAL).await;

        let result = port.start_power(10).await;
        assert!(matches!(result, Err(Error::InvalidPortKind { port_id: 0x10, .. })));
        assert!(peer.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_start_power_pair_bytes() {
        let (port, mut peer) = testing::port(0x10, VIRTUAL).await;

        port.start_power_pair(-100, 127).await.unwrap();
        assert_eq!(
            peer.recv().await.unwrap().as_ref(),
            &[0x08, 0x00, 0x81, 0x10, 0x11, 0x02, 0x9C, 0x7F]
        );
    }

    #[tokio::test]
    async fn test_start_power_pair_names_argument() {
        let (port, _peer) = testing::port(0x10, VIRTUAL).await;

        assert!(matches!(
            port.start_power_pair(0, -101).await,
            Err(Error::InvalidArgument {
                name: "power_on_motor2",
                ..
            })
        ));
        assert!(matches!(
            port.start_power_pair(-128, 0).await,
            Err(Error::InvalidArgument {
                name: "power_on_motor1",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_set_input_format_bytes() {
        let (port, mut peer) = testing::port(2, PortKind::Physical).await;

        port.set_input_format(1, 1000, true).await.unwrap();
        assert_eq!(
            peer.recv().await.unwrap().as_ref(),
            &[0x0A, 0x00, 0x41, 0x02, 0x01, 0xE8, 0x03, 0x00, 0x00, 0x01]
        );
    }
}
