//! Virtual ports and attachment tracking.
//!
//! A virtual port is created by the hub on request and bonds two physical
//! ports, so both motors can be driven by one command. The hub announces it
//! with an attached-virtual notification naming the new port id.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crate::commands::MessageSender;
use crate::devices::{Device, DevicePort, DualPowerCommands};
use crate::error::{Error, Result};
use crate::protocol::{AttachedIoEvent, HubAttachedIo, VirtualPortAction, VirtualPortSetup};
use crate::types::{IoType, PortKind};

/// A virtual port bonding two physical ports.
#[derive(Debug)]
pub struct VirtualPort {
    port: DevicePort,
}

impl VirtualPort {
    /// Returns the bonded physical ports.
    #[must_use]
    pub const fn bonded_ports(&self) -> (u8, u8) {
        match self.port.kind() {
            PortKind::Virtual { port_a, port_b } => (port_a, port_b),
            // Only created from virtual entries
            PortKind::Physical => (self.port.port_id(), self.port.port_id()),
        }
    }
}

impl Device for VirtualPort {
    fn port(&self) -> &DevicePort {
        &self.port
    }
}

impl DualPowerCommands for VirtualPort {}

#[derive(Debug)]
struct PortEntry {
    attached: Arc<AtomicBool>,
    io_type: Option<IoType>,
    kind: PortKind,
}

impl PortEntry {
    fn detached() -> Self {
        Self {
            attached: Arc::new(AtomicBool::new(false)),
            io_type: None,
            kind: PortKind::Physical,
        }
    }

    fn is_attached(&self) -> bool {
        self.attached.load(Ordering::Acquire)
    }
}

/// Tracks which ports of a hub are attached and which are virtual.
pub struct VirtualPortManager {
    hub_id: u8,
    sender: Arc<dyn MessageSender>,
    ports: RwLock<HashMap<u8, PortEntry>>,
}

impl VirtualPortManager {
    /// Creates a manager for one hub.
    #[must_use]
    pub fn new(hub_id: u8, sender: Arc<dyn MessageSender>) -> Self {
        Self {
            hub_id,
            sender,
            ports: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the attachment flag of a port, creating a detached entry if needed.
    ///
    /// Devices hold this flag; it flips when the hub reports the port
    /// attached or detached.
    pub fn attachment(&self, port_id: u8) -> Arc<AtomicBool> {
        let mut ports = self.ports.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&ports.entry(port_id).or_insert_with(PortEntry::detached).attached)
    }

    /// Returns true if the hub reports the port as attached.
    #[must_use]
    pub fn is_attached(&self, port_id: u8) -> bool {
        self.ports
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&port_id)
            .is_some_and(PortEntry::is_attached)
    }

    /// Returns the IO type attached to a port.
    #[must_use]
    pub fn io_type(&self, port_id: u8) -> Option<IoType> {
        self.ports
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&port_id)
            .filter(|entry| entry.is_attached())
            .and_then(|entry| entry.io_type)
    }

    /// Returns the kind of an attached port.
    #[must_use]
    pub fn kind(&self, port_id: u8) -> Option<PortKind> {
        self.ports
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&port_id)
            .filter(|entry| entry.is_attached())
            .map(|entry| entry.kind)
    }

    /// Applies an attachment notification.
    pub fn handle_attached_io(&self, message: &HubAttachedIo) {
        let mut ports = self.ports.write().unwrap_or_else(PoisonError::into_inner);
        let entry = ports
            .entry(message.port_id)
            .or_insert_with(PortEntry::detached);

        match message.event {
            AttachedIoEvent::Detached => {
                tracing::debug!("port {} detached", message.port_id);
                entry.io_type = None;
                entry.attached.store(false, Ordering::Release);
            }
            AttachedIoEvent::Attached { io_type, .. } => {
                tracing::debug!("port {} attached: {io_type:?}", message.port_id);
                entry.io_type = Some(io_type);
                entry.kind = PortKind::Physical;
                entry.attached.store(true, Ordering::Release);
            }
            AttachedIoEvent::AttachedVirtual {
                io_type,
                port_a,
                port_b,
            } => {
                tracing::debug!(
                    "virtual port {} attached: {port_a} + {port_b}",
                    message.port_id
                );
                entry.io_type = Some(io_type);
                entry.kind = PortKind::Virtual { port_a, port_b };
                entry.attached.store(true, Ordering::Release);
            }
        }
    }

    /// Returns the id of the attached virtual port bonding `port_a` and `port_b`.
    #[must_use]
    pub fn virtual_port_id(&self, port_a: u8, port_b: u8) -> Option<u8> {
        let wanted = PortKind::Virtual { port_a, port_b };
        self.ports
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|(_, entry)| entry.is_attached() && entry.kind == wanted)
            .map(|(port_id, _)| *port_id)
    }

    /// Returns the physical ports bonded by a virtual port.
    #[must_use]
    pub fn bonded_ports(&self, virtual_port_id: u8) -> Option<(u8, u8)> {
        match self.kind(virtual_port_id)? {
            PortKind::Virtual { port_a, port_b } => Some((port_a, port_b)),
            PortKind::Physical => None,
        }
    }

    /// Asks the hub to bond two attached physical ports.
    ///
    /// Completes once the request is sent. The virtual port exists only after
    /// the hub's attachment notification.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] if both ids are the same
    /// - [`Error::NotConnected`] if either port is detached
    /// - [`Error::InvalidPortKind`] if either port is virtual
    /// - any transport error
    pub async fn connect(&self, port_a: u8, port_b: u8) -> Result<()> {
        if port_a == port_b {
            return Err(Error::InvalidArgument {
                name: "port_b",
                reason: format!("port {port_b} cannot be bonded with itself"),
            });
        }
        for port_id in [port_a, port_b] {
            match self.kind(port_id) {
                None => return Err(Error::NotConnected),
                Some(PortKind::Virtual { .. }) => {
                    return Err(Error::InvalidPortKind {
                        port_id,
                        reason: "only physical ports can be bonded",
                    });
                }
                Some(PortKind::Physical) => {}
            }
        }

        tracing::info!("connecting virtual port for {port_a} + {port_b}");
        let message = VirtualPortSetup {
            hub_id: self.hub_id,
            action: VirtualPortAction::Connect { port_a, port_b },
        };
        self.sender.send_message(message.into()).await
    }

    /// Asks the hub to tear down a virtual port.
    ///
    /// # Errors
    ///
    /// - [`Error::NotConnected`] if the port is not attached
    /// - [`Error::InvalidPortKind`] if the port is physical
    /// - any transport error
    pub async fn disconnect(&self, virtual_port_id: u8) -> Result<()> {
        match self.kind(virtual_port_id) {
            None => return Err(Error::NotConnected),
            Some(PortKind::Physical) => {
                return Err(Error::InvalidPortKind {
                    port_id: virtual_port_id,
                    reason: "not a virtual port",
                });
            }
            Some(PortKind::Virtual { .. }) => {}
        }

        tracing::info!("disconnecting virtual port {virtual_port_id}");
        let message = VirtualPortSetup {
            hub_id: self.hub_id,
            action: VirtualPortAction::Disconnect {
                port_id: virtual_port_id,
            },
        };
        self.sender.send_message(message.into()).await
    }

    /// Creates the device for an attached virtual port.
    ///
    /// # Errors
    ///
    /// - [`Error::NotConnected`] if the port is not attached
    /// - [`Error::InvalidPortKind`] if the port is physical
    pub fn create_device(&self, virtual_port_id: u8) -> Result<VirtualPort> {
        let ports = self.ports.read().unwrap_or_else(PoisonError::into_inner);
        let entry = ports
            .get(&virtual_port_id)
            .filter(|entry| entry.is_attached())
            .ok_or(Error::NotConnected)?;
        if !entry.kind.is_virtual() {
            return Err(Error::InvalidPortKind {
                port_id: virtual_port_id,
                reason: "not a virtual port",
            });
        }

        let port = DevicePort::new(
            self.hub_id,
            virtual_port_id,
            entry.kind,
            Arc::clone(&entry.attached),
            Arc::clone(&self.sender),
        );
        Ok(VirtualPort { port })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::testing;

    fn attached(port_id: u8) -> HubAttachedIo {
        HubAttachedIo {
            hub_id: 0,
            port_id,
            event: AttachedIoEvent::Attached {
                io_type: IoType::TECHNIC_LARGE_MOTOR,
                hardware_revision: 0,
                software_revision: 0,
            },
        }
    }

    fn attached_virtual(port_id: u8, port_a: u8, port_b: u8) -> HubAttachedIo {
        HubAttachedIo {
            hub_id: 0,
            port_id,
            event: AttachedIoEvent::AttachedVirtual {
                io_type: IoType::TECHNIC_LARGE_MOTOR,
                port_a,
                port_b,
            },
        }
    }

    fn detached(port_id: u8) -> HubAttachedIo {
        HubAttachedIo {
            hub_id: 0,
            port_id,
            event: AttachedIoEvent::Detached,
        }
    }

    #[tokio::test]
    async fn test_attachment_tracking() {
        let (sender, _peer) = testing::sender().await;
        let manager = VirtualPortManager::new(0, sender);

        let flag = manager.attachment(0);
        assert!(!flag.load(Ordering::Acquire));

        manager.handle_attached_io(&attached(0));
        assert!(flag.load(Ordering::Acquire));
        assert!(manager.is_attached(0));
        assert_eq!(manager.io_type(0), Some(IoType::TECHNIC_LARGE_MOTOR));

        manager.handle_attached_io(&detached(0));
        assert!(!flag.load(Ordering::Acquire));
        assert_eq!(manager.io_type(0), None);
    }

    #[tokio::test]
    async fn test_connect_sends_setup() {
        let (sender, mut peer) = testing::sender().await;
        let manager = VirtualPortManager::new(0, sender);
        manager.handle_attached_io(&attached(0));
        manager.handle_attached_io(&attached(1));

        manager.connect(0, 1).await.unwrap();
        assert_eq!(
            peer.recv().await.unwrap().as_ref(),
            &[0x06, 0x00, 0x61, 0x01, 0x00, 0x01]
        );
    }

    #[tokio::test]
    async fn test_connect_requires_attached_ports() {
        let (sender, mut peer) = testing::sender().await;
        let manager = VirtualPortManager::new(0, sender);
        manager.handle_attached_io(&attached(0));

        assert!(matches!(manager.connect(0, 1).await, Err(Error::NotConnected)));
        assert!(matches!(
            manager.connect(0, 0).await,
            Err(Error::InvalidArgument { .. })
        ));
        assert!(peer.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_virtual_device_lifecycle() {
        let (sender, mut peer) = testing::sender().await;
        let manager = VirtualPortManager::new(0, sender);
        manager.handle_attached_io(&attached(0));
        manager.handle_attached_io(&attached(1));
        manager.handle_attached_io(&attached_virtual(0x10, 0, 1));

        assert_eq!(manager.virtual_port_id(0, 1), Some(0x10));
        assert_eq!(manager.bonded_ports(0x10), Some((0, 1)));

        let device = manager.create_device(0x10).unwrap();
        assert_eq!(device.bonded_ports(), (0, 1));
        device.start_power_pair(50, -50).await.unwrap();
        assert_eq!(
            peer.recv().await.unwrap().as_ref(),
            &[0x08, 0x00, 0x81, 0x10, 0x11, 0x02, 0x32, 0xCE]
        );

        manager.disconnect(0x10).await.unwrap();
        assert_eq!(
            peer.recv().await.unwrap().as_ref(),
            &[0x05, 0x00, 0x61, 0x00, 0x10]
        );

        manager.handle_attached_io(&detached(0x10));
        assert!(!device.is_connected());
        assert_eq!(manager.virtual_port_id(0, 1), None);
        assert!(matches!(
            device.start_power_pair(10, 10).await,
            Err(Error::NotConnected)
        ));
    }

    #[tokio::test]
    async fn test_create_device_on_physical_port() {
        let (sender, _peer) = testing::sender().await;
        let manager = VirtualPortManager::new(0, sender);
        manager.handle_attached_io(&attached(0));

        assert!(matches!(
            manager.create_device(0),
            Err(Error::InvalidPortKind { port_id: 0, .. })
        ));
        assert!(matches!(manager.create_device(7), Err(Error::NotConnected)));
    }
}
