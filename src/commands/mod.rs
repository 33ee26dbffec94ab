//! Command submission.
//!
//! Devices hand typed messages to a [`MessageSender`]. The sender encodes
//! them and completes once the transport has accepted the buffer; command
//! feedback and hub errors arrive later as events.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::future::BoxFuture;
use tokio::sync::Mutex;

use crate::error::{Error, Result};
use crate::protocol::{CodecRegistry, Message};
use crate::transport::Transport;

/// Outbound seam between devices and the hub link.
pub trait MessageSender: Send + Sync {
    /// Encodes and sends one message.
    ///
    /// Encoding happens before the first suspension point, so a message that
    /// fails to encode never reaches the transport.
    fn send_message(&self, message: Message) -> BoxFuture<'_, Result<()>>;

    /// Returns true while the hub link is up.
    fn is_connected(&self) -> bool;
}

/// [`MessageSender`] backed by a shared transport.
pub struct CommandSender<T> {
    transport: Arc<Mutex<T>>,
    connected: Arc<AtomicBool>,
    registry: &'static CodecRegistry,
}

impl<T: Transport> CommandSender<T> {
    /// Creates a sender over a shared transport.
    ///
    /// `connected` is owned by the hub, which clears it when the link drops.
    #[must_use]
    pub fn new(transport: Arc<Mutex<T>>, connected: Arc<AtomicBool>) -> Self {
        Self {
            transport,
            connected,
            registry: CodecRegistry::global(),
        }
    }
}

impl<T: Transport> MessageSender for CommandSender<T> {
    fn send_message(&self, message: Message) -> BoxFuture<'_, Result<()>> {
        let encoded = self.registry.encode(&message);
        Box::pin(async move {
            let data = encoded?;
            if !self.is_connected() {
                return Err(Error::NotConnected);
            }
            tracing::trace!(
                "sending {:?} to hub {}: {}",
                message.message_type(),
                message.hub_id(),
                hex::encode(&data)
            );
            let mut transport = self.transport.lock().await;
            transport.send(data).await
        })
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{
        CompletionInformation, HubAttachedIo, PortOutputCommandStartPower, StartupInformation,
    };
    use crate::protocol::message::AttachedIoEvent;
    use crate::transport::ChannelTransport;

    async fn connected_sender() -> (CommandSender<ChannelTransport>, crate::transport::ChannelPeer) {
        let (mut transport, peer) = ChannelTransport::pair(8);
        transport.connect().await.unwrap();
        let sender = CommandSender::new(
            Arc::new(Mutex::new(transport)),
            Arc::new(AtomicBool::new(true)),
        );
        (sender, peer)
    }

    #[tokio::test]
    async fn test_send_message() {
        let (sender, mut peer) = connected_sender().await;

        sender
            .send_message(
                PortOutputCommandStartPower {
                    hub_id: 0,
                    port_id: 0,
                    startup: StartupInformation::EXECUTE_IMMEDIATELY,
                    completion: CompletionInformation::COMMAND_FEEDBACK,
                    power: 50,
                }
                .into(),
            )
            .await
            .unwrap();

        assert_eq!(
            peer.recv().await.unwrap().as_ref(),
            &[0x07, 0x00, 0x81, 0x00, 0x11, 0x01, 0x32]
        );
    }

    #[tokio::test]
    async fn test_unencodable_message_sends_nothing() {
        let (sender, mut peer) = connected_sender().await;

        let result = sender
            .send_message(
                HubAttachedIo {
                    hub_id: 0,
                    port_id: 0,
                    event: AttachedIoEvent::Detached,
                }
                .into(),
            )
            .await;

        assert!(matches!(result, Err(Error::NotSupported { .. })));
        assert!(peer.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_send_when_disconnected() {
        let (sender, mut peer) = connected_sender().await;
        sender.connected.store(false, Ordering::Release);

        let result = sender
            .send_message(
                PortOutputCommandStartPower {
                    hub_id: 0,
                    port_id: 0,
                    startup: StartupInformation::EXECUTE_IMMEDIATELY,
                    completion: CompletionInformation::NO_ACTION,
                    power: 0,
                }
                .into(),
            )
            .await;

        assert!(matches!(result, Err(Error::NotConnected)));
        assert!(peer.try_recv().is_none());
    }
}
