//! In-memory channel transport.
//!
//! [`ChannelTransport`] is the host end of a pair of Tokio channels; the
//! [`ChannelPeer`] plays the hub: it receives what the host sends and injects
//! notifications.

use bytes::Bytes;
use futures::future::BoxFuture;
use tokio::sync::mpsc;

use crate::error::{Error, Result};
use crate::transport::Transport;

/// Default channel capacity.
pub const DEFAULT_CAPACITY: usize = 64;

/// Host end of an in-memory link.
pub struct ChannelTransport {
    outbound: mpsc::Sender<Bytes>,
    inbound: Option<mpsc::Receiver<Bytes>>,
    connected: bool,
}

/// Hub end of an in-memory link.
pub struct ChannelPeer {
    outbound: mpsc::Receiver<Bytes>,
    inbound: mpsc::Sender<Bytes>,
}

impl ChannelTransport {
    /// Creates a transport/peer pair with [`DEFAULT_CAPACITY`].
    #[must_use]
    pub fn default_pair() -> (Self, ChannelPeer) {
        Self::pair(DEFAULT_CAPACITY)
    }

    /// Creates a transport/peer pair with the given capacity.
    #[must_use]
    pub fn pair(capacity: usize) -> (Self, ChannelPeer) {
        let (outbound_tx, outbound_rx) = mpsc::channel(capacity);
        let (inbound_tx, inbound_rx) = mpsc::channel(capacity);

        let transport = Self {
            outbound: outbound_tx,
            inbound: Some(inbound_rx),
            connected: false,
        };
        let peer = ChannelPeer {
            outbound: outbound_rx,
            inbound: inbound_tx,
        };
        (transport, peer)
    }
}

impl Transport for ChannelTransport {
    fn connect(&mut self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            if !self.connected {
                tracing::info!("channel transport connected");
                self.connected = true;
            }
            Ok(())
        })
    }

    fn disconnect(&mut self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            if self.connected {
                tracing::info!("channel transport disconnected");
                self.connected = false;
            }
            Ok(())
        })
    }

    fn send(&mut self, data: Bytes) -> BoxFuture<'_, Result<()>> {
        let outbound = self.outbound.clone();
        let connected = self.connected;
        Box::pin(async move {
            if !connected {
                return Err(Error::NotConnected);
            }
            tracing::trace!("sending {} bytes", data.len());
            outbound.send(data).await.map_err(|_| Error::ChannelClosed)
        })
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn take_notifications(&mut self) -> Option<mpsc::Receiver<Bytes>> {
        self.inbound.take()
    }
}

impl ChannelPeer {
    /// Injects a notification as if the hub had sent it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChannelClosed`] if the host end was dropped.
    pub async fn notify(&self, data: impl Into<Bytes>) -> Result<()> {
        self.inbound
            .send(data.into())
            .await
            .map_err(|_| Error::ChannelClosed)
    }

    /// Receives the next buffer the host sent.
    pub async fn recv(&mut self) -> Option<Bytes> {
        self.outbound.recv().await
    }

    /// Receives a buffer the host already sent, without waiting.
    pub fn try_recv(&mut self) -> Option<Bytes> {
        self.outbound.try_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_send_requires_connection() {
        let (mut transport, mut peer) = ChannelTransport::pair(4);
        assert!(matches!(
            transport.send(Bytes::from_static(&[0x01])).await,
            Err(Error::NotConnected)
        ));
        assert!(peer.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_send_and_notify() {
        let (mut transport, mut peer) = ChannelTransport::pair(4);
        transport.connect().await.unwrap();
        assert!(transport.is_connected());

        transport
            .send(Bytes::from_static(&[0x03, 0x00, 0x01]))
            .await
            .unwrap();
        assert_eq!(peer.recv().await.unwrap(), Bytes::from_static(&[0x03, 0x00, 0x01]));

        let mut notifications = transport.take_notifications().unwrap();
        assert!(transport.take_notifications().is_none());
        peer.notify(vec![0x05, 0x00, 0x04, 0x01, 0x00]).await.unwrap();
        assert_eq!(notifications.recv().await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_default_pair_buffers_default_capacity() {
        let (mut transport, mut peer) = ChannelTransport::default_pair();
        transport.connect().await.unwrap();

        for _ in 0..DEFAULT_CAPACITY {
            transport.send(Bytes::from_static(&[0x01])).await.unwrap();
        }
        let mut received = 0;
        while peer.try_recv().is_some() {
            received += 1;
        }
        assert_eq!(received, DEFAULT_CAPACITY);
    }

    #[tokio::test]
    async fn test_disconnect() {
        let (mut transport, _peer) = ChannelTransport::pair(4);
        transport.connect().await.unwrap();
        transport.disconnect().await.unwrap();
        assert!(!transport.is_connected());
    }
}
