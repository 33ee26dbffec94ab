//! Transport layer for hub communication.
//!
//! This module provides the abstraction over the link that moves whole
//! message buffers to and from the hub. Bluetooth stacks plug in by
//! implementing [`Transport`]; an in-memory [`ChannelTransport`] is provided
//! for tests and for bridging to stacks that expose channels.

pub mod channel;

use bytes::Bytes;
use futures::future::BoxFuture;
use tokio::sync::mpsc;

use crate::error::Result;

/// Trait for transport implementations.
pub trait Transport: Send + Sync {
    /// Connects to the hub.
    fn connect(&mut self) -> BoxFuture<'_, Result<()>>;

    /// Disconnects from the hub.
    fn disconnect(&mut self) -> BoxFuture<'_, Result<()>>;

    /// Sends one encoded message. Resolves once the link has accepted it.
    fn send(&mut self, data: Bytes) -> BoxFuture<'_, Result<()>>;

    /// Returns true if connected.
    fn is_connected(&self) -> bool;

    /// Takes the stream of inbound notifications, one message per item.
    ///
    /// Returns `None` if the stream was already taken.
    fn take_notifications(&mut self) -> Option<mpsc::Receiver<Bytes>>;
}

pub use channel::{ChannelPeer, ChannelTransport};
