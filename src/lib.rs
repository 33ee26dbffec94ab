//! # poweredup
//!
//! A Rust host-side protocol stack for Powered Up hubs.
//!
//! This library encodes commands for and decodes notifications from
//! Bluetooth-attached hubs. The Bluetooth link itself plugs in through the
//! [`Transport`] trait.
//!
//! ## Features
//!
//! - Async/await based API using Tokio
//! - Typed messages with a shared codec registry
//! - Device kinds with validated commands and cached mode values
//! - Virtual ports bonding two motors
//!
//! ## Quick Start
//!
//! ```no_run
//! use poweredup::devices::{DualPowerCommands, ModeSubscription, PowerCommands};
//! use poweredup::{ChannelTransport, Hub, HubConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), poweredup::Error> {
//!     // Bridge a Bluetooth stack through an in-memory channel pair
//!     let (transport, _peer) = ChannelTransport::default_pair();
//!     let mut hub = Hub::new(transport, HubConfig::new());
//!     hub.connect().await?;
//!
//!     // Drive a motor and follow its power mode
//!     let motor = hub.motor(0);
//!     motor.set_input_format(0, 1, true).await?;
//!     motor.start_power(50).await?;
//!     println!("power: {}%", motor.power().pct);
//!     motor.stop_by_brake().await?;
//!
//!     // Bond two motors into one virtual port
//!     let pair = hub.virtual_port(0, 1).await?;
//!     pair.start_power_pair(50, -50).await?;
//!
//!     hub.disconnect().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`protocol`] - Wire format (header, typed messages, codec registry, capability blobs)
//! - [`types`] - Port kinds, IO types, mode values and calibration
//! - [`transport`] - Transport trait and an in-memory implementation
//! - [`event`] - Async event system for hub notifications
//! - [`commands`] - Outbound message submission
//! - [`pipeline`] - Routing of mode values into device properties
//! - [`devices`] - Device kinds, command validation and virtual ports
//! - [`hub`] - High-level [`Hub`] client

pub mod commands;
pub mod devices;
pub mod error;
pub mod event;
pub mod hub;
pub mod pipeline;
pub mod protocol;
pub mod transport;
pub mod types;

// Re-exports for convenience
pub use commands::{CommandSender, MessageSender};
pub use devices::{GestureSensor, Motor, VirtualPort, VirtualPortManager};
pub use error::{DecodeError, Direction, Error, FrameError, Result};
pub use event::{Event, EventDispatcher, EventFilter, Subscription};
pub use hub::{Hub, HubConfig};
pub use pipeline::{Property, SubscriptionId, ValuePipeline};
pub use protocol::{CodecRegistry, Message, MessageType, decode, encode};
pub use transport::{ChannelPeer, ChannelTransport, Transport};
pub use types::{IoType, ModeScale, PortKind, Value};
