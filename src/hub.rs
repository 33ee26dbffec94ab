//! Main [`Hub`] client implementation.
//!
//! This module provides the high-level [`Hub`] client that combines the
//! transport, the inbound router, the value pipeline, attachment tracking and
//! device construction into a unified interface.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use bytes::Bytes;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;

use crate::commands::{CommandSender, MessageSender};
use crate::devices::{DevicePort, GestureSensor, Motor, VirtualPort, VirtualPortManager};
use crate::error::{Error, Result};
use crate::event::{Event, EventDispatcher, EventFilter, Subscription};
use crate::pipeline::ValuePipeline;
use crate::protocol::{AttachedIoEvent, CodecRegistry, Message, capability};
use crate::transport::Transport;
use crate::types::PortKind;

/// Default hub id. Hubs address themselves as 0.
pub const DEFAULT_HUB_ID: u8 = 0x00;

/// Default event channel capacity.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Default time to wait for the hub to announce a virtual port.
pub const DEFAULT_ATTACH_TIMEOUT: Duration = Duration::from_secs(2);

/// Hub client configuration.
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Hub id written into every outbound header.
    pub hub_id: u8,
    /// Capacity of the event broadcast channel.
    pub event_capacity: usize,
    /// Time to wait for attachment notifications.
    pub attach_timeout: Duration,
}

impl HubConfig {
    /// Creates a configuration with default settings.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            hub_id: DEFAULT_HUB_ID,
            event_capacity: DEFAULT_EVENT_CAPACITY,
            attach_timeout: DEFAULT_ATTACH_TIMEOUT,
        }
    }

    /// Sets the hub id.
    #[must_use]
    pub const fn hub_id(mut self, hub_id: u8) -> Self {
        self.hub_id = hub_id;
        self
    }

    /// Sets the event channel capacity.
    #[must_use]
    pub const fn event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    /// Sets the attachment timeout.
    #[must_use]
    pub const fn attach_timeout(mut self, timeout: Duration) -> Self {
        self.attach_timeout = timeout;
        self
    }
}

impl Default for HubConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Routes decoded notifications to their consumers.
#[derive(Clone)]
struct Router {
    registry: &'static CodecRegistry,
    dispatcher: EventDispatcher,
    pipeline: Arc<ValuePipeline>,
    ports: Arc<VirtualPortManager>,
}

impl Router {
    fn process_frame(&self, data: &[u8]) {
        tracing::trace!("received frame: {}", hex::encode(data));

        let message = match self.registry.decode(data) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!("dropping frame {}: {e}", hex::encode(data));
                return;
            }
        };

        let event = match message {
            Message::HubAttachedIo(m) => {
                self.ports.handle_attached_io(&m);
                if matches!(m.event, AttachedIoEvent::Detached) {
                    self.pipeline.clear_port(m.port_id);
                }
                Event::AttachedIo(m)
            }
            Message::PortInputFormatSingle(m) => {
                self.pipeline.set_port_mode(m.port_id, m.mode);
                Event::InputFormat(m)
            }
            Message::PortValueSingle(m) => {
                self.pipeline.dispatch_single(m.port_id, &m.data);
                return;
            }
            Message::GenericError(m) => {
                tracing::warn!(
                    "hub rejected command 0x{:02x}: {:?}",
                    m.command_type,
                    m.error_code
                );
                Event::HubError(m)
            }
            Message::PortOutputCommandFeedback(m) => Event::CommandFeedback(m),
            Message::PortInformation(m) => Event::PortInformation(Box::new(m)),
            Message::PortModeInformation(m) => Event::PortModeInformation(Box::new(m)),
            other => {
                tracing::debug!("unrouted message {:?}", other.message_type());
                Event::Other(Box::new(other))
            }
        };

        self.dispatcher.dispatch(event);
    }
}

/// Reads notifications until the stream closes.
fn spawn_inbound(
    mut notifications: mpsc::Receiver<Bytes>,
    router: Router,
    connected: Arc<AtomicBool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(frame) = notifications.recv().await {
            router.process_frame(&frame);
        }
        tracing::info!("notification stream closed");
        connected.store(false, Ordering::Release);
        router.dispatcher.dispatch(Event::Disconnected);
    })
}

/// Client for one hub.
pub struct Hub<T> {
    config: HubConfig,
    transport: Arc<Mutex<T>>,
    connected: Arc<AtomicBool>,
    sender: Arc<dyn MessageSender>,
    router: Router,

    // Background tasks
    process_task: Option<JoinHandle<()>>,
}

impl<T: Transport + 'static> Hub<T> {
    /// Creates a new client with the given transport.
    #[must_use]
    pub fn new(transport: T, config: HubConfig) -> Self {
        let transport = Arc::new(Mutex::new(transport));
        let connected = Arc::new(AtomicBool::new(false));
        let sender: Arc<dyn MessageSender> = Arc::new(CommandSender::new(
            Arc::clone(&transport),
            Arc::clone(&connected),
        ));

        let router = Router {
            registry: CodecRegistry::global(),
            dispatcher: EventDispatcher::new(config.event_capacity),
            pipeline: Arc::new(ValuePipeline::new()),
            ports: Arc::new(VirtualPortManager::new(config.hub_id, Arc::clone(&sender))),
        };

        Self {
            config,
            transport,
            connected,
            sender,
            router,
            process_task: None,
        }
    }

    /// Connects to the hub.
    ///
    /// This will:
    /// 1. Open the transport connection
    /// 2. Start an inbound task for a fresh notification stream, replacing the old one
    /// 3. Dispatch [`Event::Connected`]
    ///
    /// # Errors
    ///
    /// Returns an error if the transport fails to connect, or
    /// [`Error::ChannelClosed`] if no notification stream is left to read.
    pub async fn connect(&mut self) -> Result<()> {
        {
            let mut transport = self.transport.lock().await;
            transport.connect().await?;
            self.connected.store(true, Ordering::Release);

            match transport.take_notifications() {
                Some(notifications) => {
                    let process_task = spawn_inbound(
                        notifications,
                        self.router.clone(),
                        Arc::clone(&self.connected),
                    );
                    if let Some(previous) = self.process_task.replace(process_task) {
                        tracing::debug!("replacing inbound task");
                        previous.abort();
                    }
                }
                None if self
                    .process_task
                    .as_ref()
                    .is_some_and(|task| !task.is_finished()) => {}
                None => {
                    tracing::error!("no notification stream available, closing transport");
                    self.connected.store(false, Ordering::Release);
                    transport.disconnect().await?;
                    return Err(Error::ChannelClosed);
                }
            }
        }

        tracing::info!("connected to hub {}", self.config.hub_id);
        self.router.dispatcher.dispatch(Event::Connected);
        Ok(())
    }

    /// Disconnects from the hub.
    ///
    /// The inbound task keeps running so a later [`Hub::connect`] resumes
    /// with the same notification stream.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport fails to disconnect.
    pub async fn disconnect(&mut self) -> Result<()> {
        self.connected.store(false, Ordering::Release);
        {
            let mut transport = self.transport.lock().await;
            transport.disconnect().await?;
        }

        tracing::info!("disconnected from hub {}", self.config.hub_id);
        self.router.dispatcher.dispatch(Event::Disconnected);
        Ok(())
    }

    /// Returns true if connected.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &HubConfig {
        &self.config
    }

    /// Subscribes to events.
    #[must_use]
    pub fn subscribe(&self) -> Subscription {
        self.router.dispatcher.subscribe()
    }

    /// Returns the event dispatcher, for waiting on specific events.
    #[must_use]
    pub const fn events(&self) -> &EventDispatcher {
        &self.router.dispatcher
    }

    /// Returns the value pipeline.
    #[must_use]
    pub const fn pipeline(&self) -> &Arc<ValuePipeline> {
        &self.router.pipeline
    }

    /// Returns the port attachment tracker.
    #[must_use]
    pub const fn ports(&self) -> &Arc<VirtualPortManager> {
        &self.router.ports
    }

    /// Returns the outbound sender shared by all devices of this hub.
    #[must_use]
    pub const fn sender(&self) -> &Arc<dyn MessageSender> {
        &self.sender
    }

    /// Decodes and routes one inbound frame.
    ///
    /// Malformed frames are logged and dropped.
    pub fn process_frame(&self, data: &[u8]) {
        self.router.process_frame(data);
    }

    /// Routes the messages of a static capability blob as if the hub had sent them.
    ///
    /// Returns the number of messages routed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Hex`] if the blob is not valid hex.
    pub fn apply_capability_blob(&self, blob: &str) -> Result<usize> {
        let frames = capability::parse_blob(blob)?;
        for frame in &frames {
            self.process_frame(frame);
        }
        Ok(frames.len())
    }

    /// Builds the port handle for `port_id` with the kind the hub last reported.
    ///
    /// Ports not yet reported are treated as physical.
    fn device_port(&self, port_id: u8) -> DevicePort {
        let ports = &self.router.ports;
        DevicePort::new(
            self.config.hub_id,
            port_id,
            ports.kind(port_id).unwrap_or(PortKind::Physical),
            ports.attachment(port_id),
            Arc::clone(&self.sender),
        )
    }

    /// Creates a motor on a port.
    ///
    /// The motor accepts commands once the hub reports the port attached.
    /// On a virtual port only dual-motor commands are accepted.
    #[must_use]
    pub fn motor(&self, port_id: u8) -> Motor {
        Motor::new(self.device_port(port_id), Arc::clone(&self.router.pipeline))
    }

    /// Creates a gesture sensor on a port.
    ///
    /// # Errors
    ///
    /// Returns an error if the sensor's capability blob does not decode.
    pub fn gesture_sensor(&self, port_id: u8) -> Result<GestureSensor> {
        GestureSensor::new(self.device_port(port_id), Arc::clone(&self.router.pipeline))
    }

    /// Returns the virtual port bonding `port_a` and `port_b`, creating it if needed.
    ///
    /// # Errors
    ///
    /// - any error of [`VirtualPortManager::connect`]
    /// - [`Error::Timeout`] if the hub does not announce the port in time
    pub async fn virtual_port(&self, port_a: u8, port_b: u8) -> Result<VirtualPort> {
        let ports = &self.router.ports;
        if let Some(port_id) = ports.virtual_port_id(port_a, port_b) {
            return ports.create_device(port_id);
        }

        // Subscribe before sending so a fast attachment is not missed
        let mut subscription = self.router.dispatcher.subscribe();
        ports.connect(port_a, port_b).await?;

        let timeout = self.config.attach_timeout;
        let filter = EventFilter::virtual_attachment(port_a, port_b);
        EventDispatcher::wait_on(&mut subscription, &filter, timeout)
            .await
            .ok_or_else(|| Error::Timeout {
                timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            })?;

        // The router records the attachment before dispatching the event
        let port_id = ports
            .virtual_port_id(port_a, port_b)
            .ok_or(Error::NotConnected)?;
        ports.create_device(port_id)
    }
}

impl<T> Drop for Hub<T> {
    fn drop(&mut self) {
        if let Some(task) = self.process_task.take() {
            task.abort();
        }
    }
}
