//! Event system for hub notifications.
//!
//! Notifications that are not routed to a device's value stream (attachment
//! changes, hub errors, command feedback, port information) are broadcast as
//! [`Event`]s. Hub-reported command failures arrive here as data; the send
//! call that issued the command has already completed by then.

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::protocol::{
    AttachedIoEvent, GenericError, HubAttachedIo, Message, MessageType, PortInformation,
    PortInputFormatSingle, PortModeInformation, PortOutputCommandFeedback,
};

/// Event types that can be dispatched.
#[derive(Debug, Clone)]
pub enum Event {
    /// Connection established.
    Connected,
    /// Connection lost.
    Disconnected,
    /// A port was attached or detached.
    AttachedIo(HubAttachedIo),
    /// The hub rejected a command.
    HubError(GenericError),
    /// Command feedback for one or more ports.
    CommandFeedback(PortOutputCommandFeedback),
    /// A port's input format changed.
    InputFormat(PortInputFormatSingle),
    /// Port information received.
    PortInformation(Box<PortInformation>),
    /// Port mode information received.
    PortModeInformation(Box<PortModeInformation>),
    /// Any other decoded message.
    Other(Box<Message>),
}

impl Event {
    /// Returns the associated message type if applicable.
    #[must_use]
    pub const fn message_type(&self) -> Option<MessageType> {
        match self {
            Self::AttachedIo(_) => Some(MessageType::HubAttachedIo),
            Self::HubError(_) => Some(MessageType::GenericError),
            Self::CommandFeedback(_) => Some(MessageType::PortOutputCommandFeedback),
            Self::InputFormat(_) => Some(MessageType::PortInputFormatSingle),
            Self::PortInformation(_) => Some(MessageType::PortInformation),
            Self::PortModeInformation(_) => Some(MessageType::PortModeInformation),
            Self::Other(message) => Some(message.message_type()),
            Self::Connected | Self::Disconnected => None,
        }
    }

    /// Returns the port the event is about, if any.
    #[must_use]
    pub fn port_id(&self) -> Option<u8> {
        match self {
            Self::AttachedIo(m) => Some(m.port_id),
            Self::InputFormat(m) => Some(m.port_id),
            Self::PortInformation(m) => Some(m.port_id),
            Self::PortModeInformation(m) => Some(m.port_id),
            Self::CommandFeedback(m) => m.feedback.first().map(|f| f.port_id),
            Self::Connected | Self::Disconnected | Self::HubError(_) | Self::Other(_) => None,
        }
    }
}

/// A subscription to events.
pub struct Subscription {
    receiver: broadcast::Receiver<Event>,
}

impl Subscription {
    /// Receives the next event.
    ///
    /// Returns `None` once the dispatcher is gone.
    pub async fn recv(&mut self) -> Option<Event> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!("event subscriber lagged, {skipped} events skipped");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

/// Subscription filter for specific event types.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Filter by message types.
    pub message_types: Option<Vec<MessageType>>,
    /// Filter by port.
    pub port_id: Option<u8>,
    /// Filter for the virtual attachment of two ports.
    pub virtual_ports: Option<(u8, u8)>,
}

impl EventFilter {
    /// Creates a filter for specific message types.
    #[must_use]
    pub const fn message_types(types: Vec<MessageType>) -> Self {
        Self {
            message_types: Some(types),
            port_id: None,
            virtual_ports: None,
        }
    }

    /// Creates a filter for events about one port.
    #[must_use]
    pub const fn port(port_id: u8) -> Self {
        Self {
            message_types: None,
            port_id: Some(port_id),
            virtual_ports: None,
        }
    }

    /// Creates a filter for the hub creating a virtual port from two ports.
    #[must_use]
    pub fn virtual_attachment(port_a: u8, port_b: u8) -> Self {
        Self {
            message_types: Some(vec![MessageType::HubAttachedIo]),
            port_id: None,
            virtual_ports: Some((port_a, port_b)),
        }
    }

    /// Checks if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &Event) -> bool {
        if let Some(ref types) = self.message_types {
            match event.message_type() {
                Some(message_type) if types.contains(&message_type) => {}
                _ => return false,
            }
        }

        if self.port_id.is_some() && event.port_id() != self.port_id {
            return false;
        }

        if let Some((port_a, port_b)) = self.virtual_ports {
            let Event::AttachedIo(HubAttachedIo {
                event: AttachedIoEvent::AttachedVirtual { port_a: a, port_b: b, .. },
                ..
            }) = event
            else {
                return false;
            };
            if (*a, *b) != (port_a, port_b) {
                return false;
            }
        }

        true
    }
}

struct EventDispatcherInner {
    sender: broadcast::Sender<Event>,
}

/// Dispatches events to subscribers.
#[derive(Clone)]
pub struct EventDispatcher {
    inner: Arc<EventDispatcherInner>,
}

impl EventDispatcher {
    /// Creates a new event dispatcher.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            inner: Arc::new(EventDispatcherInner { sender }),
        }
    }

    /// Dispatches an event to all subscribers.
    pub fn dispatch(&self, event: Event) {
        // No receivers is fine
        let _ = self.inner.sender.send(event);
    }

    /// Subscribes to all events.
    #[must_use]
    pub fn subscribe(&self) -> Subscription {
        Subscription {
            receiver: self.inner.sender.subscribe(),
        }
    }

    /// Waits on an existing subscription for an event matching the filter.
    ///
    /// Subscribe before sending the command whose outcome is awaited, so a
    /// fast reply cannot be missed.
    ///
    /// Returns `None` if the timeout expires or the channel is closed.
    pub async fn wait_on(
        subscription: &mut Subscription,
        filter: &EventFilter,
        timeout: std::time::Duration,
    ) -> Option<Event> {
        tokio::time::timeout(timeout, async {
            while let Some(event) = subscription.recv().await {
                if filter.matches(&event) {
                    return Some(event);
                }
            }
            None
        })
        .await
        .ok()
        .flatten()
    }

    /// Waits for an event matching the filter with timeout.
    ///
    /// Returns `None` if the timeout expires or the channel is closed.
    pub async fn wait_for(
        &self,
        filter: EventFilter,
        timeout: std::time::Duration,
    ) -> Option<Event> {
        let mut subscription = self.subscribe();
        Self::wait_on(&mut subscription, &filter, timeout).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{ErrorCode, PortFeedback};
    use crate::protocol::command::FeedbackFlags;
    use crate::types::IoType;

    fn virtual_attached(port_id: u8, port_a: u8, port_b: u8) -> Event {
        Event::AttachedIo(HubAttachedIo {
            hub_id: 0,
            port_id,
            event: AttachedIoEvent::AttachedVirtual {
                io_type: IoType::TECHNIC_LARGE_MOTOR,
                port_a,
                port_b,
            },
        })
    }

    #[tokio::test]
    async fn test_event_dispatch() {
        let dispatcher = EventDispatcher::new(16);
        let mut sub = dispatcher.subscribe();

        dispatcher.dispatch(Event::Connected);

        let event = tokio::time::timeout(std::time::Duration::from_millis(100), sub.recv())
            .await
            .unwrap();

        assert!(matches!(event, Some(Event::Connected)));
    }

    #[test]
    fn test_message_type_filter() {
        let filter = EventFilter::message_types(vec![MessageType::GenericError]);

        assert!(filter.matches(&Event::HubError(GenericError {
            hub_id: 0,
            command_type: 0x81,
            error_code: ErrorCode::InvalidUse,
        })));
        assert!(!filter.matches(&Event::Connected));
    }

    #[test]
    fn test_port_filter() {
        let filter = EventFilter::port(1);
        let feedback = Event::CommandFeedback(PortOutputCommandFeedback {
            hub_id: 0,
            feedback: vec![PortFeedback {
                port_id: 1,
                flags: FeedbackFlags::COMPLETED,
            }],
        });
        assert!(filter.matches(&feedback));
        assert!(!filter.matches(&virtual_attached(0x10, 0, 1)));
    }

    #[test]
    fn test_virtual_attachment_filter() {
        let filter = EventFilter::virtual_attachment(0, 1);
        assert!(filter.matches(&virtual_attached(0x10, 0, 1)));
        assert!(!filter.matches(&virtual_attached(0x10, 1, 2)));
        assert!(!filter.matches(&Event::Disconnected));
    }

    #[tokio::test]
    async fn test_wait_for_times_out() {
        let dispatcher = EventDispatcher::new(16);
        let event = dispatcher
            .wait_for(EventFilter::port(3), std::time::Duration::from_millis(10))
            .await;
        assert!(event.is_none());
    }

    #[tokio::test]
    async fn test_wait_on_skips_unmatched() {
        let dispatcher = EventDispatcher::new(16);
        let mut sub = dispatcher.subscribe();
        dispatcher.dispatch(Event::Connected);
        dispatcher.dispatch(virtual_attached(0x10, 0, 1));

        let event = EventDispatcher::wait_on(
            &mut sub,
            &EventFilter::virtual_attachment(0, 1),
            std::time::Duration::from_millis(100),
        )
        .await;
        assert!(matches!(event, Some(Event::AttachedIo(m)) if m.port_id == 0x10));
    }
}
