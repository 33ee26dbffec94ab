//! Technic medium hub gesture sensor.

use std::sync::Arc;

use crate::devices::{Device, DevicePort, ModeSubscription};
use crate::error::{DecodeError, Result};
use crate::pipeline::{Property, SubscriptionId, ValuePipeline};
use crate::protocol::capability;
use crate::types::{ModeScale, Value};

/// Port the built-in sensor reports its capabilities on.
const CAPABILITY_PORT: u8 = 0x64;

/// Gesture sensor built into the Technic medium hub.
///
/// The sensor never answers port information requests; its calibration
/// comes from the static capability blob.
pub struct GestureSensor {
    port: DevicePort,
    pipeline: Arc<ValuePipeline>,
    gesture: Arc<Property<i8>>,
    subscription: SubscriptionId,
}

impl GestureSensor {
    /// Gesture mode (`GEST`).
    pub const GESTURE_MODE: u8 = 0x00;

    /// Returns the calibration of the gesture mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the capability blob does not decode or lacks a range.
    pub fn gesture_scale() -> Result<ModeScale> {
        let messages = capability::decode_blob(capability::TECHNIC_MEDIUM_HUB_GEST_SENSOR)?;
        capability::mode_scale(&messages, CAPABILITY_PORT, Self::GESTURE_MODE).ok_or_else(|| {
            DecodeError::MissingModeRange {
                port_id: CAPABILITY_PORT,
                mode: Self::GESTURE_MODE,
            }
            .into()
        })
    }

    /// Binds a gesture sensor to `port` and registers its properties.
    ///
    /// # Errors
    ///
    /// See [`GestureSensor::gesture_scale`].
    pub fn new(port: DevicePort, pipeline: Arc<ValuePipeline>) -> Result<Self> {
        let scale = Self::gesture_scale()?;
        let gesture = Arc::new(Property::new());
        let subscription = pipeline.bind(port.port_id(), Self::GESTURE_MODE, scale, &gesture);
        Ok(Self {
            port,
            pipeline,
            gesture,
            subscription,
        })
    }

    /// Returns the latest detected gesture.
    #[must_use]
    pub fn gesture(&self) -> Value<i8> {
        self.gesture.get()
    }

    /// Returns the gesture property.
    #[must_use]
    pub fn gesture_property(&self) -> &Arc<Property<i8>> {
        &self.gesture
    }
}

impl Device for GestureSensor {
    fn port(&self) -> &DevicePort {
        &self.port
    }
}

impl ModeSubscription for GestureSensor {}

impl Drop for GestureSensor {
    fn drop(&mut self) {
        self.pipeline.unsubscribe(self.subscription);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::testing;
    use crate::types::PortKind;

    #[test]
    fn test_gesture_scale() {
        let scale = GestureSensor::gesture_scale().unwrap();
        assert_eq!(scale.raw, (0.0, 4.0));
        assert_eq!(scale.pct, (0.0, 100.0));
    }

    #[tokio::test]
    async fn test_gesture_values() {
        let (port, _peer) = testing::port(CAPABILITY_PORT, PortKind::Physical).await;
        let pipeline = Arc::new(ValuePipeline::new());
        let sensor = GestureSensor::new(port, Arc::clone(&pipeline)).unwrap();

        pipeline.set_port_mode(CAPABILITY_PORT, GestureSensor::GESTURE_MODE);
        pipeline.dispatch_single(CAPABILITY_PORT, &[2]);
        assert_eq!(sensor.gesture(), Value { si: 2, pct: 50 });
    }

    #[tokio::test]
    async fn test_set_input_format() {
        let (port, mut peer) = testing::port(CAPABILITY_PORT, PortKind::Physical).await;
        let sensor = GestureSensor::new(port, Arc::new(ValuePipeline::new())).unwrap();

        sensor
            .set_input_format(GestureSensor::GESTURE_MODE, 1, true)
            .await
            .unwrap();
        let sent = peer.recv().await.unwrap();
        assert_eq!(sent[2], 0x41);
        assert_eq!(sent[3], CAPABILITY_PORT);
    }
}
