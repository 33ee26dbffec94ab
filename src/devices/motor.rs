//! Basic motor.

use std::sync::Arc;

use crate::devices::{Device, DevicePort, DualPowerCommands, ModeSubscription, PowerCommands};
use crate::pipeline::{Property, SubscriptionId, ValuePipeline};
use crate::types::{ModeScale, Value};

/// Motor with a power mode.
///
/// The power property follows mode 0 values reported by the hub once the
/// mode has been enabled with [`ModeSubscription::set_input_format`].
pub struct Motor {
    port: DevicePort,
    pipeline: Arc<ValuePipeline>,
    power: Arc<Property<i8>>,
    subscription: SubscriptionId,
}

impl Motor {
    /// Power mode.
    pub const POWER_MODE: u8 = 0x00;

    /// Calibration of the power mode.
    pub const POWER_SCALE: ModeScale = ModeScale::identity(-100.0, 100.0);

    /// Binds a motor to `port` and registers its properties.
    #[must_use]
    pub fn new(port: DevicePort, pipeline: Arc<ValuePipeline>) -> Self {
        let power = Arc::new(Property::new());
        let subscription =
            pipeline.bind(port.port_id(), Self::POWER_MODE, Self::POWER_SCALE, &power);
        Self {
            port,
            pipeline,
            power,
            subscription,
        }
    }

    /// Returns the latest reported power.
    #[must_use]
    pub fn power(&self) -> Value<i8> {
        self.power.get()
    }

    /// Returns the power property.
    #[must_use]
    pub fn power_property(&self) -> &Arc<Property<i8>> {
        &self.power
    }
}

impl Device for Motor {
    fn port(&self) -> &DevicePort {
        &self.port
    }
}

impl PowerCommands for Motor {}
impl DualPowerCommands for Motor {}
impl ModeSubscription for Motor {}

impl Drop for Motor {
    fn drop(&mut self) {
        self.pipeline.unsubscribe(self.subscription);
    }
}
