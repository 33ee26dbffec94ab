//! Cached device properties.

use tokio::sync::watch;

use crate::types::{ModeValue, Value};

/// The latest value of one device mode.
///
/// Written only by the value pipeline, read by anyone. Reads always see a
/// whole [`Value`], never a mix of two updates.
#[derive(Debug)]
pub struct Property<T> {
    sender: watch::Sender<Value<T>>,
}

impl<T: ModeValue> Property<T> {
    /// Creates a property holding the default value.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = watch::channel(Value::default());
        Self { sender }
    }

    /// Returns the latest value.
    #[must_use]
    pub fn get(&self) -> Value<T> {
        *self.sender.borrow()
    }

    /// Returns the latest SI value.
    #[must_use]
    pub fn si(&self) -> T {
        self.get().si
    }

    /// Returns the latest percentage value.
    #[must_use]
    pub fn pct(&self) -> T {
        self.get().pct
    }

    /// Returns a receiver notified on every update.
    ///
    /// Receivers only see the latest value; use
    /// [`crate::pipeline::ValuePipeline::subscribe`] to observe every update.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<Value<T>> {
        self.sender.subscribe()
    }

    pub(crate) fn set(&self, value: Value<T>) {
        self.sender.send_replace(value);
    }
}

impl<T: ModeValue> Default for Property<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_default() {
        let property = Property::<i8>::new();
        assert_eq!(property.get(), Value { si: 0, pct: 0 });
    }

    #[tokio::test]
    async fn test_property_watch() {
        let property = Property::<i16>::new();
        let mut rx = property.watch();

        property.set(Value { si: 90, pct: 25 });
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), Value { si: 90, pct: 25 });
        assert_eq!(property.si(), 90);
        assert_eq!(property.pct(), 25);
    }
}
