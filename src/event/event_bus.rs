// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Broadcast channel for registry events.

use tokio::sync::broadcast;

use super::RegistryEvent;

/// Default number of events buffered per subscriber.
const DEFAULT_CHANNEL_CAPACITY: usize = 128;

/// Fan-out of [`RegistryEvent`]s to any number of subscribers.
///
/// Publishing never blocks. A subscriber that falls more than the channel
/// capacity behind loses the oldest events and sees
/// `RecvError::Lagged` on its next receive.
///
/// # Examples
///
/// ```
/// use thermobridge::event::{EventBus, RegistryEvent};
/// use thermobridge::registry::AccessoryUuid;
///
/// let bus = EventBus::new();
/// let mut rx = bus.subscribe();
///
/// bus.publish(RegistryEvent::AccessoryRetired {
///     uuid: AccessoryUuid::from_serial_number("TF-1"),
/// });
/// assert!(rx.try_recv().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<RegistryEvent>,
}

impl EventBus {
    /// Creates a bus with the default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Creates a bus buffering up to `capacity` events per subscriber.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribes to events published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<RegistryEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Publishes an event; dropped silently when nobody listens.
    pub fn publish(&self, event: RegistryEvent) {
        let _ = self.sender.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::AccessoryUuid;

    fn retired(serial: &str) -> RegistryEvent {
        RegistryEvent::AccessoryRetired {
            uuid: AccessoryUuid::from_serial_number(serial),
        }
    }

    #[test]
    fn subscriber_count_tracks_receivers() {
        let bus = EventBus::new();
        assert_eq!(bus.subscriber_count(), 0);

        let rx = bus.subscribe();
        let _rx2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        drop(rx);
        assert_eq!(bus.subscriber_count(), 1);
    }

    #[tokio::test]
    async fn every_subscriber_receives_each_event() {
        let bus = EventBus::new();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(retired("HP-1"));

        assert_eq!(rx1.recv().await.unwrap(), retired("HP-1"));
        assert_eq!(rx2.recv().await.unwrap(), retired("HP-1"));
    }

    #[test]
    fn publish_without_subscribers_is_a_no_op() {
        EventBus::new().publish(retired("HP-1"));
    }

    #[test]
    fn clones_share_the_channel() {
        let bus = EventBus::with_capacity(8);
        let clone = bus.clone();
        let mut rx = bus.subscribe();

        clone.publish(retired("TS-1"));
        assert_eq!(rx.try_recv().unwrap(), retired("TS-1"));
    }
}
