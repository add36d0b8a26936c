// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Registry events.
//!
//! The [`DeviceRegistry`](crate::registry::DeviceRegistry) publishes a
//! [`RegistryEvent`] for every reconciliation decision and every pushed
//! characteristic value on an [`EventBus`].
//!
//! # Examples
//!
//! ```
//! use thermobridge::event::{EventBus, RegistryEvent};
//!
//! let bus = EventBus::new();
//! let mut rx = bus.subscribe();
//!
//! bus.publish(RegistryEvent::RegistrationFailed {
//!     serial_number: Some("X-1".to_string()),
//!     error: "unknown accessory type".to_string(),
//! });
//! ```

mod event_bus;
mod registry_event;

pub use event_bus::EventBus;
pub use registry_event::RegistryEvent;
