// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Registry event types.

use crate::registry::AccessoryUuid;
use crate::types::{Characteristic, CharacteristicValue};

/// Events emitted by the device registry.
///
/// These events report accessory lifecycle changes decided by
/// reconciliation, and characteristic values pushed by devices.
///
/// # Examples
///
/// ```
/// use thermobridge::event::RegistryEvent;
/// use thermobridge::registry::AccessoryUuid;
///
/// let uuid = AccessoryUuid::from_serial_number("HP-1");
/// let added = RegistryEvent::AccessoryAdded {
///     uuid,
///     serial_number: "HP-1".to_string(),
/// };
/// assert_eq!(added.uuid(), Some(uuid));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum RegistryEvent {
    /// A persisted accessory matched a declared device and was rebound.
    AccessoryRestored {
        /// Identity of the accessory.
        uuid: AccessoryUuid,
        /// Serial number of the declared device.
        serial_number: String,
    },

    /// A declared device had no accessory and one was registered.
    AccessoryAdded {
        /// Identity of the accessory.
        uuid: AccessoryUuid,
        /// Serial number of the declared device.
        serial_number: String,
    },

    /// An accessory no longer declared was unregistered.
    AccessoryRetired {
        /// Identity of the accessory.
        uuid: AccessoryUuid,
    },

    /// A declared device could not be bridged.
    ///
    /// The rest of the reconciliation pass is unaffected.
    RegistrationFailed {
        /// Serial number of the declared device, if it could be decoded.
        serial_number: Option<String>,
        /// Rendered failure.
        error: String,
    },

    /// A device pushed a new characteristic value.
    CharacteristicPushed {
        /// Identity of the accessory.
        uuid: AccessoryUuid,
        /// The refreshed characteristic.
        characteristic: Characteristic,
        /// Its new value.
        value: CharacteristicValue,
    },
}

impl RegistryEvent {
    /// Returns the accessory this event concerns, if any.
    #[must_use]
    pub fn uuid(&self) -> Option<AccessoryUuid> {
        match self {
            Self::AccessoryRestored { uuid, .. }
            | Self::AccessoryAdded { uuid, .. }
            | Self::AccessoryRetired { uuid }
            | Self::CharacteristicPushed { uuid, .. } => Some(*uuid),
            Self::RegistrationFailed { .. } => None,
        }
    }

    /// Returns `true` if this is a lifecycle event.
    #[must_use]
    pub fn is_lifecycle_event(&self) -> bool {
        matches!(
            self,
            Self::AccessoryRestored { .. } | Self::AccessoryAdded { .. } | Self::AccessoryRetired { .. }
        )
    }

    /// Returns `true` if this is a pushed value.
    #[must_use]
    pub fn is_push_event(&self) -> bool {
        matches!(self, Self::CharacteristicPushed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuid_of_lifecycle_events() {
        let uuid = AccessoryUuid::from_serial_number("TS-1");

        let retired = RegistryEvent::AccessoryRetired { uuid };
        assert_eq!(retired.uuid(), Some(uuid));
        assert!(retired.is_lifecycle_event());
        assert!(!retired.is_push_event());
    }

    #[test]
    fn failures_have_no_uuid() {
        let failed = RegistryEvent::RegistrationFailed {
            serial_number: None,
            error: "malformed".to_string(),
        };
        assert_eq!(failed.uuid(), None);
        assert!(!failed.is_lifecycle_event());
    }

    #[test]
    fn pushed_value() {
        let uuid = AccessoryUuid::from_serial_number("TS-1");
        let event = RegistryEvent::CharacteristicPushed {
            uuid,
            characteristic: Characteristic::CurrentTemperature,
            value: CharacteristicValue::Float(21.5),
        };
        assert!(event.is_push_event());
        assert_eq!(event.uuid(), Some(uuid));
    }
}
