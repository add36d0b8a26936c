// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Accessory identifier type.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Namespace for accessory identities derived from serial numbers.
const ACCESSORY_NAMESPACE: Uuid = Uuid::from_bytes([
    0x6b, 0x1f, 0x3c, 0x52, 0x9a, 0x47, 0x5e, 0x0d, 0x8c, 0x21, 0x44, 0x73, 0xd0, 0x9e, 0x2a, 0x61,
]);

/// Identity of an exposed accessory.
///
/// This is a name-based UUID (v5) of the device's serial number, so the same
/// serial number always yields the same identity, across restarts and across
/// processes.
///
/// # Examples
///
/// ```
/// use thermobridge::registry::AccessoryUuid;
///
/// let a = AccessoryUuid::from_serial_number("HP-1");
/// let b = AccessoryUuid::from_serial_number("HP-1");
/// assert_eq!(a, b);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessoryUuid(Uuid);

impl AccessoryUuid {
    /// Derives the identity of the device with the given serial number.
    #[must_use]
    pub fn from_serial_number(serial_number: &str) -> Self {
        Self(Uuid::new_v5(&ACCESSORY_NAMESPACE, serial_number.as_bytes()))
    }

    /// Creates an identifier from an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Debug for AccessoryUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Show only first 8 characters for readability
        let short = &self.0.to_string()[..8];
        write!(f, "AccessoryUuid({short}...)")
    }
}

impl fmt::Display for AccessoryUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for AccessoryUuid {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<AccessoryUuid> for Uuid {
    fn from(id: AccessoryUuid) -> Self {
        id.0
    }
}
