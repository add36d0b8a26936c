// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Host platform interface.

use std::sync::Arc;

use super::{AccessoryUuid, PlatformAccessory};
use crate::accessory::DeviceAdapter;
use crate::types::{Characteristic, CharacteristicValue};

/// The home-automation host the registry exposes accessories to.
///
/// The host persists [`PlatformAccessory`] values between runs and hands
/// them back through
/// [`DeviceRegistry::configure_accessory`](super::DeviceRegistry::configure_accessory)
/// at startup. Host reads and writes are routed to the adapter passed to
/// [`attach`](Self::attach).
pub trait AccessoryHost: Send + Sync {
    /// Binds the characteristic handlers of `accessory` to `adapter`.
    ///
    /// Called for restored and newly created accessories alike, before
    /// they are registered.
    fn attach(&self, accessory: &PlatformAccessory, adapter: &Arc<DeviceAdapter>);

    /// Registers newly created accessories with the host.
    fn register_accessories(&self, accessories: &[PlatformAccessory]);

    /// Removes accessories that are no longer declared.
    fn unregister_accessories(&self, accessories: &[PlatformAccessory]);

    /// Pushes a characteristic value the host did not ask for.
    fn update_characteristic(
        &self,
        uuid: AccessoryUuid,
        characteristic: Characteristic,
        value: CharacteristicValue,
    );
}
