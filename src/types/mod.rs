// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types shared by the remote API and the host platform.
//!
//! - [`Mode`] and [`OperatingState`] carry both the remote symbol and the
//!   numeric characteristic encoding.
//! - [`Characteristic`], [`CharacteristicValue`] and friends describe what an
//!   accessory exposes to the host.

mod characteristic;
mod mode;
mod operating_state;

pub use characteristic::{
    Characteristic, CharacteristicProps, CharacteristicSpec, CharacteristicValue,
    TemperatureRange,
};
pub use mode::Mode;
pub use operating_state::OperatingState;
