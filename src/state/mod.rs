// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Remote device state and its derivation.
//!
//! This module holds the payloads read from and written to remote devices
//! ([`TargetState`], [`CurrentState`], [`TemperatureReading`],
//! [`TargetUpdate`], [`StateSnapshot`]) and the pure
//! [`infer_operating_state`] used when a device does not report what it is
//! doing.

mod inference;
mod remote;

pub use inference::{DEFAULT_THRESHOLD, infer_operating_state};
pub use remote::{CurrentState, StateSnapshot, TargetState, TargetUpdate, TemperatureReading};
