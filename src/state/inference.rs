// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Operating-state inference for devices that only report temperatures.

use crate::types::{Mode, OperatingState};

/// Default dead band around the setpoint, in degrees Celsius.
pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// Infers what a device is doing from its setpoint and a measurement.
///
/// The device is considered to be cooling when the measured temperature is
/// more than `threshold` above the setpoint and the mode permits cooling,
/// heating when it is more than `threshold` below and the mode permits
/// heating, and idle otherwise. The band of width `2 * threshold` around the
/// setpoint keeps the reported state from flapping.
///
/// # Examples
///
/// ```
/// use thermobridge::state::{infer_operating_state, DEFAULT_THRESHOLD};
/// use thermobridge::types::{Mode, OperatingState};
///
/// let state = infer_operating_state(22.0, 21.0, Mode::Auto, DEFAULT_THRESHOLD);
/// assert_eq!(state, OperatingState::Cooling);
/// ```
#[must_use]
pub fn infer_operating_state(
    measured: f64,
    setpoint: f64,
    mode: Mode,
    threshold: f64,
) -> OperatingState {
    if measured > setpoint + threshold && mode.allows_cooling() {
        return OperatingState::Cooling;
    }

    if measured < setpoint - threshold && mode.allows_heating() {
        return OperatingState::Heating;
    }

    OperatingState::Idle
}
