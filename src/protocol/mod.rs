// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Transports for talking to remote climate devices.
//!
//! - [`HttpClient`]: JSON reads and partial-update writes over HTTP
//! - [`PushChannel`]: WebSocket receiver for unsolicited state snapshots
//!   (requires the `push` feature)

mod http;
#[cfg(feature = "push")]
mod push;

pub use http::{HttpClient, HttpClientBuilder, path_segment};
#[cfg(feature = "push")]
pub use push::{DEFAULT_CHANNEL_CAPACITY, PushChannel};
