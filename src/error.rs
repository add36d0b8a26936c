// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `thermobridge` library.
//!
//! Failures are split by where they happen: reading remote state
//! ([`FetchError`]), writing remote state ([`WriteError`]), interpreting the
//! declared configuration ([`ConfigError`]) and setting up transports
//! ([`ProtocolError`]). None of them is meant to reach the host platform;
//! the accessory layer turns them into log lines and defaults.

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// Reading remote device state failed.
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Writing remote device state failed.
    #[error("write error: {0}")]
    Write(#[from] WriteError),

    /// A declared device or platform configuration is invalid.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// A transport could not be set up.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

/// Errors raised while reading a remote resource.
///
/// Every caller waiting on the same in-flight request receives its own copy
/// of the error, so this type is `Clone` and carries rendered messages
/// rather than the underlying transport errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The request could not be sent or the body could not be read.
    #[error("request to {url} failed: {message}")]
    Request {
        /// The requested URL.
        url: String,
        /// Description of the transport failure.
        message: String,
    },

    /// The remote answered with a non-success status code.
    #[error("{url} responded with HTTP {status}")]
    Status {
        /// The requested URL.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The payload was not valid JSON for the expected type.
    #[error("could not decode response from {url}: {message}")]
    Decode {
        /// The requested URL.
        url: String,
        /// Description of the decoding failure.
        message: String,
    },

    /// The request did not complete within the fetch timeout.
    #[error("request to {url} timed out after {timeout_ms} ms")]
    Timeout {
        /// The requested URL.
        url: String,
        /// The timeout that elapsed, in milliseconds.
        timeout_ms: u64,
    },

    /// The task driving the request went away without producing a result.
    #[error("in-flight request to {url} was abandoned")]
    Abandoned {
        /// The requested URL.
        url: String,
    },
}

impl FetchError {
    /// Returns the URL of the request that failed.
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::Request { url, .. }
            | Self::Status { url, .. }
            | Self::Decode { url, .. }
            | Self::Timeout { url, .. }
            | Self::Abandoned { url } => url,
        }
    }
}

/// Errors raised while writing to a remote resource.
///
/// Writes are best-effort: these errors are logged by the accessory layer
/// and never retried.
#[derive(Debug, Error)]
pub enum WriteError {
    /// The request could not be sent.
    #[error("request to {url} failed: {source}")]
    Request {
        /// The requested URL.
        url: String,
        /// The underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// The remote answered with a non-success status code.
    #[error("{url} rejected the update with HTTP {status}")]
    Status {
        /// The requested URL.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The update body could not be serialized.
    #[error("could not encode update: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Errors related to the declared configuration.
///
/// A configuration error is fatal only for the device it concerns.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    /// The accessory-type tag does not name a known adapter variant.
    #[error("device '{serial_number}' has unknown accessory type '{accessory_type}'")]
    UnknownAccessoryType {
        /// Serial number of the offending device.
        serial_number: String,
        /// The tag that was declared.
        accessory_type: String,
    },

    /// A declared device entry could not be decoded.
    #[error("device entry #{index} is malformed: {message}")]
    MalformedDevice {
        /// Position of the entry in the declared list.
        index: usize,
        /// Description of the decoding failure.
        message: String,
    },

    /// The declared temperature bounds are inverted.
    #[error("device '{serial_number}' has an invalid temperature range [{min}, {max}]")]
    InvalidTemperatureRange {
        /// Serial number of the offending device.
        serial_number: String,
        /// Declared lower bound.
        min: f64,
        /// Declared upper bound.
        max: f64,
    },

    /// The configuration file could not be read.
    #[error("failed to read {path}: {message}")]
    Read {
        /// Path of the configuration file.
        path: String,
        /// Description of the I/O failure.
        message: String,
    },

    /// The configuration document is not valid JSON for the platform schema.
    #[error("failed to parse platform configuration: {0}")]
    Parse(String),
}

/// Errors related to transport setup.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The HTTP client could not be created.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid URL or address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
