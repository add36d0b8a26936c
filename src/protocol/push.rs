// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! WebSocket push channel delivering unsolicited state snapshots.

use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;

/// Default number of frames buffered between the socket and the consumer.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// A background WebSocket reader forwarding text frames over a channel.
///
/// The reader task connects, forwards every text frame to [`receiver`], and
/// ends when the server closes the socket, the connection fails, or the
/// receiver is dropped. It does not reconnect.
///
/// [`receiver`]: PushChannel::into_parts
///
/// # Examples
///
/// ```no_run
/// use thermobridge::protocol::PushChannel;
///
/// # async fn example() {
/// let channel = PushChannel::spawn("ws://localhost:8000/api/v1/events/TS-1");
/// let (mut frames, _reader) = channel.into_parts();
/// while let Some(frame) = frames.recv().await {
///     println!("{frame}");
/// }
/// # }
/// ```
#[derive(Debug)]
pub struct PushChannel {
    receiver: mpsc::Receiver<String>,
    reader: JoinHandle<()>,
}

impl PushChannel {
    /// Spawns the reader task for `url` with the default buffer size.
    ///
    /// Returns immediately; connection failures are logged by the task and
    /// close the channel.
    #[must_use]
    pub fn spawn(url: impl Into<String>) -> Self {
        Self::spawn_with_capacity(url, DEFAULT_CHANNEL_CAPACITY)
    }

    /// Spawns the reader task with a custom buffer size.
    #[must_use]
    pub fn spawn_with_capacity(url: impl Into<String>, capacity: usize) -> Self {
        let url = url.into();
        let (tx, receiver) = mpsc::channel(capacity.max(1));
        let reader = tokio::spawn(read_frames(url, tx));
        Self { receiver, reader }
    }

    /// Splits the channel into the frame receiver and the reader task handle.
    #[must_use]
    pub fn into_parts(self) -> (mpsc::Receiver<String>, JoinHandle<()>) {
        (self.receiver, self.reader)
    }
}

/// Connects to `url` and forwards text frames until the socket ends.
async fn read_frames(url: String, tx: mpsc::Sender<String>) {
    tracing::info!(url = %url, "Connecting push channel");

    let mut stream = match tokio_tungstenite::connect_async(url.as_str()).await {
        Ok((stream, _response)) => stream,
        Err(e) => {
            tracing::warn!(url = %url, error = %e, "Push channel connection failed");
            return;
        }
    };

    tracing::info!(url = %url, "Push channel connected");

    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => {
                if tx.send(text.to_string()).await.is_err() {
                    tracing::debug!(url = %url, "Push consumer dropped, closing channel");
                    break;
                }
            }
            Ok(Message::Close(frame)) => {
                match frame {
                    Some(cf) => tracing::info!(
                        url = %url,
                        code = %cf.code,
                        reason = %cf.reason,
                        "Push channel closed by remote"
                    ),
                    None => tracing::info!(url = %url, "Push channel closed by remote"),
                }
                break;
            }
            Ok(_) => {
                // Binary, Ping, Pong, Frame: nothing to forward
            }
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Push channel read failed");
                break;
            }
        }
    }

    tracing::debug!(url = %url, "Push channel reader stopped");
}
