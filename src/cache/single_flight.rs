// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Request-coalescing cache for one remote resource.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use tokio::sync::broadcast;

use crate::error::FetchError;
use crate::protocol::HttpClient;

/// Sender side of an outstanding request; waiters subscribe to it.
type Flight<T> = broadcast::Sender<Result<T, FetchError>>;

/// Coalesces concurrent reads of one remote resource into one request.
///
/// While a request is outstanding, every further [`fetch`](Self::fetch)
/// subscribes to it instead of issuing its own, so a burst of characteristic
/// reads observes one consistent snapshot. The outstanding-request slot is
/// cleared before the result is delivered, so the next call after a
/// completed request always goes to the network: the cache never answers
/// `fetch` from a previous result.
///
/// The request itself runs in a spawned task bounded by the fetch timeout.
/// Dropping a waiter does not cancel the request for the others.
///
/// [`latest`](Self::latest) exposes the last good value for callers that
/// want a fallback after a failed read.
///
/// # Examples
///
/// ```no_run
/// use thermobridge::cache::SingleFlightCache;
/// use thermobridge::protocol::HttpClient;
/// use thermobridge::state::TargetState;
///
/// # async fn example() -> thermobridge::Result<()> {
/// let client = HttpClient::new("http://localhost:8000/api/v1")?;
/// let cache: SingleFlightCache<TargetState> = SingleFlightCache::new(client, "state");
///
/// // Both reads share one GET request.
/// let (mode, setpoint) = tokio::join!(cache.fetch(), cache.fetch());
/// # Ok(())
/// # }
/// ```
pub struct SingleFlightCache<T> {
    client: HttpClient,
    path: String,
    url: String,
    timeout: Duration,
    in_flight: Arc<Mutex<Option<Flight<T>>>>,
    latest: Arc<Mutex<Latest<T>>>,
}

/// Last good value, with a count of out-of-band updates.
struct Latest<T> {
    value: Option<T>,
    remembered: u64,
}

impl<T> SingleFlightCache<T>
where
    T: DeserializeOwned + Clone + Send + 'static,
{
    /// Default bound on a single request.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Creates a cache for `path` relative to the client's base URL.
    #[must_use]
    pub fn new(client: HttpClient, path: impl Into<String>) -> Self {
        let path = path.into();
        let url = client.url_for(&path);
        Self {
            client,
            path,
            url,
            timeout: Self::DEFAULT_TIMEOUT,
            in_flight: Arc::new(Mutex::new(None)),
            latest: Arc::new(Mutex::new(Latest {
                value: None,
                remembered: 0,
            })),
        }
    }

    /// Sets the bound on a single request.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the absolute URL of the bound resource.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns `true` while a request is outstanding.
    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.lock().is_some()
    }

    /// Returns the last successfully fetched or remembered value.
    ///
    /// This value is never returned by [`fetch`](Self::fetch).
    #[must_use]
    pub fn latest(&self) -> Option<T> {
        self.latest.lock().value.clone()
    }

    /// Records a value obtained out of band, such as from a push snapshot.
    ///
    /// A request already outstanding when this is called does not replace
    /// the remembered value once it completes.
    pub fn remember(&self, value: T) {
        let mut latest = self.latest.lock();
        latest.value = Some(value);
        latest.remembered += 1;
    }

    /// Reads the resource, joining the outstanding request if there is one.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if the request fails, times out, or the body
    /// does not decode. Every waiter of the same request receives the same
    /// error.
    pub async fn fetch(&self) -> Result<T, FetchError> {
        let mut rx = {
            let mut slot = self.in_flight.lock();
            if let Some(flight) = slot.as_ref() {
                tracing::trace!(url = %self.url, "Joining in-flight request");
                flight.subscribe()
            } else {
                let (tx, rx) = broadcast::channel(1);
                *slot = Some(tx.clone());
                self.spawn_request(tx);
                rx
            }
        };

        rx.recv().await.map_err(|_| FetchError::Abandoned {
            url: self.url.clone(),
        })?
    }

    fn spawn_request(&self, tx: Flight<T>) {
        let client = self.client.clone();
        let path = self.path.clone();
        let url = self.url.clone();
        let timeout = self.timeout;
        let latest = Arc::clone(&self.latest);
        let remembered = self.latest.lock().remembered;
        let claim = Claim {
            slot: Arc::clone(&self.in_flight),
        };

        tokio::spawn(async move {
            let result = match tokio::time::timeout(timeout, client.get_json::<T>(&path)).await {
                Ok(result) => result,
                Err(_) => Err(FetchError::Timeout {
                    url: url.clone(),
                    timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                }),
            };

            match &result {
                Ok(value) => {
                    let mut latest = latest.lock();
                    if latest.remembered == remembered {
                        latest.value = Some(value.clone());
                    }
                }
                Err(e) => tracing::debug!(url = %url, error = %e, "Fetch failed"),
            }

            // Release the slot before any waiter observes the result.
            drop(claim);

            // No receivers left means every caller gave up; nothing to do.
            let _ = tx.send(result);
        });
    }
}

impl<T> fmt::Debug for SingleFlightCache<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SingleFlightCache")
            .field("url", &self.url)
            .field("timeout", &self.timeout)
            .field("in_flight", &self.in_flight.lock().is_some())
            .finish_non_exhaustive()
    }
}

/// Ownership of the outstanding-request slot.
///
/// Dropping the claim clears the slot, including when the request task is
/// cancelled by runtime shutdown.
struct Claim<T> {
    slot: Arc<Mutex<Option<Flight<T>>>>,
}

impl<T> Drop for Claim<T> {
    fn drop(&mut self) {
        self.slot.lock().take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::TargetState;
    use crate::types::Mode;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn cache_for(server: &MockServer) -> SingleFlightCache<TargetState> {
        let client = HttpClient::new(format!("{}/api/v1", server.uri())).unwrap();
        SingleFlightCache::new(client, "state")
    }

    async fn request_count(server: &MockServer) -> usize {
        server.received_requests().await.unwrap().len()
    }

    #[tokio::test]
    async fn concurrent_fetches_share_one_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/state"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"mode": "AUTO", "targetTemperature": 21}))
                    .set_delay(Duration::from_millis(200)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let cache = cache_for(&server);
        let (a, b, c) = tokio::join!(cache.fetch(), cache.fetch(), cache.fetch());

        let a = a.unwrap();
        assert_eq!(a, b.unwrap());
        assert_eq!(a, c.unwrap());
        assert_eq!(a.mode, Mode::Auto);
        assert_eq!(request_count(&server).await, 1);
    }

    #[tokio::test]
    async fn fetch_after_completion_issues_new_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/state"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"mode": "HEAT", "targetTemperature": 20})),
            )
            .expect(2)
            .mount(&server)
            .await;

        let cache = cache_for(&server);
        cache.fetch().await.unwrap();
        assert!(!cache.is_in_flight());
        cache.fetch().await.unwrap();

        assert_eq!(request_count(&server).await, 2);
    }

    #[tokio::test]
    async fn never_serves_previous_result() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/state"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"mode": "HEAT", "targetTemperature": 20})),
            )
            .mount(&server)
            .await;

        let cache = cache_for(&server);
        assert_eq!(cache.fetch().await.unwrap().mode, Mode::Heat);

        server.reset().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/state"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"mode": "COOL", "targetTemperature": 24})),
            )
            .mount(&server)
            .await;

        assert_eq!(cache.fetch().await.unwrap().mode, Mode::Cool);
    }

    #[tokio::test]
    async fn failure_reaches_every_waiter_and_clears_slot() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/state"))
            .respond_with(ResponseTemplate::new(503).set_delay(Duration::from_millis(100)))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/state"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"mode": "OFF", "targetTemperature": 18})),
            )
            .mount(&server)
            .await;

        let cache = cache_for(&server);
        let (a, b) = tokio::join!(cache.fetch(), cache.fetch());

        assert!(matches!(a, Err(FetchError::Status { status: 503, .. })));
        assert_eq!(a, b);
        assert!(!cache.is_in_flight());

        let recovered = cache.fetch().await.unwrap();
        assert_eq!(recovered.mode, Mode::Off);
    }

    #[tokio::test]
    async fn undecodable_payload_is_a_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/state"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let cache = cache_for(&server);
        let result = cache.fetch().await;

        assert!(matches!(result, Err(FetchError::Decode { .. })));
        assert!(cache.latest().is_none());
    }

    #[tokio::test]
    async fn slow_request_times_out_and_releases_slot() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/state"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"mode": "AUTO", "targetTemperature": 21}))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let cache = cache_for(&server).with_timeout(Duration::from_millis(50));
        let result = cache.fetch().await;

        assert!(matches!(
            result,
            Err(FetchError::Timeout { timeout_ms: 50, .. })
        ));
        assert!(!cache.is_in_flight());
    }

    #[tokio::test]
    async fn latest_tracks_last_good_value() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/state"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"mode": "COOL", "targetTemperature": 23})),
            )
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/state"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let cache = cache_for(&server);
        assert!(cache.latest().is_none());

        cache.fetch().await.unwrap();
        assert!(cache.fetch().await.is_err());

        let latest = cache.latest().unwrap();
        assert_eq!(latest.mode, Mode::Cool);
    }

    #[tokio::test]
    async fn remember_seeds_latest_without_affecting_fetch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/state"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let cache = cache_for(&server);
        cache.remember(TargetState {
            mode: Mode::Heat,
            target_temperature: 19.0,
        });

        assert!(cache.fetch().await.is_err());
        assert_eq!(cache.latest().unwrap().mode, Mode::Heat);
    }

    #[tokio::test]
    async fn remembered_value_outlives_older_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/state"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"mode": "COOL", "targetTemperature": 24}))
                    .set_delay(Duration::from_millis(200)),
            )
            .mount(&server)
            .await;

        let cache = cache_for(&server);
        let (fetched, ()) = tokio::join!(cache.fetch(), async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            cache.remember(TargetState {
                mode: Mode::Heat,
                target_temperature: 19.0,
            });
        });

        assert_eq!(fetched.unwrap().mode, Mode::Cool);
        assert_eq!(cache.latest().unwrap().mode, Mode::Heat);

        // A request started after the push records its result again.
        cache.fetch().await.unwrap();
        assert_eq!(cache.latest().unwrap().mode, Mode::Cool);
    }

    #[test]
    fn url_is_resolved_against_base() {
        let client = HttpClient::new("http://localhost:8000/api/v1").unwrap();
        let cache: SingleFlightCache<TargetState> = SingleFlightCache::new(client, "state");
        assert_eq!(cache.url(), "http://localhost:8000/api/v1/state");
        assert_eq!(cache.timeout(), Duration::from_secs(10));
    }
}
