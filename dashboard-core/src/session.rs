use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::client::{WeatherError, WeatherProvider};
use crate::model::WeatherSnapshot;

/// Day count used when the renderer does not ask for a specific range.
pub const DEFAULT_FORECAST_DAYS: u8 = 5;

/// The session's entire mutable state. Exactly one variant is active; every
/// trigger ends in `Success` or `Failed`, never permanently in `Loading`.
#[derive(Debug, Clone, Default)]
pub enum FetchState {
    #[default]
    Idle,
    Loading,
    Success(WeatherSnapshot),
    Failed(String),
}

impl FetchState {
    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading)
    }
}

/// Fetch state machine between a [`WeatherProvider`] and the renderer.
///
/// Owned explicitly by the caller; there is no process-wide instance. All
/// mutation happens through the two request triggers and [`clear_error`],
/// and only the most recently issued request may write state: each trigger
/// takes a monotonic token, and a completion whose token is no longer the
/// latest is discarded rather than overwriting a newer outcome.
///
/// [`clear_error`]: WeatherSession::clear_error
#[derive(Debug)]
pub struct WeatherSession {
    provider: Box<dyn WeatherProvider>,
    state: Mutex<FetchState>,
    issued: AtomicU64,
}

impl WeatherSession {
    pub fn new(provider: Box<dyn WeatherProvider>) -> Self {
        Self {
            provider,
            state: Mutex::new(FetchState::Idle),
            issued: AtomicU64::new(0),
        }
    }

    /// Fetch current conditions for `query`.
    ///
    /// A blank query fails immediately without touching the provider.
    pub async fn request_current(&self, query: &str) {
        let Some(token) = self.begin(query) else {
            return;
        };
        let outcome = self.provider.current(query).await;
        self.finish(token, outcome);
    }

    /// Fetch current conditions plus a `days`-day forecast for `query`.
    pub async fn request_forecast(&self, query: &str, days: u8) {
        let Some(token) = self.begin(query) else {
            return;
        };
        let outcome = self.provider.forecast(query, days).await;
        self.finish(token, outcome);
    }

    /// Dismiss a failure: `Failed` goes back to `Idle`, anything else is
    /// left untouched.
    pub fn clear_error(&self) {
        let mut state = self.lock();
        if matches!(*state, FetchState::Failed(_)) {
            *state = FetchState::Idle;
        }
    }

    pub fn state(&self) -> FetchState {
        self.lock().clone()
    }

    pub fn snapshot(&self) -> Option<WeatherSnapshot> {
        match &*self.lock() {
            FetchState::Success(snapshot) => Some(snapshot.clone()),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.lock().is_loading()
    }

    pub fn error_message(&self) -> Option<String> {
        match &*self.lock() {
            FetchState::Failed(message) => Some(message.clone()),
            _ => None,
        }
    }

    /// Take the next request token and enter `Loading`, or fail fast on a
    /// blank query. The blank-query path still takes a token so it supersedes
    /// any fetch already in flight.
    fn begin(&self, query: &str) -> Option<u64> {
        // Token and state move together under the lock; a later trigger
        // cannot observe the new token before this one's state is written.
        let mut state = self.lock();
        let token = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        if query.trim().is_empty() {
            debug!(token, "rejecting blank weather query");
            *state = FetchState::Failed(WeatherError::InvalidQuery.to_string());
            return None;
        }
        debug!(token, query, "weather request issued");
        *state = FetchState::Loading;
        Some(token)
    }

    fn finish(&self, token: u64, outcome: Result<WeatherSnapshot, WeatherError>) {
        let mut state = self.lock();
        if self.issued.load(Ordering::SeqCst) != token {
            debug!(token, "discarding stale weather response");
            return;
        }
        *state = match outcome {
            Ok(snapshot) => {
                debug!(token, location = %snapshot.location.name, "weather request succeeded");
                FetchState::Success(snapshot)
            }
            Err(err) => {
                debug!(token, error = %err, "weather request failed");
                FetchState::Failed(err.to_string())
            }
        };
    }

    // The lock is only ever held for plain assignments, never across an
    // await, so a poisoned lock carries no torn state.
    fn lock(&self) -> MutexGuard<'_, FetchState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::client::Endpoint;
    use crate::model::{Condition, CurrentConditions, Location};

    fn snapshot_named(name: &str) -> WeatherSnapshot {
        WeatherSnapshot {
            location: Location {
                name: name.to_string(),
                region: None,
                country: "Testland".to_string(),
                localtime: "2026-08-07 10:30".to_string(),
            },
            current: CurrentConditions {
                temp_c: 20.0,
                temp_f: 68.0,
                feelslike_c: 19.0,
                feelslike_f: 66.2,
                condition: Condition {
                    text: "Sunny".to_string(),
                    icon: "//cdn.weatherapi.com/weather/64x64/day/113.png".to_string(),
                },
                wind_kph: 10.0,
                gust_kph: 15.0,
                wind_dir: "N".to_string(),
                pressure_mb: 1013.0,
                humidity: 50,
                vis_km: 10.0,
                cloud: 20,
                uv: 4.0,
                precip_mm: 0.0,
                is_day: 1,
            },
            forecast: None,
        }
    }

    /// Responds after a fixed delay with either a snapshot named after the
    /// query or a preset error, counting every provider call.
    #[derive(Debug)]
    struct FakeProvider {
        delay: Duration,
        fail_with: Option<WeatherError>,
        calls: Arc<AtomicUsize>,
    }

    impl FakeProvider {
        fn instant(calls: &Arc<AtomicUsize>) -> Self {
            Self {
                delay: Duration::ZERO,
                fail_with: None,
                calls: Arc::clone(calls),
            }
        }

        async fn respond(&self, query: &str) -> Result<WeatherSnapshot, WeatherError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            match &self.fail_with {
                Some(err) => Err(err.clone()),
                None => Ok(snapshot_named(query)),
            }
        }
    }

    #[async_trait]
    impl WeatherProvider for FakeProvider {
        async fn current(&self, query: &str) -> Result<WeatherSnapshot, WeatherError> {
            self.respond(query).await
        }

        async fn forecast(&self, query: &str, _days: u8) -> Result<WeatherSnapshot, WeatherError> {
            self.respond(query).await
        }
    }

    /// Delay depends on the query, so overlapping requests can resolve out
    /// of issue order.
    #[derive(Debug, Default)]
    struct VariableDelayProvider;

    #[async_trait]
    impl WeatherProvider for VariableDelayProvider {
        async fn current(&self, query: &str) -> Result<WeatherSnapshot, WeatherError> {
            let delay = if query == "slow" { 500 } else { 10 };
            tokio::time::sleep(Duration::from_millis(delay)).await;
            Ok(snapshot_named(query))
        }

        async fn forecast(&self, query: &str, _days: u8) -> Result<WeatherSnapshot, WeatherError> {
            WeatherProvider::current(self, query).await
        }
    }

    #[tokio::test]
    async fn successful_fetch_reaches_success() {
        let calls = Arc::new(AtomicUsize::new(0));
        let session = WeatherSession::new(Box::new(FakeProvider::instant(&calls)));

        session.request_current("London").await;

        assert!(!session.is_loading());
        assert!(session.error_message().is_none());
        let snapshot = session.snapshot().expect("snapshot should be present");
        assert_eq!(snapshot.location.name, "London");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_fetch_reaches_failed_with_provider_message() {
        let calls = Arc::new(AtomicUsize::new(0));
        let provider = FakeProvider {
            fail_with: Some(WeatherError::Remote("No matching location found.".to_string())),
            ..FakeProvider::instant(&calls)
        };
        let session = WeatherSession::new(Box::new(provider));

        session.request_forecast("Atlantis", DEFAULT_FORECAST_DAYS).await;

        assert_eq!(
            session.error_message().as_deref(),
            Some("No matching location found.")
        );
        assert!(session.snapshot().is_none());
    }

    #[tokio::test]
    async fn transport_failure_uses_generic_message() {
        let calls = Arc::new(AtomicUsize::new(0));
        let provider = FakeProvider {
            fail_with: Some(WeatherError::Transport(Endpoint::Forecast)),
            ..FakeProvider::instant(&calls)
        };
        let session = WeatherSession::new(Box::new(provider));

        session.request_forecast("London", 5).await;

        assert_eq!(
            session.error_message().as_deref(),
            Some("Failed to fetch weather forecast")
        );
    }

    #[tokio::test]
    async fn blank_query_fails_without_calling_provider() {
        let calls = Arc::new(AtomicUsize::new(0));
        let session = WeatherSession::new(Box::new(FakeProvider::instant(&calls)));

        session.request_current("   ").await;

        assert_eq!(
            session.error_message().as_deref(),
            Some("Please enter a valid location")
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        session.request_forecast("\t", 5).await;
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn stale_response_does_not_overwrite_newer_outcome() {
        let session = WeatherSession::new(Box::new(VariableDelayProvider));

        // "slow" is issued first but resolves last; its late completion must
        // not clobber the outcome of the later "fast" request.
        tokio::join!(
            session.request_current("slow"),
            session.request_current("fast"),
        );

        let snapshot = session.snapshot().expect("snapshot should be present");
        assert_eq!(snapshot.location.name, "fast");
    }

    #[tokio::test(start_paused = true)]
    async fn blank_query_supersedes_in_flight_fetch() {
        let session = WeatherSession::new(Box::new(VariableDelayProvider));

        tokio::join!(session.request_current("slow"), async {
            session.request_current("").await;
        });

        // The late "slow" completion is stale; the blank-query failure wins.
        assert_eq!(
            session.error_message().as_deref(),
            Some("Please enter a valid location")
        );
        assert!(session.snapshot().is_none());
    }

    #[tokio::test]
    async fn clear_error_resets_failed_to_idle() {
        let calls = Arc::new(AtomicUsize::new(0));
        let session = WeatherSession::new(Box::new(FakeProvider::instant(&calls)));

        session.request_current("").await;
        assert!(session.error_message().is_some());

        session.clear_error();
        assert!(session.error_message().is_none());
        assert!(matches!(session.state(), FetchState::Idle));
    }

    #[tokio::test]
    async fn clear_error_is_a_noop_outside_failed() {
        let calls = Arc::new(AtomicUsize::new(0));
        let session = WeatherSession::new(Box::new(FakeProvider::instant(&calls)));

        // Idle.
        session.clear_error();
        assert!(matches!(session.state(), FetchState::Idle));

        // Success.
        session.request_current("London").await;
        session.clear_error();
        assert!(session.snapshot().is_some());
    }
}
