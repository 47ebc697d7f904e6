use std::fmt::Debug;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeoError {
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("Location service unavailable")]
    Unavailable,
    #[error("Location request timed out")]
    Timeout,
    #[error("Location error: {0}")]
    Other(String),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// "lat,lon" string in the form the weather API accepts as a query.
    pub fn as_query(&self) -> String {
        format!("{},{}", self.latitude, self.longitude)
    }
}

/// Seam over the platform geolocation capability. The device is an external
/// collaborator; implementations wrap whatever the host platform offers.
#[async_trait]
pub trait LocationSource: Send + Sync + Debug {
    async fn current_position(&self) -> Result<Coordinates, GeoError>;
}

#[derive(Debug, Clone, Default)]
struct GeoState {
    resolving: bool,
    coordinates: Option<Coordinates>,
    error: Option<String>,
}

/// Resolves the user's position into a query string consumable by the
/// weather session. Resolution is sequenced: it completes, successfully or
/// not, before any derived weather fetch is attempted.
#[derive(Debug)]
pub struct GeolocationSession {
    source: Box<dyn LocationSource>,
    state: Mutex<GeoState>,
}

impl GeolocationSession {
    pub fn new(source: Box<dyn LocationSource>) -> Self {
        Self {
            source,
            state: Mutex::new(GeoState::default()),
        }
    }

    /// Ask the platform for the current position. A fresh attempt clears any
    /// previous error; a failure clears any previously resolved coordinates.
    pub async fn resolve(&self) -> Option<Coordinates> {
        {
            let mut state = self.lock();
            state.resolving = true;
            state.error = None;
        }

        let outcome = self.source.current_position().await;

        let mut state = self.lock();
        state.resolving = false;
        match outcome {
            Ok(coordinates) => {
                debug!(query = %coordinates.as_query(), "geolocation resolved");
                state.coordinates = Some(coordinates);
                Some(coordinates)
            }
            Err(err) => {
                warn!(error = %err, "geolocation failed");
                state.coordinates = None;
                state.error = Some(err.to_string());
                None
            }
        }
    }

    pub fn is_resolving(&self) -> bool {
        self.lock().resolving
    }

    pub fn coordinates(&self) -> Option<Coordinates> {
        self.lock().coordinates
    }

    pub fn error_message(&self) -> Option<String> {
        self.lock().error.clone()
    }

    /// "lat,lon" query for the last resolved position, if any.
    pub fn query_string(&self) -> Option<String> {
        self.lock().coordinates.map(|c| c.as_query())
    }

    fn lock(&self) -> MutexGuard<'_, GeoState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
