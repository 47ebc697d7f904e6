//! Core library for the weather dashboard.
//!
//! This crate defines:
//! - A client for the WeatherAPI.com HTTP endpoints
//! - The fetch-session state machine a renderer observes and drives
//! - Pure derived-metric helpers (UV buckets, temperature bars, trends)
//! - Geolocation resolution into a weather query
//!
//! The rendering layer is deliberately absent: a UI consumes the session's
//! observable state and the derived metrics, and calls back into the session
//! in response to user input.

pub mod client;
pub mod config;
pub mod geo;
pub mod metrics;
pub mod model;
pub mod session;

pub use client::{
    Endpoint, MAX_FORECAST_DAYS, MIN_FORECAST_DAYS, WeatherClient, WeatherError, WeatherProvider,
};
pub use config::Config;
pub use geo::{Coordinates, GeoError, GeolocationSession, LocationSource};
pub use metrics::{BarSpan, HumidityBand, MetricKind, TrendLabel, UvBucket};
pub use model::{
    Condition, CurrentConditions, ForecastDay, HourSlot, Location, SearchLocation, WeatherSnapshot,
};
pub use session::{DEFAULT_FORECAST_DAYS, FetchState, WeatherSession};
