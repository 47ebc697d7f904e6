use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One fetched weather result for a location: current conditions plus an
/// optional multi-day forecast. Replaced wholesale on each successful fetch.
///
/// Field names mirror the WeatherAPI.com response schema so the types
/// deserialize straight off the wire; unknown upstream fields are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub location: Location,
    pub current: CurrentConditions,
    /// Present only when the snapshot came from a forecast query.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forecast: Option<Forecast>,
}

impl WeatherSnapshot {
    /// Forecast days, or an empty slice for a current-only snapshot.
    pub fn forecast_days(&self) -> &[ForecastDay] {
        self.forecast.as_ref().map_or(&[], |f| f.forecastday.as_slice())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    /// Administrative region; upstream may send an empty string.
    #[serde(default)]
    pub region: Option<String>,
    pub country: String,
    /// Local wall-clock time as reported upstream, e.g. "2026-08-07 14:30".
    pub localtime: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Condition {
    pub text: String,
    /// Protocol-relative icon URL, e.g. "//cdn.weatherapi.com/weather/64x64/day/116.png".
    pub icon: String,
}

/// Immutable snapshot of conditions at one point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temp_c: f64,
    pub temp_f: f64,
    pub feelslike_c: f64,
    pub feelslike_f: f64,
    pub condition: Condition,
    pub wind_kph: f64,
    pub gust_kph: f64,
    pub wind_dir: String,
    pub pressure_mb: f64,
    pub humidity: u8,
    pub vis_km: f64,
    pub cloud: u8,
    pub uv: f64,
    pub precip_mm: f64,
    /// 1 for day, 0 for night.
    pub is_day: u8,
}

impl CurrentConditions {
    pub fn is_daytime(&self) -> bool {
        self.is_day == 1
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Forecast {
    /// Ordered by ascending date; length matches the requested day count.
    pub forecastday: Vec<ForecastDay>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub day: DaySummary,
    pub astro: Astro,
    /// 24 entries, ascending by time of day.
    pub hour: Vec<HourSlot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaySummary {
    pub maxtemp_c: f64,
    pub mintemp_c: f64,
    pub avgtemp_c: f64,
    pub condition: Condition,
    pub daily_chance_of_rain: u8,
    pub maxwind_kph: f64,
    /// Upstream serves this one as a float, unlike the point-in-time percentages.
    pub avghumidity: f64,
    pub uv: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Astro {
    /// Local time string, e.g. "05:43 AM".
    pub sunrise: String,
    pub sunset: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HourSlot {
    /// Local time string, e.g. "2026-08-07 13:00".
    pub time: String,
    pub temp_c: f64,
    pub condition: Condition,
    pub chance_of_rain: u8,
    pub wind_kph: f64,
}

/// One match from the location-search endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchLocation {
    pub id: i64,
    pub name: String,
    pub region: String,
    pub country: String,
    pub lat: f64,
    pub lon: f64,
    pub url: String,
}
