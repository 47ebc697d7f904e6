//! Pure, stateless helpers that turn raw weather records into display-ready
//! values: bucket classifications, temperature-bar geometry, calendar-day
//! checks, trend labels, and date formatting. Nothing here performs I/O.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};

use crate::model::ForecastDay;

/// UV index classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UvBucket {
    Low,
    Moderate,
    High,
    VeryHigh,
    Extreme,
}

impl UvBucket {
    pub fn label(self) -> &'static str {
        match self {
            UvBucket::Low => "Low",
            UvBucket::Moderate => "Moderate",
            UvBucket::High => "High",
            UvBucket::VeryHigh => "Very High",
            UvBucket::Extreme => "Extreme",
        }
    }
}

/// uv <= 2 Low, <= 5 Moderate, <= 7 High, <= 10 Very High, else Extreme.
pub fn uv_bucket(uv: f64) -> UvBucket {
    if uv <= 2.0 {
        UvBucket::Low
    } else if uv <= 5.0 {
        UvBucket::Moderate
    } else if uv <= 7.0 {
        UvBucket::High
    } else if uv <= 10.0 {
        UvBucket::VeryHigh
    } else {
        UvBucket::Extreme
    }
}

/// Humidity comfort classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HumidityBand {
    Dry,
    Comfortable,
    Humid,
}

impl HumidityBand {
    pub fn label(self) -> &'static str {
        match self {
            HumidityBand::Dry => "Dry",
            HumidityBand::Comfortable => "Comfortable",
            HumidityBand::Humid => "Humid",
        }
    }
}

/// humidity <= 30 Dry, <= 60 Comfortable, else Humid.
pub fn humidity_band(humidity: u8) -> HumidityBand {
    if humidity <= 30 {
        HumidityBand::Dry
    } else if humidity <= 60 {
        HumidityBand::Comfortable
    } else {
        HumidityBand::Humid
    }
}

/// Position of one day's temperature bar on a [0,100] percent scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarSpan {
    pub offset_pct: f64,
    pub width_pct: f64,
}

/// Linearly map a day's [min,max] interval onto the forecast window's
/// [min,max]. Returns `None` when the window span is not positive (a
/// single-value window); the renderer falls back to a full-width bar.
pub fn temperature_bar_span(
    day_min: f64,
    day_max: f64,
    window_min: f64,
    window_max: f64,
) -> Option<BarSpan> {
    let span = window_max - window_min;
    if span <= 0.0 {
        return None;
    }
    let position = |temp: f64| (temp - window_min) / span * 100.0;
    let offset_pct = position(day_min);
    Some(BarSpan {
        offset_pct,
        width_pct: position(day_max) - offset_pct,
    })
}

/// The full min/max temperature range spanned by a forecast, used to
/// normalize per-day bars. `None` for an empty forecast.
pub fn forecast_window(days: &[ForecastDay]) -> Option<(f64, f64)> {
    let first = days.first()?;
    let mut min = first.day.mintemp_c;
    let mut max = first.day.maxtemp_c;
    for day in &days[1..] {
        min = min.min(day.day.mintemp_c);
        max = max.max(day.day.maxtemp_c);
    }
    Some((min, max))
}

/// Calendar-date equality in the viewer's local timezone, ignoring
/// time of day.
pub fn same_calendar_day(a: DateTime<Local>, b: DateTime<Local>) -> bool {
    a.date_naive() == b.date_naive()
}

pub fn is_today(date: NaiveDate) -> bool {
    date == Local::now().date_naive()
}

/// Metric kinds with a fixed display trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Gusts,
    Pressure,
    Visibility,
    CloudCover,
}

/// Static qualitative tag attached to a metric for display emphasis. Not
/// derived from history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendLabel {
    Good,
    Neutral,
    Stable,
    Rain,
    Clear,
}

impl TrendLabel {
    pub fn label(self) -> &'static str {
        match self {
            TrendLabel::Good => "good",
            TrendLabel::Neutral => "neutral",
            TrendLabel::Stable => "stable",
            TrendLabel::Rain => "rain",
            TrendLabel::Clear => "clear",
        }
    }
}

/// Fixed per-metric trend lookup.
pub fn trend_label(kind: MetricKind) -> TrendLabel {
    match kind {
        MetricKind::Gusts | MetricKind::CloudCover => TrendLabel::Neutral,
        MetricKind::Pressure => TrendLabel::Stable,
        MetricKind::Visibility => TrendLabel::Good,
    }
}

/// Precipitation is the one metric whose tag depends on the reading.
pub fn precipitation_trend(precip_mm: f64) -> TrendLabel {
    if precip_mm > 0.0 {
        TrendLabel::Rain
    } else {
        TrendLabel::Clear
    }
}

/// "Sat, Aug 9"
pub fn short_date(date: NaiveDate) -> String {
    date.format("%a, %b %-d").to_string()
}

/// "Saturday, August 9, 2026"
pub fn full_date(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}

/// Render the upstream `localtime` string ("2026-08-07 14:30") as a long
/// local-time display. Falls back to the raw string when it does not parse.
pub fn local_time_display(localtime: &str) -> String {
    match NaiveDateTime::parse_from_str(localtime, "%Y-%m-%d %H:%M") {
        Ok(dt) => dt.format("%A, %B %-d, %Y %I:%M %p").to_string(),
        Err(_) => localtime.to_string(),
    }
}

/// Compact hour label for an hour-slot time ("2026-08-07 13:00" -> "1 PM").
pub fn hour_label(time: &str) -> String {
    match NaiveDateTime::parse_from_str(time, "%Y-%m-%d %H:%M") {
        Ok(dt) => dt.format("%-I %p").to_string(),
        Err(_) => time.to_string(),
    }
}
