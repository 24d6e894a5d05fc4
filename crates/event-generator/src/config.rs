//! Generator configuration.
//!
//! Every knob the event factory needs is carried in a [`GeneratorConfig`]
//! value instead of process-wide constants. The config can be loaded from a
//! YAML file; any field left out falls back to its default.
//!
//! ```yaml
//! event_count:
//!   min: 1000
//!   max: 5000
//! window:
//!   start: 2025-05-01
//!   end: 2025-05-29
//! weights:
//!   view: 0.6
//!   click: 0.3
//!   location: 0.1
//! user_pool_size: 150
//! ```

use crate::generators::location::one_decimal_range;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::Path;

/// Errors raised while loading or validating a [`GeneratorConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid event count range: min {min} > max {max}")]
    InvalidEventCount { min: u64, max: u64 },

    #[error("Invalid time window: start {start} is after end {end}")]
    InvalidWindow {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    #[error("Invalid timestamp '{0}': expected YYYY-MM-DD, YYYY-MM-DDTHH:MM:SS or RFC 3339")]
    InvalidTimestamp(String),

    #[error("Invalid event type weights: {0}")]
    InvalidWeights(String),

    #[error("User pool size must be at least 1")]
    EmptyUserPool,

    #[error("URL pool size must be at least 1")]
    EmptyUrlPool,

    #[error("Probability must be within [0, 1], got {0}")]
    InvalidProbability(f64),

    #[error("Invalid location bounds: {0}")]
    InvalidBounds(String),

    #[error("Invalid accuracy range: [{min}, {max}]")]
    InvalidAccuracy { min: f64, max: f64 },
}

/// How many events a run produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventCount {
    /// Exactly this many events.
    Fixed(u64),
    /// A count drawn uniformly from `[min, max]` once per run.
    Range { min: u64, max: u64 },
}

impl Default for EventCount {
    fn default() -> Self {
        EventCount::Range {
            min: 1000,
            max: 5000,
        }
    }
}

/// Inclusive time window events are spread over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub start: NaiveDateTime,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub end: NaiveDateTime,
}

impl TimeWindow {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self, ConfigError> {
        let window = Self { start, end };
        window.validate()?;
        Ok(window)
    }

    /// Build a window from two textual timestamps.
    pub fn parse(start: &str, end: &str) -> Result<Self, ConfigError> {
        Self::new(parse_timestamp(start)?, parse_timestamp(end)?)
    }

    /// Length of the window in whole seconds.
    pub fn duration_seconds(&self) -> i64 {
        (self.end - self.start).num_seconds()
    }

    pub fn contains(&self, ts: &NaiveDateTime) -> bool {
        self.start <= *ts && *ts <= self.end
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.start > self.end {
            return Err(ConfigError::InvalidWindow {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }
}

impl Default for TimeWindow {
    fn default() -> Self {
        Self {
            start: midnight(2025, 5, 1),
            end: midnight(2025, 5, 29),
        }
    }
}

fn midnight(year: i32, month: u32, day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

/// Parse a timestamp in one of the accepted formats.
///
/// RFC 3339 values are converted to UTC before the offset is dropped.
pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime, ConfigError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.naive_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Ok(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Ok(dt);
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| ConfigError::InvalidTimestamp(s.to_string()))
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_timestamp(&s).map_err(serde::de::Error::custom)
}

/// Relative weights of the event types.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventWeights {
    pub view: f64,
    pub click: f64,
    pub location: f64,
}

impl EventWeights {
    /// Weights in `EventType::ALL` order.
    pub fn as_array(&self) -> [f64; 3] {
        [self.view, self.click, self.location]
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let weights = self.as_array();
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(ConfigError::InvalidWeights(format!(
                "weights must be finite and non-negative, got {weights:?}"
            )));
        }
        if weights.iter().sum::<f64>() <= 0.0 {
            return Err(ConfigError::InvalidWeights(
                "at least one weight must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for EventWeights {
    fn default() -> Self {
        Self {
            view: 0.6,
            click: 0.3,
            location: 0.1,
        }
    }
}

/// Rectangle that location pings are sampled from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeoBounds {
    pub min_latitude: f64,
    pub max_latitude: f64,
    pub min_longitude: f64,
    pub max_longitude: f64,
}

impl GeoBounds {
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        (self.min_latitude..=self.max_latitude).contains(&latitude)
            && (self.min_longitude..=self.max_longitude).contains(&longitude)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let lat_ok = -90.0 <= self.min_latitude
            && self.min_latitude <= self.max_latitude
            && self.max_latitude <= 90.0;
        let lon_ok = -180.0 <= self.min_longitude
            && self.min_longitude <= self.max_longitude
            && self.max_longitude <= 180.0;
        if !lat_ok {
            return Err(ConfigError::InvalidBounds(format!(
                "latitude range [{}, {}]",
                self.min_latitude, self.max_latitude
            )));
        }
        if !lon_ok {
            return Err(ConfigError::InvalidBounds(format!(
                "longitude range [{}, {}]",
                self.min_longitude, self.max_longitude
            )));
        }
        Ok(())
    }
}

impl Default for GeoBounds {
    /// Contiguous United States.
    fn default() -> Self {
        Self {
            min_latitude: 24.5,
            max_latitude: 49.4,
            min_longitude: -124.8,
            max_longitude: -66.9,
        }
    }
}

/// Full configuration of the event factory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    pub event_count: EventCount,
    pub window: TimeWindow,
    pub weights: EventWeights,
    /// Number of distinct users events are attributed to.
    pub user_pool_size: usize,
    /// Number of URLs view events pick from.
    pub url_pool_size: usize,
    /// Chance that a click carries both `element_id` and `xpath`.
    pub click_second_identifier_probability: f64,
    pub location_bounds: GeoBounds,
    pub accuracy_min: f64,
    pub accuracy_max: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            event_count: EventCount::default(),
            window: TimeWindow::default(),
            weights: EventWeights::default(),
            user_pool_size: 150,
            url_pool_size: 5,
            click_second_identifier_probability: 0.4,
            location_bounds: GeoBounds::default(),
            accuracy_min: 1.0,
            accuracy_max: 50.0,
        }
    }
}

impl GeneratorConfig {
    /// Load and validate a config from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse and validate a config from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: GeneratorConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Replace the count policy with a fixed count.
    pub fn with_event_count(mut self, count: u64) -> Self {
        self.event_count = EventCount::Fixed(count);
        self
    }

    pub fn with_window(mut self, window: TimeWindow) -> Self {
        self.window = window;
        self
    }

    pub fn with_user_pool_size(mut self, size: usize) -> Self {
        self.user_pool_size = size;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let EventCount::Range { min, max } = self.event_count {
            if min > max {
                return Err(ConfigError::InvalidEventCount { min, max });
            }
        }
        self.window.validate()?;
        self.weights.validate()?;
        if self.user_pool_size == 0 {
            return Err(ConfigError::EmptyUserPool);
        }
        if self.url_pool_size == 0 {
            return Err(ConfigError::EmptyUrlPool);
        }
        let p = self.click_second_identifier_probability;
        if !(0.0..=1.0).contains(&p) {
            return Err(ConfigError::InvalidProbability(p));
        }
        self.location_bounds.validate()?;
        if !(self.accuracy_min.is_finite()
            && self.accuracy_max.is_finite()
            && self.accuracy_min <= self.accuracy_max
            && one_decimal_range(self.accuracy_min, self.accuracy_max).is_some())
        {
            return Err(ConfigError::InvalidAccuracy {
                min: self.accuracy_min,
                max: self.accuracy_max,
            });
        }
        Ok(())
    }
}
