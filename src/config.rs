//! Tracker configuration.
//!
//! Defaults match the Digitraffic train location feed. Every value can be
//! overridden through `TRAIN_TRACKER_*` environment variables.

use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

/// GTFS-RT vehicle positions for Finnish trains.
pub const DEFAULT_FEED_URL: &str = "https://rata.digitraffic.fi/api/v1/trains/gtfs-rt-locations";

pub const DEFAULT_USER_AGENT: &str = "TrainTrackerTest/1.0";

/// Digitraffic asks every client to identify itself with this header.
pub const CLIENT_HEADER_NAME: &str = "Digitraffic-User";
pub const DEFAULT_CLIENT_HEADER_VALUE: &str = "TrainTrackerTest";

/// Minimum spacing between outbound requests.
pub const MIN_REQUEST_INTERVAL: Duration = Duration::from_secs(5);

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Period of the automatic refresh.
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// Longest all-digit query that still gets the word-boundary pass.
///
/// Finnish train numbers are mostly 1-3 digits; kept tunable.
pub const NUMERIC_BOUNDARY_MAX_LEN: usize = 3;

/// Settings for the upstream feed client.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub url: String,
    pub user_agent: String,
    pub client_header_value: String,
    pub timeout: Duration,
    pub min_interval: Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_FEED_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            client_header_value: DEFAULT_CLIENT_HEADER_VALUE.to_string(),
            timeout: REQUEST_TIMEOUT,
            min_interval: MIN_REQUEST_INTERVAL,
        }
    }
}

impl FeedConfig {
    /// Point the client at another feed (for testing).
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_min_interval(mut self, interval: Duration) -> Self {
        self.min_interval = interval;
        self
    }
}

/// Search tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchPolicy {
    /// Longest all-digit query eligible for the word-boundary pass
    pub boundary_max_len: usize,
}

impl Default for SearchPolicy {
    fn default() -> Self {
        Self {
            boundary_max_len: NUMERIC_BOUNDARY_MAX_LEN,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    pub feed: FeedConfig,
    pub refresh_interval: Duration,
    pub search: SearchPolicy,
}

impl TrackerConfig {
    pub fn new(feed: FeedConfig) -> Self {
        Self {
            feed,
            refresh_interval: REFRESH_INTERVAL,
            search: SearchPolicy::default(),
        }
    }

    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    pub fn with_search_policy(mut self, policy: SearchPolicy) -> Self {
        self.search = policy;
        self
    }

    /// Defaults overridden by the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::new(FeedConfig::default());

        if let Some(url) = lookup("TRAIN_TRACKER_FEED_URL") {
            config.feed.url = url;
        }
        if let Some(secs) = parse_var::<u64>(&lookup, "TRAIN_TRACKER_REFRESH_SECS")? {
            config.refresh_interval = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_var::<u64>(&lookup, "TRAIN_TRACKER_MIN_INTERVAL_SECS")? {
            config.feed.min_interval = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_var::<u64>(&lookup, "TRAIN_TRACKER_TIMEOUT_SECS")? {
            config.feed.timeout = Duration::from_secs(secs);
        }
        if let Some(len) = parse_var::<usize>(&lookup, "TRAIN_TRACKER_BOUNDARY_MAX_LEN")? {
            config.search.boundary_max_len = len;
        }

        Ok(config)
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self::new(FeedConfig::default())
    }
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidEnv {
                var,
                message: e.to_string(),
                value,
            }),
    }
}
