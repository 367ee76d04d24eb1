//! Application configuration module
//!
//! Every tunable knob of the server lives in [`AppConfig`]: the bind
//! address, the event log location, and the sizes and periods that govern
//! the event queue, the batch writer and the broadcast hub.
//!
//! Values come from defaults, optionally overridden by `LIVECOUNT_*`
//! environment variables through [`AppConfig::from_env`]. The per-session
//! delivery slot is fixed at one patch and is not configurable.

use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

/// Default listening port (bound on all interfaces)
pub const DEFAULT_PORT: u16 = 8080;
/// Default SQLite database URL
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data.sqlite";
/// Default capacity of the mutation event queue
pub const DEFAULT_EVENT_QUEUE_CAPACITY: usize = 10_000;
/// Default number of events that triggers an immediate flush
pub const DEFAULT_BATCH_SIZE: usize = 10;
/// Default period of the writer's flush timer
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_millis(1000);
/// Default capacity of the hub's broadcast intake
pub const DEFAULT_HUB_CAPACITY: usize = 128;
/// Default number of recent actions kept for rendering
pub const DEFAULT_HISTORY_LIMIT: usize = 100;
/// Default name of the client identification cookie
pub const DEFAULT_COOKIE_NAME: &str = "datastar-client-id";
/// Default lifetime of the client identification cookie
pub const DEFAULT_COOKIE_MAX_AGE: Duration = Duration::from_secs(3600);

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Address the HTTP server binds to
    pub addr: SocketAddr,
    /// SQLite URL of the persistent event log
    pub database_url: String,
    /// Slots in the bounded mutation event queue
    pub event_queue_capacity: usize,
    /// Batch size that triggers an immediate flush
    pub batch_size: usize,
    /// Period of the flush timer
    pub flush_interval: Duration,
    /// Pending broadcasts the hub accepts before producers wait
    pub hub_capacity: usize,
    /// Recent actions kept in memory for rendering
    pub history_limit: usize,
    /// Name of the client identification cookie
    pub cookie_name: String,
    /// Lifetime of the client identification cookie
    pub cookie_max_age: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            database_url: DEFAULT_DATABASE_URL.to_string(),
            event_queue_capacity: DEFAULT_EVENT_QUEUE_CAPACITY,
            batch_size: DEFAULT_BATCH_SIZE,
            flush_interval: DEFAULT_FLUSH_INTERVAL,
            hub_capacity: DEFAULT_HUB_CAPACITY,
            history_limit: DEFAULT_HISTORY_LIMIT,
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            cookie_max_age: DEFAULT_COOKIE_MAX_AGE,
        }
    }
}

impl AppConfig {
    /// Create a new AppConfigBuilder
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Load configuration from the process environment
    ///
    /// Recognised variables:
    /// - `LIVECOUNT_ADDR`
    /// - `LIVECOUNT_DATABASE_URL`
    /// - `LIVECOUNT_EVENT_QUEUE_CAPACITY`
    /// - `LIVECOUNT_BATCH_SIZE`
    /// - `LIVECOUNT_FLUSH_INTERVAL_MS`
    /// - `LIVECOUNT_HUB_CAPACITY`
    /// - `LIVECOUNT_HISTORY_LIMIT`
    /// - `LIVECOUNT_COOKIE_NAME`
    /// - `LIVECOUNT_COOKIE_MAX_AGE_SECS`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = Self::builder();

        if let Some(addr) = lookup("LIVECOUNT_ADDR") {
            let addr = addr
                .parse::<SocketAddr>()
                .map_err(|_| ConfigError::InvalidValue("LIVECOUNT_ADDR", addr))?;
            builder = builder.addr(addr);
        }
        if let Some(url) = lookup("LIVECOUNT_DATABASE_URL") {
            builder = builder.database_url(url);
        }
        if let Some(n) = parse_var(&lookup, "LIVECOUNT_EVENT_QUEUE_CAPACITY")? {
            builder = builder.event_queue_capacity(n);
        }
        if let Some(n) = parse_var(&lookup, "LIVECOUNT_BATCH_SIZE")? {
            builder = builder.batch_size(n);
        }
        if let Some(ms) = parse_var::<u64, _>(&lookup, "LIVECOUNT_FLUSH_INTERVAL_MS")? {
            builder = builder.flush_interval(Duration::from_millis(ms));
        }
        if let Some(n) = parse_var(&lookup, "LIVECOUNT_HUB_CAPACITY")? {
            builder = builder.hub_capacity(n);
        }
        if let Some(n) = parse_var(&lookup, "LIVECOUNT_HISTORY_LIMIT")? {
            builder = builder.history_limit(n);
        }
        if let Some(name) = lookup("LIVECOUNT_COOKIE_NAME") {
            builder = builder.cookie_name(name);
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, "LIVECOUNT_COOKIE_MAX_AGE_SECS")? {
            builder = builder.cookie_max_age(Duration::from_secs(secs));
        }

        builder.build()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database_url.trim().is_empty() {
            return Err(ConfigError::MissingValue("database_url"));
        }
        if self.event_queue_capacity == 0 {
            return Err(ConfigError::MustBePositive("event_queue_capacity"));
        }
        if self.batch_size == 0 {
            return Err(ConfigError::MustBePositive("batch_size"));
        }
        if self.flush_interval.is_zero() {
            return Err(ConfigError::MustBePositive("flush_interval"));
        }
        if self.hub_capacity == 0 {
            return Err(ConfigError::MustBePositive("hub_capacity"));
        }
        if self.history_limit == 0 {
            return Err(ConfigError::MustBePositive("history_limit"));
        }
        let cookie_ok = !self.cookie_name.is_empty()
            && self
                .cookie_name
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
        if !cookie_ok {
            return Err(ConfigError::InvalidValue("cookie_name", self.cookie_name.clone()));
        }
        Ok(())
    }
}

fn parse_var<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue(key, raw)),
        None => Ok(None),
    }
}

/// Builder for AppConfig
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    addr: Option<SocketAddr>,
    database_url: Option<String>,
    event_queue_capacity: Option<usize>,
    batch_size: Option<usize>,
    flush_interval: Option<Duration>,
    hub_capacity: Option<usize>,
    history_limit: Option<usize>,
    cookie_name: Option<String>,
    cookie_max_age: Option<Duration>,
}

impl AppConfigBuilder {
    pub fn addr(mut self, addr: SocketAddr) -> Self {
        self.addr = Some(addr);
        self
    }

    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = Some(url.into());
        self
    }

    pub fn event_queue_capacity(mut self, capacity: usize) -> Self {
        self.event_queue_capacity = Some(capacity);
        self
    }

    pub fn batch_size(mut self, size: usize) -> Self {
        self.batch_size = Some(size);
        self
    }

    pub fn flush_interval(mut self, interval: Duration) -> Self {
        self.flush_interval = Some(interval);
        self
    }

    pub fn hub_capacity(mut self, capacity: usize) -> Self {
        self.hub_capacity = Some(capacity);
        self
    }

    pub fn history_limit(mut self, limit: usize) -> Self {
        self.history_limit = Some(limit);
        self
    }

    pub fn cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = Some(name.into());
        self
    }

    pub fn cookie_max_age(mut self, max_age: Duration) -> Self {
        self.cookie_max_age = Some(max_age);
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        let defaults = AppConfig::default();
        let config = AppConfig {
            addr: self.addr.unwrap_or(defaults.addr),
            database_url: self.database_url.unwrap_or(defaults.database_url),
            event_queue_capacity: self.event_queue_capacity.unwrap_or(defaults.event_queue_capacity),
            batch_size: self.batch_size.unwrap_or(defaults.batch_size),
            flush_interval: self.flush_interval.unwrap_or(defaults.flush_interval),
            hub_capacity: self.hub_capacity.unwrap_or(defaults.hub_capacity),
            history_limit: self.history_limit.unwrap_or(defaults.history_limit),
            cookie_name: self.cookie_name.unwrap_or(defaults.cookie_name),
            cookie_max_age: self.cookie_max_age.unwrap_or(defaults.cookie_max_age),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Configuration errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {0}: {1:?}")]
    InvalidValue(&'static str, String),
    #[error("missing value: {0}")]
    MissingValue(&'static str),
    #[error("{0} must be greater than zero")]
    MustBePositive(&'static str),
}
