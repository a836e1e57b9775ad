//! Runtime configuration
//!
//! Defaults match the interactive widget: 25px-high thumbnails, a handful of
//! files in flight, and no geocoding unless a credential is supplied.

use std::time::Duration;

use crate::error::ConfigError;

pub const ENV_GEOCODING_KEY: &str = "PHOTO_INSPECT_GEOCODING_KEY";
pub const ENV_GEOCODING_ENDPOINT: &str = "PHOTO_INSPECT_GEOCODING_ENDPOINT";
pub const ENV_THUMBNAIL_SIZE: &str = "PHOTO_INSPECT_THUMBNAIL_SIZE";
pub const ENV_CONCURRENCY: &str = "PHOTO_INSPECT_CONCURRENCY";

pub const DEFAULT_GEOCODING_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/geocode/json";
pub const DEFAULT_THUMBNAIL_SIZE: u32 = 25;
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Reverse geocoding service settings
#[derive(Debug, Clone)]
pub struct GeocodingConfig {
    pub api_key: String,
    pub endpoint: String,
    pub timeout: Duration,
}

impl GeocodingConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: DEFAULT_GEOCODING_ENDPOINT.to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[derive(Debug, Clone)]
pub struct InspectConfig {
    /// Thumbnail height in pixels
    pub thumbnail_max_dimension: u32,
    /// Files processed at once within a batch
    pub concurrency: usize,
    /// `None` disables location lookup
    pub geocoding: Option<GeocodingConfig>,
}

impl Default for InspectConfig {
    fn default() -> Self {
        Self {
            thumbnail_max_dimension: DEFAULT_THUMBNAIL_SIZE,
            concurrency: DEFAULT_CONCURRENCY,
            geocoding: None,
        }
    }
}

impl InspectConfig {
    /// Load from `PHOTO_INSPECT_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_THUMBNAIL_SIZE) {
            config.thumbnail_max_dimension = parse_number(ENV_THUMBNAIL_SIZE, &value)?;
        }
        if let Some(value) = lookup(ENV_CONCURRENCY) {
            config.concurrency = parse_number(ENV_CONCURRENCY, &value)?;
        }

        config.geocoding = lookup(ENV_GEOCODING_KEY)
            .filter(|key| !key.trim().is_empty())
            .map(|key| {
                let geocoding = GeocodingConfig::new(key.trim());
                match lookup(ENV_GEOCODING_ENDPOINT) {
                    Some(endpoint) if !endpoint.trim().is_empty() => geocoding.with_endpoint(endpoint.trim()),
                    _ => geocoding,
                }
            });

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.thumbnail_max_dimension == 0 {
            return Err(ConfigError::Invalid {
                key: "thumbnail_max_dimension".to_string(),
                value: "0".to_string(),
            });
        }
        if self.concurrency == 0 {
            return Err(ConfigError::Invalid {
                key: "concurrency".to_string(),
                value: "0".to_string(),
            });
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        key: key.to_string(),
        value: value.to_string(),
    })
}
