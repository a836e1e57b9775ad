//! Reverse geocoding
//!
//! The [`Geocoder`] trait is the boundary to the external address service.
//! [`LocationResolver`] wraps an optional geocoder: with no credential
//! configured it answers `None` immediately, which callers treat the same as
//! an empty result set.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;
use tracing::{debug, error};

use crate::config::GeocodingConfig;
use crate::coords::Coordinates;
use crate::error::GeocodeError;

/// One candidate address from the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResult {
    pub formatted_address: String,
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn reverse_geocode(&self, coordinates: Coordinates) -> Result<Vec<GeocodeResult>, GeocodeError>;
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
    #[serde(default)]
    error_message: Option<String>,
}

/// Google Geocoding API client (`?latlng=..&key=..`).
///
/// The HTTP client is built on first use and shared by every request after.
pub struct HttpGeocoder {
    config: GeocodingConfig,
    client: OnceCell<reqwest::Client>,
}

impl HttpGeocoder {
    pub fn new(config: GeocodingConfig) -> Self {
        Self {
            config,
            client: OnceCell::new(),
        }
    }

    async fn client(&self) -> Result<&reqwest::Client, GeocodeError> {
        self.client
            .get_or_try_init(|| async {
                debug!("Initializing geocoding client for {}", self.config.endpoint);
                reqwest::Client::builder()
                    .timeout(self.config.timeout)
                    .build()
                    .map_err(GeocodeError::Request)
            })
            .await
    }
}

#[async_trait]
impl Geocoder for HttpGeocoder {
    async fn reverse_geocode(&self, coordinates: Coordinates) -> Result<Vec<GeocodeResult>, GeocodeError> {
        let client = self.client().await?;
        let latlng = format!("{},{}", coordinates.lat, coordinates.lng);

        let response = client
            .get(&self.config.endpoint)
            .query(&[("latlng", latlng.as_str()), ("key", self.config.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<failed to read body>".to_string());
            let truncated = if body.len() > 512 {
                format!("{}...", body.chars().take(512).collect::<String>())
            } else {
                body
            };
            error!("Geocoding HTTP {} for {}", status, latlng);
            return Err(GeocodeError::Http { status: status.as_u16(), body: truncated });
        }

        let body = response.text().await?;
        let parsed: GeocodeResponse = serde_json::from_str(&body)?;

        match parsed.status.as_str() {
            "OK" => Ok(parsed.results),
            "ZERO_RESULTS" => Ok(Vec::new()),
            _ => Err(GeocodeError::Service {
                status: parsed.status,
                message: parsed.error_message.unwrap_or_default(),
            }),
        }
    }
}

/// Turns coordinates into an address, or `None` when that isn't possible.
#[derive(Clone, Default)]
pub struct LocationResolver {
    geocoder: Option<Arc<dyn Geocoder>>,
}

impl LocationResolver {
    pub fn new(geocoder: Arc<dyn Geocoder>) -> Self {
        Self { geocoder: Some(geocoder) }
    }

    /// A resolver that never looks anything up
    pub fn disabled() -> Self {
        Self { geocoder: None }
    }

    pub fn from_config(config: Option<&GeocodingConfig>) -> Self {
        match config {
            Some(config) => Self::new(Arc::new(HttpGeocoder::new(config.clone()))),
            None => Self::disabled(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.geocoder.is_some()
    }

    /// First formatted address for the coordinates.
    ///
    /// `Ok(None)` when geocoding is unconfigured or nothing matched;
    /// service and transport failures are errors.
    pub async fn resolve(&self, coordinates: Coordinates) -> Result<Option<String>, GeocodeError> {
        let Some(geocoder) = &self.geocoder else {
            return Ok(None);
        };

        let results = geocoder.reverse_geocode(coordinates).await?;
        Ok(results.into_iter().next().map(|r| r.formatted_address))
    }
}
