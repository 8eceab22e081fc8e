//! Location resolver backed by the geocode.maps.co search API.
//!
//! Results are taken as-is from the provider: resolving the same name
//! twice may give slightly different coordinates if the provider's index
//! changes in between. Nothing here caches or retries.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::fmt;
use tracing::debug;

use crate::config::GeocoderConfig;
use crate::error::{Result, TrailbotError};
use crate::http::send_for_body;

const SERVICE: &str = "geocoder";

/// A latitude/longitude pair, kept as the decimal text the geocoder returned.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Coordinates {
    #[serde(rename = "lat")]
    pub latitude: String,
    #[serde(rename = "lon")]
    pub longitude: String,
}

impl Coordinates {
    pub fn new(latitude: impl Into<String>, longitude: impl Into<String>) -> Self {
        Self {
            latitude: latitude.into(),
            longitude: longitude.into(),
        }
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

/// Resolves a free-text place name to coordinates.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn resolve(&self, location: &str) -> Result<Coordinates>;
}

pub struct MapsCoGeocoder {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl MapsCoGeocoder {
    pub fn new(config: &GeocoderConfig, client: Client) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
        }
    }
}

/// Take the first candidate out of a search response body.
fn first_candidate(location: &str, body: &str) -> Result<Coordinates> {
    let candidates: Vec<serde_json::Value> = serde_json::from_str(body)
        .map_err(|e| TrailbotError::upstream(SERVICE, format!("malformed response: {e}")))?;

    let first = candidates.into_iter().next().ok_or_else(|| TrailbotError::NotFound {
        location: location.to_string(),
    })?;

    serde_json::from_value(first)
        .map_err(|e| TrailbotError::upstream(SERVICE, format!("malformed candidate: {e}")))
}

#[async_trait]
impl Geocoder for MapsCoGeocoder {
    async fn resolve(&self, location: &str) -> Result<Coordinates> {
        let url = format!("{}/search", self.base_url);
        debug!(location, url = %url, "Resolving location");

        let mut request = self.client.get(&url).query(&[("q", location)]);
        if let Some(key) = &self.api_key {
            request = request.query(&[("api_key", key)]);
        }

        let body = send_for_body(SERVICE, request).await?;
        let coords = first_candidate(location, &body)?;

        debug!(location, %coords, "Resolved location");
        Ok(coords)
    }
}
