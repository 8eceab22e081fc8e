//! Trail catalog client for the RapidAPI `trailapi` explore endpoint.
//!
//! Every record field is mandatory. One bad element fails the whole fetch;
//! callers never see a partially-filled [`TrailRecord`].

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::config::TrailsConfig;
use crate::error::{Result, TrailbotError};
use crate::geocode::Coordinates;
use crate::http::send_for_body;

const SERVICE: &str = "trail catalog";

/// Name of the collection field in an explore response.
const COLLECTION_FIELD: &str = "data";

/// A trail as listed by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrailRecord {
    pub id: i64,
    pub name: String,
    pub url: String,
    pub length: String,
    pub description: String,
    pub directions: String,
    pub city: String,
    pub region: String,
    pub country: String,
    pub difficulty: String,
    pub features: String,
    pub rating: i64,
}

impl TrailRecord {
    /// The one-line summary shown to the user.
    pub fn summary(&self) -> String {
        format!(
            "Name: {}. Description: {}. You can check more about this trail at: {}",
            self.name, self.description, self.url
        )
    }
}

/// Looks up trails near a point.
#[async_trait]
pub trait TrailCatalog: Send + Sync {
    async fn fetch_nearby(&self, coords: &Coordinates) -> Result<Vec<TrailRecord>>;
}

pub struct TrailApiClient {
    client: Client,
    base_url: String,
    api_key: String,
    host: String,
}

impl TrailApiClient {
    pub fn new(config: &TrailsConfig, client: Client) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            host: config.host.clone(),
        }
    }
}

/// Validate an explore response body into trail records.
pub fn parse_trails(body: &str) -> Result<Vec<TrailRecord>> {
    let mut root: Value = serde_json::from_str(body)
        .map_err(|e| TrailbotError::upstream(SERVICE, format!("malformed response: {e}")))?;

    let items = match root.get_mut(COLLECTION_FIELD).map(Value::take) {
        Some(Value::Array(items)) => items,
        _ => {
            return Err(TrailbotError::upstream(
                SERVICE,
                format!("response has no `{}` collection", COLLECTION_FIELD),
            ))
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value(item).map_err(|e| TrailbotError::Parse {
                index,
                message: e.to_string(),
            })
        })
        .collect()
}

#[async_trait]
impl TrailCatalog for TrailApiClient {
    async fn fetch_nearby(&self, coords: &Coordinates) -> Result<Vec<TrailRecord>> {
        let url = format!("{}/trails/explore/", self.base_url);
        debug!(%coords, url = %url, "Fetching nearby trails");

        let request = self
            .client
            .get(&url)
            .header("X-RapidAPI-Key", &self.api_key)
            .header("X-RapidAPI-Host", &self.host)
            .query(&[
                ("lat", coords.latitude.as_str()),
                ("lon", coords.longitude.as_str()),
            ]);

        let body = send_for_body(SERVICE, request).await?;
        let trails = parse_trails(&body)?;

        debug!(count = trails.len(), "Parsed trail records");
        Ok(trails)
    }
}
