//! The `get_lat_long` capability: place name -> coordinates -> nearby trails.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info};

use super::Tool;
use crate::error::{Result, TrailbotError};
use crate::geocode::Geocoder;
use crate::provider::types::Invocation;
use crate::trails::TrailCatalog;

pub const TOOL_NAME: &str = "get_lat_long";

#[derive(Debug, Deserialize)]
struct LocationArgs {
    location: String,
}

/// Resolves the requested location and summarizes the nearest trails.
pub struct TrailFinderTool {
    geocoder: Arc<dyn Geocoder>,
    catalog: Arc<dyn TrailCatalog>,
    max_trails_shown: usize,
}

impl TrailFinderTool {
    pub fn new(geocoder: Arc<dyn Geocoder>, catalog: Arc<dyn TrailCatalog>, max_trails_shown: usize) -> Self {
        Self {
            geocoder,
            catalog,
            max_trails_shown: max_trails_shown.max(1),
        }
    }
}

#[async_trait]
impl Tool for TrailFinderTool {
    fn name(&self) -> &str {
        TOOL_NAME
    }

    fn description(&self) -> &str {
        "Get latitude and longitude of the input location"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "location": {
                    "type": "string",
                    "description": "The name of the location"
                }
            },
            "required": ["location"]
        })
    }

    async fn execute(&self, call: &Invocation) -> Result<String> {
        let args: LocationArgs = call.parse_arguments()?;
        let location = args.location.trim();
        if location.is_empty() {
            return Err(TrailbotError::CapabilityShapeMismatch(
                "`location` argument is empty".into(),
            ));
        }

        let coords = self.geocoder.resolve(location).await?;
        let trails = self.catalog.fetch_nearby(&coords).await?;
        if trails.is_empty() {
            return Err(TrailbotError::NoTrails);
        }

        info!(location, found = trails.len(), shown = self.max_trails_shown.min(trails.len()), "Found trails");

        let summary = trails
            .iter()
            .take(self.max_trails_shown)
            .map(|t| t.summary())
            .collect::<Vec<_>>()
            .join("\n\n");

        debug!(summary_len = summary.len(), "Trail summary ready");
        Ok(summary)
    }
}
