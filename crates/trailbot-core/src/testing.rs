//! Scripted stand-ins for the external services, shared by unit tests.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::{Result, TrailbotError};
use crate::geocode::{Coordinates, Geocoder};
use crate::provider::types::{ChatMessage, Reply, ToolDefinition};
use crate::provider::LlmProvider;
use crate::trails::{TrailCatalog, TrailRecord};

/// Provider that returns a fixed reply and records what it was sent.
pub struct ScriptedProvider {
    reply: Reply,
    pub seen_messages: Arc<Mutex<Vec<ChatMessage>>>,
    pub seen_tools: Arc<Mutex<Vec<String>>>,
}

impl ScriptedProvider {
    pub fn new(reply: Reply) -> Self {
        Self {
            reply,
            seen_messages: Arc::default(),
            seen_tools: Arc::default(),
        }
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    async fn chat(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolDefinition],
        _model: Option<&str>,
        _max_tokens: u32,
        _temperature: f32,
    ) -> Result<Reply> {
        *self.seen_messages.lock().unwrap() = messages.to_vec();
        *self.seen_tools.lock().unwrap() = tools.iter().map(|t| t.function.name.clone()).collect();
        Ok(self.reply.clone())
    }

    fn name(&self) -> &str {
        "scripted"
    }

    fn default_model(&self) -> &str {
        "scripted-model"
    }
}

/// Geocoder returning fixed coordinates (or nothing) and counting calls.
#[derive(Default)]
pub struct CountingGeocoder {
    pub result: Option<Coordinates>,
    pub unavailable: bool,
    pub calls: AtomicUsize,
    pub last_query: Mutex<Option<String>>,
}

impl CountingGeocoder {
    pub fn returning(coords: Coordinates) -> Self {
        Self {
            result: Some(coords),
            ..Self::default()
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Every lookup fails as if the service were down.
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Geocoder for CountingGeocoder {
    async fn resolve(&self, location: &str) -> Result<Coordinates> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_query.lock().unwrap() = Some(location.to_string());
        if self.unavailable {
            return Err(TrailbotError::upstream("geocoder", "HTTP 503 Service Unavailable"));
        }
        self.result.clone().ok_or_else(|| TrailbotError::NotFound {
            location: location.to_string(),
        })
    }
}

/// Catalog returning fixed records and counting calls.
#[derive(Default)]
pub struct CountingCatalog {
    pub trails: Vec<TrailRecord>,
    /// Index of a record reported as malformed.
    pub malformed_at: Option<usize>,
    pub calls: AtomicUsize,
    pub last_coords: Mutex<Option<Coordinates>>,
}

impl CountingCatalog {
    pub fn returning(trails: Vec<TrailRecord>) -> Self {
        Self {
            trails,
            ..Self::default()
        }
    }

    pub fn malformed_at(index: usize) -> Self {
        Self {
            malformed_at: Some(index),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TrailCatalog for CountingCatalog {
    async fn fetch_nearby(&self, coords: &Coordinates) -> Result<Vec<TrailRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_coords.lock().unwrap() = Some(coords.clone());
        if let Some(index) = self.malformed_at {
            return Err(TrailbotError::Parse {
                index,
                message: "missing field `url`".into(),
            });
        }
        Ok(self.trails.clone())
    }
}

pub fn barton_creek() -> TrailRecord {
    TrailRecord {
        id: 101,
        name: "Barton Creek Greenbelt".into(),
        url: "https://www.singletracks.com/bike-trails/barton-creek-greenbelt".into(),
        length: "7.9".into(),
        description: "Scenic limestone canyon along Barton Creek".into(),
        directions: "Trailhead at Zilker Park".into(),
        city: "Austin".into(),
        region: "Texas".into(),
        country: "United States".into(),
        difficulty: "Intermediate".into(),
        features: "creek crossings, rock gardens".into(),
        rating: 4,
    }
}
