//! Error type shared by the resolver, the catalog client and the orchestrator.

use thiserror::Error;

/// Failures raised while answering a trail question.
#[derive(Debug, Error)]
pub enum TrailbotError {
    /// Transport failure, non-success status or unparsable body from a
    /// third-party service.
    #[error("{service} request failed: {message}")]
    Upstream { service: &'static str, message: String },

    /// The geocoder returned no candidates for the query.
    #[error("no coordinates found for `{location}`")]
    NotFound { location: String },

    /// A catalog record is missing a required field.
    #[error("trail record #{index} is invalid: {message}")]
    Parse { index: usize, message: String },

    /// The catalog answered with an empty collection.
    #[error("no trails found near the requested location")]
    NoTrails,

    /// The model asked for a capability in a shape we do not understand.
    #[error("unexpected capability invocation: {0}")]
    CapabilityShapeMismatch(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl TrailbotError {
    pub(crate) fn upstream(service: &'static str, message: impl ToString) -> Self {
        Self::Upstream {
            service,
            message: message.to_string(),
        }
    }

    /// Whether the failure is about the requested place rather than a broken
    /// service.
    pub fn is_location_miss(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::NoTrails)
    }
}

pub type Result<T> = std::result::Result<T, TrailbotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = TrailbotError::upstream("geocoder", "HTTP 503");
        assert_eq!(err.to_string(), "geocoder request failed: HTTP 503");

        let err = TrailbotError::NotFound {
            location: "Atlantis".into(),
        };
        assert_eq!(err.to_string(), "no coordinates found for `Atlantis`");

        let err = TrailbotError::Parse {
            index: 2,
            message: "missing field `rating`".into(),
        };
        assert!(err.to_string().contains("#2"));
    }

    #[test]
    fn test_location_miss() {
        assert!(TrailbotError::NoTrails.is_location_miss());
        assert!(TrailbotError::NotFound {
            location: "x".into()
        }
        .is_location_miss());
        assert!(!TrailbotError::upstream("trails", "boom").is_location_miss());
    }
}
