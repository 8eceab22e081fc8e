//! Shared HTTP plumbing for the outbound service clients.

use reqwest::{Client, RequestBuilder};
use std::time::Duration;
use tracing::warn;

use crate::error::{Result, TrailbotError};

const USER_AGENT: &str = concat!("trailbot/", env!("CARGO_PKG_VERSION"));

/// Longest slice of an error body we keep in error messages.
const MAX_ERROR_BODY: usize = 200;

/// Build the `reqwest` client shared by every service. Each request is
/// bounded by `timeout`.
pub fn build_http_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| TrailbotError::Config(format!("failed to build HTTP client: {e}")))
}

/// Send `request` and return the body of a 2xx response.
pub(crate) async fn send_for_body(service: &'static str, request: RequestBuilder) -> Result<String> {
    send_for_body_with(service, request, |body| truncate(body).to_string()).await
}

/// Like [`send_for_body`], with `describe` turning a non-2xx body into the
/// error message.
pub(crate) async fn send_for_body_with<F>(
    service: &'static str,
    request: RequestBuilder,
    describe: F,
) -> Result<String>
where
    F: FnOnce(&str) -> String,
{
    let response = request
        .send()
        .await
        .map_err(|e| TrailbotError::upstream(service, e))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| TrailbotError::upstream(service, format!("failed to read body: {e}")))?;

    if !status.is_success() {
        warn!(service, %status, "Service returned an error status");
        return Err(TrailbotError::upstream(
            service,
            format!("HTTP {}: {}", status, describe(&body)),
        ));
    }

    Ok(body)
}

pub(crate) fn truncate(body: &str) -> &str {
    match body.char_indices().nth(MAX_ERROR_BODY) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
