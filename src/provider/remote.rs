//! HTTP-backed provider
//!
//! Posts the validated input to a transformation endpoint and maps transport
//! and status failures onto [`ProviderError`].

use super::{ProviderError, TransformProvider};
use crate::model::{Mode, ModeOptions};
use crate::validator::ValidatedInput;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Serialize)]
struct RemoteRequest<'a> {
    mode: Mode,
    text: &'a str,
    options: &'a ModeOptions,
}

#[derive(Debug, Deserialize)]
struct RemoteResponse {
    text: String,
}

#[derive(Debug, Deserialize)]
struct RemoteErrorResponse {
    error: String,
}

pub struct RemoteProvider {
    client: Client,
    endpoint: String,
}

impl RemoteProvider {
    /// Fails only when the HTTP client cannot be built (e.g. no TLS backend)
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

/// Map a non-success HTTP status onto the provider failure taxonomy
fn classify_status(status: StatusCode, message: String) -> ProviderError {
    match status.as_u16() {
        408 | 504 => ProviderError::Timeout,
        400 | 403 | 422 | 451 => ProviderError::Rejected(message),
        429 | 500..=599 => ProviderError::Unavailable(message),
        _ => ProviderError::Unavailable(format!("HTTP {status}: {message}")),
    }
}

fn classify_transport(e: &reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout
    } else if e.is_connect() {
        ProviderError::unavailable(format!("Connection failed: {e}"))
    } else {
        ProviderError::unavailable(format!("Request failed: {e}"))
    }
}

#[async_trait]
impl TransformProvider for RemoteProvider {
    async fn transform(&self, input: &ValidatedInput) -> Result<String, ProviderError> {
        let body = RemoteRequest {
            mode: input.mode(),
            text: input.source_text(),
            options: input.options(),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| classify_transport(&e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| classify_transport(&e))?;

        if !status.is_success() {
            let message = serde_json::from_str::<RemoteErrorResponse>(&text)
                .map_or_else(|_| status.to_string(), |r| r.error);
            return Err(classify_status(status, message));
        }

        let parsed: RemoteResponse = serde_json::from_str(&text)
            .map_err(|e| ProviderError::unavailable(format!("Malformed response: {e}")))?;
        Ok(parsed.text)
    }

    fn name(&self) -> &str {
        "remote"
    }
}
