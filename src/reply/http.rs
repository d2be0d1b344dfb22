//! Blocking HTTP client for the reply backend.

use crate::error::{Error, Result};
use crate::reply::{ReplyClient, ReplyError};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Client for the backend's `POST /chat` endpoint.
#[derive(Debug)]
pub struct HttpReplyClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
    session_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    reply: String,
}

impl HttpReplyClient {
    /// Create a client for the given backend.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the underlying HTTP client cannot be
    /// built.
    pub fn new(base_url: &str, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }
}

impl ReplyClient for HttpReplyClient {
    fn send(&self, text: &str, session_id: &str) -> std::result::Result<String, ReplyError> {
        let url = format!("{}/chat", self.base_url);
        let mut request = self.client.post(&url).json(&ChatRequest {
            message: text,
            session_id,
        });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .map_err(|e| ReplyError::Network(e.to_string()))?;

        if let Some(failure) = classify_status(response.status()) {
            return Err(failure);
        }

        let body: ChatResponse = response
            .json()
            .map_err(|e| ReplyError::Server(e.to_string()))?;
        Ok(body.reply)
    }
}

/// Map a non-success status to the collaborator error it represents.
fn classify_status(status: StatusCode) -> Option<ReplyError> {
    if status.is_success() {
        None
    } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        Some(ReplyError::Unauthorized)
    } else {
        Some(ReplyError::Server(format!("HTTP {status}")))
    }
}
