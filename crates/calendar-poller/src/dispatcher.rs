//! Sends chore actions to the chore API.

use shared_types::{ChoreAction, ChoreMethod};

use crate::error::{PollerError, PollerResult};

/// HTTP client for the chore API
#[derive(Debug, Clone)]
pub struct ChoreClient {
    http: reqwest::Client,
    base_url: String,
}

impl ChoreClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn endpoint(&self, action: &ChoreAction) -> String {
        format!("{}/{}", self.base_url, action.resource())
    }

    /// POST singular keys, PATCH plural ones. Non-2xx responses are errors.
    pub async fn dispatch(&self, action: &ChoreAction) -> PollerResult<()> {
        let url = self.endpoint(action);
        let method = action.method();

        let request = match method {
            ChoreMethod::Create => self.http.post(&url),
            ChoreMethod::Update => self.http.patch(&url),
        };

        let response = request.json(&action.body()).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(PollerError::Dispatch {
                method: method.as_str(),
                url,
                status,
            });
        }

        tracing::info!("{} {} -> {}", method.as_str(), url, status);
        Ok(())
    }
}
