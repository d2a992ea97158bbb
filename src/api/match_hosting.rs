//! reqwest client for the match-hosting API (bearer token auth).

use super::{CreateMatchRequest, MatchHostingApi};
use crate::error::MatchmakingError;
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
struct CreatedMatch {
    id: String,
}

#[derive(Serialize)]
struct RconCommand<'a> {
    command: &'a str,
}

#[derive(Deserialize)]
struct RconOutput {
    #[serde(default)]
    output: String,
}

/// The hosted match API.
#[derive(Debug, Clone)]
pub struct HostedMatchApi {
    /// Base url without a trailing slash, e.g. `https://matches.example.com/api`.
    base_url: String,
    token: String,
    client: Client,
}

impl HostedMatchApi {
    pub fn new(base_url: &str, token: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            client: Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Turn a non-success status into an `ExternalApi` error, logging the body.
    async fn check(response: Response, action: &str) -> Result<Response, MatchmakingError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        log::error!("Match API {} failed with {}: {}", action, status, body);
        let message = match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => "match hosting rejected our token".to_string(),
            StatusCode::NOT_FOUND => "match not found on the hosting service".to_string(),
            _ => format!("{} failed with status {}", action, status),
        };
        Err(MatchmakingError::ExternalApi(message))
    }
}

#[async_trait]
impl MatchHostingApi for HostedMatchApi {
    async fn create_match(&self, request: &CreateMatchRequest) -> Result<String, MatchmakingError> {
        let response = self
            .client
            .post(self.url("matches"))
            .bearer_auth(&self.token)
            .json(request)
            .send()
            .await
            .inspect_err(|e| log::error!("Match API create request failed: {}", e))?;
        let created: CreatedMatch = Self::check(response, "create match").await?.json().await?;
        log::info!("Match API created match {}", created.id);
        Ok(created.id)
    }

    async fn cancel_match(&self, external_id: &str) -> Result<(), MatchmakingError> {
        let response = self
            .client
            .post(self.url(&format!("matches/{}/cancel", external_id)))
            .bearer_auth(&self.token)
            .send()
            .await
            .inspect_err(|e| log::error!("Match API cancel request failed: {}", e))?;
        Self::check(response, "cancel match").await?;
        Ok(())
    }

    async fn send_rcon(&self, external_id: &str, command: &str) -> Result<String, MatchmakingError> {
        let response = self
            .client
            .post(self.url(&format!("matches/{}/rcon", external_id)))
            .bearer_auth(&self.token)
            .json(&RconCommand { command })
            .send()
            .await
            .inspect_err(|e| log::error!("Match API rcon request failed: {}", e))?;
        let output: RconOutput = Self::check(response, "rcon").await?.json().await?;
        Ok(output.output)
    }
}
