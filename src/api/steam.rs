//! Steam Web API: player summaries.

use crate::error::MatchmakingError;
use reqwest::Client;
use serde::{Deserialize, Serialize};

const STEAM_API_URL: &str = "https://api.steampowered.com/";

/// The parts of a Steam player summary we use.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct PlayerSummary {
    pub steamid: String,
    pub personaname: String,
    #[serde(default)]
    pub avatarfull: Option<String>,
}

#[derive(Deserialize)]
struct SummariesEnvelope {
    response: SummariesBody,
}

#[derive(Deserialize)]
struct SummariesBody {
    #[serde(default)]
    players: Vec<PlayerSummary>,
}

#[derive(Debug, Clone)]
pub struct SteamApi {
    key: String,
    client: Client,
}

impl SteamApi {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            client: Client::new(),
        }
    }

    /// Look up one player. `Ok(None)` if Steam does not know the id.
    pub async fn player_summary(&self, steam_id: &str) -> Result<Option<PlayerSummary>, MatchmakingError> {
        let url = format!("{}ISteamUser/GetPlayerSummaries/v2/", STEAM_API_URL);
        let response = self
            .client
            .get(url)
            .query(&[("key", self.key.as_str()), ("steamids", steam_id)])
            .send()
            .await?;
        if !response.status().is_success() {
            log::error!("Steam API returned {} for {}", response.status(), steam_id);
            return Err(MatchmakingError::ExternalApi(format!(
                "Steam API returned {}",
                response.status()
            )));
        }
        let envelope: SummariesEnvelope = response.json().await?;
        Ok(envelope.response.players.into_iter().next())
    }
}
