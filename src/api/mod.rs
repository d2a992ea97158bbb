//! Clients for outside HTTP services: the match-hosting API and the Steam Web API.

mod match_hosting;
mod steam;

pub use match_hosting::HostedMatchApi;
pub use steam::{PlayerSummary, SteamApi};

use crate::error::MatchmakingError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One side of a match as the hosting API wants it.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct MatchTeam {
    pub name: String,
    /// Steam ids of the roster.
    pub players: Vec<String>,
}

/// Body sent to the hosting API to set up a match on one of our servers.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct CreateMatchRequest {
    pub server_address: String,
    pub server_port: u16,
    pub connect_password: String,
    pub team_1: MatchTeam,
    pub team_2: MatchTeam,
}

/// Describes the external service that actually runs matches.
///
/// Every call is a single attempt. Implementations log their own failures and
/// return `MatchmakingError::ExternalApi` or `MatchmakingError::Http`.
#[async_trait]
pub trait MatchHostingApi: Send + Sync {
    /// Create a match and return the id the hosting API assigned to it.
    async fn create_match(&self, request: &CreateMatchRequest) -> Result<String, MatchmakingError>;

    /// Cancel a running match.
    async fn cancel_match(&self, external_id: &str) -> Result<(), MatchmakingError>;

    /// Run an RCON command on the match's server and return its output.
    async fn send_rcon(&self, external_id: &str, command: &str) -> Result<String, MatchmakingError>;
}
