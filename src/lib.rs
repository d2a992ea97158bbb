//! Team matchmaking: library with models, business logic and API clients.

pub mod api;
pub mod config;
pub mod error;
pub mod logic;
pub mod models;

pub use api::{CreateMatchRequest, HostedMatchApi, MatchHostingApi, MatchTeam, SteamApi};
pub use config::{Config, ConfigError};
pub use error::MatchmakingError;
pub use logic::*;
pub use models::{
    ChallengeId, ChallengeRequest, ChallengeStatus, GameMatch, Lobby, MatchId, MatchmakingServer,
    Player, PlayerId, ServerId, Side, Team, TeamId, TeamStatus, STARTING_ELO,
};
