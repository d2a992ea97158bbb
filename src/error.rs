//! Errors returned by matchmaking operations.

use crate::models::{ChallengeId, ChallengeStatus, MatchId, PlayerId, ServerId, TeamId};
use thiserror::Error;

/// Errors that can occur during team, challenge, match or server operations.
///
/// The `Display` text is what the HTTP layer hands back to the user.
#[derive(Debug, Error)]
pub enum MatchmakingError {
    #[error("Player not found")]
    PlayerNotFound(PlayerId),

    #[error("Team not found")]
    TeamNotFound(TeamId),

    #[error("Challenge not found")]
    ChallengeNotFound(ChallengeId),

    #[error("Match not found")]
    MatchNotFound(MatchId),

    #[error("Server not found")]
    ServerNotFound(ServerId),

    #[error("A player with this Steam id is already registered")]
    DuplicateSteamId,

    #[error("A team with this name already exists")]
    DuplicateTeamName,

    #[error("Team name must not be empty")]
    EmptyTeamName,

    #[error("A team needs room for at least one player")]
    InvalidTeamSize,

    #[error("Player is already on a team")]
    AlreadyOnTeam,

    #[error("Player is not a member of this team")]
    NotAMember,

    #[error("Only the team leader can do this")]
    NotLeader,

    #[error("Team is full ({max_players} players)")]
    TeamFull { max_players: usize },

    #[error("Team is private")]
    TeamPrivate,

    #[error("Team is currently in a match")]
    TeamInMatch,

    #[error("The leader cannot kick themselves, leave the team instead")]
    CannotKickLeader,

    #[error("A team cannot challenge itself")]
    SelfChallenge,

    #[error("One of the teams already has an active challenge")]
    ActiveChallengeExists,

    #[error("Challenge is {0}, expected pending")]
    ChallengeNotPending(ChallengeStatus),

    #[error("Challenge has expired")]
    ChallengeExpired,

    #[error("Team is not part of this challenge")]
    NotInChallenge,

    #[error("Both teams must be ready before the match can start")]
    NotReady,

    #[error("Challenge has no match yet")]
    NoMatch,

    #[error("Match is still in progress")]
    MatchInProgress,

    #[error("Match is already finished")]
    MatchFinished,

    #[error("No matchmaking server is available")]
    NoServerAvailable,

    #[error("Server is not available")]
    ServerUnavailable,

    #[error("Server is occupied")]
    ServerOccupied,

    #[error("Player count exceeds server capacity ({max_players})")]
    ServerFull { max_players: u32 },

    #[error("Match hosting API error: {0}")]
    ExternalApi(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl MatchmakingError {
    /// True for lookups of ids that do not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::PlayerNotFound(_)
                | Self::TeamNotFound(_)
                | Self::ChallengeNotFound(_)
                | Self::MatchNotFound(_)
                | Self::ServerNotFound(_)
        )
    }

    /// True when the failure came from an outside HTTP service.
    pub fn is_external(&self) -> bool {
        matches!(self, Self::ExternalApi(_) | Self::Http(_))
    }
}

pub type Result<T> = std::result::Result<T, MatchmakingError>;
