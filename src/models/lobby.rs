//! Lobby: the in-memory aggregate of players, teams, challenges, matches and servers.

use crate::error::{MatchmakingError, Result};
use crate::models::challenge::{ChallengeId, ChallengeRequest, DEFAULT_CHALLENGE_TTL_HOURS};
use crate::models::game::{GameMatch, MatchId};
use crate::models::player::{Player, PlayerId};
use crate::models::server::{MatchmakingServer, ServerId};
use crate::models::team::{Team, TeamId};
use chrono::Duration;

/// All matchmaking state. Logic functions in `crate::logic` take `&mut Lobby`.
#[derive(Clone, Debug)]
pub struct Lobby {
    pub players: Vec<Player>,
    pub teams: Vec<Team>,
    pub challenges: Vec<ChallengeRequest>,
    pub matches: Vec<GameMatch>,
    /// Pool order matters: the first available server is handed out.
    pub servers: Vec<MatchmakingServer>,
    /// How long a new challenge stays open.
    pub challenge_ttl: Duration,
}

impl Default for Lobby {
    fn default() -> Self {
        Self::new(Duration::hours(DEFAULT_CHALLENGE_TTL_HOURS))
    }
}

impl Lobby {
    pub fn new(challenge_ttl: Duration) -> Self {
        Self {
            players: Vec::new(),
            teams: Vec::new(),
            challenges: Vec::new(),
            matches: Vec::new(),
            servers: Vec::new(),
            challenge_ttl,
        }
    }

    pub fn player(&self, id: PlayerId) -> Result<&Player> {
        self.players
            .iter()
            .find(|p| p.id == id)
            .ok_or(MatchmakingError::PlayerNotFound(id))
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Result<&mut Player> {
        self.players
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(MatchmakingError::PlayerNotFound(id))
    }

    pub fn team(&self, id: TeamId) -> Result<&Team> {
        self.teams
            .iter()
            .find(|t| t.id == id)
            .ok_or(MatchmakingError::TeamNotFound(id))
    }

    pub fn team_mut(&mut self, id: TeamId) -> Result<&mut Team> {
        self.teams
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(MatchmakingError::TeamNotFound(id))
    }

    /// The team `player_id` currently belongs to, if any.
    pub fn team_of(&self, player_id: PlayerId) -> Option<&Team> {
        self.teams.iter().find(|t| t.is_member(player_id))
    }

    pub fn challenge(&self, id: ChallengeId) -> Result<&ChallengeRequest> {
        self.challenges
            .iter()
            .find(|c| c.id == id)
            .ok_or(MatchmakingError::ChallengeNotFound(id))
    }

    pub fn challenge_mut(&mut self, id: ChallengeId) -> Result<&mut ChallengeRequest> {
        self.challenges
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(MatchmakingError::ChallengeNotFound(id))
    }

    pub fn game_match(&self, id: MatchId) -> Result<&GameMatch> {
        self.matches
            .iter()
            .find(|m| m.id == id)
            .ok_or(MatchmakingError::MatchNotFound(id))
    }

    pub fn game_match_mut(&mut self, id: MatchId) -> Result<&mut GameMatch> {
        self.matches
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or(MatchmakingError::MatchNotFound(id))
    }

    pub fn server(&self, id: ServerId) -> Result<&MatchmakingServer> {
        self.servers
            .iter()
            .find(|s| s.id == id)
            .ok_or(MatchmakingError::ServerNotFound(id))
    }

    pub fn server_mut(&mut self, id: ServerId) -> Result<&mut MatchmakingServer> {
        self.servers
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(MatchmakingError::ServerNotFound(id))
    }
}
