//! Data structures for matchmaking: players, teams, challenges, matches, servers.

mod challenge;
mod game;
mod lobby;
mod player;
mod server;
mod team;

pub use challenge::{ChallengeId, ChallengeRequest, ChallengeStatus, DEFAULT_CHALLENGE_TTL_HOURS};
pub use game::{GameMatch, MatchId, Side};
pub use lobby::Lobby;
pub use player::{Player, PlayerId, STARTING_ELO};
pub use server::{MatchmakingServer, ServerId};
pub use team::{Team, TeamId, TeamStatus};
