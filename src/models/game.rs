//! GameMatch and Side for a launched team-vs-team match.

use crate::error::{MatchmakingError, Result};
use crate::models::challenge::ChallengeId;
use crate::models::server::ServerId;
use crate::models::team::TeamId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a match (local; the hosting API has its own id).
pub type MatchId = Uuid;

/// Which side of a match.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    One,
    Two,
}

/// A match hosted by the external match API on one of our servers.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameMatch {
    pub id: MatchId,
    /// Id assigned by the match-hosting API.
    pub external_id: String,
    pub challenge_id: Option<ChallengeId>,
    pub server_id: ServerId,
    pub team_1: TeamId,
    pub team_2: TeamId,
    pub team_1_score: u32,
    pub team_2_score: u32,
    pub is_finished: bool,
    /// A cancelled match is always finished as well.
    pub is_cancelled: bool,
    pub created_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl GameMatch {
    pub fn new(
        external_id: impl Into<String>,
        challenge_id: Option<ChallengeId>,
        server_id: ServerId,
        team_1: TeamId,
        team_2: TeamId,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            external_id: external_id.into(),
            challenge_id,
            server_id,
            team_1,
            team_2,
            team_1_score: 0,
            team_2_score: 0,
            is_finished: false,
            is_cancelled: false,
            created_at: now,
            finished_at: None,
        }
    }

    pub fn is_running(&self) -> bool {
        !self.is_finished
    }

    pub fn team(&self, side: Side) -> TeamId {
        match side {
            Side::One => self.team_1,
            Side::Two => self.team_2,
        }
    }

    /// Winning side of a finished, non-cancelled match. None for draws.
    pub fn winner(&self) -> Option<Side> {
        if !self.is_finished || self.is_cancelled {
            return None;
        }
        match self.team_1_score.cmp(&self.team_2_score) {
            std::cmp::Ordering::Greater => Some(Side::One),
            std::cmp::Ordering::Less => Some(Side::Two),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn finish(&mut self, team_1_score: u32, team_2_score: u32, now: DateTime<Utc>) -> Result<()> {
        if self.is_finished {
            return Err(MatchmakingError::MatchFinished);
        }
        self.team_1_score = team_1_score;
        self.team_2_score = team_2_score;
        self.is_finished = true;
        self.finished_at = Some(now);
        Ok(())
    }

    pub fn cancel(&mut self, now: DateTime<Utc>) -> Result<()> {
        if self.is_finished {
            return Err(MatchmakingError::MatchFinished);
        }
        self.is_cancelled = true;
        self.is_finished = true;
        self.finished_at = Some(now);
        Ok(())
    }
}
