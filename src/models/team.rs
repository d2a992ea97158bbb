//! Team and TeamStatus.

use crate::models::player::PlayerId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a team.
pub type TeamId = Uuid;

/// Where a team is in the match lifecycle.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamStatus {
    /// Free to challenge or be challenged.
    #[default]
    Waiting,
    /// Playing a launched match; roster is frozen.
    InMatch,
    /// Last match finished.
    Completed,
}

impl fmt::Display for TeamStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TeamStatus::Waiting => "waiting",
            TeamStatus::InMatch => "in_match",
            TeamStatus::Completed => "completed",
        };
        f.write_str(s)
    }
}

/// A team of players. `members` is in join order; the leader is always a member.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub members: Vec<PlayerId>,
    pub leader: PlayerId,
    pub max_players: usize,
    pub status: TeamStatus,
    /// Private teams are hidden from listings and cannot be joined directly.
    pub is_private: bool,
    pub created_at: DateTime<Utc>,
}

impl Team {
    /// Create a team whose only member is its leader.
    pub fn new(
        name: impl Into<String>,
        leader: PlayerId,
        max_players: usize,
        is_private: bool,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            members: vec![leader],
            leader,
            max_players,
            status: TeamStatus::Waiting,
            is_private,
            created_at: now,
        }
    }

    pub fn is_member(&self, player_id: PlayerId) -> bool {
        self.members.contains(&player_id)
    }

    pub fn is_leader(&self, player_id: PlayerId) -> bool {
        self.leader == player_id
    }

    pub fn is_full(&self) -> bool {
        self.members.len() >= self.max_players
    }

    pub fn is_in_match(&self) -> bool {
        self.status == TeamStatus::InMatch
    }
}
