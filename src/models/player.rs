//! Player data structure.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a player (used in teams and lookups).
pub type PlayerId = Uuid;

/// ELO every new player starts with.
pub const STARTING_ELO: u32 = 1000;

/// A registered player, identified externally by their Steam id.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    /// 64-bit Steam id as a decimal string.
    pub steam_id: String,
    pub name: String,
    pub elo: u32,
    pub wins: u32,
    pub losses: u32,
    pub created_at: DateTime<Utc>,
}

impl Player {
    /// Create a new player with the starting ELO and no results.
    pub fn new(steam_id: impl Into<String>, name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            steam_id: steam_id.into(),
            name: name.into(),
            elo: STARTING_ELO,
            wins: 0,
            losses: 0,
            created_at: now,
        }
    }

    /// Record a win and raise ELO by `step`.
    pub fn add_win(&mut self, step: u32) {
        self.wins += 1;
        self.elo = self.elo.saturating_add(step);
    }

    /// Record a loss and lower ELO by `step`, never below zero.
    pub fn add_loss(&mut self, step: u32) {
        self.losses += 1;
        self.elo = self.elo.saturating_sub(step);
    }
}
