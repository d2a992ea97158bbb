//! Matchmaking server and its occupancy flags.

use crate::error::{MatchmakingError, Result};
use crate::models::game::MatchId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a matchmaking server.
pub type ServerId = Uuid;

/// A game server in the matchmaking pool.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct MatchmakingServer {
    pub id: ServerId,
    pub name: String,
    pub address: String,
    pub port: u16,
    pub is_active: bool,
    pub is_occupied: bool,
    pub current_players: u32,
    pub max_players: u32,
    pub current_match_id: Option<MatchId>,
}

impl MatchmakingServer {
    /// A new server starts active and free.
    pub fn new(name: impl Into<String>, address: impl Into<String>, port: u16, max_players: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            address: address.into(),
            port,
            is_active: true,
            is_occupied: false,
            current_players: 0,
            max_players,
            current_match_id: None,
        }
    }

    pub fn is_available(&self) -> bool {
        self.is_active && !self.is_occupied
    }

    /// `address:port` as players type it into the console.
    pub fn connect_address(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }

    pub fn start_match(&mut self, match_id: MatchId) -> Result<()> {
        if !self.is_available() {
            return Err(MatchmakingError::ServerUnavailable);
        }
        self.is_occupied = true;
        self.current_match_id = Some(match_id);
        self.current_players = 0;
        Ok(())
    }

    pub fn end_match(&mut self) {
        self.is_occupied = false;
        self.current_match_id = None;
        self.current_players = 0;
    }

    pub fn set_player_count(&mut self, players: u32) -> Result<()> {
        if players > self.max_players {
            return Err(MatchmakingError::ServerFull {
                max_players: self.max_players,
            });
        }
        self.current_players = players;
        Ok(())
    }

    /// Activating always works; deactivating is refused while a match runs here.
    pub fn set_active(&mut self, active: bool) -> Result<()> {
        if !active && self.is_occupied {
            return Err(MatchmakingError::ServerOccupied);
        }
        self.is_active = active;
        Ok(())
    }
}
