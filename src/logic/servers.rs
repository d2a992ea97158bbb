//! Server pool: registration, occupancy and activation guards.

use crate::error::{MatchmakingError, Result};
use crate::models::{Lobby, MatchmakingServer, ServerId};

pub fn add_server(lobby: &mut Lobby, name: &str, address: &str, port: u16, max_players: u32) -> ServerId {
    let server = MatchmakingServer::new(name.trim(), address.trim(), port, max_players);
    let id = server.id;
    log::info!("Server {} added at {}", server.name, server.connect_address());
    lobby.servers.push(server);
    id
}

/// Remove a server from the pool. Refused while it hosts a match.
pub fn delete_server(lobby: &mut Lobby, id: ServerId) -> Result<()> {
    if lobby.server(id)?.is_occupied {
        log::warn!("Refusing to delete occupied server {}", id);
        return Err(MatchmakingError::ServerOccupied);
    }
    lobby.servers.retain(|s| s.id != id);
    Ok(())
}

pub fn set_server_active(lobby: &mut Lobby, id: ServerId, active: bool) -> Result<()> {
    lobby.server_mut(id)?.set_active(active)
}

pub fn update_player_count(lobby: &mut Lobby, id: ServerId, players: u32) -> Result<()> {
    lobby.server_mut(id)?.set_player_count(players)
}

/// First server in pool order that is active and free.
pub fn find_available_server(lobby: &Lobby) -> Option<&MatchmakingServer> {
    lobby.servers.iter().find(|s| s.is_available())
}
