//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use chrono::{DateTime, Utc};
use matchmaking_web::{create_team, register_player, Lobby, PlayerId, TeamId};

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Register `n` players with steam ids prefixed by `tag`.
pub fn players(lobby: &mut Lobby, tag: &str, n: usize) -> Vec<PlayerId> {
    (0..n)
        .map(|i| {
            register_player(lobby, &format!("7656{tag}{i}"), &format!("{tag}{i}"), now()).unwrap()
        })
        .collect()
}

/// A public team of `size` players (first one leads) with room for `max_players`.
pub fn team(lobby: &mut Lobby, name: &str, size: usize, max_players: usize) -> (TeamId, Vec<PlayerId>) {
    let members = players(lobby, name, size);
    let id = create_team(lobby, members[0], name, max_players, false, now()).unwrap();
    for &p in &members[1..] {
        matchmaking_web::join_team(lobby, id, p).unwrap();
    }
    (id, members)
}
