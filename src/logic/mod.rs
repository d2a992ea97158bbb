//! Matchmaking business logic: teams, challenges, servers, ELO and match launching.

mod challenges;
mod elo;
mod launcher;
mod servers;
mod teams;

pub use challenges::{
    accept_challenge, active_challenge_for, create_challenge, decline_challenge,
    expire_stale_challenges, mark_match_completed, mark_team_ready, start_challenge_match,
};
pub use elo::{apply_match_elo, ELO_STEP};
pub use launcher::{
    commit_cancel, commit_launch, finish_match, prepare_launch, running_external_id, LaunchPlan,
};
pub use servers::{
    add_server, delete_server, find_available_server, set_server_active, update_player_count,
};
pub use teams::{
    add_member, create_team, ensure_leader, join_team, kick_member, leave_team, public_teams,
    register_player, set_privacy, transfer_leadership, LeaveOutcome,
};
