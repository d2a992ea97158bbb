//! Integration tests for launching, finishing and cancelling matches against a fake hosting API.

mod common;

use async_trait::async_trait;
use chrono::Duration;
use common::{now, team};
use matchmaking_web::{
    accept_challenge, add_server, commit_cancel, commit_launch, create_challenge, delete_server,
    finish_match, leave_team, mark_match_completed, mark_team_ready, prepare_launch,
    running_external_id, ChallengeId, ChallengeRequest, ChallengeStatus, CreateMatchRequest,
    Lobby, MatchHostingApi, MatchId, MatchmakingError, PlayerId, TeamId, TeamStatus, ELO_STEP,
    STARTING_ELO,
};
use std::sync::Mutex;

/// Records requests and hands out sequential ids; can be told to fail.
#[derive(Default)]
struct FakeHostingApi {
    fail: bool,
    created: Mutex<Vec<CreateMatchRequest>>,
    cancelled: Mutex<Vec<String>>,
}

#[async_trait]
impl MatchHostingApi for FakeHostingApi {
    async fn create_match(&self, request: &CreateMatchRequest) -> Result<String, MatchmakingError> {
        if self.fail {
            return Err(MatchmakingError::ExternalApi("boom".into()));
        }
        let mut created = self.created.lock().unwrap();
        created.push(request.clone());
        Ok(format!("ext-{}", created.len()))
    }

    async fn cancel_match(&self, external_id: &str) -> Result<(), MatchmakingError> {
        if self.fail {
            return Err(MatchmakingError::ExternalApi("boom".into()));
        }
        self.cancelled.lock().unwrap().push(external_id.to_string());
        Ok(())
    }

    async fn send_rcon(&self, _external_id: &str, command: &str) -> Result<String, MatchmakingError> {
        Ok(format!("ran {command}"))
    }
}

struct Fixture {
    lobby: Lobby,
    challenge: ChallengeId,
    team_1: (TeamId, Vec<PlayerId>),
    team_2: (TeamId, Vec<PlayerId>),
}

/// Two 2-player teams with an accepted, fully ready challenge and one server.
fn ready_fixture() -> Fixture {
    let mut lobby = Lobby::default();
    let team_1 = team(&mut lobby, "red", 2, 5);
    let team_2 = team(&mut lobby, "blue", 2, 5);
    add_server(&mut lobby, "eu-1", "10.0.0.1", 27015, 10);
    let challenge = create_challenge(&mut lobby, team_1.0, team_2.0, None, now()).unwrap();
    accept_challenge(&mut lobby, challenge, now()).unwrap();
    mark_team_ready(&mut lobby, challenge, team_1.0).unwrap();
    mark_team_ready(&mut lobby, challenge, team_2.0).unwrap();
    Fixture {
        lobby,
        challenge,
        team_1,
        team_2,
    }
}

async fn launch(f: &mut Fixture, api: &FakeHostingApi) -> Result<MatchId, MatchmakingError> {
    let plan = prepare_launch(&f.lobby, f.challenge, now())?;
    let external_id = api.create_match(&plan.request).await?;
    commit_launch(&mut f.lobby, &plan, &external_id, now())
}

#[tokio::test]
async fn launch_occupies_server_and_starts_challenge() {
    let mut f = ready_fixture();
    let api = FakeHostingApi::default();
    let match_id = launch(&mut f, &api).await.unwrap();

    let request = api.created.lock().unwrap()[0].clone();
    assert_eq!(request.server_address, "10.0.0.1");
    assert_eq!(request.team_1.name, "red");
    assert_eq!(request.team_2.players.len(), 2);
    assert_eq!(request.connect_password.len(), 12);

    let game = f.lobby.game_match(match_id).unwrap();
    assert_eq!(game.external_id, "ext-1");
    assert!(game.is_running());

    let server = f.lobby.server(game.server_id).unwrap();
    assert!(server.is_occupied);
    assert_eq!(server.current_match_id, Some(match_id));

    let c = f.lobby.challenge(f.challenge).unwrap();
    assert_eq!(c.status, ChallengeStatus::Started);
    assert_eq!(c.match_id, Some(match_id));
    for team in [f.team_1.0, f.team_2.0] {
        assert_eq!(f.lobby.team(team).unwrap().status, TeamStatus::InMatch);
    }
}

#[tokio::test]
async fn finishing_applies_elo_and_completes_challenge() {
    let mut f = ready_fixture();
    let api = FakeHostingApi::default();
    let match_id = launch(&mut f, &api).await.unwrap();

    let winner = finish_match(&mut f.lobby, match_id, 16, 10, now()).unwrap();
    assert_eq!(winner, Some(f.team_1.0));

    for p in &f.team_1.1 {
        assert_eq!(f.lobby.player(*p).unwrap().elo, STARTING_ELO + ELO_STEP);
    }
    for p in &f.team_2.1 {
        assert_eq!(f.lobby.player(*p).unwrap().elo, STARTING_ELO - ELO_STEP);
    }
    assert_eq!(
        f.lobby.challenge(f.challenge).unwrap().status,
        ChallengeStatus::Completed
    );
    assert!(f.lobby.servers[0].is_available());
    assert_eq!(f.lobby.team(f.team_2.0).unwrap().status, TeamStatus::Completed);

    assert!(matches!(
        finish_match(&mut f.lobby, match_id, 1, 0, now()),
        Err(MatchmakingError::MatchFinished)
    ));
}

#[tokio::test]
async fn draw_leaves_elo_untouched() {
    let mut f = ready_fixture();
    let api = FakeHostingApi::default();
    let match_id = launch(&mut f, &api).await.unwrap();

    assert_eq!(finish_match(&mut f.lobby, match_id, 15, 15, now()).unwrap(), None);
    assert!(f.lobby.players.iter().all(|p| p.elo == STARTING_ELO));
    assert_eq!(
        f.lobby.challenge(f.challenge).unwrap().status,
        ChallengeStatus::Completed
    );
}

#[tokio::test]
async fn cancelling_expires_challenge_without_elo() {
    let mut f = ready_fixture();
    let api = FakeHostingApi::default();
    let match_id = launch(&mut f, &api).await.unwrap();

    let external_id = running_external_id(&f.lobby, match_id).unwrap();
    api.cancel_match(&external_id).await.unwrap();
    commit_cancel(&mut f.lobby, match_id, now()).unwrap();

    let game = f.lobby.game_match(match_id).unwrap();
    assert!(game.is_cancelled && game.is_finished);
    assert_eq!(game.winner(), None);
    assert_eq!(
        f.lobby.challenge(f.challenge).unwrap().status,
        ChallengeStatus::Expired
    );
    assert!(f.lobby.servers[0].is_available());
    assert_eq!(f.lobby.team(f.team_1.0).unwrap().status, TeamStatus::Waiting);
    assert!(f.lobby.players.iter().all(|p| p.elo == STARTING_ELO));
    assert_eq!(api.cancelled.lock().unwrap().as_slice(), ["ext-1"]);

    assert!(matches!(
        running_external_id(&f.lobby, match_id),
        Err(MatchmakingError::MatchFinished)
    ));
}

#[tokio::test]
async fn completion_waits_for_the_match_to_end() {
    let mut f = ready_fixture();
    let api = FakeHostingApi::default();
    launch(&mut f, &api).await.unwrap();
    assert!(matches!(
        mark_match_completed(&mut f.lobby, f.challenge),
        Err(MatchmakingError::MatchInProgress)
    ));
}

#[tokio::test]
async fn api_failure_commits_nothing() {
    let mut f = ready_fixture();
    let api = FakeHostingApi {
        fail: true,
        ..Default::default()
    };
    let err = launch(&mut f, &api).await.unwrap_err();
    assert!(err.is_external());
    assert!(f.lobby.matches.is_empty());
    assert!(f.lobby.servers[0].is_available());
    assert_eq!(
        f.lobby.challenge(f.challenge).unwrap().status,
        ChallengeStatus::Accepted
    );
}

#[tokio::test]
async fn launch_needs_a_free_server() {
    let mut f = ready_fixture();
    f.lobby.servers[0].is_active = false;
    let api = FakeHostingApi::default();
    assert!(matches!(
        launch(&mut f, &api).await,
        Err(MatchmakingError::NoServerAvailable)
    ));
    assert!(api.created.lock().unwrap().is_empty());
}

#[tokio::test]
async fn launch_needs_both_teams_ready() {
    let mut f = ready_fixture();
    f.lobby.challenge_mut(f.challenge).unwrap().challenged_ready = false;
    let api = FakeHostingApi::default();
    assert!(matches!(launch(&mut f, &api).await, Err(MatchmakingError::NotReady)));
}

#[tokio::test]
async fn commit_rechecks_server_taken_during_the_call() {
    let mut f = ready_fixture();
    let api = FakeHostingApi::default();
    let plan = prepare_launch(&f.lobby, f.challenge, now()).unwrap();
    let external_id = api.create_match(&plan.request).await.unwrap();

    f.lobby.servers[0].is_occupied = true;
    assert!(matches!(
        commit_launch(&mut f.lobby, &plan, &external_id, now()),
        Err(MatchmakingError::ServerUnavailable)
    ));
    assert!(f.lobby.matches.is_empty());
}

#[tokio::test]
async fn expired_accepted_challenge_cannot_launch() {
    let mut f = ready_fixture();
    let later = now() + Duration::hours(25);
    assert!(matches!(
        prepare_launch(&f.lobby, f.challenge, later),
        Err(MatchmakingError::ChallengeExpired)
    ));

    // Expiry passing while the hosting call is in flight.
    let api = FakeHostingApi::default();
    let plan = prepare_launch(&f.lobby, f.challenge, now()).unwrap();
    let external_id = api.create_match(&plan.request).await.unwrap();
    assert!(matches!(
        commit_launch(&mut f.lobby, &plan, &external_id, later),
        Err(MatchmakingError::ChallengeExpired)
    ));
    assert_eq!(
        f.lobby.challenge(f.challenge).unwrap().status,
        ChallengeStatus::Expired
    );
    assert!(f.lobby.matches.is_empty());
    assert!(f.lobby.servers[0].is_available());
}

#[tokio::test]
async fn team_cannot_play_two_matches_at_once() {
    let mut f = ready_fixture();
    add_server(&mut f.lobby, "eu-2", "10.0.0.2", 27015, 10);
    let (green, _) = team(&mut f.lobby, "green", 1, 5);

    // A second ready challenge for red that slipped past the create-time guard.
    let mut other = ChallengeRequest::new(f.team_1.0, green, None, now(), Duration::hours(24));
    other.status = ChallengeStatus::Accepted;
    other.challenger_ready = true;
    other.challenged_ready = true;
    let other_id = other.id;
    f.lobby.challenges.push(other);

    let api = FakeHostingApi::default();
    launch(&mut f, &api).await.unwrap();
    assert!(matches!(
        prepare_launch(&f.lobby, other_id, now()),
        Err(MatchmakingError::TeamInMatch)
    ));
    assert_eq!(f.lobby.matches.len(), 1);
}

#[tokio::test]
async fn accept_refuses_when_a_team_is_playing() {
    let mut f = ready_fixture();
    let (green, _) = team(&mut f.lobby, "green", 1, 5);
    let pending = ChallengeRequest::new(green, f.team_2.0, None, now(), Duration::hours(24));
    let pending_id = pending.id;
    f.lobby.challenges.push(pending);

    let api = FakeHostingApi::default();
    launch(&mut f, &api).await.unwrap();
    assert!(matches!(
        accept_challenge(&mut f.lobby, pending_id, now()),
        Err(MatchmakingError::TeamInMatch)
    ));
    assert_eq!(
        f.lobby.challenge(pending_id).unwrap().status,
        ChallengeStatus::Pending
    );
}

#[tokio::test]
async fn team_disbanded_during_launch_leaves_server_free() {
    let mut f = ready_fixture();
    let api = FakeHostingApi::default();
    let plan = prepare_launch(&f.lobby, f.challenge, now()).unwrap();
    let external_id = api.create_match(&plan.request).await.unwrap();

    for p in f.team_2.1.clone() {
        leave_team(&mut f.lobby, f.team_2.0, p).unwrap();
    }
    assert!(commit_launch(&mut f.lobby, &plan, &external_id, now()).is_err());

    let server = f.lobby.servers[0].clone();
    assert!(!server.is_occupied);
    assert_eq!(server.current_match_id, None);
    assert!(f.lobby.matches.is_empty());
    assert_eq!(f.lobby.team(f.team_1.0).unwrap().status, TeamStatus::Waiting);
    delete_server(&mut f.lobby, server.id).unwrap();
}

#[tokio::test]
async fn missing_team_is_caught_before_anything_is_written() {
    let mut f = ready_fixture();
    let api = FakeHostingApi::default();
    let plan = prepare_launch(&f.lobby, f.challenge, now()).unwrap();
    let external_id = api.create_match(&plan.request).await.unwrap();

    f.lobby.teams.retain(|t| t.id != f.team_2.0);
    assert!(matches!(
        commit_launch(&mut f.lobby, &plan, &external_id, now()),
        Err(MatchmakingError::TeamNotFound(_))
    ));
    assert!(f.lobby.servers[0].is_available());
    assert_eq!(
        f.lobby.challenge(f.challenge).unwrap().status,
        ChallengeStatus::Accepted
    );
    assert_eq!(f.lobby.team(f.team_1.0).unwrap().status, TeamStatus::Waiting);
}

#[tokio::test]
async fn teams_in_a_match_cannot_take_new_challenges() {
    let mut f = ready_fixture();
    let api = FakeHostingApi::default();
    launch(&mut f, &api).await.unwrap();
    let (other, _) = team(&mut f.lobby, "green", 1, 5);
    assert!(matches!(
        create_challenge(&mut f.lobby, other, f.team_1.0, None, now()),
        Err(MatchmakingError::TeamInMatch)
    ));
    assert_eq!(api.send_rcon("ext-1", "status").await.unwrap(), "ran status");
}
