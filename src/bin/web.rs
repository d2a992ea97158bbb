//! Single binary web server exposing matchmaking as a JSON REST API.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. Configuration comes from the environment
//! (or a `.env` file): HOST, PORT, MATCH_API_URL, MATCH_API_TOKEN, STEAM_API_KEY,
//! CHALLENGE_TTL_HOURS.

use actix_web::{
    delete, get, post, put,
    web::{Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use chrono::{Duration, Utc};
use matchmaking_web::{
    accept_challenge, add_member, add_server, commit_cancel, commit_launch, create_challenge,
    create_team, decline_challenge, delete_server, ensure_leader, expire_stale_challenges,
    finish_match, join_team, kick_member, leave_team, mark_team_ready, prepare_launch,
    public_teams, register_player, running_external_id, set_privacy, set_server_active,
    transfer_leadership, update_player_count, ChallengeId, ChallengeStatus, Config,
    HostedMatchApi, LeaveOutcome, Lobby, MatchHostingApi, MatchId, MatchmakingError, PlayerId,
    ServerId, SteamApi, Team, TeamId,
};
use serde::{Deserialize, Serialize};
use std::sync::RwLock;

type AppState = Data<RwLock<Lobby>>;
type MatchApi = Data<HostedMatchApi>;
type Steam = Data<Option<SteamApi>>;

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct RegisterPlayerBody {
    steam_id: String,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Deserialize)]
struct CreateTeamBody {
    leader_id: PlayerId,
    name: String,
    #[serde(default = "default_max_players")]
    max_players: usize,
    #[serde(default)]
    is_private: bool,
}

fn default_max_players() -> usize {
    5
}

#[derive(Deserialize)]
struct PlayerBody {
    player_id: PlayerId,
}

#[derive(Deserialize)]
struct LeaderActionBody {
    leader_id: PlayerId,
    player_id: PlayerId,
}

#[derive(Deserialize)]
struct LeaderBody {
    leader_id: PlayerId,
}

#[derive(Deserialize)]
struct PrivacyBody {
    leader_id: PlayerId,
    is_private: bool,
}

#[derive(Deserialize)]
struct CreateChallengeBody {
    leader_id: PlayerId,
    challenged_team_id: TeamId,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Deserialize)]
struct FinishMatchBody {
    team_1_score: u32,
    team_2_score: u32,
}

#[derive(Deserialize)]
struct RconBody {
    command: String,
}

#[derive(Serialize)]
struct RconResponse {
    output: String,
}

#[derive(Serialize)]
struct LeaveResponse {
    disbanded: bool,
    new_leader: Option<PlayerId>,
}

#[derive(Deserialize)]
struct AddServerBody {
    name: String,
    address: String,
    port: u16,
    #[serde(default = "default_server_slots")]
    max_players: u32,
}

fn default_server_slots() -> u32 {
    10
}

#[derive(Deserialize)]
struct ServerActiveBody {
    active: bool,
}

#[derive(Deserialize)]
struct PlayerCountBody {
    players: u32,
}

#[derive(Deserialize)]
struct IdPath {
    id: uuid::Uuid,
}

fn error_response(e: &MatchmakingError) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string() });
    if e.is_not_found() {
        HttpResponse::NotFound().json(body)
    } else if e.is_external() {
        HttpResponse::BadGateway().json(body)
    } else {
        HttpResponse::BadRequest().json(body)
    }
}

fn lock_error() -> HttpResponse {
    HttpResponse::InternalServerError().body("lock error")
}

fn respond<T: Serialize>(result: Result<T, MatchmakingError>) -> HttpResponse {
    match result {
        Ok(value) => HttpResponse::Ok().json(value),
        Err(e) => {
            log::debug!("Request rejected: {}", e);
            error_response(&e)
        }
    }
}

/// Run `f` against the lobby under the write lock and serialize its result.
fn with_lobby<T, F>(state: &AppState, f: F) -> HttpResponse
where
    T: Serialize,
    F: FnOnce(&mut Lobby) -> Result<T, MatchmakingError>,
{
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    respond(f(&mut g))
}

/// The team `leader_id` leads, or NotLeader.
fn led_team(lobby: &Lobby, leader_id: PlayerId) -> Result<TeamId, MatchmakingError> {
    lobby.player(leader_id)?;
    match lobby.team_of(leader_id) {
        Some(team) if team.is_leader(leader_id) => Ok(team.id),
        Some(_) => Err(MatchmakingError::NotLeader),
        None => Err(MatchmakingError::NotAMember),
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "matchmaking-web",
    })
}

/// Register a player. Without a name the Steam persona name is used when a key is configured.
#[post("/api/players")]
async fn api_register_player(state: AppState, steam: Steam, body: Json<RegisterPlayerBody>) -> HttpResponse {
    let mut name = body.name.clone().unwrap_or_default();
    if name.trim().is_empty() {
        if let Some(api) = steam.get_ref() {
            match api.player_summary(body.steam_id.trim()).await {
                Ok(Some(summary)) => name = summary.personaname,
                Ok(None) => log::warn!("Steam has no profile for {}", body.steam_id),
                Err(e) => log::error!("Steam lookup for {} failed: {}", body.steam_id, e),
            }
        }
    }
    with_lobby(&state, |lobby| {
        let id = register_player(lobby, &body.steam_id, &name, Utc::now())?;
        lobby.player(id).cloned()
    })
}

#[get("/api/players/{id}")]
async fn api_get_player(state: AppState, path: Path<IdPath>) -> HttpResponse {
    with_lobby(&state, |lobby| lobby.player(path.id).cloned())
}

#[post("/api/teams")]
async fn api_create_team(state: AppState, body: Json<CreateTeamBody>) -> HttpResponse {
    with_lobby(&state, |lobby| {
        let id = create_team(
            lobby,
            body.leader_id,
            &body.name,
            body.max_players,
            body.is_private,
            Utc::now(),
        )?;
        lobby.team(id).cloned()
    })
}

/// Public teams only.
#[get("/api/teams")]
async fn api_list_teams(state: AppState) -> HttpResponse {
    with_lobby(&state, |lobby| {
        Ok(public_teams(lobby).into_iter().cloned().collect::<Vec<Team>>())
    })
}

#[get("/api/teams/{id}")]
async fn api_get_team(state: AppState, path: Path<IdPath>) -> HttpResponse {
    with_lobby(&state, |lobby| lobby.team(path.id).cloned())
}

#[post("/api/teams/{id}/join")]
async fn api_join_team(state: AppState, path: Path<IdPath>, body: Json<PlayerBody>) -> HttpResponse {
    with_lobby(&state, |lobby| {
        join_team(lobby, path.id, body.player_id)?;
        lobby.team(path.id).cloned()
    })
}

#[post("/api/teams/{id}/members")]
async fn api_add_member(state: AppState, path: Path<IdPath>, body: Json<LeaderActionBody>) -> HttpResponse {
    with_lobby(&state, |lobby| {
        add_member(lobby, path.id, body.leader_id, body.player_id)?;
        lobby.team(path.id).cloned()
    })
}

#[post("/api/teams/{id}/leave")]
async fn api_leave_team(state: AppState, path: Path<IdPath>, body: Json<PlayerBody>) -> HttpResponse {
    with_lobby(&state, |lobby| {
        let outcome = leave_team(lobby, path.id, body.player_id)?;
        Ok(LeaveResponse {
            disbanded: outcome == LeaveOutcome::Disbanded,
            new_leader: match outcome {
                LeaveOutcome::LeadershipTransferred(id) => Some(id),
                _ => None,
            },
        })
    })
}

#[post("/api/teams/{id}/kick")]
async fn api_kick_member(state: AppState, path: Path<IdPath>, body: Json<LeaderActionBody>) -> HttpResponse {
    with_lobby(&state, |lobby| {
        kick_member(lobby, path.id, body.leader_id, body.player_id)?;
        lobby.team(path.id).cloned()
    })
}

#[put("/api/teams/{id}/leader")]
async fn api_transfer_leadership(
    state: AppState,
    path: Path<IdPath>,
    body: Json<LeaderActionBody>,
) -> HttpResponse {
    with_lobby(&state, |lobby| {
        transfer_leadership(lobby, path.id, body.leader_id, body.player_id)?;
        lobby.team(path.id).cloned()
    })
}

#[put("/api/teams/{id}/privacy")]
async fn api_set_privacy(state: AppState, path: Path<IdPath>, body: Json<PrivacyBody>) -> HttpResponse {
    with_lobby(&state, |lobby| {
        set_privacy(lobby, path.id, body.leader_id, body.is_private)?;
        lobby.team(path.id).cloned()
    })
}

/// Challenge another team on behalf of the team `leader_id` leads.
#[post("/api/challenges")]
async fn api_create_challenge(state: AppState, body: Json<CreateChallengeBody>) -> HttpResponse {
    with_lobby(&state, |lobby| {
        let now = Utc::now();
        expire_stale_challenges(lobby, now);
        let challenger = led_team(lobby, body.leader_id)?;
        let id = create_challenge(
            lobby,
            challenger,
            body.challenged_team_id,
            body.message.clone(),
            now,
        )?;
        lobby.challenge(id).cloned()
    })
}

#[get("/api/challenges/{id}")]
async fn api_get_challenge(state: AppState, path: Path<IdPath>) -> HttpResponse {
    with_lobby(&state, |lobby| {
        expire_stale_challenges(lobby, Utc::now());
        lobby.challenge(path.id).cloned()
    })
}

#[post("/api/challenges/{id}/accept")]
async fn api_accept_challenge(state: AppState, path: Path<IdPath>, body: Json<LeaderBody>) -> HttpResponse {
    with_lobby(&state, |lobby| {
        let challenged = lobby.challenge(path.id)?.challenged_team_id;
        ensure_leader(lobby, challenged, body.leader_id)?;
        accept_challenge(lobby, path.id, Utc::now())?;
        lobby.challenge(path.id).cloned()
    })
}

#[post("/api/challenges/{id}/decline")]
async fn api_decline_challenge(state: AppState, path: Path<IdPath>, body: Json<LeaderBody>) -> HttpResponse {
    with_lobby(&state, |lobby| {
        let challenged = lobby.challenge(path.id)?.challenged_team_id;
        ensure_leader(lobby, challenged, body.leader_id)?;
        decline_challenge(lobby, path.id, Utc::now())?;
        lobby.challenge(path.id).cloned()
    })
}

#[post("/api/challenges/{id}/ready")]
async fn api_mark_ready(state: AppState, path: Path<IdPath>, body: Json<LeaderBody>) -> HttpResponse {
    with_lobby(&state, |lobby| {
        expire_stale_challenges(lobby, Utc::now());
        if lobby.challenge(path.id)?.status == ChallengeStatus::Expired {
            return Err(MatchmakingError::ChallengeExpired);
        }
        let team_id = led_team(lobby, body.leader_id)?;
        if !mark_team_ready(lobby, path.id, team_id)? {
            return Err(MatchmakingError::NotInChallenge);
        }
        lobby.challenge(path.id).cloned()
    })
}

/// Ask the hosting API for a match once both teams are ready.
#[post("/api/challenges/{id}/launch")]
async fn api_launch_match(
    state: AppState,
    api: MatchApi,
    path: Path<IdPath>,
    body: Json<LeaderBody>,
) -> HttpResponse {
    let challenge_id: ChallengeId = path.id;
    let plan = {
        let mut g = match state.write() {
            Ok(guard) => guard,
            Err(_) => return lock_error(),
        };
        let now = Utc::now();
        expire_stale_challenges(&mut g, now);
        let authorized = g
            .challenge(challenge_id)
            .and_then(|c| match led_team(&g, body.leader_id) {
                Ok(team) if c.involves(team) => Ok(()),
                Ok(_) => Err(MatchmakingError::NotInChallenge),
                Err(e) => Err(e),
            });
        match authorized.and_then(|_| prepare_launch(&g, challenge_id, now)) {
            Ok(plan) => plan,
            Err(e) => return error_response(&e),
        }
    };

    let external_id = match api.create_match(&plan.request).await {
        Ok(id) => id,
        Err(e) => {
            log::error!("Could not launch match for challenge {}: {}", challenge_id, e);
            return error_response(&e);
        }
    };

    with_lobby(&state, |lobby| {
        let match_id = commit_launch(lobby, &plan, &external_id, Utc::now())?;
        lobby.game_match(match_id).cloned()
    })
}

#[get("/api/matches/{id}")]
async fn api_get_match(state: AppState, path: Path<IdPath>) -> HttpResponse {
    with_lobby(&state, |lobby| lobby.game_match(path.id).cloned())
}

#[post("/api/matches/{id}/cancel")]
async fn api_cancel_match(state: AppState, api: MatchApi, path: Path<IdPath>) -> HttpResponse {
    let match_id: MatchId = path.id;
    let external_id = {
        let g = match state.read() {
            Ok(guard) => guard,
            Err(_) => return lock_error(),
        };
        match running_external_id(&g, match_id) {
            Ok(id) => id,
            Err(e) => return error_response(&e),
        }
    };
    if let Err(e) = api.cancel_match(&external_id).await {
        log::error!("Could not cancel match {}: {}", match_id, e);
        return error_response(&e);
    }
    with_lobby(&state, |lobby| {
        commit_cancel(lobby, match_id, Utc::now())?;
        lobby.game_match(match_id).cloned()
    })
}

/// Final score report (admin or hosting webhook).
#[post("/api/matches/{id}/finish")]
async fn api_finish_match(state: AppState, path: Path<IdPath>, body: Json<FinishMatchBody>) -> HttpResponse {
    with_lobby(&state, |lobby| {
        finish_match(lobby, path.id, body.team_1_score, body.team_2_score, Utc::now())?;
        lobby.game_match(path.id).cloned()
    })
}

#[post("/api/matches/{id}/rcon")]
async fn api_send_rcon(
    state: AppState,
    api: MatchApi,
    path: Path<IdPath>,
    body: Json<RconBody>,
) -> HttpResponse {
    let external_id = {
        let g = match state.read() {
            Ok(guard) => guard,
            Err(_) => return lock_error(),
        };
        match running_external_id(&g, path.id) {
            Ok(id) => id,
            Err(e) => return error_response(&e),
        }
    };
    respond(
        api.send_rcon(&external_id, &body.command)
            .await
            .map(|output| RconResponse { output }),
    )
}

#[post("/api/servers")]
async fn api_add_server(state: AppState, body: Json<AddServerBody>) -> HttpResponse {
    with_lobby(&state, |lobby| {
        let id = add_server(lobby, &body.name, &body.address, body.port, body.max_players);
        lobby.server(id).cloned()
    })
}

#[get("/api/servers")]
async fn api_list_servers(state: AppState) -> HttpResponse {
    with_lobby(&state, |lobby| Ok(lobby.servers.clone()))
}

#[delete("/api/servers/{id}")]
async fn api_delete_server(state: AppState, path: Path<IdPath>) -> HttpResponse {
    let server_id: ServerId = path.id;
    with_lobby(&state, |lobby| {
        delete_server(lobby, server_id)?;
        Ok(serde_json::json!({ "deleted": server_id }))
    })
}

#[put("/api/servers/{id}/active")]
async fn api_set_server_active(
    state: AppState,
    path: Path<IdPath>,
    body: Json<ServerActiveBody>,
) -> HttpResponse {
    with_lobby(&state, |lobby| {
        set_server_active(lobby, path.id, body.active)?;
        lobby.server(path.id).cloned()
    })
}

#[put("/api/servers/{id}/players")]
async fn api_update_player_count(
    state: AppState,
    path: Path<IdPath>,
    body: Json<PlayerCountBody>,
) -> HttpResponse {
    with_lobby(&state, |lobby| {
        update_player_count(lobby, path.id, body.players)?;
        lobby.server(path.id).cloned()
    })
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    if config.match_api_token.is_empty() {
        log::warn!("MATCH_API_TOKEN is not set; match hosting calls will be rejected");
    }
    if config.steam_api_key.is_none() {
        log::info!("STEAM_API_KEY is not set; player names will not be looked up");
    }

    let state = Data::new(RwLock::new(Lobby::new(Duration::hours(config.challenge_ttl_hours))));
    let match_api = Data::new(HostedMatchApi::new(&config.match_api_url, &config.match_api_token));
    let steam = Data::new(config.steam_api_key.as_deref().map(SteamApi::new));

    let bind = (config.host.clone(), config.port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(match_api.clone())
            .app_data(steam.clone())
            .service(api_health)
            .service(api_register_player)
            .service(api_get_player)
            .service(api_create_team)
            .service(api_list_teams)
            .service(api_get_team)
            .service(api_join_team)
            .service(api_add_member)
            .service(api_leave_team)
            .service(api_kick_member)
            .service(api_transfer_leadership)
            .service(api_set_privacy)
            .service(api_create_challenge)
            .service(api_get_challenge)
            .service(api_accept_challenge)
            .service(api_decline_challenge)
            .service(api_mark_ready)
            .service(api_launch_match)
            .service(api_get_match)
            .service(api_cancel_match)
            .service(api_finish_match)
            .service(api_send_rcon)
            .service(api_add_server)
            .service(api_list_servers)
            .service(api_delete_server)
            .service(api_set_server_active)
            .service(api_update_player_count)
    })
    .bind(bind)?
    .run()
    .await
}
