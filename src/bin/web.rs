//! Single binary web server: REST API over the tournament store.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default.
//! Override with env: HOST, PORT, INVITE_TTL_HOURS, INVITE_SWEEP_SECS.

use actix_web::{
    delete, get, post, put,
    web::{Data, Json, Path, Query},
    App, HttpResponse, HttpServer, Responder,
};
use bracket_tournament_web::{
    accept_invite, add_member, cancel_tournament, champion, complete_tournament, deny_invite,
    disqualify_team, import_teams_csv, list_matches, lock_and_seed, open_registration,
    promote_from_waitlist, register_team, remove_member, rename_team, schedule_match,
    send_invite, set_manual_seed, set_seeding_method, start_match, start_tournament,
    submit_result, withdraw_team, ErrorKind, InviteId, MatchKey, MatchStatus, Outcome,
    SeedingMethod, TeamId, TournamentError, TournamentId, TournamentOptions, TournamentStore,
    UserId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::RwLock;
use std::time::Duration;

/// In-memory state: every write goes through the one lock, so each operation
/// (a result and its advancement, a status change and its counters) lands whole.
type AppState = Data<RwLock<TournamentStore>>;

/// Runtime settings read from the environment.
#[derive(Clone, Debug)]
struct Config {
    host: String,
    port: u16,
    /// How long a team invite stays open.
    invite_ttl: chrono::Duration,
    /// How often lapsed invites are expired.
    invite_sweep: Duration,
}

impl Config {
    fn from_env() -> Self {
        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env_or("PORT", 8080),
            invite_ttl: chrono::Duration::hours(env_or("INVITE_TTL_HOURS", 24)),
            invite_sweep: Duration::from_secs(env_or("INVITE_SWEEP_SECS", 300)),
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct SeedingMethodBody {
    seeding_method: SeedingMethod,
}

#[derive(Deserialize)]
struct RegisterTeamBody {
    team_name: String,
    owner_id: UserId,
    member_ids: Vec<UserId>,
}

#[derive(Deserialize)]
struct TeamNameBody {
    team_name: String,
}

#[derive(Deserialize)]
struct UserBody {
    user_id: UserId,
}

#[derive(Deserialize)]
struct DisqualifyBody {
    #[serde(default)]
    reason: Option<String>,
}

#[derive(Deserialize)]
struct SeedBody {
    seed: u32,
}

#[derive(Deserialize)]
struct InviteBody {
    inviter_id: UserId,
    invitee_id: UserId,
}

#[derive(Deserialize)]
struct ScheduleBody {
    scheduled_at: DateTime<Utc>,
}

#[derive(Deserialize)]
struct ResultBody {
    outcome: Outcome,
    #[serde(default)]
    score: Option<String>,
    #[serde(default)]
    dq_reason: Option<String>,
}

#[derive(Deserialize)]
struct MatchFilter {
    round: Option<u32>,
    status: Option<MatchStatus>,
    team_id: Option<TeamId>,
}

#[derive(Serialize)]
struct ChampionResponse {
    team_id: Option<TeamId>,
}

/// Path segment: tournament id (e.g. /api/tournaments/{id})
#[derive(Deserialize)]
struct TournamentPath {
    id: TournamentId,
}

#[derive(Deserialize)]
struct TeamPath {
    team_id: TeamId,
}

#[derive(Deserialize)]
struct TeamMemberPath {
    team_id: TeamId,
    user_id: UserId,
}

#[derive(Deserialize)]
struct InvitePath {
    invite_id: InviteId,
}

/// Path segments: tournament id, round and match number.
#[derive(Deserialize)]
struct MatchPath {
    id: TournamentId,
    round: u32,
    match_number: u32,
}

impl MatchPath {
    fn key(&self) -> MatchKey {
        MatchKey::new(self.round, self.match_number)
    }
}

fn error_response(e: &TournamentError) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string(), "kind": e.kind() });
    match e.kind() {
        ErrorKind::NotFound => HttpResponse::NotFound().json(body),
        ErrorKind::CapacityExceeded | ErrorKind::DuplicateMember | ErrorKind::DuplicateName => {
            HttpResponse::Conflict().json(body)
        }
        ErrorKind::InvalidState | ErrorKind::InvalidMemberCount => {
            HttpResponse::BadRequest().json(body)
        }
    }
}

/// Run one operation under the write lock and render its result.
fn write_op<T, F>(state: &AppState, op: F) -> HttpResponse
where
    T: Serialize,
    F: FnOnce(&mut TournamentStore) -> Result<T, TournamentError>,
{
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match op(&mut g) {
        Ok(value) => HttpResponse::Ok().json(value),
        Err(e) => error_response(&e),
    }
}

fn read_op<T, F>(state: &AppState, op: F) -> HttpResponse
where
    T: Serialize,
    F: FnOnce(&TournamentStore) -> Result<T, TournamentError>,
{
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match op(&g) {
        Ok(value) => HttpResponse::Ok().json(value),
        Err(e) => error_response(&e),
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "bracket-tournament-web",
    })
}

#[get("/api/tournaments")]
async fn api_list_tournaments(state: AppState) -> HttpResponse {
    read_op(&state, |store| {
        Ok(store.list().into_iter().cloned().collect::<Vec<_>>())
    })
}

/// Create a new tournament in Draft.
#[post("/api/tournaments")]
async fn api_create_tournament(state: AppState, body: Json<TournamentOptions>) -> HttpResponse {
    write_op(&state, |store| store.create(body.into_inner()).cloned())
}

/// The tournament currently open for registration.
#[get("/api/tournaments/open")]
async fn api_open_tournament(state: AppState) -> HttpResponse {
    read_op(&state, |store| store.open_for_registration().cloned())
}

#[get("/api/tournaments/{id}")]
async fn api_get_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    read_op(&state, |store| store.get(path.id).cloned())
}

#[delete("/api/tournaments/{id}")]
async fn api_delete_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    write_op(&state, |store| store.remove(path.id))
}

#[post("/api/tournaments/{id}/open")]
async fn api_open_registration(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    write_op(&state, |store| {
        let t = store.get_mut(path.id)?;
        open_registration(t)?;
        Ok(t.clone())
    })
}

#[put("/api/tournaments/{id}/seeding-method")]
async fn api_set_seeding_method(
    state: AppState,
    path: Path<TournamentPath>,
    body: Json<SeedingMethodBody>,
) -> HttpResponse {
    write_op(&state, |store| {
        let t = store.get_mut(path.id)?;
        set_seeding_method(t, body.seeding_method)?;
        Ok(t.clone())
    })
}

/// Close registration and assign seeds (RegOpen -> Locked).
#[post("/api/tournaments/{id}/lock")]
async fn api_lock_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    write_op(&state, |store| {
        let t = store.get_mut(path.id)?;
        lock_and_seed(t)?;
        Ok(t.clone())
    })
}

/// Build the bracket and start (Locked -> InProgress).
#[post("/api/tournaments/{id}/start")]
async fn api_start_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    write_op(&state, |store| {
        let t = store.get_mut(path.id)?;
        start_tournament(t)?;
        Ok(t.clone())
    })
}

#[post("/api/tournaments/{id}/complete")]
async fn api_complete_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    write_op(&state, |store| {
        let t = store.get_mut(path.id)?;
        complete_tournament(t)?;
        Ok(t.clone())
    })
}

#[post("/api/tournaments/{id}/cancel")]
async fn api_cancel_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    write_op(&state, |store| {
        let t = store.get_mut(path.id)?;
        cancel_tournament(t)?;
        Ok(t.clone())
    })
}

#[get("/api/tournaments/{id}/champion")]
async fn api_champion(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    read_op(&state, |store| {
        let t = store.get(path.id)?;
        Ok(ChampionResponse {
            team_id: champion(t),
        })
    })
}

#[post("/api/tournaments/{id}/teams")]
async fn api_register_team(
    state: AppState,
    path: Path<TournamentPath>,
    body: Json<RegisterTeamBody>,
) -> HttpResponse {
    let body = body.into_inner();
    write_op(&state, |store| {
        let t = store.get_mut(path.id)?;
        register_team(t, body.member_ids, &body.team_name, &body.owner_id)
    })
}

/// Register teams from a CSV body (`team_name,owner_id,member_1,member_2`).
#[post("/api/tournaments/{id}/teams/import")]
async fn api_import_teams(state: AppState, path: Path<TournamentPath>, body: String) -> HttpResponse {
    write_op(&state, |store| {
        let t = store.get_mut(path.id)?;
        import_teams_csv(t, body.as_bytes())
    })
}

#[put("/api/teams/{team_id}/name")]
async fn api_rename_team(
    state: AppState,
    path: Path<TeamPath>,
    body: Json<TeamNameBody>,
) -> HttpResponse {
    write_op(&state, |store| {
        let t = store.for_team_mut(path.team_id)?;
        rename_team(t, path.team_id, &body.team_name)
    })
}

#[post("/api/teams/{team_id}/members")]
async fn api_add_member(
    state: AppState,
    path: Path<TeamPath>,
    body: Json<UserBody>,
) -> HttpResponse {
    write_op(&state, |store| {
        let t = store.for_team_mut(path.team_id)?;
        add_member(t, path.team_id, &body.user_id)
    })
}

#[delete("/api/teams/{team_id}/members/{user_id}")]
async fn api_remove_member(state: AppState, path: Path<TeamMemberPath>) -> HttpResponse {
    write_op(&state, |store| {
        let t = store.for_team_mut(path.team_id)?;
        remove_member(t, path.team_id, &path.user_id)
    })
}

#[post("/api/teams/{team_id}/promote")]
async fn api_promote_team(state: AppState, path: Path<TeamPath>) -> HttpResponse {
    write_op(&state, |store| {
        let t = store.for_team_mut(path.team_id)?;
        promote_from_waitlist(t, path.team_id)
    })
}

#[post("/api/teams/{team_id}/disqualify")]
async fn api_disqualify_team(
    state: AppState,
    path: Path<TeamPath>,
    body: Option<Json<DisqualifyBody>>,
) -> HttpResponse {
    let reason = body.and_then(|b| b.into_inner().reason);
    write_op(&state, |store| {
        let t = store.for_team_mut(path.team_id)?;
        disqualify_team(t, path.team_id, reason)
    })
}

#[post("/api/teams/{team_id}/withdraw")]
async fn api_withdraw_team(state: AppState, path: Path<TeamPath>) -> HttpResponse {
    write_op(&state, |store| {
        let t = store.for_team_mut(path.team_id)?;
        withdraw_team(t, path.team_id)
    })
}

/// Pin a seed before lock (MANUAL seeding).
#[put("/api/teams/{team_id}/seed")]
async fn api_set_seed(state: AppState, path: Path<TeamPath>, body: Json<SeedBody>) -> HttpResponse {
    write_op(&state, |store| {
        let t = store.for_team_mut(path.team_id)?;
        set_manual_seed(t, path.team_id, body.seed)
    })
}

#[post("/api/teams/{team_id}/invites")]
async fn api_send_invite(
    state: AppState,
    config: Data<Config>,
    path: Path<TeamPath>,
    body: Json<InviteBody>,
) -> HttpResponse {
    write_op(&state, |store| {
        let t = store.for_team_mut(path.team_id)?;
        send_invite(
            t,
            path.team_id,
            &body.inviter_id,
            &body.invitee_id,
            Some(config.invite_ttl),
        )
    })
}

#[post("/api/invites/{invite_id}/accept")]
async fn api_accept_invite(
    state: AppState,
    path: Path<InvitePath>,
    body: Json<UserBody>,
) -> HttpResponse {
    write_op(&state, |store| {
        let t = store.for_invite_mut(path.invite_id)?;
        accept_invite(t, path.invite_id, &body.user_id)
    })
}

#[post("/api/invites/{invite_id}/deny")]
async fn api_deny_invite(
    state: AppState,
    path: Path<InvitePath>,
    body: Json<UserBody>,
) -> HttpResponse {
    write_op(&state, |store| {
        let t = store.for_invite_mut(path.invite_id)?;
        deny_invite(t, path.invite_id, &body.user_id)
    })
}

/// List matches, optionally filtered by ?round=, ?status= and ?team_id=.
#[get("/api/tournaments/{id}/matches")]
async fn api_list_matches(
    state: AppState,
    path: Path<TournamentPath>,
    filter: Query<MatchFilter>,
) -> HttpResponse {
    read_op(&state, |store| {
        let t = store.get(path.id)?;
        let matches = list_matches(t, filter.round, filter.status, filter.team_id);
        Ok(matches.into_iter().cloned().collect::<Vec<_>>())
    })
}

#[put("/api/tournaments/{id}/matches/{round}/{match_number}/schedule")]
async fn api_schedule_match(
    state: AppState,
    path: Path<MatchPath>,
    body: Json<ScheduleBody>,
) -> HttpResponse {
    write_op(&state, |store| {
        let t = store.get_mut(path.id)?;
        schedule_match(t, path.key(), body.scheduled_at)
    })
}

#[post("/api/tournaments/{id}/matches/{round}/{match_number}/start")]
async fn api_start_match(state: AppState, path: Path<MatchPath>) -> HttpResponse {
    write_op(&state, |store| {
        let t = store.get_mut(path.id)?;
        start_match(t, path.key())
    })
}

/// Report a result; the winner advances to the next round.
#[post("/api/tournaments/{id}/matches/{round}/{match_number}/result")]
async fn api_submit_result(
    state: AppState,
    path: Path<MatchPath>,
    body: Json<ResultBody>,
) -> HttpResponse {
    let body = body.into_inner();
    write_op(&state, |store| {
        let t = store.get_mut(path.id)?;
        submit_result(t, path.key(), body.outcome, body.score, body.dq_reason)
    })
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env();
    let bind = (config.host.clone(), config.port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let state = Data::new(RwLock::new(TournamentStore::new()));
    let config = Data::new(config);

    // Background task: expire team invites past their deadline.
    let state_sweep = state.clone();
    let sweep_every = config.invite_sweep;
    actix_web::rt::spawn(async move {
        let mut interval = tokio::time::interval(sweep_every);
        loop {
            interval.tick().await;
            let mut g = match state_sweep.write() {
                Ok(guard) => guard,
                Err(_) => continue,
            };
            let expired = g.expire_stale_invites(Utc::now());
            if expired > 0 {
                log::info!("Expired {} stale invite(s)", expired);
            }
        }
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(config.clone())
            .service(api_health)
            .service(api_list_tournaments)
            .service(api_create_tournament)
            .service(api_open_tournament)
            .service(api_get_tournament)
            .service(api_delete_tournament)
            .service(api_open_registration)
            .service(api_set_seeding_method)
            .service(api_lock_tournament)
            .service(api_start_tournament)
            .service(api_complete_tournament)
            .service(api_cancel_tournament)
            .service(api_champion)
            .service(api_register_team)
            .service(api_import_teams)
            .service(api_rename_team)
            .service(api_add_member)
            .service(api_remove_member)
            .service(api_promote_team)
            .service(api_disqualify_team)
            .service(api_withdraw_team)
            .service(api_set_seed)
            .service(api_send_invite)
            .service(api_accept_invite)
            .service(api_deny_invite)
            .service(api_list_matches)
            .service(api_schedule_match)
            .service(api_start_match)
            .service(api_submit_result)
    })
    .bind(bind)?
    .run()
    .await
}
