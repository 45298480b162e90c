//! Single binary web server: one live match per workspace, driven through a JSON REST API.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. Override with env: HOST, PORT (see `config` for match rules).

use actix_web::{
    delete, get, post, put,
    web::{Data, Json, Path, Query},
    App, HttpResponse, HttpServer, Responder,
};
use rainbow_match_web::{
    ban_operators, deal_lineup, ledger_to_csv, record_stat, reshuffle, resolve_round, set_map,
    start_side, suggest_bans, swap_operator, config::ServerConfig, Catalog, ErrorKind, MatchId,
    Player, PlayerId, PlayerStat, RegistryError, RoundOutcome, SessionRegistry, Side, StatLedger,
    WeightedRatio, MatchArchive,
};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

/// In-memory state: the session registry. The mutex serializes every mutation.
type AppState = Data<Mutex<SessionRegistry>>;

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct PlayersBody {
    players: Vec<Player>,
}

#[derive(Deserialize, Default)]
struct AnotherBody {
    #[serde(default)]
    players: Option<Vec<Player>>,
}

#[derive(Deserialize)]
struct RemovePlayersBody {
    player_ids: Vec<PlayerId>,
}

#[derive(Deserialize)]
struct MapBody {
    name: String,
}

#[derive(Deserialize)]
struct BansBody {
    operators: String,
}

#[derive(Deserialize)]
struct SideBody {
    side: Side,
}

#[derive(Deserialize)]
struct RoundBody {
    outcome: RoundOutcome,
    #[serde(default)]
    overtime_side: Option<Side>,
}

#[derive(Deserialize)]
struct SwapBody {
    player_id: PlayerId,
    operator: String,
}

#[derive(Deserialize)]
struct StatBody {
    player_id: PlayerId,
    stat: PlayerStat,
}

#[derive(Deserialize)]
struct EndQuery {
    #[serde(default)]
    delete: bool,
}

/// Path segment: workspace key (e.g. /api/workspaces/{key}/match)
#[derive(Deserialize)]
struct WorkspacePath {
    key: String,
}

#[derive(Deserialize)]
struct PlayerPath {
    player_id: PlayerId,
}

#[derive(Deserialize)]
struct HistoryPath {
    match_id: MatchId,
}

#[derive(Serialize)]
struct ResolvedToken {
    token: String,
    operator: Option<String>,
}

fn ok<T: Serialize>(data: T) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "ok": true, "data": data }))
}

fn rejected(e: RegistryError) -> HttpResponse {
    let body = serde_json::json!({
        "ok": false,
        "reason": e.reason(),
        "kind": e.kind(),
        "message": e.to_string(),
    });
    match e.kind() {
        ErrorKind::Validation => HttpResponse::BadRequest().json(body),
        ErrorKind::StateConflict => HttpResponse::Conflict().json(body),
        ErrorKind::NotFound => HttpResponse::NotFound().json(body),
        ErrorKind::Storage => HttpResponse::InternalServerError().json(body),
    }
}

fn respond<T: Serialize>(result: Result<T, RegistryError>) -> HttpResponse {
    match result {
        Ok(data) => ok(data),
        Err(e) => rejected(e),
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "rainbow-match-web",
    })
}

#[get("/api/catalog")]
async fn api_catalog() -> HttpResponse {
    ok(Catalog::builtin())
}

/// Start a match for the workspace (replaces a finished one). Returns the match and ban suggestions.
#[post("/api/workspaces/{key}/match")]
async fn api_create_match(state: AppState, path: Path<WorkspacePath>, body: Json<PlayersBody>) -> HttpResponse {
    let mut registry = state.lock().await;
    let result = registry.create(
        &path.key,
        body.into_inner().players,
        Catalog::builtin(),
        &mut rand::thread_rng(),
    );
    respond(result.map(|(game, suggestions)| {
        serde_json::json!({ "match": game, "suggestions": suggestions })
    }))
}

#[get("/api/workspaces/{key}/match")]
async fn api_get_match(state: AppState, path: Path<WorkspacePath>) -> HttpResponse {
    let registry = state.lock().await;
    respond(registry.get(&path.key))
}

/// End the session ("goodnight"); `?delete=true` also drops the archived match.
#[delete("/api/workspaces/{key}/match")]
async fn api_end_match(state: AppState, path: Path<WorkspacePath>, query: Query<EndQuery>) -> HttpResponse {
    let mut registry = state.lock().await;
    respond(registry.end(&path.key, query.delete))
}

/// New match with the same (or the given) players.
#[post("/api/workspaces/{key}/match/another")]
async fn api_another_match(
    state: AppState,
    path: Path<WorkspacePath>,
    body: Option<Json<AnotherBody>>,
) -> HttpResponse {
    let players = body.map(|b| b.into_inner()).unwrap_or_default().players;
    let mut registry = state.lock().await;
    let result = registry.another(&path.key, players, Catalog::builtin(), &mut rand::thread_rng());
    respond(result.map(|(game, suggestions)| {
        serde_json::json!({ "match": game, "suggestions": suggestions })
    }))
}

#[put("/api/workspaces/{key}/players")]
async fn api_set_players(state: AppState, path: Path<WorkspacePath>, body: Json<PlayersBody>) -> HttpResponse {
    let mut registry = state.lock().await;
    let players = body.into_inner().players;
    respond(registry.update(&path.key, |m, _| m.set_players(players)).map(|(m, ())| m))
}

#[post("/api/workspaces/{key}/players")]
async fn api_add_players(state: AppState, path: Path<WorkspacePath>, body: Json<PlayersBody>) -> HttpResponse {
    let mut registry = state.lock().await;
    let players = body.into_inner().players;
    respond(registry.update(&path.key, |m, _| m.add_players(players)).map(|(m, ())| m))
}

#[delete("/api/workspaces/{key}/players")]
async fn api_remove_players(
    state: AppState,
    path: Path<WorkspacePath>,
    body: Json<RemovePlayersBody>,
) -> HttpResponse {
    let mut registry = state.lock().await;
    respond(
        registry
            .update(&path.key, |m, _| m.remove_players(&body.player_ids))
            .map(|(m, ())| m),
    )
}

#[put("/api/workspaces/{key}/map")]
async fn api_set_map(state: AppState, path: Path<WorkspacePath>, body: Json<MapBody>) -> HttpResponse {
    let mut registry = state.lock().await;
    respond(
        registry
            .update(&path.key, |m, _| set_map(m, Catalog::builtin(), &WeightedRatio, &body.name))
            .map(|(m, map)| serde_json::json!({ "match": m, "map": map })),
    )
}

async fn ban_or_unban(state: AppState, key: &str, text: &str, applying: bool) -> HttpResponse {
    let mut registry = state.lock().await;
    let result = registry.update(key, |m, _| {
        ban_operators(m, Catalog::builtin(), &WeightedRatio, text, applying)
    });
    respond(result.map(|(m, resolved)| {
        let tokens: Vec<ResolvedToken> = text
            .split_whitespace()
            .zip(resolved)
            .map(|(token, operator)| ResolvedToken {
                token: token.to_string(),
                operator,
            })
            .collect();
        serde_json::json!({ "match": m, "resolved": tokens })
    }))
}

#[post("/api/workspaces/{key}/bans")]
async fn api_ban(state: AppState, path: Path<WorkspacePath>, body: Json<BansBody>) -> HttpResponse {
    ban_or_unban(state, &path.key, &body.operators, true).await
}

#[delete("/api/workspaces/{key}/bans")]
async fn api_unban(state: AppState, path: Path<WorkspacePath>, body: Json<BansBody>) -> HttpResponse {
    ban_or_unban(state, &path.key, &body.operators, false).await
}

/// Fresh advisory bans; requires a live match but does not change it.
#[get("/api/workspaces/{key}/suggestions")]
async fn api_suggestions(state: AppState, path: Path<WorkspacePath>) -> HttpResponse {
    let registry = state.lock().await;
    respond(
        registry
            .get(&path.key)
            .map(|_| suggest_bans(Catalog::builtin(), &mut rand::thread_rng())),
    )
}

/// Declare attack or defense; starts round 1 from Setup. Deals the round's lineup.
#[post("/api/workspaces/{key}/side")]
async fn api_start_side(state: AppState, path: Path<WorkspacePath>, body: Json<SideBody>) -> HttpResponse {
    let mut registry = state.lock().await;
    let mut rng = rand::thread_rng();
    respond(
        registry
            .update(&path.key, |m, _| {
                start_side(m, body.side)?;
                deal_lineup(m, Catalog::builtin(), &mut rng).map(|_| ())
            })
            .map(|(m, ())| m),
    )
}

/// Resolve the current round; when the match continues the next lineup is dealt right away.
#[post("/api/workspaces/{key}/rounds")]
async fn api_resolve_round(state: AppState, path: Path<WorkspacePath>, body: Json<RoundBody>) -> HttpResponse {
    let mut registry = state.lock().await;
    let mut rng = rand::thread_rng();
    respond(
        registry
            .update(&path.key, |m, _| {
                let resolution = resolve_round(m, body.outcome, body.overtime_side)?;
                if resolution.continues() {
                    deal_lineup(m, Catalog::builtin(), &mut rng)?;
                }
                Ok(resolution)
            })
            .map(|(m, resolution)| serde_json::json!({ "match": m, "resolution": resolution })),
    )
}

#[post("/api/workspaces/{key}/lineup/reshuffle")]
async fn api_reshuffle(state: AppState, path: Path<WorkspacePath>) -> HttpResponse {
    let mut registry = state.lock().await;
    let mut rng = rand::thread_rng();
    respond(
        registry
            .update(&path.key, |m, _| reshuffle(m, Catalog::builtin(), &mut rng).map(|_| ()))
            .map(|(m, ())| m),
    )
}

#[post("/api/workspaces/{key}/lineup/swap")]
async fn api_swap(state: AppState, path: Path<WorkspacePath>, body: Json<SwapBody>) -> HttpResponse {
    let mut registry = state.lock().await;
    respond(
        registry
            .update(&path.key, |m, _| {
                swap_operator(m, Catalog::builtin(), &WeightedRatio, &body.player_id, &body.operator)
                    .map(|_| ())
            })
            .map(|(m, ())| m),
    )
}

#[post("/api/workspaces/{key}/stats")]
async fn api_record_stat(state: AppState, path: Path<WorkspacePath>, body: Json<StatBody>) -> HttpResponse {
    let mut registry = state.lock().await;
    let result = registry.update(&path.key, |m, ledger| {
        record_stat(m, ledger, &body.player_id, body.stat)
    });
    let all_time = registry.ledger().get(&body.player_id, body.stat);
    respond(result.and_then(|(_, count)| {
        Ok(serde_json::json!({
            "player_id": body.player_id,
            "stat": body.stat,
            "count": count,
            "all_time": all_time?,
        }))
    }))
}

/// All-time counters of one player.
#[get("/api/players/{player_id}/stats")]
async fn api_player_stats(state: AppState, path: Path<PlayerPath>) -> HttpResponse {
    let registry = state.lock().await;
    respond(
        registry
            .ledger()
            .entries()
            .map(|entries| {
                entries
                    .into_iter()
                    .filter(|e| e.player_id == path.player_id)
                    .collect::<Vec<_>>()
            })
            .map_err(RegistryError::from),
    )
}

#[get("/api/stats.csv")]
async fn api_stats_csv(state: AppState) -> HttpResponse {
    let registry = state.lock().await;
    match ledger_to_csv(registry.ledger()) {
        Ok(csv) => HttpResponse::Ok().content_type("text/csv; charset=utf-8").body(csv),
        Err(e) => rejected(e.into()),
    }
}

/// Archived copy of a completed match.
#[get("/api/history/{match_id}")]
async fn api_history(state: AppState, path: Path<HistoryPath>) -> HttpResponse {
    let registry = state.lock().await;
    match registry.archive().get(path.match_id) {
        Ok(Some(data)) => match serde_json::from_str::<serde_json::Value>(&data) {
            Ok(value) => ok(value),
            Err(e) => rejected(RegistryError::Corrupt(e)),
        },
        Ok(None) => HttpResponse::NotFound().json(serde_json::json!({
            "ok": false,
            "reason": "match_not_found",
            "kind": ErrorKind::NotFound,
        })),
        Err(e) => rejected(e.into()),
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid configuration: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
        }
    };
    log::info!(
        "Starting server at http://{}:{} with rules {:?}",
        config.host,
        config.port,
        config.rules
    );

    // Fail at startup rather than on the first request.
    let catalog = Catalog::builtin();
    log::info!(
        "Catalog: {} maps, {} attackers, {} defenders",
        catalog.maps.len(),
        catalog.attackers.len(),
        catalog.defenders.len()
    );

    let state = Data::new(Mutex::new(SessionRegistry::in_memory(config.rules)));

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(api_catalog)
            .service(api_create_match)
            .service(api_get_match)
            .service(api_end_match)
            .service(api_another_match)
            .service(api_set_players)
            .service(api_add_players)
            .service(api_remove_players)
            .service(api_set_map)
            .service(api_ban)
            .service(api_unban)
            .service(api_suggestions)
            .service(api_start_side)
            .service(api_resolve_round)
            .service(api_reshuffle)
            .service(api_swap)
            .service(api_record_stat)
            .service(api_player_stats)
            .service(api_stats_csv)
            .service(api_history)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
