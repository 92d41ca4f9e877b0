use axum::{
    Router,
    extract::{Json, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::net::TcpListener;

use crate::core::{
    Actor, BondError, BondSummary, Catalog, Forecast, ForecastRequest, Inventory, Item,
    ItemCategory, PointEquivalent, RankTable, RewardValues, SELECT_BOX_ITEM_ID,
    SimulatedDayRecord, SimulationParameters, StopReason, SummaryRequest, equivalents,
    simulate_cancellable, summarize, validate_params,
};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid master data JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Engine(#[from] BondError),
    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
    #[error("forecast task failed: {0}")]
    Task(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Engine(_) => StatusCode::BAD_REQUEST,
            AppError::Io { .. } | AppError::Json(_) | AppError::Serve(_) | AppError::Task(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Parsed master data shared by every request.
#[derive(Debug, Clone)]
pub struct MasterData {
    pub catalog: Catalog,
    pub rank_table: RankTable,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MasterDataFile {
    #[serde(default)]
    select_item_id: Option<String>,
    items: Vec<ItemRecord>,
    #[serde(default)]
    actors: Vec<ActorRecord>,
    rank_table: Vec<u64>,
}

#[derive(Debug, Deserialize)]
struct ItemRecord {
    id: String,
    category: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ActorRecord {
    id: String,
    #[serde(default)]
    favored_item_ids: Vec<String>,
    #[serde(default)]
    super_favored_item_ids: Vec<String>,
    #[serde(default)]
    ultra_favored_item_ids: Vec<String>,
}

pub fn load_master_data(path: &Path) -> Result<MasterData, AppError> {
    let raw = std::fs::read_to_string(path).map_err(|source| AppError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    master_data_from_json(&raw)
}

pub fn master_data_from_json(json: &str) -> Result<MasterData, AppError> {
    let file = serde_json::from_str::<MasterDataFile>(json)?;

    let items = file
        .items
        .into_iter()
        .map(|record| {
            let category = record.category.parse::<ItemCategory>().map_err(|err| match err {
                BondError::UnknownCategory { category, .. } => BondError::UnknownCategory {
                    item_id: Some(record.id.clone()),
                    category,
                },
                other => other,
            })?;
            Ok(Item::new(record.id, category))
        })
        .collect::<Result<Vec<_>, BondError>>()?;

    let actors = file
        .actors
        .into_iter()
        .map(|record| {
            Actor::new(record.id)
                .with_favored(record.favored_item_ids)
                .with_super_favored(record.super_favored_item_ids)
                .with_ultra_favored(record.ultra_favored_item_ids)
        })
        .collect();

    let rank_table = RankTable::new(file.rank_table)?;
    let catalog = Catalog::new(items, actors)
        .with_select_item_id(file.select_item_id.unwrap_or_else(|| SELECT_BOX_ITEM_ID.to_string()));

    tracing::info!(
        actors = catalog.actor_ids().len(),
        items = catalog.items().count(),
        "loaded master data"
    );
    Ok(MasterData {
        catalog,
        rank_table,
    })
}

#[derive(Parser, Debug)]
#[command(
    name = "bondcalc",
    about = "Bond rank calculator: inventory points, select box conversion and time-to-goal forecast"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the JSON API over HTTP.
    Serve {
        #[arg(long, env = "PORT", default_value_t = 8080)]
        port: u16,
        #[arg(long, env = "BONDCALC_CATALOG", help = "Master data JSON file")]
        catalog: PathBuf,
    },
    /// Print the bond summary and forecast for one actor as JSON.
    Forecast(ForecastArgs),
}

#[derive(Args, Debug)]
struct ForecastArgs {
    #[arg(long, env = "BONDCALC_CATALOG", help = "Master data JSON file")]
    catalog: PathBuf,
    #[arg(long, help = "Actor (variant) id; omit to price everything at baseline")]
    actor: Option<String>,
    #[arg(long, default_value_t = 1)]
    current_rank: u32,
    #[arg(long, default_value_t = 100)]
    goal_rank: u32,
    #[arg(
        long = "item",
        value_parser = parse_item_count,
        help = "Inventory entry as ID=COUNT, repeatable"
    )]
    items: Vec<(String, i64)>,
    #[arg(long, default_value_t = 0, help = "Scarce crafting resources on hand")]
    scarce: u32,
    #[arg(long, help = "Anchor date (YYYY-MM-DD); defaults to today")]
    start_date: Option<NaiveDate>,
    #[command(flatten)]
    sim: SimArgs,
}

#[derive(Args, Debug, Clone)]
struct SimArgs {
    #[arg(long, default_value_t = 5.0, help = "Cafe touches per day")]
    actions_per_day: f64,
    #[arg(long, default_value_t = 0.5, help = "Schedules per day")]
    schedules_per_day: f64,
    #[arg(
        long,
        default_value_t = 25.0,
        help = "Chance of a schedule bonus in percent"
    )]
    schedule_bonus_percent: f64,
    #[arg(long, default_value_t = 3.0, help = "Items crafted per day")]
    crafts_per_day: f64,
    #[arg(
        long,
        default_value_t = 10.0,
        help = "Chance a crafted item is high quality, in percent"
    )]
    fancy_percent: f64,
    #[arg(long, default_value_t = 40, help = "Low items granted per event")]
    normal_items_per_event: u32,
    #[arg(long, default_value_t = 2, help = "High items granted per event")]
    fancy_items_per_event: u32,
    #[arg(long, default_value_t = 5, help = "Day of month of event 1; 0 disables")]
    event1_day: u8,
    #[arg(long, default_value_t = 15, help = "Day of month of event 2; 0 disables")]
    event2_day: u8,
    #[arg(long, default_value_t = 75, help = "Highest milestone floor cleared each month")]
    milestone_reach: u32,
    #[arg(long, default_value_t = 15, help = "Day of month milestones are cleared; 0 disables")]
    milestone_day: u8,
    #[arg(long, default_value_t = 0, help = "Monthly gift bundles bought")]
    gift_bundles: u32,
    #[arg(long, default_value_t = 1, help = "Day of month gift bundles are used")]
    gift_bundle_day: u8,
    #[arg(long, default_value_t = 0, help = "Monthly crafting bundles bought")]
    craft_bundles: u32,
    #[arg(long, default_value_t = 1, help = "Day of month crafting bundles are used")]
    craft_bundle_day: u8,
}

impl Default for SimArgs {
    fn default() -> Self {
        let params = SimulationParameters::default();
        Self {
            actions_per_day: params.actions_per_day,
            schedules_per_day: params.schedules_per_day,
            schedule_bonus_percent: params.schedule_bonus_percent,
            crafts_per_day: params.crafts_per_day,
            fancy_percent: params.fancy_percent,
            normal_items_per_event: params.normal_items_per_event,
            fancy_items_per_event: params.fancy_items_per_event,
            event1_day: params.event1_day,
            event2_day: params.event2_day,
            milestone_reach: params.milestone_reach,
            milestone_day: params.milestone_day,
            gift_bundles: params.gift_bundles,
            gift_bundle_day: params.gift_bundle_day,
            craft_bundles: params.craft_bundles,
            craft_bundle_day: params.craft_bundle_day,
        }
    }
}

fn parse_item_count(raw: &str) -> Result<(String, i64), String> {
    let (id, count) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected ID=COUNT, got '{raw}'"))?;
    let count = count
        .trim()
        .parse::<i64>()
        .map_err(|e| format!("invalid count for '{id}': {e}"))?;
    if count < 0 {
        return Err(format!("count for '{id}' must be >= 0"));
    }
    Ok((id.trim().to_string(), count))
}

fn build_params(args: &SimArgs) -> Result<SimulationParameters, BondError> {
    let params = SimulationParameters {
        actions_per_day: args.actions_per_day,
        schedules_per_day: args.schedules_per_day,
        schedule_bonus_percent: args.schedule_bonus_percent,
        crafts_per_day: args.crafts_per_day,
        fancy_percent: args.fancy_percent,
        normal_items_per_event: args.normal_items_per_event,
        fancy_items_per_event: args.fancy_items_per_event,
        event1_day: args.event1_day,
        event2_day: args.event2_day,
        milestone_reach: args.milestone_reach,
        milestone_day: args.milestone_day,
        gift_bundles: args.gift_bundles,
        gift_bundle_day: args.gift_bundle_day,
        craft_bundles: args.craft_bundles,
        craft_bundle_day: args.craft_bundle_day,
    };
    validate_params(&params)?;
    Ok(params)
}

/// Request body shared by the summary and simulate endpoints.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct BondPayload {
    actor_id: Option<String>,
    inventory: HashMap<String, i64>,
    current_rank: Option<u32>,
    goal_rank: Option<u32>,
    scarce_count: Option<i64>,
    start_date: Option<NaiveDate>,

    actions_per_day: Option<f64>,
    schedules_per_day: Option<f64>,
    schedule_bonus_percent: Option<f64>,
    crafts_per_day: Option<f64>,
    fancy_percent: Option<f64>,
    normal_items_per_event: Option<i64>,
    fancy_items_per_event: Option<i64>,
    event1_day: Option<i64>,
    event2_day: Option<i64>,
    milestone_reach: Option<i64>,
    milestone_day: Option<i64>,
    gift_bundles: Option<i64>,
    gift_bundle_day: Option<i64>,
    craft_bundles: Option<i64>,
    craft_bundle_day: Option<i64>,
}

#[derive(Debug)]
struct BondRequest {
    actor_id: Option<String>,
    inventory: Inventory,
    current_rank: u32,
    goal_rank: u32,
    scarce_count: u32,
    start_date: Option<NaiveDate>,
    params: SimulationParameters,
}

fn count_param(name: &'static str, value: i64) -> Result<u32, BondError> {
    u32::try_from(value).map_err(|_| BondError::invalid(name, value as f64, "must be a count >= 0"))
}

fn day_param(name: &'static str, value: i64) -> Result<u8, BondError> {
    u8::try_from(value)
        .ok()
        .filter(|day| *day <= 31)
        .ok_or_else(|| {
            BondError::invalid(
                name,
                value as f64,
                "must be a day of month between 1 and 31, or 0 to disable",
            )
        })
}

#[cfg(test)]
fn bond_request_from_json(json: &str) -> Result<BondRequest, String> {
    let payload = serde_json::from_str::<BondPayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    bond_request_from_payload(payload).map_err(|e| e.to_string())
}

fn bond_request_from_payload(payload: BondPayload) -> Result<BondRequest, BondError> {
    let mut sim = SimArgs::default();

    if let Some(v) = payload.actions_per_day {
        sim.actions_per_day = v;
    }
    if let Some(v) = payload.schedules_per_day {
        sim.schedules_per_day = v;
    }
    if let Some(v) = payload.schedule_bonus_percent {
        sim.schedule_bonus_percent = v;
    }
    if let Some(v) = payload.crafts_per_day {
        sim.crafts_per_day = v;
    }
    if let Some(v) = payload.fancy_percent {
        sim.fancy_percent = v;
    }
    if let Some(v) = payload.normal_items_per_event {
        sim.normal_items_per_event = count_param("normalItemsPerEvent", v)?;
    }
    if let Some(v) = payload.fancy_items_per_event {
        sim.fancy_items_per_event = count_param("fancyItemsPerEvent", v)?;
    }
    if let Some(v) = payload.event1_day {
        sim.event1_day = day_param("event1Day", v)?;
    }
    if let Some(v) = payload.event2_day {
        sim.event2_day = day_param("event2Day", v)?;
    }
    if let Some(v) = payload.milestone_reach {
        sim.milestone_reach = count_param("milestoneReach", v)?;
    }
    if let Some(v) = payload.milestone_day {
        sim.milestone_day = day_param("milestoneDay", v)?;
    }
    if let Some(v) = payload.gift_bundles {
        sim.gift_bundles = count_param("giftBundles", v)?;
    }
    if let Some(v) = payload.gift_bundle_day {
        sim.gift_bundle_day = day_param("giftBundleDay", v)?;
    }
    if let Some(v) = payload.craft_bundles {
        sim.craft_bundles = count_param("craftBundles", v)?;
    }
    if let Some(v) = payload.craft_bundle_day {
        sim.craft_bundle_day = day_param("craftBundleDay", v)?;
    }

    Ok(BondRequest {
        actor_id: payload.actor_id.filter(|id| !id.is_empty()),
        inventory: payload.inventory,
        current_rank: payload.current_rank.unwrap_or(1),
        goal_rank: payload.goal_rank.unwrap_or(100),
        scarce_count: count_param("scarceCount", payload.scarce_count.unwrap_or(0))?,
        start_date: payload.start_date,
        params: build_params(&sim)?,
    })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SummaryResponse {
    summary: BondSummary,
    next_rank_equivalents: Option<Vec<PointEquivalent>>,
    goal_equivalents: Option<Vec<PointEquivalent>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SimulateResponse {
    summary: BondSummary,
    rewards: RewardValues,
    start_date: NaiveDate,
    days: Vec<SimulatedDayRecord>,
    /// `None` when the goal is already met and no forecast was run.
    stop: Option<StopReason>,
    days_to_goal: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize)]
struct ActorsResponse<'a> {
    actors: Vec<&'a str>,
}

fn build_summary(data: &MasterData, request: &BondRequest) -> Result<BondSummary, BondError> {
    let actor = request
        .actor_id
        .as_deref()
        .map(|id| data.catalog.actor(id))
        .transpose()?;
    summarize(
        &data.catalog,
        &data.rank_table,
        SummaryRequest {
            inventory: &request.inventory,
            actor,
            current_rank: request.current_rank,
            goal_rank: request.goal_rank,
            scarce_count: request.scarce_count,
        },
    )
}

fn build_summary_response(data: &MasterData, request: &BondRequest) -> Result<SummaryResponse, BondError> {
    let summary = build_summary(data, request)?;
    Ok(SummaryResponse {
        next_rank_equivalents: summary.next_rank.map(|gap| equivalents(gap.points_needed)),
        goal_equivalents: summary.points_to_goal.map(equivalents),
        summary,
    })
}

fn build_simulate_response(
    data: &MasterData,
    request: &BondRequest,
    today: NaiveDate,
    cancel: &AtomicBool,
) -> Result<SimulateResponse, BondError> {
    let summary = build_summary(data, request)?;
    let actor = request
        .actor_id
        .as_deref()
        .map(|id| data.catalog.actor(id))
        .transpose()?;
    let rewards = RewardValues::for_actor(&data.catalog, actor);

    let forecast = if summary.needs_forecast() {
        Some(simulate_cancellable(
            ForecastRequest {
                starting_points: summary.total_points as f64,
                goal_rank: summary.goal_rank,
                rank_table: &data.rank_table,
                params: &request.params,
                rewards,
                today,
            },
            cancel,
        )?)
    } else {
        None
    };

    let days_to_goal = forecast.as_ref().and_then(Forecast::days_to_goal);
    let (days, stop) = match forecast {
        Some(Forecast { days, stop }) => (days, Some(stop)),
        None => (Vec::new(), None),
    };
    Ok(SimulateResponse {
        summary,
        rewards,
        start_date: today,
        days,
        stop,
        days_to_goal,
    })
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

pub async fn run(cli: Cli) -> Result<(), AppError> {
    match cli.command {
        Command::Serve { port, catalog } => {
            let data = load_master_data(&catalog)?;
            run_http_server(port, data).await.map_err(AppError::Serve)
        }
        Command::Forecast(args) => {
            let data = load_master_data(&args.catalog)?;
            let request = BondRequest {
                actor_id: args.actor,
                inventory: args.items.into_iter().collect(),
                current_rank: args.current_rank,
                goal_rank: args.goal_rank,
                scarce_count: args.scarce,
                start_date: args.start_date,
                params: build_params(&args.sim)?,
            };
            let today = request.start_date.unwrap_or_else(today);
            let response =
                build_simulate_response(&data, &request, today, &AtomicBool::new(false))?;
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(())
        }
    }
}

pub async fn run_http_server(port: u16, data: MasterData) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route("/api/actors", get(actors_handler))
        .route("/api/summary", post(summary_handler))
        .route("/api/simulate", post(simulate_handler))
        .fallback(not_found_handler)
        .with_state(Arc::new(data));

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "bond calculator API listening");

    axum::serve(listener, app).await
}

async fn actors_handler(State(data): State<Arc<MasterData>>) -> Response {
    json_response(
        StatusCode::OK,
        ActorsResponse {
            actors: data.catalog.actor_ids(),
        },
    )
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn summary_handler(
    State(data): State<Arc<MasterData>>,
    Json(payload): Json<BondPayload>,
) -> Response {
    let result = bond_request_from_payload(payload)
        .and_then(|request| build_summary_response(&data, &request));
    match result {
        Ok(body) => json_response(StatusCode::OK, body),
        Err(err) => app_error_response(err.into()),
    }
}

async fn simulate_handler(
    State(data): State<Arc<MasterData>>,
    Json(payload): Json<BondPayload>,
) -> Response {
    let request = match bond_request_from_payload(payload) {
        Ok(request) => request,
        Err(err) => return app_error_response(err.into()),
    };

    let cancel = Arc::new(AtomicBool::new(false));
    let _cancel_on_drop = CancelOnDrop(Arc::clone(&cancel));
    let task = tokio::task::spawn_blocking(move || {
        let today = request.start_date.unwrap_or_else(today);
        build_simulate_response(&data, &request, today, &cancel)
    });
    match task.await {
        Ok(Ok(body)) => json_response(StatusCode::OK, body),
        Ok(Err(err)) => app_error_response(err.into()),
        Err(join) => app_error_response(AppError::Task(join.to_string())),
    }
}

/// Raises the flag when the request future is dropped, e.g. on client disconnect.
struct CancelOnDrop(Arc<AtomicBool>);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

fn app_error_response(err: AppError) -> Response {
    let status = err.status();
    if status.is_server_error() {
        tracing::error!(%err, "request failed");
    } else {
        tracing::debug!(%err, "rejected request");
    }
    error_response(status, &err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ReactionTier;

    fn rank_table_json() -> String {
        let mut thresholds = vec![0_u64, 100, 300];
        while thresholds.len() < 100 {
            let last = thresholds[thresholds.len() - 1];
            thresholds.push(last + 250);
        }
        serde_json::to_string(&thresholds).expect("serializable")
    }

    fn sample_json() -> String {
        format!(
            r#"{{
                "items": [
                    {{"id": "g1", "category": "normal"}},
                    {{"id": "g2", "category": "low"}},
                    {{"id": "h1", "category": "high"}},
                    {{"id": "w1", "category": "high-all"}},
                    {{"id": "gift-select-box", "category": "normal"}}
                ],
                "actors": [
                    {{"id": "hanako", "superFavoredItemIds": ["g2"], "ultraFavoredItemIds": ["h1"]}},
                    {{"id": "mutsuki"}}
                ],
                "rankTable": {}
            }}"#,
            rank_table_json()
        )
    }

    fn sample_data() -> MasterData {
        master_data_from_json(&sample_json()).expect("valid master data")
    }

    #[test]
    fn master_data_parses_aliases_and_actors() {
        let data = sample_data();
        assert_eq!(data.catalog.actor_ids(), vec!["hanako", "mutsuki"]);
        assert_eq!(
            data.catalog.item("w1").expect("w1").category,
            ItemCategory::HighWide
        );
        assert_eq!(data.catalog.select_item_id(), SELECT_BOX_ITEM_ID);
        assert_eq!(data.rank_table.points_for_rank(3), Some(300));
    }

    #[test]
    fn bundled_sample_catalog_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("data/catalog.sample.json");
        let data = load_master_data(&path).expect("sample catalog is valid");
        assert!(data.catalog.actor("hanako").is_ok());
        assert_eq!(data.rank_table.points_for_rank(1), Some(0));
    }

    #[test]
    fn missing_catalog_file_reports_path() {
        let err = load_master_data(Path::new("/nonexistent/catalog.json")).expect_err("missing");
        assert!(matches!(err, AppError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/catalog.json"));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn master_data_rejects_unknown_category_with_item_id() {
        let json = sample_json().replace(r#""id": "h1", "category": "high""#, r#""id": "h1", "category": "rare""#);
        let err = master_data_from_json(&json).expect_err("unknown category");
        assert_eq!(
            err.to_string(),
            "unknown item category 'rare' for item 'h1'"
        );
    }

    #[test]
    fn master_data_rejects_short_rank_table() {
        let json = sample_json().replace(&rank_table_json(), "[0, 10, 20]");
        let err = master_data_from_json(&json).expect_err("short table");
        assert!(err.to_string().contains("expected 100 thresholds, got 3"));
    }

    #[test]
    fn bond_request_from_json_parses_web_keys() {
        let request = bond_request_from_json(
            r#"{
                "actorId": "hanako",
                "inventory": {"g1": 10, "h1": 1},
                "currentRank": 2,
                "goalRank": 20,
                "scarceCount": 3,
                "startDate": "2025-01-31",
                "actionsPerDay": 4,
                "fancyPercent": 20,
                "event1Day": 0,
                "giftBundles": 1
            }"#,
        )
        .expect("valid payload");
        assert_eq!(request.actor_id.as_deref(), Some("hanako"));
        assert_eq!(request.inventory.get("g1"), Some(&10));
        assert_eq!(request.scarce_count, 3);
        assert_eq!(request.start_date, NaiveDate::from_ymd_opt(2025, 1, 31));
        assert_eq!(request.params.actions_per_day, 4.0);
        assert_eq!(request.params.fancy_percent, 20.0);
        assert_eq!(request.params.event1_day, 0);
        assert_eq!(request.params.event2_day, 15);
        assert_eq!(request.params.gift_bundles, 1);
    }

    #[test]
    fn bond_request_rejects_negative_counts_by_name() {
        let err = bond_request_from_json(r#"{"giftBundles": -1}"#).expect_err("negative");
        assert!(err.contains("giftBundles"), "{err}");
        let err = bond_request_from_json(r#"{"milestoneDay": 40}"#).expect_err("bad day");
        assert!(err.contains("milestoneDay"), "{err}");
        let err = bond_request_from_json(r#"{"scheduleBonusPercent": 150}"#).expect_err("percent");
        assert!(err.contains("scheduleBonusPercent"), "{err}");
    }

    #[test]
    fn parse_item_count_accepts_id_equals_count() {
        assert_eq!(parse_item_count("g1=3"), Ok(("g1".to_string(), 3)));
        assert!(parse_item_count("g1").is_err());
        assert!(parse_item_count("g1=-2").is_err());
    }

    #[test]
    fn sim_args_defaults_match_engine_defaults() {
        let params = build_params(&SimArgs::default()).expect("defaults are valid");
        assert_eq!(params, SimulationParameters::default());
    }

    #[test]
    fn summary_response_includes_conversion_and_equivalents() {
        let data = sample_data();
        let request = bond_request_from_json(
            r#"{"actorId": "hanako", "inventory": {"g1": 10, "h1": 1}, "currentRank": 2, "goalRank": 10, "scarceCount": 3}"#,
        )
        .expect("valid payload");
        let response = build_summary_response(&data, &request).expect("summary");

        // g1 baseline 200, h1 ultra 240, conversion 3 * (60 - 40).
        assert_eq!(response.summary.inventory.total, 440);
        assert_eq!(response.summary.optimization.net_point_gain, 60);
        assert_eq!(response.summary.optimization.derived_tier, ReactionTier::Super);
        assert_eq!(response.summary.total_points, 600);
        assert!(response.next_rank_equivalents.is_some());

        let json = serde_json::to_string(&response).expect("serializable");
        for key in [
            "\"summary\"",
            "\"currentRankPoints\"",
            "\"netPointGain\"",
            "\"reachableRank\"",
            "\"pointsToGoal\"",
            "\"nextRankEquivalents\"",
            "\"unitPoints\"",
        ] {
            assert!(json.contains(key), "missing {key} in {json}");
        }
    }

    #[test]
    fn unknown_actor_is_a_bad_request() {
        let data = sample_data();
        let request = bond_request_from_json(r#"{"actorId": "nobody"}"#).expect("valid payload");
        let err = build_summary_response(&data, &request).expect_err("unknown actor");
        let app: AppError = err.into();
        assert_eq!(app.status(), StatusCode::BAD_REQUEST);
        assert_eq!(app.to_string(), "unknown actor id 'nobody'");
    }

    #[test]
    fn simulate_response_reports_days_to_goal() {
        let data = sample_data();
        let request = bond_request_from_json(
            r#"{"currentRank": 1, "goalRank": 3, "actionsPerDay": 5, "schedulesPerDay": 0, "craftsPerDay": 0,
                "event1Day": 0, "event2Day": 0, "milestoneDay": 0}"#,
        )
        .expect("valid payload");
        let today = NaiveDate::from_ymd_opt(2025, 1, 31).expect("date");
        let response = build_simulate_response(&data, &request, today, &AtomicBool::new(false))
            .expect("forecast");

        assert_eq!(response.stop, Some(StopReason::GoalReached));
        assert_eq!(response.days.len(), 4);
        assert_eq!(response.days_to_goal, Some(4));

        let json = serde_json::to_string(&response).expect("serializable");
        for key in [
            "\"daysToGoal\":4",
            "\"calendarDate\":\"2025-02-01\"",
            "\"pointsGained\"",
            "\"cumulativePoints\"",
            "\"projectedRank\"",
            "\"stop\":\"goal-reached\"",
        ] {
            assert!(json.contains(key), "missing {key} in {json}");
        }
    }

    #[test]
    fn dropped_request_cancels_forecast() {
        let data = sample_data();
        let request = bond_request_from_json(r#"{"currentRank": 1, "goalRank": 50}"#)
            .expect("valid payload");
        let cancel = Arc::new(AtomicBool::new(false));
        drop(CancelOnDrop(Arc::clone(&cancel)));
        assert!(cancel.load(Ordering::Relaxed));

        let today = NaiveDate::from_ymd_opt(2025, 1, 31).expect("date");
        let response =
            build_simulate_response(&data, &request, today, &cancel).expect("cancelled forecast");
        assert_eq!(response.stop, Some(StopReason::Cancelled));
        assert!(response.days.is_empty());
        assert_eq!(response.days_to_goal, None);
    }

    #[test]
    fn simulate_skips_forecast_when_goal_met() {
        let data = sample_data();
        let request = bond_request_from_json(
            r#"{"inventory": {"w1": 5}, "currentRank": 1, "goalRank": 3}"#,
        )
        .expect("valid payload");
        let today = NaiveDate::from_ymd_opt(2025, 1, 31).expect("date");
        let response = build_simulate_response(&data, &request, today, &AtomicBool::new(false))
            .expect("summary");
        assert!(response.days.is_empty());
        assert_eq!(response.stop, None);
        assert_eq!(response.days_to_goal, None);
    }
}
