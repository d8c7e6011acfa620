use axum::{
    extract::{Path, Query, State},
    middleware,
    routing::{get, post},
    Json, Router,
};
use rewards_ledger::{ActionId, Address, Amount, EventRecord};
use rewards_sdk::api::{
    AccountResponse, ActionStatus, AuthorizeMintRequest, BadgeMintRequest, HealthResponse,
    InfoResponse, PauseRequest, PendingStatus, PointsAward, PointsBalance, RateBody, Receipt,
    ReconcileRequest, ReconcileResponse, RedeemCheck, RelayMintRequest, RelayMintResponse,
    RoleRequest, TriggerResponse,
};
use serde::Deserialize;
use std::str::FromStr;
use std::sync::Arc;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::info;

use crate::auth::{require_operator_key, OperatorAuth};
use crate::config::RelayerConfig;
use crate::error::{RelayerError, Result};
use crate::ledger_service::LedgerService;

const MAX_BODY_BYTES: usize = 1024 * 1024;

pub struct RelayerState {
    pub config: RelayerConfig,
    pub ledger: LedgerService,
}

impl RelayerState {
    pub fn new(config: RelayerConfig) -> anyhow::Result<Self> {
        let ledger = LedgerService::new(&config)?;
        Ok(Self { config, ledger })
    }
}

/// API routes with tracing, CORS and body limits; rate limiting is added by `run`.
/// Routes that act with the operator's ledger roles require the API key.
pub fn router(state: Arc<RelayerState>) -> Router {
    let auth = OperatorAuth::new(state.config.api_key.clone());

    let operator = Router::new()
        .route("/mint/authorize", post(authorize_mint))
        .route("/reconcile", post(reconcile))
        .route("/reconcile/trigger", post(trigger_reconcile))
        .route("/points", post(award_points))
        .route("/admin/rate", get(get_rate).post(set_rate))
        .route("/admin/pause", post(pause))
        .route("/admin/unpause", post(unpause))
        .route("/admin/roles/grant", post(grant_role))
        .route("/admin/roles/revoke", post(revoke_role))
        .route("/badges/mint", post(mint_badge))
        .route_layer(middleware::from_fn_with_state(auth, require_operator_key));

    Router::new()
        .route("/health", get(health))
        .route("/info", get(get_info))
        // Relayed minting
        .route("/mint/relay", post(relay_mint))
        .route("/actions/:action_id", get(get_action))
        .route("/receipts/:tx_hash", get(get_receipt))
        // Points, accounts and redemption
        .route("/reconcile/status", get(reconcile_status))
        .route("/points/:address", get(get_points))
        .route("/accounts/:address", get(get_account))
        .route("/redeem/check/:address/:amount", get(redeem_check))
        .route("/rate", get(get_rate))
        .route("/events", get(get_events))
        .merge(operator)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn run(state: Arc<RelayerState>) -> anyhow::Result<()> {
    // 10 requests per second per IP
    let governor_conf = GovernorConfigBuilder::default()
        .per_second(10)
        .burst_size(20)
        .key_extractor(tower_governor::key_extractor::SmartIpKeyExtractor)
        .finish()
        .ok_or_else(|| anyhow::anyhow!("Invalid rate limit configuration"))?;

    let app = router(state.clone()).layer(GovernorLayer {
        config: Arc::new(governor_conf),
    });

    let addr = format!("{}:{}", state.config.host, state.config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(
        "Relayer listening on {} (rate limited: 10 req/s per IP)",
        addr
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await?;
    Ok(())
}

fn parse_address(raw: &str) -> Result<Address> {
    Address::from_str(raw).map_err(|e| RelayerError::InvalidRequest(format!("address: {}", e)))
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn get_info(State(state): State<Arc<RelayerState>>) -> Json<InfoResponse> {
    Json(state.ledger.info().await)
}

async fn relay_mint(
    State(state): State<Arc<RelayerState>>,
    Json(req): Json<RelayMintRequest>,
) -> Result<Json<RelayMintResponse>> {
    Ok(Json(state.ledger.relay_mint(req).await?))
}

async fn authorize_mint(
    State(state): State<Arc<RelayerState>>,
    Json(req): Json<AuthorizeMintRequest>,
) -> Result<Json<RelayMintResponse>> {
    Ok(Json(state.ledger.authorize_mint(req.to, req.amount).await?))
}

async fn get_action(
    State(state): State<Arc<RelayerState>>,
    Path(action_id): Path<String>,
) -> Result<Json<ActionStatus>> {
    let action_id = ActionId::from_str(&action_id)
        .map_err(|e| RelayerError::InvalidRequest(format!("action id: {}", e)))?;
    Ok(Json(state.ledger.action_status(&action_id).await))
}

async fn get_receipt(
    State(state): State<Arc<RelayerState>>,
    Path(tx_hash): Path<String>,
) -> Result<Json<Receipt>> {
    state
        .ledger
        .receipt(&tx_hash)
        .await
        .map(Json)
        .ok_or_else(|| RelayerError::NotFound(format!("receipt {}", tx_hash)))
}

async fn reconcile(
    State(state): State<Arc<RelayerState>>,
    Json(req): Json<ReconcileRequest>,
) -> Result<Json<ReconcileResponse>> {
    Ok(Json(state.ledger.reconcile(req).await?))
}

async fn reconcile_status(State(state): State<Arc<RelayerState>>) -> Json<PendingStatus> {
    Json(state.ledger.reconcile_status().await)
}

async fn trigger_reconcile(State(state): State<Arc<RelayerState>>) -> Result<Json<TriggerResponse>> {
    Ok(Json(state.ledger.reconcile_pending().await?))
}

async fn award_points(
    State(state): State<Arc<RelayerState>>,
    Json(req): Json<PointsAward>,
) -> Result<Json<PointsBalance>> {
    Ok(Json(state.ledger.award_points(req.user, req.points).await?))
}

async fn get_points(
    State(state): State<Arc<RelayerState>>,
    Path(address): Path<String>,
) -> Result<Json<PointsBalance>> {
    let address = parse_address(&address)?;
    Ok(Json(state.ledger.points_of(&address).await))
}

async fn get_account(
    State(state): State<Arc<RelayerState>>,
    Path(address): Path<String>,
) -> Result<Json<AccountResponse>> {
    let address = parse_address(&address)?;
    Ok(Json(state.ledger.account(&address).await))
}

async fn redeem_check(
    State(state): State<Arc<RelayerState>>,
    Path((address, amount)): Path<(String, String)>,
) -> Result<Json<RedeemCheck>> {
    let address = parse_address(&address)?;
    let amount: Amount = amount
        .parse()
        .map_err(|_| RelayerError::InvalidRequest(format!("amount: {}", amount)))?;
    Ok(Json(state.ledger.redeem_check(address, amount).await))
}

async fn get_rate(State(state): State<Arc<RelayerState>>) -> Json<RateBody> {
    Json(RateBody {
        rate: state.ledger.rate().await,
    })
}

async fn set_rate(
    State(state): State<Arc<RelayerState>>,
    Json(req): Json<RateBody>,
) -> Result<Json<RateBody>> {
    state.ledger.set_rate(req.rate).await?;
    Ok(Json(RateBody {
        rate: state.ledger.rate().await,
    }))
}

async fn pause(
    State(state): State<Arc<RelayerState>>,
    body: Option<Json<PauseRequest>>,
) -> Result<Json<InfoResponse>> {
    let reason = body.and_then(|Json(req)| req.reason);
    state.ledger.pause(reason).await?;
    Ok(Json(state.ledger.info().await))
}

async fn unpause(State(state): State<Arc<RelayerState>>) -> Result<Json<InfoResponse>> {
    state.ledger.unpause().await?;
    Ok(Json(state.ledger.info().await))
}

async fn grant_role(
    State(state): State<Arc<RelayerState>>,
    Json(req): Json<RoleRequest>,
) -> Result<Json<Receipt>> {
    Ok(Json(state.ledger.grant_role(req.role, req.account).await?))
}

async fn revoke_role(
    State(state): State<Arc<RelayerState>>,
    Json(req): Json<RoleRequest>,
) -> Result<Json<Receipt>> {
    Ok(Json(state.ledger.revoke_role(req.role, req.account).await?))
}

async fn mint_badge(
    State(state): State<Arc<RelayerState>>,
    Json(req): Json<BadgeMintRequest>,
) -> Result<Json<Receipt>> {
    let receipt = state
        .ledger
        .mint_badge(req.to, req.id, req.amount, req.soulbound)
        .await?;
    Ok(Json(receipt))
}

#[derive(Deserialize)]
struct EventsQuery {
    #[serde(default)]
    since: u64,
}

async fn get_events(
    State(state): State<Arc<RelayerState>>,
    Query(query): Query<EventsQuery>,
) -> Json<Vec<EventRecord>> {
    Json(state.ledger.events_since(query.since).await)
}
