//! Router, handlers, and the serve loop.

use crate::context::SharedState;
use crate::error::ApiError;
use crate::models::{
    AgentsResponse, ConvoysResponse, HealthResponse, MailResponse, RigsResponse,
};
use anyhow::Context;
use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use derrick::board::{Board, build_board};
use derrick::domain::{IssueDetail, IssueId};
use derrick::town::{Rig, Town, TownStatus};
use tower_http::cors::CorsLayer;

/// Build the API router.
///
/// CORS is permissive: the display layer is served from a different origin
/// during development, and the whole surface is read-only.
pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/api/v1/board", get(get_board))
        .route("/api/v1/issues/{id}", get(get_issue))
        .route("/api/v1/health", get(get_health))
        .route("/api/v1/town", get(get_town))
        .route("/api/v1/town/status", get(get_town_status))
        .route("/api/v1/town/rigs", get(get_rigs))
        .route("/api/v1/town/rigs/{name}", get(get_rig))
        .route("/api/v1/town/agents", get(get_agents))
        .route("/api/v1/town/convoys", get(get_convoys))
        .route("/api/v1/town/mail/{address}", get(get_mail))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// `GET /api/v1/board`
async fn get_board(State(state): State<SharedState>) -> Result<Json<Board>, ApiError> {
    let graph = state.load_graph().await?;
    Ok(Json(build_board(&graph)))
}

/// `GET /api/v1/issues/{id}`
async fn get_issue(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<IssueDetail>, ApiError> {
    let graph = state.load_graph().await?;
    let detail = graph.resolve(&IssueId::new(id))?;
    Ok(Json(detail))
}

/// `GET /api/v1/health`
async fn get_health(State(state): State<SharedState>) -> Json<HealthResponse> {
    let health = state.store.health().await;
    Json(HealthResponse::new(state.version, health))
}

/// `GET /api/v1/town`
async fn get_town(State(state): State<SharedState>) -> Result<Json<Town>, ApiError> {
    let town = observe_town(&state).await?;
    Ok(Json(town))
}

/// `GET /api/v1/town/status`
///
/// Always answers 200, like `/health`: an unobservable town is reported in
/// the payload, not as an HTTP error.
async fn get_town_status(State(state): State<SharedState>) -> Json<TownStatus> {
    match state.town.town().await {
        Ok(town) => Json(TownStatus::of(&town)),
        Err(err) => Json(TownStatus::unhealthy(
            state.town.root().display().to_string(),
            err.to_string(),
        )),
    }
}

/// `GET /api/v1/town/rigs`
async fn get_rigs(State(state): State<SharedState>) -> Result<Json<RigsResponse>, ApiError> {
    let town = observe_town(&state).await?;
    Ok(Json(RigsResponse::new(town.rigs)))
}

/// `GET /api/v1/town/rigs/{name}`
async fn get_rig(
    State(state): State<SharedState>,
    Path(name): Path<String>,
) -> Result<Json<Rig>, ApiError> {
    let town = observe_town(&state).await?;
    let rig = town
        .rig(&name)
        .cloned()
        .ok_or(ApiError::RigNotFound(name))?;
    Ok(Json(rig))
}

/// `GET /api/v1/town/agents`
async fn get_agents(State(state): State<SharedState>) -> Result<Json<AgentsResponse>, ApiError> {
    let town = observe_town(&state).await?;
    Ok(Json(AgentsResponse::new(town.agents())))
}

/// `GET /api/v1/town/convoys`
async fn get_convoys(State(state): State<SharedState>) -> Result<Json<ConvoysResponse>, ApiError> {
    let town = observe_town(&state).await?;
    Ok(Json(ConvoysResponse::new(town.convoys)))
}

/// `GET /api/v1/town/mail/{address}`
async fn get_mail(
    State(state): State<SharedState>,
    Path(address): Path<String>,
) -> Result<Json<MailResponse>, ApiError> {
    let messages = state
        .town
        .mail(&address)
        .await
        .map_err(|err| ApiError::Town(err.to_string()))?;
    Ok(Json(MailResponse::new(messages)))
}

async fn observe_town(state: &SharedState) -> Result<Town, ApiError> {
    state
        .town
        .town()
        .await
        .map_err(|err| ApiError::Town(err.to_string()))
}

/// Bind and serve until Ctrl-C.
pub async fn serve(state: SharedState, host: &str, port: u16) -> anyhow::Result<()> {
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    tracing::info!(addr = %listener.local_addr()?, "derrickd listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("server shut down");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        tracing::warn!("failed to install Ctrl+C handler; running until killed");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
