//! Reservation server for distribution plans.
//!
//! Serves the plan produced by the `plan` binary and lets volunteers claim,
//! release, and complete distribution units. Every accepted update is written
//! back to the plan file, so restarts pick up where the team left off.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use paperroute::models::{PlanOutput, ReservationStatus};

#[derive(Parser, Debug)]
#[command(name = "serve")]
#[command(about = "Reservation server for leaflet distribution plans")]
struct Args {
    /// Listen address
    #[arg(short, long, default_value = "0.0.0.0:10000")]
    listen: String,

    /// Plan file produced by the plan binary
    #[arg(short, long, default_value = "data/streets_status.json")]
    data: PathBuf,
}

/// Application state shared across handlers
struct AppState {
    path: PathBuf,
    plan: RwLock<PlanOutput>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::DEBUG)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    let raw = std::fs::read_to_string(&args.data)
        .with_context(|| format!("Failed to read plan file {}", args.data.display()))?;
    let plan: PlanOutput = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse plan file {}", args.data.display()))?;

    info!(
        "Loaded {} distribution units for postal codes {:?}",
        plan.streets.len(),
        plan.metadata.postal_codes
    );

    let state = Arc::new(AppState {
        path: args.data,
        plan: RwLock::new(plan),
    });

    // Build router
    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/api/plan", get(plan_handler))
        .route("/api/update", post(update_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    info!("Starting server on {}", args.listen);

    let listener = tokio::net::TcpListener::bind(&args.listen).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let plan = state.plan.read().await;

    Json(HealthResponse {
        status: "ok",
        units: plan.streets.len(),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    units: usize,
}

/// Full plan document, as written by the planner plus any accepted updates
async fn plan_handler(State(state): State<Arc<AppState>>) -> Json<PlanOutput> {
    let plan = state.plan.read().await;

    Json(plan.clone())
}

/// Reservation update: set the status and user of one distribution unit
async fn update_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<UpdateRequest>,
) -> Result<Json<UpdateResponse>, (StatusCode, String)> {
    let mut plan = state.plan.write().await;

    let record = plan.streets.get_mut(&request.id).ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            format!("unknown street id: {}", request.id),
        )
    })?;
    record.status = request.status;
    record.user = request.user.clone();

    // Persist under the write lock so concurrent updates cannot interleave
    // between mutation and write-out.
    let json = serde_json::to_string_pretty(&*plan).map_err(|e| {
        tracing::error!("Plan serialization failed: {}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;
    tokio::fs::write(&state.path, json).await.map_err(|e| {
        tracing::error!("Plan write failed: {}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;

    info!(
        "Updated {} to {:?} (user: {:?})",
        request.id, request.status, request.user
    );

    Ok(Json(UpdateResponse { success: true }))
}

#[derive(Deserialize)]
struct UpdateRequest {
    /// Unit id as found in the plan document
    id: String,
    status: ReservationStatus,
    /// Volunteer name; empty releases the unit
    #[serde(default)]
    user: String,
}

#[derive(Serialize)]
struct UpdateResponse {
    success: bool,
}
