//! Query server for regional business analysis.
//!
//! Loads the imported registry from the store once at startup and answers
//! region selections (polygon, circle, square) with the businesses inside,
//! their concentration summary, and the outline to draw.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use clap::Parser;
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use segmenta::config::Config;
use segmenta::dataset::{dataset_overview, BusinessStore};
use segmenta::models::DatasetOverview;
use segmenta::region::RegionService;

mod regions;
use regions::{
    execute_batch, execute_circle, execute_region, execute_square, ApiError, BatchRequest,
    BatchResponse, CircleParams, FilterParams, RegionRequest, SquareParams,
};

#[derive(Parser, Debug)]
#[command(name = "query")]
#[command(about = "Regional business analysis server")]
struct Args {
    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address (overrides config)
    #[arg(short, long)]
    listen: Option<String>,

    /// Store directory (overrides config)
    #[arg(long)]
    store: Option<PathBuf>,

    /// Default number of records per region response (overrides config)
    #[arg(long)]
    record_limit: Option<usize>,
}

/// Application state shared across handlers
struct AppState {
    service: RegionService,
    record_limit: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::load_or_default(args.config.as_deref())?;
    if let Some(listen) = args.listen {
        config.server.listen = listen;
    }
    if let Some(store) = args.store {
        config.store.path = store;
    }
    if let Some(limit) = args.record_limit {
        config.server.record_limit = limit;
    }

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.server.log_filter))
        .context("Invalid log filter")?;
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Segmenta Query Server");

    let store = BusinessStore::open(&config.store.path)
        .with_context(|| format!("Failed to open store at {}", config.store.path.display()))?;
    if let Some(meta) = store.metadata()? {
        info!(
            "Dataset imported {} from {:?} ({} units)",
            meta.imported_at, meta.sources, meta.units
        );
    }
    let records = store.load_records().context("Failed to load records")?;

    let service =
        RegionService::new(records).with_circle_segments(config.geometry.circle_segments);

    let state = Arc::new(AppState {
        service,
        record_limit: config.server.record_limit,
    });

    // Build router
    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/v1/overview", get(overview_handler))
        .route("/v1/region", post(region_handler))
        .route("/v1/region/circle", get(circle_handler))
        .route("/v1/region/square", get(square_handler))
        .route("/v1/region/batch", post(batch_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    info!("Starting server on {}", config.server.listen);

    let listener = tokio::net::TcpListener::bind(&config.server.listen).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        records: state.service.records().len(),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    records: usize,
}

/// Dataset overview, optionally restricted by attributes
async fn overview_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FilterParams>,
) -> Result<Json<DatasetOverview>, ApiError> {
    let filter = params.to_filter()?;
    let overview = dataset_overview(filter.apply(state.service.records()));
    Ok(Json(overview))
}

/// Analyze an arbitrary region
async fn region_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegionRequest>,
) -> Result<Response, ApiError> {
    let response = execute_region(&state.service, &request, state.record_limit)?;
    Ok(Json(response).into_response())
}

/// Circle around a point
async fn circle_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CircleParams>,
) -> Result<Response, ApiError> {
    let response = execute_circle(&state.service, &params, state.record_limit)?;
    Ok(Json(response).into_response())
}

/// Square centered on a point
async fn square_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SquareParams>,
) -> Result<Response, ApiError> {
    let response = execute_square(&state.service, &params, state.record_limit)?;
    Ok(Json(response).into_response())
}

/// Summaries for several regions at once
async fn batch_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<BatchRequest>,
) -> Result<Json<BatchResponse>, ApiError> {
    Ok(Json(execute_batch(&state.service, &request)?))
}
