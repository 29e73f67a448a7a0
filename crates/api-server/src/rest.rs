//! REST handlers serving the computed dashboard tables.
//!
//! The presentation layer (cards, charts, prose) lives elsewhere; these
//! endpoints hand it finished tables as JSON. Filters arrive as query
//! parameters and are validated here at the API boundary.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use funnel_core::{CampaignSelector, DateRange, FilterQuery};
use funnel_metrics::engine::{
    CampaignRetention, CampaignRevenue, DailyInstalls, KpiSummary, StageTotal,
};
use funnel_metrics::{AbTestResult, ActivityReport, MetricsEngine};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::warn;

/// Shared application state for REST handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<MetricsEngine>,
    pub start_time: Instant,
}

/// Filter parameters accepted by the table endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct FilterParams {
    /// Campaign name, or "All" (the default).
    pub campaign: Option<String>,
    /// Inclusive range start, ISO date. Defaults to the dataset minimum.
    pub from: Option<NaiveDate>,
    /// Inclusive range end, ISO date. Defaults to the dataset maximum.
    pub to: Option<NaiveDate>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn bad_request(message: &str) -> ApiError {
    warn!(error = message, "Rejected dashboard query");
    metrics::counter!("api.validation_errors").increment(1);
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: "invalid_query".to_string(),
            message: message.to_string(),
        }),
    )
}

/// Resolve query parameters against the dataset's observed date bounds.
fn resolve_filter(state: &AppState, params: &FilterParams) -> Result<FilterQuery, ApiError> {
    let campaign = params
        .campaign
        .as_deref()
        .map(CampaignSelector::parse)
        .unwrap_or_default();

    let range = match state.engine.dataset().date_bounds() {
        Some((min, max)) => {
            let start = params.from.unwrap_or(min);
            let end = params.to.unwrap_or(max);
            if start > end {
                return Err(bad_request("'from' must not be after 'to'"));
            }
            Some(DateRange::new(start, end))
        }
        // Empty dataset: any range filters to the same empty view.
        None => None,
    };

    Ok(FilterQuery { campaign, range })
}

/// Everything the single page renders, in one payload.
#[derive(Serialize)]
pub struct DashboardResponse {
    pub campaigns: Vec<String>,
    pub date_bounds: Option<(NaiveDate, NaiveDate)>,
    pub kpis: KpiSummary,
    pub funnel: Vec<StageTotal>,
    pub revenue_by_campaign: Vec<CampaignRevenue>,
    pub retention_by_campaign: Vec<CampaignRetention>,
    pub daily_installs: Vec<DailyInstalls>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity: Option<ActivityReport>,
    pub ab_tests: Vec<AbTestResult>,
}

/// GET /v1/dashboard — the full dashboard payload.
pub async fn dashboard(
    State(state): State<AppState>,
    Query(params): Query<FilterParams>,
) -> Result<Json<DashboardResponse>, ApiError> {
    let query = resolve_filter(&state, &params)?;
    metrics::counter!("api.dashboard_requests").increment(1);

    let engine = &state.engine;
    Ok(Json(DashboardResponse {
        campaigns: engine.dataset().campaigns(),
        date_bounds: engine.dataset().date_bounds(),
        kpis: engine.kpi_summary(&query),
        funnel: engine.funnel(&query),
        revenue_by_campaign: engine.revenue_by_campaign(),
        retention_by_campaign: engine.retention_by_campaign(),
        daily_installs: engine.daily_installs(&query),
        activity: engine.activity(&query),
        ab_tests: engine.ab_test_suite(),
    }))
}

/// GET /v1/kpis — mean KPIs over the filtered view.
pub async fn kpis(
    State(state): State<AppState>,
    Query(params): Query<FilterParams>,
) -> Result<Json<KpiSummary>, ApiError> {
    let query = resolve_filter(&state, &params)?;
    Ok(Json(state.engine.kpi_summary(&query)))
}

/// GET /v1/funnel — stage totals in funnel order.
pub async fn funnel(
    State(state): State<AppState>,
    Query(params): Query<FilterParams>,
) -> Result<Json<Vec<StageTotal>>, ApiError> {
    let query = resolve_filter(&state, &params)?;
    Ok(Json(state.engine.funnel(&query)))
}

/// GET /v1/installs/daily — date-ordered install totals.
pub async fn daily_installs(
    State(state): State<AppState>,
    Query(params): Query<FilterParams>,
) -> Result<Json<Vec<DailyInstalls>>, ApiError> {
    let query = resolve_filter(&state, &params)?;
    Ok(Json(state.engine.daily_installs(&query)))
}

/// GET /v1/revenue — total revenue per campaign, full dataset.
pub async fn revenue(State(state): State<AppState>) -> Json<Vec<CampaignRevenue>> {
    Json(state.engine.revenue_by_campaign())
}

/// GET /v1/retention — day-7 retention per campaign, full dataset.
pub async fn retention(State(state): State<AppState>) -> Json<Vec<CampaignRetention>> {
    Json(state.engine.retention_by_campaign())
}

/// GET /v1/activity — DAU/MAU/stickiness report, when the module is enabled.
pub async fn activity(
    State(state): State<AppState>,
    Query(params): Query<FilterParams>,
) -> Result<Json<ActivityReport>, ApiError> {
    let query = resolve_filter(&state, &params)?;
    match state.engine.activity(&query) {
        Some(report) => Ok(Json(report)),
        None => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "activity_disabled".to_string(),
                message: "The activity module is disabled by configuration".to_string(),
            }),
        )),
    }
}

/// GET /v1/abtest — the four-metric significance table.
pub async fn abtest(State(state): State<AppState>) -> Json<Vec<AbTestResult>> {
    Json(state.engine.ab_test_suite())
}

/// GET /health — health check endpoint.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        dataset_rows: state.engine.dataset().len(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

/// GET /ready — readiness probe. The dataset is loaded before the server
/// starts, so readiness only confirms the process is serving.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    if state.start_time.elapsed().as_secs() > 0 {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// GET /live — liveness probe.
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub dataset_rows: usize,
    pub uptime_secs: u64,
}
