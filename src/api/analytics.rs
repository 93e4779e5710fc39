use axum::{
    Extension, Json,
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState};
use crate::domain::Identity;
use crate::services::{DateRange, DepartmentCount, Stats, StatusCount, TrendPoint};

/// Optional `from`/`to` RFC3339 bounds on request creation time.
#[derive(Deserialize)]
pub struct RangeQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

impl RangeQuery {
    fn into_range(self) -> Result<DateRange, ApiError> {
        Ok(DateRange {
            from: self.from.as_deref().map(parse_bound).transpose()?,
            to: self.to.as_deref().map(parse_bound).transpose()?,
        })
    }
}

fn parse_bound(value: &str) -> Result<DateTime<Utc>, ApiError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| ApiError::validation(format!("Invalid RFC3339 timestamp: {value}")))
}

/// GET /analytics/stats
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<ApiResponse<Stats>>, ApiError> {
    let range = query.into_range()?;
    let stats = state.analytics_service().stats(&identity, range).await?;
    Ok(Json(ApiResponse::success(stats)))
}

/// GET /analytics/trends
pub async fn get_trends(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<ApiResponse<Vec<TrendPoint>>>, ApiError> {
    let range = query.into_range()?;
    let trends = state
        .analytics_service()
        .monthly_trends(&identity, range)
        .await?;
    Ok(Json(ApiResponse::success(trends)))
}

/// GET /analytics/status-distribution
pub async fn get_status_distribution(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<ApiResponse<Vec<StatusCount>>>, ApiError> {
    let range = query.into_range()?;
    let distribution = state
        .analytics_service()
        .status_distribution(&identity, range)
        .await?;
    Ok(Json(ApiResponse::success(distribution)))
}

/// GET /analytics/department-load
pub async fn get_department_load(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<ApiResponse<Vec<DepartmentCount>>>, ApiError> {
    let range = query.into_range()?;
    let load = state
        .analytics_service()
        .department_load(&identity, range)
        .await?;
    Ok(Json(ApiResponse::success(load)))
}

/// GET /analytics/export
///
/// Streams the filtered request set as a CSV attachment rather than the
/// JSON envelope.
pub async fn export_csv(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<RangeQuery>,
) -> Result<Response, ApiError> {
    let range = query.into_range()?;
    let csv = state
        .analytics_service()
        .export_csv(&identity, range)
        .await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"requests.csv\"",
            ),
        ],
        csv,
    )
        .into_response())
}
