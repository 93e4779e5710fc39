use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState};
use crate::db::{RequestDetail, RequestSummary, UserRef};
use crate::domain::{ApprovalDecision, Identity};
use crate::entities::replies;
use crate::services::CreateRequestInput;

#[derive(Deserialize)]
pub struct CreateRequestPayload {
    pub request_type_id: i32,
    pub title: String,
    pub description: String,
    pub priority: Option<String>,
}

#[derive(Deserialize)]
pub struct ReplyPayload {
    pub body: String,
}

#[derive(Deserialize)]
pub struct AssignPayload {
    pub technician_id: i32,
    pub note: Option<String>,
}

#[derive(Deserialize)]
pub struct StatusPayload {
    pub status_id: i32,
}

#[derive(Deserialize)]
pub struct ApprovalPayload {
    pub decision: ApprovalDecision,
    pub note: Option<String>,
}

/// GET /requests
pub async fn list_requests(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<ApiResponse<Vec<RequestSummary>>>, ApiError> {
    let requests = state.request_service().list_requests(&identity).await?;
    Ok(Json(ApiResponse::success(requests)))
}

/// POST /requests
pub async fn create_request(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<CreateRequestPayload>,
) -> Result<Json<ApiResponse<RequestDetail>>, ApiError> {
    let detail = state
        .request_service()
        .create_request(
            &identity,
            CreateRequestInput {
                request_type_id: payload.request_type_id,
                title: payload.title,
                description: payload.description,
                priority: payload.priority,
            },
        )
        .await?;

    tracing::info!("Request {} created by {}", detail.request_no, identity.email);

    Ok(Json(ApiResponse::success(detail)))
}

/// GET /requests/{id}
pub async fn get_request(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<RequestDetail>>, ApiError> {
    let detail = state
        .request_service()
        .get_request_detail(&identity, id)
        .await?;
    Ok(Json(ApiResponse::success(detail)))
}

/// POST /requests/{id}/replies
pub async fn add_reply(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i32>,
    Json(payload): Json<ReplyPayload>,
) -> Result<Json<ApiResponse<replies::Model>>, ApiError> {
    let reply = state
        .request_service()
        .add_reply(&identity, id, &payload.body)
        .await?;
    Ok(Json(ApiResponse::success(reply)))
}

/// POST /requests/{id}/assign
pub async fn assign_technician(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i32>,
    Json(payload): Json<AssignPayload>,
) -> Result<Json<ApiResponse<RequestDetail>>, ApiError> {
    let detail = state
        .request_service()
        .assign_technician(&identity, id, payload.technician_id, payload.note)
        .await?;

    tracing::info!(
        "Request {} assigned to user {} by {}",
        detail.request_no,
        payload.technician_id,
        identity.email
    );

    Ok(Json(ApiResponse::success(detail)))
}

/// PUT /requests/{id}/approval
pub async fn record_approval(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i32>,
    Json(payload): Json<ApprovalPayload>,
) -> Result<Json<ApiResponse<RequestDetail>>, ApiError> {
    let detail = state
        .request_service()
        .record_approval(&identity, id, payload.decision, payload.note)
        .await?;

    tracing::info!(
        "Request {} marked {} by {}",
        detail.request_no,
        payload.decision,
        identity.email
    );

    Ok(Json(ApiResponse::success(detail)))
}

/// PUT /requests/{id}/status
pub async fn change_status(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i32>,
    Json(payload): Json<StatusPayload>,
) -> Result<Json<ApiResponse<RequestDetail>>, ApiError> {
    let detail = state
        .request_service()
        .change_status(&identity, id, payload.status_id)
        .await?;

    tracing::info!(
        "Request {} moved to {} by {}",
        detail.request_no,
        detail.status_name,
        identity.email
    );

    Ok(Json(ApiResponse::success(detail)))
}

/// GET /departments/{id}/technicians
pub async fn list_department_technicians(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<UserRef>>>, ApiError> {
    let users = state
        .request_service()
        .list_department_technicians(&identity, id)
        .await?;
    Ok(Json(ApiResponse::success(users)))
}
