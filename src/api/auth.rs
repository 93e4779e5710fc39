use axum::{
    Json,
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, MessageResponse};
use crate::domain::Identity;
use crate::services::LoginResult;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Authentication middleware: resolves the bearer token to an
/// [`Identity`] and attaches it as a request extension. Anything less
/// than a valid, unexpired token for a live account is a 401.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(&headers)
        .ok_or_else(|| ApiError::Unauthorized("Missing bearer token".to_string()))?;

    let identity = state
        .auth_service()
        .current_user(&token)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid or expired token".to_string()))?;

    tracing::Span::current().record("user_id", identity.id);

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let auth_header = headers.get("Authorization")?;
    let auth_str = auth_header.to_str().ok()?;
    let token = auth_str.strip_prefix("Bearer ")?;
    Some(token.trim().to_string())
}

/// POST /auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResult>>, ApiError> {
    if payload.email.is_empty() {
        return Err(ApiError::validation("Email is required"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }

    let result = state
        .auth_service()
        .login(&payload.email, &payload.password)
        .await?;

    tracing::info!("User logged in: {}", result.user.email);

    Ok(Json(ApiResponse::success(result)))
}

/// POST /auth/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<ApiResponse<LoginResult>>, ApiError> {
    let result = state
        .auth_service()
        .register(&payload.email, &payload.name, &payload.password)
        .await?;

    tracing::info!("User registered: {}", result.user.email);

    Ok(Json(ApiResponse::success(result)))
}

/// POST /auth/logout
///
/// Sessions are stateless tokens, so there is nothing to revoke server
/// side; the client discards its copy.
pub async fn logout() -> impl IntoResponse {
    (StatusCode::OK, "Logged out")
}

/// GET /auth/me
pub async fn get_current_user(
    axum::Extension(identity): axum::Extension<Identity>,
) -> Json<ApiResponse<Identity>> {
    Json(ApiResponse::success(identity))
}

/// PUT /auth/password
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    axum::Extension(identity): axum::Extension<Identity>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state
        .auth_service()
        .change_password(
            identity.id,
            &payload.current_password,
            &payload.new_password,
        )
        .await?;

    tracing::info!("Password changed for user: {}", identity.email);

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Password updated successfully",
    ))))
}
