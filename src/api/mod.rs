use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::db::Store;
use crate::services::{AnalyticsService, AuthService, MasterDataService, RequestService};
use crate::state::SharedState;

pub mod analytics;
pub mod auth;
mod error;
pub mod master_data;
pub mod requests;
mod types;

pub use error::ApiError;
pub use types::*;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &Store {
        &self.shared.store
    }

    #[must_use]
    pub fn auth_service(&self) -> &Arc<dyn AuthService> {
        &self.shared.auth_service
    }

    #[must_use]
    pub fn request_service(&self) -> &Arc<dyn RequestService> {
        &self.shared.request_service
    }

    #[must_use]
    pub fn master_data_service(&self) -> &Arc<dyn MasterDataService> {
        &self.shared.master_data_service
    }

    #[must_use]
    pub fn analytics_service(&self) -> &Arc<dyn AnalyticsService> {
        &self.shared.analytics_service
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors_origins = state.config().server.cors_allowed_origins.clone();

    let protected_routes = create_protected_router(state.clone());

    let api_router = Router::new()
        .merge(protected_routes)
        .route("/health", get(health))
        .route("/auth/login", post(auth::login))
        .route("/auth/register", post(auth::register))
        .route("/auth/logout", post(auth::logout))
        .with_state(state);

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}

/// GET /health: liveness check, verifies the database connection.
async fn health(
    axum::extract::State(state): axum::extract::State<Arc<AppState>>,
) -> Result<axum::Json<MessageResponse>, ApiError> {
    state.store().ping().await?;
    Ok(axum::Json(MessageResponse::new("ok")))
}

fn create_protected_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/me", get(auth::get_current_user))
        .route("/auth/password", put(auth::change_password))
        .route("/requests", get(requests::list_requests))
        .route("/requests", post(requests::create_request))
        .route("/requests/{id}", get(requests::get_request))
        .route("/requests/{id}/replies", post(requests::add_reply))
        .route("/requests/{id}/assign", post(requests::assign_technician))
        .route("/requests/{id}/approval", put(requests::record_approval))
        .route("/requests/{id}/status", put(requests::change_status))
        .route(
            "/departments/{id}/technicians",
            get(requests::list_department_technicians),
        )
        .route("/departments", get(master_data::list_departments))
        .route("/departments", post(master_data::create_department))
        .route("/departments/{id}", put(master_data::update_department))
        .route("/departments/{id}", delete(master_data::delete_department))
        .route("/service-types", get(master_data::list_service_types))
        .route("/service-types", post(master_data::create_service_type))
        .route("/service-types/{id}", put(master_data::update_service_type))
        .route(
            "/service-types/{id}",
            delete(master_data::delete_service_type),
        )
        .route("/request-types", get(master_data::list_request_types))
        .route("/request-types", post(master_data::create_request_type))
        .route("/request-types/{id}", put(master_data::update_request_type))
        .route(
            "/request-types/{id}",
            delete(master_data::delete_request_type),
        )
        .route("/statuses", get(master_data::list_statuses))
        .route("/statuses", post(master_data::create_status))
        .route("/statuses/{id}", put(master_data::update_status))
        .route("/statuses/{id}", delete(master_data::delete_status))
        .route(
            "/department-persons",
            get(master_data::list_department_persons),
        )
        .route(
            "/department-persons",
            post(master_data::create_department_person),
        )
        .route(
            "/department-persons/{id}",
            put(master_data::update_department_person),
        )
        .route(
            "/department-persons/{id}",
            delete(master_data::delete_department_person),
        )
        .route("/type-persons", get(master_data::list_type_persons))
        .route("/type-persons", post(master_data::create_type_person))
        .route("/type-persons/{id}", put(master_data::update_type_person))
        .route(
            "/type-persons/{id}",
            delete(master_data::delete_type_person),
        )
        .route("/profiles", get(master_data::list_profiles))
        .route("/profiles/{id}/role", put(master_data::set_user_role))
        .route("/analytics/stats", get(analytics::get_stats))
        .route("/analytics/trends", get(analytics::get_trends))
        .route(
            "/analytics/status-distribution",
            get(analytics::get_status_distribution),
        )
        .route(
            "/analytics/department-load",
            get(analytics::get_department_load),
        )
        .route("/analytics/export", get(analytics::export_csv))
        .route_layer(middleware::from_fn_with_state(state, auth::auth_middleware))
}
