use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, MessageResponse};
use crate::db::{
    DepartmentInput, DepartmentPersonInput, RequestTypeInput, ServiceTypeInput, StatusInput,
    TypePersonInput, User,
};
use crate::domain::{Identity, Role};
use crate::entities::{
    department_persons, departments, request_types, service_types, statuses, type_persons,
};

#[derive(Deserialize)]
pub struct DepartmentPayload {
    pub name: String,
    pub description: Option<String>,
    pub cc_email: Option<String>,
}

impl From<DepartmentPayload> for DepartmentInput {
    fn from(p: DepartmentPayload) -> Self {
        Self {
            name: p.name,
            description: p.description,
            cc_email: p.cc_email,
        }
    }
}

#[derive(Deserialize)]
pub struct ServiceTypePayload {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub sequence: i32,
}

impl From<ServiceTypePayload> for ServiceTypeInput {
    fn from(p: ServiceTypePayload) -> Self {
        Self {
            name: p.name,
            description: p.description,
            sequence: p.sequence,
        }
    }
}

#[derive(Deserialize)]
pub struct RequestTypePayload {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub sequence: i32,
    pub service_type_id: i32,
    pub department_id: i32,
    pub default_priority: Option<String>,
}

impl From<RequestTypePayload> for RequestTypeInput {
    fn from(p: RequestTypePayload) -> Self {
        Self {
            name: p.name,
            description: p.description,
            sequence: p.sequence,
            service_type_id: p.service_type_id,
            department_id: p.department_id,
            default_priority: p.default_priority,
        }
    }
}

#[derive(Deserialize)]
pub struct StatusPayload {
    pub name: String,
    pub system_name: String,
    pub sequence: i32,
    pub description: Option<String>,
    #[serde(default)]
    pub is_open: bool,
    #[serde(default)]
    pub is_terminal: bool,
    #[serde(default)]
    pub is_allowed_for_technician: bool,
}

impl From<StatusPayload> for StatusInput {
    fn from(p: StatusPayload) -> Self {
        Self {
            name: p.name,
            system_name: p.system_name,
            sequence: p.sequence,
            description: p.description,
            is_open: p.is_open,
            is_terminal: p.is_terminal,
            is_allowed_for_technician: p.is_allowed_for_technician,
        }
    }
}

#[derive(Deserialize)]
pub struct DepartmentPersonPayload {
    pub department_id: i32,
    pub user_id: i32,
    #[serde(default)]
    pub is_hod: bool,
    pub from_date: String,
    pub to_date: Option<String>,
    pub description: Option<String>,
}

impl From<DepartmentPersonPayload> for DepartmentPersonInput {
    fn from(p: DepartmentPersonPayload) -> Self {
        Self {
            department_id: p.department_id,
            user_id: p.user_id,
            is_hod: p.is_hod,
            from_date: p.from_date,
            to_date: p.to_date,
            description: p.description,
        }
    }
}

#[derive(Deserialize)]
pub struct TypePersonPayload {
    pub request_type_id: i32,
    pub user_id: i32,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
    pub description: Option<String>,
}

impl From<TypePersonPayload> for TypePersonInput {
    fn from(p: TypePersonPayload) -> Self {
        Self {
            request_type_id: p.request_type_id,
            user_id: p.user_id,
            from_date: p.from_date,
            to_date: p.to_date,
            description: p.description,
        }
    }
}

#[derive(Deserialize)]
pub struct RolePayload {
    pub role: Role,
}

#[derive(Deserialize)]
pub struct RequestTypeQuery {
    pub service_type_id: Option<i32>,
}

#[derive(Deserialize)]
pub struct DepartmentPersonQuery {
    pub department_id: Option<i32>,
}

#[derive(Deserialize)]
pub struct TypePersonQuery {
    pub request_type_id: Option<i32>,
}

/// Request type with its owning department joined in.
#[derive(Serialize)]
pub struct RequestTypeDto {
    #[serde(flatten)]
    pub request_type: request_types::Model,
    pub department: Option<departments::Model>,
}

// --- Departments ---

pub async fn list_departments(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<departments::Model>>>, ApiError> {
    let departments = state.master_data_service().list_departments().await?;
    Ok(Json(ApiResponse::success(departments)))
}

pub async fn create_department(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<DepartmentPayload>,
) -> Result<Json<ApiResponse<departments::Model>>, ApiError> {
    let department = state
        .master_data_service()
        .create_department(&identity, payload.into())
        .await?;
    Ok(Json(ApiResponse::success(department)))
}

pub async fn update_department(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i32>,
    Json(payload): Json<DepartmentPayload>,
) -> Result<Json<ApiResponse<departments::Model>>, ApiError> {
    let department = state
        .master_data_service()
        .update_department(&identity, id, payload.into())
        .await?;
    Ok(Json(ApiResponse::success(department)))
}

pub async fn delete_department(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state
        .master_data_service()
        .delete_department(&identity, id)
        .await?;
    Ok(Json(ApiResponse::success(MessageResponse::new("Deleted"))))
}

// --- Service types ---

pub async fn list_service_types(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<service_types::Model>>>, ApiError> {
    let types = state.master_data_service().list_service_types().await?;
    Ok(Json(ApiResponse::success(types)))
}

pub async fn create_service_type(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<ServiceTypePayload>,
) -> Result<Json<ApiResponse<service_types::Model>>, ApiError> {
    let service_type = state
        .master_data_service()
        .create_service_type(&identity, payload.into())
        .await?;
    Ok(Json(ApiResponse::success(service_type)))
}

pub async fn update_service_type(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i32>,
    Json(payload): Json<ServiceTypePayload>,
) -> Result<Json<ApiResponse<service_types::Model>>, ApiError> {
    let service_type = state
        .master_data_service()
        .update_service_type(&identity, id, payload.into())
        .await?;
    Ok(Json(ApiResponse::success(service_type)))
}

pub async fn delete_service_type(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state
        .master_data_service()
        .delete_service_type(&identity, id)
        .await?;
    Ok(Json(ApiResponse::success(MessageResponse::new("Deleted"))))
}

// --- Request types ---

pub async fn list_request_types(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RequestTypeQuery>,
) -> Result<Json<ApiResponse<Vec<RequestTypeDto>>>, ApiError> {
    let types = state
        .master_data_service()
        .list_request_types(query.service_type_id)
        .await?;

    let dtos = types
        .into_iter()
        .map(|(request_type, department)| RequestTypeDto {
            request_type,
            department,
        })
        .collect();

    Ok(Json(ApiResponse::success(dtos)))
}

pub async fn create_request_type(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<RequestTypePayload>,
) -> Result<Json<ApiResponse<request_types::Model>>, ApiError> {
    let request_type = state
        .master_data_service()
        .create_request_type(&identity, payload.into())
        .await?;
    Ok(Json(ApiResponse::success(request_type)))
}

pub async fn update_request_type(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i32>,
    Json(payload): Json<RequestTypePayload>,
) -> Result<Json<ApiResponse<request_types::Model>>, ApiError> {
    let request_type = state
        .master_data_service()
        .update_request_type(&identity, id, payload.into())
        .await?;
    Ok(Json(ApiResponse::success(request_type)))
}

pub async fn delete_request_type(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state
        .master_data_service()
        .delete_request_type(&identity, id)
        .await?;
    Ok(Json(ApiResponse::success(MessageResponse::new("Deleted"))))
}

// --- Statuses ---

pub async fn list_statuses(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<statuses::Model>>>, ApiError> {
    let statuses = state.master_data_service().list_statuses().await?;
    Ok(Json(ApiResponse::success(statuses)))
}

pub async fn create_status(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<StatusPayload>,
) -> Result<Json<ApiResponse<statuses::Model>>, ApiError> {
    let status = state
        .master_data_service()
        .create_status(&identity, payload.into())
        .await?;
    Ok(Json(ApiResponse::success(status)))
}

pub async fn update_status(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i32>,
    Json(payload): Json<StatusPayload>,
) -> Result<Json<ApiResponse<statuses::Model>>, ApiError> {
    let status = state
        .master_data_service()
        .update_status(&identity, id, payload.into())
        .await?;
    Ok(Json(ApiResponse::success(status)))
}

pub async fn delete_status(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state
        .master_data_service()
        .delete_status(&identity, id)
        .await?;
    Ok(Json(ApiResponse::success(MessageResponse::new("Deleted"))))
}

// --- Department staff ---

pub async fn list_department_persons(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DepartmentPersonQuery>,
) -> Result<Json<ApiResponse<Vec<department_persons::Model>>>, ApiError> {
    let persons = state
        .master_data_service()
        .list_department_persons(query.department_id)
        .await?;
    Ok(Json(ApiResponse::success(persons)))
}

pub async fn create_department_person(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<DepartmentPersonPayload>,
) -> Result<Json<ApiResponse<department_persons::Model>>, ApiError> {
    let person = state
        .master_data_service()
        .create_department_person(&identity, payload.into())
        .await?;
    Ok(Json(ApiResponse::success(person)))
}

pub async fn update_department_person(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i32>,
    Json(payload): Json<DepartmentPersonPayload>,
) -> Result<Json<ApiResponse<department_persons::Model>>, ApiError> {
    let person = state
        .master_data_service()
        .update_department_person(&identity, id, payload.into())
        .await?;
    Ok(Json(ApiResponse::success(person)))
}

pub async fn delete_department_person(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state
        .master_data_service()
        .delete_department_person(&identity, id)
        .await?;
    Ok(Json(ApiResponse::success(MessageResponse::new("Deleted"))))
}

// --- Request type rosters ---

pub async fn list_type_persons(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TypePersonQuery>,
) -> Result<Json<ApiResponse<Vec<type_persons::Model>>>, ApiError> {
    let persons = state
        .master_data_service()
        .list_type_persons(query.request_type_id)
        .await?;
    Ok(Json(ApiResponse::success(persons)))
}

pub async fn create_type_person(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<TypePersonPayload>,
) -> Result<Json<ApiResponse<type_persons::Model>>, ApiError> {
    let person = state
        .master_data_service()
        .create_type_person(&identity, payload.into())
        .await?;
    Ok(Json(ApiResponse::success(person)))
}

pub async fn update_type_person(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i32>,
    Json(payload): Json<TypePersonPayload>,
) -> Result<Json<ApiResponse<type_persons::Model>>, ApiError> {
    let person = state
        .master_data_service()
        .update_type_person(&identity, id, payload.into())
        .await?;
    Ok(Json(ApiResponse::success(person)))
}

pub async fn delete_type_person(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state
        .master_data_service()
        .delete_type_person(&identity, id)
        .await?;
    Ok(Json(ApiResponse::success(MessageResponse::new("Deleted"))))
}

// --- Profiles ---

pub async fn list_profiles(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<User>>>, ApiError> {
    let profiles = state.master_data_service().list_profiles().await?;
    Ok(Json(ApiResponse::success(profiles)))
}

pub async fn set_user_role(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i32>,
    Json(payload): Json<RolePayload>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let user = state
        .master_data_service()
        .set_user_role(&identity, id, payload.role)
        .await?;

    tracing::info!("User {} role set to {} by {}", id, payload.role, identity.email);

    Ok(Json(ApiResponse::success(user)))
}
