//! Domain service for configurable master data: departments, service
//! types, request types, statuses, and staffing rows.

use thiserror::Error;

use crate::db::{
    DepartmentInput, DepartmentPersonInput, RequestTypeInput, ServiceTypeInput, StatusInput,
    TypePersonInput, User,
};
use crate::domain::{Identity, Role};
use crate::entities::{
    department_persons, departments, request_types, service_types, statuses, type_persons,
};

/// Errors specific to master-data operations.
#[derive(Debug, Error)]
pub enum MasterDataError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Not found")]
    NotFound,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for MasterDataError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for MasterDataError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Domain service trait for master data. Reads are open to any
/// authenticated user; every mutation requires the admin role.
#[async_trait::async_trait]
pub trait MasterDataService: Send + Sync {
    async fn list_departments(&self) -> Result<Vec<departments::Model>, MasterDataError>;
    async fn create_department(
        &self,
        identity: &Identity,
        input: DepartmentInput,
    ) -> Result<departments::Model, MasterDataError>;
    async fn update_department(
        &self,
        identity: &Identity,
        id: i32,
        input: DepartmentInput,
    ) -> Result<departments::Model, MasterDataError>;
    async fn delete_department(&self, identity: &Identity, id: i32)
    -> Result<(), MasterDataError>;

    async fn list_service_types(&self) -> Result<Vec<service_types::Model>, MasterDataError>;
    async fn create_service_type(
        &self,
        identity: &Identity,
        input: ServiceTypeInput,
    ) -> Result<service_types::Model, MasterDataError>;
    async fn update_service_type(
        &self,
        identity: &Identity,
        id: i32,
        input: ServiceTypeInput,
    ) -> Result<service_types::Model, MasterDataError>;
    async fn delete_service_type(
        &self,
        identity: &Identity,
        id: i32,
    ) -> Result<(), MasterDataError>;

    async fn list_request_types(
        &self,
        service_type_id: Option<i32>,
    ) -> Result<Vec<(request_types::Model, Option<departments::Model>)>, MasterDataError>;
    async fn create_request_type(
        &self,
        identity: &Identity,
        input: RequestTypeInput,
    ) -> Result<request_types::Model, MasterDataError>;
    async fn update_request_type(
        &self,
        identity: &Identity,
        id: i32,
        input: RequestTypeInput,
    ) -> Result<request_types::Model, MasterDataError>;
    async fn delete_request_type(
        &self,
        identity: &Identity,
        id: i32,
    ) -> Result<(), MasterDataError>;

    async fn list_statuses(&self) -> Result<Vec<statuses::Model>, MasterDataError>;
    async fn create_status(
        &self,
        identity: &Identity,
        input: StatusInput,
    ) -> Result<statuses::Model, MasterDataError>;
    async fn update_status(
        &self,
        identity: &Identity,
        id: i32,
        input: StatusInput,
    ) -> Result<statuses::Model, MasterDataError>;
    async fn delete_status(&self, identity: &Identity, id: i32) -> Result<(), MasterDataError>;

    async fn list_department_persons(
        &self,
        department_id: Option<i32>,
    ) -> Result<Vec<department_persons::Model>, MasterDataError>;
    async fn create_department_person(
        &self,
        identity: &Identity,
        input: DepartmentPersonInput,
    ) -> Result<department_persons::Model, MasterDataError>;
    async fn update_department_person(
        &self,
        identity: &Identity,
        id: i32,
        input: DepartmentPersonInput,
    ) -> Result<department_persons::Model, MasterDataError>;
    async fn delete_department_person(
        &self,
        identity: &Identity,
        id: i32,
    ) -> Result<(), MasterDataError>;

    async fn list_type_persons(
        &self,
        request_type_id: Option<i32>,
    ) -> Result<Vec<type_persons::Model>, MasterDataError>;
    async fn create_type_person(
        &self,
        identity: &Identity,
        input: TypePersonInput,
    ) -> Result<type_persons::Model, MasterDataError>;
    async fn update_type_person(
        &self,
        identity: &Identity,
        id: i32,
        input: TypePersonInput,
    ) -> Result<type_persons::Model, MasterDataError>;
    async fn delete_type_person(
        &self,
        identity: &Identity,
        id: i32,
    ) -> Result<(), MasterDataError>;

    /// All user profiles, for admin pickers.
    async fn list_profiles(&self) -> Result<Vec<User>, MasterDataError>;

    /// Changes a user's role (admin only).
    async fn set_user_role(
        &self,
        identity: &Identity,
        user_id: i32,
        role: Role,
    ) -> Result<User, MasterDataError>;
}
