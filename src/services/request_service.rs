//! Domain service for the service-request lifecycle: creation, listing,
//! replies, assignment, and status changes.

use thiserror::Error;

use crate::db::{RequestDetail, RequestSummary, UserRef};
use crate::domain::{ApprovalDecision, Identity};
use crate::entities::replies;

/// Errors specific to request lifecycle operations.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Request not found")]
    NotFound,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Validation failed on {field}: {reason}")]
    Validation { field: String, reason: String },

    /// No statuses are configured, so a new request has no starting state.
    #[error("No default status configured")]
    DefaultStatusMissing,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl RequestError {
    pub fn validation(field: &str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<sea_orm::DbErr> for RequestError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for RequestError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct CreateRequestInput {
    pub request_type_id: i32,
    pub title: String,
    pub description: String,
    /// Falls back to the request type's default, then Medium.
    pub priority: Option<String>,
}

/// Domain service trait for the request lifecycle.
#[async_trait::async_trait]
pub trait RequestService: Send + Sync {
    /// Creates a request owned by the caller, in the default status, with
    /// a freshly allocated request number.
    async fn create_request(
        &self,
        identity: &Identity,
        input: CreateRequestInput,
    ) -> Result<RequestDetail, RequestError>;

    /// Requests visible to the caller: requestors see their own,
    /// technicians see their assignments, hod and admin see everything.
    async fn list_requests(&self, identity: &Identity)
    -> Result<Vec<RequestSummary>, RequestError>;

    /// Full request view. Readable by any authenticated user who knows
    /// the id; requests are shared by direct link.
    async fn get_request_detail(
        &self,
        identity: &Identity,
        request_id: i32,
    ) -> Result<RequestDetail, RequestError>;

    /// Appends a reply stamped with the request's current status. Does
    /// not change the status.
    async fn add_reply(
        &self,
        identity: &Identity,
        request_id: i32,
        body: &str,
    ) -> Result<replies::Model, RequestError>;

    /// Assigns a technician (hod/admin only) and records the action as a
    /// reply. Reassigning the same technician is a no-op on the assignee
    /// but still appends a reply.
    async fn assign_technician(
        &self,
        identity: &Identity,
        request_id: i32,
        technician_id: i32,
        note: Option<String>,
    ) -> Result<RequestDetail, RequestError>;

    /// Records an approval decision (hod/admin only) on an open request
    /// and logs it as a reply. A later decision overwrites an earlier one.
    async fn record_approval(
        &self,
        identity: &Identity,
        request_id: i32,
        decision: ApprovalDecision,
        note: Option<String>,
    ) -> Result<RequestDetail, RequestError>;

    /// Moves a request to a new status under the transition rules and
    /// records the change as a reply stamped with the new status.
    async fn change_status(
        &self,
        identity: &Identity,
        request_id: i32,
        status_id: i32,
    ) -> Result<RequestDetail, RequestError>;

    /// Users staffed in a department, for the assignment picker.
    async fn list_department_technicians(
        &self,
        identity: &Identity,
        department_id: i32,
    ) -> Result<Vec<UserRef>, RequestError>;
}
