use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "service_requests")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Human-readable ticket number (REQ-YYYY-NNN), distinct from `id`
    #[sea_orm(unique)]
    pub request_no: String,

    pub title: String,

    pub description: String,

    /// One of: Low, Medium, High
    pub priority: String,

    pub status_id: i32,

    /// Set whenever the status changes; used for time-to-resolution
    pub status_changed_at: Option<String>,

    /// Immutable after creation
    pub requester_id: i32,

    pub request_type_id: i32,

    pub assignee_id: Option<i32>,

    pub assigned_at: Option<String>,

    pub assigned_by_id: Option<i32>,

    pub assigned_note: Option<String>,

    /// One of: Approved, Rejected; unset until a decision is recorded
    pub approval_status: Option<String>,

    pub approval_at: Option<String>,

    pub approval_by_id: Option<i32>,

    pub approval_note: Option<String>,

    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
