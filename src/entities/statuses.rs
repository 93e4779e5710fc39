use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lifecycle state for service requests. Statuses are totally ordered by
/// `sequence`; the lowest-sequence status is the default for new requests.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "statuses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,

    #[sea_orm(unique)]
    pub system_name: String,

    pub sequence: i32,

    pub description: Option<String>,

    pub is_open: bool,

    /// No further action required: terminal states (Resolved, Closed)
    pub is_terminal: bool,

    /// Whether a technician may move a request into this status
    pub is_allowed_for_technician: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
