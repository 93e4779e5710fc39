use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Append-only activity entry on a service request. `status_id` is the
/// status in effect when the reply was written, not necessarily the
/// request's current status.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "replies")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub request_id: i32,

    pub user_id: i32,

    pub body: String,

    pub status_id: i32,

    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
