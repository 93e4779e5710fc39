use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A request template belonging to one department and one service type.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "request_types")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,

    pub description: Option<String>,

    pub sequence: i32,

    pub service_type_id: i32,

    pub department_id: i32,

    /// Pre-selected priority when creating a request of this type
    pub default_priority: Option<String>,

    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
