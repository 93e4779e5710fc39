use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Assignable-technician roster entry for a request type.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "type_persons")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub request_type_id: i32,

    pub user_id: i32,

    pub from_date: Option<String>,

    pub to_date: Option<String>,

    pub description: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
