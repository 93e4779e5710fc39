use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Staff assignment: marks a user as staff (or head) of a department
/// for a date range.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "department_persons")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub department_id: i32,

    pub user_id: i32,

    pub is_hod: bool,

    pub from_date: String,

    pub to_date: Option<String>,

    pub description: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
