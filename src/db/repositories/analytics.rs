use std::collections::HashMap;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};

use crate::entities::{prelude::*, service_requests, statuses};

use super::request::UserRef;

pub struct AnalyticsRepository {
    conn: DatabaseConnection,
}

impl AnalyticsRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Requests created within the optional `[from, to]` bounds, oldest
    /// first.
    ///
    /// Timestamps are stored as RFC3339 UTC strings, so lexicographic
    /// comparison matches chronological order.
    pub async fn requests_in_range(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<service_requests::Model>> {
        let mut query = ServiceRequests::find();

        if let Some(from) = from {
            query = query.filter(service_requests::Column::CreatedAt.gte(from.to_rfc3339()));
        }
        if let Some(to) = to {
            query = query.filter(service_requests::Column::CreatedAt.lte(to.to_rfc3339()));
        }

        query
            .order_by_asc(service_requests::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("Failed to query requests in range")
    }

    pub async fn all_statuses(&self) -> Result<Vec<statuses::Model>> {
        Statuses::find()
            .order_by_asc(statuses::Column::Sequence)
            .all(&self.conn)
            .await
            .context("Failed to query statuses")
    }

    /// request_type_id -> (type name, department_id)
    pub async fn type_departments(&self) -> Result<HashMap<i32, (String, i32)>> {
        let types = RequestTypes::find()
            .all(&self.conn)
            .await
            .context("Failed to query request types")?;
        Ok(types
            .into_iter()
            .map(|t| (t.id, (t.name, t.department_id)))
            .collect())
    }

    pub async fn department_names(&self) -> Result<HashMap<i32, String>> {
        let departments = Departments::find()
            .all(&self.conn)
            .await
            .context("Failed to query departments")?;
        Ok(departments.into_iter().map(|d| (d.id, d.name)).collect())
    }

    pub async fn users_by_id(&self) -> Result<HashMap<i32, UserRef>> {
        let users = Users::find()
            .all(&self.conn)
            .await
            .context("Failed to query users")?;
        Ok(users
            .into_iter()
            .map(|u| (u.id, UserRef::from(u)))
            .collect())
    }
}
