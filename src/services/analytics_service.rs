//! Domain service for reporting: headline stats, trends, distributions,
//! and CSV export. Every operation is restricted to admin and hod.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Identity;

/// Errors specific to analytics operations.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AnalyticsError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AnalyticsError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Optional creation-time window; either bound may be open.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct DateRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Stats {
    pub total_requests: u64,
    pub pending_count: u64,
    pub resolved_count: u64,
    /// Mean hours from creation to the last status change over resolved
    /// requests, rounded to one decimal. 0.0 when nothing is resolved.
    pub avg_resolution_hours: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TrendPoint {
    pub bucket: String,
    pub total: u64,
    pub resolved: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusCount {
    pub status: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DepartmentCount {
    pub department: String,
    pub count: u64,
}

/// Domain service trait for analytics.
#[async_trait::async_trait]
pub trait AnalyticsService: Send + Sync {
    /// Headline counters over the filtered request set.
    async fn stats(&self, identity: &Identity, range: DateRange)
    -> Result<Stats, AnalyticsError>;

    /// Created/resolved counts bucketed by day (ranges up to 31 days) or
    /// by calendar month. Default range: five months back through the end
    /// of the current month.
    async fn monthly_trends(
        &self,
        identity: &Identity,
        range: DateRange,
    ) -> Result<Vec<TrendPoint>, AnalyticsError>;

    /// Request count per status present in the filtered set.
    async fn status_distribution(
        &self,
        identity: &Identity,
        range: DateRange,
    ) -> Result<Vec<StatusCount>, AnalyticsError>;

    /// Request count per department, resolved through each request's
    /// type. Requests with no resolvable department count as Unassigned.
    async fn department_load(
        &self,
        identity: &Identity,
        range: DateRange,
    ) -> Result<Vec<DepartmentCount>, AnalyticsError>;

    /// The filtered request set as CSV, one row per request; row count
    /// matches `stats().total_requests` for the same range.
    async fn export_csv(
        &self,
        identity: &Identity,
        range: DateRange,
    ) -> Result<String, AnalyticsError>;
}
