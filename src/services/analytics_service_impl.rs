//! `SeaORM` implementation of the `AnalyticsService` trait.
//!
//! Aggregation happens in process: the filtered request set is fetched
//! once and folded into counters, buckets, or CSV rows. The data sets
//! involved are departmental-helpdesk sized, not warehouse sized.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};

use crate::db::Store;
use crate::domain::Identity;
use crate::entities::service_requests;
use crate::services::analytics_service::{
    AnalyticsError, AnalyticsService, DateRange, DepartmentCount, Stats, StatusCount, TrendPoint,
};

const CSV_HEADER: &str = "Request No,Title,Date,Status,Priority,Department,Requester";
const UNASSIGNED: &str = "Unassigned";

pub struct SeaOrmAnalyticsService {
    store: Store,
}

impl SeaOrmAnalyticsService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    async fn filtered_requests(
        &self,
        range: DateRange,
    ) -> Result<Vec<service_requests::Model>, AnalyticsError> {
        Ok(self.store.requests_in_range(range.from, range.to).await?)
    }
}

fn require_reporting_role(identity: &Identity) -> Result<(), AnalyticsError> {
    if identity.role.can_view_analytics() {
        Ok(())
    } else {
        Err(AnalyticsError::Unauthorized)
    }
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Mean of the given durations in hours, rounded to one decimal.
/// 0.0 for an empty set.
fn average_hours(durations: &[f64]) -> f64 {
    if durations.is_empty() {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let mean = durations.iter().sum::<f64>() / durations.len() as f64;
    round1(mean)
}

/// First day of the month `months` months away from `date`'s month.
fn shift_month_start(date: NaiveDate, months: i32) -> NaiveDate {
    let month0 = i32::try_from(date.month0()).unwrap_or(0);
    let zero_based = date.year() * 12 + month0 + months;
    let year = zero_based.div_euclid(12);
    let month = u32::try_from(zero_based.rem_euclid(12)).unwrap_or(0) + 1;
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(date)
}

/// Resolves the trend window, defaulting either open bound: five months
/// back through the end of the current month.
fn resolve_trend_range(range: DateRange, today: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let from = range.from.unwrap_or_else(|| {
        shift_month_start(today, -5)
            .and_hms_opt(0, 0, 0)
            .unwrap_or_default()
            .and_utc()
    });
    let to = range.to.unwrap_or_else(|| {
        shift_month_start(today, 1)
            .and_hms_opt(0, 0, 0)
            .unwrap_or_default()
            .and_utc()
            - Duration::seconds(1)
    });
    (from, to)
}

/// Buckets `(created_at, is_resolved)` points over `[from, to]`: one
/// bucket per day for windows up to 31 days, one per calendar month
/// otherwise. Every bucket in the window appears, zeros included.
fn build_trend(
    points: &[(DateTime<Utc>, bool)],
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Vec<TrendPoint> {
    let from_date = from.date_naive();
    let to_date = to.date_naive();
    let daily = (to_date - from_date).num_days() <= 31;

    let mut buckets: Vec<TrendPoint> = Vec::new();
    let mut index: HashMap<(i32, u32, u32), usize> = HashMap::new();

    if daily {
        let mut day = from_date;
        while day <= to_date {
            index.insert((day.year(), day.month(), day.day()), buckets.len());
            buckets.push(TrendPoint {
                bucket: day.format("%b %-d").to_string(),
                total: 0,
                resolved: 0,
            });
            match day.succ_opt() {
                Some(next) => day = next,
                None => break,
            }
        }
    } else {
        let mut month = shift_month_start(from_date, 0);
        while month <= to_date {
            index.insert((month.year(), month.month(), 0), buckets.len());
            buckets.push(TrendPoint {
                bucket: month.format("%b %Y").to_string(),
                total: 0,
                resolved: 0,
            });
            month = shift_month_start(month, 1);
        }
    }

    for (created, resolved) in points {
        let date = created.date_naive();
        let key = if daily {
            (date.year(), date.month(), date.day())
        } else {
            (date.year(), date.month(), 0)
        };
        if let Some(&i) = index.get(&key) {
            buckets[i].total += 1;
            if *resolved {
                buckets[i].resolved += 1;
            }
        }
    }

    buckets
}

/// Quotes a CSV cell when needed; embedded line breaks become spaces so
/// one request is always one row.
fn csv_field(value: &str) -> String {
    let cleaned: String = value
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect();

    if cleaned.contains(',') || cleaned.contains('"') {
        format!("\"{}\"", cleaned.replace('"', "\"\""))
    } else {
        cleaned
    }
}

fn csv_date(created_at: &str) -> String {
    parse_timestamp(created_at).map_or_else(
        || created_at.to_string(),
        |dt| dt.format("%Y-%m-%d %H:%M").to_string(),
    )
}

#[async_trait]
impl AnalyticsService for SeaOrmAnalyticsService {
    async fn stats(
        &self,
        identity: &Identity,
        range: DateRange,
    ) -> Result<Stats, AnalyticsError> {
        require_reporting_role(identity)?;

        let requests = self.filtered_requests(range).await?;
        let statuses = self.store.all_statuses().await?;
        let flags: HashMap<i32, (bool, bool)> = statuses
            .into_iter()
            .map(|s| (s.id, (s.is_open, s.is_terminal)))
            .collect();

        let mut pending = 0u64;
        let mut resolved = 0u64;
        let mut durations: Vec<f64> = Vec::new();

        for request in &requests {
            let Some(&(is_open, is_terminal)) = flags.get(&request.status_id) else {
                continue;
            };

            if is_terminal {
                resolved += 1;
                if let (Some(created), Some(changed)) = (
                    parse_timestamp(&request.created_at),
                    request
                        .status_changed_at
                        .as_deref()
                        .and_then(parse_timestamp),
                ) {
                    #[allow(clippy::cast_precision_loss)]
                    durations.push((changed - created).num_seconds() as f64 / 3600.0);
                }
            } else if is_open {
                pending += 1;
            }
        }

        Ok(Stats {
            total_requests: requests.len() as u64,
            pending_count: pending,
            resolved_count: resolved,
            avg_resolution_hours: average_hours(&durations),
        })
    }

    async fn monthly_trends(
        &self,
        identity: &Identity,
        range: DateRange,
    ) -> Result<Vec<TrendPoint>, AnalyticsError> {
        require_reporting_role(identity)?;

        let (from, to) = resolve_trend_range(range, Utc::now().date_naive());
        let requests = self
            .filtered_requests(DateRange {
                from: Some(from),
                to: Some(to),
            })
            .await?;

        let statuses = self.store.all_statuses().await?;
        let terminal: HashMap<i32, bool> =
            statuses.into_iter().map(|s| (s.id, s.is_terminal)).collect();

        let points: Vec<(DateTime<Utc>, bool)> = requests
            .iter()
            .filter_map(|r| {
                parse_timestamp(&r.created_at)
                    .map(|created| (created, terminal.get(&r.status_id).copied().unwrap_or(false)))
            })
            .collect();

        Ok(build_trend(&points, from, to))
    }

    async fn status_distribution(
        &self,
        identity: &Identity,
        range: DateRange,
    ) -> Result<Vec<StatusCount>, AnalyticsError> {
        require_reporting_role(identity)?;

        let requests = self.filtered_requests(range).await?;
        let statuses = self.store.all_statuses().await?;

        let mut counts: HashMap<i32, u64> = HashMap::new();
        for request in &requests {
            *counts.entry(request.status_id).or_insert(0) += 1;
        }

        // Statuses come back sequence-ordered; keep that order.
        Ok(statuses
            .into_iter()
            .filter_map(|s| {
                counts.get(&s.id).map(|&count| StatusCount {
                    status: s.name,
                    count,
                })
            })
            .collect())
    }

    async fn department_load(
        &self,
        identity: &Identity,
        range: DateRange,
    ) -> Result<Vec<DepartmentCount>, AnalyticsError> {
        require_reporting_role(identity)?;

        let requests = self.filtered_requests(range).await?;
        let types = self.store.type_departments().await?;
        let departments = self.store.department_names().await?;

        let mut counts: HashMap<String, u64> = HashMap::new();
        for request in &requests {
            let department = types
                .get(&request.request_type_id)
                .and_then(|(_, dept_id)| departments.get(dept_id))
                .cloned()
                .unwrap_or_else(|| UNASSIGNED.to_string());
            *counts.entry(department).or_insert(0) += 1;
        }

        let mut load: Vec<DepartmentCount> = counts
            .into_iter()
            .map(|(department, count)| DepartmentCount { department, count })
            .collect();
        load.sort_by(|a, b| b.count.cmp(&a.count).then(a.department.cmp(&b.department)));

        Ok(load)
    }

    async fn export_csv(
        &self,
        identity: &Identity,
        range: DateRange,
    ) -> Result<String, AnalyticsError> {
        require_reporting_role(identity)?;

        let requests = self.filtered_requests(range).await?;
        let statuses = self.store.all_statuses().await?;
        let status_names: HashMap<i32, String> =
            statuses.into_iter().map(|s| (s.id, s.name)).collect();
        let types = self.store.type_departments().await?;
        let departments = self.store.department_names().await?;
        let users = self.store.users_by_id().await?;

        let mut out = String::from(CSV_HEADER);
        for request in &requests {
            let status = status_names
                .get(&request.status_id)
                .cloned()
                .unwrap_or_default();
            let department = types
                .get(&request.request_type_id)
                .and_then(|(_, dept_id)| departments.get(dept_id))
                .cloned()
                .unwrap_or_else(|| UNASSIGNED.to_string());
            let requester = users
                .get(&request.requester_id)
                .map(|u| u.name.clone())
                .unwrap_or_default();

            out.push('\n');
            out.push_str(
                &[
                    csv_field(&request.request_no),
                    csv_field(&request.title),
                    csv_field(&csv_date(&request.created_at)),
                    csv_field(&status),
                    csv_field(&request.priority),
                    csv_field(&department),
                    csv_field(&requester),
                ]
                .join(","),
            );
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(value: &str) -> DateTime<Utc> {
        parse_timestamp(value).expect("valid test timestamp")
    }

    #[test]
    fn test_average_hours_empty_and_rounding() {
        assert_eq!(average_hours(&[]), 0.0);
        assert_eq!(average_hours(&[48.0]), 48.0);
        assert_eq!(average_hours(&[1.0, 2.0]), 1.5);
        assert_eq!(average_hours(&[1.0, 1.0, 1.05]), 1.0);
    }

    #[test]
    fn test_shift_month_start_wraps_years() {
        let d = NaiveDate::from_ymd_opt(2026, 2, 15).unwrap();
        assert_eq!(
            shift_month_start(d, -5),
            NaiveDate::from_ymd_opt(2025, 9, 1).unwrap()
        );
        assert_eq!(
            shift_month_start(d, 11),
            NaiveDate::from_ymd_opt(2027, 1, 1).unwrap()
        );
    }

    #[test]
    fn test_default_trend_range_spans_six_months() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 30).unwrap();
        let (from, to) = resolve_trend_range(DateRange::default(), today);
        assert_eq!(from, ts("2026-03-01T00:00:00Z"));
        assert_eq!(to, ts("2026-08-31T23:59:59Z"));
    }

    #[test]
    fn test_trend_short_range_uses_daily_buckets() {
        let from = ts("2026-08-01T00:00:00Z");
        let to = ts("2026-08-03T23:59:59Z");
        let points = vec![
            (ts("2026-08-01T10:00:00Z"), false),
            (ts("2026-08-03T09:00:00Z"), true),
            (ts("2026-08-03T12:00:00Z"), false),
        ];

        let trend = build_trend(&points, from, to);

        assert_eq!(
            trend,
            vec![
                TrendPoint {
                    bucket: "Aug 1".to_string(),
                    total: 1,
                    resolved: 0
                },
                TrendPoint {
                    bucket: "Aug 2".to_string(),
                    total: 0,
                    resolved: 0
                },
                TrendPoint {
                    bucket: "Aug 3".to_string(),
                    total: 2,
                    resolved: 1
                },
            ]
        );
    }

    #[test]
    fn test_trend_long_range_uses_monthly_buckets() {
        let from = ts("2026-03-01T00:00:00Z");
        let to = ts("2026-08-31T23:59:59Z");
        let points = vec![
            (ts("2026-03-15T10:00:00Z"), true),
            (ts("2026-08-30T09:00:00Z"), false),
        ];

        let trend = build_trend(&points, from, to);

        assert_eq!(trend.len(), 6);
        assert_eq!(trend[0].bucket, "Mar 2026");
        assert_eq!(trend[0].total, 1);
        assert_eq!(trend[0].resolved, 1);
        assert_eq!(trend[5].bucket, "Aug 2026");
        assert_eq!(trend[5].total, 1);
        assert_eq!(trend[5].resolved, 0);
    }

    #[test]
    fn test_csv_field_escaping() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_field("line\nbreak"), "line break");
    }

    #[test]
    fn test_csv_date_format() {
        assert_eq!(csv_date("2026-08-30T14:05:00Z"), "2026-08-30 14:05");
    }
}
