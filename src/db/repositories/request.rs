use std::collections::{HashMap, HashSet};

use anyhow::{Context, Result};
use chrono::{Datelike, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use serde::Serialize;

use crate::entities::{department_persons, prelude::*, replies, service_requests, users};

/// Whose requests a listing should return.
#[derive(Debug, Clone, Copy)]
pub enum RequestScope {
    /// Every request (admin, hod)
    All,
    /// Requests created by this user
    Requester(i32),
    /// Requests assigned to this user
    Assignee(i32),
}

#[derive(Debug, Clone, Serialize)]
pub struct UserRef {
    pub id: i32,
    pub name: String,
    pub email: String,
}

impl From<users::Model> for UserRef {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
        }
    }
}

/// One row in a request listing, denormalized for display.
#[derive(Debug, Clone, Serialize)]
pub struct RequestSummary {
    pub id: i32,
    pub request_no: String,
    pub title: String,
    pub priority: String,
    pub created_at: String,
    pub status_id: i32,
    pub status_name: String,
    pub request_type_name: String,
    pub department_name: Option<String>,
    pub requester: Option<UserRef>,
    pub assignee: Option<UserRef>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplyView {
    pub id: i32,
    pub body: String,
    pub created_at: String,
    pub status_name: Option<String>,
    pub user: Option<UserRef>,
}

/// Full request view with its activity thread.
#[derive(Debug, Clone, Serialize)]
pub struct RequestDetail {
    pub id: i32,
    pub request_no: String,
    pub title: String,
    pub description: String,
    pub priority: String,
    pub created_at: String,
    pub status_id: i32,
    pub status_name: String,
    pub status_changed_at: Option<String>,
    pub request_type_id: i32,
    pub request_type_name: String,
    pub department_id: Option<i32>,
    pub department_name: Option<String>,
    pub requester: Option<UserRef>,
    pub assignee: Option<UserRef>,
    pub assigned_at: Option<String>,
    pub assigned_by: Option<UserRef>,
    pub assigned_note: Option<String>,
    pub approval_status: Option<String>,
    pub approval_at: Option<String>,
    pub approval_by: Option<UserRef>,
    pub approval_note: Option<String>,
    pub replies: Vec<ReplyView>,
}

#[derive(Debug, Clone)]
pub struct NewRequest {
    pub requester_id: i32,
    pub request_type_id: i32,
    pub title: String,
    pub description: String,
    pub priority: String,
    pub status_id: i32,
}

pub struct RequestRepository {
    conn: DatabaseConnection,
}

impl RequestRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Creates a request, allocating the next REQ-YYYY-NNN number. Two
    /// writers can read the same high-water mark; the unique index on
    /// `request_no` makes the loser retry with a fresh number.
    pub async fn create(&self, input: NewRequest) -> Result<service_requests::Model> {
        let prefix = format!("REQ-{}-", Utc::now().year());

        for _ in 0..2 {
            match self.try_create(&input, &prefix).await {
                Err(e) if is_unique_violation(&e) => continue,
                other => return other,
            }
        }

        self.try_create(&input, &prefix).await
    }

    async fn try_create(
        &self,
        input: &NewRequest,
        prefix: &str,
    ) -> Result<service_requests::Model> {
        let txn = self.conn.begin().await?;

        let existing: Vec<String> = ServiceRequests::find()
            .select_only()
            .column(service_requests::Column::RequestNo)
            .filter(service_requests::Column::RequestNo.starts_with(prefix))
            .into_tuple()
            .all(&txn)
            .await
            .context("Failed to query request numbers")?;

        let request = service_requests::ActiveModel {
            request_no: Set(next_request_no(prefix, &existing)),
            title: Set(input.title.clone()),
            description: Set(input.description.clone()),
            priority: Set(input.priority.clone()),
            status_id: Set(input.status_id),
            requester_id: Set(input.requester_id),
            request_type_id: Set(input.request_type_id),
            created_at: Set(Utc::now().to_rfc3339()),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .context("Failed to insert request")?;

        txn.commit().await?;

        Ok(request)
    }

    pub async fn get(&self, id: i32) -> Result<Option<service_requests::Model>> {
        ServiceRequests::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query request")
    }

    /// Requests visible under the given scope, newest first.
    pub async fn list(&self, scope: RequestScope) -> Result<Vec<RequestSummary>> {
        let mut query =
            ServiceRequests::find().order_by_desc(service_requests::Column::CreatedAt);

        match scope {
            RequestScope::All => {}
            RequestScope::Requester(user_id) => {
                query = query.filter(service_requests::Column::RequesterId.eq(user_id));
            }
            RequestScope::Assignee(user_id) => {
                query = query.filter(service_requests::Column::AssigneeId.eq(user_id));
            }
        }

        let requests = query
            .all(&self.conn)
            .await
            .context("Failed to list requests")?;

        let statuses = self.status_names().await?;
        let types = self.type_rows().await?;
        let departments = self.department_names().await?;
        let users = self.users_by_id().await?;

        Ok(requests
            .into_iter()
            .map(|r| {
                let (type_name, department_name) = types.get(&r.request_type_id).map_or_else(
                    || ("Unknown".to_string(), None),
                    |(name, dept_id)| (name.clone(), departments.get(dept_id).cloned()),
                );

                RequestSummary {
                    id: r.id,
                    request_no: r.request_no,
                    title: r.title,
                    priority: r.priority,
                    created_at: r.created_at,
                    status_id: r.status_id,
                    status_name: statuses
                        .get(&r.status_id)
                        .cloned()
                        .unwrap_or_else(|| "Unknown".to_string()),
                    request_type_name: type_name,
                    department_name,
                    requester: users.get(&r.requester_id).cloned(),
                    assignee: r.assignee_id.and_then(|id| users.get(&id).cloned()),
                }
            })
            .collect())
    }

    pub async fn get_detail(&self, id: i32) -> Result<Option<RequestDetail>> {
        let Some(request) = self.get(id).await? else {
            return Ok(None);
        };

        let statuses = self.status_names().await?;
        let departments = self.department_names().await?;
        let users = self.users_by_id().await?;

        let request_type = RequestTypes::find_by_id(request.request_type_id)
            .one(&self.conn)
            .await
            .context("Failed to query request type")?;

        let (request_type_name, department_id) = request_type
            .map_or(("Unknown".to_string(), None), |t| {
                (t.name, Some(t.department_id))
            });

        let reply_rows = Replies::find()
            .filter(replies::Column::RequestId.eq(id))
            .order_by_asc(replies::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("Failed to query replies")?;

        let replies = reply_rows
            .into_iter()
            .map(|r| ReplyView {
                id: r.id,
                body: r.body,
                created_at: r.created_at,
                status_name: statuses.get(&r.status_id).cloned(),
                user: users.get(&r.user_id).cloned(),
            })
            .collect();

        Ok(Some(RequestDetail {
            id: request.id,
            request_no: request.request_no,
            title: request.title,
            description: request.description,
            priority: request.priority,
            created_at: request.created_at,
            status_id: request.status_id,
            status_name: statuses
                .get(&request.status_id)
                .cloned()
                .unwrap_or_else(|| "Unknown".to_string()),
            status_changed_at: request.status_changed_at,
            request_type_id: request.request_type_id,
            request_type_name,
            department_id,
            department_name: department_id.and_then(|id| departments.get(&id).cloned()),
            requester: users.get(&request.requester_id).cloned(),
            assignee: request.assignee_id.and_then(|id| users.get(&id).cloned()),
            assigned_at: request.assigned_at,
            assigned_by: request.assigned_by_id.and_then(|id| users.get(&id).cloned()),
            assigned_note: request.assigned_note,
            approval_status: request.approval_status,
            approval_at: request.approval_at,
            approval_by: request.approval_by_id.and_then(|id| users.get(&id).cloned()),
            approval_note: request.approval_note,
            replies,
        }))
    }

    /// Appends a reply stamped with the request's status at write time.
    pub async fn add_reply(
        &self,
        request_id: i32,
        user_id: i32,
        body: &str,
        status_id: i32,
    ) -> Result<replies::Model> {
        replies::ActiveModel {
            request_id: Set(request_id),
            user_id: Set(user_id),
            body: Set(body.to_string()),
            status_id: Set(status_id),
            created_at: Set(Utc::now().to_rfc3339()),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert reply")
    }

    /// Assigns a technician and records the action as a reply, atomically.
    pub async fn assign(
        &self,
        request_id: i32,
        assignee_id: i32,
        assigned_by_id: i32,
        note: Option<String>,
        reply_body: &str,
    ) -> Result<service_requests::Model> {
        let txn = self.conn.begin().await?;

        let request = ServiceRequests::find_by_id(request_id)
            .one(&txn)
            .await
            .context("Failed to query request for assignment")?
            .ok_or_else(|| anyhow::anyhow!("Request not found: {request_id}"))?;

        let status_id = request.status_id;
        let now = Utc::now().to_rfc3339();

        let mut active: service_requests::ActiveModel = request.into();
        active.assignee_id = Set(Some(assignee_id));
        active.assigned_at = Set(Some(now.clone()));
        active.assigned_by_id = Set(Some(assigned_by_id));
        active.assigned_note = Set(note);
        let updated = active
            .update(&txn)
            .await
            .context("Failed to update assignment")?;

        replies::ActiveModel {
            request_id: Set(request_id),
            user_id: Set(assigned_by_id),
            body: Set(reply_body.to_string()),
            status_id: Set(status_id),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .context("Failed to insert assignment reply")?;

        txn.commit().await?;

        Ok(updated)
    }

    /// Records an approval decision and the action as a reply, atomically.
    pub async fn set_approval(
        &self,
        request_id: i32,
        decision: &str,
        decided_by_id: i32,
        note: Option<String>,
        reply_body: &str,
    ) -> Result<service_requests::Model> {
        let txn = self.conn.begin().await?;

        let request = ServiceRequests::find_by_id(request_id)
            .one(&txn)
            .await
            .context("Failed to query request for approval")?
            .ok_or_else(|| anyhow::anyhow!("Request not found: {request_id}"))?;

        let status_id = request.status_id;
        let now = Utc::now().to_rfc3339();

        let mut active: service_requests::ActiveModel = request.into();
        active.approval_status = Set(Some(decision.to_string()));
        active.approval_at = Set(Some(now.clone()));
        active.approval_by_id = Set(Some(decided_by_id));
        active.approval_note = Set(note);
        let updated = active
            .update(&txn)
            .await
            .context("Failed to update approval")?;

        replies::ActiveModel {
            request_id: Set(request_id),
            user_id: Set(decided_by_id),
            body: Set(reply_body.to_string()),
            status_id: Set(status_id),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .context("Failed to insert approval reply")?;

        txn.commit().await?;

        Ok(updated)
    }

    /// Moves a request to a new status and records the change as a reply,
    /// atomically.
    pub async fn set_status(
        &self,
        request_id: i32,
        new_status_id: i32,
        changed_by_id: i32,
        reply_body: &str,
    ) -> Result<service_requests::Model> {
        let txn = self.conn.begin().await?;

        let request = ServiceRequests::find_by_id(request_id)
            .one(&txn)
            .await
            .context("Failed to query request for status change")?
            .ok_or_else(|| anyhow::anyhow!("Request not found: {request_id}"))?;

        let now = Utc::now().to_rfc3339();

        let mut active: service_requests::ActiveModel = request.into();
        active.status_id = Set(new_status_id);
        active.status_changed_at = Set(Some(now.clone()));
        let updated = active
            .update(&txn)
            .await
            .context("Failed to update status")?;

        replies::ActiveModel {
            request_id: Set(request_id),
            user_id: Set(changed_by_id),
            body: Set(reply_body.to_string()),
            status_id: Set(new_status_id),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .context("Failed to insert status change reply")?;

        txn.commit().await?;

        Ok(updated)
    }

    /// Users staffed in the given department, heads included.
    pub async fn department_users(&self, department_id: i32) -> Result<Vec<UserRef>> {
        let staff = DepartmentPersons::find()
            .filter(department_persons::Column::DepartmentId.eq(department_id))
            .all(&self.conn)
            .await
            .context("Failed to query department staff")?;

        let user_ids: HashSet<i32> = staff.into_iter().map(|p| p.user_id).collect();

        if user_ids.is_empty() {
            return Ok(Vec::new());
        }

        let users = Users::find()
            .filter(users::Column::Id.is_in(user_ids))
            .order_by_asc(users::Column::Name)
            .all(&self.conn)
            .await
            .context("Failed to query assignable users")?;

        Ok(users.into_iter().map(UserRef::from).collect())
    }

    async fn status_names(&self) -> Result<HashMap<i32, String>> {
        let statuses = Statuses::find()
            .all(&self.conn)
            .await
            .context("Failed to query statuses")?;
        Ok(statuses.into_iter().map(|s| (s.id, s.name)).collect())
    }

    async fn type_rows(&self) -> Result<HashMap<i32, (String, i32)>> {
        let types = RequestTypes::find()
            .all(&self.conn)
            .await
            .context("Failed to query request types")?;
        Ok(types
            .into_iter()
            .map(|t| (t.id, (t.name, t.department_id)))
            .collect())
    }

    async fn department_names(&self) -> Result<HashMap<i32, String>> {
        let departments = Departments::find()
            .all(&self.conn)
            .await
            .context("Failed to query departments")?;
        Ok(departments.into_iter().map(|d| (d.id, d.name)).collect())
    }

    async fn users_by_id(&self) -> Result<HashMap<i32, UserRef>> {
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

/// Next number for the year prefix: one past the highest numeric suffix
/// already taken. Suffixes that do not parse are skipped.
fn next_request_no(prefix: &str, existing: &[String]) -> String {
    let highest = existing
        .iter()
        .filter_map(|no| no.strip_prefix(prefix))
        .filter_map(|suffix| suffix.parse::<u32>().ok())
        .max()
        .unwrap_or(0);

    format!("{prefix}{:03}", highest + 1)
}

fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.downcast_ref::<sea_orm::DbErr>()
        .and_then(sea_orm::DbErr::sql_err)
        .is_some_and(|e| matches!(e, sea_orm::SqlErr::UniqueConstraintViolation(_)))
}
