//! `SeaORM` implementation of the `RequestService` trait.

use async_trait::async_trait;

use crate::db::{NewRequest, RequestDetail, RequestScope, RequestSummary, Store, UserRef};
use crate::domain::{
    ApprovalDecision, Identity, Priority, Role, StatusFlags, TransitionDenied, check_transition,
};
use crate::entities::{replies, statuses};
use crate::services::request_service::{
    CreateRequestInput, RequestError, RequestService,
};

const TITLE_MAX: usize = 250;
const BODY_MAX: usize = 5000;

pub struct SeaOrmRequestService {
    store: Store,
}

impl SeaOrmRequestService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    async fn detail(&self, request_id: i32) -> Result<RequestDetail, RequestError> {
        self.store
            .get_request_detail(request_id)
            .await?
            .ok_or(RequestError::NotFound)
    }

    fn flags(status: &statuses::Model) -> StatusFlags {
        StatusFlags {
            is_terminal: status.is_terminal,
            is_allowed_for_technician: status.is_allowed_for_technician,
        }
    }
}

/// Trims `value` and enforces a 1..=max character length.
fn validated_text(field: &str, value: &str, max: usize) -> Result<String, RequestError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(RequestError::validation(field, "must not be empty"));
    }
    if trimmed.chars().count() > max {
        return Err(RequestError::validation(
            field,
            format!("must be at most {max} characters"),
        ));
    }
    Ok(trimmed.to_string())
}

#[async_trait]
impl RequestService for SeaOrmRequestService {
    async fn create_request(
        &self,
        identity: &Identity,
        input: CreateRequestInput,
    ) -> Result<RequestDetail, RequestError> {
        let title = validated_text("title", &input.title, TITLE_MAX)?;
        let description = validated_text("description", &input.description, BODY_MAX)?;

        let request_type = self
            .store
            .get_request_type(input.request_type_id)
            .await?
            .ok_or(RequestError::NotFound)?;

        let priority = match input.priority {
            Some(value) => value
                .parse::<Priority>()
                .map_err(|()| {
                    RequestError::validation("priority", "must be one of Low, Medium, High")
                })?
                .as_str()
                .to_string(),
            None => request_type
                .default_priority
                .unwrap_or_else(|| Priority::Medium.as_str().to_string()),
        };

        let default_status = self
            .store
            .default_status()
            .await?
            .ok_or(RequestError::DefaultStatusMissing)?;

        let request = self
            .store
            .create_request(NewRequest {
                requester_id: identity.id,
                request_type_id: request_type.id,
                title,
                description,
                priority,
                status_id: default_status.id,
            })
            .await?;

        self.detail(request.id).await
    }

    async fn list_requests(
        &self,
        identity: &Identity,
    ) -> Result<Vec<RequestSummary>, RequestError> {
        let scope = match identity.role {
            Role::Admin | Role::Hod => RequestScope::All,
            Role::Technician => RequestScope::Assignee(identity.id),
            Role::Requestor => RequestScope::Requester(identity.id),
        };

        Ok(self.store.list_requests(scope).await?)
    }

    async fn get_request_detail(
        &self,
        _identity: &Identity,
        request_id: i32,
    ) -> Result<RequestDetail, RequestError> {
        self.detail(request_id).await
    }

    async fn add_reply(
        &self,
        identity: &Identity,
        request_id: i32,
        body: &str,
    ) -> Result<replies::Model, RequestError> {
        let body = validated_text("body", body, BODY_MAX)?;

        let request = self
            .store
            .get_request(request_id)
            .await?
            .ok_or(RequestError::NotFound)?;

        Ok(self
            .store
            .add_reply(request.id, identity.id, &body, request.status_id)
            .await?)
    }

    async fn assign_technician(
        &self,
        identity: &Identity,
        request_id: i32,
        technician_id: i32,
        note: Option<String>,
    ) -> Result<RequestDetail, RequestError> {
        if !identity.role.can_assign() {
            return Err(RequestError::Unauthorized);
        }

        self.store
            .get_request(request_id)
            .await?
            .ok_or(RequestError::NotFound)?;

        let technician = self
            .store
            .get_user_by_id(technician_id)
            .await?
            .ok_or(RequestError::NotFound)?;

        let reply_body = format!("Assigned request to {}", technician.name);

        self.store
            .assign_request(request_id, technician.id, identity.id, note, &reply_body)
            .await?;

        self.detail(request_id).await
    }

    async fn record_approval(
        &self,
        identity: &Identity,
        request_id: i32,
        decision: ApprovalDecision,
        note: Option<String>,
    ) -> Result<RequestDetail, RequestError> {
        if !identity.role.can_assign() {
            return Err(RequestError::Unauthorized);
        }

        let note = match note {
            Some(value) => Some(validated_text("note", &value, BODY_MAX)?),
            None => None,
        };

        let request = self
            .store
            .get_request(request_id)
            .await?
            .ok_or(RequestError::NotFound)?;

        let status = self
            .store
            .get_status(request.status_id)
            .await?
            .ok_or_else(|| {
                RequestError::Internal(format!("Status {} missing", request.status_id))
            })?;

        if status.is_terminal {
            return Err(RequestError::validation(
                "request_id",
                format!("request is already {} and closed for changes", status.name),
            ));
        }

        let reply_body = match decision {
            ApprovalDecision::Approved => "Request approved",
            ApprovalDecision::Rejected => "Request rejected",
        };

        self.store
            .set_request_approval(request_id, decision.as_str(), identity.id, note, reply_body)
            .await?;

        self.detail(request_id).await
    }

    async fn change_status(
        &self,
        identity: &Identity,
        request_id: i32,
        status_id: i32,
    ) -> Result<RequestDetail, RequestError> {
        let request = self
            .store
            .get_request(request_id)
            .await?
            .ok_or(RequestError::NotFound)?;

        let from = self
            .store
            .get_status(request.status_id)
            .await?
            .ok_or_else(|| {
                RequestError::Internal(format!("Status {} missing", request.status_id))
            })?;

        let to = self
            .store
            .get_status(status_id)
            .await?
            .ok_or(RequestError::NotFound)?;

        let is_assignee = request.assignee_id == Some(identity.id);

        check_transition(
            identity.role,
            is_assignee,
            Self::flags(&from),
            Self::flags(&to),
        )
        .map_err(|denied| match denied {
            TransitionDenied::RoleForbidden | TransitionDenied::NotAssignee => {
                RequestError::Unauthorized
            }
            TransitionDenied::FromTerminal => RequestError::validation(
                "status_id",
                format!("request is already {} and closed for changes", from.name),
            ),
            TransitionDenied::StatusNotAllowedForTechnician => RequestError::validation(
                "status_id",
                format!("technicians may not move requests to {}", to.name),
            ),
        })?;

        let reply_body = format!("Status changed to {}", to.name);

        self.store
            .set_request_status(request_id, to.id, identity.id, &reply_body)
            .await?;

        self.detail(request_id).await
    }

    async fn list_department_technicians(
        &self,
        _identity: &Identity,
        department_id: i32,
    ) -> Result<Vec<UserRef>, RequestError> {
        Ok(self.store.department_users(department_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validated_text_trims_and_bounds() {
        assert_eq!(validated_text("title", "  hello  ", 250).unwrap(), "hello");
        assert!(validated_text("title", "   ", 250).is_err());
        assert!(validated_text("title", &"x".repeat(251), 250).is_err());
        assert!(validated_text("title", &"x".repeat(250), 250).is_ok());
    }

    #[test]
    fn test_validated_text_names_the_field() {
        let err = validated_text("body", "", 5000).unwrap_err();
        match err {
            RequestError::Validation { field, .. } => assert_eq!(field, "body"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
