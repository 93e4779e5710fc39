use chrono::{Datelike, Utc};
use deskarr::config::Config;
use deskarr::db::{DepartmentInput, DepartmentPersonInput, RequestTypeInput, ServiceTypeInput, Store};
use deskarr::domain::{ApprovalDecision, Identity, Role};
use deskarr::services::{CreateRequestInput, RequestError};
use deskarr::state::SharedState;

async fn test_state() -> SharedState {
    let store = Store::new("sqlite::memory:")
        .await
        .expect("Failed to create store");
    SharedState::with_store(Config::default(), store)
}

/// Identity of the admin account seeded by migration.
fn admin() -> Identity {
    Identity {
        id: 1,
        email: "admin@deskarr.local".to_string(),
        name: "Administrator".to_string(),
        role: Role::Admin,
    }
}

async fn make_user(state: &SharedState, email: &str, name: &str, role: Role) -> Identity {
    let user = state
        .store
        .create_user(email, name, "password123", role, None)
        .await
        .expect("Failed to create user");

    Identity {
        id: user.id,
        email: user.email,
        name: user.name,
        role,
    }
}

/// Seeds a department with one request type; returns (department_id,
/// request_type_id).
async fn seed_request_type(state: &SharedState, default_priority: Option<&str>) -> (i32, i32) {
    let department = state
        .store
        .create_department(DepartmentInput {
            name: "IT".to_string(),
            description: None,
            cc_email: None,
        })
        .await
        .expect("Failed to create department");

    let service_type = state
        .store
        .create_service_type(ServiceTypeInput {
            name: "Support".to_string(),
            description: None,
            sequence: 1,
        })
        .await
        .expect("Failed to create service type");

    let request_type = state
        .store
        .create_request_type(RequestTypeInput {
            name: "Hardware".to_string(),
            description: None,
            sequence: 1,
            service_type_id: service_type.id,
            department_id: department.id,
            default_priority: default_priority.map(str::to_string),
        })
        .await
        .expect("Failed to create request type");

    (department.id, request_type.id)
}

fn new_request(request_type_id: i32, title: &str) -> CreateRequestInput {
    CreateRequestInput {
        request_type_id,
        title: title.to_string(),
        description: "Something is broken.".to_string(),
        priority: None,
    }
}

async fn status_id(state: &SharedState, system_name: &str) -> i32 {
    state
        .store
        .list_statuses()
        .await
        .expect("Failed to list statuses")
        .into_iter()
        .find(|s| s.system_name == system_name)
        .map(|s| s.id)
        .expect("Status not seeded")
}

#[tokio::test]
async fn test_create_allocates_numbers_and_default_status() {
    let state = test_state().await;
    let (_, type_id) = seed_request_type(&state, None).await;
    let alice = make_user(&state, "alice@example.com", "Alice", Role::Requestor).await;

    let first = state
        .request_service
        .create_request(&alice, new_request(type_id, "First"))
        .await
        .unwrap();
    let second = state
        .request_service
        .create_request(&alice, new_request(type_id, "Second"))
        .await
        .unwrap();

    let year = Utc::now().year();
    assert_eq!(first.request_no, format!("REQ-{year}-001"));
    assert_eq!(second.request_no, format!("REQ-{year}-002"));

    assert_eq!(first.status_name, "Open");
    assert_eq!(first.priority, "Medium");
    assert_eq!(first.requester.as_ref().unwrap().id, alice.id);
    assert!(first.assignee.is_none());
    assert!(first.status_changed_at.is_none());
}

#[tokio::test]
async fn test_create_priority_resolution() {
    let state = test_state().await;
    let (_, type_id) = seed_request_type(&state, Some("High")).await;
    let alice = make_user(&state, "alice@example.com", "Alice", Role::Requestor).await;

    // Type default wins when the caller says nothing
    let detail = state
        .request_service
        .create_request(&alice, new_request(type_id, "Defaulted"))
        .await
        .unwrap();
    assert_eq!(detail.priority, "High");

    // An explicit priority overrides the type default
    let mut input = new_request(type_id, "Explicit");
    input.priority = Some("Low".to_string());
    let detail = state
        .request_service
        .create_request(&alice, input)
        .await
        .unwrap();
    assert_eq!(detail.priority, "Low");

    // Unknown priorities are refused, not coerced
    let mut input = new_request(type_id, "Bad");
    input.priority = Some("Urgent".to_string());
    let err = state
        .request_service
        .create_request(&alice, input)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RequestError::Validation { ref field, .. } if field == "priority"
    ));
}

#[tokio::test]
async fn test_create_validates_title_and_type() {
    let state = test_state().await;
    let (_, type_id) = seed_request_type(&state, None).await;
    let alice = make_user(&state, "alice@example.com", "Alice", Role::Requestor).await;

    let err = state
        .request_service
        .create_request(&alice, new_request(type_id, "   "))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RequestError::Validation { ref field, .. } if field == "title"
    ));

    let err = state
        .request_service
        .create_request(&alice, new_request(9999, "Fine title"))
        .await
        .unwrap_err();
    assert!(matches!(err, RequestError::NotFound));
}

#[tokio::test]
async fn test_listing_is_scoped_by_role() {
    let state = test_state().await;
    let (_, type_id) = seed_request_type(&state, None).await;

    let alice = make_user(&state, "alice@example.com", "Alice", Role::Requestor).await;
    let bob = make_user(&state, "bob@example.com", "Bob", Role::Requestor).await;
    let tech = make_user(&state, "tech@example.com", "Tech", Role::Technician).await;

    let a1 = state
        .request_service
        .create_request(&alice, new_request(type_id, "Alice one"))
        .await
        .unwrap();
    state
        .request_service
        .create_request(&alice, new_request(type_id, "Alice two"))
        .await
        .unwrap();
    state
        .request_service
        .create_request(&bob, new_request(type_id, "Bob one"))
        .await
        .unwrap();

    assert_eq!(state.request_service.list_requests(&alice).await.unwrap().len(), 2);
    assert_eq!(state.request_service.list_requests(&bob).await.unwrap().len(), 1);
    assert_eq!(state.request_service.list_requests(&admin()).await.unwrap().len(), 3);

    // Technicians see assignments only
    assert!(state.request_service.list_requests(&tech).await.unwrap().is_empty());

    state
        .request_service
        .assign_technician(&admin(), a1.id, tech.id, None)
        .await
        .unwrap();

    let visible = state.request_service.list_requests(&tech).await.unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].id, a1.id);
}

#[tokio::test]
async fn test_replies_are_stamped_and_validated() {
    let state = test_state().await;
    let (_, type_id) = seed_request_type(&state, None).await;
    let alice = make_user(&state, "alice@example.com", "Alice", Role::Requestor).await;

    let detail = state
        .request_service
        .create_request(&alice, new_request(type_id, "Needs replies"))
        .await
        .unwrap();

    state
        .request_service
        .add_reply(&alice, detail.id, "  Please hurry.  ")
        .await
        .unwrap();

    let detail = state
        .request_service
        .get_request_detail(&alice, detail.id)
        .await
        .unwrap();
    assert_eq!(detail.replies.len(), 1);
    assert_eq!(detail.replies[0].body, "Please hurry.");
    assert_eq!(detail.replies[0].status_name.as_deref(), Some("Open"));
    assert_eq!(detail.replies[0].user.as_ref().unwrap().id, alice.id);

    let err = state
        .request_service
        .add_reply(&alice, detail.id, "")
        .await
        .unwrap_err();
    assert!(matches!(err, RequestError::Validation { .. }));

    let err = state
        .request_service
        .add_reply(&alice, detail.id, &"x".repeat(5001))
        .await
        .unwrap_err();
    assert!(matches!(err, RequestError::Validation { .. }));
}

#[tokio::test]
async fn test_assignment_gate_and_audit_trail() {
    let state = test_state().await;
    let (_, type_id) = seed_request_type(&state, None).await;

    let alice = make_user(&state, "alice@example.com", "Alice", Role::Requestor).await;
    let tech = make_user(&state, "tech@example.com", "Taylor Tech", Role::Technician).await;

    let detail = state
        .request_service
        .create_request(&alice, new_request(type_id, "Assign me"))
        .await
        .unwrap();

    let err = state
        .request_service
        .assign_technician(&alice, detail.id, tech.id, None)
        .await
        .unwrap_err();
    assert!(matches!(err, RequestError::Unauthorized));

    let detail = state
        .request_service
        .assign_technician(&admin(), detail.id, tech.id, Some("Printer row".to_string()))
        .await
        .unwrap();

    assert_eq!(detail.assignee.as_ref().unwrap().id, tech.id);
    assert_eq!(detail.assigned_by.as_ref().unwrap().id, 1);
    assert_eq!(detail.assigned_note.as_deref(), Some("Printer row"));
    assert!(detail.assigned_at.is_some());
    assert_eq!(detail.replies.len(), 1);
    assert_eq!(detail.replies[0].body, "Assigned request to Taylor Tech");

    // Reassigning the same person keeps the assignee but still logs it
    let detail = state
        .request_service
        .assign_technician(&admin(), detail.id, tech.id, None)
        .await
        .unwrap();
    assert_eq!(detail.assignee.as_ref().unwrap().id, tech.id);
    assert_eq!(detail.replies.len(), 2);
}

#[tokio::test]
async fn test_status_transition_rules() {
    let state = test_state().await;
    let (_, type_id) = seed_request_type(&state, None).await;

    let alice = make_user(&state, "alice@example.com", "Alice", Role::Requestor).await;
    let tech = make_user(&state, "tech@example.com", "Tech", Role::Technician).await;

    let in_progress = status_id(&state, "in_progress").await;
    let pending = status_id(&state, "pending_approval").await;
    let resolved = status_id(&state, "resolved").await;

    let detail = state
        .request_service
        .create_request(&alice, new_request(type_id, "Lifecycle"))
        .await
        .unwrap();

    // Requestors never change status
    let err = state
        .request_service
        .change_status(&alice, detail.id, in_progress)
        .await
        .unwrap_err();
    assert!(matches!(err, RequestError::Unauthorized));

    // Technicians only act on their own assignments
    let err = state
        .request_service
        .change_status(&tech, detail.id, in_progress)
        .await
        .unwrap_err();
    assert!(matches!(err, RequestError::Unauthorized));

    state
        .request_service
        .assign_technician(&admin(), detail.id, tech.id, None)
        .await
        .unwrap();

    let detail = state
        .request_service
        .change_status(&tech, detail.id, in_progress)
        .await
        .unwrap();
    assert_eq!(detail.status_name, "In Progress");
    assert!(detail.status_changed_at.is_some());

    let last = detail.replies.last().unwrap();
    assert_eq!(last.body, "Status changed to In Progress");
    assert_eq!(last.status_name.as_deref(), Some("In Progress"));

    // Pending Approval is not open to technicians
    let err = state
        .request_service
        .change_status(&tech, detail.id, pending)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RequestError::Validation { ref field, .. } if field == "status_id"
    ));

    let detail = state
        .request_service
        .change_status(&tech, detail.id, resolved)
        .await
        .unwrap();
    assert_eq!(detail.status_name, "Resolved");

    // Terminal statuses are final, even for admins
    let err = state
        .request_service
        .change_status(&admin(), detail.id, in_progress)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RequestError::Validation { ref field, .. } if field == "status_id"
    ));
}

#[tokio::test]
async fn test_approval_gate_and_recording() {
    let state = test_state().await;
    let (_, type_id) = seed_request_type(&state, None).await;

    let alice = make_user(&state, "alice@example.com", "Alice", Role::Requestor).await;
    let hod = make_user(&state, "head@example.com", "Head", Role::Hod).await;

    let detail = state
        .request_service
        .create_request(&alice, new_request(type_id, "Needs sign-off"))
        .await
        .unwrap();

    assert!(detail.approval_status.is_none());

    // Requestors cannot decide on their own requests
    let err = state
        .request_service
        .record_approval(&alice, detail.id, ApprovalDecision::Approved, None)
        .await
        .unwrap_err();
    assert!(matches!(err, RequestError::Unauthorized));

    let detail = state
        .request_service
        .record_approval(
            &hod,
            detail.id,
            ApprovalDecision::Approved,
            Some("Budget confirmed".to_string()),
        )
        .await
        .unwrap();

    assert_eq!(detail.approval_status.as_deref(), Some("Approved"));
    assert_eq!(detail.approval_by.as_ref().unwrap().id, hod.id);
    assert_eq!(detail.approval_note.as_deref(), Some("Budget confirmed"));
    assert!(detail.approval_at.is_some());
    assert_eq!(detail.replies.len(), 1);
    assert_eq!(detail.replies[0].body, "Request approved");

    // A later decision overwrites the earlier one and is logged again
    let detail = state
        .request_service
        .record_approval(&admin(), detail.id, ApprovalDecision::Rejected, None)
        .await
        .unwrap();

    assert_eq!(detail.approval_status.as_deref(), Some("Rejected"));
    assert_eq!(detail.approval_by.as_ref().unwrap().id, 1);
    assert!(detail.approval_note.is_none());
    assert_eq!(detail.replies.len(), 2);
    assert_eq!(detail.replies[1].body, "Request rejected");
}

#[tokio::test]
async fn test_approval_refused_on_closed_requests() {
    let state = test_state().await;
    let (_, type_id) = seed_request_type(&state, None).await;
    let alice = make_user(&state, "alice@example.com", "Alice", Role::Requestor).await;

    let resolved = status_id(&state, "resolved").await;

    let detail = state
        .request_service
        .create_request(&alice, new_request(type_id, "Already done"))
        .await
        .unwrap();

    state
        .request_service
        .change_status(&admin(), detail.id, resolved)
        .await
        .unwrap();

    let err = state
        .request_service
        .record_approval(&admin(), detail.id, ApprovalDecision::Approved, None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RequestError::Validation { ref field, .. } if field == "request_id"
    ));
}

#[tokio::test]
async fn test_department_staff_for_assignment_picker() {
    let state = test_state().await;
    let (department_id, _) = seed_request_type(&state, None).await;

    let hod = make_user(&state, "head@example.com", "Head", Role::Hod).await;
    let tech = make_user(&state, "tech@example.com", "Ann Tech", Role::Technician).await;
    make_user(&state, "other@example.com", "Outsider", Role::Technician).await;

    let today = Utc::now().to_rfc3339();
    for (user_id, is_hod) in [(hod.id, true), (tech.id, false)] {
        state
            .store
            .create_department_person(DepartmentPersonInput {
                department_id,
                user_id,
                is_hod,
                from_date: today.clone(),
                to_date: None,
                description: None,
            })
            .await
            .unwrap();
    }

    let staff = state
        .request_service
        .list_department_technicians(&hod, department_id)
        .await
        .unwrap();

    // Heads are listed alongside technicians, ordered by name
    let names: Vec<&str> = staff.iter().map(|u| u.name.as_str()).collect();
    assert_eq!(names, vec!["Ann Tech", "Head"]);
}
