//! Status transition rules for service requests.
//!
//! Statuses form a configurable, totally ordered set rather than a
//! hard-coded graph. The rules here decide who may move a request from
//! one status to another:
//!
//! - nobody may leave a terminal status;
//! - requestors may not change status at all;
//! - technicians may only act on requests assigned to them, and only
//!   into statuses flagged as technician-allowed;
//! - hod and admin may move a request into any configured status.

use super::role::Role;

/// The subset of status fields the transition check needs.
#[derive(Debug, Clone, Copy)]
pub struct StatusFlags {
    pub is_terminal: bool,
    pub is_allowed_for_technician: bool,
}

/// Why a transition was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionDenied {
    /// The current status is terminal; the request is closed for changes.
    FromTerminal,
    /// The caller's role may never change status.
    RoleForbidden,
    /// A technician tried to act on a request not assigned to them.
    NotAssignee,
    /// A technician tried to enter a status not open to technicians.
    StatusNotAllowedForTechnician,
}

/// Checks whether `role` may move a request from `from` to `to`.
/// `is_assignee` is whether the caller is the request's current assignee.
pub fn check_transition(
    role: Role,
    is_assignee: bool,
    from: StatusFlags,
    to: StatusFlags,
) -> Result<(), TransitionDenied> {
    if from.is_terminal {
        return Err(TransitionDenied::FromTerminal);
    }

    match role {
        Role::Admin | Role::Hod => Ok(()),
        Role::Technician => {
            if !is_assignee {
                return Err(TransitionDenied::NotAssignee);
            }
            if !to.is_allowed_for_technician {
                return Err(TransitionDenied::StatusNotAllowedForTechnician);
            }
            Ok(())
        }
        Role::Requestor => Err(TransitionDenied::RoleForbidden),
    }
}
