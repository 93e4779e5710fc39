use super::role::Role;
use serde::Serialize;

/// The authenticated caller. Resolved once per request from a validated
/// session token and passed explicitly to every service operation; no
/// ambient session state is read anywhere else.
#[derive(Debug, Clone, Serialize)]
pub struct Identity {
    pub id: i32,
    pub email: String,
    pub name: String,
    pub role: Role,
}
