use serde::{Deserialize, Serialize};

/// Closed role set. Every lifecycle and analytics operation is gated on
/// one of these; persisted values outside the set fall back to `Requestor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Hod,
    Technician,
    Requestor,
}

impl Role {
    /// Parses a persisted role string. Unknown values map to `Requestor`
    /// rather than failing, so a corrupted role row degrades to the least
    /// privileged scope.
    #[must_use]
    pub fn from_db(value: &str) -> Self {
        match value {
            "admin" => Self::Admin,
            "hod" => Self::Hod,
            "technician" => Self::Technician,
            _ => Self::Requestor,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Hod => "hod",
            Self::Technician => "technician",
            Self::Requestor => "requestor",
        }
    }

    /// Roles allowed to view analytics and export reports.
    #[must_use]
    pub const fn can_view_analytics(self) -> bool {
        matches!(self, Self::Admin | Self::Hod)
    }

    /// Roles allowed to assign a technician to a request.
    #[must_use]
    pub const fn can_assign(self) -> bool {
        matches!(self, Self::Admin | Self::Hod)
    }

    /// Roles allowed to manage master data (departments, statuses, types).
    #[must_use]
    pub const fn can_manage_master_data(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_db_known_roles() {
        assert_eq!(Role::from_db("admin"), Role::Admin);
        assert_eq!(Role::from_db("hod"), Role::Hod);
        assert_eq!(Role::from_db("technician"), Role::Technician);
        assert_eq!(Role::from_db("requestor"), Role::Requestor);
    }

    #[test]
    fn test_from_db_unknown_defaults_to_requestor() {
        assert_eq!(Role::from_db(""), Role::Requestor);
        assert_eq!(Role::from_db("superuser"), Role::Requestor);
        assert_eq!(Role::from_db("ADMIN"), Role::Requestor);
    }

    #[test]
    fn test_permission_gates() {
        assert!(Role::Admin.can_view_analytics());
        assert!(Role::Hod.can_view_analytics());
        assert!(!Role::Technician.can_view_analytics());
        assert!(!Role::Requestor.can_view_analytics());

        assert!(Role::Admin.can_manage_master_data());
        assert!(!Role::Hod.can_manage_master_data());
    }
}
