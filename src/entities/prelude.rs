pub use super::department_persons::Entity as DepartmentPersons;
pub use super::departments::Entity as Departments;
pub use super::replies::Entity as Replies;
pub use super::request_types::Entity as RequestTypes;
pub use super::service_requests::Entity as ServiceRequests;
pub use super::service_types::Entity as ServiceTypes;
pub use super::statuses::Entity as Statuses;
pub use super::type_persons::Entity as TypePersons;
pub use super::user_roles::Entity as UserRoles;
pub use super::users::Entity as Users;
