pub mod prelude;

pub mod department_persons;
pub mod departments;
pub mod replies;
pub mod request_types;
pub mod service_requests;
pub mod service_types;
pub mod statuses;
pub mod type_persons;
pub mod user_roles;
pub mod users;
