pub mod analytics;
pub mod master_data;
pub mod request;
pub mod user;
