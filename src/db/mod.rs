use anyhow::Result;
use chrono::{DateTime, Utc};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod migrator;
pub mod repositories;

use crate::config::SecurityConfig;
use crate::domain::Role;
use crate::entities::{
    department_persons, departments, replies, request_types, service_requests, service_types,
    statuses, type_persons,
};

pub use repositories::master_data::{
    DepartmentInput, DepartmentPersonInput, RequestTypeInput, ServiceTypeInput, StatusInput,
    TypePersonInput,
};
pub use repositories::request::{
    NewRequest, ReplyView, RequestDetail, RequestScope, RequestSummary, UserRef,
};
pub use repositories::user::User;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn master_data_repo(&self) -> repositories::master_data::MasterDataRepository {
        repositories::master_data::MasterDataRepository::new(self.conn.clone())
    }

    fn request_repo(&self) -> repositories::request::RequestRepository {
        repositories::request::RequestRepository::new(self.conn.clone())
    }

    fn analytics_repo(&self) -> repositories::analytics::AnalyticsRepository {
        repositories::analytics::AnalyticsRepository::new(self.conn.clone())
    }

    // --- Users ---

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.user_repo().get_by_email(email).await
    }

    pub async fn get_user_by_id(&self, id: i32) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.user_repo().list().await
    }

    pub async fn verify_password(&self, email: &str, password: &str) -> Result<Option<User>> {
        self.user_repo().verify_password(email, password).await
    }

    pub async fn create_user(
        &self,
        email: &str,
        name: &str,
        password: &str,
        role: Role,
        config: Option<&SecurityConfig>,
    ) -> Result<User> {
        self.user_repo()
            .create(email, name, password, role, config)
            .await
    }

    pub async fn update_password(
        &self,
        user_id: i32,
        new_password: &str,
        config: Option<&SecurityConfig>,
    ) -> Result<()> {
        self.user_repo()
            .update_password(user_id, new_password, config)
            .await
    }

    pub async fn get_user_role(&self, user_id: i32) -> Result<Role> {
        self.user_repo().get_role(user_id).await
    }

    pub async fn set_user_role(&self, user_id: i32, role: Role) -> Result<()> {
        self.user_repo().set_role(user_id, role).await
    }

    // --- Master data ---

    pub async fn list_departments(&self) -> Result<Vec<departments::Model>> {
        self.master_data_repo().list_departments().await
    }

    pub async fn get_department(&self, id: i32) -> Result<Option<departments::Model>> {
        self.master_data_repo().get_department(id).await
    }

    pub async fn create_department(&self, input: DepartmentInput) -> Result<departments::Model> {
        self.master_data_repo().create_department(input).await
    }

    pub async fn update_department(
        &self,
        id: i32,
        input: DepartmentInput,
    ) -> Result<Option<departments::Model>> {
        self.master_data_repo().update_department(id, input).await
    }

    pub async fn delete_department(&self, id: i32) -> Result<bool> {
        self.master_data_repo().delete_department(id).await
    }

    pub async fn list_service_types(&self) -> Result<Vec<service_types::Model>> {
        self.master_data_repo().list_service_types().await
    }

    pub async fn create_service_type(
        &self,
        input: ServiceTypeInput,
    ) -> Result<service_types::Model> {
        self.master_data_repo().create_service_type(input).await
    }

    pub async fn update_service_type(
        &self,
        id: i32,
        input: ServiceTypeInput,
    ) -> Result<Option<service_types::Model>> {
        self.master_data_repo().update_service_type(id, input).await
    }

    pub async fn delete_service_type(&self, id: i32) -> Result<bool> {
        self.master_data_repo().delete_service_type(id).await
    }

    pub async fn list_request_types(
        &self,
        service_type_id: Option<i32>,
    ) -> Result<Vec<(request_types::Model, Option<departments::Model>)>> {
        self.master_data_repo()
            .list_request_types(service_type_id)
            .await
    }

    pub async fn get_request_type(&self, id: i32) -> Result<Option<request_types::Model>> {
        self.master_data_repo().get_request_type(id).await
    }

    pub async fn create_request_type(
        &self,
        input: RequestTypeInput,
    ) -> Result<request_types::Model> {
        self.master_data_repo().create_request_type(input).await
    }

    pub async fn update_request_type(
        &self,
        id: i32,
        input: RequestTypeInput,
    ) -> Result<Option<request_types::Model>> {
        self.master_data_repo().update_request_type(id, input).await
    }

    pub async fn delete_request_type(&self, id: i32) -> Result<bool> {
        self.master_data_repo().delete_request_type(id).await
    }

    pub async fn list_statuses(&self) -> Result<Vec<statuses::Model>> {
        self.master_data_repo().list_statuses().await
    }

    pub async fn get_status(&self, id: i32) -> Result<Option<statuses::Model>> {
        self.master_data_repo().get_status(id).await
    }

    pub async fn default_status(&self) -> Result<Option<statuses::Model>> {
        self.master_data_repo().default_status().await
    }

    pub async fn create_status(&self, input: StatusInput) -> Result<statuses::Model> {
        self.master_data_repo().create_status(input).await
    }

    pub async fn update_status(
        &self,
        id: i32,
        input: StatusInput,
    ) -> Result<Option<statuses::Model>> {
        self.master_data_repo().update_status(id, input).await
    }

    pub async fn delete_status(&self, id: i32) -> Result<bool> {
        self.master_data_repo().delete_status(id).await
    }

    pub async fn list_department_persons(
        &self,
        department_id: Option<i32>,
    ) -> Result<Vec<department_persons::Model>> {
        self.master_data_repo()
            .list_department_persons(department_id)
            .await
    }

    pub async fn create_department_person(
        &self,
        input: DepartmentPersonInput,
    ) -> Result<department_persons::Model> {
        self.master_data_repo().create_department_person(input).await
    }

    pub async fn update_department_person(
        &self,
        id: i32,
        input: DepartmentPersonInput,
    ) -> Result<Option<department_persons::Model>> {
        self.master_data_repo()
            .update_department_person(id, input)
            .await
    }

    pub async fn delete_department_person(&self, id: i32) -> Result<bool> {
        self.master_data_repo().delete_department_person(id).await
    }

    pub async fn list_type_persons(
        &self,
        request_type_id: Option<i32>,
    ) -> Result<Vec<type_persons::Model>> {
        self.master_data_repo()
            .list_type_persons(request_type_id)
            .await
    }

    pub async fn create_type_person(&self, input: TypePersonInput) -> Result<type_persons::Model> {
        self.master_data_repo().create_type_person(input).await
    }

    pub async fn update_type_person(
        &self,
        id: i32,
        input: TypePersonInput,
    ) -> Result<Option<type_persons::Model>> {
        self.master_data_repo().update_type_person(id, input).await
    }

    pub async fn delete_type_person(&self, id: i32) -> Result<bool> {
        self.master_data_repo().delete_type_person(id).await
    }

    // --- Requests ---

    pub async fn create_request(&self, input: NewRequest) -> Result<service_requests::Model> {
        self.request_repo().create(input).await
    }

    pub async fn get_request(&self, id: i32) -> Result<Option<service_requests::Model>> {
        self.request_repo().get(id).await
    }

    pub async fn list_requests(&self, scope: RequestScope) -> Result<Vec<RequestSummary>> {
        self.request_repo().list(scope).await
    }

    pub async fn get_request_detail(&self, id: i32) -> Result<Option<RequestDetail>> {
        self.request_repo().get_detail(id).await
    }

    pub async fn add_reply(
        &self,
        request_id: i32,
        user_id: i32,
        body: &str,
        status_id: i32,
    ) -> Result<replies::Model> {
        self.request_repo()
            .add_reply(request_id, user_id, body, status_id)
            .await
    }

    pub async fn assign_request(
        &self,
        request_id: i32,
        assignee_id: i32,
        assigned_by_id: i32,
        note: Option<String>,
        reply_body: &str,
    ) -> Result<service_requests::Model> {
        self.request_repo()
            .assign(request_id, assignee_id, assigned_by_id, note, reply_body)
            .await
    }

    pub async fn set_request_approval(
        &self,
        request_id: i32,
        decision: &str,
        decided_by_id: i32,
        note: Option<String>,
        reply_body: &str,
    ) -> Result<service_requests::Model> {
        self.request_repo()
            .set_approval(request_id, decision, decided_by_id, note, reply_body)
            .await
    }

    pub async fn set_request_status(
        &self,
        request_id: i32,
        new_status_id: i32,
        changed_by_id: i32,
        reply_body: &str,
    ) -> Result<service_requests::Model> {
        self.request_repo()
            .set_status(request_id, new_status_id, changed_by_id, reply_body)
            .await
    }

    pub async fn department_users(&self, department_id: i32) -> Result<Vec<UserRef>> {
        self.request_repo().department_users(department_id).await
    }

    // --- Analytics ---

    pub async fn requests_in_range(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<service_requests::Model>> {
        self.analytics_repo().requests_in_range(from, to).await
    }

    pub async fn all_statuses(&self) -> Result<Vec<statuses::Model>> {
        self.analytics_repo().all_statuses().await
    }

    pub async fn type_departments(&self) -> Result<HashMap<i32, (String, i32)>> {
        self.analytics_repo().type_departments().await
    }

    pub async fn department_names(&self) -> Result<HashMap<i32, String>> {
        self.analytics_repo().department_names().await
    }

    pub async fn users_by_id(&self) -> Result<HashMap<i32, UserRef>> {
        self.analytics_repo().users_by_id().await
    }
}
