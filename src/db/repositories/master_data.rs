use std::collections::HashMap;

use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::entities::{
    department_persons, departments, prelude::*, request_types, service_types, statuses,
    type_persons,
};

#[derive(Debug, Clone)]
pub struct DepartmentInput {
    pub name: String,
    pub description: Option<String>,
    pub cc_email: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ServiceTypeInput {
    pub name: String,
    pub description: Option<String>,
    pub sequence: i32,
}

#[derive(Debug, Clone)]
pub struct RequestTypeInput {
    pub name: String,
    pub description: Option<String>,
    pub sequence: i32,
    pub service_type_id: i32,
    pub department_id: i32,
    pub default_priority: Option<String>,
}

#[derive(Debug, Clone)]
pub struct StatusInput {
    pub name: String,
    pub system_name: String,
    pub sequence: i32,
    pub description: Option<String>,
    pub is_open: bool,
    pub is_terminal: bool,
    pub is_allowed_for_technician: bool,
}

#[derive(Debug, Clone)]
pub struct DepartmentPersonInput {
    pub department_id: i32,
    pub user_id: i32,
    pub is_hod: bool,
    pub from_date: String,
    pub to_date: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TypePersonInput {
    pub request_type_id: i32,
    pub user_id: i32,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
    pub description: Option<String>,
}

pub struct MasterDataRepository {
    conn: DatabaseConnection,
}

impl MasterDataRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    // --- Departments ---

    pub async fn list_departments(&self) -> Result<Vec<departments::Model>> {
        Departments::find()
            .order_by_asc(departments::Column::Name)
            .all(&self.conn)
            .await
            .context("Failed to list departments")
    }

    pub async fn get_department(&self, id: i32) -> Result<Option<departments::Model>> {
        Departments::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query department")
    }

    pub async fn create_department(&self, input: DepartmentInput) -> Result<departments::Model> {
        let now = chrono::Utc::now().to_rfc3339();

        departments::ActiveModel {
            name: Set(input.name),
            description: Set(input.description),
            cc_email: Set(input.cc_email),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert department")
    }

    pub async fn update_department(
        &self,
        id: i32,
        input: DepartmentInput,
    ) -> Result<Option<departments::Model>> {
        let Some(existing) = self.get_department(id).await? else {
            return Ok(None);
        };

        let mut active: departments::ActiveModel = existing.into();
        active.name = Set(input.name);
        active.description = Set(input.description);
        active.cc_email = Set(input.cc_email);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let updated = active
            .update(&self.conn)
            .await
            .context("Failed to update department")?;

        Ok(Some(updated))
    }

    pub async fn delete_department(&self, id: i32) -> Result<bool> {
        let result = Departments::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete department")?;

        Ok(result.rows_affected > 0)
    }

    pub async fn departments_by_id(&self) -> Result<HashMap<i32, departments::Model>> {
        let departments = self.list_departments().await?;
        Ok(departments.into_iter().map(|d| (d.id, d)).collect())
    }

    // --- Service types ---

    pub async fn list_service_types(&self) -> Result<Vec<service_types::Model>> {
        ServiceTypes::find()
            .order_by_asc(service_types::Column::Sequence)
            .all(&self.conn)
            .await
            .context("Failed to list service types")
    }

    pub async fn create_service_type(
        &self,
        input: ServiceTypeInput,
    ) -> Result<service_types::Model> {
        service_types::ActiveModel {
            name: Set(input.name),
            description: Set(input.description),
            sequence: Set(input.sequence),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert service type")
    }

    pub async fn update_service_type(
        &self,
        id: i32,
        input: ServiceTypeInput,
    ) -> Result<Option<service_types::Model>> {
        let existing = ServiceTypes::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query service type")?;

        let Some(existing) = existing else {
            return Ok(None);
        };

        let mut active: service_types::ActiveModel = existing.into();
        active.name = Set(input.name);
        active.description = Set(input.description);
        active.sequence = Set(input.sequence);

        let updated = active
            .update(&self.conn)
            .await
            .context("Failed to update service type")?;

        Ok(Some(updated))
    }

    pub async fn delete_service_type(&self, id: i32) -> Result<bool> {
        let result = ServiceTypes::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete service type")?;

        Ok(result.rows_affected > 0)
    }

    // --- Request types ---

    /// Request types, optionally narrowed to one service type, each with
    /// its owning department.
    pub async fn list_request_types(
        &self,
        service_type_id: Option<i32>,
    ) -> Result<Vec<(request_types::Model, Option<departments::Model>)>> {
        let mut query = RequestTypes::find().order_by_asc(request_types::Column::Sequence);

        if let Some(st_id) = service_type_id {
            query = query.filter(request_types::Column::ServiceTypeId.eq(st_id));
        }

        let types = query
            .all(&self.conn)
            .await
            .context("Failed to list request types")?;

        let departments = self.departments_by_id().await?;

        Ok(types
            .into_iter()
            .map(|t| {
                let department = departments.get(&t.department_id).cloned();
                (t, department)
            })
            .collect())
    }

    pub async fn get_request_type(&self, id: i32) -> Result<Option<request_types::Model>> {
        RequestTypes::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query request type")
    }

    pub async fn create_request_type(
        &self,
        input: RequestTypeInput,
    ) -> Result<request_types::Model> {
        request_types::ActiveModel {
            name: Set(input.name),
            description: Set(input.description),
            sequence: Set(input.sequence),
            service_type_id: Set(input.service_type_id),
            department_id: Set(input.department_id),
            default_priority: Set(input.default_priority),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert request type")
    }

    pub async fn update_request_type(
        &self,
        id: i32,
        input: RequestTypeInput,
    ) -> Result<Option<request_types::Model>> {
        let Some(existing) = self.get_request_type(id).await? else {
            return Ok(None);
        };

        let mut active: request_types::ActiveModel = existing.into();
        active.name = Set(input.name);
        active.description = Set(input.description);
        active.sequence = Set(input.sequence);
        active.service_type_id = Set(input.service_type_id);
        active.department_id = Set(input.department_id);
        active.default_priority = Set(input.default_priority);

        let updated = active
            .update(&self.conn)
            .await
            .context("Failed to update request type")?;

        Ok(Some(updated))
    }

    pub async fn delete_request_type(&self, id: i32) -> Result<bool> {
        let result = RequestTypes::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete request type")?;

        Ok(result.rows_affected > 0)
    }

    // --- Statuses ---

    pub async fn list_statuses(&self) -> Result<Vec<statuses::Model>> {
        Statuses::find()
            .order_by_asc(statuses::Column::Sequence)
            .all(&self.conn)
            .await
            .context("Failed to list statuses")
    }

    pub async fn get_status(&self, id: i32) -> Result<Option<statuses::Model>> {
        Statuses::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query status")
    }

    /// The status new requests start in: the lowest sequence number.
    pub async fn default_status(&self) -> Result<Option<statuses::Model>> {
        Statuses::find()
            .order_by_asc(statuses::Column::Sequence)
            .one(&self.conn)
            .await
            .context("Failed to query default status")
    }

    pub async fn create_status(&self, input: StatusInput) -> Result<statuses::Model> {
        statuses::ActiveModel {
            name: Set(input.name),
            system_name: Set(input.system_name),
            sequence: Set(input.sequence),
            description: Set(input.description),
            is_open: Set(input.is_open),
            is_terminal: Set(input.is_terminal),
            is_allowed_for_technician: Set(input.is_allowed_for_technician),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert status")
    }

    pub async fn update_status(
        &self,
        id: i32,
        input: StatusInput,
    ) -> Result<Option<statuses::Model>> {
        let Some(existing) = self.get_status(id).await? else {
            return Ok(None);
        };

        let mut active: statuses::ActiveModel = existing.into();
        active.name = Set(input.name);
        active.system_name = Set(input.system_name);
        active.sequence = Set(input.sequence);
        active.description = Set(input.description);
        active.is_open = Set(input.is_open);
        active.is_terminal = Set(input.is_terminal);
        active.is_allowed_for_technician = Set(input.is_allowed_for_technician);

        let updated = active
            .update(&self.conn)
            .await
            .context("Failed to update status")?;

        Ok(Some(updated))
    }

    pub async fn delete_status(&self, id: i32) -> Result<bool> {
        let result = Statuses::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete status")?;

        Ok(result.rows_affected > 0)
    }

    // --- Department staff ---

    pub async fn list_department_persons(
        &self,
        department_id: Option<i32>,
    ) -> Result<Vec<department_persons::Model>> {
        let mut query = DepartmentPersons::find();

        if let Some(dept_id) = department_id {
            query = query.filter(department_persons::Column::DepartmentId.eq(dept_id));
        }

        query
            .all(&self.conn)
            .await
            .context("Failed to list department staff")
    }

    pub async fn create_department_person(
        &self,
        input: DepartmentPersonInput,
    ) -> Result<department_persons::Model> {
        department_persons::ActiveModel {
            department_id: Set(input.department_id),
            user_id: Set(input.user_id),
            is_hod: Set(input.is_hod),
            from_date: Set(input.from_date),
            to_date: Set(input.to_date),
            description: Set(input.description),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert department staff entry")
    }

    pub async fn update_department_person(
        &self,
        id: i32,
        input: DepartmentPersonInput,
    ) -> Result<Option<department_persons::Model>> {
        let existing = DepartmentPersons::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query department staff entry")?;

        let Some(existing) = existing else {
            return Ok(None);
        };

        let mut active: department_persons::ActiveModel = existing.into();
        active.department_id = Set(input.department_id);
        active.user_id = Set(input.user_id);
        active.is_hod = Set(input.is_hod);
        active.from_date = Set(input.from_date);
        active.to_date = Set(input.to_date);
        active.description = Set(input.description);

        let updated = active
            .update(&self.conn)
            .await
            .context("Failed to update department staff entry")?;

        Ok(Some(updated))
    }

    pub async fn delete_department_person(&self, id: i32) -> Result<bool> {
        let result = DepartmentPersons::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete department staff entry")?;

        Ok(result.rows_affected > 0)
    }

    // --- Request type rosters ---

    pub async fn list_type_persons(
        &self,
        request_type_id: Option<i32>,
    ) -> Result<Vec<type_persons::Model>> {
        let mut query = TypePersons::find();

        if let Some(rt_id) = request_type_id {
            query = query.filter(type_persons::Column::RequestTypeId.eq(rt_id));
        }

        query
            .all(&self.conn)
            .await
            .context("Failed to list request type roster")
    }

    pub async fn create_type_person(
        &self,
        input: TypePersonInput,
    ) -> Result<type_persons::Model> {
        type_persons::ActiveModel {
            request_type_id: Set(input.request_type_id),
            user_id: Set(input.user_id),
            from_date: Set(input.from_date),
            to_date: Set(input.to_date),
            description: Set(input.description),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert roster entry")
    }

    pub async fn update_type_person(
        &self,
        id: i32,
        input: TypePersonInput,
    ) -> Result<Option<type_persons::Model>> {
        let existing = TypePersons::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query roster entry")?;

        let Some(existing) = existing else {
            return Ok(None);
        };

        let mut active: type_persons::ActiveModel = existing.into();
        active.request_type_id = Set(input.request_type_id);
        active.user_id = Set(input.user_id);
        active.from_date = Set(input.from_date);
        active.to_date = Set(input.to_date);
        active.description = Set(input.description);

        let updated = active
            .update(&self.conn)
            .await
            .context("Failed to update roster entry")?;

        Ok(Some(updated))
    }

    pub async fn delete_type_person(&self, id: i32) -> Result<bool> {
        let result = TypePersons::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete roster entry")?;

        Ok(result.rows_affected > 0)
    }
}
