//! `SeaORM` implementation of the `MasterDataService` trait.

use async_trait::async_trait;

use crate::db::{
    DepartmentInput, DepartmentPersonInput, RequestTypeInput, ServiceTypeInput, StatusInput, Store,
    TypePersonInput, User,
};
use crate::domain::{Identity, Role};
use crate::entities::{
    department_persons, departments, request_types, service_types, statuses, type_persons,
};
use crate::services::master_data_service::{MasterDataError, MasterDataService};

pub struct SeaOrmMasterDataService {
    store: Store,
}

impl SeaOrmMasterDataService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

fn require_admin(identity: &Identity) -> Result<(), MasterDataError> {
    if identity.role.can_manage_master_data() {
        Ok(())
    } else {
        Err(MasterDataError::Unauthorized)
    }
}

fn require_name(name: &str) -> Result<(), MasterDataError> {
    if name.trim().is_empty() {
        return Err(MasterDataError::Validation(
            "Name must not be empty".to_string(),
        ));
    }
    Ok(())
}

#[async_trait]
impl MasterDataService for SeaOrmMasterDataService {
    async fn list_departments(&self) -> Result<Vec<departments::Model>, MasterDataError> {
        Ok(self.store.list_departments().await?)
    }

    async fn create_department(
        &self,
        identity: &Identity,
        input: DepartmentInput,
    ) -> Result<departments::Model, MasterDataError> {
        require_admin(identity)?;
        require_name(&input.name)?;
        Ok(self.store.create_department(input).await?)
    }

    async fn update_department(
        &self,
        identity: &Identity,
        id: i32,
        input: DepartmentInput,
    ) -> Result<departments::Model, MasterDataError> {
        require_admin(identity)?;
        require_name(&input.name)?;
        self.store
            .update_department(id, input)
            .await?
            .ok_or(MasterDataError::NotFound)
    }

    async fn delete_department(
        &self,
        identity: &Identity,
        id: i32,
    ) -> Result<(), MasterDataError> {
        require_admin(identity)?;
        if self.store.delete_department(id).await? {
            Ok(())
        } else {
            Err(MasterDataError::NotFound)
        }
    }

    async fn list_service_types(&self) -> Result<Vec<service_types::Model>, MasterDataError> {
        Ok(self.store.list_service_types().await?)
    }

    async fn create_service_type(
        &self,
        identity: &Identity,
        input: ServiceTypeInput,
    ) -> Result<service_types::Model, MasterDataError> {
        require_admin(identity)?;
        require_name(&input.name)?;
        Ok(self.store.create_service_type(input).await?)
    }

    async fn update_service_type(
        &self,
        identity: &Identity,
        id: i32,
        input: ServiceTypeInput,
    ) -> Result<service_types::Model, MasterDataError> {
        require_admin(identity)?;
        require_name(&input.name)?;
        self.store
            .update_service_type(id, input)
            .await?
            .ok_or(MasterDataError::NotFound)
    }

    async fn delete_service_type(
        &self,
        identity: &Identity,
        id: i32,
    ) -> Result<(), MasterDataError> {
        require_admin(identity)?;
        if self.store.delete_service_type(id).await? {
            Ok(())
        } else {
            Err(MasterDataError::NotFound)
        }
    }

    async fn list_request_types(
        &self,
        service_type_id: Option<i32>,
    ) -> Result<Vec<(request_types::Model, Option<departments::Model>)>, MasterDataError> {
        Ok(self.store.list_request_types(service_type_id).await?)
    }

    async fn create_request_type(
        &self,
        identity: &Identity,
        input: RequestTypeInput,
    ) -> Result<request_types::Model, MasterDataError> {
        require_admin(identity)?;
        require_name(&input.name)?;

        // Reject dangling references up front; sqlite will not.
        if self.store.get_department(input.department_id).await?.is_none() {
            return Err(MasterDataError::Validation(
                "Department does not exist".to_string(),
            ));
        }

        Ok(self.store.create_request_type(input).await?)
    }

    async fn update_request_type(
        &self,
        identity: &Identity,
        id: i32,
        input: RequestTypeInput,
    ) -> Result<request_types::Model, MasterDataError> {
        require_admin(identity)?;
        require_name(&input.name)?;
        self.store
            .update_request_type(id, input)
            .await?
            .ok_or(MasterDataError::NotFound)
    }

    async fn delete_request_type(
        &self,
        identity: &Identity,
        id: i32,
    ) -> Result<(), MasterDataError> {
        require_admin(identity)?;
        if self.store.delete_request_type(id).await? {
            Ok(())
        } else {
            Err(MasterDataError::NotFound)
        }
    }

    async fn list_statuses(&self) -> Result<Vec<statuses::Model>, MasterDataError> {
        Ok(self.store.list_statuses().await?)
    }

    async fn create_status(
        &self,
        identity: &Identity,
        input: StatusInput,
    ) -> Result<statuses::Model, MasterDataError> {
        require_admin(identity)?;
        require_name(&input.name)?;
        Ok(self.store.create_status(input).await?)
    }

    async fn update_status(
        &self,
        identity: &Identity,
        id: i32,
        input: StatusInput,
    ) -> Result<statuses::Model, MasterDataError> {
        require_admin(identity)?;
        require_name(&input.name)?;
        self.store
            .update_status(id, input)
            .await?
            .ok_or(MasterDataError::NotFound)
    }

    async fn delete_status(&self, identity: &Identity, id: i32) -> Result<(), MasterDataError> {
        require_admin(identity)?;
        if self.store.delete_status(id).await? {
            Ok(())
        } else {
            Err(MasterDataError::NotFound)
        }
    }

    async fn list_department_persons(
        &self,
        department_id: Option<i32>,
    ) -> Result<Vec<department_persons::Model>, MasterDataError> {
        Ok(self.store.list_department_persons(department_id).await?)
    }

    async fn create_department_person(
        &self,
        identity: &Identity,
        input: DepartmentPersonInput,
    ) -> Result<department_persons::Model, MasterDataError> {
        require_admin(identity)?;
        Ok(self.store.create_department_person(input).await?)
    }

    async fn update_department_person(
        &self,
        identity: &Identity,
        id: i32,
        input: DepartmentPersonInput,
    ) -> Result<department_persons::Model, MasterDataError> {
        require_admin(identity)?;
        self.store
            .update_department_person(id, input)
            .await?
            .ok_or(MasterDataError::NotFound)
    }

    async fn delete_department_person(
        &self,
        identity: &Identity,
        id: i32,
    ) -> Result<(), MasterDataError> {
        require_admin(identity)?;
        if self.store.delete_department_person(id).await? {
            Ok(())
        } else {
            Err(MasterDataError::NotFound)
        }
    }

    async fn list_type_persons(
        &self,
        request_type_id: Option<i32>,
    ) -> Result<Vec<type_persons::Model>, MasterDataError> {
        Ok(self.store.list_type_persons(request_type_id).await?)
    }

    async fn create_type_person(
        &self,
        identity: &Identity,
        input: TypePersonInput,
    ) -> Result<type_persons::Model, MasterDataError> {
        require_admin(identity)?;
        Ok(self.store.create_type_person(input).await?)
    }

    async fn update_type_person(
        &self,
        identity: &Identity,
        id: i32,
        input: TypePersonInput,
    ) -> Result<type_persons::Model, MasterDataError> {
        require_admin(identity)?;
        self.store
            .update_type_person(id, input)
            .await?
            .ok_or(MasterDataError::NotFound)
    }

    async fn delete_type_person(
        &self,
        identity: &Identity,
        id: i32,
    ) -> Result<(), MasterDataError> {
        require_admin(identity)?;
        if self.store.delete_type_person(id).await? {
            Ok(())
        } else {
            Err(MasterDataError::NotFound)
        }
    }

    async fn list_profiles(&self) -> Result<Vec<User>, MasterDataError> {
        Ok(self.store.list_users().await?)
    }

    async fn set_user_role(
        &self,
        identity: &Identity,
        user_id: i32,
        role: Role,
    ) -> Result<User, MasterDataError> {
        require_admin(identity)?;

        self.store
            .get_user_by_id(user_id)
            .await?
            .ok_or(MasterDataError::NotFound)?;

        self.store.set_user_role(user_id, role).await?;

        self.store
            .get_user_by_id(user_id)
            .await?
            .ok_or(MasterDataError::NotFound)
    }
}
