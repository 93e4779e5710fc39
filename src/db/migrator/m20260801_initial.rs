use crate::entities::prelude::*;
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Schema;

#[derive(DeriveMigrationName)]
pub struct Migration;

const DEFAULT_ADMIN_EMAIL: &str = "admin@deskarr.local";

/// Hash the default admin password using Argon2id
fn hash_default_password() -> String {
    use argon2::{
        Argon2,
        password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
    };

    let password = b"password";
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password, &salt)
        .expect("Failed to hash default password")
        .to_string()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let schema = Schema::new(backend);

        manager
            .create_table(
                schema
                    .create_table_from_entity(Users)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(UserRoles)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Departments)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(DepartmentPersons)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(ServiceTypes)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(RequestTypes)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(TypePersons)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Statuses)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(ServiceRequests)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Replies)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        seed_statuses(manager).await?;
        seed_admin(manager).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for stmt in [
            Table::drop().table(Replies).to_owned(),
            Table::drop().table(ServiceRequests).to_owned(),
            Table::drop().table(Statuses).to_owned(),
            Table::drop().table(TypePersons).to_owned(),
            Table::drop().table(RequestTypes).to_owned(),
            Table::drop().table(ServiceTypes).to_owned(),
            Table::drop().table(DepartmentPersons).to_owned(),
            Table::drop().table(Departments).to_owned(),
            Table::drop().table(UserRoles).to_owned(),
            Table::drop().table(Users).to_owned(),
        ] {
            manager.drop_table(stmt).await?;
        }

        Ok(())
    }
}

/// Seeds the baseline status ladder. Sequences leave gaps so custom
/// statuses can slot between them.
async fn seed_statuses(manager: &SchemaManager<'_>) -> Result<(), DbErr> {
    use crate::entities::statuses::Column;

    let rows: [(&str, &str, i32, bool, bool, bool); 5] = [
        ("Open", "open", 10, true, false, false),
        ("In Progress", "in_progress", 20, true, false, true),
        ("Pending Approval", "pending_approval", 30, true, false, false),
        ("Resolved", "resolved", 40, false, true, true),
        ("Closed", "closed", 50, false, true, false),
    ];

    for (name, system_name, sequence, is_open, is_terminal, for_technician) in rows {
        let insert = sea_orm_migration::sea_query::Query::insert()
            .into_table(Statuses)
            .columns([
                Column::Name,
                Column::SystemName,
                Column::Sequence,
                Column::IsOpen,
                Column::IsTerminal,
                Column::IsAllowedForTechnician,
            ])
            .values_panic([
                name.into(),
                system_name.into(),
                sequence.into(),
                is_open.into(),
                is_terminal.into(),
                for_technician.into(),
            ])
            .to_owned();

        manager.exec_stmt(insert).await?;
    }

    Ok(())
}

/// Seeds the default admin account with a hashed password.
async fn seed_admin(manager: &SchemaManager<'_>) -> Result<(), DbErr> {
    let now = chrono::Utc::now().to_rfc3339();
    let password_hash = hash_default_password();

    let insert = sea_orm_migration::sea_query::Query::insert()
        .into_table(Users)
        .columns([
            crate::entities::users::Column::Email,
            crate::entities::users::Column::Name,
            crate::entities::users::Column::PasswordHash,
            crate::entities::users::Column::CreatedAt,
            crate::entities::users::Column::UpdatedAt,
        ])
        .values_panic([
            DEFAULT_ADMIN_EMAIL.into(),
            "Administrator".into(),
            password_hash.into(),
            now.clone().into(),
            now.into(),
        ])
        .to_owned();

    manager.exec_stmt(insert).await?;

    // The seeded admin is always user id 1 in a fresh database.
    let role_insert = sea_orm_migration::sea_query::Query::insert()
        .into_table(UserRoles)
        .columns([
            crate::entities::user_roles::Column::UserId,
            crate::entities::user_roles::Column::Role,
        ])
        .values_panic([1.into(), "admin".into()])
        .to_owned();

    manager.exec_stmt(role_insert).await?;

    Ok(())
}
