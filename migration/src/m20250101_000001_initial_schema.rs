use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Enable foreign keys for SQLite
        if manager.get_database_backend() == sea_orm::DatabaseBackend::Sqlite {
            manager
                .get_connection()
                .execute_unprepared("PRAGMA foreign_keys = ON")
                .await?;
        }

        manager
            .create_table(
                Table::create()
                    .table(Departments::Table)
                    .if_not_exists()
                    .col(pk_auto(Departments::Id))
                    .col(string(Departments::Name))
                    .col(integer_null(Departments::ParentId))
                    .col(big_integer(Departments::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_departments_parent")
                            .from(Departments::Table, Departments::ParentId)
                            .to(Departments::Table, Departments::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(pk_auto(Users::Id))
                    .col(string_uniq(Users::Email))
                    .col(string(Users::PasswordHash))
                    .col(string(Users::Name))
                    .col(
                        ColumnDef::new(Users::Role)
                            .string()
                            .not_null()
                            .default("employee"),
                    )
                    .col(integer_null(Users::DepartmentId))
                    .col(integer_null(Users::ManagerId))
                    .col(big_integer(Users::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_users_department")
                            .from(Users::Table, Users::DepartmentId)
                            .to(Departments::Table, Departments::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_users_manager")
                            .from(Users::Table, Users::ManagerId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Folders::Table)
                    .if_not_exists()
                    .col(pk_auto(Folders::Id))
                    .col(string(Folders::Name))
                    .col(integer_null(Folders::ParentId))
                    .col(integer_null(Folders::OwnerId))
                    .col(string(Folders::FolderType))
                    .col(big_integer(Folders::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_folders_parent")
                            .from(Folders::Table, Folders::ParentId)
                            .to(Folders::Table, Folders::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_folders_owner")
                            .from(Folders::Table, Folders::OwnerId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Files::Table)
                    .if_not_exists()
                    .col(pk_auto(Files::Id))
                    .col(string(Files::Name))
                    .col(string(Files::OriginalName))
                    .col(string(Files::FilePath))
                    .col(string_null(Files::MimeType))
                    .col(big_integer_null(Files::Size))
                    .col(integer_null(Files::FolderId))
                    .col(integer(Files::UploadedBy))
                    .col(big_integer(Files::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_files_folder")
                            .from(Files::Table, Files::FolderId)
                            .to(Folders::Table, Folders::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_files_uploaded_by")
                            .from(Files::Table, Files::UploadedBy)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CareerRecords::Table)
                    .if_not_exists()
                    .col(pk_auto(CareerRecords::Id))
                    .col(integer(CareerRecords::UserId))
                    .col(string(CareerRecords::Category))
                    .col(string(CareerRecords::Title))
                    .col(text_null(CareerRecords::Description))
                    .col(date(CareerRecords::RecordDate))
                    .col(date_null(CareerRecords::ExpiryDate))
                    .col(string_null(CareerRecords::AttachmentPath))
                    .col(big_integer(CareerRecords::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_career_records_user")
                            .from(CareerRecords::Table, CareerRecords::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CompanyDocuments::Table)
                    .if_not_exists()
                    .col(pk_auto(CompanyDocuments::Id))
                    .col(string(CompanyDocuments::Title))
                    .col(string(CompanyDocuments::Category))
                    .col(string(CompanyDocuments::FilePath))
                    .col(
                        ColumnDef::new(CompanyDocuments::Version)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(integer(CompanyDocuments::UploadedBy))
                    .col(big_integer(CompanyDocuments::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_company_documents_uploaded_by")
                            .from(CompanyDocuments::Table, CompanyDocuments::UploadedBy)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CompanyDocuments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CareerRecords::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Files::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Folders::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Departments::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
pub(crate) enum Departments {
    Table,
    Id,
    Name,
    ParentId,
    CreatedAt,
}

#[derive(DeriveIden)]
pub(crate) enum Users {
    Table,
    Id,
    Email,
    PasswordHash,
    Name,
    Role,
    DepartmentId,
    ManagerId,
    CreatedAt,
}

#[derive(DeriveIden)]
pub(crate) enum Folders {
    Table,
    Id,
    Name,
    ParentId,
    OwnerId,
    FolderType,
    CreatedAt,
}

#[derive(DeriveIden)]
pub(crate) enum Files {
    Table,
    Id,
    Name,
    OriginalName,
    FilePath,
    MimeType,
    Size,
    FolderId,
    UploadedBy,
    CreatedAt,
}

#[derive(DeriveIden)]
pub(crate) enum CareerRecords {
    Table,
    Id,
    UserId,
    Category,
    Title,
    Description,
    RecordDate,
    ExpiryDate,
    AttachmentPath,
    CreatedAt,
}

#[derive(DeriveIden)]
enum CompanyDocuments {
    Table,
    Id,
    Title,
    Category,
    FilePath,
    Version,
    UploadedBy,
    CreatedAt,
}
