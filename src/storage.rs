use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use migration::MigratorTrait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, Database, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};

use crate::authz::{
    AuthzError, Classification, Directory, FolderRef, OwnerScope, Principal, PrincipalId,
    RecordStore, Role, RootFolderScope, Target,
};
use crate::entities;
use crate::errors::ShokoError;
use crate::settings::Database as DbCfg;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub id: i32,
    pub name: String,
    pub parent_id: Option<i32>,
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: PrincipalId,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub name: String,
    pub role: Role,
    pub department_id: Option<i32>,
    pub manager_id: Option<PrincipalId>,
    pub created_at: i64,
}

impl User {
    pub fn principal(&self) -> Principal {
        Principal {
            id: self.id,
            role: self.role,
            department_id: self.department_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub password: String,
    pub role: Role,
    #[serde(default)]
    pub department_id: Option<i32>,
    #[serde(default)]
    pub manager_id: Option<PrincipalId>,
}

/// Directory fields that an update may overwrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserUpdate {
    pub name: String,
    pub role: Role,
    pub department_id: Option<i32>,
    pub manager_id: Option<PrincipalId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    pub id: i32,
    pub name: String,
    pub parent_id: Option<i32>,
    pub owner_id: Option<PrincipalId>,
    pub classification: Classification,
    pub created_at: i64,
}

impl Folder {
    pub fn access(&self) -> FolderRef {
        FolderRef {
            owner_id: self.owner_id,
            classification: self.classification,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: i32,
    pub name: String,
    pub original_name: String,
    pub file_path: String,
    pub mime_type: Option<String>,
    pub size: Option<i64>,
    pub folder_id: Option<i32>,
    pub uploaded_by: PrincipalId,
    pub created_at: i64,
}

impl FileRecord {
    pub fn target(&self) -> Target {
        Target::File {
            owner_id: self.uploaded_by,
        }
    }
}

/// Metadata for a stored upload. Writing the bytes is the caller's job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewFile {
    pub name: String,
    pub original_name: String,
    pub file_path: String,
    pub mime_type: Option<String>,
    pub size: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CareerCategory {
    Skill,
    Rank,
    Training,
    Certificate,
    Evaluation,
}

impl CareerCategory {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skill" => Some(CareerCategory::Skill),
            "rank" => Some(CareerCategory::Rank),
            "training" => Some(CareerCategory::Training),
            "certificate" => Some(CareerCategory::Certificate),
            "evaluation" => Some(CareerCategory::Evaluation),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CareerCategory::Skill => "skill",
            CareerCategory::Rank => "rank",
            CareerCategory::Training => "training",
            CareerCategory::Certificate => "certificate",
            CareerCategory::Evaluation => "evaluation",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CareerRecord {
    pub id: i32,
    pub owner_id: PrincipalId,
    pub category: CareerCategory,
    pub title: String,
    pub description: Option<String>,
    pub record_date: NaiveDate,
    pub expiry_date: Option<NaiveDate>,
    pub attachment_path: Option<String>,
    pub created_at: i64,
}

impl CareerRecord {
    pub fn target(&self) -> Target {
        Target::CareerRecord {
            owner_id: self.owner_id,
        }
    }
}

/// A career record together with its owner's display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CareerRecordView {
    #[serde(flatten)]
    pub record: CareerRecord,
    pub owner_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCareerRecord {
    pub category: CareerCategory,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub record_date: NaiveDate,
    #[serde(default)]
    pub expiry_date: Option<NaiveDate>,
    #[serde(default)]
    pub attachment_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyDocument {
    pub id: i32,
    pub title: String,
    pub category: String,
    pub file_path: String,
    pub version: i32,
    pub uploaded_by: PrincipalId,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCompanyDocument {
    pub title: String,
    pub category: String,
    pub file_path: String,
}

impl From<entities::department::Model> for Department {
    fn from(m: entities::department::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            parent_id: m.parent_id,
            created_at: m.created_at,
        }
    }
}

impl From<entities::user::Model> for User {
    fn from(m: entities::user::Model) -> Self {
        Self {
            id: m.id,
            email: m.email,
            password_hash: m.password_hash,
            name: m.name,
            role: Role::parse(&m.role),
            department_id: m.department_id,
            manager_id: m.manager_id,
            created_at: m.created_at,
        }
    }
}

impl From<entities::folder::Model> for Folder {
    fn from(m: entities::folder::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            parent_id: m.parent_id,
            owner_id: m.owner_id,
            classification: Classification::parse(&m.folder_type),
            created_at: m.created_at,
        }
    }
}

impl From<entities::file::Model> for FileRecord {
    fn from(m: entities::file::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            original_name: m.original_name,
            file_path: m.file_path,
            mime_type: m.mime_type,
            size: m.size,
            folder_id: m.folder_id,
            uploaded_by: m.uploaded_by,
            created_at: m.created_at,
        }
    }
}

impl TryFrom<entities::career_record::Model> for CareerRecord {
    type Error = ShokoError;

    fn try_from(m: entities::career_record::Model) -> Result<Self, Self::Error> {
        let category = CareerCategory::parse(&m.category).ok_or_else(|| {
            ShokoError::Other(format!(
                "career record {} has unknown category `{}`",
                m.id, m.category
            ))
        })?;
        Ok(Self {
            id: m.id,
            owner_id: m.user_id,
            category,
            title: m.title,
            description: m.description,
            record_date: m.record_date,
            expiry_date: m.expiry_date,
            attachment_path: m.attachment_path,
            created_at: m.created_at,
        })
    }
}

impl From<entities::company_document::Model> for CompanyDocument {
    fn from(m: entities::company_document::Model) -> Self {
        Self {
            id: m.id,
            title: m.title,
            category: m.category,
            file_path: m.file_path,
            version: m.version,
            uploaded_by: m.uploaded_by,
            created_at: m.created_at,
        }
    }
}

/// Connect and bring the schema up to date.
pub async fn init(cfg: &DbCfg) -> Result<DatabaseConnection, ShokoError> {
    let db = Database::connect(&cfg.url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

// Department functions

pub async fn create_department(
    db: &DatabaseConnection,
    name: &str,
    parent_id: Option<i32>,
) -> Result<Department, ShokoError> {
    let department = entities::department::ActiveModel {
        id: Default::default(),
        name: Set(name.to_string()),
        parent_id: Set(parent_id),
        created_at: Set(Utc::now().timestamp()),
    };

    Ok(department.insert(db).await?.into())
}

pub async fn get_department(
    db: &DatabaseConnection,
    id: i32,
) -> Result<Option<Department>, ShokoError> {
    Ok(entities::Department::find_by_id(id)
        .one(db)
        .await?
        .map(Department::from))
}

pub async fn get_department_by_name(
    db: &DatabaseConnection,
    name: &str,
) -> Result<Option<Department>, ShokoError> {
    use entities::department::{Column, Entity};

    Ok(Entity::find()
        .filter(Column::Name.eq(name))
        .one(db)
        .await?
        .map(Department::from))
}

pub async fn list_departments(db: &DatabaseConnection) -> Result<Vec<Department>, ShokoError> {
    use entities::department::{Column, Entity};

    Ok(Entity::find()
        .order_by_asc(Column::Name)
        .all(db)
        .await?
        .into_iter()
        .map(Department::from)
        .collect())
}

// User management functions

/// Local part of an email address, used where no display name is given.
pub fn name_from_email(email: &str) -> &str {
    email.split_once('@').map_or(email, |(local, _)| local)
}

pub async fn create_user(db: &DatabaseConnection, input: NewUser) -> Result<User, ShokoError> {
    use argon2::password_hash::{rand_core::OsRng, SaltString};
    use argon2::{Argon2, PasswordHasher};

    // Hash password with Argon2id
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(input.password.as_bytes(), &salt)
        .map_err(|e| ShokoError::Other(format!("Password hashing failed: {}", e)))?
        .to_string();

    let user = entities::user::ActiveModel {
        id: Default::default(),
        email: Set(input.email),
        password_hash: Set(password_hash),
        name: Set(input.name),
        role: Set(input.role.as_str().to_string()),
        department_id: Set(input.department_id),
        manager_id: Set(input.manager_id),
        created_at: Set(Utc::now().timestamp()),
    };

    Ok(user.insert(db).await?.into())
}

pub async fn get_user(db: &DatabaseConnection, id: PrincipalId) -> Result<Option<User>, ShokoError> {
    Ok(entities::User::find_by_id(id).one(db).await?.map(User::from))
}

pub async fn get_user_by_email(
    db: &DatabaseConnection,
    email: &str,
) -> Result<Option<User>, ShokoError> {
    use entities::user::{Column, Entity};

    Ok(Entity::find()
        .filter(Column::Email.eq(email))
        .one(db)
        .await?
        .map(User::from))
}

pub async fn list_users(db: &DatabaseConnection) -> Result<Vec<User>, ShokoError> {
    use entities::user::{Column, Entity};

    Ok(Entity::find()
        .order_by_asc(Column::Name)
        .all(db)
        .await?
        .into_iter()
        .map(User::from)
        .collect())
}

pub async fn list_users_by_department(
    db: &DatabaseConnection,
    department_id: i32,
) -> Result<Vec<User>, ShokoError> {
    use entities::user::{Column, Entity};

    Ok(Entity::find()
        .filter(Column::DepartmentId.eq(department_id))
        .order_by_asc(Column::Name)
        .all(db)
        .await?
        .into_iter()
        .map(User::from)
        .collect())
}

/// Users whose manager is `manager_id` (one level only)
pub async fn direct_reports(
    db: &DatabaseConnection,
    manager_id: PrincipalId,
) -> Result<Vec<User>, ShokoError> {
    use entities::user::{Column, Entity};

    Ok(Entity::find()
        .filter(Column::ManagerId.eq(manager_id))
        .order_by_asc(Column::Id)
        .all(db)
        .await?
        .into_iter()
        .map(User::from)
        .collect())
}

pub async fn update_user(
    db: &DatabaseConnection,
    id: PrincipalId,
    update: UserUpdate,
) -> Result<User, ShokoError> {
    let user = entities::User::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ShokoError::NotFound(format!("user {}", id)))?;

    let mut active: entities::user::ActiveModel = user.into();
    active.name = Set(update.name);
    active.role = Set(update.role.as_str().to_string());
    active.department_id = Set(update.department_id);
    active.manager_id = Set(update.manager_id);

    Ok(active.update(db).await?.into())
}

/// Re-point a user's reporting line. `None` makes the user a root.
pub async fn set_manager(
    db: &DatabaseConnection,
    id: PrincipalId,
    manager_id: Option<PrincipalId>,
) -> Result<(), ShokoError> {
    let user = entities::User::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ShokoError::NotFound(format!("user {}", id)))?;

    let mut active: entities::user::ActiveModel = user.into();
    active.manager_id = Set(manager_id);
    active.update(db).await?;

    Ok(())
}

pub async fn set_role(
    db: &DatabaseConnection,
    id: PrincipalId,
    role: Role,
) -> Result<User, ShokoError> {
    let user = entities::User::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ShokoError::NotFound(format!("user {}", id)))?;

    let mut active: entities::user::ActiveModel = user.into();
    active.role = Set(role.as_str().to_string());

    Ok(active.update(db).await?.into())
}

/// Check credentials; returns the user on success.
pub async fn verify_user_password(
    db: &DatabaseConnection,
    email: &str,
    password: &str,
) -> Result<Option<User>, ShokoError> {
    use argon2::{Argon2, PasswordHash, PasswordVerifier};

    let Some(user) = get_user_by_email(db, email).await? else {
        return Ok(None);
    };

    let parsed_hash = PasswordHash::new(&user.password_hash)
        .map_err(|e| ShokoError::Other(format!("Invalid password hash: {}", e)))?;

    if Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
    {
        Ok(Some(user))
    } else {
        Ok(None)
    }
}

// Folder functions

pub async fn create_folder(
    db: &DatabaseConnection,
    name: &str,
    parent_id: Option<i32>,
    owner_id: Option<PrincipalId>,
    classification: Classification,
) -> Result<Folder, ShokoError> {
    let folder = entities::folder::ActiveModel {
        id: Default::default(),
        name: Set(name.to_string()),
        parent_id: Set(parent_id),
        owner_id: Set(owner_id),
        folder_type: Set(classification.as_str().to_string()),
        created_at: Set(Utc::now().timestamp()),
    };

    Ok(folder.insert(db).await?.into())
}

pub async fn get_folder(db: &DatabaseConnection, id: i32) -> Result<Option<Folder>, ShokoError> {
    Ok(entities::Folder::find_by_id(id).one(db).await?.map(Folder::from))
}

/// Top-level folders within `scope`, ordered by folder type then name.
pub async fn root_folders(
    db: &DatabaseConnection,
    scope: RootFolderScope,
) -> Result<Vec<Folder>, ShokoError> {
    use entities::folder::{Column, Entity};

    let mut query = Entity::find().filter(Column::ParentId.is_null());
    if let RootFolderScope::CompanyOrOwnedBy(owner) = scope {
        query = query.filter(
            Condition::any()
                .add(Column::FolderType.eq(Classification::Company.as_str()))
                .add(Column::OwnerId.eq(owner)),
        );
    }

    Ok(query
        .order_by_asc(Column::FolderType)
        .order_by_asc(Column::Name)
        .all(db)
        .await?
        .into_iter()
        .map(Folder::from)
        .collect())
}

pub async fn child_folders(
    db: &DatabaseConnection,
    parent_id: i32,
) -> Result<Vec<Folder>, ShokoError> {
    use entities::folder::{Column, Entity};

    Ok(Entity::find()
        .filter(Column::ParentId.eq(parent_id))
        .order_by_asc(Column::Name)
        .all(db)
        .await?
        .into_iter()
        .map(Folder::from)
        .collect())
}

// File functions

pub async fn create_file(
    db: &DatabaseConnection,
    folder_id: Option<i32>,
    uploaded_by: PrincipalId,
    input: NewFile,
) -> Result<FileRecord, ShokoError> {
    let file = entities::file::ActiveModel {
        id: Default::default(),
        name: Set(input.name),
        original_name: Set(input.original_name),
        file_path: Set(input.file_path),
        mime_type: Set(input.mime_type),
        size: Set(input.size),
        folder_id: Set(folder_id),
        uploaded_by: Set(uploaded_by),
        created_at: Set(Utc::now().timestamp()),
    };

    Ok(file.insert(db).await?.into())
}

pub async fn get_file(db: &DatabaseConnection, id: i32) -> Result<Option<FileRecord>, ShokoError> {
    Ok(entities::File::find_by_id(id).one(db).await?.map(FileRecord::from))
}

/// Files directly inside `folder_id` (`None` = root), newest first.
pub async fn files_in_folder(
    db: &DatabaseConnection,
    folder_id: Option<i32>,
) -> Result<Vec<FileRecord>, ShokoError> {
    use entities::file::{Column, Entity};

    let query = match folder_id {
        Some(id) => Entity::find().filter(Column::FolderId.eq(id)),
        None => Entity::find().filter(Column::FolderId.is_null()),
    };

    Ok(query
        .order_by_desc(Column::CreatedAt)
        .order_by_desc(Column::Id)
        .all(db)
        .await?
        .into_iter()
        .map(FileRecord::from)
        .collect())
}

/// Newest uploads, optionally restricted to one uploader.
pub async fn recent_files(
    db: &DatabaseConnection,
    uploaded_by: Option<PrincipalId>,
    limit: u64,
) -> Result<Vec<FileRecord>, ShokoError> {
    use entities::file::{Column, Entity};

    let mut query = Entity::find();
    if let Some(uploader) = uploaded_by {
        query = query.filter(Column::UploadedBy.eq(uploader));
    }

    Ok(query
        .order_by_desc(Column::CreatedAt)
        .order_by_desc(Column::Id)
        .limit(limit)
        .all(db)
        .await?
        .into_iter()
        .map(FileRecord::from)
        .collect())
}

// Career record functions

pub async fn create_career_record(
    db: &DatabaseConnection,
    owner_id: PrincipalId,
    input: NewCareerRecord,
) -> Result<CareerRecord, ShokoError> {
    let record = entities::career_record::ActiveModel {
        id: Default::default(),
        user_id: Set(owner_id),
        category: Set(input.category.as_str().to_string()),
        title: Set(input.title),
        description: Set(input.description),
        record_date: Set(input.record_date),
        expiry_date: Set(input.expiry_date),
        attachment_path: Set(input.attachment_path),
        created_at: Set(Utc::now().timestamp()),
    };

    record.insert(db).await?.try_into()
}

pub async fn get_career_record(
    db: &DatabaseConnection,
    id: i32,
) -> Result<Option<CareerRecord>, ShokoError> {
    entities::CareerRecord::find_by_id(id)
        .one(db)
        .await?
        .map(CareerRecord::try_from)
        .transpose()
}

/// Career records within `scope` joined with owner names, newest record
/// date first; equal dates keep insertion order.
pub async fn career_records(
    db: &DatabaseConnection,
    scope: &OwnerScope,
) -> Result<Vec<CareerRecordView>, ShokoError> {
    use entities::career_record::{Column, Entity};

    let mut query = Entity::find();
    if let OwnerScope::Owners(owners) = scope {
        if owners.is_empty() {
            return Ok(Vec::new());
        }
        query = query.filter(Column::UserId.is_in(owners.iter().copied()));
    }

    let models = query
        .order_by_desc(Column::RecordDate)
        .order_by_asc(Column::Id)
        .all(db)
        .await?;

    let owner_ids: BTreeSet<PrincipalId> = models.iter().map(|m| m.user_id).collect();
    let names: HashMap<PrincipalId, String> = entities::User::find()
        .filter(entities::user::Column::Id.is_in(owner_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|u| (u.id, u.name))
        .collect();

    let mut views = Vec::with_capacity(models.len());
    for model in models {
        // Records whose owner vanished are dropped, as an inner join would
        let Some(owner_name) = names.get(&model.user_id).cloned() else {
            continue;
        };
        views.push(CareerRecordView {
            record: model.try_into()?,
            owner_name,
        });
    }
    Ok(views)
}

// Company document functions

pub async fn create_company_document(
    db: &DatabaseConnection,
    uploaded_by: PrincipalId,
    input: NewCompanyDocument,
) -> Result<CompanyDocument, ShokoError> {
    let document = entities::company_document::ActiveModel {
        id: Default::default(),
        title: Set(input.title),
        category: Set(input.category),
        file_path: Set(input.file_path),
        version: Set(1),
        uploaded_by: Set(uploaded_by),
        created_at: Set(Utc::now().timestamp()),
    };

    Ok(document.insert(db).await?.into())
}

pub async fn list_company_documents(
    db: &DatabaseConnection,
) -> Result<Vec<CompanyDocument>, ShokoError> {
    use entities::company_document::{Column, Entity};

    Ok(Entity::find()
        .order_by_asc(Column::Category)
        .order_by_asc(Column::Title)
        .all(db)
        .await?
        .into_iter()
        .map(CompanyDocument::from)
        .collect())
}

// Access-control collaborators backed by the relational store

fn lookup_error(err: ShokoError) -> AuthzError {
    match err {
        ShokoError::Db(e) => AuthzError::Db(e),
        ShokoError::Authz(e) => e,
        other => AuthzError::Lookup(other.to_string()),
    }
}

#[async_trait]
impl Directory for DatabaseConnection {
    async fn find_direct_reports(
        &self,
        manager: PrincipalId,
    ) -> Result<Vec<PrincipalId>, AuthzError> {
        self.find_direct_reports_of(&[manager]).await
    }

    async fn find_direct_reports_of(
        &self,
        managers: &[PrincipalId],
    ) -> Result<Vec<PrincipalId>, AuthzError> {
        use entities::user::{Column, Entity};

        if managers.is_empty() {
            return Ok(Vec::new());
        }

        let reports = Entity::find()
            .filter(Column::ManagerId.is_in(managers.iter().copied()))
            .order_by_asc(Column::Id)
            .all(self)
            .await?;

        Ok(reports.into_iter().map(|u| u.id).collect())
    }
}

#[async_trait]
impl RecordStore for DatabaseConnection {
    async fn career_records(
        &self,
        scope: &OwnerScope,
    ) -> Result<Vec<CareerRecordView>, AuthzError> {
        career_records(self, scope).await.map_err(lookup_error)
    }

    async fn root_folders(&self, scope: RootFolderScope) -> Result<Vec<Folder>, AuthzError> {
        root_folders(self, scope).await.map_err(lookup_error)
    }
}
