//! Request-side operations over the archive.
//!
//! Each operation resolves the target first (missing → `NotFound`), asks the
//! access engine, turns a negative decision into `Forbidden`, and only then
//! touches storage. The engine itself never fails on a denial.

use std::sync::Arc;

use sea_orm::DatabaseConnection;
use serde::Serialize;

use crate::authz::{self, AccessEngine, AuthzOptions, Classification, Principal, PrincipalId};
use crate::errors::ShokoError;
use crate::storage::{
    self, CareerRecord, CareerRecordView, CompanyDocument, FileRecord, Folder, NewCareerRecord,
    NewCompanyDocument, NewFile, NewUser, User,
};

pub type SqlEngine = AccessEngine<DatabaseConnection, DatabaseConnection>;

/// Contents of a folder the principal opened.
#[derive(Debug, Clone, Serialize)]
pub struct FolderListing {
    pub folder: Folder,
    pub children: Vec<Folder>,
    pub files: Vec<FileRecord>,
}

#[derive(Clone)]
pub struct Vault {
    db: Arc<DatabaseConnection>,
    engine: SqlEngine,
}

impl Vault {
    /// The database handle is owned by the caller; the vault and its engine
    /// share it for reads.
    pub fn new(db: DatabaseConnection, options: AuthzOptions) -> Self {
        let db = Arc::new(db);
        let engine = AccessEngine::new(Arc::clone(&db), Arc::clone(&db)).with_options(options);
        Self { db, engine }
    }

    pub fn engine(&self) -> &SqlEngine {
        &self.engine
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub async fn principal(&self, user_id: PrincipalId) -> Result<Principal, ShokoError> {
        storage::get_user(&self.db, user_id)
            .await?
            .map(|u| u.principal())
            .ok_or_else(|| ShokoError::NotFound(format!("user {}", user_id)))
    }

    pub async fn subordinates(&self, user_id: PrincipalId) -> Result<Vec<PrincipalId>, ShokoError> {
        let set = self.engine.subordinates_of(user_id).await?;
        Ok(set.into_sorted_vec())
    }

    pub async fn download_file(
        &self,
        principal: &Principal,
        file_id: i32,
    ) -> Result<FileRecord, ShokoError> {
        let file = storage::get_file(&self.db, file_id)
            .await?
            .ok_or_else(|| ShokoError::NotFound(format!("file {}", file_id)))?;

        if !self.engine.can_view(principal, &file.target()).await? {
            return Err(ShokoError::Forbidden(format!("file {}", file_id)));
        }
        Ok(file)
    }

    pub async fn root_folders(&self, principal: &Principal) -> Result<Vec<Folder>, ShokoError> {
        Ok(self.engine.root_folders_visible_to(principal).await?)
    }

    pub async fn open_folder(
        &self,
        principal: &Principal,
        folder_id: i32,
    ) -> Result<FolderListing, ShokoError> {
        let folder = self.require_folder(folder_id).await?;

        if !self.engine.can_view_folder(principal, &folder.access()).await? {
            return Err(ShokoError::Forbidden(format!("folder {}", folder_id)));
        }

        let children = storage::child_folders(&self.db, folder.id).await?;
        let files = storage::files_in_folder(&self.db, Some(folder.id)).await?;
        Ok(FolderListing {
            folder,
            children,
            files,
        })
    }

    /// Create a folder owned by `principal`. Nested folders inherit the
    /// parent's classification and need upload rights on the parent;
    /// top-level folders are always personal.
    pub async fn create_folder(
        &self,
        principal: &Principal,
        name: &str,
        parent_id: Option<i32>,
    ) -> Result<Folder, ShokoError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ShokoError::BadRequest("folder name is required".into()));
        }

        let classification = match parent_id {
            Some(parent_id) => {
                let parent = self.require_folder(parent_id).await?;
                if !authz::can_upload(principal, Some(&parent.access())) {
                    return Err(ShokoError::Forbidden(format!("folder {}", parent_id)));
                }
                parent.classification
            }
            None => Classification::Personal,
        };

        let folder = storage::create_folder(
            &self.db,
            name,
            parent_id,
            Some(principal.id),
            classification,
        )
        .await?;
        tracing::info!(
            folder = folder.id,
            owner = principal.id,
            classification = %folder.classification,
            "Created folder"
        );
        Ok(folder)
    }

    pub async fn upload_file(
        &self,
        principal: &Principal,
        folder_id: Option<i32>,
        input: NewFile,
    ) -> Result<FileRecord, ShokoError> {
        let folder = match folder_id {
            Some(id) => Some(self.require_folder(id).await?),
            None => None,
        };

        let access = folder.as_ref().map(Folder::access);
        if !authz::can_upload(principal, access.as_ref()) {
            return Err(ShokoError::Forbidden(match folder_id {
                Some(id) => format!("upload into folder {}", id),
                None => "upload into root".to_string(),
            }));
        }

        let file = storage::create_file(&self.db, folder_id, principal.id, input).await?;
        tracing::info!(file = file.id, folder = ?folder_id, owner = principal.id, "Stored file");
        Ok(file)
    }

    pub async fn recent_files(
        &self,
        principal: &Principal,
        limit: u64,
    ) -> Result<Vec<FileRecord>, ShokoError> {
        let uploader = if principal.is_admin() {
            None
        } else {
            Some(principal.id)
        };
        storage::recent_files(&self.db, uploader, limit).await
    }

    pub async fn career_records(
        &self,
        principal: &Principal,
    ) -> Result<Vec<CareerRecordView>, ShokoError> {
        Ok(self.engine.viewable_career_records(principal).await?)
    }

    pub async fn career_record(
        &self,
        principal: &Principal,
        record_id: i32,
    ) -> Result<CareerRecord, ShokoError> {
        let record = storage::get_career_record(&self.db, record_id)
            .await?
            .ok_or_else(|| ShokoError::NotFound(format!("career record {}", record_id)))?;

        if !self.engine.can_view(principal, &record.target()).await? {
            return Err(ShokoError::Forbidden(format!("career record {}", record_id)));
        }
        Ok(record)
    }

    /// Records always belong to the principal who files them.
    pub async fn record_career(
        &self,
        principal: &Principal,
        mut input: NewCareerRecord,
    ) -> Result<CareerRecord, ShokoError> {
        input.title = input.title.trim().to_string();
        if input.title.is_empty() {
            return Err(ShokoError::BadRequest("career record title is required".into()));
        }
        if let Some(expiry) = input.expiry_date {
            if expiry < input.record_date {
                return Err(ShokoError::BadRequest(
                    "expiry date precedes record date".into(),
                ));
            }
        }

        storage::create_career_record(&self.db, principal.id, input).await
    }

    pub async fn add_company_document(
        &self,
        principal: &Principal,
        input: NewCompanyDocument,
    ) -> Result<CompanyDocument, ShokoError> {
        if !authz::can_manage_company_documents(principal) {
            return Err(ShokoError::Forbidden("company documents".into()));
        }
        storage::create_company_document(&self.db, principal.id, input).await
    }

    pub async fn create_user(
        &self,
        principal: &Principal,
        input: NewUser,
    ) -> Result<User, ShokoError> {
        if !authz::can_manage_users(principal) {
            return Err(ShokoError::Forbidden("user management".into()));
        }
        if let Some(department_id) = input.department_id {
            if storage::get_department(&self.db, department_id).await?.is_none() {
                return Err(ShokoError::NotFound(format!("department {}", department_id)));
            }
        }
        if let Some(manager_id) = input.manager_id {
            if storage::get_user(&self.db, manager_id).await?.is_none() {
                return Err(ShokoError::NotFound(format!("manager {}", manager_id)));
            }
        }
        if storage::get_user_by_email(&self.db, &input.email)
            .await?
            .is_some()
        {
            return Err(ShokoError::BadRequest(format!(
                "email {} is already registered",
                input.email
            )));
        }

        let user = storage::create_user(&self.db, input).await?;
        tracing::info!(user = user.id, role = %user.role, actor = principal.id, "Created user");
        Ok(user)
    }

    async fn require_folder(&self, folder_id: i32) -> Result<Folder, ShokoError> {
        storage::get_folder(&self.db, folder_id)
            .await?
            .ok_or_else(|| ShokoError::NotFound(format!("folder {}", folder_id)))
    }
}
