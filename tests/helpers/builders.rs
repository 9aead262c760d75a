use chrono::NaiveDate;
use sea_orm::DatabaseConnection;
use shoko::authz::{Classification, PrincipalId, Role};
use shoko::storage::{self, CareerCategory, NewCareerRecord, NewFile, NewUser};

/// Builder for creating test users
pub struct UserBuilder {
    email: String,
    name: String,
    password: String,
    role: Role,
    department_id: Option<i32>,
    manager_id: Option<PrincipalId>,
}

impl UserBuilder {
    pub fn new(email: &str) -> Self {
        Self {
            email: email.to_string(),
            name: storage::name_from_email(email).to_string(),
            password: "password123".to_string(),
            role: Role::Employee,
            department_id: None,
            manager_id: None,
        }
    }

    pub fn admin(mut self) -> Self {
        self.role = Role::Admin;
        self
    }

    pub fn manager(mut self) -> Self {
        self.role = Role::Manager;
        self
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn reports_to(mut self, manager_id: PrincipalId) -> Self {
        self.manager_id = Some(manager_id);
        self
    }

    pub fn in_department(mut self, department_id: i32) -> Self {
        self.department_id = Some(department_id);
        self
    }

    pub async fn create(self, db: &DatabaseConnection) -> storage::User {
        storage::create_user(
            db,
            NewUser {
                email: self.email,
                name: self.name,
                password: self.password,
                role: self.role,
                department_id: self.department_id,
                manager_id: self.manager_id,
            },
        )
        .await
        .expect("Failed to create test user")
    }
}

/// Builder for creating test folders
pub struct FolderBuilder {
    name: String,
    parent_id: Option<i32>,
    owner_id: Option<PrincipalId>,
    classification: Classification,
}

impl FolderBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            parent_id: None,
            owner_id: None,
            classification: Classification::Personal,
        }
    }

    pub fn owned_by(mut self, owner_id: PrincipalId) -> Self {
        self.owner_id = Some(owner_id);
        self
    }

    pub fn inside(mut self, parent_id: i32) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn company(mut self) -> Self {
        self.classification = Classification::Company;
        self
    }

    pub fn department(mut self) -> Self {
        self.classification = Classification::Department;
        self
    }

    pub async fn create(self, db: &DatabaseConnection) -> storage::Folder {
        storage::create_folder(
            db,
            &self.name,
            self.parent_id,
            self.owner_id,
            self.classification,
        )
        .await
        .expect("Failed to create test folder")
    }
}

/// Builder for creating test files
pub struct FileBuilder {
    name: String,
    folder_id: Option<i32>,
}

impl FileBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            folder_id: None,
        }
    }

    pub fn inside(mut self, folder_id: i32) -> Self {
        self.folder_id = Some(folder_id);
        self
    }

    pub fn input(&self) -> NewFile {
        NewFile {
            name: format!("{}.bin", self.name),
            original_name: self.name.clone(),
            file_path: format!("/uploads/{}.bin", self.name),
            mime_type: Some("application/octet-stream".to_string()),
            size: Some(128),
        }
    }

    pub async fn create(self, db: &DatabaseConnection, uploaded_by: PrincipalId) -> storage::FileRecord {
        storage::create_file(db, self.folder_id, uploaded_by, self.input())
            .await
            .expect("Failed to create test file")
    }
}

/// Builder for creating test career records
pub struct CareerRecordBuilder {
    title: String,
    category: CareerCategory,
    record_date: NaiveDate,
    expiry_date: Option<NaiveDate>,
}

impl CareerRecordBuilder {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            category: CareerCategory::Skill,
            record_date: NaiveDate::from_ymd_opt(2025, 1, 1).expect("valid date"),
            expiry_date: None,
        }
    }

    pub fn on(mut self, year: i32, month: u32, day: u32) -> Self {
        self.record_date = NaiveDate::from_ymd_opt(year, month, day).expect("valid date");
        self
    }

    pub fn expires(mut self, year: i32, month: u32, day: u32) -> Self {
        self.expiry_date = Some(NaiveDate::from_ymd_opt(year, month, day).expect("valid date"));
        self
    }

    pub fn category(mut self, category: CareerCategory) -> Self {
        self.category = category;
        self
    }

    pub fn input(&self) -> NewCareerRecord {
        NewCareerRecord {
            category: self.category,
            title: self.title.clone(),
            description: None,
            record_date: self.record_date,
            expiry_date: self.expiry_date,
            attachment_path: None,
        }
    }

    pub async fn create(self, db: &DatabaseConnection, owner_id: PrincipalId) -> storage::CareerRecord {
        storage::create_career_record(db, owner_id, self.input())
            .await
            .expect("Failed to create test career record")
    }
}
