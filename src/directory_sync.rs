use crate::authz::{PrincipalId, Role};
use crate::errors::ShokoError;
use crate::storage::{self, NewUser, UserUpdate};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// User definition from the directory file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDefinition {
    /// Login email (unique identifier)
    pub email: String,
    /// Display name; the email's local part when left empty
    #[serde(default)]
    pub name: String,
    /// Plain text password, hashed on creation; ignored for existing users
    pub password: String,
    /// "admin" | "manager" | "employee"; anything else becomes employee
    #[serde(default)]
    pub role: String,
    /// Department name, created if missing
    #[serde(default)]
    pub department: Option<String>,
    /// Email of the direct manager
    #[serde(default)]
    pub manager_email: Option<String>,
}

impl UserDefinition {
    fn display_name(&self) -> String {
        match self.name.trim() {
            "" => storage::name_from_email(&self.email).to_string(),
            name => name.to_string(),
        }
    }
}

/// Root structure of the directory JSON file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DirectoryFile {
    #[serde(default)]
    pub departments: Vec<String>,
    pub users: Vec<UserDefinition>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
}

/// Sync departments, users and reporting lines from a JSON file (idempotent)
pub async fn sync_directory_from_file(
    db: &DatabaseConnection,
    file_path: &Path,
) -> Result<SyncReport, ShokoError> {
    tracing::info!("Loading directory from {}", file_path.display());

    let content = std::fs::read_to_string(file_path)?;
    let directory: DirectoryFile = serde_json::from_str(&content)?;

    sync_directory(db, &directory).await
}

/// Apply a directory definition.
///
/// Users are created or updated first, then every reporting line is
/// resolved by email, so a manager may be listed after their reports.
pub async fn sync_directory(
    db: &DatabaseConnection,
    directory: &DirectoryFile,
) -> Result<SyncReport, ShokoError> {
    validate(directory)?;
    reject_reporting_loops(db, directory).await?;

    tracing::info!(
        "Found {} department(s) and {} user(s)",
        directory.departments.len(),
        directory.users.len()
    );

    let mut departments: HashMap<String, i32> = HashMap::new();
    let department_names = directory
        .departments
        .iter()
        .chain(directory.users.iter().filter_map(|u| u.department.as_ref()));
    for name in department_names {
        if departments.contains_key(name) {
            continue;
        }
        let id = match storage::get_department_by_name(db, name).await? {
            Some(existing) => existing.id,
            None => {
                tracing::info!("Creating department: {}", name);
                storage::create_department(db, name, None).await?.id
            }
        };
        departments.insert(name.clone(), id);
    }

    // Pass 1: make sure every user exists
    let mut ids: HashMap<&str, PrincipalId> = HashMap::new();
    let mut created_emails = Vec::new();
    for user_def in &directory.users {
        let id = match storage::get_user_by_email(db, &user_def.email).await? {
            Some(existing) => existing.id,
            None => {
                tracing::info!("Creating user: {}", user_def.email);
                let department_id = user_def
                    .department
                    .as_ref()
                    .and_then(|d| departments.get(d).copied());
                let user = storage::create_user(
                    db,
                    NewUser {
                        email: user_def.email.clone(),
                        name: user_def.display_name(),
                        password: user_def.password.clone(),
                        role: Role::parse(&user_def.role),
                        department_id,
                        manager_id: None,
                    },
                )
                .await?;
                created_emails.push(user_def.email.as_str());
                user.id
            }
        };
        ids.insert(user_def.email.as_str(), id);
    }

    // Pass 2: profile fields and reporting lines
    let mut report = SyncReport {
        created: created_emails.len(),
        ..SyncReport::default()
    };
    for user_def in &directory.users {
        let id = ids[user_def.email.as_str()];
        let manager_id = match &user_def.manager_email {
            Some(email) => Some(resolve_manager(db, &ids, email).await?),
            None => None,
        };
        let desired = UserUpdate {
            name: user_def.display_name(),
            role: Role::parse(&user_def.role),
            department_id: user_def
                .department
                .as_ref()
                .and_then(|d| departments.get(d).copied()),
            manager_id,
        };

        let current = storage::get_user(db, id)
            .await?
            .ok_or_else(|| ShokoError::Other(format!("User not found after creation: {}", user_def.email)))?;
        let current_fields = UserUpdate {
            name: current.name.clone(),
            role: current.role,
            department_id: current.department_id,
            manager_id: current.manager_id,
        };

        if current_fields == desired {
            if !created_emails.contains(&user_def.email.as_str()) {
                report.unchanged += 1;
            }
            continue;
        }

        storage::update_user(db, id, desired).await?;
        if !created_emails.contains(&user_def.email.as_str()) {
            tracing::info!("Updating user: {}", user_def.email);
            report.updated += 1;
        }
    }

    tracing::info!(
        "Directory sync complete: {} created, {} updated, {} unchanged",
        report.created,
        report.updated,
        report.unchanged
    );

    Ok(report)
}

fn validate(directory: &DirectoryFile) -> Result<(), ShokoError> {
    let mut seen = std::collections::HashSet::new();
    for user_def in &directory.users {
        if !seen.insert(user_def.email.as_str()) {
            return Err(ShokoError::BadRequest(format!(
                "user {} is listed twice",
                user_def.email
            )));
        }
        if user_def.manager_email.as_deref() == Some(user_def.email.as_str()) {
            return Err(ShokoError::BadRequest(format!(
                "user {} cannot be their own manager",
                user_def.email
            )));
        }
    }
    Ok(())
}

/// Follow every user's manager chain, through the file first and the stored
/// directory for anyone the file does not list, and refuse a chain that
/// leads back to its starting user.
async fn reject_reporting_loops(
    db: &DatabaseConnection,
    directory: &DirectoryFile,
) -> Result<(), ShokoError> {
    let declared: HashMap<&str, Option<&str>> = directory
        .users
        .iter()
        .map(|u| (u.email.as_str(), u.manager_email.as_deref()))
        .collect();

    for user_def in &directory.users {
        let mut seen = std::collections::HashSet::from([user_def.email.clone()]);
        let mut current = user_def.manager_email.clone();

        while let Some(email) = current {
            if email == user_def.email {
                return Err(ShokoError::BadRequest(format!(
                    "reporting loop: {} is their own indirect manager",
                    user_def.email
                )));
            }
            if !seen.insert(email.clone()) {
                // Loop elsewhere in the stored directory, not through this user
                break;
            }
            current = match declared.get(email.as_str()) {
                Some(manager) => manager.map(str::to_string),
                None => stored_manager_email(db, &email).await?,
            };
        }
    }
    Ok(())
}

async fn stored_manager_email(
    db: &DatabaseConnection,
    email: &str,
) -> Result<Option<String>, ShokoError> {
    let Some(manager_id) = storage::get_user_by_email(db, email)
        .await?
        .and_then(|u| u.manager_id)
    else {
        return Ok(None);
    };
    Ok(storage::get_user(db, manager_id).await?.map(|m| m.email))
}

async fn resolve_manager(
    db: &DatabaseConnection,
    ids: &HashMap<&str, PrincipalId>,
    email: &str,
) -> Result<PrincipalId, ShokoError> {
    if let Some(id) = ids.get(email) {
        return Ok(*id);
    }
    storage::get_user_by_email(db, email)
        .await?
        .map(|u| u.id)
        .ok_or_else(|| ShokoError::BadRequest(format!("unknown manager email {}", email)))
}
