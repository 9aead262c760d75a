use chrono::NaiveDate;
use sea_orm::DatabaseConnection;

use crate::authz::{Classification, PrincipalId};
use crate::directory_sync::{self, DirectoryFile, UserDefinition};
use crate::errors::ShokoError;
use crate::storage::{self, CareerCategory, NewCareerRecord};

pub const DEMO_ADMIN_EMAIL: &str = "admin@example.com";

fn demo_user(
    email: &str,
    name: &str,
    password: &str,
    role: &str,
    department: Option<&str>,
    manager_email: Option<&str>,
) -> UserDefinition {
    UserDefinition {
        email: email.to_string(),
        name: name.to_string(),
        password: password.to_string(),
        role: role.to_string(),
        department: department.map(str::to_string),
        manager_email: manager_email.map(str::to_string),
    }
}

/// The demo organization:
///
/// ```text
/// Admin ─┬─ Manager (Sales) ──── Employee (Sales)
///        └─ Dev Manager ──────── Dev Employee
/// ```
pub fn demo_directory() -> DirectoryFile {
    DirectoryFile {
        departments: vec![
            "Sales".to_string(),
            "Development".to_string(),
            "Human Resources".to_string(),
        ],
        users: vec![
            demo_user(DEMO_ADMIN_EMAIL, "Taro Yamada", "admin123", "admin", None, None),
            demo_user(
                "manager@example.com",
                "Ichiro Suzuki",
                "manager123",
                "manager",
                Some("Sales"),
                Some(DEMO_ADMIN_EMAIL),
            ),
            demo_user(
                "employee@example.com",
                "Hanako Sato",
                "employee123",
                "employee",
                Some("Sales"),
                Some("manager@example.com"),
            ),
            demo_user(
                "dev-manager@example.com",
                "Jiro Tanaka",
                "manager123",
                "manager",
                Some("Development"),
                Some(DEMO_ADMIN_EMAIL),
            ),
            demo_user(
                "dev-employee@example.com",
                "Saburo Takahashi",
                "employee123",
                "employee",
                Some("Development"),
                Some("dev-manager@example.com"),
            ),
        ],
    }
}

/// Create the demo organization, folders and career records.
/// Returns `false` when the demo admin already exists and nothing was done.
pub async fn seed_demo_data(db: &DatabaseConnection) -> Result<bool, ShokoError> {
    if storage::get_user_by_email(db, DEMO_ADMIN_EMAIL)
        .await?
        .is_some()
    {
        tracing::info!("Demo data already exists, skipping seed");
        return Ok(false);
    }

    directory_sync::sync_directory(db, &demo_directory()).await?;

    let admin = user_id(db, DEMO_ADMIN_EMAIL).await?;
    let employee = user_id(db, "employee@example.com").await?;
    let dev_employee = user_id(db, "dev-employee@example.com").await?;

    let company = storage::create_folder(
        db,
        "Company Shared",
        None,
        Some(admin),
        Classification::Company,
    )
    .await?;
    for name in ["Work Rules", "Internal Regulations"] {
        storage::create_folder(db, name, Some(company.id), Some(admin), Classification::Company)
            .await?;
    }

    create_personal_tree(db, employee, "Hanako Sato").await?;
    create_personal_tree(db, dev_employee, "Saburo Takahashi").await?;

    let records = [
        (
            employee,
            CareerCategory::Certificate,
            "Bookkeeping Level 2",
            "Passed the level 2 bookkeeping examination",
            (2025, 6, 15),
        ),
        (
            employee,
            CareerCategory::Training,
            "New Hire Training",
            "Completed two weeks of onboarding training",
            (2024, 4, 1),
        ),
        (
            employee,
            CareerCategory::Rank,
            "Permanent Employment",
            "Probation completed, promoted to permanent staff",
            (2024, 7, 1),
        ),
        (
            dev_employee,
            CareerCategory::Certificate,
            "Fundamental IT Engineer",
            "Passed the fundamental information technology engineer examination",
            (2025, 4, 20),
        ),
        (
            dev_employee,
            CareerCategory::Skill,
            "TypeScript",
            "Learned TypeScript on an internal project",
            (2025, 8, 1),
        ),
    ];
    for (owner, category, title, description, (y, m, d)) in records {
        let record_date = NaiveDate::from_ymd_opt(y, m, d)
            .ok_or_else(|| ShokoError::Other(format!("invalid demo date {y}-{m}-{d}")))?;
        storage::create_career_record(
            db,
            owner,
            NewCareerRecord {
                category,
                title: title.to_string(),
                description: Some(description.to_string()),
                record_date,
                expiry_date: None,
                attachment_path: None,
            },
        )
        .await?;
    }

    tracing::info!("Demo data seeded successfully");
    Ok(true)
}

async fn create_personal_tree(
    db: &DatabaseConnection,
    owner: PrincipalId,
    owner_name: &str,
) -> Result<(), ShokoError> {
    let root = storage::create_folder(
        db,
        &format!("{owner_name}'s Folder"),
        None,
        Some(owner),
        Classification::Personal,
    )
    .await?;
    for name in ["Skill Development", "Certificates"] {
        storage::create_folder(db, name, Some(root.id), Some(owner), Classification::Personal)
            .await?;
    }
    Ok(())
}

async fn user_id(db: &DatabaseConnection, email: &str) -> Result<PrincipalId, ShokoError> {
    storage::get_user_by_email(db, email)
        .await?
        .map(|u| u.id)
        .ok_or_else(|| ShokoError::NotFound(format!("demo user {}", email)))
}
