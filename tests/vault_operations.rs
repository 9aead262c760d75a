// Integration tests for archive operations: folder creation, uploads,
// career record filing and the admin-only management surface.

mod helpers;

use chrono::NaiveDate;
use helpers::{CareerRecordBuilder, FileBuilder, FolderBuilder, TestDb, UserBuilder};
use shoko::authz::{AuthzOptions, Classification, Role};
use shoko::errors::ShokoError;
use shoko::storage::{self, NewCompanyDocument, NewUser};
use shoko::vault::Vault;

fn vault(db: &sea_orm::DatabaseConnection) -> Vault {
    Vault::new(db.clone(), AuthzOptions::default())
}

fn new_user(email: &str, role: Role, manager_id: Option<i32>) -> NewUser {
    NewUser {
        email: email.to_string(),
        name: "New Hire".to_string(),
        password: "welcome1".to_string(),
        role,
        department_id: None,
        manager_id,
    }
}

// ============================================================================
// Folder Creation Tests
// ============================================================================

#[tokio::test]
async fn test_top_level_folder_is_personal() {
    let test_db = TestDb::new().await;
    let db = test_db.connection();
    let vault = vault(db);
    let user = UserBuilder::new("emp@example.com").create(db).await;

    let folder = vault
        .create_folder(&user.principal(), "  Certificates  ", None)
        .await
        .expect("Failed to create folder");

    assert_eq!(folder.name, "Certificates");
    assert_eq!(folder.owner_id, Some(user.id));
    assert_eq!(folder.classification, Classification::Personal);
    assert_eq!(folder.parent_id, None);
}

#[tokio::test]
async fn test_nested_folder_inherits_classification() {
    let test_db = TestDb::new().await;
    let db = test_db.connection();
    let vault = vault(db);
    let admin = UserBuilder::new("admin@example.com").admin().create(db).await;

    let company = FolderBuilder::new("Shared")
        .company()
        .owned_by(admin.id)
        .create(db)
        .await;
    let child = vault
        .create_folder(&admin.principal(), "Policies", Some(company.id))
        .await
        .expect("Failed to create nested folder");

    assert_eq!(child.classification, Classification::Company);
    assert_eq!(child.parent_id, Some(company.id));
}

#[tokio::test]
async fn test_folder_creation_errors() {
    let test_db = TestDb::new().await;
    let db = test_db.connection();
    let vault = vault(db);
    let manager = UserBuilder::new("manager@example.com").manager().create(db).await;
    let employee = UserBuilder::new("emp@example.com")
        .reports_to(manager.id)
        .create(db)
        .await;
    let folder = FolderBuilder::new("Mine").owned_by(employee.id).create(db).await;

    let err = vault
        .create_folder(&employee.principal(), "   ", None)
        .await
        .unwrap_err();
    assert!(matches!(err, ShokoError::BadRequest(_)));

    let err = vault
        .create_folder(&employee.principal(), "Sub", Some(31337))
        .await
        .unwrap_err();
    assert!(matches!(err, ShokoError::NotFound(_)));

    // Viewing rights do not extend to adding content
    let err = vault
        .create_folder(&manager.principal(), "Sub", Some(folder.id))
        .await
        .unwrap_err();
    assert!(matches!(err, ShokoError::Forbidden(_)));
}

// ============================================================================
// Upload and Listing Tests
// ============================================================================

#[tokio::test]
async fn test_upload_into_missing_folder_is_not_found() {
    let test_db = TestDb::new().await;
    let db = test_db.connection();
    let vault = vault(db);
    let admin = UserBuilder::new("admin@example.com").admin().create(db).await;

    let err = vault
        .upload_file(&admin.principal(), Some(77), FileBuilder::new("x").input())
        .await
        .unwrap_err();
    assert!(matches!(err, ShokoError::NotFound(_)));
}

#[tokio::test]
async fn test_recent_files_scope() {
    let test_db = TestDb::new().await;
    let db = test_db.connection();
    let vault = vault(db);
    let admin = UserBuilder::new("admin@example.com").admin().create(db).await;
    let a = UserBuilder::new("a@example.com").create(db).await;
    let b = UserBuilder::new("b@example.com").create(db).await;

    FileBuilder::new("a1").create(db, a.id).await;
    FileBuilder::new("a2").create(db, a.id).await;
    FileBuilder::new("b1").create(db, b.id).await;

    let mine = vault.recent_files(&a.principal(), 10).await.unwrap();
    assert_eq!(mine.len(), 2);
    assert!(mine.iter().all(|f| f.uploaded_by == a.id));

    let all = vault.recent_files(&admin.principal(), 10).await.unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].original_name, "b1");
}

#[tokio::test]
async fn test_open_missing_folder_is_not_found() {
    let test_db = TestDb::new().await;
    let db = test_db.connection();
    let vault = vault(db);
    let user = UserBuilder::new("emp@example.com").create(db).await;

    let err = vault.open_folder(&user.principal(), 12).await.unwrap_err();
    assert!(matches!(err, ShokoError::NotFound(_)));
}

// ============================================================================
// Career Record Filing Tests
// ============================================================================

#[tokio::test]
async fn test_record_career_validation() {
    let test_db = TestDb::new().await;
    let db = test_db.connection();
    let vault = vault(db);
    let user = UserBuilder::new("emp@example.com").create(db).await;
    let principal = user.principal();

    let mut blank = CareerRecordBuilder::new("x").input();
    blank.title = "  ".to_string();
    let err = vault.record_career(&principal, blank).await.unwrap_err();
    assert!(matches!(err, ShokoError::BadRequest(_)));

    let backwards = CareerRecordBuilder::new("Expired License")
        .on(2025, 5, 1)
        .expires(2024, 5, 1)
        .input();
    let err = vault.record_career(&principal, backwards).await.unwrap_err();
    assert!(matches!(err, ShokoError::BadRequest(_)));

    let ok = CareerRecordBuilder::new(" Forklift License ")
        .on(2025, 5, 1)
        .expires(2030, 5, 1)
        .input();
    let record = vault.record_career(&principal, ok).await.unwrap();
    assert_eq!(record.owner_id, user.id);
    assert_eq!(record.title, "Forklift License");
    assert_eq!(
        record.expiry_date,
        NaiveDate::from_ymd_opt(2030, 5, 1)
    );
}

// ============================================================================
// Admin Operation Tests
// ============================================================================

#[tokio::test]
async fn test_company_documents_are_admin_only() {
    let test_db = TestDb::new().await;
    let db = test_db.connection();
    let vault = vault(db);
    let admin = UserBuilder::new("admin@example.com").admin().create(db).await;
    let manager = UserBuilder::new("manager@example.com").manager().create(db).await;

    let document = || NewCompanyDocument {
        title: "Expense Policy".to_string(),
        category: "policy".to_string(),
        file_path: "/docs/expense.pdf".to_string(),
    };

    let err = vault
        .add_company_document(&manager.principal(), document())
        .await
        .unwrap_err();
    assert!(matches!(err, ShokoError::Forbidden(_)));

    let created = vault
        .add_company_document(&admin.principal(), document())
        .await
        .unwrap();
    assert_eq!(created.uploaded_by, admin.id);
    assert_eq!(storage::list_company_documents(db).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_create_user_checks() {
    let test_db = TestDb::new().await;
    let db = test_db.connection();
    let vault = vault(db);
    let admin = UserBuilder::new("admin@example.com").admin().create(db).await;
    let manager = UserBuilder::new("manager@example.com").manager().create(db).await;

    let err = vault
        .create_user(&manager.principal(), new_user("x@example.com", Role::Employee, None))
        .await
        .unwrap_err();
    assert!(matches!(err, ShokoError::Forbidden(_)));

    let err = vault
        .create_user(&admin.principal(), new_user("x@example.com", Role::Employee, Some(555)))
        .await
        .unwrap_err();
    assert!(matches!(err, ShokoError::NotFound(_)));

    let mut unknown_department = new_user("x@example.com", Role::Employee, None);
    unknown_department.department_id = Some(808);
    let err = vault
        .create_user(&admin.principal(), unknown_department)
        .await
        .unwrap_err();
    assert!(matches!(err, ShokoError::NotFound(_)));

    let sales = storage::create_department(db, "Sales", None).await.unwrap();
    let mut placed = new_user("rep@example.com", Role::Employee, None);
    placed.department_id = Some(sales.id);
    let rep = vault.create_user(&admin.principal(), placed).await.unwrap();
    assert_eq!(rep.department_id, Some(sales.id));

    let err = vault
        .create_user(&admin.principal(), new_user("manager@example.com", Role::Employee, None))
        .await
        .unwrap_err();
    assert!(matches!(err, ShokoError::BadRequest(_)));

    let hire = vault
        .create_user(
            &admin.principal(),
            new_user("hire@example.com", Role::Employee, Some(manager.id)),
        )
        .await
        .unwrap();
    assert_eq!(hire.manager_id, Some(manager.id));
    assert_eq!(vault.subordinates(manager.id).await.unwrap(), vec![hire.id]);
}

#[tokio::test]
async fn test_principal_lookup() {
    let test_db = TestDb::new().await;
    let db = test_db.connection();
    let vault = vault(db);
    let manager = UserBuilder::new("manager@example.com").manager().create(db).await;

    let principal = vault.principal(manager.id).await.unwrap();
    assert_eq!(principal.role, Role::Manager);

    let err = vault.principal(404).await.unwrap_err();
    assert!(matches!(err, ShokoError::NotFound(_)));
}
