//! Read-side collaborator interfaces consumed by the access engine.
//!
//! The engine never talks to a database directly. It asks a `Directory` for
//! reporting lines and a `RecordStore` for owner-scoped collections, so the
//! same decision logic runs over SQL, an in-memory snapshot, or a test fake.

use async_trait::async_trait;

use crate::authz::errors::AuthzError;
use crate::authz::types::PrincipalId;
use crate::storage::{CareerRecordView, Folder};

/// Which owners a collection query is restricted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnerScope {
    All,
    Owners(Vec<PrincipalId>),
}

/// Filter for the top-level folder listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootFolderScope {
    All,
    /// Company-classified folders plus folders owned by the principal
    CompanyOrOwnedBy(PrincipalId),
}

#[async_trait]
pub trait Directory: Send + Sync {
    /// Principals whose manager is `manager`. Unknown ids yield an empty list.
    async fn find_direct_reports(
        &self,
        manager: PrincipalId,
    ) -> Result<Vec<PrincipalId>, AuthzError>;

    /// Direct reports of every id in `managers`, in one round trip where the
    /// backend supports it.
    async fn find_direct_reports_of(
        &self,
        managers: &[PrincipalId],
    ) -> Result<Vec<PrincipalId>, AuthzError> {
        let mut reports = Vec::new();
        for manager in managers {
            reports.extend(self.find_direct_reports(*manager).await?);
        }
        Ok(reports)
    }
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Career records within `scope`, annotated with the owner's display
    /// name, ordered by record date descending then insertion order.
    async fn career_records(&self, scope: &OwnerScope)
        -> Result<Vec<CareerRecordView>, AuthzError>;

    /// Folders without a parent, filtered by `scope`.
    async fn root_folders(&self, scope: RootFolderScope) -> Result<Vec<Folder>, AuthzError>;
}
