use std::sync::Arc;

use crate::authz::errors::AuthzError;
use crate::authz::hierarchy::{self, SubordinateSet};
use crate::authz::store::{Directory, OwnerScope, RecordStore, RootFolderScope};
use crate::authz::types::{
    AuthzOptions, Classification, FolderRef, Principal, PrincipalId, Role, Target,
};
use crate::storage::{CareerRecordView, Folder};

/// Access decision engine.
///
/// Stateless between calls: every decision reads the collaborators afresh
/// and nothing is cached, so concurrent requests need no coordination.
///
/// View decisions share one precedence order, first match wins:
/// 1. a kind-specific global override (admin; company folders)
/// 2. self-ownership
/// 3. manager role and the owner is in the manager's subordinate set
/// 4. deny
pub struct AccessEngine<D, R> {
    directory: Arc<D>,
    records: Arc<R>,
    options: AuthzOptions,
}

impl<D, R> Clone for AccessEngine<D, R> {
    fn clone(&self) -> Self {
        Self {
            directory: Arc::clone(&self.directory),
            records: Arc::clone(&self.records),
            options: self.options,
        }
    }
}

impl<D, R> AccessEngine<D, R>
where
    D: Directory,
    R: RecordStore,
{
    pub fn new(directory: Arc<D>, records: Arc<R>) -> Self {
        Self {
            directory,
            records,
            options: AuthzOptions::default(),
        }
    }

    pub fn with_options(mut self, options: AuthzOptions) -> Self {
        self.options = options;
        self
    }

    /// Transitive reports of `manager`. With `fail_on_cycle` set, a detected
    /// reporting cycle is returned as an error instead of a partial set.
    pub async fn subordinates_of(
        &self,
        manager: PrincipalId,
    ) -> Result<SubordinateSet, AuthzError> {
        let set = hierarchy::subordinates_of(self.directory.as_ref(), manager).await?;
        if self.options.fail_on_cycle {
            if let Some(revisited) = set.cycle() {
                return Err(AuthzError::HierarchyCycle { manager, revisited });
            }
        }
        Ok(set)
    }

    pub async fn can_view(&self, principal: &Principal, target: &Target) -> Result<bool, AuthzError> {
        let overridden = match target {
            Target::Folder(folder) => {
                folder.classification == Classification::Company || principal.is_admin()
            }
            Target::File { .. } | Target::CareerRecord { .. } => principal.is_admin(),
        };
        if overridden {
            return Ok(true);
        }

        let allowed = self.owner_or_manager(principal, target.owner_id()).await?;
        if !allowed {
            tracing::debug!(
                principal = principal.id,
                role = %principal.role,
                kind = %target.kind(),
                owner = ?target.owner_id(),
                "View denied"
            );
        }
        Ok(allowed)
    }

    pub async fn can_view_file(
        &self,
        principal: &Principal,
        owner_id: PrincipalId,
    ) -> Result<bool, AuthzError> {
        self.can_view(principal, &Target::File { owner_id }).await
    }

    pub async fn can_view_folder(
        &self,
        principal: &Principal,
        folder: &FolderRef,
    ) -> Result<bool, AuthzError> {
        self.can_view(principal, &Target::Folder(*folder)).await
    }

    pub async fn can_view_career_record(
        &self,
        principal: &Principal,
        owner_id: PrincipalId,
    ) -> Result<bool, AuthzError> {
        self.can_view(principal, &Target::CareerRecord { owner_id })
            .await
    }

    /// Steps 2-4 of the precedence order. An ownerless entity never matches.
    async fn owner_or_manager(
        &self,
        principal: &Principal,
        owner: Option<PrincipalId>,
    ) -> Result<bool, AuthzError> {
        let Some(owner) = owner else {
            return Ok(false);
        };
        if owner == principal.id {
            return Ok(true);
        }
        if principal.role == Role::Manager {
            let subordinates = self.subordinates_of(principal.id).await?;
            return Ok(subordinates.contains(owner));
        }
        Ok(false)
    }

    /// Career records the principal may list: everything for admins, own
    /// and subordinates' records for managers, own records otherwise.
    pub async fn viewable_career_records(
        &self,
        principal: &Principal,
    ) -> Result<Vec<CareerRecordView>, AuthzError> {
        let scope = match principal.role {
            Role::Admin => OwnerScope::All,
            Role::Manager => {
                let subordinates = self.subordinates_of(principal.id).await?;
                let mut owners = Vec::with_capacity(subordinates.len() + 1);
                owners.push(principal.id);
                owners.extend(subordinates.into_sorted_vec());
                OwnerScope::Owners(owners)
            }
            Role::Employee => OwnerScope::Owners(vec![principal.id]),
        };
        self.records.career_records(&scope).await
    }

    /// Top-level folders for the root listing.
    ///
    /// Non-admins see company folders and their own folders only. Folders
    /// owned by subordinates are left out of this listing even though
    /// `can_view` grants them to a manager.
    pub async fn root_folders_visible_to(
        &self,
        principal: &Principal,
    ) -> Result<Vec<Folder>, AuthzError> {
        let scope = if principal.is_admin() {
            RootFolderScope::All
        } else {
            RootFolderScope::CompanyOrOwnedBy(principal.id)
        };
        self.records.root_folders(scope).await
    }
}

/// Whether `principal` may add content to `folder` (`None` is the root).
///
/// Strictly owner-or-admin: managers get no upload rights into their
/// subordinates' folders, unlike viewing.
pub fn can_upload(principal: &Principal, folder: Option<&FolderRef>) -> bool {
    let Some(folder) = folder else {
        return principal.is_admin();
    };
    if folder.classification == Classification::Company {
        return principal.is_admin();
    }
    folder.owner_id == Some(principal.id) || principal.is_admin()
}

pub fn can_manage_company_documents(principal: &Principal) -> bool {
    principal.is_admin()
}

pub fn can_manage_users(principal: &Principal) -> bool {
    principal.is_admin()
}
