//! Role- and hierarchy-based access control.
//!
//! `hierarchy` resolves a manager's transitive reports through a
//! [`store::Directory`]; `engine` turns a principal plus a target into an
//! allow/deny decision or a filtered collection. Both are read-only: the
//! caller owns the collaborators and their lifecycle.

pub mod engine;
pub mod errors;
pub mod hierarchy;
pub mod snapshot;
pub mod store;
pub mod types;

pub use engine::{can_manage_company_documents, can_manage_users, can_upload, AccessEngine};
pub use errors::AuthzError;
pub use hierarchy::{subordinates_of, SubordinateSet};
pub use snapshot::DirectorySnapshot;
pub use store::{Directory, OwnerScope, RecordStore, RootFolderScope};
pub use types::{
    AuthzOptions, Classification, EntityKind, FolderRef, Principal, PrincipalId, Role, Target,
};
