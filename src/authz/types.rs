use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique principal (user) identifier as stored in the directory.
pub type PrincipalId = i32;

/// Privilege tier of a principal.
///
/// Closed set. Anything that does not parse as a known role is treated as
/// `Employee`, the least privileged tier, so a corrupt or legacy value can
/// never escalate access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    #[default]
    Employee,
}

impl Role {
    /// Normalize a stored role string. Only the canonical lowercase names
    /// match; anything else, including other casings, is `Employee`.
    pub fn parse(s: &str) -> Self {
        match s {
            "admin" => Role::Admin,
            "manager" => Role::Manager,
            _ => Role::Employee,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Employee => "employee",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Folder classification tag.
///
/// Unknown values degrade to `Personal`: the tag then grants nothing
/// beyond ownership and hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    #[default]
    Personal,
    Department,
    Company,
}

impl Classification {
    /// Exact match against the stored tag, the same comparison the root
    /// folder query makes in SQL.
    pub fn parse(s: &str) -> Self {
        match s {
            "company" => Classification::Company,
            "department" => Classification::Department,
            _ => Classification::Personal,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Personal => "personal",
            Classification::Department => "department",
            Classification::Company => "company",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The requesting actor for a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: PrincipalId,
    pub role: Role,
    pub department_id: Option<i32>,
}

impl Principal {
    pub fn new(id: PrincipalId, role: Role) -> Self {
        Self {
            id,
            role,
            department_id: None,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Access-relevant view of a folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderRef {
    /// `None` for system folders without an owner
    pub owner_id: Option<PrincipalId>,
    pub classification: Classification,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    File,
    Folder,
    CareerRecord,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::File => f.write_str("file"),
            EntityKind::Folder => f.write_str("folder"),
            EntityKind::CareerRecord => f.write_str("career_record"),
        }
    }
}

/// An ownable entity subject to a view decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Target {
    File { owner_id: PrincipalId },
    Folder(FolderRef),
    CareerRecord { owner_id: PrincipalId },
}

impl Target {
    pub fn kind(&self) -> EntityKind {
        match self {
            Target::File { .. } => EntityKind::File,
            Target::Folder(_) => EntityKind::Folder,
            Target::CareerRecord { .. } => EntityKind::CareerRecord,
        }
    }

    pub fn owner_id(&self) -> Option<PrincipalId> {
        match self {
            Target::File { owner_id } | Target::CareerRecord { owner_id } => Some(*owner_id),
            Target::Folder(folder) => folder.owner_id,
        }
    }
}

/// Engine tuning, loaded from the `[authz]` settings section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AuthzOptions {
    /// Fail hierarchy walks that hit a reporting cycle instead of returning
    /// the partial subordinate set.
    #[serde(default)]
    pub fail_on_cycle: bool,
}
