use std::collections::HashMap;

use async_trait::async_trait;

use crate::authz::errors::AuthzError;
use crate::authz::store::Directory;
use crate::authz::types::PrincipalId;

/// Immutable in-memory copy of the reporting lines.
///
/// Useful when a caller already holds the directory (batch jobs, tests) and
/// wants decisions without further reads.
#[derive(Debug, Clone, Default)]
pub struct DirectorySnapshot {
    /// manager -> direct reports (sorted)
    reports: HashMap<PrincipalId, Vec<PrincipalId>>,
    edge_count: usize,
}

impl DirectorySnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(principal, manager)` pairs. Principals without a manager
    /// are roots and contribute no edge.
    pub fn from_edges<I>(edges: I) -> Self
    where
        I: IntoIterator<Item = (PrincipalId, Option<PrincipalId>)>,
    {
        let mut snapshot = Self::new();
        for (principal, manager) in edges {
            if let Some(manager) = manager {
                snapshot.insert(principal, manager);
            }
        }
        snapshot
    }

    pub fn insert(&mut self, principal: PrincipalId, manager: PrincipalId) {
        let reports = self.reports.entry(manager).or_default();
        if let Err(pos) = reports.binary_search(&principal) {
            reports.insert(pos, principal);
            self.edge_count += 1;
        }
    }

    pub fn direct_reports(&self, manager: PrincipalId) -> &[PrincipalId] {
        self.reports
            .get(&manager)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }
}

#[async_trait]
impl Directory for DirectorySnapshot {
    async fn find_direct_reports(
        &self,
        manager: PrincipalId,
    ) -> Result<Vec<PrincipalId>, AuthzError> {
        Ok(self.direct_reports(manager).to_vec())
    }
}
