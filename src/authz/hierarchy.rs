//! Org hierarchy resolution: the transitive set of reports under a manager.

use std::collections::HashSet;

use serde::Serialize;

use crate::authz::errors::AuthzError;
use crate::authz::store::Directory;
use crate::authz::types::PrincipalId;

/// Result of a hierarchy walk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubordinateSet {
    manager: PrincipalId,
    members: HashSet<PrincipalId>,
    /// First principal reached twice, if the directory contains a cycle
    cycle: Option<PrincipalId>,
}

impl SubordinateSet {
    pub fn manager(&self) -> PrincipalId {
        self.manager
    }

    pub fn contains(&self, id: PrincipalId) -> bool {
        self.members.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = PrincipalId> + '_ {
        self.members.iter().copied()
    }

    /// The principal at which a reporting cycle was detected. When set, the
    /// membership is the partial set collected before the cycle closed.
    pub fn cycle(&self) -> Option<PrincipalId> {
        self.cycle
    }

    pub fn into_sorted_vec(self) -> Vec<PrincipalId> {
        let mut ids: Vec<_> = self.members.into_iter().collect();
        ids.sort_unstable();
        ids
    }
}

/// Walk the reporting tree below `manager`, level by level.
///
/// Every principal reachable through the "reports to" edge is returned,
/// never `manager` itself. Unknown ids produce an empty set. The walk keeps
/// a visited set, so a corrupted directory (self-manager or a reporting
/// loop) terminates with the partial result and the revisited id recorded
/// in [`SubordinateSet::cycle`].
pub async fn subordinates_of<D>(
    directory: &D,
    manager: PrincipalId,
) -> Result<SubordinateSet, AuthzError>
where
    D: Directory + ?Sized,
{
    let mut visited = HashSet::from([manager]);
    let mut members = HashSet::new();
    let mut cycle = None;
    let mut frontier = vec![manager];

    while !frontier.is_empty() {
        let reports = directory.find_direct_reports_of(&frontier).await?;
        let mut next = Vec::with_capacity(reports.len());
        for id in reports {
            if visited.insert(id) {
                members.insert(id);
                next.push(id);
            } else if cycle.is_none() {
                cycle = Some(id);
            }
        }
        frontier = next;
    }

    if let Some(revisited) = cycle {
        tracing::warn!(
            manager,
            revisited,
            members = members.len(),
            "Reporting cycle detected during hierarchy walk"
        );
    }

    Ok(SubordinateSet {
        manager,
        members,
        cycle,
    })
}
