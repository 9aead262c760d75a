use miette::Diagnostic;
use thiserror::Error;

use crate::authz::types::PrincipalId;

#[derive(Debug, Error, Diagnostic)]
pub enum AuthzError {
    #[error("Directory lookup failed: {0}")]
    #[diagnostic(
        code(shoko::authz::lookup),
        help("The directory or record store could not be read; the decision was not evaluated")
    )]
    Lookup(String),

    #[error("Database error during access check: {0}")]
    #[diagnostic(code(shoko::authz::db))]
    Db(#[from] sea_orm::DbErr),

    #[error("Reporting cycle detected below manager {manager}: principal {revisited} reached twice")]
    #[diagnostic(
        code(shoko::authz::hierarchy_cycle),
        help("Check the `manager_id` chain of the listed principal; a principal must never be its own ancestor")
    )]
    HierarchyCycle {
        manager: PrincipalId,
        revisited: PrincipalId,
    },
}
