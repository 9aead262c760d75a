use miette::Diagnostic;
use thiserror::Error;

use crate::authz::AuthzError;

#[derive(Debug, Error, Diagnostic)]
pub enum ShokoError {
    #[error("I/O error: {0}")]
    #[diagnostic(code(shoko::io))]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    #[diagnostic(code(shoko::config))]
    Config(#[from] config::ConfigError),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(shoko::serde))]
    Serde(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    #[diagnostic(code(shoko::db))]
    Db(#[from] sea_orm::DbErr),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Authz(#[from] AuthzError),

    #[error("Not found: {0}")]
    #[diagnostic(code(shoko::not_found))]
    NotFound(String),

    #[error("Forbidden: {0}")]
    #[diagnostic(code(shoko::forbidden))]
    Forbidden(String),

    #[error("Bad request: {0}")]
    #[diagnostic(code(shoko::bad_request))]
    BadRequest(String),

    #[error("{0}")]
    #[diagnostic(code(shoko::other))]
    Other(String),
}
