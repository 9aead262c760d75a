//! Shoko - document and career-record archive
//!
//! This library provides the access-control core (role, ownership and
//! reporting-hierarchy rules) together with the storage and request-side
//! operations built on it. It exposes all modules for testing purposes.

pub mod authz;
pub mod directory_sync;
pub mod entities;
pub mod errors;
pub mod seed;
pub mod settings;
pub mod storage;
pub mod vault;
