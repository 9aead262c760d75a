#![allow(dead_code)]

pub mod builders;
pub mod db;

pub use builders::{CareerRecordBuilder, FileBuilder, FolderBuilder, UserBuilder};
pub use db::TestDb;
