//! Storage layer (`SQLite`)
//!
//! Three tables back the store: `projects`, `files` (indexed by owning
//! project) and `settings`. The repositories here borrow a connection or an
//! open transaction; the async [`crate::ProjectStore`] composes them.

pub mod db;
pub mod files;
pub mod migrations;
pub mod projects;
pub mod settings;

pub use db::{Database, DatabaseError};
pub use files::{FileRepo, StoredFile};
pub use projects::{ProjectRepo, ProjectSummary};
pub use settings::SettingRepo;
