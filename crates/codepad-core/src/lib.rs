//! codepad core - project/file store, settings and import/export
//!
//! This crate persists editor projects, their file trees and global
//! key-value settings in `SQLite`, with cascade-consistent deletes and
//! transactional multi-record writes.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]

pub mod config;
pub mod error;
pub mod export;
pub mod file;
pub mod project;
pub mod storage;
pub mod store;
pub mod util;

pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};
pub use file::{FileKind, FileNode};
pub use project::{Project, ProjectSettings, ProjectUpdate, SettingsPatch, Theme};
pub use storage::ProjectSummary;
pub use store::ProjectStore;
