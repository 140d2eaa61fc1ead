//! File CLI commands
//!
//! Handles: codepad file add/delete

use anyhow::Context;
use clap::Subcommand;
use codepad_core::{FileNode, ProjectStore};
use std::path::PathBuf;

/// File commands
#[derive(Subcommand)]
pub enum FileCommands {
    /// Add a local file to a project, or replace the project file with the same ID
    Add {
        /// Project ID
        project: String,
        /// Local file to read content from
        path: PathBuf,
        /// Name inside the project (defaults to the local file name)
        #[arg(long)]
        name: Option<String>,
        /// Editor language (inferred from the extension by default)
        #[arg(long)]
        language: Option<String>,
        /// Reuse an existing file ID to overwrite that file
        #[arg(long)]
        id: Option<String>,
    },
    /// Delete a file from a project
    Delete {
        /// Project ID
        project: String,
        /// File ID
        file: String,
    },
}

/// Execute a file command
pub async fn execute(cmd: FileCommands, store: &ProjectStore) -> anyhow::Result<()> {
    match cmd {
        FileCommands::Add {
            project,
            path,
            name,
            language,
            id,
        } => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let name = match name {
                Some(name) => name,
                None => path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .map(str::to_string)
                    .with_context(|| format!("Cannot derive a name from {}", path.display()))?,
            };

            let mut file = FileNode::file(name, content);
            if let Some(language) = language {
                file = file.with_language(language);
            }
            if let Some(id) = id {
                file = file.with_id(id);
            }

            let file = store.save_file(&project, file).await?;
            println!("Saved file '{}'", file.name);
            println!("  ID: {}", file.id);
        }
        FileCommands::Delete { project, file } => {
            if store.delete_file(&project, &file).await? {
                println!("Deleted file {file} from project {project}");
            } else {
                println!("No file {file} in project {project}; nothing deleted.");
            }
        }
    }
    Ok(())
}
