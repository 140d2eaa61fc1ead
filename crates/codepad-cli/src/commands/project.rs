//! Project CLI commands
//!
//! Handles: codepad project list/create/show/settings/rename/delete/export/import

use anyhow::Context;
use clap::{Args, Subcommand};
use codepad_core::{FileNode, Project, ProjectStore, ProjectUpdate, SettingsPatch, Theme};
use std::path::PathBuf;

/// Settings flags shared by `create` and `settings`
#[derive(Args, Debug, Default)]
pub struct SettingsArgs {
    /// Color theme (dark or light)
    #[arg(long)]
    theme: Option<Theme>,
    /// Editor font size
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    font_size: Option<u32>,
    /// Indentation width
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    tab_size: Option<u32>,
}

impl From<SettingsArgs> for SettingsPatch {
    fn from(args: SettingsArgs) -> Self {
        Self {
            theme: args.theme,
            font_size: args.font_size,
            tab_size: args.tab_size,
        }
    }
}

/// Project commands
#[derive(Subcommand)]
pub enum ProjectCommands {
    /// List all projects, most recently updated first
    List,
    /// Create a new project
    Create {
        /// Project name
        name: String,
        /// Seed the project with index.html, style.css and script.js
        #[arg(long)]
        starter: bool,
        #[command(flatten)]
        settings: SettingsArgs,
    },
    /// Show a project and its file tree
    Show {
        /// Project ID
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Change project settings; unspecified settings are kept
    Settings {
        /// Project ID
        id: String,
        #[command(flatten)]
        settings: SettingsArgs,
    },
    /// Rename a project
    Rename {
        /// Project ID
        id: String,
        /// New name
        name: String,
    },
    /// Delete a project and all of its files
    Delete {
        /// Project ID
        id: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
    /// Export a project as JSON
    Export {
        /// Project ID
        id: String,
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Import a project from an exported JSON file
    Import {
        /// Exported project file
        file: PathBuf,
    },
}

/// Execute a project command
pub async fn execute(cmd: ProjectCommands, store: &ProjectStore) -> anyhow::Result<()> {
    match cmd {
        ProjectCommands::List => {
            let projects = store.list_projects().await?;
            if projects.is_empty() {
                println!("No projects found.");
            } else {
                println!("Projects:");
                for p in projects {
                    println!(
                        "  {} - {} ({} files, updated {})",
                        p.id,
                        p.name,
                        p.file_count,
                        p.updated_at.format("%Y-%m-%d %H:%M")
                    );
                }
            }
        }
        ProjectCommands::Create {
            name,
            starter,
            settings,
        } => {
            if name.trim().is_empty() {
                anyhow::bail!("Project name cannot be empty");
            }
            let files = if starter {
                Project::starter(&name).files
            } else {
                Vec::new()
            };
            let project = store
                .create_project(&name, files, &settings.into())
                .await?;

            println!("Created project '{}'", project.name);
            println!("  ID: {}", project.id);
        }
        ProjectCommands::Show { id, json } => {
            if json {
                println!("{}", store.export_project(&id).await?);
                return Ok(());
            }

            let project = store
                .get_project(&id)
                .await?
                .with_context(|| format!("Project not found: {id}"))?;
            print_project(&project);
        }
        ProjectCommands::Settings { id, settings } => {
            let patch = SettingsPatch::from(settings);
            if patch.is_empty() {
                anyhow::bail!("Nothing to change: pass --theme, --font-size or --tab-size");
            }
            let project = store
                .update_project(
                    &id,
                    ProjectUpdate {
                        settings: Some(patch),
                        ..ProjectUpdate::default()
                    },
                )
                .await?;
            let s = project.settings;
            println!(
                "Settings for '{}': theme={} fontSize={} tabSize={}",
                project.name, s.theme, s.font_size, s.tab_size
            );
        }
        ProjectCommands::Rename { id, name } => {
            let project = store
                .update_project(
                    &id,
                    ProjectUpdate {
                        name: Some(name),
                        ..ProjectUpdate::default()
                    },
                )
                .await?;
            println!("Renamed project {} to '{}'", project.id, project.name);
        }
        ProjectCommands::Delete { id, force } => {
            let project = store
                .get_project(&id)
                .await?
                .with_context(|| format!("Project not found: {id}"))?;

            if !force
                && !super::confirm(&format!(
                    "Delete project '{}' and its {} files?",
                    project.name,
                    project.files.len()
                ))?
            {
                println!("Cancelled.");
                return Ok(());
            }

            store.delete_project(&id).await?;
            println!("Deleted project: {}", project.name);
        }
        ProjectCommands::Export { id, output } => {
            let json = store.export_project(&id).await?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    println!("Exported project {id} to {}", path.display());
                }
                None => println!("{json}"),
            }
        }
        ProjectCommands::Import { file } => {
            let json = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let project = store.import_project(&json).await?;

            println!(
                "Imported project '{}' ({} files)",
                project.name,
                project.files.len()
            );
            println!("  ID: {}", project.id);
        }
    }
    Ok(())
}

fn print_project(project: &Project) {
    println!("Project: {}", project.name);
    println!("ID: {}", project.id);
    println!(
        "Settings: theme={} fontSize={} tabSize={}",
        project.settings.theme, project.settings.font_size, project.settings.tab_size
    );
    println!("Created: {}", project.created_at);
    println!("Updated: {}", project.updated_at);

    if project.files.is_empty() {
        println!("\nNo files.");
        return;
    }
    println!("\nFiles:");
    for file in &project.files {
        print_tree(file, 1);
    }
}

fn print_tree(node: &FileNode, depth: usize) {
    let indent = "  ".repeat(depth);
    if node.is_folder() {
        println!("{indent}{}/  [{}]", node.name, node.id);
        for child in &node.children {
            print_tree(child, depth + 1);
        }
    } else {
        let language = node.language.as_deref().unwrap_or("plain");
        let size = node.content.as_ref().map_or(0, String::len);
        println!("{indent}{}  ({language}, {size} bytes)  [{}]", node.name, node.id);
    }
}
