//! Setting CLI commands
//!
//! Handles: codepad setting get/set/list/delete

use super::parse_json_or_string;
use clap::Subcommand;
use codepad_core::ProjectStore;
use serde_json::Value;

/// Setting commands
#[derive(Subcommand)]
pub enum SettingCommands {
    /// Print a setting as JSON
    Get {
        /// Setting key
        key: String,
        /// Value to print when the key is not set
        #[arg(long)]
        default: Option<String>,
    },
    /// Store a setting (JSON, or a plain string)
    Set {
        /// Setting key
        key: String,
        /// Value
        value: String,
    },
    /// List all settings
    List,
    /// Remove a setting
    Delete {
        /// Setting key
        key: String,
    },
}

/// Execute a setting command
pub async fn execute(cmd: SettingCommands, store: &ProjectStore) -> anyhow::Result<()> {
    match cmd {
        SettingCommands::Get { key, default } => {
            let default = default.as_deref().map_or(Value::Null, parse_json_or_string);
            let value: Value = store.get_setting(&key, default).await?;
            println!("{value}");
        }
        SettingCommands::Set { key, value } => {
            let value = parse_json_or_string(&value);
            store.save_setting(&key, &value).await?;
            println!("Set {key} = {value}");
        }
        SettingCommands::List => {
            let settings = store.list_settings().await?;
            if settings.is_empty() {
                println!("No settings found.");
            } else {
                for (key, value) in settings {
                    println!("{key} = {value}");
                }
            }
        }
        SettingCommands::Delete { key } => {
            if store.delete_setting(&key).await? {
                println!("Deleted setting {key}");
            } else {
                println!("Setting {key} was not set.");
            }
        }
    }
    Ok(())
}
