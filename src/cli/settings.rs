use std::path::Path;

use anyhow::{anyhow, Result};
use clap::Subcommand;
use serde_json::Value;

use crate::{settings::SettingsManager, utils::dir::SETTINGS_FILE};

#[derive(Subcommand, Debug)]
pub enum SettingsCommand {
    #[command(about = "Print all settings")]
    Show {},
    #[command(about = "Print a single setting")]
    Get { key: String },
    #[command(about = "Change a setting. The value is read as JSON, falling back to plain text")]
    Set { key: String, value: String },
}

pub async fn process_settings_command(command: SettingsCommand, dir: &Path) -> Result<()> {
    let mut manager = SettingsManager::load(dir.join(SETTINGS_FILE)).await;
    match command {
        SettingsCommand::Show {} => {
            println!("{}", serde_json::to_string_pretty(&manager.as_value()?)?);
        }
        SettingsCommand::Get { key } => {
            let value = manager
                .get(&key)
                .ok_or_else(|| anyhow!("Unknown setting {key}"))?;
            println!("{value}");
        }
        SettingsCommand::Set { key, value } => {
            manager.set(&key, parse_value(&value)).await?;
            println!("Settings have been saved successfully!");
        }
    }
    Ok(())
}

/// `30` becomes a number and `true` a bool, anything that isn't JSON stays a string.
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::parse_value;

    #[test]
    fn values_are_json_or_plain_text() {
        assert_eq!(parse_value("45"), json!(45));
        assert_eq!(parse_value("false"), json!(false));
        assert_eq!(parse_value(r#"["steam"]"#), json!(["steam"]));
        assert_eq!(parse_value("desktop"), json!("desktop"));
    }
}
