//! Config command - show or edit configuration

use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::config::{Config, ConfigManager};
use crate::error::{MasonError, MasonResult};
use crate::ui::{self, Tone, UiContext};
use std::path::PathBuf;

/// Execute the config command
pub async fn execute(
    args: ConfigArgs,
    config: &Config,
    manager: &ConfigManager,
) -> MasonResult<()> {
    match args.action {
        None | Some(ConfigAction::Show) => show_config(config)?,
        Some(ConfigAction::Path) => show_path(manager),
        Some(ConfigAction::Init { force }) => init_config(manager, force).await?,
        Some(ConfigAction::Set { key, value }) => set_value(manager, &key, &value).await?,
    }

    Ok(())
}

fn show_config(config: &Config) -> MasonResult<()> {
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

fn show_path(manager: &ConfigManager) {
    println!("{}", manager.path().display());
}

async fn init_config(manager: &ConfigManager, force: bool) -> MasonResult<()> {
    let ctx = UiContext::detect();
    let path = manager.path();

    if path.exists() && !force {
        ui::note(
            &ctx,
            Tone::Warn,
            &format!("Config already exists at {}", path.display()),
            Some("use --force to overwrite"),
        );
        return Ok(());
    }

    manager.save(&Config::default()).await?;

    ui::note(
        &ctx,
        Tone::Ok,
        "Configuration initialized",
        Some(&path.display().to_string()),
    );

    Ok(())
}

/// Edit the file as written, so relative paths elsewhere in it survive
async fn set_value(manager: &ConfigManager, key: &str, value: &str) -> MasonResult<()> {
    let ctx = UiContext::detect();
    let config = apply_value(manager.read().await?, key, value)?;

    manager.save(&config).await?;
    ui::note(&ctx, Tone::Ok, &format!("Set {} = {}", key, value), None);

    Ok(())
}

/// Apply a dot-separated `key = value` to a copy of the config
fn apply_value(mut config: Config, key: &str, value: &str) -> MasonResult<Config> {
    let parts: Vec<&str> = key.split('.').collect();

    match parts.as_slice() {
        ["general", "log_format"] => match value {
            "text" | "json" => config.general.log_format = value.to_string(),
            _ => {
                return Err(MasonError::User(format!(
                    "Invalid log format: {}. Use text or json",
                    value
                )))
            }
        },
        ["buildpacks", "dir"] => config.buildpacks.dir = PathBuf::from(value),
        ["compile", "cache_root"] => {
            config.compile.cache_root = if value.is_empty() {
                None
            } else {
                Some(PathBuf::from(value))
            }
        }
        _ => {
            return Err(MasonError::User(format!(
                "Unknown config key: {}. Valid keys: {}",
                key,
                VALID_KEYS.join(", ")
            )))
        }
    }

    Ok(config)
}

const VALID_KEYS: &[&str] = &["general.log_format", "buildpacks.dir", "compile.cache_root"];
