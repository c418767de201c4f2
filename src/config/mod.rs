//! Mason configuration file
//!
//! `config.toml` lives in the platform config directory unless `--config`
//! (or `MASON_CONFIG`) names another file. Relative paths inside it are
//! taken relative to the file's own directory, so a project can keep a
//! config next to its buildpacks with `dir = "buildpacks"`.

pub mod schema;

pub use schema::Config;

use crate::buildpack::absolute;
use crate::error::{MasonError, MasonResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Locates, reads and writes the Mason config file
#[derive(Debug, Clone)]
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    /// Use `explicit` if given, otherwise the platform default location
    pub fn locate(explicit: Option<PathBuf>) -> Self {
        let path = explicit.unwrap_or_else(Self::default_path);
        Self {
            path: absolute(&path),
        }
    }

    /// `<config dir>/mason/config.toml`
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("mason")
            .join("config.toml")
    }

    /// Config file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory relative config paths are resolved against
    pub fn base_dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("/"))
    }

    /// Effective configuration: the file's values with relative paths
    /// anchored at [`Self::base_dir`]
    pub async fn load(&self) -> MasonResult<Config> {
        let mut config = self.read().await?;
        config.anchor(self.base_dir());
        Ok(config)
    }

    /// Configuration exactly as written, defaults if there is no file.
    /// This is what edits start from, so relative paths stay relative.
    pub async fn read(&self) -> MasonResult<Config> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No config at {}, using defaults", self.path.display());
                return Ok(Config::default());
            }
            Err(e) => {
                return Err(MasonError::io(
                    format!("reading config from {}", self.path.display()),
                    e,
                ))
            }
        };

        toml::from_str(&content).map_err(|e| MasonError::ConfigInvalid {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }

    /// Write `config`, creating the parent directory if needed
    pub async fn save(&self, config: &Config) -> MasonResult<()> {
        let dir = self.base_dir();
        fs::create_dir_all(dir)
            .await
            .map_err(|e| MasonError::ConfigDirCreate {
                path: dir.to_path_buf(),
                source: e,
            })?;

        fs::write(&self.path, toml::to_string_pretty(config)?)
            .await
            .map_err(|e| MasonError::io(format!("writing config to {}", self.path.display()), e))?;

        info!("Configuration saved to {}", self.path.display());
        Ok(())
    }
}
