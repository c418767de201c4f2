//! Configuration schema for Mason
//!
//! Configuration is stored at `~/.config/mason/config.toml`

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Installed buildpacks
    pub buildpacks: BuildpacksConfig,

    /// Compile settings
    pub compile: CompileConfig,
}

impl Config {
    /// Resolve relative paths against `base`
    pub fn anchor(&mut self, base: &Path) {
        if self.buildpacks.dir.is_relative() {
            self.buildpacks.dir = base.join(&self.buildpacks.dir);
        }
        if let Some(root) = self.compile.cache_root.as_mut() {
            if root.is_relative() {
                *root = base.join(&*root);
            }
        }
    }
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
        }
    }
}

/// Where installed buildpacks live
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildpacksConfig {
    /// Directory whose subdirectories are buildpacks
    pub dir: PathBuf,
}

impl Default for BuildpacksConfig {
    fn default() -> Self {
        Self {
            dir: dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("mason")
                .join("buildpacks"),
        }
    }
}

/// Compile settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileConfig {
    /// Root for per-app cache directories. When unset, each app caches in
    /// its own `.git/cache`.
    pub cache_root: Option<PathBuf>,
}

impl CompileConfig {
    /// Cache directory for `app` under `cache_root`, if configured
    pub fn cache_dir_for(&self, app: &Path) -> Option<PathBuf> {
        let root = self.cache_root.as_ref()?;
        let name = app.file_name()?;
        Some(root.join(name))
    }
}
