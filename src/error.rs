//! Error types for Mason
//!
//! All modules use `MasonResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Mason operations
pub type MasonResult<T> = Result<T, MasonError>;

/// All errors that can occur in Mason
#[derive(Error, Debug)]
pub enum MasonError {
    // Buildpack errors
    #[error("Buildpack not found: {0}")]
    BuildpackNotFound(String),

    #[error("Buildpack script missing: {0}")]
    ScriptMissing(PathBuf),

    #[error("Failed to launch {script}: {source}")]
    ScriptLaunch {
        script: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("compile failed: {buildpack} exited with {}", exit_label(.code))]
    CompileFailed { buildpack: String, code: Option<i32> },

    #[error("Invalid release output from {buildpack}: {reason}")]
    ReleaseParse { buildpack: String, reason: String },

    #[error("{buildpack} does not apply to {}", .app.display())]
    NotDetected { buildpack: String, app: PathBuf },

    #[error("Application directory not found: {0}")]
    AppNotFound(PathBuf),

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("{0}")]
    User(String),
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "a signal".to_string(),
    }
}

impl MasonError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a script launch error
    pub fn script_launch(script: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ScriptLaunch {
            script: script.into(),
            source,
        }
    }

    /// True for the fatal "compile failed" condition
    pub fn is_compile_failure(&self) -> bool {
        matches!(self, Self::CompileFailed { .. })
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::BuildpackNotFound(_) => {
                Some("Pass a buildpack directory or run: mason buildpacks")
            }
            Self::ScriptMissing(_) => {
                Some("A buildpack must provide executable bin/detect, bin/compile and bin/release")
            }
            Self::CompileFailed { .. } => {
                Some("The working copy was kept on disk for inspection (see output above)")
            }
            Self::NotDetected { .. } => Some("bin/detect exited non-zero for this app"),
            Self::ReleaseParse { .. } => {
                Some("bin/release must print YAML with default_process_types and config_vars")
            }
            _ => None,
        }
    }
}
