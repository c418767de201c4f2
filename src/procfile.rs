//! Process manifest (Procfile) model
//!
//! A Procfile maps process-type names to shell commands, one
//! `name: command` entry per line. Entry order is preserved and names are
//! unique: inserting an existing name replaces its command in place.

use crate::error::{MasonError, MasonResult};
use serde::Serialize;
use std::fmt;
use std::path::Path;
use tokio::fs;
use tracing::debug;

/// File name of the process manifest inside an application directory
pub const PROCFILE_NAME: &str = "Procfile";

/// A single process type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessType {
    /// Process-type name (e.g. "web", "worker")
    pub name: String,
    /// Shell command that starts the process
    pub command: String,
}

/// Ordered, name-unique mapping of process types to commands
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Procfile {
    entries: Vec<ProcessType>,
}

impl Procfile {
    /// Create an empty Procfile
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse Procfile text.
    ///
    /// Blank lines, `#` comments and lines that are not `name: command`
    /// are skipped. A repeated name keeps the last command seen.
    pub fn parse(content: &str) -> Self {
        let mut procfile = Self::new();
        for line in content.lines() {
            if let Some((name, command)) = parse_line(line) {
                procfile.insert(name, command);
            }
        }
        procfile
    }

    /// Read and parse a Procfile from disk
    pub async fn from_file(path: &Path) -> MasonResult<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| MasonError::io(format!("reading {}", path.display()), e))?;
        Ok(Self::parse(&content))
    }

    /// Read a Procfile if it exists, or return an empty one
    pub async fn from_file_or_default(path: &Path) -> MasonResult<Self> {
        if !path.exists() {
            debug!("No Procfile at {}", path.display());
            return Ok(Self::new());
        }
        Self::from_file(path).await
    }

    /// Write the Procfile to disk, one `name: command` line per entry
    pub async fn write(&self, path: &Path) -> MasonResult<()> {
        fs::write(path, self.to_string())
            .await
            .map_err(|e| MasonError::io(format!("writing {}", path.display()), e))
    }

    /// Insert or replace a process type
    pub fn insert(&mut self, name: impl Into<String>, command: impl Into<String>) {
        let name = name.into();
        let command = command.into();
        match self.entries.iter_mut().find(|e| e.name == name) {
            Some(entry) => entry.command = command,
            None => self.entries.push(ProcessType { name, command }),
        }
    }

    /// Merge `defaults` into this Procfile.
    ///
    /// Existing entries always win; defaults only fill in names that are
    /// absent here. New names are appended in the order of `defaults`.
    pub fn merge(&mut self, defaults: &Procfile) {
        for entry in &defaults.entries {
            if !self.contains(&entry.name) {
                self.entries.push(entry.clone());
            }
        }
    }

    /// Look up the command for a process type
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.command.as_str())
    }

    /// Check whether a process type is declared
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    /// Iterate entries in order
    pub fn iter(&self) -> impl Iterator<Item = &ProcessType> {
        self.entries.iter()
    }

    /// Process-type names in order
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<N: Into<String>, C: Into<String>> FromIterator<(N, C)> for Procfile {
    fn from_iter<I: IntoIterator<Item = (N, C)>>(iter: I) -> Self {
        let mut procfile = Self::new();
        for (name, command) in iter {
            procfile.insert(name, command);
        }
        procfile
    }
}

impl fmt::Display for Procfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            writeln!(f, "{}: {}", entry.name, entry.command)?;
        }
        Ok(())
    }
}

/// Whether `name` can appear in a Procfile: `[A-Za-z0-9_-]+`
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Split a `name: command` line
fn parse_line(line: &str) -> Option<(&str, &str)> {
    let line = line.trim_end();
    if line.trim_start().starts_with('#') {
        return None;
    }

    let (name, command) = line.split_once(':')?;
    if !is_valid_name(name) {
        return None;
    }

    let command = command.trim_start();
    if command.is_empty() {
        return None;
    }

    Some((name, command))
}
