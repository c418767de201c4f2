//! Buildpacks and the detect/compile/release pipeline
//!
//! A buildpack is a directory with three executables under `bin/`. Mason
//! identifies it by directory name and git remote, asks `bin/detect`
//! whether it applies to an app, and drives `bin/compile` + `bin/release`
//! to turn the app into a runnable working copy.

mod compile;
pub mod launch;
pub mod reformat;
pub mod release;
pub mod script;
pub mod stage;

pub use compile::CompileOptions;
pub use release::ReleaseConfig;
pub use script::{Script, ScriptOutput, ScriptRunner};

use crate::error::{MasonError, MasonResult};
use serde::Serialize;
use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, warn};

/// A buildpack directory and its identity.
///
/// Buildpacks compare and sort by name only.
#[derive(Debug, Clone, Serialize)]
pub struct Buildpack {
    name: String,
    dir: PathBuf,
    url: String,
    #[serde(skip)]
    scripts: ScriptRunner,
}

impl Buildpack {
    /// Open the buildpack at `dir`.
    ///
    /// The name is the directory's base name and the URL is the git
    /// `remote.origin.url` of the directory, or empty when there is none.
    /// This never fails; a bad directory surfaces when a script is run.
    pub async fn new(dir: impl AsRef<Path>) -> Self {
        let dir = absolute(dir.as_ref());
        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| dir.display().to_string());
        let url = origin_url(&dir).await;

        Self {
            scripts: ScriptRunner::new(&dir),
            name,
            dir,
            url,
        }
    }

    /// Display name (directory base name)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Buildpack root directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Git origin URL, empty if unknown
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Contract script runner for this buildpack
    pub fn scripts(&self) -> &ScriptRunner {
        &self.scripts
    }

    /// Run `bin/detect` against `app`.
    ///
    /// Returns the trimmed detected name on exit status zero and `None`
    /// otherwise. A script that can't be launched also counts as "does not
    /// apply". The script runs in a scratch directory that is removed
    /// afterwards.
    pub async fn detect(&self, app: &Path) -> MasonResult<Option<String>> {
        let app = absolute(app);
        let scratch = tempfile::Builder::new()
            .prefix("mason-detect-")
            .tempdir()
            .map_err(|e| MasonError::io("creating detect scratch directory", e))?;

        let output = match self
            .scripts
            .capture(Script::Detect, &[app.as_path()], scratch.path())
            .await
        {
            Ok(output) => output,
            Err(e @ (MasonError::ScriptMissing(_) | MasonError::ScriptLaunch { .. })) => {
                warn!("{}: {}", self.name, e);
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        if output.success() {
            let detected = output.stdout.trim().to_string();
            debug!("{} detected {:?} for {}", self.name, detected, app.display());
            Ok(Some(detected))
        } else {
            debug!("{} does not apply to {}", self.name, app.display());
            Ok(None)
        }
    }
}

impl PartialEq for Buildpack {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Buildpack {}

impl PartialOrd for Buildpack {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Buildpack {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name.cmp(&other.name)
    }
}

/// Make `path` absolute against the current directory without resolving
/// symlinks. Falls back to the path as given.
pub(crate) fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// `git config remote.origin.url` inside `dir`, or empty
async fn origin_url(dir: &Path) -> String {
    let output = Command::new("git")
        .args(["config", "remote.origin.url"])
        .current_dir(dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .output()
        .await;

    match output {
        Ok(output) if output.status.success() => {
            String::from_utf8_lossy(&output.stdout).trim().to_string()
        }
        Ok(_) => String::new(),
        Err(e) => {
            debug!("git unavailable for {}: {}", dir.display(), e);
            String::new()
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::fs;
    use std::path::Path;

    /// Write an executable `bin/<name>` shell script under `buildpack`
    pub fn write_script(buildpack: &Path, name: &str, body: &str) {
        let bin = buildpack.join("bin");
        fs::create_dir_all(&bin).unwrap();
        let path = bin.join(name);
        fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        }
    }
}
