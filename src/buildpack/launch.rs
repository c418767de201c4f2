//! Start scripts for compiled applications
//!
//! Every process type gets `bin/run-<name>.sh`, which prepares the runtime
//! environment (`HOME`, `PORT`, `.profile.d/*.sh`) and then runs the
//! process command. The supervisor that executes these is out of scope.

use crate::error::{MasonError, MasonResult};
use crate::procfile::Procfile;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

/// Home directory the application runs from
pub const APP_HOME: &str = "/app";

/// Port exported to every process
pub const DEFAULT_PORT: u16 = 5000;

/// Directory of profile scripts sourced before each process starts
pub const PROFILE_DIR: &str = ".profile.d";

/// Profile script written from release config vars when none exists
pub const RELEASE_PROFILE: &str = "env.sh";

/// Interactive/administrative process types that never get a start script
pub const SKIPPED_PROCESSES: &[&str] = &["rake", "console"];

/// Path of the start script for a process type
pub fn start_script_path(working_copy: &Path, name: &str) -> PathBuf {
    working_copy.join("bin").join(format!("run-{}.sh", name))
}

/// Render the start script body for `command`
pub fn render_start_script(command: &str) -> String {
    format!(
        r#"#!/bin/bash
export HOME={home}

cd $HOME
export PORT={port}
for profile in "$HOME"/{profile_dir}/*.sh; do
  [ -r "$profile" ] && source "$profile"
done

{command}

"#,
        home = APP_HOME,
        port = DEFAULT_PORT,
        profile_dir = PROFILE_DIR,
        command = command,
    )
}

/// Render a profile script exporting each config var. Keys that are not
/// shell identifiers are left out.
pub fn render_profile(config_vars: &[(String, String)]) -> String {
    let mut script = String::new();
    for (key, value) in config_vars {
        if !is_shell_identifier(key) {
            warn!("Ignoring config var {:?}: not a valid environment variable name", key);
            continue;
        }
        script.push_str(&format!("export {}=\"{}\"\n", key, escape_double_quoted(value)));
    }
    script
}

/// `[A-Za-z_][A-Za-z0-9_]*`
fn is_shell_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Escape a value for use inside double quotes, keeping `$` expansion
fn escape_double_quoted(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '"' | '\\' | '`') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Whether the working copy already ships at least one `.profile.d/*.sh`
async fn has_profile_scripts(working_copy: &Path) -> MasonResult<bool> {
    let dir = working_copy.join(PROFILE_DIR);
    let mut entries = match fs::read_dir(&dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(MasonError::io(format!("reading {}", dir.display()), e)),
    };

    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| MasonError::io(format!("reading {}", dir.display()), e))?
    {
        if entry.path().extension().is_some_and(|ext| ext == "sh") {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Write `.profile.d/env.sh` from the release config vars unless the
/// working copy already has a profile script or there is nothing to export.
///
/// Returns the path written, if any.
pub async fn write_release_profile(
    working_copy: &Path,
    config_vars: &[(String, String)],
) -> MasonResult<Option<PathBuf>> {
    if config_vars.is_empty() || has_profile_scripts(working_copy).await? {
        return Ok(None);
    }

    let profile = render_profile(config_vars);
    if profile.is_empty() {
        return Ok(None);
    }

    let dir = working_copy.join(PROFILE_DIR);
    fs::create_dir_all(&dir)
        .await
        .map_err(|e| MasonError::io(format!("creating {}", dir.display()), e))?;

    let path = dir.join(RELEASE_PROFILE);
    fs::write(&path, profile)
        .await
        .map_err(|e| MasonError::io(format!("writing {}", path.display()), e))?;

    debug!("Wrote {} config vars to {}", config_vars.len(), path.display());
    Ok(Some(path))
}

/// Write an executable start script for every process type except the
/// administrative ones. Returns the scripts written, in Procfile order.
pub async fn write_start_scripts(
    working_copy: &Path,
    procfile: &Procfile,
) -> MasonResult<Vec<PathBuf>> {
    let bin_dir = working_copy.join("bin");
    let mut written = Vec::new();

    for process in procfile.iter() {
        if SKIPPED_PROCESSES.contains(&process.name.as_str()) {
            debug!("Skipping start script for {}", process.name);
            continue;
        }

        if written.is_empty() {
            fs::create_dir_all(&bin_dir)
                .await
                .map_err(|e| MasonError::io(format!("creating {}", bin_dir.display()), e))?;
        }

        let path = start_script_path(working_copy, &process.name);
        fs::write(&path, render_start_script(&process.command))
            .await
            .map_err(|e| MasonError::io(format!("writing {}", path.display()), e))?;
        make_executable(&path).await?;

        info!("Wrote start script {}", path.display());
        written.push(path);
    }

    Ok(written)
}

#[cfg(unix)]
async fn make_executable(path: &Path) -> MasonResult<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
        .await
        .map_err(|e| MasonError::io(format!("setting permissions on {}", path.display()), e))
}

#[cfg(not(unix))]
async fn make_executable(_path: &Path) -> MasonResult<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn start_script_layout() {
        let script = render_start_script("bundle exec thin start -p $PORT");
        let lines: Vec<&str> = script.lines().collect();

        assert_eq!(lines[0], "#!/bin/bash");
        assert_eq!(lines[1], "export HOME=/app");
        assert_eq!(lines[3], "cd $HOME");
        assert_eq!(lines[4], "export PORT=5000");
        assert!(lines[5].contains(".profile.d/*.sh"));
        assert!(script.contains("\nbundle exec thin start -p $PORT\n"));

        let source_at = script.find("source").unwrap();
        let command_at = script.find("bundle exec").unwrap();
        assert!(source_at < command_at);
    }

    #[test]
    fn profile_exports_in_order() {
        let profile = render_profile(&vars(&[
            ("LANG", "en_US.UTF-8"),
            ("PATH", "bin:$PATH"),
            ("MOTD", "say \"hi\""),
        ]));
        assert_eq!(
            profile,
            "export LANG=\"en_US.UTF-8\"\nexport PATH=\"bin:$PATH\"\nexport MOTD=\"say \\\"hi\\\"\"\n"
        );
    }

    #[test]
    fn profile_skips_unsafe_keys() {
        let profile = render_profile(&vars(&[
            ("LANG", "C"),
            ("BAD KEY", "x"),
            ("X;rm -rf /", "y"),
            ("1ST", "z"),
            ("_PRIVATE_2", "ok"),
        ]));
        assert_eq!(profile, "export LANG=\"C\"\nexport _PRIVATE_2=\"ok\"\n");
    }

    #[tokio::test]
    async fn skips_rake_and_console() {
        let temp = TempDir::new().unwrap();
        let procfile: Procfile = [
            ("web", "bundle exec rackup"),
            ("rake", "bundle exec rake"),
            ("console", "bundle exec irb"),
        ]
        .into_iter()
        .collect();

        let written = write_start_scripts(temp.path(), &procfile).await.unwrap();

        assert_eq!(written, vec![start_script_path(temp.path(), "web")]);
        assert!(temp.path().join("bin/run-web.sh").is_file());
        assert!(!temp.path().join("bin/run-rake.sh").exists());
        assert!(!temp.path().join("bin/run-console.sh").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn start_scripts_are_executable() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let procfile: Procfile = [("worker", "./work")].into_iter().collect();
        write_start_scripts(temp.path(), &procfile).await.unwrap();

        let mode = std::fs::metadata(temp.path().join("bin/run-worker.sh"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o755);
    }

    #[tokio::test]
    async fn release_profile_written_when_missing() {
        let temp = TempDir::new().unwrap();
        let written = write_release_profile(temp.path(), &vars(&[("LANG", "C")]))
            .await
            .unwrap();

        let path = temp.path().join(".profile.d/env.sh");
        assert_eq!(written, Some(path.clone()));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "export LANG=\"C\"\n");
    }

    #[tokio::test]
    async fn release_profile_not_written_over_existing() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join(".profile.d");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("ruby.sh"), "export GEM_PATH=/app/vendor\n").unwrap();

        let written = write_release_profile(temp.path(), &vars(&[("LANG", "C")]))
            .await
            .unwrap();

        assert!(written.is_none());
        assert!(!dir.join("env.sh").exists());
    }

    #[tokio::test]
    async fn release_profile_skipped_when_no_key_is_usable() {
        let temp = TempDir::new().unwrap();
        let written = write_release_profile(temp.path(), &vars(&[("NOT VALID", "x")]))
            .await
            .unwrap();
        assert!(written.is_none());
        assert!(!temp.path().join(".profile.d").exists());
    }

    #[tokio::test]
    async fn release_profile_skipped_without_vars() {
        let temp = TempDir::new().unwrap();
        let written = write_release_profile(temp.path(), &[]).await.unwrap();
        assert!(written.is_none());
        assert!(!temp.path().join(".profile.d").exists());
    }
}
