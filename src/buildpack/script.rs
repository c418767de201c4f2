//! Buildpack contract scripts
//!
//! Every buildpack exposes `bin/detect`, `bin/compile` and `bin/release`.
//! [`ScriptRunner`] is the only place that spawns them, with three ways of
//! consuming their stdout: capture it, stream it line by line, or capture
//! and parse it. The working directory is always passed explicitly.

use crate::buildpack::reformat::stream_reformatted;
use crate::error::{MasonError, MasonResult};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use tokio::io::BufReader;
use tokio::process::{Child, Command};
use tracing::debug;

/// One of the three fixed contract scripts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Script {
    Detect,
    Compile,
    Release,
}

impl Script {
    /// File name under the buildpack's `bin/` directory
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Detect => "detect",
            Self::Compile => "compile",
            Self::Release => "release",
        }
    }

    /// All contract scripts
    pub fn all() -> &'static [Self] {
        &[Self::Detect, Self::Compile, Self::Release]
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bin/{}", self.file_name())
    }
}

/// Captured result of a script run
#[derive(Debug, Clone)]
pub struct ScriptOutput {
    /// Exit status of the script
    pub status: ExitStatus,
    /// Everything the script wrote to stdout (lossily decoded)
    pub stdout: String,
}

impl ScriptOutput {
    /// Whether the script exited with status zero
    pub fn success(&self) -> bool {
        self.status.success()
    }
}

/// Runs contract scripts from a buildpack directory
#[derive(Debug, Clone)]
pub struct ScriptRunner {
    buildpack_dir: PathBuf,
}

impl ScriptRunner {
    /// Create a runner for the buildpack rooted at `buildpack_dir`
    pub fn new(buildpack_dir: impl Into<PathBuf>) -> Self {
        Self {
            buildpack_dir: buildpack_dir.into(),
        }
    }

    /// Path of a contract script
    pub fn path(&self, script: Script) -> PathBuf {
        self.buildpack_dir.join("bin").join(script.file_name())
    }

    /// Whether a contract script file is present
    pub fn has(&self, script: Script) -> bool {
        self.path(script).is_file()
    }

    fn command(&self, script: Script, args: &[&Path], cwd: &Path) -> MasonResult<Command> {
        let path = self.path(script);
        if !path.is_file() {
            return Err(MasonError::ScriptMissing(path));
        }

        debug!("Executing: {} {:?} (in {})", path.display(), args, cwd.display());

        let mut cmd = Command::new(&path);
        cmd.args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);
        Ok(cmd)
    }

    /// Run a script to completion and capture its stdout.
    ///
    /// A non-zero exit is not an error here; callers inspect the status.
    pub async fn capture(
        &self,
        script: Script,
        args: &[&Path],
        cwd: &Path,
    ) -> MasonResult<ScriptOutput> {
        let output = self
            .command(script, args, cwd)?
            .output()
            .await
            .map_err(|e| MasonError::script_launch(self.path(script), e))?;

        debug!("{} exited with {}", script, output.status);

        Ok(ScriptOutput {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        })
    }

    /// Run a script, reformatting and emitting each stdout line as soon as
    /// it is produced, then wait for it to exit.
    pub async fn stream<F>(
        &self,
        script: Script,
        args: &[&Path],
        cwd: &Path,
        emit: F,
    ) -> MasonResult<ExitStatus>
    where
        F: FnMut(&str),
    {
        let mut child = self
            .command(script, args, cwd)?
            .spawn()
            .map_err(|e| MasonError::script_launch(self.path(script), e))?;

        let stdout = child.stdout.take().ok_or_else(|| {
            MasonError::io(
                format!("capturing stdout of {}", script),
                std::io::Error::other("stdout was not piped"),
            )
        })?;

        let read = stream_reformatted(BufReader::new(stdout), emit).await;
        let lines = match read {
            Ok(lines) => lines,
            Err(e) => {
                reap(&mut child).await;
                return Err(MasonError::io(format!("reading output of {}", script), e));
            }
        };

        let status = child
            .wait()
            .await
            .map_err(|e| MasonError::io(format!("waiting for {}", script), e))?;

        debug!("{} exited with {} after {} lines", script, status, lines);
        Ok(status)
    }

    /// Run a script, capture its stdout regardless of exit status, and hand
    /// it to `parse`.
    pub async fn parse<T, P>(
        &self,
        script: Script,
        args: &[&Path],
        cwd: &Path,
        parse: P,
    ) -> MasonResult<T>
    where
        P: FnOnce(&str) -> MasonResult<T>,
    {
        let output = self.capture(script, args, cwd).await?;
        parse(&output.stdout)
    }
}

/// Kill a script whose output can no longer be read and wait for it
async fn reap(child: &mut Child) {
    if let Err(e) = child.kill().await {
        debug!("Failed to kill script: {}", e);
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::buildpack::test_support::write_script;
    use tempfile::TempDir;

    #[test]
    fn script_paths() {
        let runner = ScriptRunner::new("/opt/buildpacks/ruby");
        assert_eq!(
            runner.path(Script::Compile),
            PathBuf::from("/opt/buildpacks/ruby/bin/compile")
        );
        assert_eq!(Script::Release.to_string(), "bin/release");
    }

    #[tokio::test]
    async fn capture_stdout_and_status() {
        let bp = TempDir::new().unwrap();
        write_script(bp.path(), "detect", "echo \"Ruby: $1\"\nexit 3");
        let runner = ScriptRunner::new(bp.path());

        let app = Path::new("/srv/my app");
        let output = runner
            .capture(Script::Detect, &[app], bp.path())
            .await
            .unwrap();

        assert!(!output.success());
        assert_eq!(output.status.code(), Some(3));
        assert_eq!(output.stdout, "Ruby: /srv/my app\n");
    }

    #[tokio::test]
    async fn runs_in_given_directory() {
        let bp = TempDir::new().unwrap();
        let cwd = TempDir::new().unwrap();
        write_script(bp.path(), "release", "pwd");
        let runner = ScriptRunner::new(bp.path());

        let output = runner.capture(Script::Release, &[], cwd.path()).await.unwrap();

        let reported = PathBuf::from(output.stdout.trim());
        assert_eq!(
            reported.canonicalize().unwrap(),
            cwd.path().canonicalize().unwrap()
        );
    }

    #[tokio::test]
    async fn stream_emits_reformatted_lines() {
        let bp = TempDir::new().unwrap();
        write_script(
            bp.path(),
            "compile",
            "echo '-----> Building'\necho '       ok'\necho '   '\nexit 0",
        );
        let runner = ScriptRunner::new(bp.path());

        let mut lines = Vec::new();
        let status = runner
            .stream(Script::Compile, &[], bp.path(), |l| lines.push(l.to_string()))
            .await
            .unwrap();

        assert!(status.success());
        assert_eq!(lines, vec!["  + Building", "      ok"]);
    }

    #[tokio::test]
    async fn reap_kills_and_waits() {
        let mut child = Command::new("sleep")
            .arg("30")
            .kill_on_drop(true)
            .spawn()
            .unwrap();

        reap(&mut child).await;

        let status = child.try_wait().unwrap().expect("child already reaped");
        assert!(!status.success());
    }

    #[tokio::test]
    async fn missing_script_errors() {
        let bp = TempDir::new().unwrap();
        let runner = ScriptRunner::new(bp.path());
        let err = runner
            .capture(Script::Detect, &[], bp.path())
            .await
            .unwrap_err();
        assert!(matches!(err, MasonError::ScriptMissing(_)));
    }

    #[tokio::test]
    async fn parse_receives_stdout_even_on_failure() {
        let bp = TempDir::new().unwrap();
        write_script(bp.path(), "release", "echo hello\nexit 1");
        let runner = ScriptRunner::new(bp.path());

        let parsed = runner
            .parse(Script::Release, &[], bp.path(), |s| Ok(s.trim().to_uppercase()))
            .await
            .unwrap();

        assert_eq!(parsed, "HELLO");
    }
}
