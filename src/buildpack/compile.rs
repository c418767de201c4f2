//! Compile pipeline
//!
//! stage working copy -> bin/compile (streamed) -> bin/release (parsed)
//! -> Procfile merge -> profile + start scripts.
//!
//! Only a failing `bin/compile` and unparseable `bin/release` output are
//! classified; everything else propagates as the underlying IO error. The
//! working copy is never cleaned up, not even on failure.

use super::launch::{write_release_profile, write_start_scripts};
use super::stage::{ensure_cache_dir, stage_working_copy};
use super::{absolute, Buildpack, ReleaseConfig, Script};
use crate::error::{MasonError, MasonResult};
use crate::procfile::{Procfile, PROCFILE_NAME};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Optional inputs to a compile
#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    /// Environment file for the build. Accepted but not applied yet.
    pub env_file: Option<PathBuf>,

    /// Cache directory handed to `bin/compile`; defaults to
    /// `<app>/.git/cache`
    pub cache_dir: Option<PathBuf>,
}

impl CompileOptions {
    /// Cache directory used for `app`
    pub fn cache_dir_for(&self, app: &Path) -> PathBuf {
        match &self.cache_dir {
            Some(dir) => absolute(dir),
            None => app.join(".git").join("cache"),
        }
    }
}

impl Buildpack {
    /// Compile `app`, printing buildpack output to stdout as it streams.
    ///
    /// Returns the path of the compiled working copy.
    pub async fn compile(&self, app: &Path, options: &CompileOptions) -> MasonResult<PathBuf> {
        self.compile_with(app, options, |line| println!("{}", line))
            .await
    }

    /// Compile `app`, handing every line of user-facing output to `emit`.
    pub async fn compile_with<F>(
        &self,
        app: &Path,
        options: &CompileOptions,
        mut emit: F,
    ) -> MasonResult<PathBuf>
    where
        F: FnMut(&str),
    {
        let app = absolute(app);
        if !app.is_dir() {
            return Err(MasonError::AppNotFound(app));
        }

        let cache_dir = options.cache_dir_for(&app);
        if let Some(env_file) = &options.env_file {
            debug!("Environment file {} is not applied", env_file.display());
        }

        emit(&format!("  caching in {}", cache_dir.display()));

        // Stage
        let working_copy = stage_working_copy(&app).await?;
        ensure_cache_dir(&cache_dir).await?;
        info!("Compiling {} with {} in {}", app.display(), self.name(), working_copy.display());

        // bin/compile
        let status = self
            .scripts()
            .stream(
                Script::Compile,
                &[working_copy.as_path(), cache_dir.as_path()],
                &working_copy,
                &mut emit,
            )
            .await?;

        if !status.success() {
            warn!("Compile failed; working copy left at {}", working_copy.display());
            return Err(MasonError::CompileFailed {
                buildpack: self.name().to_string(),
                code: status.code(),
            });
        }

        // bin/release
        let release = self
            .scripts()
            .parse(Script::Release, &[working_copy.as_path()], &working_copy, |out| {
                ReleaseConfig::parse_for(self.name(), out)
            })
            .await?;
        debug!(
            "Release declared {} process types and {} config vars",
            release.default_process_types.len(),
            release.config_vars.len()
        );

        let procfile = write_procfile(&working_copy, &release).await?;

        write_release_profile(&working_copy, &release.config_vars).await?;
        write_start_scripts(&working_copy, &procfile).await?;

        Ok(working_copy)
    }
}

/// Merge release defaults under any Procfile the app ships and write the
/// result back in place.
///
/// Returns the Procfile as it reads back from disk, which is what start
/// scripts are generated from. An entry that doesn't survive the round
/// trip (empty or multi-line command) is logged as a warning.
async fn write_procfile(working_copy: &Path, release: &ReleaseConfig) -> MasonResult<Procfile> {
    let path = working_copy.join(PROCFILE_NAME);
    let mut procfile = Procfile::from_file_or_default(&path).await?;
    procfile.merge(&release.default_process_types);

    procfile.write(&path).await?;

    let written = Procfile::parse(&procfile.to_string());
    for process in procfile.iter() {
        if written.get(&process.name) != Some(process.command.as_str()) {
            warn!("Process type {} does not read back from {}", process.name, path.display());
        }
    }
    debug!("Wrote {} with {:?}", path.display(), written.names());
    Ok(written)
}
