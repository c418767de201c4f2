//! Working copy staging
//!
//! Compilation never touches the application directory. Instead the app is
//! copied into a fresh temporary directory that outlives the process (it is
//! the compiled artifact) with permission bits and symlinks preserved.

use crate::error::{MasonError, MasonResult};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Prefix for working copy directories under the system temp dir
const WORKING_COPY_PREFIX: &str = "mason-compile-";

/// Copy `app` into a new, persistent temporary directory and return its path.
pub async fn stage_working_copy(app: &Path) -> MasonResult<PathBuf> {
    let app = app.to_path_buf();
    tokio::task::spawn_blocking(move || {
        let dir = tempfile::Builder::new()
            .prefix(WORKING_COPY_PREFIX)
            .tempdir()
            .map_err(|e| MasonError::io("creating working copy directory", e))?
            .keep();

        copy_tree(&app, &dir)?;
        debug!("Staged {} into {}", app.display(), dir.display());
        Ok(dir)
    })
    .await
    .map_err(|e| MasonError::io("staging working copy", std::io::Error::other(e)))?
}

/// Create the cache directory (and parents) if it doesn't exist yet
pub async fn ensure_cache_dir(path: &Path) -> MasonResult<()> {
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|e| MasonError::io(format!("creating cache directory {}", path.display()), e))
}

/// Recursively copy the contents of `src` into the existing directory `dst`.
///
/// Directory modes are applied last so read-only directories can still be
/// populated.
pub fn copy_tree(src: &Path, dst: &Path) -> MasonResult<()> {
    let mut dir_modes = vec![(
        dst.to_path_buf(),
        fs::metadata(src)
            .map_err(|e| MasonError::io(format!("reading {}", src.display()), e))?
            .permissions(),
    )];

    for entry in WalkDir::new(src).min_depth(1) {
        let entry = entry.map_err(|e| {
            let context = format!("walking {}", src.display());
            MasonError::io(context, e.into())
        })?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| MasonError::io("computing relative path", std::io::Error::other(e)))?;
        let target = dst.join(relative);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            fs::create_dir(&target)
                .map_err(|e| MasonError::io(format!("creating {}", target.display()), e))?;
            let perms = entry
                .metadata()
                .map_err(|e| MasonError::io(format!("reading {}", entry.path().display()), e.into()))?
                .permissions();
            dir_modes.push((target, perms));
        } else if file_type.is_symlink() {
            copy_symlink(entry.path(), &target)?;
        } else {
            // fs::copy carries the permission bits over
            fs::copy(entry.path(), &target).map_err(|e| {
                MasonError::io(format!("copying {}", entry.path().display()), e)
            })?;
        }
    }

    for (dir, perms) in dir_modes.into_iter().rev() {
        fs::set_permissions(&dir, perms)
            .map_err(|e| MasonError::io(format!("setting permissions on {}", dir.display()), e))?;
    }

    Ok(())
}

#[cfg(unix)]
fn copy_symlink(src: &Path, target: &Path) -> MasonResult<()> {
    let link = fs::read_link(src)
        .map_err(|e| MasonError::io(format!("reading link {}", src.display()), e))?;
    std::os::unix::fs::symlink(&link, target)
        .map_err(|e| MasonError::io(format!("creating link {}", target.display()), e))
}

#[cfg(not(unix))]
fn copy_symlink(src: &Path, target: &Path) -> MasonResult<()> {
    fs::copy(src, target)
        .map(|_| ())
        .map_err(|e| MasonError::io(format!("copying {}", src.display()), e))
}
