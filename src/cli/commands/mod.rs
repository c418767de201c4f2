//! CLI command implementations

pub mod buildpacks;
pub mod compile;
pub mod config;
pub mod detect;
pub mod info;

pub use buildpacks::execute as buildpacks;
pub use compile::execute as compile;
pub use config::execute as config;
pub use detect::execute as detect;
pub use info::execute as info;

use crate::buildpack::Buildpack;
use crate::config::Config;
use crate::error::{MasonError, MasonResult};
use std::path::Path;
use tracing::debug;

/// Resolve a buildpack argument: an existing directory is used as-is,
/// anything else is looked up by name in the configured buildpacks dir.
pub(crate) async fn resolve_buildpack(arg: &str, config: &Config) -> MasonResult<Buildpack> {
    let direct = Path::new(arg);
    if direct.is_dir() {
        return Ok(Buildpack::new(direct).await);
    }

    let installed = config.buildpacks.dir.join(arg);
    if !arg.contains(std::path::MAIN_SEPARATOR) && installed.is_dir() {
        debug!("Resolved buildpack {} to {}", arg, installed.display());
        return Ok(Buildpack::new(installed).await);
    }

    Err(MasonError::BuildpackNotFound(arg.to_string()))
}
