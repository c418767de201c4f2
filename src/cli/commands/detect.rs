//! Detect command - check whether a buildpack applies to an app

use super::resolve_buildpack;
use crate::cli::args::DetectArgs;
use crate::config::Config;
use crate::error::{MasonError, MasonResult};

/// Execute the detect command
///
/// Prints the detected name on stdout. A negative detection is reported as
/// an error so the process exits non-zero, like `bin/detect` itself.
pub async fn execute(args: DetectArgs, config: &Config) -> MasonResult<()> {
    let buildpack = resolve_buildpack(&args.buildpack, config).await?;

    match buildpack.detect(&args.app).await? {
        Some(name) => {
            println!("{}", name);
            Ok(())
        }
        None => Err(MasonError::NotDetected {
            buildpack: buildpack.name().to_string(),
            app: args.app,
        }),
    }
}
