//! Compile command - build an app into a runnable working copy

use super::resolve_buildpack;
use crate::buildpack::{absolute, CompileOptions};
use crate::cli::args::CompileArgs;
use crate::config::Config;
use crate::error::MasonResult;
use crate::procfile::{Procfile, PROCFILE_NAME};
use crate::ui::{self, Tone, UiContext};
use tracing::debug;

/// Execute the compile command
pub async fn execute(args: CompileArgs, config: &Config) -> MasonResult<()> {
    let ctx = UiContext::detect();
    let buildpack = resolve_buildpack(&args.buildpack, config).await?;

    // Explicit --cache wins over the configured cache root
    let app = absolute(&args.app);
    let cache_dir = args
        .cache
        .clone()
        .or_else(|| config.compile.cache_dir_for(&app));
    let options = CompileOptions {
        env_file: args.env_file.clone(),
        cache_dir,
    };

    ui::banner(
        &ctx,
        &format!(
            "Compiling {} with {}",
            app.display(),
            buildpack.name()
        ),
    );

    let working_copy = match buildpack.compile(&app, &options).await {
        Ok(dir) => dir,
        Err(e) => {
            ui::finish(&ctx, Tone::Error, "Compile failed");
            return Err(e);
        }
    };

    let procfile = Procfile::from_file(&working_copy.join(PROCFILE_NAME)).await?;
    debug!("Final process types: {:?}", procfile.names());

    ui::compile_summary(&ctx, &working_copy, &procfile);
    Ok(())
}
