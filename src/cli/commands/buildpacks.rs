//! Buildpacks command - list installed buildpacks

use crate::buildpack::Buildpack;
use crate::cli::args::{BuildpacksArgs, OutputFormat};
use crate::config::Config;
use crate::error::{MasonError, MasonResult};
use crate::ui::{self, Tone, UiContext};
use std::path::Path;

/// Execute the buildpacks command
pub async fn execute(args: BuildpacksArgs, config: &Config) -> MasonResult<()> {
    let buildpacks = installed_buildpacks(&config.buildpacks.dir).await?;

    if buildpacks.is_empty() {
        match args.format {
            OutputFormat::Json => println!("[]"),
            OutputFormat::Plain => {}
            OutputFormat::Table => {
                let ctx = UiContext::detect();
                ui::note(
                    &ctx,
                    Tone::Info,
                    "No buildpacks installed",
                    Some(&config.buildpacks.dir.display().to_string()),
                );
            }
        }
        return Ok(());
    }

    match args.format {
        OutputFormat::Table => {
            ui::banner(&UiContext::detect(), "Buildpacks");
            print!("{}", ui::buildpack_table(&buildpacks));
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&buildpacks)?),
        OutputFormat::Plain => {
            for buildpack in &buildpacks {
                println!("{}", buildpack.name());
            }
        }
    }

    Ok(())
}

/// Buildpacks in the immediate subdirectories of `dir`, sorted by name.
/// A missing directory means nothing is installed.
pub async fn installed_buildpacks(dir: &Path) -> MasonResult<Vec<Buildpack>> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(MasonError::io(format!("reading {}", dir.display()), e)),
    };

    let mut buildpacks = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| MasonError::io(format!("reading {}", dir.display()), e))?
    {
        let path = entry.path();
        if path.is_dir() {
            buildpacks.push(Buildpack::new(path).await);
        }
    }

    buildpacks.sort();
    Ok(buildpacks)
}
