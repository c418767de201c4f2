//! Info command - show a buildpack's identity

use super::resolve_buildpack;
use crate::cli::args::{InfoArgs, OutputFormat};
use crate::config::Config;
use crate::error::MasonResult;
use crate::ui::{self, UiContext};

/// Execute the info command
pub async fn execute(args: InfoArgs, config: &Config) -> MasonResult<()> {
    let buildpack = resolve_buildpack(&args.buildpack, config).await?;

    match args.format {
        OutputFormat::Table => ui::buildpack_details(&UiContext::detect(), &buildpack),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&buildpack)?),
        OutputFormat::Plain => println!("{}", buildpack.name()),
    }

    Ok(())
}
