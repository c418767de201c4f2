//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Mason - build applications with buildpacks
///
/// Detects whether a buildpack applies to an application, compiles the
/// application into a runnable working copy, and writes its Procfile and
/// start scripts.
#[derive(Parser, Debug)]
#[command(name = "mason")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "MASON_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check whether a buildpack applies to an application
    Detect(DetectArgs),

    /// Compile an application with a buildpack
    Compile(CompileArgs),

    /// Show a buildpack's identity
    Info(InfoArgs),

    /// List installed buildpacks
    Buildpacks(BuildpacksArgs),

    /// Show or edit configuration
    Config(ConfigArgs),
}

/// Arguments for the detect command
#[derive(Parser, Debug)]
pub struct DetectArgs {
    /// Buildpack directory or installed buildpack name
    pub buildpack: String,

    /// Application directory
    pub app: PathBuf,
}

/// Arguments for the compile command
#[derive(Parser, Debug)]
pub struct CompileArgs {
    /// Buildpack directory or installed buildpack name
    pub buildpack: String,

    /// Application directory
    pub app: PathBuf,

    /// Cache directory passed to bin/compile (default: <app>/.git/cache)
    #[arg(long)]
    pub cache: Option<PathBuf>,

    /// Environment file for the build (reserved)
    #[arg(long)]
    pub env_file: Option<PathBuf>,
}

/// Arguments for the info command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Buildpack directory or installed buildpack name
    pub buildpack: String,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the buildpacks command
#[derive(Parser, Debug)]
pub struct BuildpacksArgs {
    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., buildpacks.dir)
        key: String,
        /// Value to set
        value: String,
    },
}

/// Output format for listing commands
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text (one per line)
    Plain,
}
