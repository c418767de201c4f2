//! Mason - buildpack runner
//!
//! Runs Heroku-style buildpacks (`bin/detect`, `bin/compile`,
//! `bin/release`) against an application directory and assembles the
//! result into a working copy with a Procfile and per-process start scripts.

pub mod buildpack;
pub mod cli;
pub mod config;
pub mod error;
pub mod procfile;
pub mod ui;

pub use buildpack::{Buildpack, CompileOptions, ReleaseConfig};
pub use error::{MasonError, MasonResult};
pub use procfile::Procfile;
