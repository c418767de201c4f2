//! UI helpers for consistent CLI output
//!
//! Uses `cliclack` for styled output in an interactive terminal and falls
//! back to plain, prefix-tagged lines in CI or when piped.
//!
//! Buildpack output streamed during compile bypasses these helpers and is
//! printed verbatim after reformatting.

mod context;
mod output;

pub use context::UiContext;
pub use output::{
    banner, buildpack_details, buildpack_table, compile_summary, finish, note, process_rows, Tone,
};
