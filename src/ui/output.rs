//! Rendering for Mason's own messages
//!
//! Every message has a [`Tone`]. Interactive terminals get cliclack
//! framing; everywhere else a message is one line with a bracketed tag so
//! CI logs stay greppable.

use super::context::UiContext;
use crate::buildpack::launch::{start_script_path, SKIPPED_PROCESSES};
use crate::buildpack::{Buildpack, Script};
use crate::procfile::Procfile;
use console::{style, Style};
use std::path::Path;

/// Severity of a status message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Ok,
    Info,
    Warn,
    Error,
}

impl Tone {
    fn tag(self) -> &'static str {
        match self {
            Self::Ok => "[OK]",
            Self::Info => "[INFO]",
            Self::Warn => "[WARN]",
            Self::Error => "[ERROR]",
        }
    }

    fn style(self) -> Style {
        match self {
            Self::Ok => Style::new().green(),
            Self::Info => Style::new().cyan(),
            Self::Warn => Style::new().yellow(),
            Self::Error => Style::new().red(),
        }
    }
}

/// Opening title of a command
pub fn banner(ctx: &UiContext, title: &str) {
    if ctx.use_fancy_output() {
        cliclack::intro(style(title).cyan().bold()).ok();
    } else {
        println!("{}", style(title).cyan().bold());
        println!();
    }
}

/// Closing line of a command
pub fn finish(ctx: &UiContext, tone: Tone, message: &str) {
    if ctx.use_fancy_output() {
        cliclack::outro(tone.style().bold().apply_to(message)).ok();
    } else {
        println!();
        println!("{} {}", tone.style().apply_to(tone.tag()), message);
    }
}

/// A status line, with an optional dimmed detail after it
pub fn note(ctx: &UiContext, tone: Tone, message: &str, detail: Option<&str>) {
    let text = match detail {
        Some(detail) if ctx.use_fancy_output() => format!("{} ({})", message, style(detail).dim()),
        Some(detail) => format!("{} ({})", message, detail),
        None => message.to_string(),
    };

    if ctx.use_fancy_output() {
        let _ = match tone {
            Tone::Ok => cliclack::log::success(text),
            Tone::Info => cliclack::log::info(text),
            Tone::Warn => cliclack::log::warning(text),
            Tone::Error => cliclack::log::error(text),
        };
    } else {
        println!("  {} {}", tone.style().apply_to(tone.tag()), text);
    }
}

/// One `(name, "command (launcher)")` row per process type of a compiled
/// working copy
pub fn process_rows(working_copy: &Path, procfile: &Procfile) -> Vec<(String, String)> {
    procfile
        .iter()
        .map(|process| {
            let launcher = if SKIPPED_PROCESSES.contains(&process.name.as_str()) {
                "no start script".to_string()
            } else {
                start_script_path(working_copy, &process.name)
                    .display()
                    .to_string()
            };
            (
                process.name.clone(),
                format!("{} ({})", process.command, launcher),
            )
        })
        .collect()
}

/// Process types and their launchers after a successful compile
pub fn compile_summary(ctx: &UiContext, working_copy: &Path, procfile: &Procfile) {
    println!();
    if ctx.use_fancy_output() {
        cliclack::log::info(style("Process types").bold()).ok();
    } else {
        println!("{}", style("Process types").bold());
    }

    if procfile.is_empty() {
        note(ctx, Tone::Warn, "No process types declared", None);
    }
    for (name, launch) in process_rows(working_copy, procfile) {
        field(ctx, &name, &launch);
    }

    finish(
        ctx,
        Tone::Ok,
        &format!("Compiled to {}", working_copy.display()),
    );
}

/// Identity and contract-script presence of one buildpack
pub fn buildpack_details(ctx: &UiContext, buildpack: &Buildpack) {
    banner(ctx, buildpack.name());

    field(ctx, "Directory", &buildpack.dir().display().to_string());
    field(
        ctx,
        "URL",
        if buildpack.url().is_empty() {
            "(none)"
        } else {
            buildpack.url()
        },
    );

    for script in Script::all() {
        let tone = if buildpack.scripts().has(*script) {
            Tone::Ok
        } else {
            Tone::Warn
        };
        let state = if tone == Tone::Ok { "present" } else { "missing" };
        if ctx.use_fancy_output() {
            println!(
                "  {}: {}",
                style(script).dim(),
                tone.style().apply_to(state)
            );
        } else {
            println!("  {} {}: {}", tone.tag(), script, state);
        }
    }
}

/// NAME/URL table of installed buildpacks with a count footer
pub fn buildpack_table(buildpacks: &[Buildpack]) -> String {
    let mut table = format!(
        "{:<30} {:<50}\n{}\n",
        style("NAME").bold(),
        style("URL").bold(),
        "-".repeat(81)
    );
    for buildpack in buildpacks {
        table.push_str(&format!("{:<30} {:<50}\n", buildpack.name(), buildpack.url()));
    }
    table.push_str(&format!("\n{} buildpack(s)\n", buildpacks.len()));
    table
}

fn field(ctx: &UiContext, key: &str, value: &str) {
    if ctx.use_fancy_output() {
        println!("  {}: {}", style(key).dim(), value);
    } else {
        println!("  {}: {}", key, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn rows_name_launcher_or_skip() {
        let procfile: Procfile = [("web", "./start"), ("console", "irb")]
            .into_iter()
            .collect();

        let rows = process_rows(Path::new("/tmp/wc"), &procfile);

        assert_eq!(
            rows,
            vec![
                (
                    "web".to_string(),
                    "./start (/tmp/wc/bin/run-web.sh)".to_string()
                ),
                ("console".to_string(), "irb (no start script)".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn table_lists_every_buildpack() {
        let temp = TempDir::new().unwrap();
        let mut buildpacks = Vec::new();
        for name in ["go", "ruby"] {
            let dir = temp.path().join(name);
            std::fs::create_dir(&dir).unwrap();
            buildpacks.push(Buildpack::new(&dir).await);
        }

        let table = buildpack_table(&buildpacks);

        assert!(table.lines().any(|l| l.starts_with("go ")));
        assert!(table.lines().any(|l| l.starts_with("ruby ")));
        assert!(table.ends_with("\n2 buildpack(s)\n"));
    }

    #[test]
    fn plain_output_does_not_panic() {
        let ctx = UiContext::non_interactive();
        banner(&ctx, "Compiling");
        note(&ctx, Tone::Warn, "Config already exists", Some("use --force"));
        note(&ctx, Tone::Ok, "Set", None);
        compile_summary(&ctx, Path::new("/tmp/wc"), &Procfile::new());
        finish(&ctx, Tone::Error, "Compile failed");
    }
}
