//! Compile output reformatting
//!
//! Buildpacks announce steps with `-----> ` and indent detail text by seven
//! spaces. Mason re-indents that output under its own banner as it streams.
//! Rewriting is a pure per-line function so it can be tested without
//! spawning anything; [`stream_reformatted`] feeds it from a live reader.

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Prefix buildpacks use for a build step
const STEP_MARKER: &str = "-----> ";
/// Seven-space indent buildpacks use for detail lines
const DETAIL_INDENT: &str = "       ";

/// Rewrite a single line of buildpack output (without its newline).
///
/// Rules run in order, each on the result of the previous one:
/// 1. `-----> ` becomes `  + `
/// 2. a leading seven-space indent becomes six spaces
/// 3. a bare `!` surrounded only by whitespace is dropped
/// 4. leading whitespace + `!` + whitespace becomes `  ! `
/// 5. a whitespace-only line is blanked
///
/// An empty result means the line should not be shown.
pub fn reformat_line(line: &str) -> String {
    let mut line = match line.strip_prefix(STEP_MARKER) {
        Some(rest) => format!("  + {}", rest),
        None => line.to_string(),
    };

    if let Some(rest) = line.strip_prefix(DETAIL_INDENT) {
        line = format!("      {}", rest);
    }

    if let Some(after_bang) = warning_body(&line) {
        line = if after_bang.trim().is_empty() {
            String::new()
        } else {
            format!("  ! {}", after_bang.trim_start())
        };
    }

    if line.trim().is_empty() {
        line.clear();
    }

    line
}

/// Text following a `<whitespace>!<whitespace>` prefix, if present.
///
/// Both whitespace runs must be non-empty; for a line that ends right after
/// the `!` the trailing run is the (stripped) line terminator.
fn warning_body(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    if trimmed.len() == line.len() {
        return None;
    }
    let after_bang = trimmed.strip_prefix('!')?;
    if after_bang.is_empty() || after_bang.starts_with(char::is_whitespace) {
        Some(after_bang)
    } else {
        None
    }
}

/// Read lines from `reader` as they arrive and hand each reformatted,
/// non-empty line to `emit` immediately.
///
/// Returns the number of lines read. Invalid UTF-8 is replaced rather than
/// treated as an error so a noisy buildpack can't abort its own build.
pub async fn stream_reformatted<R, F>(reader: R, mut emit: F) -> std::io::Result<usize>
where
    R: AsyncBufRead + Unpin,
    F: FnMut(&str),
{
    let mut reader = reader;
    let mut buf = Vec::new();
    let mut count = 0;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        count += 1;

        let text = String::from_utf8_lossy(&buf);
        let mut raw: &str = text.as_ref();
        raw = raw.strip_suffix('\n').unwrap_or(raw);
        raw = raw.strip_suffix('\r').unwrap_or(raw);

        let line = reformat_line(raw);
        if !line.is_empty() {
            emit(&line);
        }
    }

    Ok(count)
}
