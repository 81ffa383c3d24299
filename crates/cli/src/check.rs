use std::fs;
use std::io::ErrorKind;

use clap::Args;
use similar::{ChangeTag, TextDiff};
use tracing::info;

use crate::config::GeneratorArgs;
use crate::run_command;

/// Arguments of `ngapi check`.
#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    /// Input, output and policy options shared with `generate`.
    #[command(flatten)]
    pub generator: GeneratorArgs,
}

/// Compare the output file with a fresh generation; returns the process exit code.
pub fn run(args: &CheckArgs) -> i32 {
    run_command(|| run_inner(args))
}

fn run_inner(args: &CheckArgs) -> Result<(), String> {
    let resolved = args.generator.resolve()?;
    let output = resolved
        .output
        .clone()
        .ok_or_else(|| "`check` needs an output file (use --output or set `output`)".to_string())?;
    let generated = resolved.generate()?;

    let existing = match fs::read_to_string(&output) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => String::new(),
        Err(e) => return Err(format!("Failed to read {}: {e}", output.display())),
    };

    let label = output.display().to_string();
    match render_diff(&label, &existing, &generated.source) {
        None => {
            info!(output = %label, "Client is up to date");
            Ok(())
        }
        Some(diff) => {
            print!("{diff}");
            Err(format!("{label} is out of date; run `ngapi generate` to update it"))
        }
    }
}

/// Unified diff of `current` against `generated`, or `None` when they are equal.
fn render_diff(label: &str, current: &str, generated: &str) -> Option<String> {
    if current == generated {
        return None;
    }

    let diff = TextDiff::from_lines(current, generated);
    let mut output = String::new();
    output.push_str(&format!("--- {label} (on disk)\n"));
    output.push_str(&format!("+++ {label} (generated)\n"));

    for group in diff.grouped_ops(3) {
        let (Some(first), Some(last)) = (group.first(), group.last()) else {
            continue;
        };
        let old = first.old_range().start..last.old_range().end;
        let new = first.new_range().start..last.new_range().end;
        output.push_str(&format!(
            "@@ -{},{} +{},{} @@\n",
            old.start + 1,
            old.len(),
            new.start + 1,
            new.len()
        ));
        for op in &group {
            for change in diff.iter_changes(op) {
                let sign = match change.tag() {
                    ChangeTag::Delete => "-",
                    ChangeTag::Insert => "+",
                    ChangeTag::Equal => " ",
                };
                output.push_str(sign);
                output.push_str(change.value());
                if change.missing_newline() {
                    output.push('\n');
                }
            }
        }
    }

    Some(output)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_texts_have_no_diff() {
        assert!(render_diff("api.ts", "a\nb\n", "a\nb\n").is_none());
    }

    #[test]
    fn test_diff_marks_changed_lines() {
        let diff = render_diff("api.ts", "a\nb\nc\n", "a\nB\nc\n").unwrap();
        assert!(diff.starts_with("--- api.ts (on disk)\n+++ api.ts (generated)\n"));
        assert!(diff.contains("@@ -1,3 +1,3 @@\n"));
        assert!(diff.contains("-b\n+B\n"));
        assert!(diff.contains(" a\n"));
    }

    #[test]
    fn test_missing_trailing_newline() {
        let diff = render_diff("api.ts", "a", "a\n").unwrap();
        assert!(diff.contains("-a\n+a\n"));
    }
}
