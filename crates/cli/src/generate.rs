use std::fs;

use clap::Args;
use tracing::info;

use crate::config::GeneratorArgs;
use crate::run_command;

/// Arguments of `ngapi generate`.
#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Input, output and policy options shared with `check`.
    #[command(flatten)]
    pub generator: GeneratorArgs,
}

/// Generate the client and write it out; returns the process exit code.
pub fn run(args: &GenerateArgs) -> i32 {
    run_command(|| run_inner(args))
}

fn run_inner(args: &GenerateArgs) -> Result<(), String> {
    let resolved = args.generator.resolve()?;
    let generated = resolved.generate()?;

    let Some(output) = &resolved.output else {
        print!("{}", generated.source);
        return Ok(());
    };
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create {}: {e}", parent.display()))?;
    }
    fs::write(output, &generated.source)
        .map_err(|e| format!("Failed to write {}: {e}", output.display()))?;
    info!(
        output = %output.display(),
        warnings = generated.warnings.len(),
        "Generated client"
    );
    Ok(())
}
