//! Configuration: an optional TOML file overridden by command-line flags.
//!
//! ```toml
//! input = "openapi.json"
//! output = "src/app/api.ts"
//!
//! [generator]
//! rxjs_version = 6.5
//! generate_client_interfaces = true
//! ```
//!
//! Relative `input`/`output` paths in the file are taken relative to the file itself.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use ngapi_core::{Generated, GenerationPolicy};
use serde::Deserialize;
use tracing::{debug, warn};

/// Contents of a `--config` file.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    /// OpenAPI document, relative to the config file.
    pub input: Option<PathBuf>,
    /// Generated TypeScript file, relative to the config file.
    pub output: Option<PathBuf>,
    /// The `[generator]` table.
    pub generator: GenerationPolicy,
}

impl ConfigFile {
    /// Read and parse a config file, anchoring relative paths at its directory.
    pub fn load(path: &Path) -> Result<Self, String> {
        let text = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file {}: {e}", path.display()))?;
        let mut config: Self = toml::from_str(&text)
            .map_err(|e| format!("Invalid config file {}: {e}", path.display()))?;

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        config.input = config.input.map(|p| base.join(p));
        config.output = config.output.map(|p| base.join(p));
        Ok(config)
    }
}

/// Arguments shared by `generate` and `check`.
#[derive(Args, Debug, Clone, Default)]
pub struct GeneratorArgs {
    /// OpenAPI document (JSON or YAML)
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// TOML config file
    #[arg(short, long, value_name = "TOML")]
    pub config: Option<PathBuf>,

    /// Output file (stdout when omitted)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Target TypeScript version
    #[arg(long, value_name = "N")]
    pub typescript_version: Option<f64>,

    /// Target RxJS version
    #[arg(long, value_name = "N")]
    pub rxjs_version: Option<f64>,

    /// Emit declarations without `export`
    #[arg(long)]
    pub no_export_types: bool,

    /// Emit an interface per client
    #[arg(long)]
    pub client_interfaces: bool,

    /// Inline structural types instead of DTO classes
    #[arg(long)]
    pub no_dto_types: bool,

    /// Treat `default` responses as success
    #[arg(long)]
    pub default_success: bool,
}

/// Fully resolved settings of one run.
#[derive(Debug, Clone)]
pub struct Resolved {
    /// OpenAPI document to read.
    pub input: PathBuf,
    /// Destination file; `None` writes to stdout.
    pub output: Option<PathBuf>,
    /// Policy after applying flag overrides.
    pub policy: GenerationPolicy,
}

impl GeneratorArgs {
    /// Merge the config file (if any) with the flags; flags win.
    pub fn resolve(&self) -> Result<Resolved, String> {
        let config = match &self.config {
            Some(path) => ConfigFile::load(path)?,
            None => ConfigFile::default(),
        };

        let mut policy = config.generator;
        if let Some(version) = self.typescript_version {
            policy.typescript_version = version;
        }
        if let Some(version) = self.rxjs_version {
            policy.rxjs_version = version;
        }
        if self.no_export_types {
            policy.export_types = false;
        }
        if self.client_interfaces {
            policy.generate_client_interfaces = true;
        }
        if self.no_dto_types {
            policy.generate_dto_types = false;
        }
        if self.default_success {
            policy.default_response_is_success = true;
        }

        let input = self.input.clone().or(config.input).ok_or_else(|| {
            "No input document given (use --input or set `input` in the config file)".to_string()
        })?;
        let output = self.output.clone().or(config.output);

        debug!(input = %input.display(), ?policy, "Resolved settings");
        Ok(Resolved {
            input,
            output,
            policy,
        })
    }
}

impl Resolved {
    /// Read the input document and generate the client module. Warnings are logged.
    pub fn generate(&self) -> Result<Generated, String> {
        let text = fs::read_to_string(&self.input)
            .map_err(|e| format!("Failed to read {}: {e}", self.input.display()))?;
        let generated = ngapi_core::generate(&text, &self.policy)
            .map_err(|e| format!("{}: {e}", self.input.display()))?;
        for warning in &generated.warnings {
            warn!("{warning}");
        }
        Ok(generated)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use ngapi_core::ClientGrouping;
    use tempfile::TempDir;

    #[test]
    fn test_config_paths_are_relative_to_the_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ngapi.toml");
        fs::write(
            &path,
            "input = \"spec/openapi.yaml\"\noutput = \"out/api.ts\"\n\n[generator]\nrxjs_version = 6\nclient_grouping = \"first_tag\"\n",
        )
        .unwrap();

        let config = ConfigFile::load(&path).unwrap();
        assert_eq!(config.input, Some(dir.path().join("spec/openapi.yaml")));
        assert_eq!(config.output, Some(dir.path().join("out/api.ts")));
        assert!((config.generator.rxjs_version - 6.0).abs() < f64::EPSILON);
        assert_eq!(config.generator.client_grouping, ClientGrouping::FirstTag);
        assert!(config.generator.export_types);
    }

    #[test]
    fn test_flags_override_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ngapi.toml");
        fs::write(
            &path,
            "input = \"a.json\"\n\n[generator]\nrxjs_version = 6.5\nexport_types = true\n",
        )
        .unwrap();

        let args = GeneratorArgs {
            config: Some(path),
            input: Some(PathBuf::from("b.json")),
            rxjs_version: Some(7.0),
            no_export_types: true,
            ..GeneratorArgs::default()
        };
        let resolved = args.resolve().unwrap();
        assert_eq!(resolved.input, PathBuf::from("b.json"));
        assert!(resolved.output.is_none());
        assert!((resolved.policy.rxjs_version - 7.0).abs() < f64::EPSILON);
        assert!(!resolved.policy.export_types);
    }

    #[test]
    fn test_missing_input() {
        let err = GeneratorArgs::default().resolve().unwrap_err();
        assert!(err.contains("No input document"));
    }

    #[test]
    fn test_unknown_config_key() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ngapi.toml");
        fs::write(&path, "[generator]\nexportTypes = false\n").unwrap();
        let err = ConfigFile::load(&path).unwrap_err();
        assert!(err.starts_with("Invalid config file"));
    }
}
