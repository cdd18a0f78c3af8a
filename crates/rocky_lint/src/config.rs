//! Configuration file loading for rocky-lint.
//!
//! Reads `rocky-lint.config.json` from the current working directory, or the
//! file given with `--config`.

use rocky_canon::{Style, Tag};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = "rocky-lint.config.json";

/// Top-level rocky-lint configuration.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct RockyLintConfig {
    /// JSON Schema reference (for editor autocompletion).
    #[serde(rename = "$schema", default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Check configuration.
    #[serde(default)]
    pub check: CheckConfig,
}

/// Defaults for the check run. Command line flags take precedence.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckConfig {
    /// Declaration files used instead of the bundled one.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub definitions: Vec<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_warnings: Option<usize>,

    #[serde(default)]
    pub pretty: bool,

    /// Drop "property does not exist" warnings on object-literal types.
    #[serde(default)]
    pub suppress_object_literal_property: bool,

    /// node executable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node: Option<PathBuf>,

    /// typescript package directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typescript: Option<PathBuf>,
}

impl RockyLintConfig {
    /// Make relative paths relative to `base` instead of the process cwd.
    fn resolve_paths(mut self, base: &Path) -> Self {
        let resolve = |path: PathBuf| {
            if path.is_relative() {
                base.join(path)
            } else {
                path
            }
        };
        self.check.definitions = self
            .check
            .definitions
            .into_iter()
            .map(resolve)
            .collect();
        self.check.node = self.check.node.map(resolve);
        self.check.typescript = self.check.typescript.map(resolve);
        self
    }
}

/// Load the config from `explicit`, or `rocky-lint.config.json` in `dir`.
///
/// A missing default file yields the default config. A file that cannot be
/// read or parsed is reported on stderr, painted with `style`, and ignored.
pub fn load_config(explicit: Option<&Path>, dir: &Path, style: &Style) -> RockyLintConfig {
    let config_path = match explicit {
        Some(path) => dir.join(path),
        None => dir.join(CONFIG_FILE_NAME),
    };

    if explicit.is_none() && !config_path.exists() {
        return RockyLintConfig::default();
    }

    let base = config_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| dir.to_path_buf());

    match std::fs::read_to_string(&config_path) {
        Ok(content) => match serde_json::from_str::<RockyLintConfig>(&content) {
            Ok(config) => {
                tracing::info!("config: {}", config_path.display());
                config.resolve_paths(&base)
            }
            Err(e) => {
                eprintln!(
                    "{} Failed to parse {}: {}",
                    style.paint(Tag::Warning, "Warning:"),
                    config_path.display(),
                    e
                );
                RockyLintConfig::default()
            }
        },
        Err(e) => {
            eprintln!(
                "{} Failed to read {}: {}",
                style.paint(Tag::Warning, "Warning:"),
                config_path.display(),
                e
            );
            RockyLintConfig::default()
        }
    }
}
