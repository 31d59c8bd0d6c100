//! Compiler options and the `moc.toml` configuration file.
//!
//! Options come from three layers: built-in defaults, an optional TOML file
//! and command-line flags. The engine only ever sees the merged
//! [`MocOptions`]; the CLI applies its flags on top of what
//! [`MocConfig::into_options`] returns.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// A `-M` argument without `=`
    #[error("Invalid metadata argument '{0}': expected key=value")]
    InvalidMetaArgument(String),
}

/// Options for one compiler run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MocOptions {
    /// Directories searched for `Q_PLUGIN_METADATA` files after the
    /// directory of the current input
    pub include_paths: Vec<PathBuf>,

    /// Extra plugin metadata, `-M key=value`, values in argument order
    pub meta_args: BTreeMap<String, Vec<String>>,

    /// Name used in the generated `#include`; defaults to the input name
    pub include_name: Option<String>,

    /// Do not emit the `#include` of the input file
    pub no_include: bool,

    pub no_warnings: bool,
    pub no_notes: bool,

    /// Also produce the JSON side document
    pub output_json: bool,
}

impl MocOptions {
    /// Add one `key=value` metadata argument.
    pub fn add_meta_arg(&mut self, arg: &str) -> Result<(), ConfigError> {
        let (key, value) = arg
            .split_once('=')
            .ok_or_else(|| ConfigError::InvalidMetaArgument(arg.to_string()))?;
        if key.is_empty() {
            return Err(ConfigError::InvalidMetaArgument(arg.to_string()));
        }
        self.meta_args
            .entry(key.to_string())
            .or_default()
            .push(value.to_string());
        Ok(())
    }
}

/// Contents of a `moc.toml` file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MocConfig {
    #[serde(default)]
    pub moc: MocSection,

    /// Extra plugin metadata keys, each mapped to its string values
    #[serde(default)]
    pub metadata: BTreeMap<String, Vec<String>>,
}

/// The `[moc]` table.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct MocSection {
    #[serde(default)]
    pub include_paths: Vec<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_name: Option<String>,

    #[serde(default)]
    pub no_include: bool,

    #[serde(default)]
    pub no_warnings: bool,

    #[serde(default)]
    pub no_notes: bool,

    #[serde(default)]
    pub output_json: bool,
}

impl MocConfig {
    /// Load configuration from a file.
    ///
    /// Relative include paths are resolved against the file's directory.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_str(&content)?;
        if let Some(base) = path.parent() {
            for dir in &mut config.moc.include_paths {
                if dir.is_relative() {
                    *dir = base.join(&*dir);
                }
            }
        }
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn into_options(self) -> MocOptions {
        MocOptions {
            include_paths: self.moc.include_paths,
            meta_args: self.metadata,
            include_name: self.moc.include_name,
            no_include: self.moc.no_include,
            no_warnings: self.moc.no_warnings,
            no_notes: self.moc.no_notes,
            output_json: self.moc.output_json,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let toml = r#"
            [moc]
            include-paths = ["include", "/opt/qt/include"]
            no-notes = true
            output-json = true

            [metadata]
            platform = ["linux", "wayland"]
        "#;
        let options = MocConfig::from_str(toml).unwrap().into_options();
        assert_eq!(options.include_paths.len(), 2);
        assert!(options.no_notes);
        assert!(!options.no_warnings);
        assert!(options.output_json);
        assert_eq!(options.meta_args["platform"], vec!["linux", "wayland"]);
    }

    #[test]
    fn test_empty_config_is_default() {
        let config = MocConfig::from_str("").unwrap();
        assert_eq!(config, MocConfig::default());
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let err = MocConfig::from_str("[moc]\nno-notes = \"yes\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_relative_include_paths_follow_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("moc.toml");
        std::fs::write(&path, "[moc]\ninclude-paths = [\"inc\"]\n").unwrap();
        let config = MocConfig::from_file(&path).unwrap();
        assert_eq!(config.moc.include_paths, vec![dir.path().join("inc")]);
    }

    #[test]
    fn test_meta_args_accumulate() {
        let mut options = MocOptions::default();
        options.add_meta_arg("uri=org.example").unwrap();
        options.add_meta_arg("uri=org.other").unwrap();
        options.add_meta_arg("empty=").unwrap();
        assert_eq!(options.meta_args["uri"], vec!["org.example", "org.other"]);
        assert_eq!(options.meta_args["empty"], vec![""]);
        assert!(options.add_meta_arg("novalue").is_err());
        assert!(options.add_meta_arg("=x").is_err());
    }
}
