use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{export::ExportFormat, model::Variable};

/// User defaults for the form, stored on disk as TOML.
///
/// Example:
/// ```toml
/// output_dir = "/home/me/exports"
/// default_format = "json"
/// default_variables = ["temperature", "rainfall"]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// Directory exports are written to; current directory when unset.
    pub output_dir: Option<PathBuf>,

    /// Format picked when none is given on the command line.
    pub default_format: Option<String>,

    /// Variables pre-selected in the interactive form.
    #[serde(default)]
    pub default_variables: Vec<String>,
}

impl Config {
    /// Return the default format as a strongly-typed ExportFormat, if set.
    pub fn default_format(&self) -> Result<Option<ExportFormat>> {
        self.default_format
            .as_deref()
            .map(|s| {
                s.parse::<ExportFormat>().map_err(|err| {
                    anyhow!(
                        "{err}\n\
                         Hint: fix `default_format` with `weather-query configure`."
                    )
                })
            })
            .transpose()
    }

    pub fn set_default_format(&mut self, format: ExportFormat) {
        self.default_format = Some(format.as_str().to_string());
    }

    /// Parse the stored default variables, keeping their order.
    pub fn default_variables(&self) -> Result<Vec<Variable>> {
        self.default_variables
            .iter()
            .map(|s| {
                s.parse::<Variable>()
                    .with_context(|| format!("Invalid entry in `default_variables`: '{s}'"))
            })
            .collect()
    }

    pub fn set_default_variables(&mut self, variables: &[Variable]) {
        self.default_variables = variables.iter().map(|v| v.as_str().to_string()).collect();
    }

    /// Directory to write exports into.
    pub fn output_dir_or_current(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-query", "weather-query")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_format_is_none_when_not_set() {
        let cfg = Config::default();
        assert_eq!(cfg.default_format().unwrap(), None);
    }

    #[test]
    fn default_format_errors_on_unknown_value() {
        let cfg = Config { default_format: Some("xlsx".into()), ..Config::default() };
        let err = cfg.default_format().unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("Unknown export format 'xlsx'"));
        assert!(msg.contains("Hint: fix `default_format`"));
    }

    #[test]
    fn set_default_format_roundtrip() {
        let mut cfg = Config::default();
        cfg.set_default_format(ExportFormat::Json);
        assert_eq!(cfg.default_format().unwrap(), Some(ExportFormat::Json));
    }

    #[test]
    fn default_variables_keep_order() {
        let mut cfg = Config::default();
        cfg.set_default_variables(&[Variable::CloudCover, Variable::Temperature]);

        assert_eq!(cfg.default_variables, vec!["Cloud Cover", "Temperature"]);
        assert_eq!(
            cfg.default_variables().unwrap(),
            vec![Variable::CloudCover, Variable::Temperature]
        );
    }

    #[test]
    fn default_variables_reject_unknown_entry() {
        let cfg = Config { default_variables: vec!["fog".into()], ..Config::default() };
        let err = cfg.default_variables().unwrap_err();
        assert!(err.to_string().contains("Invalid entry in `default_variables`: 'fog'"));
    }

    #[test]
    fn output_dir_falls_back_to_current() {
        assert_eq!(Config::default().output_dir_or_current(), PathBuf::from("."));
    }

    #[test]
    fn load_missing_file_returns_default() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn save_then_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config { output_dir: Some(dir.path().to_path_buf()), ..Config::default() };
        cfg.set_default_format(ExportFormat::Csv);
        cfg.set_default_variables(&[Variable::Rainfall]);
        cfg.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), cfg);
    }

    #[test]
    fn load_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "default_variables = 3").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
