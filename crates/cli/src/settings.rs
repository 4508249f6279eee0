//! CLI configuration: optional TOML file, then `DIPLOMA_*` environment
//! variables, then command-line overrides.

use anyhow::{Context, Result};
use config::{Config, Environment, File as ConfigFile};
use diploma_registry::Identity;
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG_FILE: &str = "diploma.toml";
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_LOG_FORMAT: &str = "pretty";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    /// Registry snapshot file
    pub state_path: PathBuf,
    pub log_level: String,
    /// `pretty` or `compact`
    pub log_format: String,
    /// Identity used for admin-gated commands
    pub caller: Option<Identity>,
}

impl CliConfig {
    pub fn load(config_path_override: Option<&Path>) -> Result<Self> {
        let resolved_path = match config_path_override {
            Some(path) => {
                if !path.exists() {
                    anyhow::bail!(
                        "Configuration file {} not found (specified via --config)",
                        path.display()
                    );
                }
                Some(path.to_path_buf())
            }
            None => {
                let path = PathBuf::from(DEFAULT_CONFIG_FILE);
                path.exists().then_some(path)
            }
        };

        let mut builder = Config::builder();
        if let Some(path) = &resolved_path {
            builder = builder.add_source(ConfigFile::from(path.as_path()));
        }
        builder = builder.add_source(Environment::with_prefix("DIPLOMA"));
        let config = builder.build()?;

        Self::from_config(&config)
    }

    fn from_config(config: &Config) -> Result<Self> {
        let state_path = get_string_value(config, "state_path")
            .map(PathBuf::from)
            .unwrap_or_else(default_state_path);

        let log_level =
            get_string_value(config, "log_level").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());
        let log_format = get_string_value(config, "log_format")
            .unwrap_or_else(|| DEFAULT_LOG_FORMAT.to_string());

        let caller = get_string_value(config, "caller")
            .map(|value| {
                value
                    .parse::<Identity>()
                    .with_context(|| format!("invalid caller identity '{value}'"))
            })
            .transpose()?;

        Ok(Self {
            state_path,
            log_level,
            log_format,
            caller,
        })
    }
}

fn get_string_value(config: &Config, key: &str) -> Option<String> {
    config
        .get_string(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn default_state_path() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("diploma-registry"))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("registry.json")
}
