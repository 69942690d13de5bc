//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::PreviewConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<PreviewConfig, ConfigError> {
    resolve_config(Some(path), ConfigOverrides::default())
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub bind_address: Option<String>,
    pub upstream: Option<String>,
}

/// Load `path` (or defaults), apply `overrides`, then validate the result.
pub fn resolve_config(
    path: Option<&Path>,
    overrides: ConfigOverrides,
) -> Result<PreviewConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str::<PreviewConfig>(&content)?
        }
        None => PreviewConfig::default(),
    };

    if let Some(bind) = overrides.bind_address {
        config.listener.bind_address = bind;
    }
    if let Some(upstream) = overrides.upstream {
        config.upstream.base_url = Some(upstream);
    }

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}
