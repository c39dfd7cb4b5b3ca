//! Configuration loading from disk and the process environment.

use std::fs;
use std::path::Path;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Env { var: &'static str, value: String },
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Env { var, value } => {
                write!(f, "Invalid value {:?} for environment variable {}", value, var)
            }
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Parse configuration from TOML text.
pub fn parse_config(content: &str) -> Result<GatewayConfig, ConfigError> {
    toml::from_str(content).map_err(ConfigError::Parse)
}

/// Overlay environment variables onto `config`.
///
/// | Variable | Field |
/// |---|---|
/// | `PORT` | `listener.port` |
/// | `INVOCATION_TIMEOUT_MS` | `timeouts.invocation_ms` |
/// | `BACKEND_INVOKE_URL` | `backend.invoke_url` |
/// | `ENABLE_S3_OBJECT_LAMBDA` | `backend.object_lambda` (`Yes` enables) |
/// | `LOG_LEVEL` | `observability.log_level` |
pub fn apply_env_overrides<F>(config: &mut GatewayConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup("PORT") {
        config.listener.port = value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Env { var: "PORT", value })?;
    }

    if let Some(value) = lookup("INVOCATION_TIMEOUT_MS") {
        config.timeouts.invocation_ms = value.trim().parse().map_err(|_| ConfigError::Env {
            var: "INVOCATION_TIMEOUT_MS",
            value,
        })?;
    }

    if let Some(value) = lookup("BACKEND_INVOKE_URL") {
        config.backend.invoke_url = value;
    }

    if let Some(value) = lookup("ENABLE_S3_OBJECT_LAMBDA") {
        config.backend.object_lambda = value.trim() == "Yes";
    }

    if let Some(value) = lookup("LOG_LEVEL") {
        config.observability.log_level = value;
    }

    Ok(())
}

/// Load, overlay the environment, and validate.
///
/// Without a path the built-in defaults are the starting point.
pub fn load_config(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
            parse_config(&content)?
        }
        None => GatewayConfig::default(),
    };

    apply_env_overrides(&mut config, |var| std::env::var(var).ok())?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}
