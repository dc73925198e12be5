use std::path::Path;

use super::{types::Config, AuthMethod, ConfigError};

/// Validate configuration.
///
/// Any error returned here is fatal: the service refuses to start with
/// missing credentials or a root folder that does not exist.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.auth.method == AuthMethod::ApiKey
        && config.auth.api_key.as_deref().map_or(true, str::is_empty)
    {
        return Err(ConfigError::ValidationError(
            "auth.api_key must be set when auth.method = \"api_key\"".to_string(),
        ));
    }

    if config.radarr.is_none() && config.sonarr.is_none() {
        return Err(ConfigError::ValidationError(
            "at least one of [radarr] or [sonarr] must be configured".to_string(),
        ));
    }

    if let Some(radarr) = &config.radarr {
        validate_service("radarr", &radarr.api_key, &radarr.root_folder)?;
    }

    if let Some(sonarr) = &config.sonarr {
        validate_service("sonarr", &sonarr.api_key, &sonarr.root_folder)?;
    }

    Ok(())
}

fn validate_service(name: &str, api_key: &str, root_folder: &Path) -> Result<(), ConfigError> {
    if api_key.trim().is_empty() {
        return Err(ConfigError::ValidationError(format!(
            "{}.api_key is not set",
            name
        )));
    }

    if !root_folder.is_dir() {
        return Err(ConfigError::ValidationError(format!(
            "{}.root_folder does not exist: {}",
            name,
            root_folder.display()
        )));
    }

    Ok(())
}
