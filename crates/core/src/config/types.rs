use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub auth: AuthConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub audit: AuditConfig,
    #[serde(default)]
    pub radarr: Option<RadarrConfig>,
    #[serde(default)]
    pub sonarr: Option<SonarrConfig>,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    8194
}

/// Authentication configuration for the HTTP surface
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    pub method: AuthMethod,
    /// Shared key expected from callers when `method = "api_key"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    None,
    ApiKey,
}

/// Console log output settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Audit log configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuditConfig {
    /// When false, engines run without emitting audit events
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub backend: AuditBackend,
    /// Location of the audit file or database.
    /// Defaults to `~/.darrlink/audit.jsonl` (or `audit.db` for sqlite).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            backend: AuditBackend::default(),
            path: None,
        }
    }
}

impl AuditConfig {
    /// Resolve the on-disk location of the audit log.
    pub fn resolved_path(&self) -> PathBuf {
        if let Some(path) = &self.path {
            return path.clone();
        }
        let file_name = match self.backend {
            AuditBackend::Jsonl => "audit.jsonl",
            AuditBackend::Sqlite => "audit.db",
        };
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".darrlink")
            .join(file_name)
    }
}

/// Available audit storage backends
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuditBackend {
    #[default]
    Jsonl,
    Sqlite,
}

/// How a bulk request is fanned out to the reconciliation engine
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DispatchMode {
    /// One title at a time; at most one create in flight per batch.
    #[default]
    Sequential,
    /// All titles started together; results still come back in input order.
    Concurrent,
}

/// Radarr (movie domain) configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RadarrConfig {
    /// Radarr server URL (e.g., "http://localhost:7878")
    #[serde(default = "default_radarr_url")]
    pub url: String,
    pub api_key: String,
    #[serde(default = "default_profile_id")]
    pub quality_profile_id: u32,
    /// Root folder new movies are placed under
    pub root_folder: PathBuf,
    /// Fire a one-shot search for movies that exist but have no file
    #[serde(default = "default_true")]
    pub force_search_on_existing: bool,
    #[serde(default)]
    pub dispatch: DispatchMode,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

/// Sonarr (series domain) configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SonarrConfig {
    /// Sonarr server URL (e.g., "http://localhost:8989")
    #[serde(default = "default_sonarr_url")]
    pub url: String,
    pub api_key: String,
    #[serde(default = "default_profile_id")]
    pub quality_profile_id: u32,
    #[serde(default = "default_profile_id")]
    pub language_profile_id: u32,
    /// Root folder new series are placed under
    pub root_folder: PathBuf,
    #[serde(default)]
    pub dispatch: DispatchMode,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

fn default_radarr_url() -> String {
    "http://localhost:7878".to_string()
}

fn default_sonarr_url() -> String {
    "http://localhost:8989".to_string()
}

fn default_profile_id() -> u32 {
    1
}

fn default_timeout() -> u32 {
    30
}

fn default_true() -> bool {
    true
}

/// Append the v3 API prefix to a service URL unless it is already there.
pub fn normalize_api_url(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    if trimmed.ends_with("/api/v3") {
        trimmed.to_string()
    } else {
        format!("{}/api/v3", trimmed)
    }
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub auth: SanitizedAuthConfig,
    pub server: ServerConfig,
    pub audit: AuditConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radarr: Option<SanitizedServiceConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sonarr: Option<SanitizedServiceConfig>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedAuthConfig {
    pub method: String,
}

/// Service config with the API key hidden
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedServiceConfig {
    pub url: String,
    pub api_key_configured: bool,
    pub quality_profile_id: u32,
    pub root_folder: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub force_search_on_existing: Option<bool>,
    pub dispatch: DispatchMode,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            auth: SanitizedAuthConfig {
                method: match config.auth.method {
                    AuthMethod::None => "none".to_string(),
                    AuthMethod::ApiKey => "api_key".to_string(),
                },
            },
            server: config.server.clone(),
            audit: config.audit.clone(),
            radarr: config.radarr.as_ref().map(|r| SanitizedServiceConfig {
                url: normalize_api_url(&r.url),
                api_key_configured: !r.api_key.is_empty(),
                quality_profile_id: r.quality_profile_id,
                root_folder: r.root_folder.clone(),
                force_search_on_existing: Some(r.force_search_on_existing),
                dispatch: r.dispatch,
            }),
            sonarr: config.sonarr.as_ref().map(|s| SanitizedServiceConfig {
                url: normalize_api_url(&s.url),
                api_key_configured: !s.api_key.is_empty(),
                quality_profile_id: s.quality_profile_id,
                root_folder: s.root_folder.clone(),
                force_search_on_existing: None,
                dispatch: s.dispatch,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_minimal_config() {
        let toml = r#"
[auth]
method = "none"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.auth.method, AuthMethod::None);
        assert_eq!(config.server.port, 8194);
        assert_eq!(config.server.host.to_string(), "0.0.0.0");
        assert!(config.audit.enabled);
        assert_eq!(config.audit.backend, AuditBackend::Jsonl);
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert!(config.radarr.is_none());
        assert!(config.sonarr.is_none());
    }

    #[test]
    fn test_deserialize_missing_auth_fails() {
        let toml = r#"
[server]
port = 8080
"#;
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_radarr_defaults() {
        let toml = r#"
[auth]
method = "none"

[radarr]
api_key = "abc"
root_folder = "/mnt/Movies"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let radarr = config.radarr.unwrap();
        assert_eq!(radarr.url, "http://localhost:7878");
        assert_eq!(radarr.quality_profile_id, 1);
        assert!(radarr.force_search_on_existing);
        assert_eq!(radarr.dispatch, DispatchMode::Sequential);
        assert_eq!(radarr.timeout_secs, 30);
    }

    #[test]
    fn test_deserialize_sonarr_with_concurrent_dispatch() {
        let toml = r#"
[auth]
method = "api_key"
api_key = "proxy-key"

[sonarr]
url = "http://nas:8989/sonarr"
api_key = "def"
quality_profile_id = 3
language_profile_id = 2
root_folder = "/mnt/TV_Shows"
dispatch = "concurrent"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.auth.api_key.as_deref(), Some("proxy-key"));
        let sonarr = config.sonarr.unwrap();
        assert_eq!(sonarr.quality_profile_id, 3);
        assert_eq!(sonarr.language_profile_id, 2);
        assert_eq!(sonarr.dispatch, DispatchMode::Concurrent);
    }

    #[test]
    fn test_normalize_api_url() {
        assert_eq!(
            normalize_api_url("http://localhost:7878"),
            "http://localhost:7878/api/v3"
        );
        assert_eq!(
            normalize_api_url("http://localhost:7878/"),
            "http://localhost:7878/api/v3"
        );
        assert_eq!(
            normalize_api_url("http://nas/radarr/api/v3/"),
            "http://nas/radarr/api/v3"
        );
    }

    #[test]
    fn test_audit_resolved_path_explicit() {
        let audit = AuditConfig {
            enabled: true,
            backend: AuditBackend::Sqlite,
            path: Some(PathBuf::from("/var/lib/darrlink/audit.db")),
        };
        assert_eq!(
            audit.resolved_path(),
            PathBuf::from("/var/lib/darrlink/audit.db")
        );
    }

    #[test]
    fn test_audit_resolved_path_default_file_name() {
        let audit = AuditConfig {
            backend: AuditBackend::Sqlite,
            ..Default::default()
        };
        let path = audit.resolved_path();
        assert!(path.ends_with(".darrlink/audit.db"));
    }

    #[test]
    fn test_sanitized_config_hides_keys() {
        let toml = r#"
[auth]
method = "api_key"
api_key = "proxy-key"

[radarr]
url = "http://localhost:7878"
api_key = "secret"
root_folder = "/mnt/Movies"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let sanitized = SanitizedConfig::from(&config);
        assert_eq!(sanitized.auth.method, "api_key");

        let radarr = sanitized.radarr.as_ref().unwrap();
        assert!(radarr.api_key_configured);
        assert_eq!(radarr.url, "http://localhost:7878/api/v3");
        assert_eq!(radarr.force_search_on_existing, Some(true));
        assert!(sanitized.sonarr.is_none());

        let json = serde_json::to_string(&sanitized).unwrap();
        assert!(!json.contains("secret"));
        assert!(!json.contains("proxy-key"));
    }
}
