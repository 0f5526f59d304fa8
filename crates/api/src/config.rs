use std::net::SocketAddr;
use std::path::PathBuf;

use domain::models::Runtime;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub registry: RegistryConfig,
    pub runtimes: RuntimesConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Image builds can take minutes, so the request timeout is generous.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Maximum accepted size of an uploaded source archive.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegistryConfig {
    /// Registry host:port used in advertised image references.
    #[serde(default = "default_registry_url")]
    pub url: String,

    /// Registry endpoint to push through when it differs from `url`
    /// (e.g. an internal network name). Pushes go to `url` when unset.
    #[serde(default)]
    pub push_url: Option<String>,
}

impl RegistryConfig {
    /// The endpoint images are pushed to.
    pub fn push_endpoint(&self) -> &str {
        self.push_url.as_deref().unwrap_or(&self.url)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RuntimesConfig {
    /// Directory holding one scaffold directory per runtime.
    #[serde(default = "default_scaffold_root")]
    pub scaffold_root: PathBuf,

    /// Runtime assumed when detection finds no marker files.
    #[serde(default = "default_runtime")]
    pub default_runtime: Runtime,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8082
}
fn default_request_timeout() -> u64 {
    600
}
fn default_max_upload_bytes() -> usize {
    52_428_800 // 50 MiB
}
fn default_registry_url() -> String {
    "localhost:5001".to_string()
}
fn default_scaffold_root() -> PathBuf {
    PathBuf::from("/app/runtimes")
}
fn default_runtime() -> Runtime {
    Runtime::PythonFlask
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Loading order (later sources override earlier):
    /// 1. config/default.toml - base configuration with defaults
    /// 2. config/local.toml - local overrides (optional, not in git)
    /// 3. Environment variables with BUILDER__ prefix
    /// 4. Legacy `REGISTRY_URL` / `PORT` variables from earlier deployments,
    ///    honored only when the prefixed form is unset
    pub fn load() -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("BUILDER").separator("__"));

        for (key, value) in legacy_env_overrides(|name| std::env::var(name).ok()) {
            builder = builder.set_override(key, value)?;
        }

        let cfg: Self = builder.build()?.try_deserialize()?;
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    /// Load configuration for testing with custom overrides.
    ///
    /// This method creates a config entirely from defaults and overrides,
    /// without relying on config files (which may not be accessible during tests).
    #[cfg(test)]
    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        // Embed defaults directly to avoid file system dependency in tests
        let defaults = r#"
            [server]
            host = "0.0.0.0"
            port = 8082
            request_timeout_secs = 600
            max_upload_bytes = 52428800

            [registry]
            url = "localhost:5001"

            [runtimes]
            scaffold_root = "/app/runtimes"
            default_runtime = "python-flask"

            [logging]
            level = "info"
            format = "json"
        "#;

        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(defaults, config::FileFormat::Toml));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        let cfg: Self = builder.build()?.try_deserialize()?;
        // Skip validation in tests to allow partial configs
        Ok(cfg)
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.server.port == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "Server port cannot be 0".to_string(),
            ));
        }

        if self.registry.url.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "registry.url must be set (BUILDER__REGISTRY__URL)".to_string(),
            ));
        }

        if self.runtimes.scaffold_root.as_os_str().is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "runtimes.scaffold_root must be set".to_string(),
            ));
        }

        Ok(())
    }

    pub fn socket_addr(&self) -> SocketAddr {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .expect("Invalid socket address")
    }
}

/// Maps the pre-rename environment variable names onto config keys.
///
/// The prefixed `BUILDER__*` forms win; a legacy name is consulted only
/// when its prefixed counterpart is absent. Takes the environment lookup
/// as a closure so the mapping is testable without touching process
/// globals.
fn legacy_env_overrides(
    get: impl Fn(&str) -> Option<String>,
) -> Vec<(&'static str, String)> {
    let mut overrides = Vec::new();

    if get("BUILDER__REGISTRY__URL").is_none() {
        if let Some(url) = get("REGISTRY_URL") {
            overrides.push(("registry.url", url));
        }
    }

    if get("BUILDER__SERVER__PORT").is_none() {
        if let Some(port) = get("PORT") {
            overrides.push(("server.port", port));
        }
    }

    overrides
}
