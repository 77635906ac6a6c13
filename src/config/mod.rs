use serde::Deserialize;
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Prefix of the environment variables read by [`ConnectionConfig::load`],
/// e.g. `ODOOQ_HOSTNAME`.
pub const ENV_PREFIX: &str = "ODOOQ";

pub const DEFAULT_CONFIG_FILE: &str = "config.yml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid schema: http or https")]
    InvalidSchema,
    #[error("invalid port: 1-65535")]
    InvalidPort,
    #[error("invalid hostname length: 1-2048")]
    InvalidHostname,
    #[error("failed to load settings: {0}")]
    Load(#[from] ::config::ConfigError),
}

#[derive(Deserialize, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub hostname: String,
    pub port: u32,
    pub database: String,
    pub username: String,
    pub password: String,
    pub schema: String,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            hostname: "localhost".to_string(),
            port: 8069,
            database: "odoo".to_string(),
            username: "admin".to_string(),
            password: "admin".to_string(),
            schema: "http".to_string(),
        }
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("hostname", &self.hostname)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &"***")
            .field("schema", &self.schema)
            .finish()
    }
}

/// Values given explicitly on the command line; they win over every other
/// source.
#[derive(Debug, Default, Clone)]
pub struct ConnectionOverrides {
    pub hostname: Option<String>,
    pub port: Option<u32>,
    pub database: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub schema: Option<String>,
}

impl ConnectionConfig {
    /// Layer defaults, the optional settings file, `ODOOQ_*` environment
    /// variables and command-line overrides, in that order.
    pub fn load(path: Option<&Path>, overrides: &ConnectionOverrides) -> Result<Self, ConfigError> {
        let defaults = ConnectionConfig::default();

        let mut builder = ::config::Config::builder()
            .set_default("hostname", defaults.hostname)?
            .set_default("port", i64::from(defaults.port))?
            .set_default("database", defaults.database)?
            .set_default("username", defaults.username)?
            .set_default("password", defaults.password)?
            .set_default("schema", defaults.schema)?;

        if let Some(path) = path {
            builder = builder.add_source(::config::File::from(path).required(false));
        }

        let settings = builder
            .add_source(::config::Environment::with_prefix(ENV_PREFIX))
            .set_override_option("hostname", overrides.hostname.clone())?
            .set_override_option("port", overrides.port.map(i64::from))?
            .set_override_option("database", overrides.database.clone())?
            .set_override_option("username", overrides.username.clone())?
            .set_override_option("password", overrides.password.clone())?
            .set_override_option("schema", overrides.schema.clone())?
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// JSON-RPC endpoint URL, after checking schema, port and hostname.
    pub fn endpoint(&self) -> Result<String, ConfigError> {
        if self.schema != "http" && self.schema != "https" {
            return Err(ConfigError::InvalidSchema);
        }
        if self.port == 0 || self.port > 65535 {
            return Err(ConfigError::InvalidPort);
        }
        if self.hostname.is_empty() || self.hostname.len() > 2048 {
            return Err(ConfigError::InvalidHostname);
        }
        Ok(format!(
            "{}://{}:{}/jsonrpc",
            self.schema, self.hostname, self.port
        ))
    }
}
