use chrono::Duration;
use std::env;
use std::fmt;

/// Process-wide settings, read once at startup and shared as `web::Data<Config>`.
#[derive(Debug, Clone)]
pub struct Config {
    /// Document store connection string. `memory://` selects the in-process store.
    pub database_url: String,
    pub database_name: String,
    pub jwt_secret: String,
    pub token_ttl_secs: i64,
    pub bcrypt_cost: u32,
    pub server_host: String,
    pub server_port: u16,
    /// Whether the task routes sit behind the authorization gate.
    pub require_auth: bool,
    pub enable_cors: bool,
    /// Access log format for `actix_web::middleware::Logger`; actix's default when unset.
    pub log_format: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{} must be set", key),
            ConfigError::Invalid { key, value } => write!(f, "{} has an invalid value: {:?}", key, value),
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let first = |keys: &[&str]| keys.iter().find_map(|key| lookup(*key));

        let database_url = first(&["DATABASE_URL", "MONGO_URI"]).ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let jwt_secret = lookup("JWT_SECRET")
            .filter(|secret| !secret.is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;

        Ok(Self {
            database_url,
            database_name: lookup("DATABASE_NAME").unwrap_or_else(|| "tasks".to_string()),
            jwt_secret,
            token_ttl_secs: parse_or("JWT_EXPIRES_IN_SECS", lookup("JWT_EXPIRES_IN_SECS"), 3600)?,
            bcrypt_cost: parse_or("BCRYPT_COST", lookup("BCRYPT_COST"), 10)?,
            server_host: lookup("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            server_port: parse_or("SERVER_PORT", first(&["SERVER_PORT", "PORT"]), 5000)?,
            require_auth: parse_flag("REQUIRE_AUTH", lookup("REQUIRE_AUTH"), true)?,
            enable_cors: parse_flag("ENABLE_CORS", lookup("ENABLE_CORS"), true)?,
            log_format: lookup("LOG_FORMAT").filter(|format| !format.is_empty()),
        })
    }

    pub fn token_ttl(&self) -> Duration {
        Duration::seconds(self.token_ttl_secs)
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}

fn parse_or<T: std::str::FromStr>(
    key: &'static str,
    value: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}

fn parse_flag(key: &'static str, value: Option<String>, default: bool) -> Result<bool, ConfigError> {
    match value.as_deref().map(str::trim) {
        None => Ok(default),
        Some("1") | Some("true") | Some("yes") | Some("on") => Ok(true),
        Some("0") | Some("false") | Some("no") | Some("off") => Ok(false),
        Some(other) => Err(ConfigError::Invalid {
            key,
            value: other.to_string(),
        }),
    }
}
