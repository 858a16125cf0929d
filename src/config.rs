use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Path the identity provider redirects back to after consent.
pub const CALLBACK_PATH: &str = "/safepage";

const MIN_SESSION_SECRET_LEN: usize = 16;

const DEFAULT_SESSION_TTL_HOURS: u64 = 24;
/// Ten years.
const MAX_SESSION_TTL_HOURS: u64 = 24 * 365 * 10;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("{name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// String that never shows up in `Debug` output or logs.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretString(String);

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretString([redacted])")
    }
}

/// Deployment environment. Production hides 5xx detail and drops the port from public URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Test => "test",
            Environment::Production => "production",
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

impl std::str::FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "test" => Ok(Environment::Test),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(ConfigError::Invalid {
                name: "APP_ENV",
                reason: format!("unknown environment '{}'", other),
            }),
        }
    }
}

/// Process configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub protocol: String,
    pub hostname: String,
    pub port: u16,
    pub client_id: String,
    pub client_secret: SecretString,
    pub identity_base_url: Url,
    pub session_secret: SecretString,
    pub session_ttl: chrono::Duration,
    pub exchange_timeout: Duration,
    pub cleanup_interval: Duration,
    pub public_dir: PathBuf,
}

impl AppConfig {
    /// Reads configuration from the process environment.
    ///
    /// # Required env vars
    /// - `OAUTH_CLIENT_ID`, `OAUTH_CLIENT_SECRET`: OAuth2 client credentials
    /// - `IDENTITY_BASE_URL`: identity provider base URL
    /// - `SESSION_SECRET`: session cookie signing secret (at least 16 characters)
    ///
    /// # Optional env vars
    /// - `APP_ENV` (`development`), `APP_PROTOCOL` (`http`), `APP_HOSTNAME` (`localhost`),
    ///   `APP_PORT` (`3000`)
    /// - `SESSION_TTL_HOURS` (`24`), `EXCHANGE_TIMEOUT_SECS` (`10`),
    ///   `SESSION_CLEANUP_SECS` (`300`), `PUBLIC_DIR` (`public`)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let required = |name: &'static str| optional(name).ok_or(ConfigError::Missing(name));

        let environment = match optional("APP_ENV") {
            Some(value) => value.parse()?,
            None => Environment::Development,
        };

        let protocol = optional("APP_PROTOCOL").unwrap_or_else(|| "http".to_string());
        if protocol != "http" && protocol != "https" {
            return Err(ConfigError::Invalid {
                name: "APP_PROTOCOL",
                reason: format!("expected http or https, got '{}'", protocol),
            });
        }

        let identity_base_url =
            required("IDENTITY_BASE_URL")?
                .parse::<Url>()
                .map_err(|e| ConfigError::Invalid {
                    name: "IDENTITY_BASE_URL",
                    reason: e.to_string(),
                })?;

        let session_secret = required("SESSION_SECRET")?;
        if session_secret.len() < MIN_SESSION_SECRET_LEN {
            return Err(ConfigError::Invalid {
                name: "SESSION_SECRET",
                reason: format!("must be at least {} characters", MIN_SESSION_SECRET_LEN),
            });
        }

        let config = Self {
            environment,
            protocol,
            hostname: optional("APP_HOSTNAME").unwrap_or_else(|| "localhost".to_string()),
            port: parse_number(optional("APP_PORT"), "APP_PORT", 3000)?,
            client_id: required("OAUTH_CLIENT_ID")?,
            client_secret: SecretString::new(required("OAUTH_CLIENT_SECRET")?),
            identity_base_url,
            session_secret: SecretString::new(session_secret),
            session_ttl: session_ttl(optional("SESSION_TTL_HOURS"))?,
            exchange_timeout: Duration::from_secs(parse_positive(
                optional("EXCHANGE_TIMEOUT_SECS"),
                "EXCHANGE_TIMEOUT_SECS",
                10,
            )?),
            cleanup_interval: Duration::from_secs(parse_positive(
                optional("SESSION_CLEANUP_SECS"),
                "SESSION_CLEANUP_SECS",
                300,
            )?),
            public_dir: optional("PUBLIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("public")),
        };

        // Fail at startup rather than on the first callback.
        config.callback_uri()?;

        Ok(config)
    }

    /// Absolute URL for `path` as seen by the browser. The port is left out in production.
    pub fn public_url(&self, path: &str) -> Result<Url, ConfigError> {
        let origin = if self.environment.is_production() {
            format!("{}://{}", self.protocol, self.hostname)
        } else {
            format!("{}://{}:{}", self.protocol, self.hostname, self.port)
        };

        Url::parse(&origin)
            .and_then(|base| base.join(path))
            .map_err(|e| ConfigError::Invalid {
                name: "APP_HOSTNAME",
                reason: e.to_string(),
            })
    }

    /// Redirect URI sent both in the authorize link and in the code exchange.
    pub fn callback_uri(&self) -> Result<Url, ConfigError> {
        self.public_url(CALLBACK_PATH)
    }

    pub fn secure_cookies(&self) -> bool {
        self.protocol == "https"
    }
}

fn parse_number<T>(raw: Option<String>, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    match raw {
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

/// Like [`parse_number`], but zero is rejected.
fn parse_positive(
    raw: Option<String>,
    name: &'static str,
    default: u64,
) -> Result<u64, ConfigError> {
    match parse_number(raw, name, default)? {
        0 => Err(ConfigError::Invalid {
            name,
            reason: "must be greater than zero".to_string(),
        }),
        value => Ok(value),
    }
}

fn session_ttl(raw: Option<String>) -> Result<chrono::Duration, ConfigError> {
    const NAME: &str = "SESSION_TTL_HOURS";

    let hours = parse_positive(raw, NAME, DEFAULT_SESSION_TTL_HOURS)?;
    if hours > MAX_SESSION_TTL_HOURS {
        return Err(ConfigError::Invalid {
            name: NAME,
            reason: format!("must be at most {} hours", MAX_SESSION_TTL_HOURS),
        });
    }

    // Bounded above, so both the conversion and the hour count fit.
    i64::try_from(hours)
        .ok()
        .and_then(chrono::Duration::try_hours)
        .ok_or(ConfigError::Invalid {
            name: NAME,
            reason: "out of range".to_string(),
        })
}
