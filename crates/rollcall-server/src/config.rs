//! Server configuration loaded from the command line and environment.

use std::time::Duration;

use clap::Parser;
use rollcall_auth::config::AuthConfig;
use rollcall_db::DbConfig;
use rollcall_sync::SyncConfig;
use thiserror::Error;
use url::Url;

/// Shortest accepted token signing secret, in bytes.
pub const MIN_JWT_SECRET_LEN: usize = 32;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("JWT_SECRET must be at least 32 bytes, got {0}")]
    WeakSecret(usize),

    #[error("{name} is not a valid absolute http(s) URL: {value}")]
    InvalidUrl { name: &'static str, value: String },

    #[error("{name} must be greater than zero")]
    Zero { name: &'static str },
}

#[derive(Parser, Debug, Clone)]
#[command(name = "rollcall-server", version, about = "Rollcall user account authority")]
pub struct Cli {
    /// Port to listen on
    #[arg(long, default_value_t = 3000, env = "PORT")]
    pub port: u16,

    /// Host address to bind
    #[arg(long, default_value = "0.0.0.0", env = "HOST")]
    pub host: String,

    /// HMAC secret for signing access tokens
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: String,

    /// Access token lifetime in seconds
    #[arg(long, default_value_t = 3600, env = "JWT_EXPIRATION_SECS")]
    pub jwt_expiration_secs: u64,

    /// Value of the `iss` claim
    #[arg(long, default_value = "rollcall", env = "JWT_ISSUER")]
    pub jwt_issuer: String,

    /// Optional pepper mixed into password hashes
    #[arg(long, env = "PASSWORD_PEPPER", hide_env_values = true)]
    pub password_pepper: Option<String>,

    #[arg(long, default_value = "127.0.0.1:8000", env = "SURREAL_URL")]
    pub surreal_url: String,

    #[arg(long, default_value = "rollcall", env = "SURREAL_NS")]
    pub surreal_ns: String,

    #[arg(long, default_value = "main", env = "SURREAL_DB")]
    pub surreal_db: String,

    #[arg(long, default_value = "root", env = "SURREAL_USER")]
    pub surreal_user: String,

    #[arg(long, default_value = "root", env = "SURREAL_PASS", hide_env_values = true)]
    pub surreal_pass: String,

    /// Base URL of the roster service
    #[arg(long, env = "CORE_SERVICE_URL")]
    pub core_service_url: String,

    /// API key sent to the roster service
    #[arg(long, env = "CORE_API_KEY", hide_env_values = true)]
    pub core_api_key: String,

    /// Base URL of the notification service
    #[arg(long, env = "NOTIFICATION_SERVICE_URL")]
    pub notification_service_url: String,

    /// Timeout for outbound HTTP calls, in seconds
    #[arg(long, default_value_t = 10, env = "HTTP_TIMEOUT_SECS")]
    pub http_timeout_secs: u64,

    /// Delivery attempts per welcome notification
    #[arg(long, default_value_t = 1, env = "NOTIFICATION_ATTEMPTS")]
    pub notification_attempts: u32,
}

/// Validated configuration for every component the server wires up.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub auth: AuthConfig,
    pub db: DbConfig,
    pub sync: SyncConfig,
}

impl TryFrom<Cli> for ServerConfig {
    type Error = ConfigError;

    fn try_from(cli: Cli) -> Result<Self, Self::Error> {
        if cli.jwt_secret.len() < MIN_JWT_SECRET_LEN {
            return Err(ConfigError::WeakSecret(cli.jwt_secret.len()));
        }
        if cli.jwt_expiration_secs == 0 {
            return Err(ConfigError::Zero {
                name: "JWT_EXPIRATION_SECS",
            });
        }
        if cli.http_timeout_secs == 0 {
            return Err(ConfigError::Zero {
                name: "HTTP_TIMEOUT_SECS",
            });
        }

        let roster_url = parse_http_url("CORE_SERVICE_URL", &cli.core_service_url)?;
        let notification_url =
            parse_http_url("NOTIFICATION_SERVICE_URL", &cli.notification_service_url)?;

        let auth = AuthConfig {
            jwt_secret: cli.jwt_secret,
            access_token_lifetime_secs: cli.jwt_expiration_secs,
            jwt_issuer: cli.jwt_issuer,
            pepper: cli.password_pepper.filter(|p| !p.is_empty()),
            ..AuthConfig::default()
        };

        let db = DbConfig {
            url: cli.surreal_url,
            namespace: cli.surreal_ns,
            database: cli.surreal_db,
            username: cli.surreal_user,
            password: cli.surreal_pass,
        };

        let mut sync = SyncConfig::new(roster_url, cli.core_api_key, notification_url);
        sync.request_timeout = Duration::from_secs(cli.http_timeout_secs);
        sync.notification_attempts = cli.notification_attempts.max(1);

        Ok(Self {
            host: cli.host,
            port: cli.port,
            auth,
            db,
            sync,
        })
    }
}

fn parse_http_url(name: &'static str, value: &str) -> Result<Url, ConfigError> {
    let invalid = || ConfigError::InvalidUrl {
        name,
        value: value.to_string(),
    };
    let url = Url::parse(value.trim()).map_err(|_| invalid())?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(invalid());
    }
    Ok(url)
}
