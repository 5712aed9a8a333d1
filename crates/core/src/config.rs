use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use tracing::warn;

/// Signing secret used when none is configured. Only acceptable in development.
pub const INSECURE_DEFAULT_SECRET: &str = "insecure-dev-secret-change-me";

/// Default token lifetime: one day.
pub const DEFAULT_TOKEN_EXPIRY_SECONDS: i64 = 24 * 60 * 60;

/// Longest token lifetime accepted: one year.
pub const MAX_TOKEN_EXPIRY_SECONDS: i64 = 365 * 24 * 60 * 60;

/// Seeded admin password used when none is configured.
pub const DEFAULT_ADMIN_PASSWORD: &str = "password";

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    #[default]
    Development,
    Production,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub environment: RunMode,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub seed: SeedConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    #[serde(default = "default_token_expiry")]
    pub token_expiry_seconds: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SeedConfig {
    #[serde(default = "default_admin_name")]
    pub admin_name: String,
    #[serde(default = "default_admin_password")]
    pub admin_password: String,
}

fn default_database_url() -> String {
    "sqlite:authgate.db".to_string()
}

fn default_jwt_secret() -> String {
    INSECURE_DEFAULT_SECRET.to_string()
}

fn default_token_expiry() -> i64 {
    DEFAULT_TOKEN_EXPIRY_SECONDS
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_admin_name() -> String {
    "admin".to_string()
}

fn default_admin_password() -> String {
    DEFAULT_ADMIN_PASSWORD.to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { url: default_database_url() }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            token_expiry_seconds: default_token_expiry(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            admin_name: default_admin_name(),
            admin_password: default_admin_password(),
        }
    }
}

impl AppConfig {
    /// Load configuration with environment variable overrides.
    ///
    /// `authgate.toml` in the working directory is optional. Environment
    /// variables use the `AUTHGATE_` prefix and `__` between sections,
    /// e.g. `AUTHGATE_AUTH__JWT_SECRET`, `AUTHGATE_SERVER__PORT`.
    ///
    /// Returns the config and the list of keys overridden from the environment
    pub fn load_with_env() -> Result<(Self, Vec<String>), ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name("authgate").required(false))
            .add_source(
                Environment::with_prefix("AUTHGATE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let env_vars = [
            ("AUTHGATE_ENVIRONMENT", "environment"),
            ("AUTHGATE_DATABASE__URL", "database.url"),
            ("AUTHGATE_AUTH__JWT_SECRET", "auth.jwt_secret"),
            ("AUTHGATE_AUTH__TOKEN_EXPIRY_SECONDS", "auth.token_expiry_seconds"),
            ("AUTHGATE_SERVER__HOST", "server.host"),
            ("AUTHGATE_SERVER__PORT", "server.port"),
            ("AUTHGATE_SEED__ADMIN_NAME", "seed.admin_name"),
            ("AUTHGATE_SEED__ADMIN_PASSWORD", "seed.admin_password"),
        ];

        let overrides = env_vars
            .iter()
            .filter(|(env_var, _)| std::env::var(env_var).is_ok())
            .map(|(_, config_key)| config_key.to_string())
            .collect();

        let app_config = config.try_deserialize()?;
        Ok((app_config, overrides))
    }

    pub fn uses_default_secret(&self) -> bool {
        self.auth.jwt_secret == INSECURE_DEFAULT_SECRET
    }

    /// Check the loaded values before anything is started.
    ///
    /// The built-in signing secret is refused in production and only warned
    /// about in development.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.jwt_secret.is_empty() {
            return Err(ConfigError::Message("auth.jwt_secret must not be empty".to_string()));
        }

        if self.auth.token_expiry_seconds <= 0 {
            return Err(ConfigError::Message(
                "auth.token_expiry_seconds must be positive".to_string(),
            ));
        }

        if self.auth.token_expiry_seconds > MAX_TOKEN_EXPIRY_SECONDS {
            return Err(ConfigError::Message(format!(
                "auth.token_expiry_seconds must be at most {} (one year)",
                MAX_TOKEN_EXPIRY_SECONDS
            )));
        }

        if self.uses_default_secret() {
            match self.environment {
                RunMode::Production => {
                    return Err(ConfigError::Message(
                        "auth.jwt_secret is the built-in development secret; set AUTHGATE_AUTH__JWT_SECRET"
                            .to_string(),
                    ));
                }
                RunMode::Development => {
                    warn!("!! Using the built-in development JWT secret. Tokens are forgeable by anyone who has read the source.");
                    warn!("!! Set AUTHGATE_AUTH__JWT_SECRET before deploying.");
                }
            }
        }

        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
