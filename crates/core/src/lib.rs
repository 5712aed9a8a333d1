pub mod config;
pub use self::config::{
    AppConfig, AuthConfig, DatabaseConfig, RunMode, SeedConfig, ServerConfig,
    DEFAULT_ADMIN_PASSWORD, INSECURE_DEFAULT_SECRET,
};
