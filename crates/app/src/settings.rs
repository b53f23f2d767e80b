//! Handles settings for the application. Configuration is read from an
//! optional `settings.toml` and from `GLOBETROTTER__*` environment variables,
//! e.g. `GLOBETROTTER__AUTH__JWT_SECRET`.
//!
//! See `settings.toml` for the configuration.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const DEFAULT_CONFIG_PATH: &str = "settings";

#[derive(Debug, Deserialize)]
pub struct App {
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_level() -> String {
    "info".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
}

#[derive(Debug, Deserialize)]
pub struct Auth {
    pub jwt_secret: String,
    pub issuer: Option<String>,
    pub access_token_lifetime_secs: Option<u64>,
    pub refresh_token_lifetime_secs: Option<u64>,
    pub pepper: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub server: Server,
    pub auth: Auth,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name(DEFAULT_CONFIG_PATH).required(false))
            .add_source(
                Environment::with_prefix("GLOBETROTTER")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        settings.try_deserialize()
    }
}

impl Auth {
    pub fn to_server(&self) -> server::AuthSettings {
        let mut auth = server::AuthSettings::new(self.jwt_secret.clone());
        if let Some(issuer) = &self.issuer {
            auth.issuer = issuer.clone();
        }
        if let Some(secs) = self.access_token_lifetime_secs {
            auth.access_token_lifetime_secs = secs;
        }
        if let Some(secs) = self.refresh_token_lifetime_secs {
            auth.refresh_token_lifetime_secs = secs;
        }
        auth
    }
}
