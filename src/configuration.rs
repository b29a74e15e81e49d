use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use config::{Config, File};
use serde_aux::field_attributes::deserialize_number_from_string;

use crate::domain::DuplicateDatePolicy;
use crate::error::Error;

#[derive(Debug, serde::Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub database: DatabaseSettings,
    pub api: ApiSettings,
}

#[derive(Debug, serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    pub host: IpAddr,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
}

impl ApplicationSettings {
    pub fn address(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

#[derive(Debug, serde::Deserialize, Clone)]
pub struct DatabaseSettings {
    pub path: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_connections: u32,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub acquire_timeout_secs: u64,
    /// Echo every SQL statement at debug level.
    pub log_statements: bool,
}

#[derive(Debug, serde::Deserialize, Clone)]
pub struct ApiSettings {
    pub duplicate_dates: DuplicateDatePolicy,
}

/// Layers, lowest precedence first: built-in defaults, `configuration/base`,
/// `configuration/<APP_ENVIRONMENT>`, then `APP_`-prefixed variables with `__`
/// between nested keys (`APP_DATABASE__PATH`).
pub fn get_configuration() -> Result<Settings, Error> {
    let configuration_directory = PathBuf::from("configuration");

    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .map_err(Error::Environment)?;

    let config = Config::builder()
        .set_default("application.host", "127.0.0.1")?
        .set_default("application.port", 5000_i64)?
        .set_default("database.path", "Resources/hawaii.sqlite")?
        .set_default("database.max_connections", 5_i64)?
        .set_default("database.acquire_timeout_secs", 30_i64)?
        .set_default("database.log_statements", true)?
        .set_default("api.duplicate_dates", "last")?
        .add_source(File::from(configuration_directory.join("base")).required(false))
        .add_source(File::from(configuration_directory.join(environment.as_str())).required(false))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(config.try_deserialize()?)
}

pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{} is not a supported environment. Use either `local` or `production`.",
                other
            )),
        }
    }
}
