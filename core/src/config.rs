use std::net::SocketAddr;

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use crate::errors::{ConfigError, Result};
use crate::logger::Level;

/// Path to a YAML config file.
pub const CONFIG_PATH_ENV: &str = "HELLO_CONFIG_PATH";
/// Inline YAML config, used when no path is given.
pub const CONFIG_ENV: &str = "HELLO_CONFIG";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct HelloConfig {
    pub log: LogConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: Level,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Json,
    Text,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
        }
    }
}

impl LogConfig {
    pub fn env_filter(&self) -> EnvFilter {
        EnvFilter::new(self.level.as_str())
    }
}

pub fn load_config(config_path: Option<&str>) -> Result<HelloConfig> {
    let config = match config_path {
        Some(path) => HelloConfig::from_file(path)?,
        None if std::env::var_os(CONFIG_ENV).is_some() => HelloConfig::from_env()?,
        None => HelloConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

impl HelloConfig {
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            origin: path.to_string(),
            error: Box::new(e),
        })?;
        Self::from_yaml_str(&content)
    }

    pub fn from_env() -> Result<Self> {
        let config_str = std::env::var(CONFIG_ENV).map_err(|_| ConfigError::Invalid {
            message: format!("{CONFIG_ENV} environment variable not set"),
        })?;
        Self::from_yaml_str(&config_str)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: HelloConfig = serde_yaml::from_str(content)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.server.socket_addr()?;
        Ok(())
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        self.bind_address.parse().map_err(|_| {
            ConfigError::Invalid {
                message: format!("bind address {:?} is not a socket address", self.bind_address),
            }
            .into()
        })
    }
}
