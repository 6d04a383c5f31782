use crate::{ConfigError, FromEnv, env_or_default};
use std::net::Ipv4Addr;

/// Where an HTTP API binds its listener.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

const DEFAULT_PORT: u16 = 8080;

impl ServerConfig {
    pub fn new(host: String, port: u16) -> Self {
        Self { host, port }
    }

    /// Bind address in `host:port` form, ready for `TcpListener::bind`.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// `HOST` (default `0.0.0.0`) and `PORT` (default `8080`).
impl FromEnv for ServerConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            host: env_or_default("HOST", &Ipv4Addr::UNSPECIFIED.to_string()),
            port: env_or_default("PORT", &DEFAULT_PORT.to_string())
                .parse()
                .map_err(|e| ConfigError::ParseError {
                    key: "PORT".to_string(),
                    details: format!("{}", e),
                })?,
        };
        Ok(config)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new(Ipv4Addr::UNSPECIFIED.to_string(), DEFAULT_PORT)
    }
}
