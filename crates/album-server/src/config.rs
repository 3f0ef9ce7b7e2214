use std::net::SocketAddr;

use thiserror::Error;

/// Server configuration from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub database_url: String,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, &'static str),
}

impl Config {
    /// Load configuration from the environment. DATABASE_URL defaults to a
    /// local SQLite file, LISTEN_ADDR to all interfaces on port 3000.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://album.db".to_string());

        let listen_addr = std::env::var("LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("LISTEN_ADDR", "must be a valid socket address"))?;

        Ok(Config {
            listen_addr,
            database_url,
        })
    }
}
