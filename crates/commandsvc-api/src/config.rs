//! Server configuration from environment variables.

use std::net::SocketAddr;

use commandsvc_core::archive::ARCHIVE_NAMESPACE;
use commandsvc_core::publisher::COMMAND_TOPIC;

use crate::error::AppError;

/// Settings read once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Interface to bind (`HOST`).
    pub host: String,
    /// Port to bind (`PORT`).
    pub port: u16,
    /// SQLite database URL (`ARCHIVE_URL`).
    pub archive_url: String,
    /// Archive namespace (`ARCHIVE_NAMESPACE`).
    pub archive_namespace: String,
    /// Topic events are published to (`COMMAND_TOPIC`).
    pub command_topic: String,
}

impl Config {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration through `lookup`, falling back to defaults
    /// for unset variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `PORT` is not a valid u16 or a string
    /// setting is empty.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let setting = |name: &str, default: &str| -> Result<String, AppError> {
            let value = lookup(name).unwrap_or_else(|| default.to_string());
            if value.trim().is_empty() {
                return Err(AppError::Config(format!("{name} must not be empty")));
            }
            Ok(value)
        };

        let port = setting("PORT", "8080")?
            .parse::<u16>()
            .map_err(|e| AppError::Config(format!("PORT must be a valid u16: {e}")))?;

        Ok(Self {
            host: setting("HOST", "0.0.0.0")?,
            port,
            archive_url: setting("ARCHIVE_URL", "sqlite://mdm_commands.db")?,
            archive_namespace: setting("ARCHIVE_NAMESPACE", ARCHIVE_NAMESPACE)?,
            command_topic: setting("COMMAND_TOPIC", COMMAND_TOPIC)?,
        })
    }

    /// Returns the address to listen on.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `HOST:PORT` is not a socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))
    }
}
