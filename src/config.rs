use anyhow::{Context, Result};
use std::env;

use crate::dispatch::DEFAULT_BODY_LIMIT;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub dispatch: DispatchConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub instance_id: String,
}

#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Largest request body the dispatcher will try to bind
    pub body_limit_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                instance_id: "unknown".to_string(),
            },
            dispatch: DispatchConfig {
                body_limit_bytes: DEFAULT_BODY_LIMIT,
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        Ok(Config {
            server: ServerConfig {
                host: env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("API_PORT")
                    .unwrap_or_else(|_| "8080".to_string())
                    .parse()
                    .context("API_PORT must be a valid port number")?,
                // Only used in logs and the health payload
                instance_id: env::var("INSTANCE_ID")
                    .or_else(|_| env::var("HOSTNAME"))
                    .unwrap_or_else(|_| "unknown".to_string()),
            },
            dispatch: DispatchConfig {
                body_limit_bytes: env::var("BODY_LIMIT_BYTES")
                    .unwrap_or_else(|_| DEFAULT_BODY_LIMIT.to_string())
                    .parse()
                    .context("BODY_LIMIT_BYTES must be a valid number")?,
            },
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_address() {
        let config = Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8000,
                instance_id: "test-instance".to_string(),
            },
            dispatch: DispatchConfig {
                body_limit_bytes: 1024,
            },
        };

        assert_eq!(config.server_address(), "127.0.0.1:8000");
    }

    #[test]
    fn test_default() {
        let config = Config::default();
        assert_eq!(config.server_address(), "0.0.0.0:8080");
        assert_eq!(config.dispatch.body_limit_bytes, 2 * 1024 * 1024);
    }
}
