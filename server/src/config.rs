//! Server configuration from command line flags and environment variables.
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `TODO_SERVER_HOST` | 127.0.0.1 | Host to bind |
//! | `PORT` | 3000 | Port to listen on |
//! | `TODO_LOG_LEVEL` | info | Log level for this crate |
//! | `TODO_REQUEST_TIMEOUT` | 30 | Request timeout (seconds) |

use std::time::Duration;

use clap::Parser;

const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

#[derive(Debug, Clone, Parser)]
#[command(name = "todo-server")]
#[command(about = "Users and todos REST API server")]
pub struct ServerConfig {
    /// Host address to bind to.
    #[arg(long, env = "TODO_SERVER_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, env = "PORT", default_value = "3000")]
    pub port: u16,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, env = "TODO_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Request timeout in seconds.
    #[arg(long, env = "TODO_REQUEST_TIMEOUT", default_value = "30")]
    pub request_timeout: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            request_timeout: 30,
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    /// Returns every problem found, not just the first.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        if self.host.trim().is_empty() {
            errors.push("host must not be empty".to_string());
        }
        if !LOG_LEVELS
            .iter()
            .any(|level| level.eq_ignore_ascii_case(self.log_level.trim()))
        {
            errors.push(format!(
                "log level `{}` is not one of {}",
                self.log_level,
                LOG_LEVELS.join(", ")
            ));
        }
        if self.request_timeout == 0 {
            errors.push("request timeout must be at least one second".to_string());
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
