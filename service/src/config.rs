use std::fmt;
use std::num::NonZeroUsize;

use clap::{Parser, ValueEnum};
use reqwest::Url;

use crate::error::RelayError;

/// Header carrying the static credential on every request
pub const API_KEY_HEADER: &str = "x-api-key";

pub const DEFAULT_HOST: &str = "mcp.envariants.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Scheme {
    Https,
    Http,
}

impl Scheme {
    pub fn as_str(self) -> &'static str {
        match self {
            Scheme::Https => "https",
            Scheme::Http => "http",
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "mcp-relay",
    about = "Relay newline-delimited JSON from stdin to a fixed JSON-over-HTTPS endpoint",
    version
)]
pub struct Cli {
    #[arg(
        long,
        env = "MCP_RELAY_HOST",
        default_value = DEFAULT_HOST,
        help = "Remote host every request is sent to"
    )]
    pub host: String,

    #[arg(long, env = "MCP_RELAY_PORT", default_value_t = 443, help = "Remote port")]
    pub port: u16,

    #[arg(
        long,
        env = "MCP_RELAY_PATH",
        default_value = "/",
        help = "Request path on the remote host"
    )]
    pub path: String,

    #[arg(
        long,
        env = "MCP_RELAY_SCHEME",
        value_enum,
        default_value_t = Scheme::Https,
        help = "URL scheme; plain http is meant for local testing"
    )]
    pub scheme: Scheme,

    #[arg(
        long = "api-key",
        env = "MCP_RELAY_API_KEY",
        hide_env_values = true,
        help = "Static API key sent in the X-API-Key header"
    )]
    pub api_key: String,

    #[arg(
        long = "max-in-flight",
        env = "MCP_RELAY_MAX_IN_FLIGHT",
        help = "Optional cap on concurrently running requests. Unbounded when unset."
    )]
    pub max_in_flight: Option<usize>,
}

impl Cli {
    pub fn into_config(self) -> Result<RelayConfig, RelayError> {
        let endpoint = Endpoint {
            scheme: self.scheme,
            host: self.host.trim().to_string(),
            port: self.port,
            path: self.path,
        };
        endpoint.validate()?;

        let api_key = self.api_key.trim();
        if api_key.is_empty() {
            return Err(RelayError::Config("api key must not be empty".to_string()));
        }

        let max_in_flight = match self.max_in_flight {
            None => None,
            Some(limit) => Some(NonZeroUsize::new(limit).ok_or_else(|| {
                RelayError::Config("max-in-flight must be at least 1".to_string())
            })?),
        };

        Ok(RelayConfig {
            endpoint,
            credential: Credential::new(api_key),
            max_in_flight,
        })
    }
}

/// Fixed target of every request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub scheme: Scheme,
    pub host: String,
    pub port: u16,
    pub path: String,
}

impl Endpoint {
    fn validate(&self) -> Result<(), RelayError> {
        if self.host.is_empty() {
            return Err(RelayError::Config("host must not be empty".to_string()));
        }
        if !self.path.starts_with('/') {
            return Err(RelayError::Config(format!(
                "path must start with '/': {}",
                self.path
            )));
        }
        Ok(())
    }

    pub fn url(&self) -> Result<Url, RelayError> {
        let raw = format!(
            "{}://{}:{}{}",
            self.scheme.as_str(),
            self.host,
            self.port,
            self.path
        );
        Url::parse(&raw)
            .map_err(|e| RelayError::Config(format!("invalid endpoint url {raw}: {e}")))
    }
}

/// API key; kept out of `Debug` output and logs
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Everything the relay needs, resolved once at startup and never mutated
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub endpoint: Endpoint,
    pub credential: Credential,
    pub max_in_flight: Option<NonZeroUsize>,
}
