use anyhow::Context;
use ouroboros_counter::KeyPolicy;
use std::env;
use std::net::SocketAddr;
use std::time::Duration;

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Upper bound for handling one request
    pub request_timeout: Duration,
    /// Treatment of malformed caller keys
    pub key_policy: KeyPolicy,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Store settings are read separately through
    /// `RedisStoreConfig::from_env`, only when Redis is used.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = lookup("PORT")
            .unwrap_or_else(|| "1234".to_string())
            .parse()
            .context("Invalid PORT")?;
        let request_timeout_secs: u64 = lookup("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|| "15".to_string())
            .parse()
            .context("Invalid REQUEST_TIMEOUT_SECS")?;
        let strict_keys = match lookup("STRICT_KEYS") {
            Some(raw) => parse_flag(&raw).with_context(|| format!("Invalid STRICT_KEYS={:?}", raw))?,
            None => false,
        };

        Ok(Self {
            host,
            port,
            request_timeout: Duration::from_secs(request_timeout_secs),
            key_policy: if strict_keys {
                KeyPolicy::Strict
            } else {
                KeyPolicy::Lenient
            },
        })
    }

    /// Socket address assembled from host and port
    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid bind address {}:{}", self.host, self.port))
    }
}

fn parse_flag(raw: &str) -> anyhow::Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => anyhow::bail!("expected a boolean, got {:?}", other),
    }
}
