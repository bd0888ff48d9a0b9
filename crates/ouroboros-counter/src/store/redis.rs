//! Redis counter store implementation
//!
//! Connections come from a deadpool-redis pool. Each call checks one out,
//! runs a single command and hands it back on drop, on success and error
//! paths alike. Every call is bounded by `command_timeout`.

use async_trait::async_trait;
use deadpool_redis::{Config as PoolConfig, Connection, Pool, Runtime};
use redis::{AsyncCommands, Script};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::future::Future;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, error, warn};

use super::CounterStore;
use crate::CounterError;

/// Decrement only when the key exists, evaluated atomically by Redis.
/// Returns nil for an absent key.
const DECREMENT_EXISTING: &str = r#"
if redis.call('EXISTS', KEYS[1]) == 1 then
    return redis.call('DECR', KEYS[1])
end
return false
"#;

const DEFAULT_HOST: &str = "127.0.0.1:6379";

/// Redis store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisStoreConfig {
    /// Redis URL (e.g., "redis://localhost:6379/0")
    pub url: String,
    /// Optional namespace; keys become `{prefix}:{key}`
    pub key_prefix: Option<String>,
    /// Connection pool size
    pub pool_size: usize,
    /// Upper bound for connection checkout plus one command
    pub command_timeout: Duration,
}

impl Default for RedisStoreConfig {
    fn default() -> Self {
        Self {
            url: format!("redis://{}/0", DEFAULT_HOST),
            key_prefix: None,
            pool_size: 10,
            command_timeout: Duration::from_secs(5),
        }
    }
}

impl RedisStoreConfig {
    /// Load configuration from environment variables.
    ///
    /// `REDIS_URL` wins when set; otherwise the URL is assembled from
    /// `REDIS_HOST` (`host:port`), `REDIS_PASSWORD` and `REDIS_DB`.
    pub fn from_env() -> Result<Self, CounterError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CounterError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let url = match lookup("REDIS_URL").filter(|url| !url.is_empty()) {
            Some(url) => url,
            None => {
                let host = lookup("REDIS_HOST")
                    .filter(|host| !host.is_empty())
                    .unwrap_or_else(|| DEFAULT_HOST.to_string());
                let password = lookup("REDIS_PASSWORD").unwrap_or_default();
                let db = lookup("REDIS_DB").unwrap_or_else(|| "0".to_string());
                build_url(&host, &password, &db)
            }
        };

        let pool_size = parse_var(&lookup, "REDIS_POOL_SIZE", defaults.pool_size)?;
        let timeout_ms = parse_var(
            &lookup,
            "REDIS_TIMEOUT_MS",
            defaults.command_timeout.as_millis() as u64,
        )?;

        Ok(Self {
            url,
            key_prefix: lookup("REDIS_KEY_PREFIX").filter(|prefix| !prefix.is_empty()),
            pool_size,
            command_timeout: Duration::from_millis(timeout_ms),
        })
    }
}

fn build_url(host: &str, password: &str, db: &str) -> String {
    if password.is_empty() {
        format!("redis://{}/{}", host, db)
    } else {
        format!("redis://:{}@{}/{}", urlencoding::encode(password), host, db)
    }
}

fn parse_var<F, T>(lookup: &F, name: &str, default: T) -> Result<T, CounterError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(raw) => raw
            .parse()
            .map_err(|e| CounterError::Configuration(format!("Invalid {}={:?}: {}", name, raw, e))),
        None => Ok(default),
    }
}

/// Redis-backed counter store
#[derive(Clone)]
pub struct RedisCounterStore {
    config: RedisStoreConfig,
    pool: Pool,
    decrement_script: Script,
}

impl RedisCounterStore {
    /// Create a store without touching the network
    pub fn new(config: RedisStoreConfig) -> Result<Self, CounterError> {
        debug!(
            "Creating Redis counter store: prefix={:?}, pool_size={}, timeout={:?}",
            config.key_prefix, config.pool_size, config.command_timeout
        );

        let pool = PoolConfig::from_url(&config.url)
            .builder()
            .map_err(|e| {
                CounterError::Configuration(format!("Failed to create pool builder: {}", e))
            })?
            .max_size(config.pool_size)
            .runtime(Runtime::Tokio1)
            .build()
            .map_err(|e| CounterError::Configuration(format!("Failed to create pool: {}", e)))?;

        Ok(Self {
            config,
            pool,
            decrement_script: Script::new(DECREMENT_EXISTING),
        })
    }

    /// Create a store and verify Redis answers
    pub async fn connect(config: RedisStoreConfig) -> Result<Self, CounterError> {
        let store = Self::new(config)?;
        store.health_check().await?;

        debug!("Redis counter store initialized successfully");

        Ok(store)
    }

    /// Get the configuration in use
    pub fn config(&self) -> &RedisStoreConfig {
        &self.config
    }

    fn namespaced<'a>(&self, key: &'a str) -> Cow<'a, str> {
        match &self.config.key_prefix {
            Some(prefix) => Cow::Owned(format!("{}:{}", prefix, key)),
            None => Cow::Borrowed(key),
        }
    }

    /// Get a connection from the pool
    async fn get_conn(&self) -> Result<Connection, CounterError> {
        self.pool
            .get()
            .await
            .map_err(|e| CounterError::Store(format!("Failed to get connection: {}", e)))
    }

    /// Run one store call under the configured timeout
    async fn bounded<T, F>(&self, command: &'static str, fut: F) -> Result<T, CounterError>
    where
        F: Future<Output = Result<T, CounterError>>,
    {
        let timeout = self.config.command_timeout;

        match tokio::time::timeout(timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                warn!(command, ?timeout, "Redis call timed out");
                Err(CounterError::Store(format!(
                    "{} timed out after {:?}",
                    command, timeout
                )))
            }
        }
    }
}

#[async_trait]
impl CounterStore for RedisCounterStore {
    async fn increment(&self, key: &str) -> Result<i64, CounterError> {
        let key = self.namespaced(key);

        self.bounded("INCR", async {
            let mut conn = self.get_conn().await?;
            conn.incr::<_, _, i64>(&*key, 1).await.map_err(|e| {
                error!(key = %key, "Failed to increment: {}", e);
                CounterError::from(e)
            })
        })
        .await
    }

    async fn decrement(&self, key: &str) -> Result<i64, CounterError> {
        let namespaced = self.namespaced(key);

        let value: Option<i64> = self
            .bounded("DECR", async {
                let mut conn = self.get_conn().await?;
                self.decrement_script
                    .key(&*namespaced)
                    .invoke_async(&mut conn)
                    .await
                    .map_err(|e| {
                        error!(key = %namespaced, "Failed to decrement: {}", e);
                        CounterError::from(e)
                    })
            })
            .await?;

        value.ok_or_else(|| CounterError::NotFound(key.to_string()))
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CounterError> {
        let key = self.namespaced(key);

        self.bounded("GET", async {
            let mut conn = self.get_conn().await?;
            conn.get::<_, Option<String>>(&*key)
                .await
                .map_err(CounterError::from)
        })
        .await
    }

    async fn delete(&self, key: &str) -> Result<bool, CounterError> {
        let key = self.namespaced(key);

        self.bounded("DEL", async {
            let mut conn = self.get_conn().await?;
            let removed = conn
                .del::<_, i64>(&*key)
                .await
                .map_err(CounterError::from)?;
            Ok(removed > 0)
        })
        .await
    }

    async fn exists(&self, key: &str) -> Result<bool, CounterError> {
        let key = self.namespaced(key);

        self.bounded("EXISTS", async {
            let mut conn = self.get_conn().await?;
            conn.exists::<_, bool>(&*key)
                .await
                .map_err(CounterError::from)
        })
        .await
    }

    async fn health_check(&self) -> Result<(), CounterError> {
        debug!("Performing Redis health check");

        self.bounded("PING", async {
            let mut conn = self.get_conn().await?;
            let _pong: String = redis::cmd("PING")
                .query_async(&mut conn)
                .await
                .map_err(|e| CounterError::Store(format!("Health check failed: {}", e)))?;
            Ok(())
        })
        .await
    }
}
