//! Counter Server
//!
//! HTTP API for named atomic counters backed by Redis.

use clap::Parser;
use ouroboros_counter::{
    CounterService, CounterStore, InMemoryCounterStore, KeyPolicy, RedisCounterStore,
    RedisStoreConfig,
};
use ouroboros_counter_server::{build_router, telemetry, Config};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::{net::TcpListener, signal};
use tracing::{error, info, warn, Level};

#[derive(Parser, Debug)]
#[command(name = "counter-server")]
#[command(about = "HTTP API for named atomic counters")]
struct Args {
    /// Address to bind to (overrides HOST and PORT)
    #[arg(short, long)]
    bind: Option<SocketAddr>,

    /// Log level used when RUST_LOG is unset (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: Level,

    /// Reject malformed keys with 400 instead of generating a new one
    #[arg(long, default_value = "false")]
    strict_keys: bool,

    /// Keep counters in process memory instead of Redis
    #[arg(long, default_value = "false")]
    in_memory: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    dotenvy::dotenv().ok();

    // Setup logging
    telemetry::init(args.log_level);

    let mut config = Config::from_env()?;
    if args.strict_keys {
        config.key_policy = KeyPolicy::Strict;
    }
    let addr = match args.bind {
        Some(addr) => addr,
        None => config.bind_addr()?,
    };

    let store: Arc<dyn CounterStore> = if args.in_memory {
        warn!("Using in-memory store - counters are lost on restart");
        Arc::new(InMemoryCounterStore::new())
    } else {
        let redis = RedisStoreConfig::from_env()?;
        info!("Connecting to Redis at {}", redact(&redis.url));
        Arc::new(RedisCounterStore::connect(redis).await?)
    };

    let service = CounterService::with_key_policy(store, config.key_policy);
    let app = build_router(service, config.request_timeout);

    let listener = TcpListener::bind(addr).await?;
    info!(
        "Counter server listening on {} (key policy: {:?}, request timeout: {:?})",
        addr, config.key_policy, config.request_timeout
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(err) => error!("Unable to listen for shutdown signal: {}", err),
    }
}

/// Hide the password portion of a redis URL
fn redact(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://***{}", &url[..scheme_end], &url[at..])
        }
        _ => url.to_string(),
    }
}
