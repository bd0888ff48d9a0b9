//! HTTP boundary for ouroboros counters
//!
//! Thin axum adapter: routes map one-to-one onto [`CounterService`]
//! operations and every outcome is serialized through the core's response
//! shapes.

pub mod config;
pub mod error;
pub mod routes;
pub mod telemetry;

pub use config::Config;
pub use error::ApiError;
pub use routes::{build_router, AppState};

pub use ouroboros_counter::CounterService;
