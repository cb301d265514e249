//! HTTP API for springdex-sync

pub mod health;
pub mod sse;
pub mod sync;

pub use health::health_routes;
pub use sse::event_stream;
pub use sync::sync_routes;
