//! HTTP API for vehicle control
//!
//! All actions target the single configured vehicle:
//! - GET /health - Liveness check, independent of the vehicle cloud
//! - GET /status - Cached vehicle state
//! - POST /start - Remote start with the fixed climate preset
//! - POST /stop - Stop remote climate
//! - POST /lock - Lock doors
//! - POST /unlock - Unlock doors

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
