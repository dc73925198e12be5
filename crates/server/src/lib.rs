//! HTTP front end for the darrlink reconciliation engines.

pub mod api;
pub mod metrics;
pub mod state;

pub use api::create_router;
pub use state::AppState;
