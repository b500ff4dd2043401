//! Lokal Server: HTTP API over the entitlement, resolution and
//! content services.

pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

pub use config::Config;
pub use routes::build_router;
pub use state::AppState;
