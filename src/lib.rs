//! Library Backend
//!
//! User accounts and stateless bearer-token authentication for the library
//! lending service. The binary in `main.rs` only wires these together.

pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod middleware;

pub use app::build_router;
pub use config::Config;
pub use error::ApiError;
