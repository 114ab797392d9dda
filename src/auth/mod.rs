//! Authentication Module
//! Mission: Stateless bearer-token auth: login, refresh rotation, protected routes

pub mod api;
pub mod codec;
pub mod credentials;
pub mod error;
pub mod flow;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod user_store;

pub use api::AuthState;
pub use codec::SigningSecret;
pub use error::AuthError;
pub use jwt::JwtHandler;
pub use middleware::{auth_middleware, CurrentUser};
pub use user_store::UserStore;
