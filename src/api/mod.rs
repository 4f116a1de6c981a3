//! REST API served under `/api`.
//!
//! Public routes (health, register, login, logout, check_auth) sit beside
//! the protected ones, which pass through Auth -> Audit before the handler.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::api_router;
pub use server::{start_api_server, ApiServer};
pub use types::ApiContext;
