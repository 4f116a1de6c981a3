//! Middleware stack for protected routes (outermost -> innermost):
//! 1. Auth: resolve the session token, inject `StudentContext`
//! 2. Audit: log method, path, user and status

pub mod audit;
pub mod auth;
