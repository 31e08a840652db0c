//! Middleware components for the form service

pub mod cors;
pub mod logging;
pub mod rate_limit;
