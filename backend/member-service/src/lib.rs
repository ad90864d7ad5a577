//! Member service: account signup, login, logout and member info
//!
//! `/auth/*` issues and revokes bearer tokens. `/member` sits behind the
//! internal-secret interceptor and trusts the identity headers set by the gateway.

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod security;
pub mod services;
