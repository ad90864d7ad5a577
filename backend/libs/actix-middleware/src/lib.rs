//! # Actix Middleware Library
//!
//! Shared middleware for services sitting behind the gateway
//!
//! ## Modules
//! - `internal_secret`: rejects requests that did not come through the gateway
//! - `identity`: identity header names and the `TrustedIdentity` extractor

pub mod identity;
pub mod internal_secret;

pub use identity::{
    IdentityError, TrustVerified, TrustedIdentity, X_INTERNAL_SECRET, X_USER_ID, X_USER_ROLE,
};
pub use internal_secret::{constant_time_compare, InternalSecretMiddleware};
