//! Shared cryptographic primitives for fitlog services.
//!
//! - `jwt`: bearer-token codec (HS256) shared by member-service and the gateway
//! - `secret`: signing-secret strength validation
//! - `hash`: SHA-256 helpers for revocation keys and log fingerprints

pub mod hash;
pub mod jwt;
pub mod secret;

pub use jwt::{Claims, Role, TokenCodec, TokenError, BEARER_PREFIX};
pub use secret::{validate_secret_strength, SecretError, SecretStrength};
