//! Token revocation ("blacklist") for bearer tokens
//!
//! **Protocol**:
//! - Logout records the token under `BL:<token>` (or `BL:<sha256(token)>`)
//!   with a TTL equal to the token's remaining lifetime, never longer
//! - The gateway checks key existence before trusting a token
//! - Entries are never deleted explicitly; the store's TTL eviction cleans up
//!
//! Both operations are idempotent, so concurrent logout and validation of the
//! same token need no coordination.

pub mod memory;
pub mod token_blacklist;

#[cfg(test)]
mod test_utils;

pub use memory::InMemoryTokenBlacklist;
pub use token_blacklist::{
    blacklist_key, BlacklistError, KeyMode, RedisTokenBlacklist, TokenBlacklist,
    BLACKLIST_PREFIX, REVOKED_MARKER,
};
