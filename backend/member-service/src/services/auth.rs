//! Login / signup / logout
//!
//! Tokens are issued here and revoked here; the gateway only ever reads the
//! revocation store.

use crate::db::MemberRepository;
use crate::error::{MemberError, Result};
use crate::models::{LoginRequest, NewMember, SignupRequest};
use crate::security::password;
use crypto_core::hash::fingerprint;
use crypto_core::{TokenCodec, BEARER_PREFIX};
use jwt_security::TokenBlacklist;
use std::sync::Arc;
use tracing::{info, warn};

pub struct AuthService {
    members: Arc<dyn MemberRepository>,
    codec: TokenCodec,
    blacklist: Arc<dyn TokenBlacklist>,
}

impl AuthService {
    pub fn new(
        members: Arc<dyn MemberRepository>,
        codec: TokenCodec,
        blacklist: Arc<dyn TokenBlacklist>,
    ) -> Self {
        Self {
            members,
            codec,
            blacklist,
        }
    }

    /// Create an account and issue its first token
    pub async fn signup(&self, req: SignupRequest) -> Result<String> {
        if self.members.find_by_username(&req.id).await?.is_some() {
            return Err(MemberError::DuplicateAccount);
        }

        let password_hash = password::hash_password(&req.password)?;
        let member = self
            .members
            .create(NewMember {
                username: req.id,
                password: password_hash,
                role: req.role,
            })
            .await?;

        info!(user_id = member.user_id, role = %member.role, "Member signed up");
        Ok(self.codec.issue(member.user_id, member.role)?)
    }

    pub async fn login(&self, req: LoginRequest) -> Result<String> {
        let Some(member) = self.members.find_by_username(&req.id).await? else {
            password::verify_dummy(&req.password);
            info!(reason = "unknown_identifier", "Login rejected");
            return Err(MemberError::InvalidCredential);
        };

        if !password::verify_password(&req.password, &member.password)? {
            info!(reason = "password_mismatch", user_id = member.user_id, "Login rejected");
            return Err(MemberError::InvalidCredential);
        }

        Ok(self.codec.issue(member.user_id, member.role)?)
    }

    /// Revoke the bearer token in `authorization` for the rest of its lifetime
    ///
    /// Tokens that are already expired, or whose signature does not verify,
    /// are not written to the store.
    pub async fn logout(&self, authorization: &str) -> Result<()> {
        let token = authorization
            .strip_prefix(BEARER_PREFIX)
            .unwrap_or(authorization)
            .trim();

        let remaining = match self.codec.remaining_lifetime(token) {
            Ok(remaining) => remaining,
            Err(err) => {
                warn!(
                    reason = err.kind(),
                    token = %fingerprint(token),
                    "Logout with unverifiable token, nothing revoked"
                );
                return Ok(());
            }
        };

        self.blacklist.revoke(token, remaining).await?;
        Ok(())
    }
}
