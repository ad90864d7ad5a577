/// Shared bearer-token codec for fitlog services
///
/// Tokens are compact HS256 JWTs carrying the member id in `sub`, the member
/// role in a custom `role` claim, plus `iat` and `exp`. member-service issues
/// them; the gateway validates them. Both build a `TokenCodec` from the same
/// `JWT_SECRET` at startup and hand it to their components by reference.
///
/// ## Contract
///
/// - `validate` never fails loudly: every failure is classified
///   (`TokenError`), logged, and collapsed into `false`.
/// - A token is valid iff its signature verifies and `now < exp`.
/// - `subject_of`, `role_of` and `remaining_lifetime` verify the signature but
///   ignore expiry, so logout can size a revocation entry for any genuine token.
use crate::hash::fingerprint;
use crate::secret::{validate_secret_strength, SecretError, SecretStrength};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info, warn};

// ============================================================================
// Constants
// ============================================================================

/// Authorization scheme prefix, including the separating space
pub const BEARER_PREFIX: &str = "Bearer ";

const JWT_ALGORITHM: Algorithm = Algorithm::HS256;

// ============================================================================
// Data Structures
// ============================================================================

/// Member role carried in the `role` claim and the `X-User-Role` header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    User,
    Trainer,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Trainer => "TRAINER",
            Role::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USER" => Ok(Role::User),
            "TRAINER" => Ok(Role::Trainer),
            "ADMIN" => Ok(Role::Admin),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// JWT Claims structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (member id as decimal string)
    pub sub: String,
    /// Member role
    pub role: Role,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Member id parsed from `sub`
    pub fn user_id(&self) -> Result<i64, TokenError> {
        self.sub.parse().map_err(|_| TokenError::Malformed)
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

/// Why a token was refused
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("JWT claims string is empty")]
    Empty,

    #[error("Invalid JWT token")]
    Malformed,

    #[error("Expired JWT token")]
    Expired,

    #[error("Unsupported JWT token")]
    Unsupported,

    #[error("JWT signature does not match")]
    InvalidSignature,

    #[error("Failed to sign token: {0}")]
    Encoding(String),
}

impl TokenError {
    /// Stable label for structured logs
    pub fn kind(&self) -> &'static str {
        match self {
            TokenError::Empty => "empty",
            TokenError::Malformed => "malformed",
            TokenError::Expired => "expired",
            TokenError::Unsupported => "unsupported",
            TokenError::InvalidSignature => "invalid_signature",
            TokenError::Encoding(_) => "encoding",
        }
    }
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidAlgorithm
            | ErrorKind::InvalidAlgorithmName
            | ErrorKind::MissingAlgorithm
            | ErrorKind::InvalidKeyFormat => TokenError::Unsupported,
            _ => TokenError::Malformed,
        }
    }
}

// ============================================================================
// Codec
// ============================================================================

/// Issues and verifies bearer tokens with a single symmetric key
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &JWT_ALGORITHM)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    /// Build a codec from the shared signing secret
    ///
    /// ## Errors
    ///
    /// Returns `SecretError` if the secret fails strength validation.
    pub fn new(secret: &str, ttl: Duration) -> Result<Self, SecretError> {
        match validate_secret_strength(secret)? {
            SecretStrength::Strong => {}
            SecretStrength::Acceptable => {
                warn!("JWT secret meets the minimum but is shorter than the recommended 64 bytes");
            }
        }

        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        })
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for `user_id` with `role`, valid for the configured TTL
    pub fn issue(&self, user_id: i64, role: Role) -> Result<String, TokenError> {
        self.issue_at(user_id, role, Utc::now())
    }

    pub fn issue_at(
        &self,
        user_id: i64,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = Claims {
            sub: user_id.to_string(),
            role,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        encode(&Header::new(JWT_ALGORITHM), &claims, &self.encoding)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }

    /// Fully validate a token and return its claims
    pub fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        self.decode_at(token, Utc::now())
    }

    pub fn decode_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let claims = self.peek(token)?;
        if now.timestamp() >= claims.exp {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }

    /// `true` iff the signature verifies and the token has not expired
    pub fn validate(&self, token: &str) -> bool {
        self.validate_at(token, Utc::now())
    }

    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> bool {
        match self.decode_at(token, now) {
            Ok(_) => true,
            Err(err) => {
                log_rejection(token, &err);
                false
            }
        }
    }

    /// Member id of a token whose signature verifies
    pub fn subject_of(&self, token: &str) -> Result<i64, TokenError> {
        self.peek(token)?.user_id()
    }

    /// Role of a token whose signature verifies
    pub fn role_of(&self, token: &str) -> Result<Role, TokenError> {
        Ok(self.peek(token)?.role)
    }

    /// `exp - now`; negative once the token has expired
    pub fn remaining_lifetime(&self, token: &str) -> Result<Duration, TokenError> {
        self.remaining_lifetime_at(token, Utc::now())
    }

    pub fn remaining_lifetime_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Duration, TokenError> {
        let claims = self.peek(token)?;
        Ok(claims.expires_at() - now)
    }

    /// Verify signature and structure only; expiry is left to the caller
    fn peek(&self, token: &str) -> Result<Claims, TokenError> {
        if token.trim().is_empty() {
            return Err(TokenError::Empty);
        }

        let mut validation = Validation::new(JWT_ALGORITHM);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["sub", "exp"]);

        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        Ok(data.claims)
    }
}

fn log_rejection(token: &str, err: &TokenError) {
    match err {
        TokenError::Expired => {
            info!(kind = err.kind(), token = %fingerprint(token), "Expired JWT token");
        }
        TokenError::Empty => debug!(kind = err.kind(), "JWT claims string is empty"),
        _ => {
            info!(kind = err.kind(), token = %fingerprint(token), "{}", err);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
