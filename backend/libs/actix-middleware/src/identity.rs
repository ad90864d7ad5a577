//! Gateway-injected identity headers
//!
//! Handlers must only read these through [`TrustedIdentity`], which refuses to
//! extract anything unless [`InternalSecretMiddleware`](crate::InternalSecretMiddleware)
//! has already accepted the request.

use actix_web::{
    dev::Payload, http::StatusCode, FromRequest, HttpMessage, HttpRequest, HttpResponse,
    ResponseError,
};
use crypto_core::Role;
use futures::future::{ready, Ready};
use thiserror::Error;

// Lowercase so they can be used with `HeaderName::from_static`
pub const X_USER_ID: &str = "x-user-id";
pub const X_USER_ROLE: &str = "x-user-role";
pub const X_INTERNAL_SECRET: &str = "x-internal-secret";

/// Request-extension marker set once the internal secret matched
#[derive(Debug, Clone, Copy)]
pub struct TrustVerified;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Invalid Internal Secret")]
    Untrusted,

    #[error("Missing request header '{0}'")]
    MissingHeader(&'static str),

    #[error("Invalid request header '{0}'")]
    InvalidHeader(&'static str),
}

impl ResponseError for IdentityError {
    fn status_code(&self) -> StatusCode {
        match self {
            IdentityError::Untrusted => StatusCode::FORBIDDEN,
            IdentityError::MissingHeader(_) | IdentityError::InvalidHeader(_) => {
                StatusCode::BAD_REQUEST
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .content_type("text/plain; charset=utf-8")
            .body(self.to_string())
    }
}

/// Caller identity as asserted by the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrustedIdentity {
    pub user_id: i64,
    pub role: Role,
}

impl TrustedIdentity {
    fn from_headers(req: &HttpRequest) -> Result<Self, IdentityError> {
        if req.extensions().get::<TrustVerified>().is_none() {
            return Err(IdentityError::Untrusted);
        }

        let user_id = header_str(req, X_USER_ID)?
            .parse::<i64>()
            .map_err(|_| IdentityError::InvalidHeader(X_USER_ID))?;
        let role = header_str(req, X_USER_ROLE)?
            .parse::<Role>()
            .map_err(|_| IdentityError::InvalidHeader(X_USER_ROLE))?;

        Ok(Self { user_id, role })
    }
}

fn header_str<'a>(req: &'a HttpRequest, name: &'static str) -> Result<&'a str, IdentityError> {
    req.headers()
        .get(name)
        .ok_or(IdentityError::MissingHeader(name))?
        .to_str()
        .map_err(|_| IdentityError::InvalidHeader(name))
}

impl FromRequest for TrustedIdentity {
    type Error = IdentityError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Self::from_headers(req))
    }
}
