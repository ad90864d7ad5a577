use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use error_types::ApiResponse;
use thiserror::Error;

/// Terminal outcomes of a gateway request other than a successful forward
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("No authorization header")]
    MissingCredential,

    #[error("Invalid Token")]
    InvalidToken,

    #[error("Logout Token (Blacklist)")]
    RevokedToken,

    /// Revocation store unreachable or too slow; the request is not forwarded
    #[error("Revocation check unavailable")]
    RevocationUnavailable,

    #[error("Invalid request path")]
    InvalidPath,

    #[error("No route")]
    NoRoute,

    #[error("Upstream unavailable: {0}")]
    Upstream(String),
}

impl GatewayError {
    /// Stable label for the `reason` log field
    pub fn reason(&self) -> &'static str {
        match self {
            GatewayError::MissingCredential => "missing_credential",
            GatewayError::InvalidToken => "invalid_token",
            GatewayError::RevokedToken => "revoked_token",
            GatewayError::RevocationUnavailable => "revocation_unavailable",
            GatewayError::InvalidPath => "invalid_path",
            GatewayError::NoRoute => "no_route",
            GatewayError::Upstream(_) => "upstream",
        }
    }
}

impl ResponseError for GatewayError {
    fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::MissingCredential
            | GatewayError::InvalidToken
            | GatewayError::RevokedToken => StatusCode::UNAUTHORIZED,
            GatewayError::RevocationUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            GatewayError::InvalidPath => StatusCode::BAD_REQUEST,
            GatewayError::NoRoute => StatusCode::NOT_FOUND,
            GatewayError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            GatewayError::Upstream(_) => "Upstream unavailable".to_string(),
            other => other.to_string(),
        };
        HttpResponse::build(self.status_code()).json(ApiResponse::error(message))
    }
}
