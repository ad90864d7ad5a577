/// Error types for member-service
///
/// Every variant renders as an `ApiResponse` envelope with `status: "FAIL"`.
/// Internal failures never leak their details to the client.
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use crypto_core::TokenError;
use error_types::ApiResponse;
use jwt_security::BlacklistError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, MemberError>;

#[derive(Debug, Error)]
pub enum MemberError {
    #[error("Account already exists")]
    DuplicateAccount,

    /// Unknown identifier and wrong password share this variant
    #[error("Invalid credentials")]
    InvalidCredential,

    #[error("Member not found")]
    MemberNotFound,

    #[error("No authorization header")]
    MissingCredential,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Revocation store error: {0}")]
    Revocation(#[from] BlacklistError),

    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ResponseError for MemberError {
    fn status_code(&self) -> StatusCode {
        match self {
            MemberError::DuplicateAccount => StatusCode::CONFLICT,
            MemberError::InvalidCredential | MemberError::MissingCredential => {
                StatusCode::UNAUTHORIZED
            }
            MemberError::MemberNotFound => StatusCode::NOT_FOUND,
            MemberError::Validation(_) => StatusCode::BAD_REQUEST,
            MemberError::Database(_)
            | MemberError::Revocation(_)
            | MemberError::Token(_)
            | MemberError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            MemberError::Database(_)
            | MemberError::Revocation(_)
            | MemberError::Token(_)
            | MemberError::Internal(_) => {
                tracing::error!(error = %self, "Request failed");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code()).json(ApiResponse::error(message))
    }
}

// Conversions from external error types
impl From<sqlx::Error> for MemberError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return MemberError::DuplicateAccount;
            }
        }
        tracing::error!("Database error: {}", err);
        MemberError::Database(err.to_string())
    }
}

impl From<validator::ValidationErrors> for MemberError {
    fn from(err: validator::ValidationErrors) -> Self {
        MemberError::Validation(err.to_string())
    }
}
