/// Authentication handlers
use crate::error::{MemberError, Result};
use crate::models::{LoginRequest, SignupRequest};
use crate::services::AuthService;
use actix_web::{http::header, web, HttpRequest, HttpResponse};
use error_types::ApiResponse;
use validator::Validate;

/// `POST /auth/signup` → 201 with the new token
pub async fn signup(
    auth: web::Data<AuthService>,
    payload: web::Json<SignupRequest>,
) -> Result<HttpResponse> {
    let mut req = payload.into_inner();
    req.id = req.id.trim().to_string();
    req.validate()?;

    let token = auth.signup(req).await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(token)))
}

/// `POST /auth/login` → 200 with a fresh token
pub async fn login(
    auth: web::Data<AuthService>,
    payload: web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    let mut req = payload.into_inner();
    req.id = req.id.trim().to_string();
    req.validate()?;

    let token = auth.login(req).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(token)))
}

/// `POST /auth/logout` → 204
pub async fn logout(auth: web::Data<AuthService>, req: HttpRequest) -> Result<HttpResponse> {
    let authorization = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.trim().is_empty())
        .ok_or(MemberError::MissingCredential)?;

    auth.logout(authorization).await?;
    Ok(HttpResponse::NoContent().finish())
}
