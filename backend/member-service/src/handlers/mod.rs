/// HTTP handlers for member-service
pub mod auth;
pub mod member;

use crate::error::MemberError;
use actix_middleware::InternalSecretMiddleware;
use actix_web::{web, HttpResponse};

/// Register all routes
///
/// `/auth/*` is reachable without the internal secret; `/member` is not.
pub fn configure(cfg: &mut web::ServiceConfig, internal_secret: &str) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        MemberError::Validation(err.to_string()).into()
    }))
    .route("/health", web::get().to(health))
    .service(
        web::scope("/auth")
            .route("/signup", web::post().to(auth::signup))
            .route("/login", web::post().to(auth::login))
            .route("/logout", web::post().to(auth::logout)),
    )
    .service(
        web::scope("/member")
            .wrap(InternalSecretMiddleware::new(internal_secret))
            .route("", web::get().to(member::get_information)),
    );
}

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}
