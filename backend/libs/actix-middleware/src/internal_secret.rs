//! Internal-secret trust interceptor
//!
//! Every service behind the gateway wraps its protected scopes with
//! [`InternalSecretMiddleware`]. A request is accepted only when its
//! `X-Internal-Secret` header equals the deployment's shared secret; anything
//! else (including direct calls that bypass the gateway) gets a 403 before any
//! handler runs.
//!
//! ## Example
//! ```rust,ignore
//! use actix_middleware::InternalSecretMiddleware;
//! use actix_web::{web, App};
//!
//! let app = App::new().service(
//!     web::scope("/member")
//!         .wrap(InternalSecretMiddleware::new(config.internal_secret.clone()))
//!         .route("", web::get().to(get_member)),
//! );
//! ```

use crate::identity::{TrustVerified, X_INTERNAL_SECRET};
use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage, HttpResponse,
};
use crypto_core::hash::fingerprint;
use futures::future::{ready, LocalBoxFuture, Ready};
use std::sync::Arc;
use tracing::warn;

const REJECTION_BODY: &str = "Invalid Internal Secret";

/// Constant-time string comparison to prevent timing attacks
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    let a = a.as_bytes();
    let b = b.as_bytes();

    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

/// Rejects requests whose `X-Internal-Secret` does not match the configured value
#[derive(Clone)]
pub struct InternalSecretMiddleware {
    secret: Arc<str>,
}

impl InternalSecretMiddleware {
    pub fn new(secret: impl Into<Arc<str>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for InternalSecretMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = InternalSecretMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(InternalSecretMiddlewareService {
            service,
            secret: self.secret.clone(),
        }))
    }
}

pub struct InternalSecretMiddlewareService<S> {
    service: S,
    secret: Arc<str>,
}

impl<S, B> Service<ServiceRequest> for InternalSecretMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let presented = req
            .headers()
            .get(X_INTERNAL_SECRET)
            .and_then(|h| h.to_str().ok());

        let trusted = presented.is_some_and(|value| constant_time_compare(value, &self.secret));

        if !trusted {
            let reason = if presented.is_some() {
                "secret_mismatch"
            } else {
                "secret_missing"
            };
            warn!(
                reason,
                path = %req.path(),
                presented = %presented.map(fingerprint).unwrap_or_default(),
                "Blocked access with invalid internal secret"
            );
            let response = HttpResponse::Forbidden()
                .content_type("text/plain; charset=utf-8")
                .body(REJECTION_BODY);
            return Box::pin(ready(Ok(req.into_response(response).map_into_right_body())));
        }

        req.extensions_mut().insert(TrustVerified);

        let fut = self.service.call(req);
        Box::pin(async move { Ok(fut.await?.map_into_left_body()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{TrustedIdentity, X_USER_ID, X_USER_ROLE};
    use actix_web::{http::StatusCode, test, web, App, HttpResponse};

    const SECRET: &str = "gateway-internal-secret";

    async fn whoami(identity: TrustedIdentity) -> HttpResponse {
        HttpResponse::Ok().body(format!("{}:{}", identity.user_id, identity.role))
    }

    #[::core::prelude::v1::test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("secret", "secret"));
        assert!(!constant_time_compare("secret", "secreT"));
        assert!(!constant_time_compare("secret", "secret-longer"));
        assert!(!constant_time_compare("", "secret"));
    }

    #[actix_web::test]
    async fn test_matching_secret_reaches_handler() {
        let app = test::init_service(
            App::new()
                .wrap(InternalSecretMiddleware::new(SECRET))
                .route("/member", web::get().to(whoami)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/member")
            .insert_header((X_INTERNAL_SECRET, SECRET))
            .insert_header((X_USER_ID, "42"))
            .insert_header((X_USER_ROLE, "USER"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let body = test::read_body(resp).await;
        assert_eq!(body, "42:USER");
    }

    #[actix_web::test]
    async fn test_missing_secret_is_forbidden() {
        let app = test::init_service(
            App::new()
                .wrap(InternalSecretMiddleware::new(SECRET))
                .route("/member", web::get().to(whoami)),
        )
        .await;

        // Identity headers look legitimate, but the call bypassed the gateway
        let req = test::TestRequest::get()
            .uri("/member")
            .insert_header((X_USER_ID, "42"))
            .insert_header((X_USER_ROLE, "ADMIN"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        let body = test::read_body(resp).await;
        assert_eq!(body, REJECTION_BODY);
    }

    #[actix_web::test]
    async fn test_wrong_secret_is_forbidden() {
        let app = test::init_service(
            App::new()
                .wrap(InternalSecretMiddleware::new(SECRET))
                .route("/member", web::get().to(whoami)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/member")
            .insert_header((X_INTERNAL_SECRET, "gateway-internal-secreT"))
            .insert_header((X_USER_ID, "42"))
            .insert_header((X_USER_ROLE, "USER"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn test_extractor_without_middleware_is_forbidden() {
        let app = test::init_service(App::new().route("/member", web::get().to(whoami))).await;

        let req = test::TestRequest::get()
            .uri("/member")
            .insert_header((X_INTERNAL_SECRET, SECRET))
            .insert_header((X_USER_ID, "42"))
            .insert_header((X_USER_ROLE, "USER"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }
}
