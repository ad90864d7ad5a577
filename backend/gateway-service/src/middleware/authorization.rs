//! Gateway authorization filter
//!
//! Per request, in order:
//! 1. `Authorization: Bearer <token>` present, else 401 "No authorization header"
//! 2. token signature and expiry verify, else 401 "Invalid Token"
//! 3. token not in the revocation store, else 401 "Logout Token (Blacklist)"
//! 4. client-supplied identity headers replaced by `x-user-id`, `x-user-role`
//!    and `x-internal-secret`
//! 5. forward
//!
//! Step 3 is awaited, never blocked on, and step 4 only runs once its answer
//! is known. A revocation store that cannot answer fails the request with 503.

use crate::error::GatewayError;
use crate::routes::{is_canonical_path, RouteTable};
use actix_middleware::{X_INTERNAL_SECRET, X_USER_ID, X_USER_ROLE};
use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{self, HeaderMap, HeaderName, HeaderValue, InvalidHeaderValue},
    Error, ResponseError,
};
use crypto_core::hash::fingerprint;
use crypto_core::{Role, TokenCodec, BEARER_PREFIX};
use futures_util::future::{ready, LocalBoxFuture, Ready};
use jwt_security::TokenBlacklist;
use std::rc::Rc;
use std::sync::Arc;
use tracing::{debug, error, warn};

pub const HEALTH_PATH: &str = "/health";

struct FilterState {
    codec: TokenCodec,
    blacklist: Arc<dyn TokenBlacklist>,
    routes: Arc<RouteTable>,
    internal_secret: HeaderValue,
}

/// Authorization filter shared by every worker
#[derive(Clone)]
pub struct AuthorizationFilter {
    state: Arc<FilterState>,
}

impl AuthorizationFilter {
    pub fn new(
        codec: TokenCodec,
        blacklist: Arc<dyn TokenBlacklist>,
        routes: Arc<RouteTable>,
        internal_secret: &str,
    ) -> Result<Self, InvalidHeaderValue> {
        let mut internal_secret = HeaderValue::from_str(internal_secret)?;
        internal_secret.set_sensitive(true);

        Ok(Self {
            state: Arc::new(FilterState {
                codec,
                blacklist,
                routes,
                internal_secret,
            }),
        })
    }
}

impl FilterState {
    /// Steps 1-3; yields the identity to inject
    async fn authorize(&self, headers: &HeaderMap) -> Result<(i64, Role), GatewayError> {
        let token = headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix(BEARER_PREFIX))
            .ok_or(GatewayError::MissingCredential)?;

        if !self.codec.validate(token) {
            return Err(GatewayError::InvalidToken);
        }

        match self.blacklist.is_revoked(token).await {
            Ok(false) => {}
            Ok(true) => return Err(GatewayError::RevokedToken),
            Err(err) => {
                error!(error = %err, token = %fingerprint(token), "Revocation check failed");
                return Err(GatewayError::RevocationUnavailable);
            }
        }

        let user_id = self
            .codec
            .subject_of(token)
            .map_err(|_| GatewayError::InvalidToken)?;
        let role = self
            .codec
            .role_of(token)
            .map_err(|_| GatewayError::InvalidToken)?;

        Ok((user_id, role))
    }

    /// Drop whatever identity the client sent and attach the internal secret
    fn reset_identity(&self, headers: &mut HeaderMap) {
        headers.remove(X_USER_ID);
        headers.remove(X_USER_ROLE);
        headers.insert(
            HeaderName::from_static(X_INTERNAL_SECRET),
            self.internal_secret.clone(),
        );
    }

    fn enrich(&self, headers: &mut HeaderMap, user_id: i64, role: Role) {
        self.reset_identity(headers);
        headers.insert(HeaderName::from_static(X_USER_ID), HeaderValue::from(user_id));
        headers.insert(
            HeaderName::from_static(X_USER_ROLE),
            HeaderValue::from_static(role.as_str()),
        );
    }
}

fn reject<B>(
    req: ServiceRequest,
    err: GatewayError,
    path: &str,
) -> ServiceResponse<EitherBody<B>> {
    warn!(
        reason = err.reason(),
        path = %path,
        "Gateway filter rejected request: {}",
        err
    );
    req.into_response(err.error_response()).map_into_right_body()
}

impl<S, B> Transform<S, ServiceRequest> for AuthorizationFilter
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthorizationFilterService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthorizationFilterService {
            service: Rc::new(service),
            state: self.state.clone(),
        }))
    }
}

pub struct AuthorizationFilterService<S> {
    service: Rc<S>,
    state: Arc<FilterState>,
}

impl<S, B> Service<ServiceRequest> for AuthorizationFilterService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, mut req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let state = self.state.clone();

        Box::pin(async move {
            let path = req.path().to_string();

            // Route matching and the upstream URL must see the same path
            if !is_canonical_path(&path) {
                return Ok(reject(req, GatewayError::InvalidPath, &path));
            }

            if path == HEALTH_PATH {
                return Ok(service.call(req).await?.map_into_left_body());
            }

            // Unknown prefixes fall through to the proxy's 404
            let public = match state.routes.resolve(&path) {
                Some(route) => route.public,
                None => return Ok(service.call(req).await?.map_into_left_body()),
            };

            if public {
                state.reset_identity(req.headers_mut());
                return Ok(service.call(req).await?.map_into_left_body());
            }

            match state.authorize(req.headers()).await {
                Ok((user_id, role)) => {
                    debug!(user_id, role = %role, path = %path, "Request authorized");
                    state.enrich(req.headers_mut(), user_id, role);
                    Ok(service.call(req).await?.map_into_left_body())
                }
                Err(err) => Ok(reject(req, err, &path)),
            }
        })
    }
}
