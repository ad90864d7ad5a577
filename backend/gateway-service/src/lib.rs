//! API gateway: authorizes every request with the access token and the
//! revocation store, then proxies it to the owning service.

pub mod config;
pub mod error;
pub mod middleware;
pub mod proxy;
pub mod routes;

use actix_web::web;
use middleware::HEALTH_PATH;

/// Gateway routes; everything except health falls through to the proxy
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route(HEALTH_PATH, web::get().to(proxy::health))
        .default_service(web::to(proxy::forward));
}
