use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use chrono::Duration;
use crypto_core::TokenCodec;
use gateway_service::config::Config;
use gateway_service::middleware::AuthorizationFilter;
use gateway_service::proxy::ProxyState;
use jwt_security::{RedisTokenBlacklist, TokenBlacklist};
use redis_utils::RedisPool;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::prelude::*;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,gateway_service=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_thread_ids(true)
                .with_line_number(true)
                .with_file(true)
                .with_target(true),
        )
        .init();

    info!("Starting gateway-service...");

    let config = Config::from_env().context("Failed to load configuration")?;

    // The gateway only verifies tokens, it never issues them
    let codec = TokenCodec::new(&config.jwt_secret, Duration::zero())
        .context("JWT_SECRET rejected")?;

    let redis = RedisPool::connect(&config.redis.url).await?;
    let blacklist: Arc<dyn TokenBlacklist> = Arc::new(
        RedisTokenBlacklist::new(redis.manager(), config.redis.key_mode)
            .with_command_timeout(config.redis.command_timeout),
    );

    let routes = Arc::new(config.routes.clone());
    for route in routes.routes() {
        info!(
            prefix = %route.prefix,
            upstream = %route.upstream,
            public = route.public,
            "Route registered"
        );
    }

    let filter = AuthorizationFilter::new(codec, blacklist, routes.clone(), &config.internal_secret)
        .context("INTERNAL_SECRET_KEY is not a valid header value")?;
    let proxy = web::Data::new(
        ProxyState::new(routes, config.upstream_timeout)
            .context("Failed to build upstream HTTP client")?,
    );

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    info!(bind = %bind_addr, "gateway-service listening");

    HttpServer::new(move || {
        App::new()
            .wrap(filter.clone())
            .wrap(Logger::default())
            .app_data(proxy.clone())
            .configure(gateway_service::configure)
    })
    .workers(config.server.workers)
    .bind(&bind_addr)?
    .run()
    .await?;

    Ok(())
}
