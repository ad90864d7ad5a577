use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use crypto_core::TokenCodec;
use jwt_security::{RedisTokenBlacklist, TokenBlacklist};
use member_service::config::Config;
use member_service::db::{MemberRepository, PgMemberRepository};
use member_service::handlers;
use member_service::services::{AuthService, MemberService};
use redis_utils::RedisPool;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::prelude::*;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,member_service=debug".into()),
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

    info!("Starting member-service...");

    let config = Config::from_env().context("Failed to load configuration")?;

    let codec = TokenCodec::new(&config.jwt.secret, config.jwt.expiration)
        .context("JWT_SECRET rejected")?;

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await
        .context("Failed to connect to database")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;
    info!("Database migrations applied");

    let redis = RedisPool::connect(&config.redis.url).await?;
    let blacklist: Arc<dyn TokenBlacklist> = Arc::new(
        RedisTokenBlacklist::new(redis.manager(), config.redis.key_mode)
            .with_command_timeout(config.redis.command_timeout),
    );

    let members: Arc<dyn MemberRepository> = Arc::new(PgMemberRepository::new(pool));
    let auth = web::Data::new(AuthService::new(members.clone(), codec, blacklist));
    let member = web::Data::new(MemberService::new(members));

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    info!(
        bind = %bind_addr,
        key_mode = ?config.redis.key_mode,
        "member-service listening"
    );

    let internal_secret = config.internal_secret.clone();
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(auth.clone())
            .app_data(member.clone())
            .configure(|cfg| handlers::configure(cfg, &internal_secret))
    })
    .workers(config.server.workers)
    .bind(&bind_addr)?
    .run()
    .await?;

    Ok(())
}
