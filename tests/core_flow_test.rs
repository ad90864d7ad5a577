//! Core Flow Integration Tests
//!
//! Purpose: Verify the token lifecycle across the gateway and member-service
//! Dependencies: none (in-memory member repository and revocation store)
//!
//! Test Coverage:
//! 1. Signup / login through the gateway's public `/auth` route
//! 2. Gateway injects the trusted identity for `/member`
//! 3. Logout revokes the token; the gateway then rejects it
//! 4. Expired tokens are rejected without touching the revocation store
//! 5. Direct calls that bypass the gateway hit the trust boundary
//!
//! Run: cargo test --test core_flow_test

use actix_web::{http::StatusCode, test, web, App, HttpServer};
use chrono::{Duration, Utc};
use crypto_core::{Role, TokenCodec};
use gateway_service::middleware::AuthorizationFilter;
use gateway_service::proxy::ProxyState;
use gateway_service::routes::RouteTable;
use jwt_security::{InMemoryTokenBlacklist, KeyMode, TokenBlacklist};
use member_service::db::{InMemoryMemberRepository, MemberRepository};
use member_service::handlers;
use member_service::services::{AuthService, MemberService};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;

const JWT_SECRET: &str = "Qm9vTrP3kLw7xNc2Hj8VbF5dGs1ZaYe6Ut4RpK0sWq7EhJ3nMx9CvB2gLf5DiA8o";
const INTERNAL_SECRET: &str = "core-flow-internal-secret";

/// Boot a real member-service sharing `blacklist` with the gateway
fn spawn_member_service(blacklist: InMemoryTokenBlacklist) -> SocketAddr {
    let codec = TokenCodec::new(JWT_SECRET, Duration::hours(1)).unwrap();
    let members: Arc<dyn MemberRepository> = Arc::new(InMemoryMemberRepository::new());
    let auth = web::Data::new(AuthService::new(
        members.clone(),
        codec,
        Arc::new(blacklist),
    ));
    let member = web::Data::new(MemberService::new(members));

    let server = HttpServer::new(move || {
        App::new()
            .app_data(auth.clone())
            .app_data(member.clone())
            .configure(|cfg| handlers::configure(cfg, INTERNAL_SECRET))
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .unwrap();

    let addr = server.addrs()[0];
    actix_web::rt::spawn(server.run());
    addr
}

macro_rules! gateway {
    ($member:expr, $blacklist:expr) => {{
        let routes = Arc::new(
            RouteTable::parse(&format!(
                "/auth=http://{};public,/member=http://{}",
                $member, $member
            ))
            .unwrap(),
        );
        test::init_service(
            App::new()
                .wrap(
                    AuthorizationFilter::new(
                        TokenCodec::new(JWT_SECRET, Duration::zero()).unwrap(),
                        Arc::new($blacklist.clone()),
                        routes.clone(),
                        INTERNAL_SECRET,
                    )
                    .unwrap(),
                )
                .app_data(web::Data::new(
                    ProxyState::new(routes, std::time::Duration::from_secs(5)).unwrap(),
                ))
                .configure(gateway_service::configure),
        )
        .await
    }};
}

#[actix_web::test]
async fn test_signup_access_logout_then_blacklisted() {
    let blacklist = InMemoryTokenBlacklist::new(KeyMode::Raw);
    let member = spawn_member_service(blacklist.clone());
    let gateway = gateway!(member, blacklist);

    // Login before the account exists
    let req = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({"id": "alice", "password": "pw123"}))
        .to_request();
    let resp = test::call_service(&gateway, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Invalid credentials");

    // Signup
    let req = test::TestRequest::post()
        .uri("/auth/signup")
        .set_json(json!({"id": "alice", "password": "pw123", "role": "USER"}))
        .to_request();
    let resp = test::call_service(&gateway, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    let token = body["data"].as_str().unwrap().to_string();

    // Protected route with the fresh token
    let req = test::TestRequest::get()
        .uri("/member")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let resp = test::call_service(&gateway, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["username"], "alice");
    assert_eq!(body["data"]["role"], "USER");

    // Logout
    let req = test::TestRequest::post()
        .uri("/auth/logout")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let resp = test::call_service(&gateway, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(blacklist.is_revoked(&token).await.unwrap());

    // Same token is now refused at the gateway
    let req = test::TestRequest::get()
        .uri("/member")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let resp = test::call_service(&gateway, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Logout Token (Blacklist)");

    // Logging in again yields a token the gateway accepts
    let req = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({"id": "alice", "password": "pw123"}))
        .to_request();
    let resp = test::call_service(&gateway, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    let fresh = body["data"].as_str().unwrap().to_string();

    // Tokens issued within the same second for the same claims are identical
    if fresh != token {
        let req = test::TestRequest::get()
            .uri("/member")
            .insert_header(("Authorization", format!("Bearer {fresh}")))
            .to_request();
        let resp = test::call_service(&gateway, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }
}

#[actix_web::test]
async fn test_expired_token_rejected_without_revocation_entry() {
    let blacklist = InMemoryTokenBlacklist::new(KeyMode::Raw);
    let member = spawn_member_service(blacklist.clone());
    let gateway = gateway!(member, blacklist);

    let expired = TokenCodec::new(JWT_SECRET, Duration::hours(1))
        .unwrap()
        .issue_at(1, Role::User, Utc::now() - Duration::hours(1) - Duration::seconds(1))
        .unwrap();

    let req = test::TestRequest::get()
        .uri("/member")
        .insert_header(("Authorization", format!("Bearer {expired}")))
        .to_request();
    let resp = test::call_service(&gateway, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Invalid Token");
    assert!(blacklist.is_empty());
}

#[actix_web::test]
async fn test_direct_call_bypassing_gateway_is_forbidden() {
    let member = spawn_member_service(InMemoryTokenBlacklist::default());
    let client = reqwest::Client::new();

    // Identity headers alone are worthless without the internal secret
    let resp = client
        .get(format!("http://{member}/member"))
        .header("x-user-id", "1")
        .header("x-user-role", "ADMIN")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);
    assert_eq!(resp.text().await.unwrap(), "Invalid Internal Secret");

    let resp = client
        .get(format!("http://{member}/member"))
        .header("x-user-id", "1")
        .header("x-user-role", "ADMIN")
        .header("x-internal-secret", "guessed")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);
}
