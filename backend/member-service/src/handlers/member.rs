use crate::error::Result;
use crate::services::MemberService;
use actix_middleware::TrustedIdentity;
use actix_web::{web, HttpResponse};
use error_types::ApiResponse;
use tracing::info;

/// `GET /member`: profile of the caller identified by the gateway
pub async fn get_information(
    members: web::Data<MemberService>,
    identity: TrustedIdentity,
) -> Result<HttpResponse> {
    info!(user_id = identity.user_id, role = %identity.role, "Member info requested");

    let info = members.get_information(identity.user_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(info)))
}
