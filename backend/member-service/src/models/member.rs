use crypto_core::Role;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use validator::{Validate, ValidationError};

const BLANK_ID: &str = "아이디가 빈 값일수는 없습니다.";
const BLANK_PASSWORD: &str = "비밀번호는 빈 값일 수 없습니다.";

fn rejection(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

fn id_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(rejection("blank", BLANK_ID));
    }
    Ok(())
}

fn password_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(rejection("blank", BLANK_PASSWORD));
    }
    Ok(())
}

/// `ADMIN` is granted out of band, never through public signup
fn self_assignable_role(role: &Role) -> Result<(), ValidationError> {
    match role {
        Role::User | Role::Trainer => Ok(()),
        Role::Admin => Err(rejection(
            "role_not_allowed",
            "ADMIN 권한으로는 가입할 수 없습니다.",
        )),
    }
}

/// Stored credential record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub user_id: i64,
    pub username: String,
    /// Argon2id PHC string
    pub password: String,
    pub role: Role,
}

/// Insert payload; the store assigns `user_id`
#[derive(Debug, Clone)]
pub struct NewMember {
    pub username: String,
    pub password: String,
    pub role: Role,
}

/// Signup request (`id` is the login identifier)
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(custom(function = "id_not_blank"))]
    pub id: String,

    #[validate(custom(function = "password_not_blank"))]
    pub password: String,

    #[validate(custom(function = "self_assignable_role"))]
    pub role: Role,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(custom(function = "id_not_blank"))]
    pub id: String,

    #[validate(custom(function = "password_not_blank"))]
    pub password: String,
}

/// Body of `GET /member`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberInfo {
    pub user_id: i64,
    pub username: String,
    pub role: Role,
}

impl From<Member> for MemberInfo {
    fn from(member: Member) -> Self {
        Self {
            user_id: member.user_id,
            username: member.username,
            role: member.role,
        }
    }
}
