/// Business logic layer for member-service
pub mod auth;
pub mod member;

pub use auth::AuthService;
pub use member::MemberService;
