/// Data models for member-service
pub mod member;

pub use member::{LoginRequest, Member, MemberInfo, NewMember, SignupRequest};
