pub mod members;

pub use members::{InMemoryMemberRepository, MemberRepository, PgMemberRepository};
