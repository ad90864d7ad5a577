/// Member credential storage
use crate::error::{MemberError, Result};
use crate::models::{Member, NewMember};
use async_trait::async_trait;
use crypto_core::Role;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use sqlx::PgPool;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

#[async_trait]
pub trait MemberRepository: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<Member>>;

    async fn find_by_id(&self, user_id: i64) -> Result<Option<Member>>;

    /// Insert a member; an existing username yields `MemberError::DuplicateAccount`
    async fn create(&self, member: NewMember) -> Result<Member>;
}

#[derive(Debug, sqlx::FromRow)]
struct MemberRow {
    user_id: i64,
    username: String,
    password: String,
    role: String,
}

impl TryFrom<MemberRow> for Member {
    type Error = MemberError;

    fn try_from(row: MemberRow) -> Result<Self> {
        let role = row
            .role
            .parse::<Role>()
            .map_err(|e| MemberError::Database(e.to_string()))?;

        Ok(Member {
            user_id: row.user_id,
            username: row.username,
            password: row.password,
            role,
        })
    }
}

/// PostgreSQL-backed repository over the `members` table
#[derive(Clone)]
pub struct PgMemberRepository {
    pool: PgPool,
}

impl PgMemberRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MemberRepository for PgMemberRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<Member>> {
        let row = sqlx::query_as::<_, MemberRow>(
            "SELECT user_id, username, password, role FROM members WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Member::try_from).transpose()
    }

    async fn find_by_id(&self, user_id: i64) -> Result<Option<Member>> {
        let row = sqlx::query_as::<_, MemberRow>(
            "SELECT user_id, username, password, role FROM members WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Member::try_from).transpose()
    }

    async fn create(&self, member: NewMember) -> Result<Member> {
        // UNIQUE(username) makes the duplicate check atomic
        let row = sqlx::query_as::<_, MemberRow>(
            r#"
            INSERT INTO members (username, password, role)
            VALUES ($1, $2, $3)
            RETURNING user_id, username, password, role
            "#,
        )
        .bind(&member.username)
        .bind(&member.password)
        .bind(member.role.as_str())
        .fetch_one(&self.pool)
        .await?;

        Member::try_from(row)
    }
}

/// Process-local repository for single-node runs and tests
#[derive(Clone, Default)]
pub struct InMemoryMemberRepository {
    members: Arc<DashMap<String, Member>>,
    next_id: Arc<AtomicI64>,
}

impl InMemoryMemberRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MemberRepository for InMemoryMemberRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<Member>> {
        Ok(self.members.get(username).map(|m| m.value().clone()))
    }

    async fn find_by_id(&self, user_id: i64) -> Result<Option<Member>> {
        Ok(self
            .members
            .iter()
            .find(|m| m.user_id == user_id)
            .map(|m| m.value().clone()))
    }

    async fn create(&self, member: NewMember) -> Result<Member> {
        match self.members.entry(member.username.clone()) {
            Entry::Occupied(_) => Err(MemberError::DuplicateAccount),
            Entry::Vacant(slot) => {
                let stored = Member {
                    user_id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
                    username: member.username,
                    password: member.password,
                    role: member.role,
                };
                slot.insert(stored.clone());
                Ok(stored)
            }
        }
    }
}
