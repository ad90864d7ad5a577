use crate::db::MemberRepository;
use crate::error::{MemberError, Result};
use crate::models::MemberInfo;
use std::sync::Arc;

pub struct MemberService {
    members: Arc<dyn MemberRepository>,
}

impl MemberService {
    pub fn new(members: Arc<dyn MemberRepository>) -> Self {
        Self { members }
    }

    pub async fn get_information(&self, user_id: i64) -> Result<MemberInfo> {
        self.members
            .find_by_id(user_id)
            .await?
            .map(MemberInfo::from)
            .ok_or(MemberError::MemberNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::InMemoryMemberRepository;
    use crate::models::NewMember;
    use crypto_core::Role;

    #[tokio::test]
    async fn test_get_information() {
        let repo = Arc::new(InMemoryMemberRepository::new());
        let member = repo
            .create(NewMember {
                username: "alice".to_string(),
                password: "hash".to_string(),
                role: Role::User,
            })
            .await
            .unwrap();
        let service = MemberService::new(repo);

        let info = service.get_information(member.user_id).await.unwrap();
        assert_eq!(info.username, "alice");
        assert_eq!(info.role, Role::User);

        let err = service.get_information(999).await.unwrap_err();
        assert!(matches!(err, MemberError::MemberNotFound));
    }
}
