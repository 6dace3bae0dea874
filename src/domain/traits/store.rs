use async_trait::async_trait;
use crate::application::errors::StorageError;
use crate::domain::entities::{Group, Member};

/// Store trait - abstraction for group and member persistence
#[async_trait]
pub trait MemberStore: Send + Sync {
    // Group operations
    async fn find_group(&self, external_id: &str) -> Result<Option<Group>, StorageError>;
    /// Insert or update a group by external id (install flow)
    async fn save_group(&self, group: &Group) -> Result<Group, StorageError>;
    async fn list_groups(&self) -> Result<Vec<Group>, StorageError>;

    // Member operations
    async fn find_member(&self, group: &Group, user_id: &str) -> Result<Option<Member>, StorageError>;
    async fn create_member(&self, group: &Group, user_id: &str) -> Result<Member, StorageError>;
    /// Members of a group in enumeration (creation) order
    async fn list_members(&self, group: &Group) -> Result<Vec<Member>, StorageError>;

    /// Persist a member's flags atomically. Fails with `StorageError::Conflict`
    /// when `member.version` is stale; returns the committed snapshot.
    async fn commit(&self, member: &Member) -> Result<Member, StorageError>;
}
