//! In-memory storage implementation

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::traits::MemberStore;
use crate::domain::entities::{Group, Member};
use crate::application::errors::StorageError;

/// In-process store, used by the console adapter and tests
#[derive(Default)]
pub struct MemoryStore {
    groups: Arc<RwLock<Vec<Group>>>,
    // Insertion order doubles as enumeration order
    members: Arc<RwLock<Vec<Member>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MemberStore for MemoryStore {
    async fn find_group(&self, external_id: &str) -> Result<Option<Group>, StorageError> {
        let groups = self.groups.read().await;
        Ok(groups.iter().find(|g| g.external_id == external_id).cloned())
    }

    async fn save_group(&self, group: &Group) -> Result<Group, StorageError> {
        let mut groups = self.groups.write().await;
        if let Some(existing) = groups.iter_mut().find(|g| g.external_id == group.external_id) {
            let id = existing.id;
            *existing = Group { id, ..group.clone() };
            return Ok(existing.clone());
        }

        let saved = Group { id: groups.len() as i64 + 1, ..group.clone() };
        groups.push(saved.clone());
        Ok(saved)
    }

    async fn list_groups(&self) -> Result<Vec<Group>, StorageError> {
        Ok(self.groups.read().await.clone())
    }

    async fn find_member(&self, group: &Group, user_id: &str) -> Result<Option<Member>, StorageError> {
        let members = self.members.read().await;
        Ok(members
            .iter()
            .find(|m| m.group_id == group.id && m.user_id == user_id)
            .cloned())
    }

    async fn create_member(&self, group: &Group, user_id: &str) -> Result<Member, StorageError> {
        let mut members = self.members.write().await;
        if let Some(existing) = members.iter().find(|m| m.group_id == group.id && m.user_id == user_id) {
            return Ok(existing.clone());
        }

        let mut member = Member::new(group.id, user_id);
        member.id = members.len() as i64 + 1;
        members.push(member.clone());
        Ok(member)
    }

    async fn list_members(&self, group: &Group) -> Result<Vec<Member>, StorageError> {
        let members = self.members.read().await;
        Ok(members.iter().filter(|m| m.group_id == group.id).cloned().collect())
    }

    async fn commit(&self, member: &Member) -> Result<Member, StorageError> {
        let mut members = self.members.write().await;
        let stored = members
            .iter_mut()
            .find(|m| m.id == member.id)
            .ok_or_else(|| StorageError::NotFound(member.user_id.clone()))?;

        if stored.version != member.version {
            return Err(StorageError::Conflict {
                user_id: member.user_id.clone(),
                version: member.version,
            });
        }

        stored.have = member.have;
        stored.need = member.need;
        stored.version += 1;
        Ok(stored.clone())
    }
}
