//! SQLite-backed group and member store

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use tokio::sync::Mutex;

use crate::application::errors::StorageError;
use crate::domain::entities::{CardSet, Group, Member};
use crate::domain::traits::MemberStore;

const MEMBER_COLUMNS: &str = "id, group_id, user_id, have_mask, need_mask, version";
const GROUP_COLUMNS: &str = "id, team_id, team_name, bot_user_id, bot_token";

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        Self::from_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StorageError> {
        init_tables(&conn)?;
        Ok(Self { conn: Mutex::new(conn) })
    }
}

fn init_tables(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS teams (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            team_id TEXT UNIQUE NOT NULL,
            team_name TEXT NOT NULL,
            bot_user_id TEXT,
            bot_token TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    // have_mask / need_mask: bit i-1 is card i
    conn.execute(
        "CREATE TABLE IF NOT EXISTS members (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            group_id INTEGER NOT NULL,
            user_id TEXT NOT NULL,
            have_mask INTEGER NOT NULL DEFAULT 0,
            need_mask INTEGER NOT NULL DEFAULT 0,
            version INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE (group_id, user_id),
            FOREIGN KEY (group_id) REFERENCES teams(id)
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_members_group ON members(group_id)",
        [],
    )?;

    Ok(())
}

fn group_from_row(row: &Row<'_>) -> rusqlite::Result<Group> {
    Ok(Group {
        id: row.get(0)?,
        external_id: row.get(1)?,
        name: row.get(2)?,
        bot_user_id: row.get(3)?,
        bot_token: row.get(4)?,
    })
}

fn member_from_row(row: &Row<'_>) -> rusqlite::Result<Member> {
    Ok(Member {
        id: row.get(0)?,
        group_id: row.get(1)?,
        user_id: row.get(2)?,
        have: CardSet::from_mask(row.get::<_, i64>(3)? as u32),
        need: CardSet::from_mask(row.get::<_, i64>(4)? as u32),
        version: row.get(5)?,
    })
}

fn select_member(conn: &Connection, group_id: i64, user_id: &str) -> rusqlite::Result<Option<Member>> {
    conn.query_row(
        &format!("SELECT {} FROM members WHERE group_id = ?1 AND user_id = ?2", MEMBER_COLUMNS),
        params![group_id, user_id],
        member_from_row,
    )
    .optional()
}

#[async_trait]
impl MemberStore for SqliteStore {
    async fn find_group(&self, external_id: &str) -> Result<Option<Group>, StorageError> {
        let conn = self.conn.lock().await;
        let group = conn
            .query_row(
                &format!("SELECT {} FROM teams WHERE team_id = ?1", GROUP_COLUMNS),
                [external_id],
                group_from_row,
            )
            .optional()?;
        Ok(group)
    }

    async fn save_group(&self, group: &Group) -> Result<Group, StorageError> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO teams (team_id, team_name, bot_user_id, bot_token) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(team_id) DO UPDATE SET
                team_name = excluded.team_name,
                bot_user_id = excluded.bot_user_id,
                bot_token = excluded.bot_token",
            params![group.external_id, group.name, group.bot_user_id, group.bot_token],
        )?;

        let saved = conn.query_row(
            &format!("SELECT {} FROM teams WHERE team_id = ?1", GROUP_COLUMNS),
            [&group.external_id],
            group_from_row,
        )?;
        Ok(saved)
    }

    async fn list_groups(&self) -> Result<Vec<Group>, StorageError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(&format!("SELECT {} FROM teams ORDER BY id", GROUP_COLUMNS))?;
        let rows = stmt.query_map([], group_from_row)?;

        let mut groups = Vec::new();
        for group in rows {
            groups.push(group?);
        }
        Ok(groups)
    }

    async fn find_member(&self, group: &Group, user_id: &str) -> Result<Option<Member>, StorageError> {
        let conn = self.conn.lock().await;
        Ok(select_member(&conn, group.id, user_id)?)
    }

    async fn create_member(&self, group: &Group, user_id: &str) -> Result<Member, StorageError> {
        let conn = self.conn.lock().await;
        // A concurrent creator may have won; reuse its row
        conn.execute(
            "INSERT INTO members (group_id, user_id) VALUES (?1, ?2)
             ON CONFLICT(group_id, user_id) DO NOTHING",
            params![group.id, user_id],
        )?;

        select_member(&conn, group.id, user_id)?
            .ok_or_else(|| StorageError::NotFound(user_id.to_string()))
    }

    async fn list_members(&self, group: &Group) -> Result<Vec<Member>, StorageError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM members WHERE group_id = ?1 ORDER BY id",
            MEMBER_COLUMNS
        ))?;
        let rows = stmt.query_map([group.id], member_from_row)?;

        let mut members = Vec::new();
        for member in rows {
            members.push(member?);
        }
        Ok(members)
    }

    async fn commit(&self, member: &Member) -> Result<Member, StorageError> {
        let conn = self.conn.lock().await;
        let updated = conn.execute(
            "UPDATE members SET have_mask = ?1, need_mask = ?2, version = version + 1
             WHERE id = ?3 AND version = ?4",
            params![
                member.have.to_mask() as i64,
                member.need.to_mask() as i64,
                member.id,
                member.version
            ],
        )?;

        if updated == 0 {
            return Err(StorageError::Conflict {
                user_id: member.user_id.clone(),
                version: member.version,
            });
        }

        Ok(Member {
            version: member.version + 1,
            ..member.clone()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store_with_group() -> (SqliteStore, Group) {
        let store = SqliteStore::open_in_memory().unwrap();
        let group = store
            .save_group(&Group::new("T1", "Acme", "xoxb-1").with_bot_user("UBOT"))
            .await
            .unwrap();
        (store, group)
    }

    #[tokio::test]
    async fn test_group_upsert_keeps_id() {
        let (store, group) = store_with_group().await;
        let updated = store.save_group(&Group::new("T1", "Acme Inc", "xoxb-2")).await.unwrap();

        assert_eq!(updated.id, group.id);
        assert_eq!(updated.bot_token, "xoxb-2");
        assert_eq!(store.list_groups().await.unwrap().len(), 1);
        assert!(store.find_group("T2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_member_is_idempotent() {
        let (store, group) = store_with_group().await;
        let first = store.create_member(&group, "U1").await.unwrap();
        let again = store.create_member(&group, "U1").await.unwrap();

        assert_eq!(first.id, again.id);
        assert!(first.is_idle());
        assert_eq!(store.list_members(&group).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_commit_roundtrips_flags() {
        let (store, group) = store_with_group().await;
        let member = store.create_member(&group, "U1").await.unwrap();

        let edited = member.clone().with_have([1, 18]).with_need([7]);
        let committed = store.commit(&edited).await.unwrap();
        assert_eq!(committed.version, 1);

        let loaded = store.find_member(&group, "U1").await.unwrap().unwrap();
        assert_eq!(loaded, committed);
    }

    #[tokio::test]
    async fn test_stale_commit_conflicts() {
        let (store, group) = store_with_group().await;
        let member = store.create_member(&group, "U1").await.unwrap();

        store.commit(&member.clone().with_have([1])).await.unwrap();
        let err = store.commit(&member.with_have([2])).await.unwrap_err();
        assert!(matches!(err, StorageError::Conflict { version: 0, .. }));

        let loaded = store.find_member(&group, "U1").await.unwrap().unwrap();
        assert_eq!(loaded.have.iter().collect::<Vec<_>>(), vec![1]);
    }

    #[tokio::test]
    async fn test_members_listed_in_creation_order() {
        let (store, group) = store_with_group().await;
        for user in ["UC", "UA", "UB"] {
            store.create_member(&group, user).await.unwrap();
        }

        let users: Vec<String> = store
            .list_members(&group)
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.user_id)
            .collect();
        assert_eq!(users, vec!["UC", "UA", "UB"]);
    }
}
