use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

use crate::database::manager::DatabaseError;
use crate::database::models::{Entry, EntryChanges, NewEntry, Token, User};
use crate::database::store::JournalStore;

#[derive(Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    tokens: HashMap<String, Token>,
    entries: BTreeMap<i64, Entry>,
    next_user_id: i64,
    next_entry_id: i64,
}

impl Tables {
    fn token_of(&self, user_id: i64) -> Option<&Token> {
        self.tokens.values().find(|t| t.user_id == user_id)
    }
}

/// Process-local journal store. All tables sit behind one lock, so a user and
/// its token are always written together.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JournalStore for MemoryStore {
    async fn create_user_with_token(
        &self,
        username: &str,
        password_hash: &str,
        token_key: &str,
    ) -> Result<(User, Token), DatabaseError> {
        let mut tables = self.tables.write().await;

        if tables.users.values().any(|u| u.username == username) {
            return Err(DatabaseError::DuplicateUsername(username.to_string()));
        }
        if tables.tokens.contains_key(token_key) {
            return Err(DatabaseError::QueryError("token key collision".to_string()));
        }

        tables.next_user_id += 1;
        let now = Utc::now();
        let user = User {
            id: tables.next_user_id,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            date_joined: now,
        };
        let token = Token {
            key: token_key.to_string(),
            user_id: user.id,
            created: now,
        };

        tables.users.insert(user.id, user.clone());
        tables.tokens.insert(token.key.clone(), token.clone());
        Ok((user, token))
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.username == username).cloned())
    }

    async fn find_user_by_token(&self, token_key: &str) -> Result<Option<User>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .tokens
            .get(token_key)
            .and_then(|t| tables.users.get(&t.user_id))
            .cloned())
    }

    async fn token_for_user(&self, user_id: i64) -> Result<Option<Token>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.token_of(user_id).cloned())
    }

    async fn issue_token_if_missing(&self, user_id: i64, token_key: &str) -> Result<Token, DatabaseError> {
        let mut tables = self.tables.write().await;
        if let Some(existing) = tables.token_of(user_id) {
            return Ok(existing.clone());
        }
        let token = Token {
            key: token_key.to_string(),
            user_id,
            created: Utc::now(),
        };
        tables.tokens.insert(token.key.clone(), token.clone());
        Ok(token)
    }

    async fn count_tokens(&self) -> Result<i64, DatabaseError> {
        Ok(self.tables.read().await.tokens.len() as i64)
    }

    async fn list_entries(&self, owner: i64) -> Result<Vec<Entry>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .entries
            .values()
            .filter(|e| e.user_id == owner)
            .cloned()
            .collect())
    }

    async fn entries_created_between(
        &self,
        owner: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Entry>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .entries
            .values()
            .filter(|e| e.user_id == owner && e.date_created >= start && e.date_created < end)
            .cloned()
            .collect())
    }

    async fn get_entry(&self, owner: i64, id: i64) -> Result<Option<Entry>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.entries.get(&id).filter(|e| e.user_id == owner).cloned())
    }

    async fn insert_entry(&self, entry: NewEntry) -> Result<Entry, DatabaseError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&entry.user_id) {
            return Err(DatabaseError::QueryError(format!("no user with id {}", entry.user_id)));
        }

        tables.next_entry_id += 1;
        let row = Entry {
            id: tables.next_entry_id,
            user_id: entry.user_id,
            text: entry.text,
            notes: entry.notes,
            date_created: entry.created_at,
            date_modified: entry.created_at,
        };
        tables.entries.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update_entry(
        &self,
        owner: i64,
        id: i64,
        changes: EntryChanges,
        now: DateTime<Utc>,
    ) -> Result<Option<Entry>, DatabaseError> {
        let mut tables = self.tables.write().await;
        match tables.entries.get_mut(&id) {
            Some(entry) if entry.user_id == owner => {
                changes.apply(entry, now);
                Ok(Some(entry.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn delete_entry(&self, owner: i64, id: i64) -> Result<bool, DatabaseError> {
        let mut tables = self.tables.write().await;
        let owned = tables.entries.get(&id).map_or(false, |e| e.user_id == owner);
        if owned {
            tables.entries.remove(&id);
        }
        Ok(owned)
    }

    async fn count_entries(&self) -> Result<i64, DatabaseError> {
        Ok(self.tables.read().await.entries.len() as i64)
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}
