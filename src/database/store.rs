use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::database::manager::DatabaseError;
use crate::database::models::{Entry, EntryChanges, NewEntry, Token, User};

/// Persistence seam for users, tokens and entries.
///
/// Every entry operation takes the owner id and only ever sees that owner's
/// rows: an entry belonging to someone else behaves exactly like a missing one.
#[async_trait]
pub trait JournalStore: Send + Sync {
    /// Persist a user together with its token. Either both rows become
    /// visible or neither does.
    async fn create_user_with_token(
        &self,
        username: &str,
        password_hash: &str,
        token_key: &str,
    ) -> Result<(User, Token), DatabaseError>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError>;

    /// Resolve a bearer token to its user
    async fn find_user_by_token(&self, token_key: &str) -> Result<Option<User>, DatabaseError>;

    async fn token_for_user(&self, user_id: i64) -> Result<Option<Token>, DatabaseError>;

    /// Bind `token_key` to the user unless it already has a token; returns
    /// whichever token the user ends up with.
    async fn issue_token_if_missing(&self, user_id: i64, token_key: &str) -> Result<Token, DatabaseError>;

    async fn count_tokens(&self) -> Result<i64, DatabaseError>;

    async fn list_entries(&self, owner: i64) -> Result<Vec<Entry>, DatabaseError>;

    /// Entries of `owner` with `start <= date_created < end`
    async fn entries_created_between(
        &self,
        owner: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Entry>, DatabaseError>;

    async fn get_entry(&self, owner: i64, id: i64) -> Result<Option<Entry>, DatabaseError>;

    async fn insert_entry(&self, entry: NewEntry) -> Result<Entry, DatabaseError>;

    /// Returns `None` when the entry does not exist for this owner
    async fn update_entry(
        &self,
        owner: i64,
        id: i64,
        changes: EntryChanges,
        now: DateTime<Utc>,
    ) -> Result<Option<Entry>, DatabaseError>;

    /// Returns whether a row was removed
    async fn delete_entry(&self, owner: i64, id: i64) -> Result<bool, DatabaseError>;

    async fn count_entries(&self) -> Result<i64, DatabaseError>;

    async fn ping(&self) -> Result<(), DatabaseError>;
}
