use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{debug, info};

use crate::database::manager::DatabaseError;
use crate::database::models::{Entry, EntryChanges, NewEntry, Token, User};
use crate::database::store::JournalStore;

/// Statements run at startup; each is idempotent.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id            BIGSERIAL PRIMARY KEY,
        username      VARCHAR(150) NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        date_joined   TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS tokens (
        key     VARCHAR(40) PRIMARY KEY,
        user_id BIGINT NOT NULL UNIQUE REFERENCES users (id) ON DELETE CASCADE,
        created TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS entries (
        id            BIGSERIAL PRIMARY KEY,
        user_id       BIGINT NOT NULL REFERENCES users (id) ON DELETE CASCADE,
        text          VARCHAR(255) NOT NULL CHECK (text <> ''),
        notes         TEXT NOT NULL DEFAULT '',
        date_created  TIMESTAMPTZ NOT NULL,
        date_modified TIMESTAMPTZ NOT NULL,
        CHECK (date_created <= date_modified)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS entries_user_created_idx ON entries (user_id, date_created)",
];

const ENTRY_COLUMNS: &str = "id, user_id, text, notes, date_created, date_modified";

/// PostgreSQL-backed journal store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create tables and indexes that do not exist yet
    pub async fn ensure_schema(&self) -> Result<(), DatabaseError> {
        for statement in SCHEMA {
            sqlx::query(*statement).execute(&self.pool).await?;
        }
        info!("Journal schema is up to date");
        Ok(())
    }
}

fn map_unique_violation(err: sqlx::Error, username: &str) -> DatabaseError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            // users_username_key; a token key clash stays a generic error
            if db_err.constraint().map_or(true, |c| c.starts_with("users")) {
                return DatabaseError::DuplicateUsername(username.to_string());
            }
            DatabaseError::Sqlx(err)
        }
        _ => DatabaseError::Sqlx(err),
    }
}

#[async_trait]
impl JournalStore for PgStore {
    async fn create_user_with_token(
        &self,
        username: &str,
        password_hash: &str,
        token_key: &str,
    ) -> Result<(User, Token), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (username, password_hash)
             VALUES ($1, $2)
             RETURNING id, username, password_hash, date_joined",
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_unique_violation(e, username))?;

        let token = sqlx::query_as::<_, Token>(
            "INSERT INTO tokens (key, user_id)
             VALUES ($1, $2)
             RETURNING key, user_id, created",
        )
        .bind(token_key)
        .bind(user.id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        debug!("Created user {} with token", user.id);
        Ok((user, token))
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, date_joined FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_user_by_token(&self, token_key: &str) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT u.id, u.username, u.password_hash, u.date_joined
             FROM tokens t
             JOIN users u ON u.id = t.user_id
             WHERE t.key = $1",
        )
        .bind(token_key)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn token_for_user(&self, user_id: i64) -> Result<Option<Token>, DatabaseError> {
        let token = sqlx::query_as::<_, Token>(
            "SELECT key, user_id, created FROM tokens WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(token)
    }

    async fn issue_token_if_missing(&self, user_id: i64, token_key: &str) -> Result<Token, DatabaseError> {
        sqlx::query("INSERT INTO tokens (key, user_id) VALUES ($1, $2) ON CONFLICT (user_id) DO NOTHING")
            .bind(token_key)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        self.token_for_user(user_id)
            .await?
            .ok_or_else(|| DatabaseError::QueryError(format!("no user with id {}", user_id)))
    }

    async fn count_tokens(&self) -> Result<i64, DatabaseError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tokens")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.0)
    }

    async fn list_entries(&self, owner: i64) -> Result<Vec<Entry>, DatabaseError> {
        let sql = format!("SELECT {} FROM entries WHERE user_id = $1 ORDER BY id", ENTRY_COLUMNS);
        let entries = sqlx::query_as::<_, Entry>(&sql)
            .bind(owner)
            .fetch_all(&self.pool)
            .await?;
        Ok(entries)
    }

    async fn entries_created_between(
        &self,
        owner: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Entry>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM entries
             WHERE user_id = $1 AND date_created >= $2 AND date_created < $3
             ORDER BY id",
            ENTRY_COLUMNS
        );
        let entries = sqlx::query_as::<_, Entry>(&sql)
            .bind(owner)
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await?;
        Ok(entries)
    }

    async fn get_entry(&self, owner: i64, id: i64) -> Result<Option<Entry>, DatabaseError> {
        let sql = format!("SELECT {} FROM entries WHERE id = $1 AND user_id = $2", ENTRY_COLUMNS);
        let entry = sqlx::query_as::<_, Entry>(&sql)
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?;
        Ok(entry)
    }

    async fn insert_entry(&self, entry: NewEntry) -> Result<Entry, DatabaseError> {
        let sql = format!(
            "INSERT INTO entries (user_id, text, notes, date_created, date_modified)
             VALUES ($1, $2, $3, $4, $4)
             RETURNING {}",
            ENTRY_COLUMNS
        );
        let row = sqlx::query_as::<_, Entry>(&sql)
            .bind(entry.user_id)
            .bind(&entry.text)
            .bind(&entry.notes)
            .bind(entry.created_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn update_entry(
        &self,
        owner: i64,
        id: i64,
        changes: EntryChanges,
        now: DateTime<Utc>,
    ) -> Result<Option<Entry>, DatabaseError> {
        let sql = format!(
            "UPDATE entries
             SET text = COALESCE($3, text),
                 notes = COALESCE($4, notes),
                 date_modified = GREATEST($5, date_modified)
             WHERE id = $1 AND user_id = $2
             RETURNING {}",
            ENTRY_COLUMNS
        );
        let row = sqlx::query_as::<_, Entry>(&sql)
            .bind(id)
            .bind(owner)
            .bind(changes.text)
            .bind(changes.notes)
            .bind(now)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn delete_entry(&self, owner: i64, id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM entries WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_entries(&self) -> Result<i64, DatabaseError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM entries")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.0)
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
