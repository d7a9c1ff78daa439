use std::sync::Arc;

use crate::auth::{self, PasswordError};
use crate::database::models::{Token, User};
use crate::database::{DatabaseError, JournalStore};

#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("Username already taken: {0}")]
    DuplicateUsername(String),
    #[error("Password hashing failed: {0}")]
    Hashing(String),
    #[error("Database error: {0}")]
    Database(DatabaseError),
}

impl From<DatabaseError> for UserError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::DuplicateUsername(name) => UserError::DuplicateUsername(name),
            other => UserError::Database(other),
        }
    }
}

impl From<PasswordError> for UserError {
    fn from(err: PasswordError) -> Self {
        UserError::Hashing(err.to_string())
    }
}

/// User creation and credential checks.
///
/// Every path that creates a user goes through [`UserService::create_user`],
/// which mints the user's token in the same store call.
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn JournalStore>,
}

impl UserService {
    pub fn new(store: Arc<dyn JournalStore>) -> Self {
        Self { store }
    }

    /// Create a user and its token atomically
    pub async fn create_user(&self, username: &str, password: &str) -> Result<(User, Token), UserError> {
        // Concurrent registrations are settled by the store's unique constraint
        if self.store.find_user_by_username(username).await?.is_some() {
            return Err(UserError::DuplicateUsername(username.to_string()));
        }

        let password_hash = hash_blocking(password.to_string()).await?;
        let token_key = auth::generate_token_key();

        let (user, token) = self
            .store
            .create_user_with_token(username, &password_hash, &token_key)
            .await?;

        tracing::info!("Registered user '{}' (id {})", user.username, user.id);
        Ok((user, token))
    }

    /// Check credentials and hand back the user's token. Returns `None` for an
    /// unknown user or a wrong password.
    pub async fn obtain_token(&self, username: &str, password: &str) -> Result<Option<Token>, UserError> {
        let Some(user) = self.store.find_user_by_username(username).await? else {
            tracing::debug!("Token request for unknown user '{}'", username);
            return Ok(None);
        };

        if !verify_blocking(password.to_string(), user.password_hash.clone()).await? {
            tracing::warn!("Token request with wrong password for user '{}'", username);
            return Ok(None);
        }

        let token = match self.store.token_for_user(user.id).await? {
            Some(token) => token,
            None => {
                self.store
                    .issue_token_if_missing(user.id, &auth::generate_token_key())
                    .await?
            }
        };
        Ok(Some(token))
    }
}

async fn hash_blocking(password: String) -> Result<String, UserError> {
    tokio::task::spawn_blocking(move || auth::hash_password(&password))
        .await
        .map_err(|e| UserError::Hashing(e.to_string()))?
        .map_err(UserError::from)
}

async fn verify_blocking(password: String, hash: String) -> Result<bool, UserError> {
    tokio::task::spawn_blocking(move || auth::verify_password(&password, &hash))
        .await
        .map_err(|e| UserError::Hashing(e.to_string()))?
        .map_err(UserError::from)
}
