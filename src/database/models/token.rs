use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Opaque bearer credential, one per user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Token {
    pub key: String,
    pub user_id: i64,
    pub created: DateTime<Utc>,
}
