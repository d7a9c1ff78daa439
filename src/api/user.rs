use serde::Serialize;
use serde_json::Value;

use crate::api::fields::{self, CharField};
use crate::database::models::User;
use crate::error::{ApiError, FieldErrors};

pub const USERNAME_MAX_LENGTH: usize = 150;

const USERNAME: CharField = CharField::new("username").max_length(USERNAME_MAX_LENGTH);
const PASSWORD: CharField = CharField::new("password").max_length(128).no_trim();

/// Public view of a user; credentials never appear here
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserView {
    pub id: i64,
    pub username: String,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterResponse {
    pub user: UserView,
    pub token: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Username and password pair, as posted to registration and token endpoints
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

fn valid_username_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_')
}

impl Credentials {
    /// Validate a registration payload, including the username alphabet
    pub fn for_registration(payload: &Value) -> Result<Self, ApiError> {
        Self::validate(payload, true)
    }

    /// Validate a token request; only presence is checked
    pub fn for_login(payload: &Value) -> Result<Self, ApiError> {
        Self::validate(payload, false)
    }

    fn validate(payload: &Value, check_alphabet: bool) -> Result<Self, ApiError> {
        let data = fields::payload_object(payload)?;
        let mut errors = FieldErrors::new();

        let username = USERNAME.read(data, false, &mut errors);
        let password = PASSWORD.read(data, false, &mut errors);

        if check_alphabet {
            if let Some(name) = &username {
                if !name.chars().all(valid_username_char) {
                    errors.insert(
                        "username".to_string(),
                        "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters."
                            .to_string(),
                    );
                }
            }
        }

        fields::check(errors)?;
        match (username, password) {
            (Some(username), Some(password)) => Ok(Self { username, password }),
            _ => Err(ApiError::validation_error("Invalid input", None)),
        }
    }
}
