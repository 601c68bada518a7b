use std::sync::Arc;

use crate::domain::{NewUser, User};
use crate::error::{DomainError, ValidationErrors};
use crate::ports::{PasswordService, TokenService, UserRepository};

/// An issued access token.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: i64,
    pub token: String,
    pub expires_in: i64,
}

/// Moderator accounts: sign-in and account creation.
pub struct AccountService {
    users: Arc<dyn UserRepository>,
    passwords: Arc<dyn PasswordService>,
    tokens: Arc<dyn TokenService>,
}

impl AccountService {
    pub const MIN_PASSWORD_LEN: usize = 8;

    pub fn new(
        users: Arc<dyn UserRepository>,
        passwords: Arc<dyn PasswordService>,
        tokens: Arc<dyn TokenService>,
    ) -> Self {
        Self {
            users,
            passwords,
            tokens,
        }
    }

    pub fn tokens(&self) -> &Arc<dyn TokenService> {
        &self.tokens
    }

    /// Check credentials and issue a token.
    pub async fn login(&self, username: &str, password: &str) -> Result<Session, DomainError> {
        let Some(user) = self.users.find_by_username(username).await? else {
            tracing::warn!(username, "Login rejected: unknown user");
            return Err(DomainError::InvalidCredentials);
        };

        let valid = self
            .passwords
            .verify(password, &user.password_hash)
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        if !valid {
            tracing::warn!(user_id = user.id, "Login rejected: wrong password");
            return Err(DomainError::InvalidCredentials);
        }

        let token = self
            .tokens
            .generate_token(user.id, &user.username)
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        tracing::info!(user_id = user.id, "User logged in");
        Ok(Session {
            user_id: user.id,
            token,
            expires_in: self.tokens.expiration_seconds(),
        })
    }

    /// Create a moderator account.
    pub async fn register(&self, username: &str, password: &str) -> Result<User, DomainError> {
        let username = username.trim();
        let mut errors = ValidationErrors::new();
        if username.is_empty() {
            errors.add("username", "This field is required.");
        }
        if password.chars().count() < Self::MIN_PASSWORD_LEN {
            errors.add(
                "password",
                format!(
                    "Password must be at least {} characters.",
                    Self::MIN_PASSWORD_LEN
                ),
            );
        }
        errors.into_result()?;

        if self.users.find_by_username(username).await?.is_some() {
            return Err(DomainError::Duplicate(format!(
                "username '{username}' is taken"
            )));
        }

        let password_hash = self
            .passwords
            .hash(password)
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        let user = self
            .users
            .create(NewUser::new(username.to_string(), password_hash))
            .await?;

        tracing::info!(user_id = user.id, "User registered");
        Ok(user)
    }
}
