use thiserror::Error;

use crate::db_types::{NewUser, User};

#[derive(Debug, Clone, Error)]
pub enum AuthApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("A user with email {0} already exists")]
    EmailAlreadyRegistered(String),
    #[error("User not found")]
    UserNotFound,
    #[error("The email or password presented is incorrect")]
    InvalidCredentials,
    #[error("Could not hash the password: {0}")]
    PasswordHashError(String),
}

impl From<sqlx::Error> for AuthApiError {
    fn from(e: sqlx::Error) -> Self {
        AuthApiError::DatabaseError(e.to_string())
    }
}

/// Behaviour for registering and looking up user accounts.
#[allow(async_fn_in_trait)]
pub trait UserManagement: Clone {
    /// Creates a new user record. Fails with [`AuthApiError::EmailAlreadyRegistered`] when the email is taken.
    async fn create_user(&self, user: NewUser) -> Result<User, AuthApiError>;

    /// Fetches the user with the given email, or `None` if no such user exists.
    async fn fetch_user_by_email(&self, email: &str) -> Result<Option<User>, AuthApiError>;

    /// Fetches the user with the given id, or `None` if no such user exists.
    async fn fetch_user_by_id(&self, user_id: &str) -> Result<Option<User>, AuthApiError>;
}
