use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use log::*;
use sq_common::Secret;

use crate::{
    db_types::{NewUser, User},
    traits::{AuthApiError, UserManagement},
};

/// `AuthApi` handles user registration, credential checks and profile lookups.
///
/// Passwords are hashed with Argon2 before they ever touch the database, and only the hash is stored.
#[derive(Debug, Clone)]
pub struct AuthApi<B> {
    db: B,
}

impl<B> AuthApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> AuthApi<B>
where B: UserManagement
{
    /// Registers a new user. The password is hashed and discarded; only the hash is stored.
    pub async fn register(
        &self,
        email: &str,
        password: Secret<String>,
        name: &str,
        phone: &str,
    ) -> Result<User, AuthApiError> {
        let password_hash = hash_password(password.reveal())?;
        let user = NewUser {
            email: email.trim().to_lowercase(),
            password_hash,
            name: name.to_string(),
            phone: phone.to_string(),
        };
        let user = self.db.create_user(user).await?;
        info!("🔐️ New user registered: {}", user.id);
        Ok(user)
    }

    /// Checks the given credentials, returning the user on success.
    ///
    /// An unknown email and a wrong password fail identically, so callers cannot probe which emails are
    /// registered.
    pub async fn login(&self, email: &str, password: Secret<String>) -> Result<User, AuthApiError> {
        let email = email.trim().to_lowercase();
        let user = self.db.fetch_user_by_email(&email).await?.ok_or(AuthApiError::InvalidCredentials)?;
        if verify_password(&user.password_hash, password.reveal())? {
            debug!("🔐️ User {} logged in", user.id);
            Ok(user)
        } else {
            Err(AuthApiError::InvalidCredentials)
        }
    }

    pub async fn profile(&self, user_id: &str) -> Result<User, AuthApiError> {
        self.db.fetch_user_by_id(user_id).await?.ok_or(AuthApiError::UserNotFound)
    }
}

pub fn hash_password(password: &str) -> Result<String, AuthApiError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthApiError::PasswordHashError(e.to_string()))?;
    Ok(hash.to_string())
}

pub fn verify_password(stored_hash: &str, password: &str) -> Result<bool, AuthApiError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|e| AuthApiError::PasswordHashError(e.to_string()))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AuthApiError::PasswordHashError(e.to_string())),
    }
}
