use chrono::Utc;
use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewUser, User},
    helpers::new_record_id,
    traits::AuthApiError,
};

pub async fn create_user(user: NewUser, conn: &mut SqliteConnection) -> Result<User, AuthApiError> {
    if fetch_user_by_email(&user.email, conn).await?.is_some() {
        return Err(AuthApiError::EmailAlreadyRegistered(user.email));
    }
    let created: User = sqlx::query_as(
        r#"
            INSERT INTO users (id, email, password_hash, name, phone, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *;
        "#,
    )
    .bind(new_record_id())
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(&user.name)
    .bind(&user.phone)
    .bind(Utc::now())
    .fetch_one(conn)
    .await?;
    debug!("🗃️ User {} registered", created.id);
    Ok(created)
}

pub async fn fetch_user_by_email(email: &str, conn: &mut SqliteConnection) -> Result<Option<User>, sqlx::Error> {
    let user = sqlx::query_as("SELECT * FROM users WHERE email = $1").bind(email).fetch_optional(conn).await?;
    Ok(user)
}

pub async fn fetch_user_by_id(user_id: &str, conn: &mut SqliteConnection) -> Result<Option<User>, sqlx::Error> {
    let user = sqlx::query_as("SELECT * FROM users WHERE id = $1").bind(user_id).fetch_optional(conn).await?;
    Ok(user)
}
