//! User domain methods on Repository

use super::Repository;
use crate::{
    error::AppResult,
    models::user::{Role, User, UserShort},
};

impl Repository {
    /// Get user by email (login identifier)
    pub async fn users_get_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE LOWER(email) = LOWER($1)",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Check if email already exists
    pub async fn users_email_exists(&self, email: &str) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(email) = LOWER($1))",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// List all users
    pub async fn users_list(&self) -> AppResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    /// Short representation of a quest owner
    pub async fn users_get_short(&self, id: i32) -> AppResult<Option<UserShort>> {
        let user = sqlx::query_as::<_, UserShort>("SELECT id, name, email FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Create a user with an already hashed password
    pub async fn users_create(&self, email: &str, password_hash: &str, role: Role, name: &str) -> AppResult<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash, role_id, name)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .bind(role.id())
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }
}
