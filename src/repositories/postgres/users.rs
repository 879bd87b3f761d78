use anyhow::Context;
use async_trait::async_trait;
use embryotech_core::AppError;
use embryotech_db::{PgPool, is_unique_violation, violated_constraint};
use embryotech_models::{NewUser, User, UserId};

use crate::repositories::UserRepository;

const USER_COLUMNS: &str = "id, username, email, password_hash, is_admin, created_at, updated_at";

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn conflict_for(err: &sqlx::Error) -> Option<AppError> {
    if !is_unique_violation(err) {
        return None;
    }

    let message = match violated_constraint(err).as_deref() {
        Some("users_email_key") => "Email already registered",
        _ => "Username already exists",
    };
    Some(AppError::conflict(message))
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch user by id")
            .map_err(AppError::database)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch user by username")
        .map_err(AppError::database)
    }

    async fn list(&self) -> Result<Vec<User>, AppError> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id"))
            .fetch_all(&self.pool)
            .await
            .context("Failed to fetch users")
            .map_err(AppError::database)
    }

    async fn create(&self, user: NewUser) -> Result<User, AppError> {
        let result = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, email, password_hash, is_admin)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.is_admin)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(user) => Ok(user),
            Err(err) => match conflict_for(&err) {
                Some(conflict) => Err(conflict),
                None => Err(AppError::database(
                    anyhow::Error::new(err).context("Failed to insert user"),
                )),
            },
        }
    }

    async fn update_password(
        &self,
        id: UserId,
        password_hash: &str,
    ) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users SET password_hash = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(password_hash)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to update password")
        .map_err(AppError::database)
    }

    async fn set_admin(&self, id: UserId, is_admin: bool) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users SET is_admin = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(is_admin)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to update admin flag")
        .map_err(AppError::database)
    }
}
