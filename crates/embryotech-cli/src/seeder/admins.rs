//! Bootstrap administrator creation.
//!
//! Registration over HTTP only ever creates regular users, so the first
//! administrator has to come from here.

use anyhow::{Context, bail};
use embryotech_config::PasswordConfig;
use embryotech_core::hash_password_with_cost;
use embryotech_db::{is_unique_violation, violated_constraint};
use embryotech_models::{NewUser, RegisterUserDto, UserId};
use sqlx::PgPool;
use validator::Validate;

use super::models::AdminSeed;

/// Validates `seed` with the same rules as registration and hashes the
/// password at the configured bcrypt cost.
pub fn prepare_admin(seed: &AdminSeed, password: &PasswordConfig) -> anyhow::Result<NewUser> {
    let dto = RegisterUserDto {
        username: seed.username.trim().to_string(),
        email: seed.email.trim().to_lowercase(),
        password: seed.password.clone(),
    };
    dto.validate().context("invalid administrator details")?;

    let password_hash =
        hash_password_with_cost(&dto.password, password.bcrypt_cost).map_err(|e| e.error)?;

    Ok(NewUser {
        username: dto.username,
        email: dto.email,
        password_hash,
        is_admin: true,
    })
}

/// Inserts the administrator described by `seed`.
pub async fn create_admin(
    db: &PgPool,
    seed: &AdminSeed,
    password: &PasswordConfig,
) -> anyhow::Result<UserId> {
    let admin = prepare_admin(seed, password)?;

    let result = sqlx::query_scalar::<_, UserId>(
        r#"
        INSERT INTO users (username, email, password_hash, is_admin)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        "#,
    )
    .bind(&admin.username)
    .bind(&admin.email)
    .bind(&admin.password_hash)
    .bind(admin.is_admin)
    .fetch_one(db)
    .await;

    match result {
        Ok(id) => Ok(id),
        Err(err) if is_unique_violation(&err) => {
            match violated_constraint(&err).as_deref() {
                Some("users_email_key") => bail!("email {} is already registered", seed.email),
                _ => bail!("username {} already exists", seed.username),
            }
        }
        Err(err) => Err(err).context("failed to insert administrator"),
    }
}
