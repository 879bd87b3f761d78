use anyhow::anyhow;
use embryotech_core::{AppError, hash_password_with_cost};
use embryotech_models::{ChangePasswordDto, User, UserId};
use validator::Validate;

use crate::state::AppState;

pub const SELF_DEMOTION_MESSAGE: &str = "Administrators cannot revoke their own admin role";

/// Outcome of an admin flag change, kept for the audit detail.
#[derive(Debug, Clone)]
pub struct RoleChange {
    pub before: bool,
    pub user: User,
}

pub struct UserService;

impl UserService {
    pub async fn list(state: &AppState) -> Result<Vec<User>, AppError> {
        state.users.list().await
    }

    async fn find(state: &AppState, id: UserId) -> Result<User, AppError> {
        state
            .users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("User not found")))
    }

    pub async fn change_password(
        state: &AppState,
        id: UserId,
        dto: ChangePasswordDto,
    ) -> Result<User, AppError> {
        Self::find(state, id).await?;
        dto.validate()?;

        let password_hash =
            hash_password_with_cost(&dto.new_password, state.password_config.bcrypt_cost)?;

        state
            .users
            .update_password(id, &password_hash)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("User not found")))
    }

    /// Sets the admin flag on `id`.
    ///
    /// The target must exist. An administrator may not clear their own flag;
    /// that is rejected before anything is written.
    pub async fn set_admin(
        state: &AppState,
        actor: &User,
        id: UserId,
        is_admin: bool,
    ) -> Result<RoleChange, AppError> {
        let target = Self::find(state, id).await?;

        if target.id == actor.id && !is_admin {
            return Err(AppError::invalid_operation(SELF_DEMOTION_MESSAGE));
        }

        let user = state
            .users
            .set_admin(id, is_admin)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("User not found")))?;

        Ok(RoleChange {
            before: target.is_admin,
            user,
        })
    }
}
