use embryotech_core::{AppError, hash_password_with_cost, verify_password};
use embryotech_models::{LoginRequest, LoginResponse, NewUser, RegisterUserDto, User};
use validator::Validate;

use crate::metrics::{
    track_jwt_issued, track_login_failure, track_login_success, track_user_registered,
};
use crate::state::AppState;

pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid username or password";

pub struct AuthService;

impl AuthService {
    /// Creates a non-admin account. Administrators are promoted afterwards
    /// or bootstrapped from the CLI.
    pub async fn register(state: &AppState, dto: RegisterUserDto) -> Result<User, AppError> {
        dto.validate()?;

        let password_hash =
            hash_password_with_cost(&dto.password, state.password_config.bcrypt_cost)?;

        let user = state
            .users
            .create(NewUser {
                username: dto.username.trim().to_string(),
                email: dto.email.trim().to_lowercase(),
                password_hash,
                is_admin: false,
            })
            .await?;

        track_user_registered();
        Ok(user)
    }

    /// Checks credentials and signs a token. Unknown users and wrong
    /// passwords fail identically and both pay for one bcrypt check.
    pub async fn login(state: &AppState, dto: &LoginRequest) -> Result<LoginResponse, AppError> {
        if let Err(errors) = dto.validate() {
            track_login_failure("validation");
            return Err(errors.into());
        }

        let user = match state.users.find_by_username(dto.username.trim()).await? {
            Some(user) => Some(user).filter(|u| verify_password(&dto.password, &u.password_hash)),
            None => {
                state.login_decoy.verify(&dto.password);
                None
            }
        };

        let Some(user) = user else {
            track_login_failure("invalid_credentials");
            return Err(AppError::unauthenticated(INVALID_CREDENTIALS_MESSAGE));
        };

        let issued = state.tokens.issue(user.id.into_inner(), user.is_admin)?;
        track_jwt_issued();
        track_login_success();

        Ok(LoginResponse {
            token: issued.token,
            expires_at: issued.expires_at,
            user,
        })
    }
}
