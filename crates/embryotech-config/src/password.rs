use crate::env_or;

/// bcrypt's own default work factor.
pub const DEFAULT_BCRYPT_COST: u32 = 12;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PasswordConfig {
    pub bcrypt_cost: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            bcrypt_cost: DEFAULT_BCRYPT_COST,
        }
    }
}

impl PasswordConfig {
    /// Reads `BCRYPT_COST`, keeping it inside bcrypt's accepted range (4..=31).
    pub fn from_env() -> Self {
        Self {
            bcrypt_cost: env_or("BCRYPT_COST", DEFAULT_BCRYPT_COST).clamp(4, 31),
        }
    }
}
