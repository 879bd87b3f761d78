use std::sync::Arc;

use embryotech_auth::TokenService;
use embryotech_config::{AppConfig, AuditConfig, CorsConfig, PasswordConfig, RateLimitConfig};
use embryotech_core::{DecoyHash, SharedClock, SystemClock};
use embryotech_db::PgPool;

use crate::audit::AuditRecorder;
use crate::repositories::postgres::{
    PgAuditRepository, PgParameterRepository, PgReadingRepository, PgUserRepository,
};
use crate::repositories::{ParameterRepository, ReadingRepository, UserRepository};

/// Everything a request needs, built once at startup and cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub readings: Arc<dyn ReadingRepository>,
    pub parameters: Arc<dyn ParameterRepository>,
    pub recorder: AuditRecorder,
    pub tokens: Arc<TokenService>,
    pub clock: SharedClock,
    pub cors_config: CorsConfig,
    pub rate_limit_config: RateLimitConfig,
    pub audit_config: AuditConfig,
    pub password_config: PasswordConfig,
    pub login_decoy: Arc<DecoyHash>,
}

impl AppState {
    pub fn from_pool(pool: PgPool, config: &AppConfig) -> Self {
        let clock: SharedClock = Arc::new(SystemClock);

        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            readings: Arc::new(PgReadingRepository::new(pool.clone())),
            parameters: Arc::new(PgParameterRepository::new(pool.clone())),
            recorder: AuditRecorder::new(Arc::new(PgAuditRepository::new(pool)), clock.clone()),
            tokens: Arc::new(TokenService::new(&config.jwt, clock.clone())),
            clock,
            cors_config: config.cors.clone(),
            rate_limit_config: config.rate_limit.clone(),
            audit_config: config.audit.clone(),
            password_config: config.password.clone(),
            login_decoy: Arc::new(DecoyHash::new(config.password.bcrypt_cost)),
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("tokens", &self.tokens)
            .field("cors_config", &self.cors_config)
            .field("rate_limit_config", &self.rate_limit_config)
            .field("audit_config", &self.audit_config)
            .finish_non_exhaustive()
    }
}

#[cfg(any(test, feature = "test-utils"))]
mod in_memory {
    use std::sync::Arc;

    use embryotech_auth::TokenService;
    use embryotech_config::{
        AuditConfig, CorsConfig, JwtConfig, PasswordConfig, RateLimitConfig,
    };
    use embryotech_core::{DecoyHash, SharedClock};

    use super::AppState;
    use crate::audit::AuditRecorder;
    use crate::repositories::{AuditRepository, ReadingRepository, UserRepository};
    use crate::repositories::memory::{
        MemoryAuditRepository, MemoryParameterRepository, MemoryReadingRepository,
        MemoryUserRepository,
    };

    /// Handles to the in-memory stores behind a test [`AppState`].
    pub struct MemoryStores {
        pub users: Arc<MemoryUserRepository>,
        pub readings: Arc<MemoryReadingRepository>,
        pub parameters: Arc<MemoryParameterRepository>,
        pub audit: Arc<MemoryAuditRepository>,
    }

    impl AppState {
        /// State backed by in-memory stores, with throttling off and the
        /// cheapest bcrypt cost.
        pub fn in_memory(jwt: &JwtConfig, clock: SharedClock) -> (Self, MemoryStores) {
            let stores = MemoryStores {
                users: Arc::new(MemoryUserRepository::new(clock.clone())),
                readings: Arc::new(MemoryReadingRepository::new()),
                parameters: Arc::new(MemoryParameterRepository::new(clock.clone())),
                audit: Arc::new(MemoryAuditRepository::new()),
            };

            let state = Self {
                users: stores.users.clone(),
                readings: stores.readings.clone(),
                parameters: stores.parameters.clone(),
                recorder: AuditRecorder::new(stores.audit.clone(), clock.clone()),
                tokens: Arc::new(TokenService::new(jwt, clock.clone())),
                clock,
                cors_config: CorsConfig::from_list("*"),
                rate_limit_config: RateLimitConfig::disabled(),
                audit_config: AuditConfig::default(),
                password_config: PasswordConfig { bcrypt_cost: 4 },
                login_decoy: Arc::new(DecoyHash::new(4)),
            };

            (state, stores)
        }

        pub fn with_audit_store(mut self, store: Arc<dyn AuditRepository>) -> Self {
            self.recorder = AuditRecorder::new(store, self.clock.clone());
            self
        }

        pub fn with_user_store(mut self, store: Arc<dyn UserRepository>) -> Self {
            self.users = store;
            self
        }

        pub fn with_reading_store(mut self, store: Arc<dyn ReadingRepository>) -> Self {
            self.readings = store;
            self
        }

        pub fn with_rate_limit(mut self, config: RateLimitConfig) -> Self {
            self.rate_limit_config = config;
            self
        }
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub use in_memory::MemoryStores;
