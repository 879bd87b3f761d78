//! PostgreSQL repositories built on a shared [`PgPool`].

mod audit;
mod parameters;
mod readings;
mod users;

pub use audit::PgAuditRepository;
pub use parameters::PgParameterRepository;
pub use readings::PgReadingRepository;
pub use users::PgUserRepository;

pub use embryotech_db::PgPool;
