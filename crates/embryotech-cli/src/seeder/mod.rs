//! Database seeding for development and load testing.
//!
//! Readings are generated in parallel with `rayon` and written in chunked
//! multi-row inserts inside one transaction.

mod admins;
mod models;
mod readings;

pub use admins::{create_admin, prepare_admin};
pub use models::{AdminSeed, ReadingSeed, ReadingSeedConfig};
pub use readings::{clear_readings, generate_readings, insert_readings_batch, seed_readings};
