//! # Embryotech CLI
//!
//! Administrative and seeding utilities for the Embryotech database.
//!
//! ## Usage
//!
//! ```ignore
//! use embryotech_cli::seeder::{seed_readings, ReadingSeedConfig};
//!
//! let config = ReadingSeedConfig::new(3, 200); // 3 batches, 200 readings each
//! seed_readings(&pool, &config).await?;
//! ```

pub mod seeder;
