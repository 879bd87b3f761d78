//! Seed data and configuration structures.

use chrono::{DateTime, Utc};

/// One fake reading ready to be inserted.
#[derive(Debug, Clone)]
pub struct ReadingSeed {
    pub humidity: f64,
    pub temperature: f64,
    pub pressure: Option<f64>,
    pub batch: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
}

/// How many readings to generate and how far apart they are.
#[derive(Debug, Clone)]
pub struct ReadingSeedConfig {
    pub batches: usize,
    pub per_batch: usize,
    /// Length of each sample window, in seconds.
    pub window_secs: i64,
}

impl ReadingSeedConfig {
    pub fn new(batches: usize, per_batch: usize) -> Self {
        Self {
            batches,
            per_batch,
            window_secs: 300,
        }
    }

    pub fn with_window_secs(mut self, window_secs: i64) -> Self {
        self.window_secs = window_secs.max(1);
        self
    }

    pub fn total(&self) -> usize {
        self.batches * self.per_batch
    }
}

/// Credentials for a bootstrap administrator.
#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub username: String,
    pub email: String,
    pub password: String,
}
