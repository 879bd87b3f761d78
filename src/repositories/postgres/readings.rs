use anyhow::Context;
use async_trait::async_trait;
use embryotech_core::AppError;
use embryotech_db::PgPool;
use embryotech_models::{NewReading, Reading, ReadingId, ReadingQuery};

use crate::repositories::ReadingRepository;

const READING_COLUMNS: &str = "id, humidity, temperature, pressure, batch, started_at, ended_at";

pub struct PgReadingRepository {
    pool: PgPool,
}

impl PgReadingRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReadingRepository for PgReadingRepository {
    async fn create_many(&self, readings: Vec<NewReading>) -> Result<Vec<Reading>, AppError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")
            .map_err(AppError::database)?;

        let insert = format!(
            r#"
            INSERT INTO readings (humidity, temperature, pressure, batch, started_at, ended_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {READING_COLUMNS}
            "#
        );

        let mut created = Vec::with_capacity(readings.len());
        for reading in readings {
            let row = sqlx::query_as::<_, Reading>(&insert)
                .bind(reading.humidity)
                .bind(reading.temperature)
                .bind(reading.pressure)
                .bind(&reading.batch)
                .bind(reading.started_at)
                .bind(reading.ended_at)
                .fetch_one(&mut *tx)
                .await
                .context("Failed to insert reading")
                .map_err(AppError::database)?;
            created.push(row);
        }

        tx.commit()
            .await
            .context("Failed to commit readings")
            .map_err(AppError::database)?;

        Ok(created)
    }

    async fn list(&self, query: &ReadingQuery) -> Result<Vec<Reading>, AppError> {
        sqlx::query_as::<_, Reading>(&format!(
            r#"
            SELECT {READING_COLUMNS} FROM readings
            WHERE ($1::text IS NULL OR batch = $1)
              AND ($2::timestamptz IS NULL OR started_at >= $2)
              AND ($3::timestamptz IS NULL OR started_at <= $3)
            ORDER BY started_at DESC, id DESC
            LIMIT $4
            "#
        ))
        .bind(query.batch.as_deref())
        .bind(query.from)
        .bind(query.to)
        .bind(query.limit)
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch readings")
        .map_err(AppError::database)
    }

    async fn find(&self, id: ReadingId) -> Result<Option<Reading>, AppError> {
        sqlx::query_as::<_, Reading>(&format!(
            "SELECT {READING_COLUMNS} FROM readings WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch reading")
        .map_err(AppError::database)
    }

    async fn update(&self, reading: &Reading) -> Result<Option<Reading>, AppError> {
        sqlx::query_as::<_, Reading>(&format!(
            r#"
            UPDATE readings
            SET humidity = $2, temperature = $3, pressure = $4, batch = $5,
                started_at = $6, ended_at = $7
            WHERE id = $1
            RETURNING {READING_COLUMNS}
            "#
        ))
        .bind(reading.id)
        .bind(reading.humidity)
        .bind(reading.temperature)
        .bind(reading.pressure)
        .bind(&reading.batch)
        .bind(reading.started_at)
        .bind(reading.ended_at)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to update reading")
        .map_err(AppError::database)
    }

    async fn delete(&self, id: ReadingId) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM readings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete reading")
            .map_err(AppError::database)?;

        Ok(result.rows_affected() > 0)
    }
}
