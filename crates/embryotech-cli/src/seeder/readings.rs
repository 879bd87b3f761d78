//! Reading seeding.

use std::time::Instant;

use chrono::{Duration, Utc};
use fake::Fake;
use rand::Rng;
use rayon::prelude::*;
use sqlx::{PgPool, Postgres, Transaction};

use super::models::{ReadingSeed, ReadingSeedConfig};

/// Generates readings for `config.batches` batches, newest window ending now.
///
/// Each batch gets consecutive, non-overlapping windows of
/// `config.window_secs`, walking backwards in time.
pub fn generate_readings(config: &ReadingSeedConfig) -> Vec<ReadingSeed> {
    let now = Utc::now();
    let window = Duration::seconds(config.window_secs);

    (0..config.batches)
        .into_par_iter()
        .flat_map(|batch_idx| {
            let batch = format!("LOTE-{:03}", batch_idx + 1);
            let mut rng = rand::thread_rng();

            (0..config.per_batch)
                .map(|sample_idx| {
                    let ended_at = now - window * sample_idx as i32;
                    let started_at = ended_at - window;
                    let pressure = if rng.gen_bool(0.8) {
                        Some((1000.0..1025.0).fake::<f64>())
                    } else {
                        None
                    };

                    ReadingSeed {
                        humidity: (50.0..65.0).fake::<f64>(),
                        temperature: (36.8..38.2).fake::<f64>(),
                        pressure,
                        batch: batch.clone(),
                        started_at,
                        ended_at,
                    }
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Generates and inserts readings, returning how many rows were written.
pub async fn seed_readings(db: &PgPool, config: &ReadingSeedConfig) -> anyhow::Result<u64> {
    let start_time = Instant::now();
    println!(
        "🥚 Seeding {} readings ({} batches, {} per batch)...",
        config.total(),
        config.batches,
        config.per_batch
    );

    let readings = generate_readings(config);
    let inserted = insert_readings_batch(db, &readings).await?;

    println!(
        "   ✓ Inserted {} readings in {:?}",
        inserted,
        start_time.elapsed()
    );

    Ok(inserted)
}

/// Inserts readings in chunks inside a single transaction.
pub async fn insert_readings_batch(db: &PgPool, readings: &[ReadingSeed]) -> anyhow::Result<u64> {
    let mut tx = db.begin().await?;

    // 6 params per reading
    const BATCH_SIZE: usize = 1000;

    let mut inserted = 0;
    for chunk in readings.chunks(BATCH_SIZE) {
        inserted += insert_readings_chunk(&mut tx, chunk).await?;
    }

    tx.commit().await?;
    Ok(inserted)
}

async fn insert_readings_chunk(
    tx: &mut Transaction<'_, Postgres>,
    readings: &[ReadingSeed],
) -> anyhow::Result<u64> {
    if readings.is_empty() {
        return Ok(0);
    }

    let mut query = String::from(
        "INSERT INTO readings (humidity, temperature, pressure, batch, started_at, ended_at) VALUES ",
    );

    for i in 0..readings.len() {
        if i > 0 {
            query.push_str(", ");
        }
        let param_idx = i * 6;
        query.push_str(&format!(
            "(${}, ${}, ${}, ${}, ${}, ${})",
            param_idx + 1,
            param_idx + 2,
            param_idx + 3,
            param_idx + 4,
            param_idx + 5,
            param_idx + 6
        ));
    }

    let mut q = sqlx::query(&query);
    for reading in readings {
        q = q
            .bind(reading.humidity)
            .bind(reading.temperature)
            .bind(reading.pressure)
            .bind(&reading.batch)
            .bind(reading.started_at)
            .bind(reading.ended_at);
    }

    let result = q.execute(&mut **tx).await?;
    Ok(result.rows_affected())
}

/// Deletes every reading.
pub async fn clear_readings(db: &PgPool) -> anyhow::Result<u64> {
    let result = sqlx::query("DELETE FROM readings").execute(db).await?;
    Ok(result.rows_affected())
}
