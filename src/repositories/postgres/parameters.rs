use anyhow::Context;
use async_trait::async_trait;
use embryotech_core::AppError;
use embryotech_db::PgPool;
use embryotech_models::{NewParameter, Parameter, ParameterId};

use crate::repositories::ParameterRepository;

const PARAMETER_COLUMNS: &str = "id, company, batch, ideal_temperature, ideal_humidity, \
     ideal_pressure, lumens, room_id, egg_stage, created_at";

pub struct PgParameterRepository {
    pool: PgPool,
}

impl PgParameterRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ParameterRepository for PgParameterRepository {
    async fn create(&self, parameter: NewParameter) -> Result<Parameter, AppError> {
        sqlx::query_as::<_, Parameter>(&format!(
            r#"
            INSERT INTO parameters (company, batch, ideal_temperature, ideal_humidity,
                                    ideal_pressure, lumens, room_id, egg_stage)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {PARAMETER_COLUMNS}
            "#
        ))
        .bind(&parameter.company)
        .bind(&parameter.batch)
        .bind(parameter.ideal_temperature)
        .bind(parameter.ideal_humidity)
        .bind(parameter.ideal_pressure)
        .bind(parameter.lumens)
        .bind(&parameter.room_id)
        .bind(&parameter.egg_stage)
        .fetch_one(&self.pool)
        .await
        .context("Failed to insert parameter")
        .map_err(AppError::database)
    }

    async fn find_by_company_batch(
        &self,
        company: &str,
        batch: &str,
    ) -> Result<Vec<Parameter>, AppError> {
        sqlx::query_as::<_, Parameter>(&format!(
            r#"
            SELECT {PARAMETER_COLUMNS} FROM parameters
            WHERE company = $1 AND batch = $2
            ORDER BY created_at DESC, id DESC
            "#
        ))
        .bind(company)
        .bind(batch)
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch parameters")
        .map_err(AppError::database)
    }

    async fn find(&self, id: ParameterId) -> Result<Option<Parameter>, AppError> {
        sqlx::query_as::<_, Parameter>(&format!(
            "SELECT {PARAMETER_COLUMNS} FROM parameters WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch parameter")
        .map_err(AppError::database)
    }

    async fn update(&self, parameter: &Parameter) -> Result<Option<Parameter>, AppError> {
        sqlx::query_as::<_, Parameter>(&format!(
            r#"
            UPDATE parameters
            SET company = $2, batch = $3, ideal_temperature = $4, ideal_humidity = $5,
                ideal_pressure = $6, lumens = $7, room_id = $8, egg_stage = $9
            WHERE id = $1
            RETURNING {PARAMETER_COLUMNS}
            "#
        ))
        .bind(parameter.id)
        .bind(&parameter.company)
        .bind(&parameter.batch)
        .bind(parameter.ideal_temperature)
        .bind(parameter.ideal_humidity)
        .bind(parameter.ideal_pressure)
        .bind(parameter.lumens)
        .bind(&parameter.room_id)
        .bind(&parameter.egg_stage)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to update parameter")
        .map_err(AppError::database)
    }

    async fn delete(&self, id: ParameterId) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM parameters WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete parameter")
            .map_err(AppError::database)?;

        Ok(result.rows_affected() > 0)
    }

    async fn companies(&self) -> Result<Vec<String>, AppError> {
        sqlx::query_scalar::<_, String>("SELECT DISTINCT company FROM parameters ORDER BY company")
            .fetch_all(&self.pool)
            .await
            .context("Failed to fetch companies")
            .map_err(AppError::database)
    }

    async fn batches(&self, company: Option<&str>) -> Result<Vec<String>, AppError> {
        sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT batch FROM parameters
            WHERE ($1::text IS NULL OR company = $1)
            ORDER BY batch
            "#,
        )
        .bind(company)
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch batches")
        .map_err(AppError::database)
    }
}
