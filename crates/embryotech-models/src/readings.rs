//! Sensor reading models and DTOs.
//!
//! A reading is one sample window of humidity, temperature and optional
//! pressure for an incubation batch. Wire names follow the gateway firmware
//! (`umidade`, `temperatura`, `pressao`, `lote`, `data_inicial`, `data_final`).

use chrono::{DateTime, Utc};
use embryotech_core::AppError;
use embryotech_core::serde::{
    deserialize_optional_end, deserialize_optional_start, deserialize_optional_string,
    deserialize_optional_timestamp,
};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

use crate::ids::ReadingId;

/// Upper bound on readings accepted in one request.
pub const MAX_READINGS_PER_REQUEST: usize = 1000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Reading {
    pub id: ReadingId,
    #[serde(rename = "umidade")]
    pub humidity: f64,
    #[serde(rename = "temperatura")]
    pub temperature: f64,
    #[serde(rename = "pressao")]
    pub pressure: Option<f64>,
    #[serde(rename = "lote")]
    pub batch: String,
    #[serde(rename = "data_inicial")]
    pub started_at: DateTime<Utc>,
    #[serde(rename = "data_final")]
    pub ended_at: DateTime<Utc>,
}

/// A validated reading ready to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReading {
    pub humidity: f64,
    pub temperature: f64,
    pub pressure: Option<f64>,
    pub batch: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[validate(schema(function = "validate_create_window"))]
pub struct CreateReadingDto {
    #[serde(default, rename = "umidade")]
    #[validate(
        required(message = "umidade is required"),
        range(min = 0.0, max = 100.0, message = "umidade must be between 0 and 100")
    )]
    pub humidity: Option<f64>,
    #[serde(default, rename = "temperatura")]
    #[validate(required(message = "temperatura is required"))]
    pub temperature: Option<f64>,
    #[serde(default, rename = "pressao")]
    #[validate(range(min = 0.0, max = 2000.0, message = "pressao must be between 0 and 2000"))]
    pub pressure: Option<f64>,
    #[serde(default, rename = "lote", deserialize_with = "deserialize_optional_string")]
    #[validate(
        required(message = "lote is required"),
        length(max = 50, message = "lote must be at most 50 characters")
    )]
    pub batch: Option<String>,
    #[serde(
        default,
        rename = "data_inicial",
        deserialize_with = "deserialize_optional_timestamp"
    )]
    #[validate(required(message = "data_inicial is required"))]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        rename = "data_final",
        deserialize_with = "deserialize_optional_timestamp"
    )]
    #[validate(required(message = "data_final is required"))]
    pub ended_at: Option<DateTime<Utc>>,
}

/// Incubator sensors report within this band; anything outside is a fault.
const TEMPERATURE_RANGE: std::ops::RangeInclusive<f64> = -40.0..=80.0;

fn validate_create_window(dto: &CreateReadingDto) -> Result<(), ValidationError> {
    check_temperature(dto.temperature)?;
    check_window(dto.started_at, dto.ended_at)
}

fn check_temperature(temperature: Option<f64>) -> Result<(), ValidationError> {
    match temperature {
        Some(t) if !TEMPERATURE_RANGE.contains(&t) => Err(ValidationError::new("range")
            .with_message("temperatura must be between -40 and 80".into())),
        _ => Ok(()),
    }
}

fn check_window(
    started_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
) -> Result<(), ValidationError> {
    match (started_at, ended_at) {
        (Some(start), Some(end)) if end < start => Err(ValidationError::new("window")
            .with_message("data_final must not be before data_inicial".into())),
        _ => Ok(()),
    }
}

impl TryFrom<CreateReadingDto> for NewReading {
    type Error = AppError;

    fn try_from(dto: CreateReadingDto) -> Result<Self, Self::Error> {
        dto.validate()?;

        let (Some(humidity), Some(temperature), Some(batch), Some(started_at), Some(ended_at)) = (
            dto.humidity,
            dto.temperature,
            dto.batch,
            dto.started_at,
            dto.ended_at,
        ) else {
            return Err(AppError::invalid_operation(
                "umidade, temperatura, lote, data_inicial and data_final are required",
            ));
        };

        Ok(Self {
            humidity,
            temperature,
            pressure: dto.pressure,
            batch,
            started_at,
            ended_at,
        })
    }
}

/// `POST /api/leituras` accepts a single object or an array of them.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CreateReadingsPayload {
    Many(Vec<CreateReadingDto>),
    One(CreateReadingDto),
}

impl CreateReadingsPayload {
    pub fn into_vec(self) -> Vec<CreateReadingDto> {
        match self {
            Self::Many(items) => items,
            Self::One(item) => vec![item],
        }
    }
}

/// Partial update. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateReadingDto {
    #[serde(default, rename = "umidade")]
    #[validate(range(min = 0.0, max = 100.0, message = "umidade must be between 0 and 100"))]
    pub humidity: Option<f64>,
    #[serde(default, rename = "temperatura")]
    pub temperature: Option<f64>,
    #[serde(default, rename = "pressao")]
    #[validate(range(min = 0.0, max = 2000.0, message = "pressao must be between 0 and 2000"))]
    pub pressure: Option<f64>,
    #[serde(default, rename = "lote", deserialize_with = "deserialize_optional_string")]
    #[validate(length(max = 50, message = "lote must be at most 50 characters"))]
    pub batch: Option<String>,
    #[serde(
        default,
        rename = "data_inicial",
        deserialize_with = "deserialize_optional_timestamp"
    )]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        rename = "data_final",
        deserialize_with = "deserialize_optional_timestamp"
    )]
    pub ended_at: Option<DateTime<Utc>>,
}

impl UpdateReadingDto {
    /// Returns `current` with every provided field replaced.
    ///
    /// # Errors
    ///
    /// Fails when a value is out of range or the resulting window ends
    /// before it starts.
    pub fn apply(&self, current: &Reading) -> Result<Reading, AppError> {
        self.validate()?;

        let updated = Reading {
            id: current.id,
            humidity: self.humidity.unwrap_or(current.humidity),
            temperature: self.temperature.unwrap_or(current.temperature),
            pressure: self.pressure.or(current.pressure),
            batch: self.batch.clone().unwrap_or_else(|| current.batch.clone()),
            started_at: self.started_at.unwrap_or(current.started_at),
            ended_at: self.ended_at.unwrap_or(current.ended_at),
        };

        check_temperature(Some(updated.temperature))
            .and_then(|_| check_window(Some(updated.started_at), Some(updated.ended_at)))
            .map_err(|e| {
                AppError::invalid_operation(
                    e.message
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "invalid reading".to_string()),
                )
            })?;

        Ok(updated)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReadingFilter {
    #[serde(default, rename = "lote", deserialize_with = "deserialize_optional_string")]
    pub batch: Option<String>,
}

/// Filters for the readings report. `data_fim` given as a date covers that
/// whole day.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReadingReportParams {
    #[serde(default, rename = "lote", deserialize_with = "deserialize_optional_string")]
    pub batch: Option<String>,
    #[serde(
        default,
        rename = "data_inicio",
        deserialize_with = "deserialize_optional_start"
    )]
    pub from: Option<DateTime<Utc>>,
    #[serde(default, rename = "data_fim", deserialize_with = "deserialize_optional_end")]
    pub to: Option<DateTime<Utc>>,
}

/// Store-level reading query, newest `started_at` first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReadingQuery {
    pub batch: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
}

impl ReadingQuery {
    pub fn matches(&self, reading: &Reading) -> bool {
        self.batch.as_ref().is_none_or(|b| &reading.batch == b)
            && self.from.is_none_or(|from| reading.started_at >= from)
            && self.to.is_none_or(|to| reading.started_at <= to)
    }
}

impl From<ReadingReportParams> for ReadingQuery {
    fn from(params: ReadingReportParams) -> Self {
        Self {
            batch: params.batch,
            from: params.from,
            to: params.to,
            limit: None,
        }
    }
}
