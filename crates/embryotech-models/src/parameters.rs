//! Target incubation parameters per company and batch.

use chrono::{DateTime, Utc};
use embryotech_core::AppError;
use embryotech_core::serde::deserialize_optional_string;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::ids::ParameterId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Parameter {
    pub id: ParameterId,
    #[serde(rename = "empresa")]
    pub company: String,
    #[serde(rename = "lote")]
    pub batch: String,
    #[serde(rename = "temp_ideal")]
    pub ideal_temperature: f64,
    #[serde(rename = "umid_ideal")]
    pub ideal_humidity: f64,
    #[serde(rename = "pressao_ideal")]
    pub ideal_pressure: Option<f64>,
    pub lumens: Option<f64>,
    #[serde(rename = "id_sala")]
    pub room_id: Option<String>,
    #[serde(rename = "estagio_ovo")]
    pub egg_stage: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewParameter {
    pub company: String,
    pub batch: String,
    pub ideal_temperature: f64,
    pub ideal_humidity: f64,
    pub ideal_pressure: Option<f64>,
    pub lumens: Option<f64>,
    pub room_id: Option<String>,
    pub egg_stage: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateParameterDto {
    #[serde(default, rename = "empresa", deserialize_with = "deserialize_optional_string")]
    #[validate(
        required(message = "empresa is required"),
        length(max = 100, message = "empresa must be at most 100 characters")
    )]
    pub company: Option<String>,
    #[serde(default, rename = "lote", deserialize_with = "deserialize_optional_string")]
    #[validate(
        required(message = "lote is required"),
        length(max = 50, message = "lote must be at most 50 characters")
    )]
    pub batch: Option<String>,
    #[serde(default, rename = "temp_ideal")]
    #[validate(required(message = "temp_ideal is required"))]
    pub ideal_temperature: Option<f64>,
    #[serde(default, rename = "umid_ideal")]
    #[validate(
        required(message = "umid_ideal is required"),
        range(min = 0.0, max = 100.0, message = "umid_ideal must be between 0 and 100")
    )]
    pub ideal_humidity: Option<f64>,
    #[serde(default, rename = "pressao_ideal")]
    #[validate(range(min = 0.0, message = "pressao_ideal must not be negative"))]
    pub ideal_pressure: Option<f64>,
    #[serde(default)]
    #[validate(range(min = 0.0, message = "lumens must not be negative"))]
    pub lumens: Option<f64>,
    #[serde(default, rename = "id_sala", deserialize_with = "deserialize_optional_string")]
    #[validate(length(max = 50, message = "id_sala must be at most 50 characters"))]
    pub room_id: Option<String>,
    #[serde(
        default,
        rename = "estagio_ovo",
        deserialize_with = "deserialize_optional_string"
    )]
    #[validate(length(max = 50, message = "estagio_ovo must be at most 50 characters"))]
    pub egg_stage: Option<String>,
}

impl TryFrom<CreateParameterDto> for NewParameter {
    type Error = AppError;

    fn try_from(dto: CreateParameterDto) -> Result<Self, Self::Error> {
        dto.validate()?;

        let (Some(company), Some(batch), Some(ideal_temperature), Some(ideal_humidity)) = (
            dto.company,
            dto.batch,
            dto.ideal_temperature,
            dto.ideal_humidity,
        ) else {
            return Err(AppError::invalid_operation(
                "empresa, lote, temp_ideal and umid_ideal are required",
            ));
        };

        Ok(Self {
            company,
            batch,
            ideal_temperature,
            ideal_humidity,
            ideal_pressure: dto.ideal_pressure,
            lumens: dto.lumens,
            room_id: dto.room_id,
            egg_stage: dto.egg_stage,
        })
    }
}

/// Partial update. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateParameterDto {
    #[serde(default, rename = "empresa", deserialize_with = "deserialize_optional_string")]
    #[validate(length(max = 100, message = "empresa must be at most 100 characters"))]
    pub company: Option<String>,
    #[serde(default, rename = "lote", deserialize_with = "deserialize_optional_string")]
    #[validate(length(max = 50, message = "lote must be at most 50 characters"))]
    pub batch: Option<String>,
    #[serde(default, rename = "temp_ideal")]
    pub ideal_temperature: Option<f64>,
    #[serde(default, rename = "umid_ideal")]
    #[validate(range(min = 0.0, max = 100.0, message = "umid_ideal must be between 0 and 100"))]
    pub ideal_humidity: Option<f64>,
    #[serde(default, rename = "pressao_ideal")]
    #[validate(range(min = 0.0, message = "pressao_ideal must not be negative"))]
    pub ideal_pressure: Option<f64>,
    #[serde(default)]
    #[validate(range(min = 0.0, message = "lumens must not be negative"))]
    pub lumens: Option<f64>,
    #[serde(default, rename = "id_sala", deserialize_with = "deserialize_optional_string")]
    #[validate(length(max = 50, message = "id_sala must be at most 50 characters"))]
    pub room_id: Option<String>,
    #[serde(
        default,
        rename = "estagio_ovo",
        deserialize_with = "deserialize_optional_string"
    )]
    #[validate(length(max = 50, message = "estagio_ovo must be at most 50 characters"))]
    pub egg_stage: Option<String>,
}

impl UpdateParameterDto {
    pub fn apply(&self, current: &Parameter) -> Result<Parameter, AppError> {
        self.validate()?;

        Ok(Parameter {
            id: current.id,
            company: self.company.clone().unwrap_or_else(|| current.company.clone()),
            batch: self.batch.clone().unwrap_or_else(|| current.batch.clone()),
            ideal_temperature: self.ideal_temperature.unwrap_or(current.ideal_temperature),
            ideal_humidity: self.ideal_humidity.unwrap_or(current.ideal_humidity),
            ideal_pressure: self.ideal_pressure.or(current.ideal_pressure),
            lumens: self.lumens.or(current.lumens),
            room_id: self.room_id.clone().or_else(|| current.room_id.clone()),
            egg_stage: self.egg_stage.clone().or_else(|| current.egg_stage.clone()),
            created_at: current.created_at,
        })
    }
}

/// Both filters are mandatory on `GET /api/parametros`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ParameterFilter {
    #[serde(default, rename = "empresa", deserialize_with = "deserialize_optional_string")]
    pub company: Option<String>,
    #[serde(default, rename = "lote", deserialize_with = "deserialize_optional_string")]
    pub batch: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BatchFilter {
    #[serde(default, rename = "empresa", deserialize_with = "deserialize_optional_string")]
    pub company: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parameter() -> Parameter {
        Parameter {
            id: ParameterId::new(1),
            company: "Granja Boa Vista".into(),
            batch: "L1".into(),
            ideal_temperature: 37.7,
            ideal_humidity: 55.0,
            ideal_pressure: None,
            lumens: Some(120.0),
            room_id: Some("S2".into()),
            egg_stage: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_create_requires_core_fields() {
        let dto: CreateParameterDto = serde_json::from_str(r#"{"empresa":"Granja"}"#).unwrap();
        let message = NewParameter::try_from(dto).unwrap_err().public_message();
        assert!(message.contains("lote is required"));
        assert!(message.contains("temp_ideal is required"));
        assert!(message.contains("umid_ideal is required"));
    }

    #[test]
    fn test_create_converts() {
        let dto: CreateParameterDto = serde_json::from_str(
            r#"{"empresa":"Granja","lote":"L1","temp_ideal":37.7,"umid_ideal":55,"id_sala":"S1"}"#,
        )
        .unwrap();
        let new = NewParameter::try_from(dto).unwrap();
        assert_eq!(new.company, "Granja");
        assert_eq!(new.room_id.as_deref(), Some("S1"));
        assert_eq!(new.ideal_pressure, None);
    }

    #[test]
    fn test_update_applies_present_fields() {
        let dto = UpdateParameterDto {
            ideal_temperature: Some(38.0),
            egg_stage: Some("eclosao".into()),
            ..Default::default()
        };
        let updated = dto.apply(&parameter()).unwrap();
        assert_eq!(updated.ideal_temperature, 38.0);
        assert_eq!(updated.egg_stage.as_deref(), Some("eclosao"));
        assert_eq!(updated.company, "Granja Boa Vista");
        assert_eq!(updated.lumens, Some(120.0));
    }

    #[test]
    fn test_serializes_wire_names() {
        let json = serde_json::to_value(parameter()).unwrap();
        assert_eq!(json["empresa"], "Granja Boa Vista");
        assert_eq!(json["temp_ideal"], 37.7);
        assert_eq!(json["id_sala"], "S2");
    }
}
