use anyhow::anyhow;
use embryotech_core::AppError;
use embryotech_models::readings::MAX_READINGS_PER_REQUEST;
use embryotech_models::{
    CreateReadingsPayload, NewReading, Reading, ReadingFilter, ReadingId, ReadingQuery,
    UpdateReadingDto,
};

use crate::metrics::track_readings_created;
use crate::repositories::ReadingRepository;

pub struct ReadingService;

impl ReadingService {
    /// Validates every reading first, then stores them together.
    ///
    /// Errors in an array upload are prefixed with the item's position.
    pub async fn create(
        repo: &dyn ReadingRepository,
        payload: CreateReadingsPayload,
    ) -> Result<Vec<Reading>, AppError> {
        let is_batch = matches!(payload, CreateReadingsPayload::Many(_));
        let items = payload.into_vec();

        if items.is_empty() {
            return Err(AppError::invalid_operation("At least one reading is required"));
        }
        if items.len() > MAX_READINGS_PER_REQUEST {
            return Err(AppError::invalid_operation(format!(
                "At most {MAX_READINGS_PER_REQUEST} readings per request"
            )));
        }

        let readings = items
            .into_iter()
            .enumerate()
            .map(|(index, dto)| {
                NewReading::try_from(dto).map_err(|err| {
                    if is_batch {
                        AppError::invalid_operation(format!(
                            "item {index}: {}",
                            err.public_message()
                        ))
                    } else {
                        err
                    }
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let created = repo.create_many(readings).await?;
        track_readings_created(created.len());
        Ok(created)
    }

    pub async fn list(
        repo: &dyn ReadingRepository,
        filter: ReadingFilter,
    ) -> Result<Vec<Reading>, AppError> {
        repo.list(&ReadingQuery {
            batch: filter.batch,
            ..Default::default()
        })
        .await
    }

    async fn find(repo: &dyn ReadingRepository, id: ReadingId) -> Result<Reading, AppError> {
        repo.find(id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Reading not found")))
    }

    /// Returns the stored reading before and after the change.
    pub async fn update(
        repo: &dyn ReadingRepository,
        id: ReadingId,
        dto: UpdateReadingDto,
    ) -> Result<(Reading, Reading), AppError> {
        let before = Self::find(repo, id).await?;
        let changed = dto.apply(&before)?;

        let after = repo
            .update(&changed)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Reading not found")))?;

        Ok((before, after))
    }

    /// Returns the deleted reading.
    pub async fn delete(repo: &dyn ReadingRepository, id: ReadingId) -> Result<Reading, AppError> {
        let existing = Self::find(repo, id).await?;

        if !repo.delete(id).await? {
            return Err(AppError::not_found(anyhow!("Reading not found")));
        }

        Ok(existing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::memory::MemoryReadingRepository;
    use embryotech_core::ErrorKind;
    use serde_json::json;

    fn payload(value: serde_json::Value) -> CreateReadingsPayload {
        serde_json::from_value(value).unwrap()
    }

    fn reading(batch: &str, start: &str) -> serde_json::Value {
        json!({
            "umidade": 55.0,
            "temperatura": 37.6,
            "lote": batch,
            "data_inicial": start,
            "data_final": start,
        })
    }

    #[tokio::test]
    async fn test_array_upload_is_all_or_nothing() {
        let repo = MemoryReadingRepository::new();
        let mut bad = reading("L1", "2024-05-01T10:00:00Z");
        bad["umidade"] = json!(140.0);

        let err = ReadingService::create(
            &repo,
            payload(json!([reading("L1", "2024-05-01T09:00:00Z"), bad])),
        )
        .await
        .unwrap_err();

        assert_eq!(err.kind, ErrorKind::InvalidOperation);
        assert!(err.public_message().starts_with("item 1:"));
        assert!(ReadingService::list(&repo, ReadingFilter::default())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_empty_array_rejected() {
        let repo = MemoryReadingRepository::new();
        let err = ReadingService::create(&repo, payload(json!([])))
            .await
            .unwrap_err();
        assert_eq!(err.public_message(), "At least one reading is required");
    }

    #[tokio::test]
    async fn test_list_filters_batch_newest_first() {
        let repo = MemoryReadingRepository::new();
        ReadingService::create(
            &repo,
            payload(json!([
                reading("L1", "2024-05-01T08:00:00Z"),
                reading("L2", "2024-05-01T09:00:00Z"),
                reading("L1", "2024-05-01T10:00:00Z"),
            ])),
        )
        .await
        .unwrap();

        let listed = ReadingService::list(
            &repo,
            ReadingFilter {
                batch: Some("L1".into()),
            },
        )
        .await
        .unwrap();

        assert_eq!(listed.len(), 2);
        assert!(listed[0].started_at > listed[1].started_at);
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let repo = MemoryReadingRepository::new();
        let err = ReadingService::update(&repo, ReadingId::new(42), UpdateReadingDto::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
}
