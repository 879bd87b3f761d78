use anyhow::anyhow;
use embryotech_core::AppError;
use embryotech_models::{
    BatchFilter, CreateParameterDto, NewParameter, Parameter, ParameterFilter, ParameterId,
    UpdateParameterDto,
};

use crate::repositories::ParameterRepository;

pub struct ParameterService;

impl ParameterService {
    pub async fn create(
        repo: &dyn ParameterRepository,
        dto: CreateParameterDto,
    ) -> Result<Parameter, AppError> {
        let parameter = NewParameter::try_from(dto)?;
        repo.create(parameter).await
    }

    /// Both `empresa` and `lote` are required.
    pub async fn list(
        repo: &dyn ParameterRepository,
        filter: ParameterFilter,
    ) -> Result<Vec<Parameter>, AppError> {
        let (Some(company), Some(batch)) = (filter.company, filter.batch) else {
            return Err(AppError::invalid_operation("empresa and lote are required"));
        };

        repo.find_by_company_batch(&company, &batch).await
    }

    async fn find(repo: &dyn ParameterRepository, id: ParameterId) -> Result<Parameter, AppError> {
        repo.find(id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Parameter not found")))
    }

    pub async fn update(
        repo: &dyn ParameterRepository,
        id: ParameterId,
        dto: UpdateParameterDto,
    ) -> Result<(Parameter, Parameter), AppError> {
        let before = Self::find(repo, id).await?;
        let changed = dto.apply(&before)?;

        let after = repo
            .update(&changed)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Parameter not found")))?;

        Ok((before, after))
    }

    pub async fn delete(
        repo: &dyn ParameterRepository,
        id: ParameterId,
    ) -> Result<Parameter, AppError> {
        let existing = Self::find(repo, id).await?;

        if !repo.delete(id).await? {
            return Err(AppError::not_found(anyhow!("Parameter not found")));
        }

        Ok(existing)
    }

    pub async fn companies(repo: &dyn ParameterRepository) -> Result<Vec<String>, AppError> {
        repo.companies().await
    }

    pub async fn batches(
        repo: &dyn ParameterRepository,
        filter: BatchFilter,
    ) -> Result<Vec<String>, AppError> {
        repo.batches(filter.company.as_deref()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::memory::MemoryParameterRepository;
    use embryotech_core::{ErrorKind, ManualClock};
    use std::sync::Arc;

    fn dto(company: &str, batch: &str) -> CreateParameterDto {
        CreateParameterDto {
            company: Some(company.into()),
            batch: Some(batch.into()),
            ideal_temperature: Some(37.7),
            ideal_humidity: Some(55.0),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_list_requires_both_filters() {
        let repo = MemoryParameterRepository::new(Arc::new(ManualClock::default()));
        let err = ParameterService::list(
            &repo,
            ParameterFilter {
                company: Some("Granja".into()),
                batch: None,
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidOperation);
    }

    #[tokio::test]
    async fn test_companies_and_batches_are_distinct() {
        let repo = MemoryParameterRepository::new(Arc::new(ManualClock::default()));
        for (company, batch) in [("B", "L2"), ("A", "L1"), ("B", "L1"), ("B", "L2")] {
            ParameterService::create(&repo, dto(company, batch))
                .await
                .unwrap();
        }

        assert_eq!(ParameterService::companies(&repo).await.unwrap(), ["A", "B"]);
        assert_eq!(
            ParameterService::batches(
                &repo,
                BatchFilter {
                    company: Some("A".into())
                }
            )
            .await
            .unwrap(),
            ["L1"]
        );
        assert_eq!(
            ParameterService::batches(&repo, BatchFilter::default())
                .await
                .unwrap(),
            ["L1", "L2"]
        );
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let repo = MemoryParameterRepository::new(Arc::new(ManualClock::default()));
        let err = ParameterService::delete(&repo, ParameterId::new(3))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
}
