use log::info;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    api::error::{self, ConceptError},
    modules::report::{model::Report, schema::ReportDoc},
    store::{Direction, DocStore, Filter, ReadOptions, ID_FIELD},
};

#[derive(Clone)]
pub struct ReportService {
    repo: Arc<dyn DocStore<ReportDoc>>,
}

impl ReportService {
    pub fn with_store(repo: Arc<dyn DocStore<ReportDoc>>) -> Self {
        info!("ReportService initialized on collection {}", repo.collection());
        ReportService { repo }
    }

    pub async fn create(
        &self,
        item: Uuid,
        info: Option<String>,
    ) -> Result<Report, error::SystemError> {
        let id = self.repo.create_one(&ReportDoc { item, info }).await?;
        info!("Report {id} filed against {item}");

        let report = self
            .repo
            .read_one(&Filter::by_id(id))
            .await?
            .ok_or_else(|| ConceptError::not_found(format!("Report {id} does not exist!")))?;
        Ok(Report::from(report))
    }

    /// Newest first. Ids are UUIDv7, so they order by creation time.
    pub async fn get_reports(&self) -> Result<Vec<Report>, error::SystemError> {
        let reports = self
            .repo
            .read_many(&Filter::all(), &ReadOptions::sorted_by(ID_FIELD, Direction::Descending))
            .await?;
        Ok(reports.into_iter().map(Report::from).collect())
    }

    pub async fn address(&self, id: Uuid, validity: bool) -> Result<(), error::SystemError> {
        if !self.repo.delete_one(&Filter::by_id(id)).await? {
            return Err(ConceptError::not_found(format!("Report {id} does not exist!")).into());
        }

        info!("Report {id} addressed (valid: {validity})");
        Ok(())
    }
}
