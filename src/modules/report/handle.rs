use actix_web::{delete, get, put, web};
use uuid::Uuid;

use crate::{
    api::{error, success},
    modules::report::model::{AddressReportQuery, CreateReportModel, Report},
    sync::Synchronizer,
    utils::{ValidatedJson, ValidatedQuery},
};

#[get("")]
pub async fn list_reports(
    sync: web::Data<Synchronizer>,
) -> Result<success::Success<Vec<Report>>, error::Error> {
    let reports = sync.get_reports().await?;
    Ok(success::Success::ok(Some(reports)))
}

#[put("/{item}")]
pub async fn create_report(
    sync: web::Data<Synchronizer>,
    item: web::Path<Uuid>,
    body: ValidatedJson<CreateReportModel>,
) -> Result<success::Success<Report>, error::Error> {
    let report = sync.create_report(item.into_inner(), body.0.info).await?;
    Ok(success::Success::created(Some(report)).message("Report filed!"))
}

#[delete("/{id}")]
pub async fn address_report(
    sync: web::Data<Synchronizer>,
    id: web::Path<Uuid>,
    query: ValidatedQuery<AddressReportQuery>,
) -> Result<success::Success<()>, error::Error> {
    sync.address_report(id.into_inner(), query.0.validity).await?;
    Ok(success::Success::ok(None).message("Report addressed!"))
}
