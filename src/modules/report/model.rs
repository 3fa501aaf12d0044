use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{modules::report::schema::ReportDoc, store::Document};

#[derive(Deserialize, Validate)]
pub struct CreateReportModel {
    #[validate(length(max = 2000, message = "Report info is too long"))]
    pub info: Option<String>,
}

#[derive(Deserialize, Validate)]
pub struct AddressReportQuery {
    pub validity: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: Uuid,
    pub item: Uuid,
    pub info: Option<String>,
    pub date_created: chrono::DateTime<chrono::Utc>,
}

impl From<Document<ReportDoc>> for Report {
    fn from(doc: Document<ReportDoc>) -> Self {
        Report {
            id: doc.id,
            item: doc.fields.item,
            info: doc.fields.info,
            date_created: doc.date_created,
        }
    }
}
