use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportDoc {
    /// Id of the reported item, whatever concept owns it.
    pub item: Uuid,
    pub info: Option<String>,
}
