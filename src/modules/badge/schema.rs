use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeType {
    Shame,
    Verified,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BadgeDoc {
    pub author: Uuid,
    #[serde(rename = "type")]
    pub kind: BadgeType,
}
