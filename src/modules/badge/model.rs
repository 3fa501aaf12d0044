use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{
    modules::badge::schema::{BadgeDoc, BadgeType},
    store::Document,
};

#[derive(Deserialize, Validate)]
pub struct GiveBadgeModel {
    #[serde(rename = "type")]
    pub kind: BadgeType,
}

#[derive(Deserialize, Validate)]
pub struct BadgeQuery {
    #[validate(length(min = 1, message = "Author cannot be empty"))]
    pub author: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Badge {
    pub id: Uuid,
    pub author: Uuid,
    #[serde(rename = "type")]
    pub kind: BadgeType,
}

impl From<Document<BadgeDoc>> for Badge {
    fn from(doc: Document<BadgeDoc>) -> Self {
        Badge { id: doc.id, author: doc.fields.author, kind: doc.fields.kind }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BadgeResponse {
    pub id: Uuid,
    pub author: String,
    #[serde(rename = "type")]
    pub kind: BadgeType,
}
