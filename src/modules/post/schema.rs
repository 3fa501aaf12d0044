use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const AUTHOR_FIELD: &str = "author";
pub const CONTENT_FIELD: &str = "content";
pub const OPTIONS_FIELD: &str = "options";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDoc {
    pub author: Uuid,
    pub content: String,
    pub options: Option<PostOptions>,
}
