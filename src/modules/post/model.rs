use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{
    modules::post::schema::{PostDoc, PostOptions},
    store::Document,
};

#[derive(Deserialize, Validate)]
pub struct CreatePostModel {
    #[validate(length(min = 1, message = "Post content cannot be empty"))]
    pub content: String,
    pub options: Option<PostOptions>,
}

#[derive(Deserialize, Validate)]
pub struct UpdatePostModel {
    #[validate(length(min = 1, message = "Post content cannot be empty"))]
    pub content: Option<String>,
    pub options: Option<PostOptions>,
}

#[derive(Deserialize, Validate)]
pub struct PostQuery {
    #[validate(length(min = 1, message = "Author cannot be empty"))]
    pub author: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub id: Uuid,
    pub author: Uuid,
    pub content: String,
    pub options: Option<PostOptions>,
    pub date_created: DateTime<Utc>,
    pub date_updated: DateTime<Utc>,
}

impl From<Document<PostDoc>> for Post {
    fn from(doc: Document<PostDoc>) -> Self {
        Post {
            id: doc.id,
            author: doc.fields.author,
            content: doc.fields.content,
            options: doc.fields.options,
            date_created: doc.date_created,
            date_updated: doc.date_updated,
        }
    }
}

/// A post with its author shown by username.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: Uuid,
    pub author: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<PostOptions>,
    pub date_created: DateTime<Utc>,
    pub date_updated: DateTime<Utc>,
}

impl PostResponse {
    pub fn new(post: Post, author: String) -> Self {
        PostResponse {
            id: post.id,
            author,
            content: post.content,
            options: post.options,
            date_created: post.date_created,
            date_updated: post.date_updated,
        }
    }
}
