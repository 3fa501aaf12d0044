use log::info;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    api::error::{self, ConceptError},
    modules::post::{
        model::Post,
        schema::{PostDoc, PostOptions, AUTHOR_FIELD, CONTENT_FIELD, OPTIONS_FIELD},
    },
    store::{Direction, DocStore, Filter, ReadOptions, UPDATED_FIELD},
};

#[derive(Clone)]
pub struct PostService {
    repo: Arc<dyn DocStore<PostDoc>>,
}

impl PostService {
    pub fn with_store(repo: Arc<dyn DocStore<PostDoc>>) -> Self {
        info!("PostService initialized on collection {}", repo.collection());
        PostService { repo }
    }

    fn not_found(id: &Uuid) -> error::SystemError {
        ConceptError::not_found(format!("Post {id} does not exist!")).into()
    }

    fn most_recent() -> ReadOptions {
        ReadOptions::sorted_by(UPDATED_FIELD, Direction::Descending)
    }

    pub async fn create(
        &self,
        author: Uuid,
        content: &str,
        options: Option<PostOptions>,
    ) -> Result<Post, error::SystemError> {
        let doc = PostDoc { author, content: content.to_owned(), options };
        let id = self.repo.create_one(&doc).await?;
        info!("Post {id} created by {author}");

        self.get_post(id).await
    }

    pub async fn get_post(&self, id: Uuid) -> Result<Post, error::SystemError> {
        let post =
            self.repo.read_one(&Filter::by_id(id)).await?.ok_or_else(|| Self::not_found(&id))?;
        Ok(Post::from(post))
    }

    /// Most recently updated first.
    pub async fn get_posts(&self) -> Result<Vec<Post>, error::SystemError> {
        let posts = self.repo.read_many(&Filter::all(), &Self::most_recent()).await?;
        Ok(posts.into_iter().map(Post::from).collect())
    }

    pub async fn get_by_author(&self, author: Uuid) -> Result<Vec<Post>, error::SystemError> {
        let posts = self
            .repo
            .read_many(&Filter::all().eq(AUTHOR_FIELD, author), &Self::most_recent())
            .await?;
        Ok(posts.into_iter().map(Post::from).collect())
    }

    /// Replaces whichever of `content` and `options` are given.
    pub async fn update(
        &self,
        id: Uuid,
        content: Option<String>,
        options: Option<PostOptions>,
    ) -> Result<(), error::SystemError> {
        let mut patch = Map::new();
        if let Some(content) = content {
            patch.insert(CONTENT_FIELD.into(), json!(content));
        }
        if let Some(options) = options {
            patch.insert(OPTIONS_FIELD.into(), serde_json::to_value(options)?);
        }

        if !self.repo.update_one(&Filter::by_id(id), &Value::Object(patch)).await? {
            return Err(Self::not_found(&id));
        }

        info!("Post {id} updated");
        Ok(())
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), error::SystemError> {
        if !self.repo.delete_one(&Filter::by_id(id)).await? {
            return Err(Self::not_found(&id));
        }

        info!("Post {id} deleted");
        Ok(())
    }

    pub async fn assert_author_is_user(
        &self,
        id: Uuid,
        user: Uuid,
    ) -> Result<(), error::SystemError> {
        let post = self.get_post(id).await?;
        if post.author != user {
            return Err(ConceptError::not_allowed(format!(
                "{user} is not the author of post {id}!"
            ))
            .into());
        }
        Ok(())
    }
}
