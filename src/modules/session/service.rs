use log::info;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    api::error::{self, ConceptError},
    modules::session::schema::{SessionDoc, USER_FIELD},
    store::{DocStore, Filter},
};

/// Server-side sessions. A token only authenticates while its session exists.
#[derive(Clone)]
pub struct SessionService {
    repo: Arc<dyn DocStore<SessionDoc>>,
}

impl SessionService {
    pub fn with_store(repo: Arc<dyn DocStore<SessionDoc>>) -> Self {
        info!("SessionService initialized on collection {}", repo.collection());
        SessionService { repo }
    }

    pub async fn start(&self, user: Uuid) -> Result<Uuid, error::SystemError> {
        let id = self.repo.create_one(&SessionDoc { user }).await?;
        info!("Session {id} started for user {user}");
        Ok(id)
    }

    /// The user signed in to `id`. NotAllowed once the session has ended.
    pub async fn get_user(&self, id: Uuid) -> Result<Uuid, error::SystemError> {
        let session = self
            .repo
            .read_one(&Filter::by_id(id))
            .await?
            .ok_or_else(|| ConceptError::not_allowed("Must be logged in!"))?;
        Ok(session.fields.user)
    }

    pub async fn end(&self, id: Uuid) -> Result<(), error::SystemError> {
        if !self.repo.delete_one(&Filter::by_id(id)).await? {
            return Err(ConceptError::not_found(format!("Session {id} does not exist!")).into());
        }

        info!("Session {id} ended");
        Ok(())
    }

    /// Ends every session of `user`.
    pub async fn end_all(&self, user: Uuid) -> Result<u64, error::SystemError> {
        let ended = self.repo.delete_many(&Filter::all().eq(USER_FIELD, user)).await?;
        info!("Ended {ended} sessions of user {user}");
        Ok(ended)
    }
}
