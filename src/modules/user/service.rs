use log::info;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    api::error::{self, ConceptError},
    modules::user::{
        model::UserResponse,
        schema::{UserDoc, USERNAME_FIELD},
    },
    store::{DocStore, Filter, ReadOptions},
    utils::{hash_password, verify_password},
};

pub const DELETED_USER: &str = "DELETED_USER";

/// Accounts keyed by username. This is where usernames become user ids and
/// back; no other concept ever sees a username.
#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn DocStore<UserDoc>>,
}

impl UserService {
    pub fn with_store(repo: Arc<dyn DocStore<UserDoc>>) -> Self {
        info!("UserService initialized on collection {}", repo.collection());
        UserService { repo }
    }

    fn by_username(username: &str) -> Filter {
        Filter::all().eq(USERNAME_FIELD, username)
    }

    async fn assert_username_unique(&self, username: &str) -> Result<(), error::SystemError> {
        if self.repo.read_one(&Self::by_username(username)).await?.is_some() {
            return Err(ConceptError::already_exists(format!(
                "User with username {username} already exists!"
            ))
            .into());
        }
        Ok(())
    }

    pub async fn create(
        &self,
        username: &str,
        password: &str,
    ) -> Result<UserResponse, error::SystemError> {
        self.assert_username_unique(username).await?;

        let password = hash_password(password)?;
        let id = self
            .repo
            .create_one(&UserDoc { username: username.to_owned(), password })
            .await
            .map_err(|err| {
                if err.is_conflict() {
                    ConceptError::already_exists(format!(
                        "User with username {username} already exists!"
                    ))
                    .into()
                } else {
                    err
                }
            })?;

        info!("User {username} created with id {id}");
        self.get_user_by_id(id).await
    }

    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Uuid, error::SystemError> {
        let invalid = || ConceptError::not_allowed("Username or password is incorrect.");

        let user = self.repo.read_one(&Self::by_username(username)).await?.ok_or_else(invalid)?;

        if !verify_password(&user.fields.password, password)? {
            return Err(invalid().into());
        }

        Ok(user.id)
    }

    pub async fn get_user_by_id(&self, id: Uuid) -> Result<UserResponse, error::SystemError> {
        let user = self
            .repo
            .read_one(&Filter::by_id(id))
            .await?
            .ok_or_else(|| ConceptError::not_found(format!("User {id} does not exist!")))?;

        Ok(UserResponse::from(user))
    }

    pub async fn get_user_by_username(
        &self,
        username: &str,
    ) -> Result<UserResponse, error::SystemError> {
        let user =
            self.repo.read_one(&Self::by_username(username)).await?.ok_or_else(|| {
                ConceptError::not_found(format!("User with username {username} does not exist!"))
            })?;

        Ok(UserResponse::from(user))
    }

    pub async fn get_users(&self) -> Result<Vec<UserResponse>, error::SystemError> {
        let users = self.repo.read_many(&Filter::all(), &ReadOptions::chronological()).await?;
        Ok(users.into_iter().map(UserResponse::from).collect())
    }

    /// Username to user id.
    pub async fn resolve(&self, username: &str) -> Result<Uuid, error::SystemError> {
        Ok(self.get_user_by_username(username).await?.id)
    }

    /// User ids to usernames, in input order. Ids without an account map to
    /// [`DELETED_USER`].
    pub async fn ids_to_usernames(&self, ids: &[Uuid]) -> Result<Vec<String>, error::SystemError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let users = self.repo.read_many(&Filter::any_id(ids), &ReadOptions::default()).await?;
        let names: HashMap<Uuid, String> =
            users.into_iter().map(|user| (user.id, user.fields.username)).collect();

        Ok(ids
            .iter()
            .map(|id| names.get(id).cloned().unwrap_or_else(|| DELETED_USER.to_owned()))
            .collect())
    }

    pub async fn update_username(
        &self,
        id: Uuid,
        username: &str,
    ) -> Result<(), error::SystemError> {
        self.assert_username_unique(username).await?;

        let updated = self
            .repo
            .update_one(&Filter::by_id(id), &serde_json::json!({ USERNAME_FIELD: username }))
            .await?;
        if !updated {
            return Err(ConceptError::not_found(format!("User {id} does not exist!")).into());
        }

        info!("User {id} renamed to {username}");
        Ok(())
    }

    pub async fn update_password(
        &self,
        id: Uuid,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), error::SystemError> {
        let user = self
            .repo
            .read_one(&Filter::by_id(id))
            .await?
            .ok_or_else(|| ConceptError::not_found(format!("User {id} does not exist!")))?;

        if !verify_password(&user.fields.password, current_password)? {
            return Err(ConceptError::not_allowed("The given current password is wrong!").into());
        }

        let password = hash_password(new_password)?;
        self.repo
            .update_one(&Filter::by_id(id), &serde_json::json!({ "password": password }))
            .await?;

        info!("Password of user {id} updated");
        Ok(())
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), error::SystemError> {
        if !self.repo.delete_one(&Filter::by_id(id)).await? {
            return Err(ConceptError::not_found(format!("User {id} does not exist!")).into());
        }

        info!("User {id} deleted");
        Ok(())
    }
}
