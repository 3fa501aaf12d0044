use log::{debug, info};
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    api::error::{self, ConceptError},
    modules::relationship::{
        model::{FriendRequest, Friendship},
        schema::{
            pair_key, RelationState, RelationshipDoc, CONFIRMED, PAIR_FIELD, PENDING, STATUS_FIELD,
        },
    },
    store::{DocStore, Document, Filter, ReadOptions},
};

/// Friend requests and friendships between opaque user ids.
///
/// Per unordered pair the state is one of none, pending (directed) or
/// confirmed. All domain errors are raised before any write.
#[derive(Clone)]
pub struct RelationshipService {
    store: Arc<dyn DocStore<RelationshipDoc>>,
}

impl RelationshipService {
    pub fn with_store(store: Arc<dyn DocStore<RelationshipDoc>>) -> Self {
        info!("RelationshipService initialized on collection {}", store.collection());
        RelationshipService { store }
    }

    fn pair(user_a: &Uuid, user_b: &Uuid) -> Filter {
        Filter::all().eq(PAIR_FIELD, pair_key(user_a, user_b))
    }

    fn pending(from: &Uuid, to: &Uuid) -> Filter {
        Self::pair(from, to).eq(STATUS_FIELD, PENDING).eq("from", from).eq("to", to)
    }

    fn friendship(user_a: &Uuid, user_b: &Uuid) -> Filter {
        Self::pair(user_a, user_b).eq(STATUS_FIELD, CONFIRMED)
    }

    fn occupied(existing: &Document<RelationshipDoc>, from: Uuid, to: Uuid) -> ConceptError {
        match existing.fields.state {
            RelationState::Confirmed { .. } => ConceptError::AlreadyFriends(from, to),
            RelationState::Pending { .. } => ConceptError::DuplicateRequest(from, to),
        }
    }

    fn request_not_found(from: &Uuid, to: &Uuid) -> error::SystemError {
        ConceptError::not_found(format!("Friend request from {from} to {to} does not exist!"))
            .into()
    }

    pub async fn send_request(
        &self,
        from: Uuid,
        to: Uuid,
    ) -> Result<FriendRequest, error::SystemError> {
        if from == to {
            return Err(ConceptError::self_reference("Cannot send a friend request to yourself!")
                .into());
        }

        if let Some(existing) = self.store.read_one(&Self::pair(&from, &to)).await? {
            return Err(Self::occupied(&existing, from, to).into());
        }

        // A concurrent writer may have claimed the pair since the check above;
        // the unique pair key turns that into a conflict instead of a duplicate.
        let id = match self.store.create_one(&RelationshipDoc::pending(from, to)).await {
            Ok(id) => id,
            Err(err) if err.is_conflict() => {
                let existing = self.store.read_one(&Self::pair(&from, &to)).await?;
                return Err(existing
                    .map(|doc| Self::occupied(&doc, from, to))
                    .unwrap_or(ConceptError::DuplicateRequest(from, to))
                    .into());
            }
            Err(err) => return Err(err),
        };

        info!("Friend request {id} sent from {from} to {to}");
        Ok(FriendRequest { id, from, to })
    }

    /// Promotes the pending request `from -> to` into a friendship with a
    /// single document update.
    pub async fn accept_request(
        &self,
        from: Uuid,
        to: Uuid,
    ) -> Result<Friendship, error::SystemError> {
        let request = self
            .store
            .read_one(&Self::pending(&from, &to))
            .await?
            .ok_or_else(|| Self::request_not_found(&from, &to))?;

        let mut patch = serde_json::to_value(RelationState::Confirmed { user1: from, user2: to })?;
        if let Value::Object(fields) = &mut patch {
            fields.insert("from".into(), Value::Null);
            fields.insert("to".into(), Value::Null);
        }

        let promoted = self
            .store
            .update_one(&Filter::by_id(request.id).eq(STATUS_FIELD, PENDING), &patch)
            .await?;
        if !promoted {
            // Rejected or withdrawn between the read and the update.
            return Err(Self::request_not_found(&from, &to));
        }

        info!("Friend request {} accepted, {from} and {to} are friends", request.id);
        Ok(Friendship { id: request.id, user1: from, user2: to })
    }

    pub async fn reject_request(&self, from: Uuid, to: Uuid) -> Result<(), error::SystemError> {
        if !self.store.delete_one(&Self::pending(&from, &to)).await? {
            return Err(Self::request_not_found(&from, &to));
        }

        info!("Friend request from {from} to {to} rejected");
        Ok(())
    }

    /// Withdrawal by the sender. Same transition as a rejection; which side
    /// the caller is on is decided by whoever supplies `from`.
    pub async fn remove_request(&self, from: Uuid, to: Uuid) -> Result<(), error::SystemError> {
        if !self.store.delete_one(&Self::pending(&from, &to)).await? {
            return Err(Self::request_not_found(&from, &to));
        }

        info!("Friend request from {from} to {to} withdrawn");
        Ok(())
    }

    pub async fn remove_friend(&self, user: Uuid, friend: Uuid) -> Result<(), error::SystemError> {
        if !self.store.delete_one(&Self::friendship(&user, &friend)).await? {
            return Err(ConceptError::not_found(format!(
                "Friendship between {user} and {friend} does not exist!"
            ))
            .into());
        }

        info!("Friendship between {user} and {friend} removed");
        Ok(())
    }

    /// Pending requests where `user` is either sender or addressee, oldest first.
    pub async fn get_requests(&self, user: Uuid) -> Result<Vec<FriendRequest>, error::SystemError> {
        let filter = Filter::all()
            .eq("from", user)
            .or(Filter::all().eq("to", user))
            .eq(STATUS_FIELD, PENDING);

        let docs = self.store.read_many(&filter, &ReadOptions::chronological()).await?;
        Ok(docs.iter().filter_map(|doc| doc.as_request()).collect())
    }

    pub async fn get_friends(&self, user: Uuid) -> Result<Vec<Uuid>, error::SystemError> {
        let filter = Filter::all()
            .eq("user1", user)
            .or(Filter::all().eq("user2", user))
            .eq(STATUS_FIELD, CONFIRMED);

        let docs = self.store.read_many(&filter, &ReadOptions::chronological()).await?;
        let friends: Vec<Uuid> = docs
            .iter()
            .filter_map(|doc| doc.as_friendship())
            .map(|friendship| friendship.other(&user))
            .collect();

        debug!("User {user} has {} friends", friends.len());
        Ok(friends)
    }

    /// Drops every pending and confirmed record involving `user`.
    pub async fn forget_user(&self, user: Uuid) -> Result<u64, error::SystemError> {
        let filter = ["from", "to", "user1", "user2"]
            .into_iter()
            .fold(Filter::none(), |filter, field| filter.or(Filter::all().eq(field, user)));

        let removed = self.store.delete_many(&filter).await?;
        info!("Removed {removed} relationship records of user {user}");
        Ok(removed)
    }
}
