use serde::Serialize;
use uuid::Uuid;

use crate::{
    modules::relationship::schema::{RelationState, RelationshipDoc},
    store::Document,
};

/// A pending, directed proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FriendRequest {
    pub id: Uuid,
    pub from: Uuid,
    pub to: Uuid,
}

/// A confirmed friendship. Field order carries no meaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Friendship {
    pub id: Uuid,
    pub user1: Uuid,
    pub user2: Uuid,
}

impl Friendship {
    pub fn other(&self, user: &Uuid) -> Uuid {
        if self.user1 == *user {
            self.user2
        } else {
            self.user1
        }
    }
}

impl Document<RelationshipDoc> {
    pub fn as_request(&self) -> Option<FriendRequest> {
        match self.fields.state {
            RelationState::Pending { from, to } => Some(FriendRequest { id: self.id, from, to }),
            RelationState::Confirmed { .. } => None,
        }
    }

    pub fn as_friendship(&self) -> Option<Friendship> {
        match self.fields.state {
            RelationState::Confirmed { user1, user2 } => {
                Some(Friendship { id: self.id, user1, user2 })
            }
            RelationState::Pending { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FriendRequestResponse {
    pub id: Uuid,
    pub from: String,
    pub to: String,
}
