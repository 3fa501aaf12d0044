use log::info;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    api::error::{self, ConceptError},
    modules::badge::{
        model::Badge,
        schema::{BadgeDoc, BadgeType},
    },
    store::{DocStore, Filter, ReadOptions},
};

/// Badges shown on a user's profile until removed. Shame badges cannot be
/// removed by hand.
#[derive(Clone)]
pub struct BadgeService {
    repo: Arc<dyn DocStore<BadgeDoc>>,
}

impl BadgeService {
    pub fn with_store(repo: Arc<dyn DocStore<BadgeDoc>>) -> Self {
        info!("BadgeService initialized on collection {}", repo.collection());
        BadgeService { repo }
    }

    pub async fn give(&self, author: Uuid, kind: BadgeType) -> Result<Badge, error::SystemError> {
        let id = self.repo.create_one(&BadgeDoc { author, kind }).await?;
        info!("Badge {id} ({kind:?}) given to {author}");
        Ok(Badge { id, author, kind })
    }

    pub async fn get_by_author(&self, author: Uuid) -> Result<Vec<Badge>, error::SystemError> {
        let badges = self
            .repo
            .read_many(&Filter::all().eq("author", author), &ReadOptions::chronological())
            .await?;
        Ok(badges.into_iter().map(Badge::from).collect())
    }

    pub async fn remove(&self, id: Uuid) -> Result<(), error::SystemError> {
        let badge = self
            .repo
            .read_one(&Filter::by_id(id))
            .await?
            .ok_or_else(|| ConceptError::not_found(format!("Badge {id} does not exist!")))?;

        if badge.fields.kind == BadgeType::Shame {
            return Err(ConceptError::not_allowed("User cannot manually remove a badge of shame!")
                .into());
        }

        self.repo.delete_one(&Filter::by_id(id)).await?;
        info!("Badge {id} removed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn service() -> BadgeService {
        BadgeService::with_store(Arc::new(MemoryStore::<BadgeDoc>::new("badges")))
    }

    #[tokio::test]
    async fn badges_are_listed_per_author() {
        let badges = service();
        let alice = Uuid::now_v7();
        let bob = Uuid::now_v7();

        let verified = badges.give(alice, BadgeType::Verified).await.expect("give");
        badges.give(bob, BadgeType::Shame).await.expect("give");

        assert_eq!(badges.get_by_author(alice).await.expect("list"), vec![verified]);
    }

    #[tokio::test]
    async fn shame_badges_cannot_be_removed() {
        let badges = service();
        let alice = Uuid::now_v7();

        let shame = badges.give(alice, BadgeType::Shame).await.expect("give");
        let err = badges.remove(shame.id).await.expect_err("shame");
        assert!(matches!(err.concept(), Some(ConceptError::NotAllowed(_))));

        let verified = badges.give(alice, BadgeType::Verified).await.expect("give");
        badges.remove(verified.id).await.expect("remove");
        assert_eq!(badges.get_by_author(alice).await.expect("list"), vec![shame]);

        let err = badges.remove(verified.id).await.expect_err("gone");
        assert!(matches!(err.concept(), Some(ConceptError::NotFound(_))));
    }
}
