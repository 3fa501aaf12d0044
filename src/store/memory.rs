use std::marker::PhantomData;

use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    api::error,
    store::{apply_patch, prepare_patch, Doc, DocStore, Document, Filter, ReadOptions},
};

/// In-process collection. Documents keep insertion order, so "first match"
/// means oldest match. A single lock guards the collection, which makes
/// unique-key checks and the write that follows them one atomic step.
pub struct MemoryStore<T> {
    collection: String,
    unique_keys: Vec<String>,
    docs: RwLock<Vec<Value>>,
    _shape: PhantomData<fn() -> T>,
}

impl<T: Doc> MemoryStore<T> {
    pub fn new(collection: &str) -> Self {
        Self {
            collection: collection.to_owned(),
            unique_keys: Vec::new(),
            docs: RwLock::new(Vec::new()),
            _shape: PhantomData,
        }
    }

    /// Rejects any write that would give two documents the same value for
    /// `field`. Documents without the field are not constrained.
    pub fn with_unique_key(mut self, field: &str) -> Self {
        self.unique_keys.push(field.to_owned());
        self
    }

    fn check_unique(
        &self,
        docs: &[Value],
        candidate: &Value,
        skip: Option<usize>,
    ) -> Result<(), error::SystemError> {
        for key in &self.unique_keys {
            let Some(value) = candidate.get(key) else {
                continue;
            };

            let taken = docs
                .iter()
                .enumerate()
                .any(|(i, doc)| Some(i) != skip && doc.get(key) == Some(value));

            if taken {
                log::warn!("Unique key {}.{} violated by {}", self.collection, key, value);
                return Err(error::SystemError::Conflict(Some(error::DbErrorMeta {
                    code: None,
                    constraint: Some(format!("{}_{}", self.collection, key)),
                    message: format!("duplicate value for {key}"),
                })));
            }
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl<T: Doc> DocStore<T> for MemoryStore<T> {
    fn collection(&self) -> &str {
        &self.collection
    }

    async fn create_one(&self, fields: &T) -> Result<Uuid, error::SystemError> {
        let (id, body) = Document::stamp(fields)?;

        let mut docs = self.docs.write().await;
        self.check_unique(&docs, &body, None)?;
        docs.push(body);

        Ok(id)
    }

    async fn read_one(&self, filter: &Filter) -> Result<Option<Document<T>>, error::SystemError> {
        let docs = self.docs.read().await;
        docs.iter().find(|doc| filter.matches(doc)).cloned().map(Document::from_value).transpose()
    }

    async fn read_many(
        &self,
        filter: &Filter,
        options: &ReadOptions,
    ) -> Result<Vec<Document<T>>, error::SystemError> {
        let mut matched: Vec<Value> = {
            let docs = self.docs.read().await;
            docs.iter().filter(|doc| filter.matches(doc)).cloned().collect()
        };

        if let Some(sort) = &options.sort {
            matched.sort_by(|a, b| sort.compare(a, b));
        }

        matched.into_iter().map(Document::from_value).collect()
    }

    async fn update_one(&self, filter: &Filter, patch: &Value) -> Result<bool, error::SystemError> {
        let patch = prepare_patch(patch)?;

        let mut docs = self.docs.write().await;
        let Some(index) = docs.iter().position(|doc| filter.matches(doc)) else {
            return Ok(false);
        };

        let mut updated = docs[index].clone();
        apply_patch(&mut updated, &patch);
        self.check_unique(&docs, &updated, Some(index))?;
        docs[index] = updated;

        Ok(true)
    }

    async fn delete_one(&self, filter: &Filter) -> Result<bool, error::SystemError> {
        let mut docs = self.docs.write().await;
        match docs.iter().position(|doc| filter.matches(doc)) {
            Some(index) => {
                docs.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_many(&self, filter: &Filter) -> Result<u64, error::SystemError> {
        let mut docs = self.docs.write().await;
        let before = docs.len();
        docs.retain(|doc| !filter.matches(doc));
        Ok((before - docs.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde::{Deserialize, Serialize};
    use serde_json::json;

    use super::*;
    use crate::store::{Direction, CREATED_FIELD};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Item {
        name: String,
        rank: i64,
        note: Option<String>,
    }

    fn item(name: &str, rank: i64) -> Item {
        Item { name: name.into(), rank, note: None }
    }

    #[tokio::test]
    async fn create_then_read_back_by_id() {
        let store = MemoryStore::<Item>::new("items");
        let id = store.create_one(&item("a", 1)).await.expect("create");

        let doc = store.read_one(&Filter::by_id(id)).await.expect("read").expect("exists");
        assert_eq!(doc.id, id);
        assert_eq!(doc.fields, item("a", 1));
        assert_eq!(store.collection(), "items");
    }

    #[tokio::test]
    async fn duplicate_content_is_not_an_error_without_unique_keys() {
        let store = MemoryStore::<Item>::new("items");
        let first = store.create_one(&item("a", 1)).await.expect("first");
        let second = store.create_one(&item("a", 1)).await.expect("second");
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn read_one_returns_first_match_or_none() {
        let store = MemoryStore::<Item>::new("items");
        store.create_one(&item("a", 1)).await.expect("create");
        store.create_one(&item("a", 2)).await.expect("create");

        let first = store.read_one(&Filter::all().eq("name", "a")).await.expect("read");
        assert_eq!(first.map(|d| d.fields.rank), Some(1));

        let missing = store.read_one(&Filter::all().eq("name", "z")).await.expect("read");
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn read_many_filters_and_sorts() {
        let store = MemoryStore::<Item>::new("items");
        for (name, rank) in [("a", 3), ("b", 1), ("a", 2)] {
            store.create_one(&item(name, rank)).await.expect("create");
        }

        let unsorted = store
            .read_many(&Filter::all().eq("name", "a"), &ReadOptions::default())
            .await
            .expect("read");
        assert_eq!(unsorted.iter().map(|d| d.fields.rank).collect::<Vec<_>>(), vec![3, 2]);

        let sorted = store
            .read_many(&Filter::all(), &ReadOptions::sorted_by("rank", Direction::Descending))
            .await
            .expect("read");
        assert_eq!(sorted.iter().map(|d| d.fields.rank).collect::<Vec<_>>(), vec![3, 2, 1]);

        let by_creation =
            store.read_many(&Filter::all(), &ReadOptions::chronological()).await.expect("read");
        assert_eq!(by_creation.len(), 3);
        assert!(by_creation.windows(2).all(|w| w[0].date_created <= w[1].date_created));

        let none = store.read_many(&Filter::none(), &ReadOptions::default()).await.expect("read");
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn update_one_patches_first_match_and_refreshes_timestamp() {
        let store = MemoryStore::<Item>::new("items");
        let id = store
            .create_one(&Item { name: "a".into(), rank: 1, note: Some("x".into()) })
            .await
            .expect("create");
        let before = store.read_one(&Filter::by_id(id)).await.expect("read").expect("exists");

        let patch = json!({ "rank": 5, "note": null, CREATED_FIELD: "nope" });
        let updated = store.update_one(&Filter::by_id(id), &patch).await.expect("update");
        assert!(updated);

        let after = store.read_one(&Filter::by_id(id)).await.expect("read").expect("exists");
        assert_eq!(after.fields, item("a", 5));
        assert_eq!(after.date_created, before.date_created);
        assert!(after.date_updated >= before.date_updated);
    }

    #[tokio::test]
    async fn update_one_without_match_is_a_no_op() {
        let store = MemoryStore::<Item>::new("items");
        store.create_one(&item("a", 1)).await.expect("create");

        let updated = store
            .update_one(&Filter::all().eq("name", "z"), &json!({ "rank": 9 }))
            .await
            .expect("update");
        assert!(!updated);

        let all = store.read_many(&Filter::all(), &ReadOptions::default()).await.expect("read");
        assert_eq!(all[0].fields, item("a", 1));
    }

    #[tokio::test]
    async fn delete_one_and_delete_many_report_what_they_removed() {
        let store = MemoryStore::<Item>::new("items");
        for (name, rank) in [("a", 1), ("a", 2), ("b", 3)] {
            store.create_one(&item(name, rank)).await.expect("create");
        }

        assert!(store.delete_one(&Filter::all().eq("name", "b")).await.expect("delete"));
        assert!(!store.delete_one(&Filter::all().eq("name", "b")).await.expect("delete"));

        assert_eq!(store.delete_many(&Filter::all().eq("name", "a")).await.expect("delete"), 2);
        assert_eq!(store.delete_many(&Filter::all()).await.expect("delete"), 0);
    }

    #[tokio::test]
    async fn unique_key_rejects_second_write() {
        let store = MemoryStore::<Item>::new("items").with_unique_key("name");
        store.create_one(&item("a", 1)).await.expect("first");

        let err = store.create_one(&item("a", 2)).await.expect_err("duplicate name");
        assert!(err.is_conflict());

        let id = store.create_one(&item("b", 2)).await.expect("other name");
        let err = store
            .update_one(&Filter::by_id(id), &json!({ "name": "a" }))
            .await
            .expect_err("rename onto existing");
        assert!(err.is_conflict());

        // Rewriting a document's own key is fine.
        assert!(store.update_one(&Filter::by_id(id), &json!({ "name": "b" })).await.expect("same"));
    }

    #[tokio::test]
    async fn concurrent_creates_with_same_key_leave_one_document() {
        let store = Arc::new(MemoryStore::<Item>::new("items").with_unique_key("name"));

        let handles: Vec<_> = (0..8)
            .map(|rank| {
                let store = store.clone();
                tokio::spawn(async move { store.create_one(&item("same", rank)).await })
            })
            .collect();

        let mut created = 0;
        for handle in handles {
            if handle.await.expect("join").is_ok() {
                created += 1;
            }
        }

        assert_eq!(created, 1);
        let all = store.read_many(&Filter::all(), &ReadOptions::default()).await.expect("read");
        assert_eq!(all.len(), 1);
    }
}
