use std::marker::PhantomData;

use serde_json::Value;
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    api::error,
    store::{
        prepare_patch, Direction, Doc, DocStore, Document, Filter, ReadOptions, CREATED_FIELD,
        ID_FIELD, UPDATED_FIELD,
    },
};

/// Collection stored as JSONB rows in the shared `documents` table.
///
/// Filters compile to `body @> $n` containment checks. Unique keys are
/// partial unique indexes created by the migrations, so a violating write
/// surfaces as [`error::SystemError::Conflict`].
#[derive(Clone)]
pub struct PgStore<T> {
    pool: sqlx::PgPool,
    collection: String,
    _shape: PhantomData<fn() -> T>,
}

impl<T: Doc> PgStore<T> {
    pub fn new(pool: sqlx::PgPool, collection: &str) -> Self {
        Self { pool, collection: collection.to_owned(), _shape: PhantomData }
    }
}

fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, collection: &str, filter: &Filter) {
    qb.push(" WHERE collection = ").push_bind(collection.to_owned()).push(" AND (");

    if filter.clauses().is_empty() {
        qb.push("FALSE");
    } else {
        let mut clauses = qb.separated(" OR ");
        for clause in filter.clauses() {
            clauses.push("body @> ").push_bind_unseparated(Value::Object(clause.clone()));
        }
    }

    qb.push(")");
}

/// `id = (first match, locked)` so a single-row write holds the row it
/// targets until it commits.
fn push_first_match(qb: &mut QueryBuilder<'_, Postgres>, collection: &str, filter: &Filter) {
    qb.push(" WHERE id = (SELECT id FROM documents");
    push_filter(qb, collection, filter);
    qb.push(" ORDER BY seq LIMIT 1 FOR UPDATE)");
}

/// Timestamps are stored as RFC 3339 strings and compare as `timestamptz`.
/// Ties and unsorted reads fall back to insertion order.
fn push_order(qb: &mut QueryBuilder<'_, Postgres>, options: &ReadOptions) {
    let Some(sort) = &options.sort else {
        qb.push(" ORDER BY seq");
        return;
    };

    qb.push(" ORDER BY ");
    match sort.key.as_str() {
        ID_FIELD => {
            qb.push("id");
        }
        CREATED_FIELD | UPDATED_FIELD => {
            qb.push("(body ->> ").push_bind(sort.key.clone()).push(")::timestamptz");
        }
        key => {
            qb.push("body -> ").push_bind(key.to_owned());
        }
    }
    qb.push(match sort.direction {
        Direction::Ascending => " ASC NULLS FIRST, seq",
        Direction::Descending => " DESC NULLS LAST, seq",
    });
}

#[async_trait::async_trait]
impl<T: Doc> DocStore<T> for PgStore<T> {
    fn collection(&self) -> &str {
        &self.collection
    }

    async fn create_one(&self, fields: &T) -> Result<Uuid, error::SystemError> {
        let (id, body) = Document::stamp(fields)?;

        sqlx::query("INSERT INTO documents (id, collection, body) VALUES ($1, $2, $3)")
            .bind(id)
            .bind(&self.collection)
            .bind(body)
            .execute(&self.pool)
            .await?;

        Ok(id)
    }

    async fn read_one(&self, filter: &Filter) -> Result<Option<Document<T>>, error::SystemError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT body FROM documents");
        push_filter(&mut qb, &self.collection, filter);
        qb.push(" ORDER BY seq LIMIT 1");

        let body = qb.build_query_scalar::<Value>().fetch_optional(&self.pool).await?;

        body.map(Document::from_value).transpose()
    }

    async fn read_many(
        &self,
        filter: &Filter,
        options: &ReadOptions,
    ) -> Result<Vec<Document<T>>, error::SystemError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT body FROM documents");
        push_filter(&mut qb, &self.collection, filter);
        push_order(&mut qb, options);

        let bodies = qb.build_query_scalar::<Value>().fetch_all(&self.pool).await?;

        bodies.into_iter().map(Document::from_value).collect()
    }

    async fn update_one(&self, filter: &Filter, patch: &Value) -> Result<bool, error::SystemError> {
        let patch = prepare_patch(patch)?;

        // `jsonb_strip_nulls` turns explicit nulls in the patch into removals.
        let mut qb = QueryBuilder::<Postgres>::new(
            "UPDATE documents SET updated_at = NOW(), body = jsonb_strip_nulls(body || ",
        );
        qb.push_bind(Value::Object(patch)).push(")");
        push_first_match(&mut qb, &self.collection, filter);

        let rows = qb.build().execute(&self.pool).await?.rows_affected();
        Ok(rows > 0)
    }

    async fn delete_one(&self, filter: &Filter) -> Result<bool, error::SystemError> {
        let mut qb = QueryBuilder::<Postgres>::new("DELETE FROM documents");
        push_first_match(&mut qb, &self.collection, filter);

        let rows = qb.build().execute(&self.pool).await?.rows_affected();
        Ok(rows > 0)
    }

    async fn delete_many(&self, filter: &Filter) -> Result<u64, error::SystemError> {
        let mut qb = QueryBuilder::<Postgres>::new("DELETE FROM documents");
        push_filter(&mut qb, &self.collection, filter);

        let rows = qb.build().execute(&self.pool).await?.rows_affected();
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn select(filter: &Filter, options: &ReadOptions) -> String {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT body FROM documents");
        push_filter(&mut qb, "posts", filter);
        push_order(&mut qb, options);
        qb.sql().to_owned()
    }

    #[test]
    fn empty_filter_selects_nothing() {
        assert_eq!(
            select(&Filter::none(), &ReadOptions::default()),
            "SELECT body FROM documents WHERE collection = $1 AND (FALSE) ORDER BY seq"
        );
    }

    #[test]
    fn filter_clauses_are_or_ed_containment_checks() {
        let filter = Filter::any_id(&[Uuid::now_v7(), Uuid::now_v7()]);
        assert_eq!(
            select(&filter, &ReadOptions::default()),
            "SELECT body FROM documents WHERE collection = $1 AND (body @> $2 OR body @> $3) \
             ORDER BY seq"
        );
    }

    #[test]
    fn timestamps_sort_as_timestamptz() {
        assert_eq!(
            select(&Filter::all(), &ReadOptions::chronological()),
            "SELECT body FROM documents WHERE collection = $1 AND (body @> $2) \
             ORDER BY (body ->> $3)::timestamptz ASC NULLS FIRST, seq"
        );
        assert_eq!(
            select(&Filter::all(), &ReadOptions::sorted_by(UPDATED_FIELD, Direction::Descending)),
            "SELECT body FROM documents WHERE collection = $1 AND (body @> $2) \
             ORDER BY (body ->> $3)::timestamptz DESC NULLS LAST, seq"
        );
    }

    #[test]
    fn other_sort_keys_use_the_column_or_jsonb_order() {
        assert_eq!(
            select(&Filter::all(), &ReadOptions::sorted_by(ID_FIELD, Direction::Descending)),
            "SELECT body FROM documents WHERE collection = $1 AND (body @> $2) \
             ORDER BY id DESC NULLS LAST, seq"
        );
        assert_eq!(
            select(&Filter::all(), &ReadOptions::sorted_by("rank", Direction::Ascending)),
            "SELECT body FROM documents WHERE collection = $1 AND (body @> $2) \
             ORDER BY body -> $3 ASC NULLS FIRST, seq"
        );
    }

    #[test]
    fn single_row_writes_lock_the_first_match() {
        let mut qb = QueryBuilder::<Postgres>::new("DELETE FROM documents");
        push_first_match(&mut qb, "posts", &Filter::all().eq("author", "a"));
        assert_eq!(
            qb.sql(),
            "DELETE FROM documents WHERE id = (SELECT id FROM documents \
             WHERE collection = $1 AND (body @> $2) ORDER BY seq LIMIT 1 FOR UPDATE)"
        );
    }
}
