use std::sync::Arc;

use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    api::error,
    store::{Doc, DocStore, MemoryStore, PgStore},
};

pub async fn connect_database(database_url: &str) -> Result<PgPool, error::SystemError> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .min_connections(1)
        .acquire_slow_threshold(std::time::Duration::from_secs(3))
        .connect(database_url)
        .await?;

    sqlx::migrate!().run(&pool).await?;
    log::info!("Database migrations applied");

    Ok(pool)
}

/// Hands each concept its own collection on the configured backend.
#[derive(Clone)]
pub enum Stores {
    Postgres(PgPool),
    Memory,
}

impl Stores {
    pub async fn from_url(database_url: Option<&str>) -> Result<Self, error::SystemError> {
        match database_url {
            Some(url) => Ok(Stores::Postgres(connect_database(url).await?)),
            None => {
                log::warn!("DATABASE_URL not set, state will not survive a restart");
                Ok(Stores::Memory)
            }
        }
    }

    /// `unique_keys` mirror the partial unique indexes in `migrations/`.
    pub fn collection<T: Doc>(&self, name: &str, unique_keys: &[&str]) -> Arc<dyn DocStore<T>> {
        match self {
            Stores::Postgres(pool) => Arc::new(PgStore::<T>::new(pool.clone(), name)),
            Stores::Memory => {
                let store = unique_keys
                    .iter()
                    .fold(MemoryStore::<T>::new(name), |store, key| store.with_unique_key(key));
                Arc::new(store)
            }
        }
    }
}
