//! # MongoDB
//!
//! Document store holding the `thoughts` collection.
//!
//! ## Layout
//!
//! - One collection, one document per thought
//! - Fields: `_id` (**ObjectId**), message (**string**), name (**string**), likes (**int**), createdAt (**date**)
//! - No secondary indexes, listing sorts on `createdAt` and stops at 20
//! - Ties on `createdAt` (same millisecond) fall back to `_id`, newest insert first
//!
//! ## Atomicity
//!
//! - Likes go through `findOneAndUpdate` with `$inc`, so concurrent likes never lose a count
//! - Deletes go through `findOneAndDelete`, so the deleted document comes back in the same round trip
//!
//! ## Backends
//!
//! [`ThoughtStore`] is the seam handlers talk to. [`MongoStore`] is the real one.
//! Setting `MONGO_URL=memory` swaps in [`MemoryStore`] for local runs without a database.
use std::sync::Arc;

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    Client, Collection,
    bson::{Document, doc, oid::ObjectId},
    options::ReturnDocument,
};
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    memory::MemoryStore,
    models::{
        THOUGHT_CREATED_AT, THOUGHT_ID, THOUGHT_LIKES, THOUGHTS_COLLECTION, Thought,
        ThoughtDocument, ValidThought, now,
    },
};

pub const DEFAULT_DATABASE: &str = "project-mongo";
pub const MEMORY_URL: &str = "memory";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),
}

#[async_trait]
pub trait ThoughtStore: Send + Sync {
    /// Newest first, at most `limit`.
    async fn recent(&self, limit: usize) -> Result<Vec<Thought>, StoreError>;

    async fn insert(&self, thought: ValidThought) -> Result<Thought, StoreError>;

    /// Adds one like and returns the updated thought, `None` if the id is unknown.
    async fn like(&self, id: &ObjectId) -> Result<Option<Thought>, StoreError>;

    /// Removes the thought and returns it, `None` if the id is unknown.
    async fn delete(&self, id: &ObjectId) -> Result<Option<Thought>, StoreError>;
}

/// Sort for the listing. Generated ObjectIds grow with insert order, so `_id` breaks `createdAt` ties.
pub fn recent_sort() -> Document {
    doc! { THOUGHT_CREATED_AT: -1, THOUGHT_ID: -1 }
}

pub struct MongoStore {
    thoughts: Collection<ThoughtDocument>,
}

impl MongoStore {
    pub async fn connect(mongo_url: &str) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(mongo_url).await?;
        let database = client
            .default_database()
            .unwrap_or_else(|| client.database(DEFAULT_DATABASE));

        database.run_command(doc! { "ping": 1 }).await?;
        info!("Connected to database {}", database.name());

        Ok(Self {
            thoughts: database.collection(THOUGHTS_COLLECTION),
        })
    }
}

#[async_trait]
impl ThoughtStore for MongoStore {
    async fn recent(&self, limit: usize) -> Result<Vec<Thought>, StoreError> {
        let documents: Vec<ThoughtDocument> = self
            .thoughts
            .find(doc! {})
            .sort(recent_sort())
            .limit(limit as i64)
            .await?
            .try_collect()
            .await?;

        Ok(documents.into_iter().map(Thought::from).collect())
    }

    async fn insert(&self, thought: ValidThought) -> Result<Thought, StoreError> {
        let document = ThoughtDocument::new(thought, now());
        self.thoughts.insert_one(&document).await?;

        debug!("Inserted thought {}", document.id);
        Ok(document.into())
    }

    async fn like(&self, id: &ObjectId) -> Result<Option<Thought>, StoreError> {
        let updated = self
            .thoughts
            .find_one_and_update(
                doc! { THOUGHT_ID: *id },
                doc! { "$inc": { THOUGHT_LIKES: 1 } },
            )
            .return_document(ReturnDocument::After)
            .await?;

        Ok(updated.map(Thought::from))
    }

    async fn delete(&self, id: &ObjectId) -> Result<Option<Thought>, StoreError> {
        let deleted = self
            .thoughts
            .find_one_and_delete(doc! { THOUGHT_ID: *id })
            .await?;

        Ok(deleted.map(Thought::from))
    }
}

pub async fn init_store(mongo_url: &str) -> Result<Arc<dyn ThoughtStore>, StoreError> {
    if mongo_url == MEMORY_URL {
        info!("Using in-memory store, thoughts will not survive a restart");
        return Ok(Arc::new(MemoryStore::new()));
    }

    Ok(Arc::new(MongoStore::connect(mongo_url).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_url_skips_database() {
        let store = init_store(MEMORY_URL).await.unwrap();

        assert!(store.recent(20).await.unwrap().is_empty());
    }

    #[test]
    fn test_recent_sort_breaks_ties_on_id() {
        let sort = recent_sort();
        let keys: Vec<&str> = sort.keys().map(String::as_str).collect();

        assert_eq!(keys, [THOUGHT_CREATED_AT, THOUGHT_ID]);
        assert_eq!(sort.get_i32(THOUGHT_CREATED_AT).unwrap(), -1);
        assert_eq!(sort.get_i32(THOUGHT_ID).unwrap(), -1);
    }

    fn thought(message: &str) -> ValidThought {
        ValidThought {
            message: message.into(),
            name: "tester".into(),
        }
    }

    // cargo test -p thoughts-server -- --ignored, with MONGO_URL pointing at a disposable database
    #[tokio::test]
    #[ignore = "needs a running MongoDB at MONGO_URL"]
    async fn test_mongo_store_round_trip() {
        let url = std::env::var("MONGO_URL")
            .unwrap_or_else(|_| crate::config::DEFAULT_MONGO_URL.into());
        let store = MongoStore::connect(&url).await.unwrap();

        let first = store.insert(thought("first in line")).await.unwrap();
        let second = store.insert(thought("second in line")).await.unwrap();
        let first_id = ObjectId::parse_str(&first.id).unwrap();
        let second_id = ObjectId::parse_str(&second.id).unwrap();

        let recent = store.recent(20).await.unwrap();
        let ours: Vec<&str> = recent
            .iter()
            .map(|t| t.id.as_str())
            .filter(|id| *id == first.id || *id == second.id)
            .collect();
        assert_eq!(ours, [second.id.as_str(), first.id.as_str()]);
        assert_eq!(store.recent(20).await.unwrap(), recent);

        store.like(&first_id).await.unwrap();
        let liked = store.like(&first_id).await.unwrap().unwrap();
        assert_eq!(liked.likes, 2);
        assert_eq!(liked.message, first.message);
        assert_eq!(liked.created_at, first.created_at);

        let deleted = store.delete(&first_id).await.unwrap().unwrap();
        assert_eq!(deleted.likes, 2);
        assert!(store.delete(&first_id).await.unwrap().is_none());
        assert!(store.like(&first_id).await.unwrap().is_none());

        store.delete(&second_id).await.unwrap();
    }
}
