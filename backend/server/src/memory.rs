use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use tokio::sync::RwLock;

use crate::{
    database::{StoreError, ThoughtStore},
    models::{Thought, ThoughtDocument, ValidThought, now},
};

/// In-process store with the same contract as the MongoDB one (for development/testing).
#[derive(Default)]
pub struct MemoryStore {
    // insertion order
    documents: RwLock<Vec<ThoughtDocument>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

#[async_trait]
impl ThoughtStore for MemoryStore {
    async fn recent(&self, limit: usize) -> Result<Vec<Thought>, StoreError> {
        let documents = self.documents.read().await;

        // Later inserts win ties on equal timestamps
        let mut newest: Vec<&ThoughtDocument> = documents.iter().rev().collect();
        newest.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(newest
            .into_iter()
            .take(limit)
            .cloned()
            .map(Thought::from)
            .collect())
    }

    async fn insert(&self, thought: ValidThought) -> Result<Thought, StoreError> {
        let document = ThoughtDocument::new(thought, now());
        self.documents.write().await.push(document.clone());

        Ok(document.into())
    }

    async fn like(&self, id: &ObjectId) -> Result<Option<Thought>, StoreError> {
        let mut documents = self.documents.write().await;

        Ok(documents.iter_mut().find(|d| d.id == *id).map(|document| {
            document.likes += 1;
            Thought::from(document.clone())
        }))
    }

    async fn delete(&self, id: &ObjectId) -> Result<Option<Thought>, StoreError> {
        let mut documents = self.documents.write().await;

        Ok(documents
            .iter()
            .position(|d| d.id == *id)
            .map(|index| Thought::from(documents.remove(index))))
    }
}
