//! In-memory document store
//!
//! Stands in for the hosted document service in tests and demos.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::traits::{apply_update, not_found, stamp_created, DocumentStore};
use crate::domain::{Document, DomainError, DomainResult, ListQuery, Scope};

#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<Scope, BTreeMap<String, Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in a scope
    pub async fn count(&self, scope: &Scope) -> usize {
        self.collections
            .read()
            .await
            .get(scope)
            .map(|c| c.len())
            .unwrap_or(0)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn create(&self, scope: &Scope, id: &str, fields: Document) -> DomainResult<Document> {
        let mut guard = self.collections.write().await;
        let collection = guard.entry(scope.clone()).or_default();

        if collection.contains_key(id) {
            return Err(DomainError::Conflict(format!("{}/{} already exists", scope, id)));
        }

        let doc = stamp_created(fields);
        collection.insert(id.to_string(), doc.clone());
        Ok(doc)
    }

    async fn get(&self, scope: &Scope, id: &str) -> DomainResult<Option<Document>> {
        let guard = self.collections.read().await;
        Ok(guard.get(scope).and_then(|c| c.get(id)).cloned())
    }

    async fn list(&self, scope: &Scope, query: &ListQuery) -> DomainResult<Vec<Document>> {
        let guard = self.collections.read().await;
        let docs = guard
            .get(scope)
            .map(|c| c.values().cloned().collect::<Vec<_>>())
            .unwrap_or_default();
        Ok(query.apply(docs))
    }

    async fn update(&self, scope: &Scope, id: &str, patch: Document) -> DomainResult<Document> {
        let mut guard = self.collections.write().await;
        let doc = guard
            .get_mut(scope)
            .and_then(|c| c.get_mut(id))
            .ok_or_else(|| not_found(scope, id))?;

        apply_update(doc, &patch);
        Ok(doc.clone())
    }

    async fn delete(&self, scope: &Scope, id: &str) -> DomainResult<()> {
        let mut guard = self.collections.write().await;
        if let Some(collection) = guard.get_mut(scope) {
            collection.remove(id);
        }
        Ok(())
    }
}
