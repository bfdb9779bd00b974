//! Repository Layer - Core Traits
//!
//! Defines the abstract interface of the remote document service.
//! Implementations can use SQLite, in-memory, a hosted backend, etc.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::{
    from_document, merge_fields, now_ms, to_document, Document, DomainError, DomainResult, Entity,
    ListQuery, Scope,
};

/// Document service: CRUD on named collections.
///
/// All operations are async to support various backends.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Assign a fresh document id
    fn new_id(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }

    /// Write a new document, stamping `created_at`/`updated_at`
    async fn create(&self, scope: &Scope, id: &str, fields: Document) -> DomainResult<Document>;

    /// Find a document by ID
    async fn get(&self, scope: &Scope, id: &str) -> DomainResult<Option<Document>>;

    /// List documents matching the query
    async fn list(&self, scope: &Scope, query: &ListQuery) -> DomainResult<Vec<Document>>;

    /// Merge fields into an existing document, stamping `updated_at`
    async fn update(&self, scope: &Scope, id: &str, patch: Document) -> DomainResult<Document>;

    /// Delete a document; deleting a missing document is not an error
    async fn delete(&self, scope: &Scope, id: &str) -> DomainResult<()>;
}

pub(crate) fn stamp_created(mut fields: Document) -> Document {
    let now = serde_json::Value::from(now_ms());
    fields.insert("created_at".into(), now.clone());
    fields.insert("updated_at".into(), now);
    fields
}

pub(crate) fn apply_update(existing: &mut Document, patch: &Document) {
    merge_fields(existing, patch);
    existing.insert("updated_at".into(), serde_json::Value::from(now_ms()));
}

pub(crate) fn not_found(scope: &Scope, id: &str) -> DomainError {
    DomainError::NotFound(format!("{}/{}", scope, id))
}

/// Typed CRUD over one collection scope
pub struct Repository<T: Entity> {
    store: Arc<dyn DocumentStore>,
    scope: Scope,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            scope: self.scope.clone(),
            _entity: PhantomData,
        }
    }
}

impl<T: Entity> Repository<T> {
    /// Repository over a top-level collection
    pub fn root(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            scope: Scope::root(T::COLLECTION),
            _entity: PhantomData,
        }
    }

    /// Repository over a household sub-collection
    pub fn in_household(store: Arc<dyn DocumentStore>, household_id: &str) -> Self {
        Self {
            store,
            scope: Scope::household(household_id, T::COLLECTION),
            _entity: PhantomData,
        }
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn new_id(&self) -> String {
        self.store.new_id()
    }

    pub async fn create(&self, entity: &T) -> DomainResult<T> {
        let doc = to_document(entity)?;
        let stored = self.store.create(&self.scope, entity.id(), doc).await?;
        from_document(stored)
    }

    pub async fn find_by_id(&self, id: &str) -> DomainResult<Option<T>> {
        match self.store.get(&self.scope, id).await? {
            Some(doc) => Ok(Some(from_document(doc)?)),
            None => Ok(None),
        }
    }

    pub async fn list(&self, query: &ListQuery) -> DomainResult<Vec<T>> {
        self.store
            .list(&self.scope, query)
            .await?
            .into_iter()
            .map(from_document)
            .collect()
    }

    /// Apply a partial update; the patch must serialize to an object
    pub async fn update<P: Serialize + Sync>(&self, id: &str, patch: &P) -> DomainResult<T> {
        let doc = to_document(patch)?;
        let stored = self.store.update(&self.scope, id, doc).await?;
        from_document(stored)
    }

    pub async fn delete(&self, id: &str) -> DomainResult<()> {
        self.store.delete(&self.scope, id).await
    }
}
