//! SQLite document store
//!
//! Documents are stored as JSON bodies keyed by (scope, id). Queries are
//! evaluated with the shared `ListQuery` evaluator so results match the
//! in-memory store.

use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use tokio::sync::Mutex;

use super::traits::{apply_update, not_found, stamp_created, DocumentStore};
use crate::domain::{Document, DomainError, DomainResult, ListQuery, Scope};

pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }
}

fn parse_body(body: &str) -> DomainResult<Document> {
    Ok(serde_json::from_str(body)?)
}

fn read_doc(conn: &Connection, scope: &str, id: &str) -> DomainResult<Option<Document>> {
    let body: Option<String> = conn
        .query_row(
            "SELECT body FROM documents WHERE scope = ? AND id = ?",
            params![scope, id],
            |row| row.get(0),
        )
        .optional()?;
    body.as_deref().map(parse_body).transpose()
}

fn write_doc(conn: &Connection, scope: &str, id: &str, doc: &Document) -> DomainResult<()> {
    conn.execute(
        "INSERT OR REPLACE INTO documents (scope, id, body) VALUES (?, ?, ?)",
        params![scope, id, serde_json::to_string(doc)?],
    )?;
    Ok(())
}

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn create(&self, scope: &Scope, id: &str, fields: Document) -> DomainResult<Document> {
        let conn = self.conn.lock().await;
        let key = scope.to_string();

        if read_doc(&conn, &key, id)?.is_some() {
            return Err(DomainError::Conflict(format!("{}/{} already exists", scope, id)));
        }

        let doc = stamp_created(fields);
        write_doc(&conn, &key, id, &doc)?;
        Ok(doc)
    }

    async fn get(&self, scope: &Scope, id: &str) -> DomainResult<Option<Document>> {
        let conn = self.conn.lock().await;
        read_doc(&conn, &scope.to_string(), id)
    }

    async fn list(&self, scope: &Scope, query: &ListQuery) -> DomainResult<Vec<Document>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare("SELECT body FROM documents WHERE scope = ? ORDER BY id")?;
        let bodies = stmt.query_map(params![scope.to_string()], |row| row.get::<_, String>(0))?;

        let mut docs = Vec::new();
        for body in bodies {
            docs.push(parse_body(&body?)?);
        }
        Ok(query.apply(docs))
    }

    async fn update(&self, scope: &Scope, id: &str, patch: Document) -> DomainResult<Document> {
        let conn = self.conn.lock().await;
        let key = scope.to_string();

        let mut doc = read_doc(&conn, &key, id)?.ok_or_else(|| not_found(scope, id))?;
        apply_update(&mut doc, &patch);
        write_doc(&conn, &key, id, &doc)?;
        Ok(doc)
    }

    async fn delete(&self, scope: &Scope, id: &str) -> DomainResult<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "DELETE FROM documents WHERE scope = ? AND id = ?",
            params![scope.to_string(), id],
        )?;
        Ok(())
    }
}
