//! In-memory document store. The default datasource for development and the
//! one the acceptance tests run against.

use crate::connector::{generate_id, Connector};
use crate::error::AppError;
use crate::filter::{self, Filter, Where};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Per-collection vectors of documents behind an async lock. Insertion order
/// is the natural result order.
#[derive(Default)]
pub struct MemoryConnector {
    collections: RwLock<HashMap<String, Vec<Value>>>,
}

impl MemoryConnector {
    pub fn new() -> Self {
        Self::default()
    }
}

fn doc_id(doc: &Value) -> Option<&str> {
    doc.get("id").and_then(Value::as_str)
}

/// Shallow-merge patch keys into target, keeping the stored id.
fn merge(target: &mut Map<String, Value>, patch: &Value) {
    if let Value::Object(patch) = patch {
        for (k, v) in patch {
            if k == "id" {
                continue;
            }
            target.insert(k.clone(), v.clone());
        }
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn insert(&self, collection: &str, doc: Value) -> Result<Value, AppError> {
        let mut doc = match doc {
            Value::Object(m) => m,
            _ => return Err(AppError::BadRequest("document must be a JSON object".into())),
        };
        if !doc.get("id").is_some_and(|v| v.is_string()) {
            doc.insert("id".to_string(), Value::String(generate_id()));
        }
        let stored = Value::Object(doc);
        tracing::debug!(collection, "insert document");
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .push(stored.clone());
        Ok(stored)
    }

    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Value>, AppError> {
        let collections = self.collections.read().await;
        let docs = collections.get(collection).cloned().unwrap_or_default();
        Ok(filter::apply(filter, docs))
    }

    async fn find_by_id(&self, collection: &str, id: &str) -> Result<Option<Value>, AppError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| doc_id(d) == Some(id)).cloned()))
    }

    async fn update_by_id(
        &self,
        collection: &str,
        id: &str,
        patch: &Value,
    ) -> Result<bool, AppError> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(false);
        };
        for doc in docs.iter_mut() {
            if doc_id(doc) == Some(id) {
                if let Value::Object(target) = doc {
                    merge(target, patch);
                }
                return Ok(true);
            }
        }
        Ok(false)
    }

    async fn replace_by_id(
        &self,
        collection: &str,
        id: &str,
        doc: &Value,
    ) -> Result<bool, AppError> {
        let mut replacement = match doc {
            Value::Object(m) => m.clone(),
            _ => return Err(AppError::BadRequest("document must be a JSON object".into())),
        };
        replacement.insert("id".to_string(), Value::String(id.to_string()));
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(false);
        };
        for stored in docs.iter_mut() {
            if doc_id(stored) == Some(id) {
                *stored = Value::Object(replacement);
                return Ok(true);
            }
        }
        Ok(false)
    }

    async fn delete_by_id(&self, collection: &str, id: &str) -> Result<bool, AppError> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(false);
        };
        let before = docs.len();
        docs.retain(|d| doc_id(d) != Some(id));
        Ok(docs.len() < before)
    }

    async fn delete_all(&self, collection: &str) -> Result<u64, AppError> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(0);
        };
        let removed = docs.len() as u64;
        docs.clear();
        Ok(removed)
    }

    async fn count(&self, collection: &str, where_: Option<&Where>) -> Result<u64, AppError> {
        let collections = self.collections.read().await;
        let Some(docs) = collections.get(collection) else {
            return Ok(0);
        };
        Ok(match where_ {
            Some(w) => docs.iter().filter(|d| w.matches(d)).count() as u64,
            None => docs.len() as u64,
        })
    }

    async fn update_all(
        &self,
        collection: &str,
        where_: Option<&Where>,
        patch: &Value,
    ) -> Result<u64, AppError> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(0);
        };
        let mut touched = 0;
        for doc in docs.iter_mut() {
            if where_.map_or(true, |w| w.matches(doc)) {
                if let Value::Object(target) = doc {
                    merge(target, patch);
                    touched += 1;
                }
            }
        }
        Ok(touched)
    }
}
