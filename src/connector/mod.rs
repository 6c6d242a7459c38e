//! Datasource connectors: the storage adapters the repository delegates to.

mod memory;
mod postgres;

pub use memory::MemoryConnector;
pub use postgres::PostgresConnector;

use crate::config::{ConnectorKind, DatasourceConfig};
use crate::error::{AppError, ConfigError};
use crate::filter::{Filter, Where};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Storage operations over named collections of JSON documents.
///
/// Documents carry their id in the `id` field; `insert` generates a UUID v4
/// string when the caller did not supply one.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Store a new document and return it as stored (id included).
    async fn insert(&self, collection: &str, doc: Value) -> Result<Value, AppError>;

    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Value>, AppError>;

    async fn find_by_id(&self, collection: &str, id: &str) -> Result<Option<Value>, AppError>;

    /// Shallow-merge `patch` into the stored document. Ok(false) when absent.
    /// The stored id wins over any id in the patch.
    async fn update_by_id(&self, collection: &str, id: &str, patch: &Value)
        -> Result<bool, AppError>;

    /// Replace the whole document, id preserved. Ok(false) when absent.
    async fn replace_by_id(&self, collection: &str, id: &str, doc: &Value)
        -> Result<bool, AppError>;

    async fn delete_by_id(&self, collection: &str, id: &str) -> Result<bool, AppError>;

    async fn delete_all(&self, collection: &str) -> Result<u64, AppError>;

    async fn count(&self, collection: &str, where_: Option<&Where>) -> Result<u64, AppError>;

    /// Shallow-merge `patch` into every matching document; returns how many matched.
    async fn update_all(
        &self,
        collection: &str,
        where_: Option<&Where>,
        patch: &Value,
    ) -> Result<u64, AppError>;
}

/// Build the persistence connector a datasource config describes. Collections
/// are bootstrapped where the backend needs it (PostgreSQL table DDL).
/// Rest datasources bind service proxies, not repositories.
pub async fn connect(
    ds: &DatasourceConfig,
    collections: &[&str],
) -> Result<Arc<dyn Connector>, AppError> {
    match ds.connector {
        ConnectorKind::Memory => Ok(Arc::new(MemoryConnector::new())),
        ConnectorKind::Postgres => {
            let url = ds.url.as_deref().ok_or_else(|| ConfigError::MissingField {
                name: ds.name.clone(),
                field: "url",
            })?;
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(5)
                .connect(url)
                .await?;
            let pg = PostgresConnector::new(pool);
            pg.ensure_collections(collections).await?;
            Ok(Arc::new(pg))
        }
        ConnectorKind::Rest => Err(ConfigError::ConnectorMismatch {
            name: ds.name.clone(),
            connector: "rest".to_string(),
        }
        .into()),
    }
}

/// Generate a fresh document id.
pub(crate) fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
