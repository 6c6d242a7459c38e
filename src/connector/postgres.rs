//! PostgreSQL document-table connector. One table per collection,
//! `(seq BIGSERIAL, id TEXT PRIMARY KEY, doc JSONB NOT NULL)`.

use crate::connector::{generate_id, Connector};
use crate::error::AppError;
use crate::filter::{self, Filter, Where};
use crate::sql::{self, PgBind, QueryBuf};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::{PgPool, Row};

pub struct PostgresConnector {
    pool: PgPool,
}

impl PostgresConnector {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the document tables that back the given collections.
    pub async fn ensure_collections(&self, collections: &[&str]) -> Result<(), AppError> {
        for collection in collections {
            let ddl = sql::create_table(collection);
            tracing::debug!(sql = %ddl, "ensure collection");
            sqlx::query(&ddl).execute(&self.pool).await?;
        }
        Ok(())
    }

    async fn fetch_doc(&self, sql: &str, id: &str) -> Result<Option<Value>, AppError> {
        tracing::debug!(sql = %sql, id, "query");
        let row = sqlx::query(sql)
            .bind(PgBind::Text(id.to_string()))
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| r.try_get::<Value, _>("doc")).transpose().map_err(AppError::from)
    }

    async fn execute_buf(&self, q: &QueryBuf) -> Result<u64, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(PgBind::from_json(p));
        }
        Ok(query.execute(&self.pool).await?.rows_affected())
    }

    async fn fetch_buf_one(&self, q: &QueryBuf) -> Result<Option<Value>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(PgBind::from_json(p));
        }
        let row = query.fetch_optional(&self.pool).await?;
        row.map(|r| r.try_get::<Value, _>("doc")).transpose().map_err(AppError::from)
    }
}

#[async_trait]
impl Connector for PostgresConnector {
    async fn insert(&self, collection: &str, doc: Value) -> Result<Value, AppError> {
        let mut doc = match doc {
            Value::Object(m) => m,
            _ => return Err(AppError::BadRequest("document must be a JSON object".into())),
        };
        let id = match doc.get("id").and_then(Value::as_str) {
            Some(id) => id.to_string(),
            None => {
                let id = generate_id();
                doc.insert("id".to_string(), Value::String(id.clone()));
                id
            }
        };
        let q = sql::insert(collection, &id, &Value::Object(doc));
        self.fetch_buf_one(&q)
            .await?
            .ok_or(AppError::Db(sqlx::Error::RowNotFound))
    }

    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Value>, AppError> {
        let q = sql::select_list(collection, filter);
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(PgBind::from_json(p));
        }
        let rows = query.fetch_all(&self.pool).await?;
        let docs: Vec<Value> = rows
            .iter()
            .map(|r| r.try_get::<Value, _>("doc"))
            .collect::<Result<_, _>>()?;
        // Where/order/pagination ran in SQL; projection happens here.
        Ok(match &filter.fields {
            Some(fields) => filter::project(docs, fields),
            None => docs,
        })
    }

    async fn find_by_id(&self, collection: &str, id: &str) -> Result<Option<Value>, AppError> {
        self.fetch_doc(&sql::select_by_id(collection), id).await
    }

    async fn update_by_id(
        &self,
        collection: &str,
        id: &str,
        patch: &Value,
    ) -> Result<bool, AppError> {
        let mut patch = patch.clone();
        if let Value::Object(m) = &mut patch {
            m.remove("id");
        }
        let q = sql::update_by_id(collection, id, &patch);
        Ok(self.fetch_buf_one(&q).await?.is_some())
    }

    async fn replace_by_id(
        &self,
        collection: &str,
        id: &str,
        doc: &Value,
    ) -> Result<bool, AppError> {
        let mut doc = match doc {
            Value::Object(m) => m.clone(),
            _ => return Err(AppError::BadRequest("document must be a JSON object".into())),
        };
        doc.insert("id".to_string(), Value::String(id.to_string()));
        let q = sql::replace_by_id(collection, id, &Value::Object(doc));
        Ok(self.execute_buf(&q).await? > 0)
    }

    async fn delete_by_id(&self, collection: &str, id: &str) -> Result<bool, AppError> {
        let stmt = sql::delete_by_id(collection);
        tracing::debug!(sql = %stmt, id, "query");
        let done = sqlx::query(&stmt)
            .bind(PgBind::Text(id.to_string()))
            .execute(&self.pool)
            .await?;
        Ok(done.rows_affected() > 0)
    }

    async fn delete_all(&self, collection: &str) -> Result<u64, AppError> {
        let stmt = sql::delete_all(collection);
        tracing::debug!(sql = %stmt, "query");
        Ok(sqlx::query(&stmt).execute(&self.pool).await?.rows_affected())
    }

    async fn count(&self, collection: &str, where_: Option<&Where>) -> Result<u64, AppError> {
        let q = sql::count(collection, where_);
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(PgBind::from_json(p));
        }
        let row = query.fetch_one(&self.pool).await?;
        let n: i64 = row.try_get("count")?;
        Ok(n.max(0) as u64)
    }

    async fn update_all(
        &self,
        collection: &str,
        where_: Option<&Where>,
        patch: &Value,
    ) -> Result<u64, AppError> {
        let mut patch = patch.clone();
        if let Value::Object(m) = &mut patch {
            m.remove("id");
        }
        let q = sql::update_all(collection, where_, &patch);
        self.execute_buf(&q).await
    }
}
