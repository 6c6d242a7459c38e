//! Generic CRUD façade over a connector, parameterized by entity type.
//! Pure pass-throughs: all business logic lives in the handlers.

use crate::connector::Connector;
use crate::error::AppError;
use crate::filter::{Filter, Where};
use crate::models::Model;
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;

pub struct Repository<M: Model> {
    connector: Arc<dyn Connector>,
    _model: PhantomData<fn() -> M>,
}

impl<M: Model> Clone for Repository<M> {
    fn clone(&self) -> Self {
        Repository {
            connector: Arc::clone(&self.connector),
            _model: PhantomData,
        }
    }
}

impl<M: Model> Repository<M> {
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Repository {
            connector,
            _model: PhantomData,
        }
    }

    /// Persist a new entity and return it as stored (generated id included).
    pub async fn create(&self, model: &M) -> Result<M, AppError> {
        let doc = serde_json::to_value(model)?;
        let stored = self.connector.insert(M::COLLECTION, doc).await?;
        Ok(serde_json::from_value(stored)?)
    }

    pub async fn find(&self, filter: &Filter) -> Result<Vec<Value>, AppError> {
        self.connector.find(M::COLLECTION, filter).await
    }

    /// Fetch one document; NotFound when the id was never stored or deleted.
    pub async fn find_by_id(&self, id: &str) -> Result<Value, AppError> {
        self.connector
            .find_by_id(M::COLLECTION, id)
            .await?
            .ok_or_else(|| AppError::NotFound(id.to_string()))
    }

    pub async fn update_by_id(&self, id: &str, patch: &Value) -> Result<(), AppError> {
        if self.connector.update_by_id(M::COLLECTION, id, patch).await? {
            Ok(())
        } else {
            Err(AppError::NotFound(id.to_string()))
        }
    }

    pub async fn replace_by_id(&self, id: &str, doc: &Value) -> Result<(), AppError> {
        if self.connector.replace_by_id(M::COLLECTION, id, doc).await? {
            Ok(())
        } else {
            Err(AppError::NotFound(id.to_string()))
        }
    }

    pub async fn delete_by_id(&self, id: &str) -> Result<(), AppError> {
        if self.connector.delete_by_id(M::COLLECTION, id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound(id.to_string()))
        }
    }

    pub async fn delete_all(&self) -> Result<u64, AppError> {
        self.connector.delete_all(M::COLLECTION).await
    }

    pub async fn count(&self, where_: Option<&Where>) -> Result<u64, AppError> {
        self.connector.count(M::COLLECTION, where_).await
    }

    pub async fn update_all(&self, where_: Option<&Where>, patch: &Value) -> Result<u64, AppError> {
        self.connector.update_all(M::COLLECTION, where_, patch).await
    }
}
