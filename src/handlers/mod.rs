//! HTTP handlers: one controller module per entity.

pub mod order;
pub mod topping;

use crate::error::AppError;
use crate::filter::{Filter, Where};
use serde_json::{Map, Value};
use std::collections::HashMap;

pub(crate) fn body_to_map(value: Value) -> Result<Map<String, Value>, AppError> {
    match value {
        Value::Object(m) => Ok(m),
        _ => Err(AppError::BadRequest("body must be a JSON object".into())),
    }
}

/// The `filter` query parameter, when present, is a JSON-encoded [`Filter`].
pub(crate) fn filter_from_params(params: &HashMap<String, String>) -> Result<Filter, AppError> {
    match params.get("filter") {
        Some(s) => Filter::from_query(s),
        None => Ok(Filter::default()),
    }
}

/// The `where` query parameter, when present, is a JSON-encoded [`Where`].
pub(crate) fn where_from_params(
    params: &HashMap<String, String>,
) -> Result<Option<Where>, AppError> {
    params.get("where").map(|s| Where::from_query(s)).transpose()
}
