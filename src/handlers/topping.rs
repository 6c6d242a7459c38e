//! Topping CRUD handlers.

use crate::error::AppError;
use crate::filter::Filter;
use crate::handlers::{body_to_map, filter_from_params, where_from_params};
use crate::models::{Model, Topping};
use crate::state::AppState;
use crate::validation::RequestValidator;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};
use std::collections::HashMap;

/// Create a topping. Names must be unique: an exact-match lookup runs first
/// and a hit fails the request before anything is persisted. The check and
/// the insert are separate datasource calls, so two concurrent creates can
/// still both pass the lookup.
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let body = body_to_map(body)?;
    RequestValidator::validate(&body, &Topping::rules())?;
    let topping: Topping = serde_json::from_value(Value::Object(body))
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let existing = state
        .toppings
        .find(&Filter::where_eq("name", Value::String(topping.name.clone())))
        .await?;
    if !existing.is_empty() {
        tracing::debug!(name = %topping.name, "duplicate topping name rejected");
        return Err(AppError::BadRequest("name existed".into()));
    }

    let stored = state.toppings.create(&topping).await?;
    Ok(Json(stored))
}

pub async fn count(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let where_ = where_from_params(&params)?;
    let count = state.toppings.count(where_.as_ref()).await?;
    Ok(Json(json!({ "count": count })))
}

pub async fn find(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let filter = filter_from_params(&params)?;
    let rows = state.toppings.find(&filter).await?;
    Ok(Json(rows))
}

pub async fn find_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let row = state.toppings.find_by_id(&id).await?;
    Ok(Json(row))
}

pub async fn update_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let body = body_to_map(body)?;
    RequestValidator::validate_partial(&body, &Topping::rules())?;
    state
        .toppings
        .update_by_id(&id, &Value::Object(body))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn replace_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let body = body_to_map(body)?;
    RequestValidator::validate(&body, &Topping::rules())?;
    state
        .toppings
        .replace_by_id(&id, &Value::Object(body))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.toppings.delete_by_id(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Bulk update: merge the body into every topping matching the `where`
/// query parameter (all toppings when absent). Returns the touched count.
pub async fn update_all(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let where_ = where_from_params(&params)?;
    let body = body_to_map(body)?;
    RequestValidator::validate_partial(&body, &Topping::rules())?;
    let count = state
        .toppings
        .update_all(where_.as_ref(), &Value::Object(body))
        .await?;
    Ok(Json(json!({ "count": count })))
}
