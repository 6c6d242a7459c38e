//! Order CRUD handlers. Creation enriches the order with the customer's name
//! fetched from the remote customer service.

use crate::error::AppError;
use crate::handlers::{body_to_map, filter_from_params, where_from_params};
use crate::models::{Customer, Model, Order};
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

/// Create an order. The customer record is fetched from the customer
/// microservice and its name is snapshotted onto the order before persisting.
/// A failed lookup fails the whole request; nothing is stored.
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let body = body_to_map(body)?;
    RequestValidator::validate(&body, &Order::rules())?;
    let mut order: Order = serde_json::from_value(Value::Object(body))
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let customer = state.customers.get_by_id(&order.customer_id).await?;
    tracing::debug!(customer_id = %customer.id, customer_name = %customer.name, "customer fetched");
    order.customer_name = Some(customer.name);

    let stored = state.orders.create(&order).await?;
    Ok(Json(stored))
}

/// Accepts a customer payload. Name propagation onto existing orders is
/// intentionally not performed: `customerName` is a creation-time snapshot.
pub async fn update_customer(Json(body): Json<Value>) -> Result<impl IntoResponse, AppError> {
    let body = body_to_map(body)?;
    let customer: Customer = serde_json::from_value(Value::Object(body))
        .map_err(|e| AppError::Validation(e.to_string()))?;
    tracing::debug!(customer_id = %customer.id, "customer update received, orders keep their snapshot");
    Ok(StatusCode::OK)
}

pub async fn count(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let where_ = where_from_params(&params)?;
    let count = state.orders.count(where_.as_ref()).await?;
    Ok(Json(json!({ "count": count })))
}

pub async fn find(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let filter = filter_from_params(&params)?;
    let rows = state.orders.find(&filter).await?;
    Ok(Json(rows))
}

pub async fn find_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let row = state.orders.find_by_id(&id).await?;
    Ok(Json(row))
}

pub async fn update_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let body = body_to_map(body)?;
    RequestValidator::validate_partial(&body, &Order::rules())?;
    state.orders.update_by_id(&id, &Value::Object(body)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn replace_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let body = body_to_map(body)?;
    RequestValidator::validate(&body, &Order::rules())?;
    state.orders.replace_by_id(&id, &Value::Object(body)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.orders.delete_by_id(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Bulk update: merge the body into every order matching the `where` query
/// parameter (all orders when absent). Returns the touched count.
pub async fn update_all(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let where_ = where_from_params(&params)?;
    let body = body_to_map(body)?;
    RequestValidator::validate_partial(&body, &Order::rules())?;
    let count = state
        .orders
        .update_all(where_.as_ref(), &Value::Object(body))
        .await?;
    Ok(Json(json!({ "count": count })))
}
