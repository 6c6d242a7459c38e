//! Entity CRUD routes for toppings and orders. Static segments (`count`,
//! `updateCustomer`) are registered alongside the `:id` capture; the router
//! gives statics priority.

use crate::handlers::{order, topping};
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::limit::RequestBodyLimitLayer;

const MAX_BODY_BYTES: usize = 1024 * 1024;

pub fn entity_routes(state: AppState) -> Router {
    Router::new()
        .route(
            "/toppings",
            get(topping::find)
                .post(topping::create)
                .patch(topping::update_all),
        )
        .route("/toppings/count", get(topping::count))
        .route(
            "/toppings/:id",
            get(topping::find_by_id)
                .patch(topping::update_by_id)
                .put(topping::replace_by_id)
                .delete(topping::delete_by_id),
        )
        .route(
            "/orders",
            get(order::find).post(order::create).patch(order::update_all),
        )
        .route("/orders/count", get(order::count))
        .route("/orders/updateCustomer", post(order::update_customer))
        .route(
            "/orders/:id",
            get(order::find_by_id)
                .patch(order::update_by_id)
                .put(order::replace_by_id)
                .delete(order::delete_by_id),
        )
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .with_state(state)
}
