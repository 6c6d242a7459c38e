//! Acceptance tests for the /toppings surface, run against the memory
//! connector through the real router (no TCP server; `tower::ServiceExt`).

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use pizza_order_api::{
    entity_routes, AppError, AppState, Connector, Customer, CustomerService, MemoryConnector,
};
use serde_json::{json, Value};
use tower::ServiceExt;

/// Topping routes never call the customer service; this stub fails loudly if
/// something does.
struct NoCustomers;

#[async_trait]
impl CustomerService for NoCustomers {
    async fn get_by_id(&self, customer_id: &str) -> Result<Customer, AppError> {
        Err(AppError::Upstream(format!(
            "unexpected customer lookup: {customer_id}"
        )))
    }
}

fn make_app() -> axum::Router {
    let connector: Arc<dyn Connector> = Arc::new(MemoryConnector::new());
    entity_routes(AppState::new(connector, Arc::new(NoCustomers)))
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn patch_json(uri: &str, body: &Value) -> Request<Body> {
    Request::patch(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn put_json(uri: &str, body: &Value) -> Request<Body> {
    Request::put(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

/// Percent-encode a JSON value for use as a query parameter.
fn encoded(v: &Value) -> String {
    let raw = v.to_string();
    let mut out = String::with_capacity(raw.len() * 3);
    for b in raw.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char)
            }
            _ => out.push_str(&format!("%{:02X}", b)),
        }
    }
    out
}

fn given_topping() -> Value {
    json!({ "name": "cheese", "price": 2.5, "image": "cheese.png" })
}

async fn create_topping(app: &axum::Router, topping: &Value) -> Value {
    let response = app
        .clone()
        .oneshot(post_json("/toppings", topping))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    body_to_json(response.into_body()).await
}

#[tokio::test]
async fn creates_a_topping() {
    let app = make_app();
    let created = create_topping(&app, &given_topping()).await;
    assert_eq!(created["name"], "cheese");
    assert_eq!(created["price"], 2.5);
    let id = created["id"].as_str().unwrap();
    assert!(!id.is_empty());

    let response = app
        .clone()
        .oneshot(get(&format!("/toppings/{id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_to_json(response.into_body()).await, created);
}

#[tokio::test]
async fn rejects_topping_with_no_name() {
    let app = make_app();
    let response = app
        .clone()
        .oneshot(post_json("/toppings", &json!({ "price": 2.5 })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "validation_error");

    // Nothing was persisted.
    let response = app.clone().oneshot(get("/toppings")).await.unwrap();
    assert_eq!(body_to_json(response.into_body()).await, json!([]));
}

#[tokio::test]
async fn rejects_topping_with_no_price() {
    let app = make_app();
    let response = app
        .clone()
        .oneshot(post_json("/toppings", &json!({ "name": "cheese" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn rejects_duplicate_topping_name() {
    let app = make_app();
    create_topping(&app, &json!({ "name": "bacon", "price": 3.0 })).await;

    let response = app
        .clone()
        .oneshot(post_json("/toppings", &json!({ "name": "bacon", "price": 4.0 })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_to_json(response.into_body()).await;
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("name existed"));

    // Exactly one bacon topping in the store.
    let uri = format!("/toppings?filter={}", encoded(&json!({ "where": { "name": "bacon" } })));
    let response = app.clone().oneshot(get(&uri)).await.unwrap();
    let rows = body_to_json(response.into_body()).await;
    assert_eq!(rows.as_array().unwrap().len(), 1);
    assert_eq!(rows[0]["price"], 3.0);
}

#[tokio::test]
async fn duplicate_check_is_case_sensitive() {
    let app = make_app();
    create_topping(&app, &json!({ "name": "bacon", "price": 3.0 })).await;
    let response = app
        .clone()
        .oneshot(post_json("/toppings", &json!({ "name": "Bacon", "price": 3.0 })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn returns_404_for_unknown_topping() {
    let app = make_app();
    let response = app.clone().oneshot(get("/toppings/99999")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "not_found");
}

#[tokio::test]
async fn replaces_topping_by_id() {
    let app = make_app();
    let created = create_topping(&app, &given_topping()).await;
    let id = created["id"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(put_json(
            &format!("/toppings/{id}"),
            &json!({ "name": "cheese", "price": 10.0 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // Replace overwrites all fields: image is gone, id survives.
    let response = app
        .clone()
        .oneshot(get(&format!("/toppings/{id}")))
        .await
        .unwrap();
    let doc = body_to_json(response.into_body()).await;
    assert_eq!(doc["price"], 10.0);
    assert_eq!(doc["id"], *id);
    assert!(doc.get("image").is_none());
}

#[tokio::test]
async fn returns_404_when_replacing_unknown_topping() {
    let app = make_app();
    let response = app
        .clone()
        .oneshot(put_json("/toppings/99999", &given_topping()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn updates_topping_by_id() {
    let app = make_app();
    let created = create_topping(&app, &given_topping()).await;
    let id = created["id"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(patch_json(&format!("/toppings/{id}"), &json!({ "price": 10.0 })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // Update merges: untouched fields survive.
    let response = app
        .clone()
        .oneshot(get(&format!("/toppings/{id}")))
        .await
        .unwrap();
    let doc = body_to_json(response.into_body()).await;
    assert_eq!(doc["price"], 10.0);
    assert_eq!(doc["name"], "cheese");
    assert_eq!(doc["image"], "cheese.png");
}

#[tokio::test]
async fn returns_404_when_updating_unknown_topping() {
    let app = make_app();
    let response = app
        .clone()
        .oneshot(patch_json("/toppings/99999", &json!({ "price": 100.0 })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deletes_topping_by_id() {
    let app = make_app();
    let created = create_topping(&app, &given_topping()).await;
    let id = created["id"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::delete(&format!("/toppings/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .clone()
        .oneshot(get(&format!("/toppings/{id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn returns_404_when_deleting_unknown_topping() {
    let app = make_app();
    let response = app
        .clone()
        .oneshot(Request::delete("/toppings/99999").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn queries_toppings_with_a_filter() {
    let app = make_app();
    create_topping(&app, &json!({ "name": "topping", "price": 1.0 })).await;
    let bread = create_topping(&app, &json!({ "name": "bread", "price": 2.0 })).await;

    let uri = format!("/toppings?filter={}", encoded(&json!({ "where": { "name": "bread" } })));
    let response = app.clone().oneshot(get(&uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_to_json(response.into_body()).await, json!([bread]));
}

#[tokio::test]
async fn rejects_malformed_filter() {
    let app = make_app();
    let response = app.clone().oneshot(get("/toppings?filter=%7Bnope")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn lists_in_insertion_order_by_default() {
    let app = make_app();
    for (name, price) in [("cheese", 2.5), ("bacon", 3.0), ("bread", 1.0)] {
        create_topping(&app, &json!({ "name": name, "price": price })).await;
    }
    let response = app.clone().oneshot(get("/toppings")).await.unwrap();
    let rows = body_to_json(response.into_body()).await;
    let names: Vec<&str> = rows
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["cheese", "bacon", "bread"]);
}

#[tokio::test]
async fn orders_and_paginates_with_filter() {
    let app = make_app();
    for (name, price) in [("cheese", 2.5), ("bacon", 3.0), ("bread", 1.0)] {
        create_topping(&app, &json!({ "name": name, "price": price })).await;
    }
    let uri = format!(
        "/toppings?filter={}",
        encoded(&json!({ "order": "price DESC", "skip": 1, "limit": 1 }))
    );
    let response = app.clone().oneshot(get(&uri)).await.unwrap();
    let rows = body_to_json(response.into_body()).await;
    assert_eq!(rows.as_array().unwrap().len(), 1);
    assert_eq!(rows[0]["name"], "cheese");
}

#[tokio::test]
async fn projects_fields_with_filter() {
    let app = make_app();
    create_topping(&app, &given_topping()).await;
    let uri = format!("/toppings?filter={}", encoded(&json!({ "fields": { "name": true } })));
    let response = app.clone().oneshot(get(&uri)).await.unwrap();
    let rows = body_to_json(response.into_body()).await;
    assert_eq!(rows, json!([{ "name": "cheese" }]));
}

#[tokio::test]
async fn counts_toppings_with_where() {
    let app = make_app();
    for (name, price) in [("cheese", 2.5), ("bacon", 3.0), ("bread", 1.0)] {
        create_topping(&app, &json!({ "name": name, "price": price })).await;
    }
    let response = app.clone().oneshot(get("/toppings/count")).await.unwrap();
    assert_eq!(body_to_json(response.into_body()).await, json!({ "count": 3 }));

    let uri = format!(
        "/toppings/count?where={}",
        encoded(&json!({ "price": { "gt": 2.0 } }))
    );
    let response = app.clone().oneshot(get(&uri)).await.unwrap();
    assert_eq!(body_to_json(response.into_body()).await, json!({ "count": 2 }));
}

#[tokio::test]
async fn bulk_updates_by_where() {
    let app = make_app();
    for (name, price) in [("cheese", 2.5), ("bacon", 3.0)] {
        create_topping(&app, &json!({ "name": name, "price": price })).await;
    }
    let uri = format!("/toppings?where={}", encoded(&json!({ "name": "bacon" })));
    let response = app
        .clone()
        .oneshot(patch_json(&uri, &json!({ "price": 9.0 })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_to_json(response.into_body()).await, json!({ "count": 1 }));

    let uri = format!("/toppings?filter={}", encoded(&json!({ "where": { "name": "bacon" } })));
    let response = app.clone().oneshot(get(&uri)).await.unwrap();
    let rows = body_to_json(response.into_body()).await;
    assert_eq!(rows[0]["price"], 9.0);
}

#[tokio::test]
async fn bulk_update_without_where_touches_everything() {
    let app = make_app();
    for (name, price) in [("cheese", 2.5), ("bacon", 3.0)] {
        create_topping(&app, &json!({ "name": name, "price": price })).await;
    }
    let response = app
        .clone()
        .oneshot(patch_json("/toppings", &json!({ "price": 1.0 })))
        .await
        .unwrap();
    assert_eq!(body_to_json(response.into_body()).await, json!({ "count": 2 }));
}
