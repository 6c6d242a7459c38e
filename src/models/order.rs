use crate::models::Model;
use crate::validation::{Rules, ValidationRule};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One line of an order: which topping and how much. Embedded in [`Order`],
/// never persisted on its own.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub topping_id: String,
    pub amount: f64,
}

/// A customer's order. `customer_name` is copied from the customer service
/// when the order is created and never refreshed afterwards.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub toppings: Vec<OrderItem>,
    pub customer_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_time: Option<DateTime<Utc>>,
}

impl Model for Order {
    const COLLECTION: &'static str = "orders";

    fn rules() -> Rules {
        Rules::from([(
            "customerId",
            ValidationRule {
                required: true,
                min_length: Some(1),
                ..Default::default()
            },
        )])
    }
}
